use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use capsplit::corpus::{filter_by_word_count, number_sentences};
use capsplit::discovery::DiscoveryConfig;
use capsplit::output::{append_lines, write_lines};
use capsplit::{
    collect_discovered_captions, load_video_ids, process_videos, sources_for_ids, CaptionPipeline, ExtractConfig,
    Lexicon, OutputMode, ProcessingConfig, SentenceSink,
};

#[derive(Parser, Debug)]
#[command(name = "capsplit")]
#[command(about = "Extracts clean single sentences from auto-generated video captions")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract sentences from caption files
    Extract(ExtractArgs),
    /// Merge a word list and a lemma map into a lexicon file
    BuildLexicon(BuildLexiconArgs),
    /// Keep sentences within the configured word-count bounds
    Clean(CleanArgs),
    /// Append numbered sentences to a listing file
    Number(NumberArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Directory holding `<video_id>.<ext>` caption files
    #[arg(long)]
    captions_dir: PathBuf,

    /// Prebuilt lexicon, one word per line
    #[arg(long, conflicts_with_all = ["words", "lemmas"])]
    lexicon: Option<PathBuf>,

    /// Base word list, used with --lemmas to build the lexicon in-process
    #[arg(long, requires = "lemmas")]
    words: Option<PathBuf>,

    /// Lemma map of `base -> inflection,...` lines
    #[arg(long, requires = "words")]
    lemmas: Option<PathBuf>,

    /// JSON array of video ids; when absent, every caption file in the directory is used
    #[arg(long)]
    video_ids: Option<PathBuf>,

    /// Sentence output file
    #[arg(long)]
    output: PathBuf,

    /// Prefix each video's sentences with its id and indent them
    #[arg(long)]
    annotated: bool,

    /// TOML configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    max_gap_seconds: Option<f64>,

    #[arg(long)]
    min_overlap_fraction: Option<f64>,

    /// Videos processed concurrently (default: number of CPUs)
    #[arg(long)]
    jobs: Option<usize>,

    /// Abort on the first unreadable caption file
    #[arg(long)]
    fail_fast: bool,

    /// Suppress console progress bars
    #[arg(long)]
    no_progress: bool,

    /// Stats output file path
    #[arg(long, default_value = "run_stats.json")]
    stats_out: PathBuf,
}

#[derive(Args, Debug)]
struct BuildLexiconArgs {
    #[arg(long)]
    words: PathBuf,

    #[arg(long)]
    lemmas: PathBuf,

    #[arg(long)]
    output: PathBuf,
}

#[derive(Args, Debug)]
struct CleanArgs {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,

    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    min_words: Option<usize>,

    #[arg(long)]
    max_words: Option<usize>,
}

#[derive(Args, Debug)]
struct NumberArgs {
    #[arg(long)]
    input: PathBuf,

    #[arg(long)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    // WHY: structured JSON logging enables observability and debugging in production
    tracing_subscriber::fmt().with_target(false).json().init();

    let cli = Cli::parse();
    info!(?cli, "Parsed CLI arguments");

    match cli.command {
        Command::Extract(args) => run_extract(args).await,
        Command::BuildLexicon(args) => run_build_lexicon(args).await,
        Command::Clean(args) => run_clean(args).await,
        Command::Number(args) => run_number(args).await,
    }
}

fn load_config(path: Option<&Path>) -> Result<ExtractConfig> {
    match path {
        Some(path) => ExtractConfig::load(path),
        None => Ok(ExtractConfig::default()),
    }
}

async fn run_extract(args: ExtractArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(gap) = args.max_gap_seconds {
        config.max_gap_seconds = gap;
    }
    if let Some(fraction) = args.min_overlap_fraction {
        config.min_overlap_fraction = fraction;
    }

    // WHY: every casing and boundary decision depends on the lexicon, so a bad one stops the run here
    let lexicon = match (&args.lexicon, &args.words, &args.lemmas) {
        (Some(path), _, _) => Lexicon::load(path),
        (None, Some(words), Some(lemmas)) => Lexicon::build_from_files(words, lemmas),
        _ => anyhow::bail!("Either --lexicon or both --words and --lemmas are required"),
    }
    .context("Failed to load lexicon")?;

    let pipeline = Arc::new(CaptionPipeline::new(&config, Arc::new(lexicon))?);

    if !args.captions_dir.is_dir() {
        anyhow::bail!("Captions directory does not exist: {}", args.captions_dir.display());
    }

    let sources = match &args.video_ids {
        Some(list) => {
            let ids = load_video_ids(list).await?;
            sources_for_ids(&args.captions_dir, &ids, &config.caption_extension)
        }
        None => {
            let discovery_config = DiscoveryConfig {
                fail_fast: args.fail_fast,
            };
            collect_discovered_captions(&args.captions_dir, &config.caption_extension, discovery_config).await?
        }
    };

    let mode = if args.annotated {
        OutputMode::Annotated
    } else {
        OutputMode::Plain
    };
    let mut sink = SentenceSink::create(&args.output, mode).await?;

    let processing_config = ProcessingConfig {
        jobs: args.jobs.unwrap_or_else(num_cpus::get),
        fail_fast: args.fail_fast,
        show_progress: !args.no_progress,
        skip_videos: config.skip_videos.iter().cloned().collect::<HashSet<_>>(),
    };
    let run_stats = process_videos(sources, pipeline, &mut sink, &processing_config).await?;
    let written = sink.finish().await?;
    run_stats.write_json(&args.stats_out).await?;

    println!(
        "capsplit v{} - {} sentences from {} videos ({} missing, {} skipped, {} failed)",
        env!("CARGO_PKG_VERSION"),
        written,
        run_stats.videos_processed,
        run_stats.videos_missing,
        run_stats.videos_skipped,
        run_stats.videos_failed
    );
    Ok(())
}

async fn run_build_lexicon(args: BuildLexiconArgs) -> Result<()> {
    let lexicon = Lexicon::build_from_files(&args.words, &args.lemmas).context("Failed to build lexicon")?;
    tokio::fs::write(&args.output, lexicon.to_file_contents())
        .await
        .with_context(|| format!("Failed to write lexicon to {}", args.output.display()))?;
    println!("Wrote {} words to {}", lexicon.len(), args.output.display());
    Ok(())
}

async fn run_clean(args: CleanArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(min_words) = args.min_words {
        config.min_words = min_words;
    }
    if let Some(max_words) = args.max_words {
        config.max_words = max_words;
    }
    config.validate()?;

    let content = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let total = content.lines().count();
    let kept = filter_by_word_count(content.lines(), config.min_words, config.max_words);
    write_lines(&args.output, &kept).await?;

    info!(total, kept = kept.len(), "Cleaned sentence list");
    println!("Kept {} of {} sentences", kept.len(), total);
    Ok(())
}

async fn run_number(args: NumberArgs) -> Result<()> {
    let content = tokio::fs::read_to_string(&args.input)
        .await
        .with_context(|| format!("Failed to read {}", args.input.display()))?;
    let numbered = number_sentences(content.lines());
    append_lines(&args.output, &numbered).await?;
    println!("Appended {} numbered sentences to {}", numbered.len(), args.output.display());
    Ok(())
}
