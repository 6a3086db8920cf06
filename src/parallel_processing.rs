// WHY: videos are independent, so reads and extraction run concurrently while results are
// consumed in input order and written by one sink; output order matches the id list

use anyhow::{Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Instant, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::discovery::VideoSource;
use crate::error::CaptionError;
use crate::output::SentenceSink;
use crate::pipeline::CaptionPipeline;
use crate::reader::{CaptionReader, ReaderConfig};

/// Outcome of one video
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum VideoStatus {
    Processed,
    /// No caption file; an empty result, not a failure
    Missing,
    /// Listed as known garbage
    Skipped,
    Failed,
}

/// Per-video processing statistics
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct VideoStats {
    pub video_id: String,
    pub status: VideoStatus,
    pub blocks: usize,
    pub malformed_blocks: usize,
    pub groups: usize,
    /// Source classified as rolling-overlap style
    pub rolling: bool,
    pub sentences: usize,
    pub processing_time_ms: u64,
    pub error: Option<String>,
}

impl VideoStats {
    fn empty(video_id: &str, status: VideoStatus) -> Self {
        Self {
            video_id: video_id.to_string(),
            status,
            blocks: 0,
            malformed_blocks: 0,
            groups: 0,
            rolling: false,
            sentences: 0,
            processing_time_ms: 0,
            error: None,
        }
    }
}

/// Whole-run statistics written to `--stats-out`
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RunStats {
    /// Seconds since the Unix epoch
    pub run_start: u64,
    pub total_processing_time_ms: u64,
    pub videos_processed: u64,
    pub videos_missing: u64,
    pub videos_skipped: u64,
    pub videos_failed: u64,
    pub rolling_sources: u64,
    pub total_sentences: u64,
    pub video_stats: Vec<VideoStats>,
}

impl RunStats {
    fn from_videos(run_start: u64, elapsed_ms: u64, video_stats: Vec<VideoStats>) -> Self {
        let count = |status: VideoStatus| video_stats.iter().filter(|s| s.status == status).count() as u64;
        Self {
            run_start,
            total_processing_time_ms: elapsed_ms,
            videos_processed: count(VideoStatus::Processed),
            videos_missing: count(VideoStatus::Missing),
            videos_skipped: count(VideoStatus::Skipped),
            videos_failed: count(VideoStatus::Failed),
            rolling_sources: video_stats.iter().filter(|s| s.rolling).count() as u64,
            total_sentences: video_stats.iter().map(|s| s.sentences as u64).sum(),
            video_stats,
        }
    }

    /// Write as pretty JSON
    pub async fn write_json(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
        info!("Run statistics written to {}", path.display());
        Ok(())
    }
}

/// Driver settings
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Videos in flight at once
    pub jobs: usize,
    /// Abort on the first unreadable caption file or extraction failure
    pub fail_fast: bool,
    pub show_progress: bool,
    pub skip_videos: HashSet<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            jobs: num_cpus::get(),
            fail_fast: false,
            show_progress: false,
            skip_videos: HashSet::new(),
        }
    }
}

/// Extract every video in `sources` and append its sentences to `sink`, in input order
pub async fn process_videos(
    sources: Vec<VideoSource>,
    pipeline: Arc<CaptionPipeline>,
    sink: &mut SentenceSink,
    config: &ProcessingConfig,
) -> Result<RunStats> {
    let run_start = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default();
    let start_time = Instant::now();
    let progress = progress_bar(sources.len() as u64, config.show_progress);

    info!("Processing {} videos with {} jobs", sources.len(), config.jobs.max(1));

    let skip = Arc::new(config.skip_videos.clone());
    let reader_config = ReaderConfig {
        fail_fast: config.fail_fast,
        ..Default::default()
    };

    let mut results = Box::pin(
        stream::iter(sources)
            .map(|source| {
                let pipeline = Arc::clone(&pipeline);
                let skip = Arc::clone(&skip);
                let reader_config = reader_config.clone();
                async move { process_video(source, pipeline, &skip, reader_config).await }
            })
            .buffered(config.jobs.max(1)),
    );

    let mut video_stats = Vec::new();
    while let Some(outcome) = results.next().await {
        let (stats, sentences) = outcome?;
        if stats.status == VideoStatus::Failed && config.fail_fast {
            progress.abandon();
            anyhow::bail!(
                "Extraction failed for {}: {}",
                stats.video_id,
                stats.error.as_deref().unwrap_or("unknown error")
            );
        }
        if stats.status == VideoStatus::Processed {
            sink.write_video(&stats.video_id, &sentences).await?;
        }
        progress.set_message(stats.video_id.clone());
        progress.inc(1);
        video_stats.push(stats);
    }
    progress.finish_with_message("done");

    let run_stats = RunStats::from_videos(run_start, start_time.elapsed().as_millis() as u64, video_stats);
    info!(
        processed = run_stats.videos_processed,
        missing = run_stats.videos_missing,
        skipped = run_stats.videos_skipped,
        failed = run_stats.videos_failed,
        sentences = run_stats.total_sentences,
        "Run complete"
    );
    Ok(run_stats)
}

async fn process_video(
    source: VideoSource,
    pipeline: Arc<CaptionPipeline>,
    skip: &HashSet<String>,
    reader_config: ReaderConfig,
) -> Result<(VideoStats, Vec<String>)> {
    let video_id = source.video_id.as_str();
    if skip.contains(video_id) {
        debug!("Skipping listed video {}", video_id);
        return Ok((VideoStats::empty(video_id, VideoStatus::Skipped), Vec::new()));
    }

    let start_time = Instant::now();
    let reader = CaptionReader::new(reader_config);
    let (content, read_stats) = reader.read_captions(&source.caption_path).await?;

    let Some(content) = content else {
        if read_stats.missing {
            let missing = CaptionError::MissingSource {
                video_id: video_id.to_string(),
                path: source.caption_path.clone(),
            };
            debug!("{}", missing);
            return Ok((VideoStats::empty(video_id, VideoStatus::Missing), Vec::new()));
        }
        let mut stats = VideoStats::empty(video_id, VideoStatus::Failed);
        stats.error = read_stats.read_error;
        return Ok((stats, Vec::new()));
    };

    // WHY: extraction is pure CPU work; keep it off the async worker threads
    let extraction = tokio::task::spawn_blocking(move || pipeline.extract_detailed(&content)).await;

    let mut stats = VideoStats::empty(video_id, VideoStatus::Processed);
    stats.processing_time_ms = start_time.elapsed().as_millis() as u64;
    match extraction {
        Ok(extraction) => {
            stats.blocks = extraction.blocks;
            stats.malformed_blocks = extraction.malformed_blocks;
            stats.groups = extraction.groups;
            stats.rolling = extraction.rolling;
            stats.sentences = extraction.sentences.len();
            debug!(
                video_id,
                blocks = stats.blocks,
                groups = stats.groups,
                rolling = stats.rolling,
                sentences = stats.sentences,
                "Processed video"
            );
            Ok((stats, extraction.sentences))
        }
        Err(e) => {
            warn!("Extraction task for {} failed: {}", video_id, e);
            stats.status = VideoStatus::Failed;
            stats.error = Some(e.to_string());
            Ok((stats, Vec::new()))
        }
    }
}

fn progress_bar(len: u64, show: bool) -> ProgressBar {
    if !show {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new(len);
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} videos ({percent}%) {msg} {eta}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    bar.set_style(style.progress_chars("=>-"));
    bar
}
