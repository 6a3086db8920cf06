use capsplit::{CaptionPipeline, CueParser, ExtractConfig, Lexicon, TemporalGrouper};
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use std::sync::Arc;

const PHRASES: &[&str] = &[
    "so we went down to the river,",
    "and Dr. Smith said it was fine...",
    "THEN THE U.S. TEAM WON 3.5 TO 2.",
    "[Laughter]",
    "BOB: did you see www.example.com?",
    "- I think so - yes.",
];

// WHY: auto-generated captions repeat the previous cue's last line, the worst case for grouping
fn rolling_captions(cues: usize) -> String {
    let mut text = String::from("WEBVTT\nKind: captions\nLanguage: en\n\n");
    for i in 0..cues {
        let start = i as u64 * 1_000;
        let end = start + 950;
        text.push_str(&format!("{}\n{} --> {} align:start position:0%\n", i + 1, stamp(start), stamp(end)));
        if i > 0 {
            text.push_str(PHRASES[(i - 1) % PHRASES.len()]);
            text.push('\n');
        }
        text.push_str(PHRASES[i % PHRASES.len()]);
        text.push_str("\n\n");
    }
    text
}

fn stamp(ms: u64) -> String {
    format!("{:02}:{:02}:{:02}.{:03}", ms / 3_600_000, ms / 60_000 % 60, ms / 1_000 % 60, ms % 1_000)
}

fn lexicon() -> Arc<Lexicon> {
    Arc::new(Lexicon::from_words([
        "so", "we", "went", "down", "to", "the", "river", "and", "said", "it", "was", "fine", "then", "team", "won",
        "did", "you", "see", "i", "think", "yes",
    ]))
}

fn bench_extraction(c: &mut Criterion) {
    let text = rolling_captions(2_000);
    let pipeline = CaptionPipeline::new(&ExtractConfig::default(), lexicon()).expect("pipeline");

    let mut group = c.benchmark_group("extraction");
    group.throughput(Throughput::Bytes(text.len() as u64));

    group.bench_function("parse_only", |b| {
        let parser = CueParser::new().expect("parser");
        b.iter(|| black_box(parser.parse(black_box(&text))))
    });

    group.bench_function("parse_and_group", |b| {
        let parser = CueParser::new().expect("parser");
        let grouper = TemporalGrouper::from_config(&ExtractConfig::default());
        b.iter(|| black_box(grouper.group(parser.parse(black_box(&text)).blocks)))
    });

    group.bench_function("full_pipeline", |b| b.iter(|| black_box(pipeline.extract(black_box(&text)))));

    group.finish();
}

fn bench_instantiation(c: &mut Criterion) {
    let lexicon = lexicon();
    c.bench_function("pipeline_instantiation", |b| {
        b.iter(|| black_box(CaptionPipeline::new(&ExtractConfig::default(), Arc::clone(&lexicon))))
    });
}

criterion_group!(benches, bench_extraction, bench_instantiation);
criterion_main!(benches);
