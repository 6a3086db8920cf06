pub mod config;
pub mod corpus;
pub mod cue_parser;
pub mod discovery;
pub mod error;
pub mod grouping;
pub mod lexicon;
pub mod output;
pub mod parallel_processing;
pub mod pipeline;
pub mod reader;
pub mod sentence_detector;

// Re-export main types for convenient access
pub use config::ExtractConfig;
pub use cue_parser::{CueParser, ParsedCaptions, TextBlock, TimeSpan, Timestamp};
pub use error::CaptionError;
pub use grouping::{TemporalGrouper, TimeGroup};
pub use lexicon::Lexicon;
pub use pipeline::{CaptionPipeline, VideoExtraction};
pub use sentence_detector::{GroupExtraction, SentenceExtractor};

// Re-export driver types used by the binary and benchmarks
pub use discovery::{caption_path, collect_discovered_captions, load_video_ids, sources_for_ids, VideoSource};
pub use output::{OutputMode, SentenceSink};
pub use parallel_processing::{process_videos, ProcessingConfig, RunStats, VideoStats, VideoStatus};
