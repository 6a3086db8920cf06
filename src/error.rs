// WHY: typed failure modes for the caption pipeline; orchestration code wraps these in anyhow

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CaptionError {
    /// Caption file absent for a video. Callers treat this as "no output", never as a failure.
    #[error("no captions for video {video_id} at {}", path.display())]
    MissingSource { video_id: String, path: PathBuf },

    /// A cue whose time-range line could not be turned into a valid span
    #[error("malformed cue at line {line}: {reason}")]
    MalformedBlock { line: usize, reason: String },

    #[error("failed to load lexicon from {}: {source}", path.display())]
    LexiconLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed lemma entry at line {line}: {content:?}")]
    MalformedLemma { line: usize, content: String },

    #[error("invalid configuration value for {key}: {message}")]
    InvalidConfig { key: String, message: String },

    #[error("character {0:?} has no label")]
    UnsupportedLabelChar(char),
}

pub type Result<T> = std::result::Result<T, CaptionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_source_display() {
        let error = CaptionError::MissingSource {
            video_id: "abc123".to_string(),
            path: PathBuf::from("/subs/abc123.en.vtt"),
        };
        assert_eq!(error.to_string(), "no captions for video abc123 at /subs/abc123.en.vtt");
    }

    #[test]
    fn test_malformed_block_display() {
        let error = CaptionError::MalformedBlock {
            line: 12,
            reason: "minutes out of range".to_string(),
        };
        assert_eq!(error.to_string(), "malformed cue at line 12: minutes out of range");
    }

    #[test]
    fn test_lexicon_load_keeps_source() {
        use std::error::Error as _;
        let error = CaptionError::LexiconLoad {
            path: PathBuf::from("lexicon.txt"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        };
        assert!(error.to_string().starts_with("failed to load lexicon from lexicon.txt"));
        assert!(error.source().is_some());
    }
}
