// WHY: one place for the grouping thresholds and corpus bounds shared by CLI, library and tests

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::CaptionError;

/// Tunables for caption grouping and downstream cleaning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Largest gap (seconds) between cues still treated as one continuous window
    pub max_gap_seconds: f64,
    /// Share of small-gap cue pairs that must overlap for a source to count as rolling-style
    pub min_overlap_fraction: f64,
    /// Lower word-count bound applied by the `clean` stage
    pub min_words: usize,
    /// Upper word-count bound applied by the `clean` stage
    pub max_words: usize,
    /// Caption file extension, without the leading dot
    pub caption_extension: String,
    /// Video ids whose captions are known to be garbage
    pub skip_videos: Vec<String>,
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            max_gap_seconds: 0.3,
            min_overlap_fraction: 0.5,
            min_words: 3,
            max_words: 15,
            caption_extension: "en.vtt".to_string(),
            skip_videos: Vec::new(),
        }
    }
}

impl ExtractConfig {
    /// Parse a TOML document; missing keys keep their defaults
    pub fn from_toml_str(content: &str) -> anyhow::Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            anyhow::anyhow!("Failed to read config {}: {}", path.display(), e)
        })?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), CaptionError> {
        if !self.max_gap_seconds.is_finite() || self.max_gap_seconds < 0.0 {
            return Err(CaptionError::InvalidConfig {
                key: "max_gap_seconds".to_string(),
                message: format!("must be a non-negative number, got {}", self.max_gap_seconds),
            });
        }
        if !(0.0..=1.0).contains(&self.min_overlap_fraction) {
            return Err(CaptionError::InvalidConfig {
                key: "min_overlap_fraction".to_string(),
                message: format!("must lie in [0, 1], got {}", self.min_overlap_fraction),
            });
        }
        if self.min_words > self.max_words {
            return Err(CaptionError::InvalidConfig {
                key: "min_words".to_string(),
                message: format!("{} exceeds max_words {}", self.min_words, self.max_words),
            });
        }
        Ok(())
    }

    /// Gap threshold in whole milliseconds, the unit cue timestamps are stored in
    pub fn max_gap_ms(&self) -> i64 {
        (self.max_gap_seconds * 1000.0).round() as i64
    }

    pub fn is_skipped(&self, video_id: &str) -> bool {
        self.skip_videos.iter().any(|v| v == video_id)
    }
}
