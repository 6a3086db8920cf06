// WHY: single entry point for one caption file; owns the compiled stages so the driver only
// deals with text in and sentences out

use std::sync::Arc;

use anyhow::Result;
use tracing::debug;

use crate::config::ExtractConfig;
use crate::cue_parser::CueParser;
use crate::grouping::TemporalGrouper;
use crate::lexicon::Lexicon;
use crate::sentence_detector::SentenceExtractor;

/// Sentences and bookkeeping for one caption file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoExtraction {
    pub sentences: Vec<String>,
    pub blocks: usize,
    pub malformed_blocks: usize,
    pub groups: usize,
    pub rolling: bool,
    pub urls: Vec<String>,
    pub discarded: usize,
}

/// Cue parsing, grouping and sentence extraction for whole caption files
pub struct CaptionPipeline {
    parser: CueParser,
    grouper: TemporalGrouper,
    extractor: SentenceExtractor,
}

impl CaptionPipeline {
    pub fn new(config: &ExtractConfig, lexicon: Arc<Lexicon>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            parser: CueParser::new()?,
            grouper: TemporalGrouper::from_config(config),
            extractor: SentenceExtractor::new(lexicon)?,
        })
    }

    /// Sentences for one caption file, in order of appearance
    pub fn extract(&self, caption_text: &str) -> Vec<String> {
        self.extract_detailed(caption_text).sentences
    }

    pub fn extract_detailed(&self, caption_text: &str) -> VideoExtraction {
        let parsed = self.parser.parse(caption_text);
        let blocks = parsed.blocks.len();
        let grouping = self.grouper.group(parsed.blocks);

        let mut result = VideoExtraction {
            blocks,
            malformed_blocks: parsed.malformed_blocks,
            groups: grouping.groups.len(),
            rolling: grouping.rolling,
            ..Default::default()
        };
        for group in &grouping.groups {
            let extraction = self.extractor.extract_group_detailed(group);
            result.sentences.extend(extraction.sentences);
            result.urls.extend(extraction.urls);
            result.discarded += extraction.discarded;
        }

        debug!(
            blocks = result.blocks,
            groups = result.groups,
            rolling = result.rolling,
            sentences = result.sentences.len(),
            "Extracted sentences from caption text"
        );
        result
    }

    pub fn extractor(&self) -> &SentenceExtractor {
        &self.extractor
    }
}
