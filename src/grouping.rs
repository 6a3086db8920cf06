// WHY: rolling captions repeat earlier lines in every cue; grouping must drop that repetition
// before sentences are cut, otherwise each utterance would be emitted several times

use tracing::debug;

use crate::config::ExtractConfig;
use crate::cue_parser::{TextBlock, TimeSpan};

/// Several cues merged across small gaps, treated as one utterance window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeGroup {
    pub span: TimeSpan,
    pub lines: Vec<String>,
}

impl From<TextBlock> for TimeGroup {
    fn from(block: TextBlock) -> Self {
        Self {
            span: block.span,
            lines: block.lines,
        }
    }
}

impl TimeGroup {
    /// Append `block`, dropping its leading lines already present in this group when `rolling`
    pub fn absorb(&mut self, block: &TextBlock, rolling: bool) {
        let skip = if rolling {
            overlap_len(&self.lines, &block.lines)
                .map(|k| lines_through_kth_non_empty(&block.lines, k))
                .unwrap_or(0)
        } else {
            0
        };
        self.lines.extend(block.lines[skip..].iter().cloned());
        self.span = self.span.extend_to(&block.span);
    }
}

/// Merge one block into a group, returning the combined group
pub fn merge(group: &TimeGroup, block: &TextBlock, rolling: bool) -> TimeGroup {
    let mut merged = group.clone();
    merged.absorb(block, rolling);
    merged
}

/// Output of grouping one caption file
#[derive(Debug, Clone, Default)]
pub struct Grouping {
    pub groups: Vec<TimeGroup>,
    /// Whether the source was classified as rolling-overlap style
    pub rolling: bool,
}

/// Classifies overlap style and merges blocks into time groups
#[derive(Debug, Clone, Copy)]
pub struct TemporalGrouper {
    max_gap_ms: i64,
    min_overlap_fraction: f64,
}

impl TemporalGrouper {
    pub fn new(max_gap_ms: i64, min_overlap_fraction: f64) -> Self {
        Self {
            max_gap_ms,
            min_overlap_fraction,
        }
    }

    pub fn from_config(config: &ExtractConfig) -> Self {
        Self::new(config.max_gap_ms(), config.min_overlap_fraction)
    }

    /// True when enough small-gap neighbours repeat each other's lines.
    ///
    /// Only pairs with a gap strictly under the threshold are considered; with no
    /// such pairs the source is not rolling.
    pub fn uses_overlap(&self, blocks: &[TextBlock]) -> bool {
        let mut close_pairs = 0usize;
        let mut overlapping = 0usize;
        for pair in blocks.windows(2) {
            if pair[0].span.gap_ms_to(&pair[1].span) >= self.max_gap_ms {
                continue;
            }
            close_pairs += 1;
            if overlap_len(&pair[0].lines, &pair[1].lines).is_some() {
                overlapping += 1;
            }
        }
        if close_pairs == 0 {
            return false;
        }
        overlapping as f64 / close_pairs as f64 >= self.min_overlap_fraction
    }

    pub fn group(&self, blocks: Vec<TextBlock>) -> Grouping {
        let rolling = self.uses_overlap(&blocks);
        let mut groups: Vec<TimeGroup> = Vec::new();

        for block in blocks {
            match groups.last_mut() {
                Some(current) if current.span.gap_ms_to(&block.span) <= self.max_gap_ms => {
                    current.absorb(&block, rolling);
                }
                _ => groups.push(TimeGroup::from(block)),
            }
        }

        debug!(groups = groups.len(), rolling, "Grouped caption blocks");
        Grouping { groups, rolling }
    }
}

/// Number of `later`'s non-empty lines that repeat a run of `earlier`'s non-empty lines.
///
/// A candidate start is any occurrence of `later`'s first non-empty line; every following
/// pair must match until either side runs out.
pub fn overlap_len(earlier: &[String], later: &[String]) -> Option<usize> {
    let a: Vec<&str> = non_empty(earlier).collect();
    let b: Vec<&str> = non_empty(later).collect();
    let first = *b.first()?;

    a.iter()
        .enumerate()
        .filter(|(_, line)| **line == first)
        .find_map(|(start, _)| {
            let k = (a.len() - start).min(b.len());
            a[start..start + k]
                .iter()
                .zip(&b[..k])
                .all(|(x, y)| x == y)
                .then_some(k)
        })
}

fn non_empty(lines: &[String]) -> impl Iterator<Item = &str> {
    lines.iter().map(|l| l.trim()).filter(|l| !l.is_empty())
}

// Index just past the k-th non-empty line; blank lines after it stay in the output
fn lines_through_kth_non_empty(lines: &[String], k: usize) -> usize {
    let mut seen = 0;
    for (idx, line) in lines.iter().enumerate() {
        if !line.trim().is_empty() {
            seen += 1;
            if seen == k {
                return idx + 1;
            }
        }
    }
    lines.len()
}
