// WHY: Centralized abbreviation handling for sentence boundary marking
// A period after these words is almost never a sentence end, but may still close a caption line

use std::collections::HashSet;

/// Title and company abbreviations whose trailing period is marked ambiguous instead of terminal.
/// Matched case-insensitively and without the period.
pub const TITLE_ABBREVIATIONS: &[&str] = &[
    "mr", "ms", "mrs", "st", "dr", "prof", "capt", "lt", "mt", "inc", "ltd", "co", "jr", "sr",
    "gov", "esq", "hon", "rev",
];

/// "versus" forms; their period is never a boundary
pub const VERSUS_ABBREVIATIONS: &[&str] = &["v", "vs"];

/// Efficient abbreviation lookup using HashSet for O(1) performance
pub struct AbbreviationChecker {
    title_abbreviations: HashSet<&'static str>,
    versus: HashSet<&'static str>,
}

impl AbbreviationChecker {
    /// Create new abbreviation checker with default abbreviation sets
    pub fn new() -> Self {
        Self {
            title_abbreviations: TITLE_ABBREVIATIONS.iter().copied().collect(),
            versus: VERSUS_ABBREVIATIONS.iter().copied().collect(),
        }
    }

    /// Check if a letter run (no period) is a title abbreviation, ignoring case
    pub fn is_title_abbreviation(&self, word: &str) -> bool {
        self.title_abbreviations.contains(word.to_ascii_lowercase().as_str())
    }

    /// Check if a letter run is "v" or "vs", ignoring case
    pub fn is_versus(&self, word: &str) -> bool {
        self.versus.contains(word.to_ascii_lowercase().as_str())
    }
}

impl Default for AbbreviationChecker {
    fn default() -> Self {
        Self::new()
    }
}
