// WHY: Main extractor interface; runs normalization, marking, placement and rendering for one
// time group, then the casing and filter stages, with the lexicon passed in explicitly

use std::sync::Arc;

use anyhow::Result;
use tracing::trace;

use crate::grouping::TimeGroup;
use crate::lexicon::Lexicon;

pub mod abbreviations;
pub mod cascade;
pub mod casing;
pub mod normalization;
pub mod tagger;
pub mod tokens;

// Re-export core types
pub use abbreviations::AbbreviationChecker;
pub use cascade::{place, FragmentContext, Placement, PLACEMENT_RULES};
pub use casing::{is_good_sentence, normalize_casing};
pub use normalization::{collapse_whitespace, LineNormalizer};
pub use tagger::SentenceTagger;
pub use tokens::{Marker, Quote, Token, TokenBuf};

/// Everything extracted from one time group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupExtraction {
    /// Final sentences: cased and filtered
    pub sentences: Vec<String>,
    /// URLs removed from the group's text, in order of appearance
    pub urls: Vec<String>,
    /// Sentences dropped because they carried a discard flag
    pub discarded: usize,
}

/// Caption-group sentence extractor
pub struct SentenceExtractor {
    normalizer: LineNormalizer,
    tagger: SentenceTagger,
    lexicon: Arc<Lexicon>,
}

impl SentenceExtractor {
    /// Compile the normalizer patterns and bind the shared lexicon
    pub fn new(lexicon: Arc<Lexicon>) -> Result<Self> {
        Ok(Self {
            normalizer: LineNormalizer::new()?,
            tagger: SentenceTagger::new(),
            lexicon,
        })
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    /// Cased, filtered sentences for one group
    pub fn extract_group(&self, group: &TimeGroup) -> Vec<String> {
        self.extract_group_detailed(group).sentences
    }

    /// Sentences plus the URLs and discard count recorded along the way
    pub fn extract_group_detailed(&self, group: &TimeGroup) -> GroupExtraction {
        let (tokens, urls) = self.normalizer.normalize_group(&group.lines);
        let (raw, discarded) = self.sentences_from_tokens(&tokens);

        let sentences = raw
            .iter()
            .map(|s| normalize_casing(s, &self.lexicon))
            .filter(|s| is_good_sentence(s))
            .collect();

        GroupExtraction {
            sentences,
            urls,
            discarded,
        }
    }

    /// Raw (uncased, unfiltered) sentences for a list of caption lines
    pub fn raw_sentences(&self, lines: &[String]) -> Vec<String> {
        let (tokens, _) = self.normalizer.normalize_group(lines);
        self.sentences_from_tokens(&tokens).0
    }

    fn sentences_from_tokens(&self, tokens: &[Token]) -> (Vec<String>, usize) {
        let fragments = self.tagger.fragments(tokens);
        let assembled = self.assemble(&fragments);

        let mut discarded = 0;
        let mut sentences = Vec::with_capacity(assembled.len());
        for sentence in &assembled {
            match render(sentence) {
                Rendered::Text(text) => sentences.push(text),
                Rendered::Discarded => discarded += 1,
                Rendered::Empty => {}
            }
        }
        (sentences, discarded)
    }

    /// Place each fragment with the rule cascade, producing sentence token buffers
    pub fn assemble(&self, fragments: &[TokenBuf]) -> Vec<TokenBuf> {
        let mut sentences = Vec::new();
        let mut current: Option<TokenBuf> = None;

        for (idx, raw) in fragments.iter().enumerate() {
            let mut fragment = raw.clone();
            cascade::screen_interior_placeholder(&mut fragment);

            let ctx = FragmentContext {
                fragment: raw,
                previous: idx.checked_sub(1).map(|p| fragments[p].as_slice()),
                lexicon: &self.lexicon,
            };
            let (placement, rule) = place(&ctx);
            trace!(fragment = idx, rule, "Placed fragment");

            match placement {
                Placement::Start => {
                    sentences.extend(current.take());
                    current = Some(fragment);
                }
                Placement::Append | Placement::MergeDiscarded => {
                    if placement == Placement::MergeDiscarded {
                        fragment.insert(0, Token::Mark(Marker::Discard));
                    }
                    match current.as_mut() {
                        Some(sentence) => {
                            sentence.push(Token::Char(' '));
                            sentence.extend(fragment);
                        }
                        None => current = Some(fragment),
                    }
                }
            }
        }
        sentences.extend(current);
        sentences
    }
}

enum Rendered {
    Text(String),
    Discarded,
    Empty,
}

// Number and punctuation markers print their literal text; every other marker vanishes
fn render(sentence: &[Token]) -> Rendered {
    if sentence.iter().any(|t| t.is_mark(Marker::Discard)) {
        return Rendered::Discarded;
    }
    let mut text = String::with_capacity(sentence.len());
    for token in sentence {
        match *token {
            Token::Char(c) => text.push(c),
            Token::Mark(m) => {
                if let Some(literal) = m.rendered() {
                    text.push_str(literal);
                }
            }
        }
    }
    let collapsed = collapse_whitespace(&text);
    let trimmed = collapsed.trim();
    if trimmed.is_empty() {
        Rendered::Empty
    } else {
        Rendered::Text(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cue_parser::{TimeSpan, Timestamp};
    use std::sync::OnceLock;

    // WHY: Single shared extractor instance reduces regex compilation across tests
    static SHARED_EXTRACTOR: OnceLock<SentenceExtractor> = OnceLock::new();

    fn extractor() -> &'static SentenceExtractor {
        SHARED_EXTRACTOR.get_or_init(|| {
            let lexicon = Lexicon::from_words([
                "hello", "world", "this", "is", "a", "test", "speaking", "we", "went", "home", "he",
                "said", "then", "yes", "no", "so", "the", "and", "it", "was", "good", "great",
            ]);
            SentenceExtractor::new(Arc::new(lexicon)).unwrap()
        })
    }

    fn group(lines: &[&str]) -> TimeGroup {
        TimeGroup {
            span: TimeSpan::new(Timestamp(0), Timestamp(1000)).unwrap(),
            lines: lines.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn extract(lines: &[&str]) -> Vec<String> {
        extractor().extract_group(&group(lines))
    }

    #[test]
    fn test_title_abbreviation_does_not_split() {
        assert_eq!(
            extract(&["Hello, world.", "This is Dr. Smith speaking."]),
            vec!["Hello, world.", "This is Dr. Smith speaking."]
        );
    }

    #[test]
    fn test_all_caps_group_recased() {
        assert_eq!(extract(&["THIS IS A TEST"]), vec!["This is a test"]);
    }

    #[test]
    fn test_bracket_only_line_yields_nothing() {
        assert!(extract(&["[Laughter]"]).is_empty());
    }

    #[test]
    fn test_line_break_alone_is_not_a_boundary() {
        assert_eq!(extract(&["we went", "home."]), vec!["we went home."]);
    }

    #[test]
    fn test_capitalized_common_word_starts_sentence() {
        assert_eq!(
            extract(&["so it was good...", "Then we went home."]),
            vec!["so it was good...", "Then we went home."]
        );
        // Unknown capitalized word reads as a name and stays in the sentence
        assert_eq!(
            extract(&["so it was good...", "Smith went home."]),
            vec!["so it was good... Smith went home."]
        );
    }

    #[test]
    fn test_speaker_change_starts_sentence() {
        assert_eq!(
            extract(&["it was good -", "BOB: yes it was."]),
            vec!["it was good", "yes it was."]
        );
    }

    #[test]
    fn test_trailing_comma_joins_next_fragment() {
        assert_eq!(
            extract(&["it was good, -", "Then we went home."]),
            vec!["it was good, - Then we went home."]
        );
    }

    #[test]
    fn test_speaker_after_comma_is_discarded() {
        let detailed = extractor().extract_group_detailed(&group(&["it was good, -", "BOB: yes it was."]));
        assert!(detailed.sentences.is_empty());
        assert_eq!(detailed.discarded, 1);
    }

    #[test]
    fn test_unterminated_quote_discards_sentence() {
        let detailed = extractor().extract_group_detailed(&group(&["he said \"stop\" then"]));
        assert!(detailed.sentences.is_empty());
        assert_eq!(detailed.discarded, 1);
    }

    #[test]
    fn test_interior_placeholder_discards_sentence() {
        let detailed = extractor().extract_group_detailed(&group(&["it was # good."]));
        assert!(detailed.sentences.is_empty());
        assert_eq!(detailed.discarded, 1);
    }

    #[test]
    fn test_urls_recovered() {
        let detailed = extractor().extract_group_detailed(&group(&["Hello.", "see www.example.com"]));
        assert_eq!(detailed.urls, vec!["www.example.com"]);
        assert_eq!(detailed.sentences, vec!["Hello.", "see"]);
    }

    #[test]
    fn test_rendered_markers_do_not_leak() {
        let sentences = extract(&[
            "He said 1,000 people... wait - the U.S. team (cheering) won 3.5 to 2.",
            "* music * So it was great, Mr. Smith.",
        ]);
        assert!(!sentences.is_empty());
        for sentence in &sentences {
            assert!(
                sentence.chars().all(normalization::is_kept_char),
                "unexpected character in {sentence:?}"
            );
            assert!(!sentence.contains("  "));
            assert!(is_good_sentence(sentence));
        }
    }
}
