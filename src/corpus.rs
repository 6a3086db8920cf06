// WHY: post-extraction corpus handling consumed by training code: word-count cleaning,
// id lookup, character label encoding and numbered listings

use anyhow::{Context, Result};
use std::path::Path;

use crate::error::CaptionError;

/// Output alphabet for label sequences; `^` and `$` mark sequence start and end
pub const LABEL_ALPHABET: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz ^$";

/// Keep sentences whose space-separated word count lies in `[min_words, max_words]`
pub fn filter_by_word_count<'a, I>(sentences: I, min_words: usize, max_words: usize) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    sentences
        .into_iter()
        .filter(|s| {
            let words = s.split(' ').count();
            (min_words..=max_words).contains(&words)
        })
        .map(str::to_string)
        .collect()
}

/// `"{index:<3}: {sentence}"` lines, numbered from 1
pub fn number_sentences<'a, I>(sentences: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a str>,
{
    sentences
        .into_iter()
        .enumerate()
        .map(|(i, s)| format!("{:<3}: {}", i + 1, s.trim()))
        .collect()
}

/// Encode `^sentence$` as indices into [`LABEL_ALPHABET`]
pub fn as_labels(sentence: &str) -> Result<Vec<usize>, CaptionError> {
    std::iter::once('^')
        .chain(sentence.chars())
        .chain(std::iter::once('$'))
        .map(|c| label_index(c).ok_or(CaptionError::UnsupportedLabelChar(c)))
        .collect()
}

fn label_index(c: char) -> Option<usize> {
    LABEL_ALPHABET.find(c).filter(|_| c.is_ascii())
}

/// Keep only characters of the label alphabet
pub fn strip_to_label_alphabet(sentence: &str) -> String {
    sentence.chars().filter(|&c| label_index(c).is_some()).collect()
}

/// Cleaned sentence list addressed by line index
#[derive(Debug, Clone, Default)]
pub struct SentenceStore {
    sentences: Vec<String>,
}

impl SentenceStore {
    pub fn from_text(content: &str) -> Self {
        Self {
            sentences: content.lines().map(str::to_string).collect(),
        }
    }

    pub async fn load(path: &Path) -> Result<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read sentence file {}", path.display()))?;
        Ok(Self::from_text(&content))
    }

    /// Sentence at `id`, optionally reduced to letters and spaces
    pub fn from_id(&self, id: usize, remove_punctuation: bool) -> Option<String> {
        let sentence = self.sentences.get(id)?;
        Some(if remove_punctuation {
            strip_to_label_alphabet(sentence)
        } else {
            sentence.clone()
        })
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_count_bounds_inclusive() {
        let input = ["one two", "one two three", "a b c d e", "a b c d e f"];
        let kept = filter_by_word_count(input, 3, 5);
        assert_eq!(kept, vec!["one two three", "a b c d e"]);
    }

    #[test]
    fn test_numbering_format() {
        let numbered = number_sentences(["First.", "Second."]);
        assert_eq!(numbered, vec!["1  : First.", "2  : Second."]);
    }

    #[test]
    fn test_labels_wrap_sentence() {
        let labels = as_labels("Hi a").unwrap();
        assert_eq!(labels, vec![53, 7, 34, 52, 26, 54]);
    }

    #[test]
    fn test_labels_reject_punctuation() {
        let err = as_labels("Hi.").unwrap_err();
        assert!(matches!(err, CaptionError::UnsupportedLabelChar('.')));
    }

    #[test]
    fn test_store_lookup() {
        let store = SentenceStore::from_text("Hello, world.\nIt's 5 o'clock.\n");
        assert_eq!(store.len(), 2);
        assert_eq!(store.from_id(0, false).as_deref(), Some("Hello, world."));
        assert_eq!(store.from_id(1, true).as_deref(), Some("Its  oclock"));
        assert!(store.from_id(2, true).is_none());
    }
}
