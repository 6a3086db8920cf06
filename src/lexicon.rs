// WHY: known word forms drive casing repair and capitalized-start detection; built once, shared read-only

use std::collections::{HashMap, HashSet};
use std::path::Path;

use tracing::info;

use crate::error::{CaptionError, Result};

/// Immutable set of known word forms.
///
/// Insertion order is kept so a rebuilt lexicon file is reproducible; membership
/// is the only query the extraction stages make.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    words: HashSet<String>,
    order: Vec<String>,
}

impl Lexicon {
    /// Build from any word sequence, skipping empties and duplicates
    pub fn from_words<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut lexicon = Self::default();
        for word in words {
            lexicon.insert(word.into());
        }
        lexicon
    }

    /// Merge a base vocabulary with a lemma map of `base -> infl1,infl2,...` lines.
    ///
    /// Each base word is followed by its inflections, so related forms stay adjacent
    /// in the written lexicon.
    pub fn build(base_words: &str, lemma_map: &str) -> Result<Self> {
        let lemmas = parse_lemma_map(lemma_map)?;
        let mut lexicon = Self::default();

        for word in base_words.lines().map(str::trim) {
            if word.is_empty() || lexicon.contains(word) {
                continue;
            }
            lexicon.insert(word.to_string());
            if let Some(inflections) = lemmas.get(word) {
                for inflection in inflections {
                    lexicon.insert(inflection.clone());
                }
            }
        }

        info!(
            words = lexicon.len(),
            lemmas = lemmas.len(),
            "Built lexicon from word list and lemma map"
        );
        Ok(lexicon)
    }

    /// Load a prebuilt lexicon: one word per line, empty lines ignored
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CaptionError::LexiconLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let lexicon = Self::from_words(content.lines().map(str::trim).filter(|w| !w.is_empty()));
        info!(path = %path.display(), words = lexicon.len(), "Loaded lexicon");
        Ok(lexicon)
    }

    /// Build from the two source word lists on disk
    pub fn build_from_files(words_path: &Path, lemmas_path: &Path) -> Result<Self> {
        let read = |path: &Path| {
            std::fs::read_to_string(path).map_err(|source| CaptionError::LexiconLoad {
                path: path.to_path_buf(),
                source,
            })
        };
        Self::build(&read(words_path)?, &read(lemmas_path)?)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Words in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Render as one word per line, trailing newline included
    pub fn to_file_contents(&self) -> String {
        let mut out = String::with_capacity(self.order.iter().map(|w| w.len() + 1).sum());
        for word in &self.order {
            out.push_str(word);
            out.push('\n');
        }
        out
    }

    fn insert(&mut self, word: String) {
        if word.is_empty() || self.words.contains(&word) {
            return;
        }
        self.words.insert(word.clone());
        self.order.push(word);
    }
}

fn parse_lemma_map(content: &str) -> Result<HashMap<String, Vec<String>>> {
    let mut lemmas = HashMap::new();
    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let Some((base, inflections)) = line.split_once(" -> ") else {
            return Err(CaptionError::MalformedLemma {
                line: idx + 1,
                content: line.to_string(),
            });
        };
        let inflections = inflections
            .split(',')
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .map(str::to_string)
            .collect();
        lemmas.insert(base.trim().to_string(), inflections);
    }
    Ok(lemmas)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_build_appends_inflections_after_base() {
        let lexicon = Lexicon::build("run\nwalk\nrun\n", "run -> runs,running,ran\n").unwrap();
        let words: Vec<&str> = lexicon.iter().collect();
        assert_eq!(words, vec!["run", "runs", "running", "ran", "walk"]);
        assert!(lexicon.contains("ran"));
        assert!(!lexicon.contains("walked"));
    }

    #[test]
    fn test_build_deduplicates_inflections() {
        let lexicon = Lexicon::build("be\nis\n", "be -> is,was,is\n").unwrap();
        let words: Vec<&str> = lexicon.iter().collect();
        assert_eq!(words, vec!["be", "is", "was"]);
    }

    #[test]
    fn test_malformed_lemma_line_reports_position() {
        let err = Lexicon::build("run\n", "run -> ran\nbroken line\n").unwrap_err();
        match err {
            CaptionError::MalformedLemma { line, content } => {
                assert_eq!(line, 2);
                assert_eq!(content, "broken line");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_load_round_trips_written_contents() {
        let lexicon = Lexicon::from_words(["this", "is", "a", "test", "NASA"]);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(lexicon.to_file_contents().as_bytes()).unwrap();

        let loaded = Lexicon::load(file.path()).unwrap();
        assert_eq!(loaded.len(), 5);
        assert!(loaded.contains("NASA"));
        assert!(!loaded.contains("nasa"));
    }

    #[test]
    fn test_load_missing_file_is_lexicon_error() {
        let err = Lexicon::load(Path::new("/nonexistent/lexicon.txt")).unwrap_err();
        assert!(matches!(err, CaptionError::LexiconLoad { .. }));
    }
}
