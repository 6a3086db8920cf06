// Tests for the public lexicon and corpus helpers used around the extraction core
// WHY: Public API functions must be tested to ensure they work correctly for external users

use capsplit::corpus::{as_labels, filter_by_word_count, number_sentences, SentenceStore, LABEL_ALPHABET};
use capsplit::output::{append_lines, write_lines};
use capsplit::{caption_path, Lexicon};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_lexicon_build_and_round_trip_through_file() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let words = temp_dir.path().join("words.txt");
    let lemmas = temp_dir.path().join("lemmas.txt");
    std::fs::write(&words, "run\nwalk\nrun\n\n").unwrap();
    std::fs::write(&lemmas, "run -> runs,running,ran\nswim -> swims\n").unwrap();

    let lexicon = Lexicon::build_from_files(&words, &lemmas).expect("Lexicon should build");
    let order: Vec<&str> = lexicon.iter().collect();
    assert_eq!(order, vec!["run", "runs", "running", "ran", "walk"]);
    assert!(!lexicon.contains("swims"));

    let written = temp_dir.path().join("lexicon.txt");
    std::fs::write(&written, lexicon.to_file_contents()).unwrap();
    let reloaded = Lexicon::load(&written).expect("Lexicon should reload");
    assert_eq!(reloaded.iter().collect::<Vec<_>>(), order);
}

#[test]
fn test_caption_lookup_pattern() {
    assert_eq!(
        caption_path(Path::new("data/subs"), "dQw4w9WgXcQ", "en.vtt"),
        Path::new("data/subs/dQw4w9WgXcQ.en.vtt")
    );
}

#[test]
fn test_clean_then_label() {
    let sentences = ["Yes.", "So it was good.", "We went home and then it was a very long day indeed."];
    let kept = filter_by_word_count(sentences, 3, 10);
    assert_eq!(kept, vec!["So it was good."]);

    let store = SentenceStore::from_text(&kept.join("\n"));
    let bare = store.from_id(0, true).expect("Sentence 0 exists");
    assert_eq!(bare, "So it was good");

    let labels = as_labels(&bare).expect("Letters and spaces always encode");
    assert_eq!(labels.len(), bare.len() + 2);
    assert_eq!(labels.first(), Some(&LABEL_ALPHABET.find('^').unwrap()));
    assert_eq!(labels.last(), Some(&LABEL_ALPHABET.find('$').unwrap()));
    assert!(as_labels("So it was good.").is_err());
}

#[tokio::test]
async fn test_numbered_listing_appends() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let listing = temp_dir.path().join("numbered.txt");

    write_lines(&listing, &number_sentences(["First."])).await.unwrap();
    append_lines(&listing, &number_sentences(["Second.", "Third."])).await.unwrap();

    let content = tokio::fs::read_to_string(&listing).await.unwrap();
    assert_eq!(content, "1  : First.\n1  : Second.\n2  : Third.\n");
}

#[tokio::test]
async fn test_sentence_store_load() {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let path = temp_dir.path().join("clean.txt");
    tokio::fs::write(&path, "One two three.\nFour five six.\n").await.unwrap();

    let store = SentenceStore::load(&path).await.unwrap();
    assert_eq!(store.len(), 2);
    assert_eq!(store.from_id(1, false).as_deref(), Some("Four five six."));
    assert!(SentenceStore::load(&temp_dir.path().join("absent.txt")).await.is_err());
}
