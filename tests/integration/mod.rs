// Integration test utilities and common code
// WHY: Centralized utilities avoid duplication across integration tests

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Test fixture with a captions directory and scratch space for lexicon, id list and output
pub struct TestFixture {
    pub temp_dir: TempDir,
    pub root_path: PathBuf,
    pub captions_dir: PathBuf,
}

impl TestFixture {
    /// Create a new test fixture with temporary directory
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let root_path = temp_dir.path().to_path_buf();
        let captions_dir = root_path.join("captions");
        fs::create_dir_all(&captions_dir).expect("Failed to create captions directory");

        Self {
            temp_dir,
            root_path,
            captions_dir,
        }
    }

    /// Write `<captions_dir>/<video_id>.en.vtt`
    pub fn create_captions(&self, video_id: &str, content: &str) -> PathBuf {
        self.create_file(self.captions_dir.join(format!("{video_id}.en.vtt")), content.as_bytes())
    }

    /// Write raw bytes under the fixture root
    pub fn create_file<P: AsRef<Path>>(&self, path: P, content: &[u8]) -> PathBuf {
        let file_path = self.root_path.join(path);
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        fs::write(&file_path, content).expect("Failed to write test file");
        file_path
    }

    /// One word per line
    pub fn create_lexicon(&self, words: &[&str]) -> PathBuf {
        let mut content = words.join("\n");
        content.push('\n');
        self.create_file("lexicon.txt", content.as_bytes())
    }

    /// JSON array of ids
    pub fn create_video_ids(&self, ids: &[&str]) -> PathBuf {
        let json = serde_json::to_string(ids).expect("Failed to encode id list");
        self.create_file("video_ids.json", json.as_bytes())
    }

    pub fn output_path(&self) -> PathBuf {
        self.root_path.join("sentences.txt")
    }

    pub fn read_output(&self) -> String {
        fs::read_to_string(self.output_path()).expect("Failed to read output file")
    }
}

/// Compare two strings line by line, providing detailed diff on mismatch
pub fn assert_golden_file(actual: &str, expected: &str, context: &str) {
    let actual_lines: Vec<&str> = actual.lines().collect();
    let expected_lines: Vec<&str> = expected.lines().collect();

    if actual_lines.len() != expected_lines.len() {
        panic!(
            "{}: Line count mismatch. Expected {} lines, got {} lines\nActual:\n{}",
            context,
            expected_lines.len(),
            actual_lines.len(),
            actual
        );
    }

    for (i, (actual_line, expected_line)) in actual_lines.iter().zip(expected_lines.iter()).enumerate() {
        if actual_line != expected_line {
            panic!(
                "{}: Line {} mismatch\nExpected: {}\nActual:   {}",
                context,
                i + 1,
                expected_line,
                actual_line
            );
        }
    }
}
