// WHY: one writer owns the output file so per-video batches land whole and in input order

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};
use tokio::io::{AsyncWriteExt, BufWriter};

/// How sentences are laid out in the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One sentence per line, nothing else
    #[default]
    Plain,
    /// Each video's id on its own line, followed by its sentences indented with a tab
    Annotated,
}

/// Append-only sentence sink
pub struct SentenceSink {
    path: PathBuf,
    mode: OutputMode,
    writer: BufWriter<File>,
    sentences_written: u64,
}

impl SentenceSink {
    /// Create (truncating) the output file
    pub async fn create(path: &Path, mode: OutputMode) -> Result<Self> {
        let file = File::create(path)
            .await
            .with_context(|| format!("Failed to create output file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            mode,
            writer: BufWriter::new(file),
            sentences_written: 0,
        })
    }

    /// Write one video's sentences as a single batch
    pub async fn write_video(&mut self, video_id: &str, sentences: &[String]) -> Result<()> {
        let mut batch = String::new();
        match self.mode {
            OutputMode::Plain => {
                for sentence in sentences {
                    batch.push_str(sentence);
                    batch.push('\n');
                }
            }
            OutputMode::Annotated => {
                batch.push_str(video_id);
                batch.push('\n');
                for sentence in sentences {
                    batch.push('\t');
                    batch.push_str(sentence);
                    batch.push('\n');
                }
            }
        }
        self.writer
            .write_all(batch.as_bytes())
            .await
            .with_context(|| format!("Failed to write to {}", self.path.display()))?;
        self.sentences_written += sentences.len() as u64;
        Ok(())
    }

    pub fn sentences_written(&self) -> u64 {
        self.sentences_written
    }

    /// Flush buffered output; returns the number of sentences written
    pub async fn finish(mut self) -> Result<u64> {
        self.writer
            .flush()
            .await
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        Ok(self.sentences_written)
    }
}

/// Write lines to a file, replacing its contents
pub async fn write_lines(path: &Path, lines: &[String]) -> Result<()> {
    let file = File::create(path)
        .await
        .with_context(|| format!("Failed to create {}", path.display()))?;
    write_all_lines(BufWriter::new(file), lines).await
}

/// Append lines to a file, creating it if needed
pub async fn append_lines(path: &Path, lines: &[String]) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .with_context(|| format!("Failed to open {} for appending", path.display()))?;
    write_all_lines(BufWriter::new(file), lines).await
}

async fn write_all_lines(mut writer: BufWriter<File>, lines: &[String]) -> Result<()> {
    for line in lines {
        writer.write_all(line.as_bytes()).await?;
        writer.write_all(b"\n").await?;
    }
    writer.flush().await?;
    Ok(())
}
