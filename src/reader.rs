use anyhow::Result;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};

/// Configuration for caption reading behavior
#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Whether an unreadable (present but broken) caption file aborts the run
    pub fail_fast: bool,
    /// Buffer size for async reading (default: 8KB)
    pub buffer_size: usize,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            fail_fast: false,
            buffer_size: 8192, // WHY: 8KB is optimal for most filesystems and network storage
        }
    }
}

/// Statistics for one caption read
#[derive(Debug, Clone, Default)]
pub struct ReadStats {
    pub file_path: String,
    pub lines_read: u64,
    pub bytes_read: u64,
    pub duration_ms: u64,
    /// File absent: the normal "no captions" case, not an error
    pub missing: bool,
    pub read_error: Option<String>,
}

/// Async caption file reader
pub struct CaptionReader {
    config: ReaderConfig,
}

impl CaptionReader {
    pub fn new(config: ReaderConfig) -> Self {
        Self { config }
    }

    /// Read a caption file line-by-line with buffered async I/O.
    ///
    /// Returns `None` content when the file does not exist, or when it cannot be read and
    /// `fail_fast` is off; the stats say which.
    pub async fn read_captions<P: AsRef<Path>>(&self, file_path: P) -> Result<(Option<String>, ReadStats)> {
        let path = file_path.as_ref();
        let start_time = std::time::Instant::now();
        let mut stats = ReadStats {
            file_path: path.display().to_string(),
            ..Default::default()
        };

        let file = match File::open(path).await {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No captions at {}", path.display());
                stats.missing = true;
                return Ok((None, stats));
            }
            Err(e) => {
                let error_msg = format!("Failed to open caption file {}: {}", path.display(), e);
                return self.fail(error_msg, stats);
            }
        };

        // WHY: BufReader with custom buffer size reduces syscalls and improves throughput
        let reader = BufReader::with_capacity(self.config.buffer_size, file);
        let mut lines = reader.lines();
        let mut content = String::new();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    stats.bytes_read += line.len() as u64 + 1; // +1 for newline
                    stats.lines_read += 1;
                    content.push_str(&line);
                    content.push('\n');
                }
                Ok(None) => break,
                Err(e) => {
                    let error_msg = format!(
                        "UTF-8 decoding error in {} at line {}: {}",
                        path.display(),
                        stats.lines_read + 1,
                        e
                    );
                    stats.duration_ms = start_time.elapsed().as_millis() as u64;
                    return self.fail(error_msg, stats);
                }
            }
        }

        stats.duration_ms = start_time.elapsed().as_millis() as u64;
        debug!(
            "Read {}: {} lines, {} bytes in {}ms",
            path.display(),
            stats.lines_read,
            stats.bytes_read,
            stats.duration_ms
        );
        Ok((Some(content), stats))
    }

    fn fail(&self, error_msg: String, mut stats: ReadStats) -> Result<(Option<String>, ReadStats)> {
        warn!("{}", error_msg);
        if self.config.fail_fast {
            return Err(anyhow::anyhow!(error_msg));
        }
        stats.read_error = Some(error_msg);
        Ok((None, stats))
    }
}

/// Convenience function for reading a single caption file with default configuration
pub async fn read_captions_async<P: AsRef<Path>>(file_path: P) -> Result<Option<String>> {
    let reader = CaptionReader::new(ReaderConfig::default());
    let (content, _stats) = reader.read_captions(file_path).await?;
    Ok(content)
}
