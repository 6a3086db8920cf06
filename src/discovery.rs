use anyhow::{Context, Result};
use futures::stream::{Stream, StreamExt};
use glob::glob;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Configuration for caption discovery behavior
#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// Whether to fail fast on first error or continue processing
    pub fail_fast: bool,
}

/// A video and where its captions are expected to live
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoSource {
    pub video_id: String,
    pub caption_path: PathBuf,
}

/// `<dir>/<video_id>.<extension>`
pub fn caption_path(captions_dir: &Path, video_id: &str, extension: &str) -> PathBuf {
    captions_dir.join(format!("{video_id}.{extension}"))
}

/// Pair each id with its caption path, in the given order
pub fn sources_for_ids(captions_dir: &Path, video_ids: &[String], extension: &str) -> Vec<VideoSource> {
    video_ids
        .iter()
        .map(|id| VideoSource {
            video_id: id.clone(),
            caption_path: caption_path(captions_dir, id, extension),
        })
        .collect()
}

/// Load a JSON array of video ids, dropping repeats while keeping first-seen order
pub async fn load_video_ids(path: &Path) -> Result<Vec<String>> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read video id list {}", path.display()))?;
    let ids: Vec<String> = serde_json::from_str(&content)
        .with_context(|| format!("Video id list {} is not a JSON array of strings", path.display()))?;

    let mut seen = HashSet::new();
    let unique: Vec<String> = ids.into_iter().filter(|id| seen.insert(id.clone())).collect();
    info!("Loaded {} video ids from {}", unique.len(), path.display());
    Ok(unique)
}

/// Discovers every `*.<extension>` caption file directly inside `captions_dir`, in sorted order.
/// Returns an async stream of video sources.
pub fn discover_captions(
    captions_dir: impl AsRef<Path>,
    extension: &str,
    config: DiscoveryConfig,
) -> impl Stream<Item = Result<VideoSource>> {
    let root_path = captions_dir.as_ref().to_path_buf();

    // WHY: futures::stream::unfold keeps discovery lazy without an extra async-stream dependency
    futures::stream::unfold(
        DiscoveryState::new(root_path, extension.to_string(), config),
        |mut state| async move { state.next_source().map(|result| (result, state)) },
    )
}

/// Internal state for caption discovery iteration
struct DiscoveryState {
    root_dir: PathBuf,
    extension: String,
    config: DiscoveryConfig,
    glob_iter: Option<glob::Paths>,
}

impl DiscoveryState {
    fn new(root_dir: PathBuf, extension: String, config: DiscoveryConfig) -> Self {
        Self {
            root_dir,
            extension,
            config,
            glob_iter: None,
        }
    }

    fn next_source(&mut self) -> Option<Result<VideoSource>> {
        // Initialize glob iterator on first call
        if self.glob_iter.is_none() {
            let pattern = format!(
                "{}/*.{}",
                glob::Pattern::escape(&self.root_dir.display().to_string()),
                self.extension
            );
            debug!("Starting caption discovery with pattern: {}", pattern);

            match glob(&pattern) {
                Ok(paths) => self.glob_iter = Some(paths),
                Err(e) => return Some(Err(anyhow::anyhow!("Failed to create glob pattern: {}", e))),
            }
        }

        let glob_iter = self.glob_iter.as_mut()?;
        loop {
            match glob_iter.next()? {
                Ok(path) => {
                    if let Some(source) = source_from_path(path, &self.extension) {
                        debug!("Found captions for {}", source.video_id);
                        return Some(Ok(source));
                    }
                }
                Err(e) => {
                    let error_msg = format!("Glob iteration error: {e}");
                    warn!("{}", error_msg);
                    if self.config.fail_fast {
                        return Some(Err(anyhow::anyhow!(error_msg)));
                    }
                }
            }
        }
    }
}

fn source_from_path(path: PathBuf, extension: &str) -> Option<VideoSource> {
    if !path.is_file() {
        return None;
    }
    let file_name = path.file_name()?.to_str()?;
    let video_id = file_name.strip_suffix(extension)?.strip_suffix('.')?;
    if video_id.is_empty() {
        return None;
    }
    Some(VideoSource {
        video_id: video_id.to_string(),
        caption_path: path.clone(),
    })
}

/// Collect all discovered caption files into a Vec for easier processing
pub async fn collect_discovered_captions(
    captions_dir: impl AsRef<Path>,
    extension: &str,
    config: DiscoveryConfig,
) -> Result<Vec<VideoSource>> {
    let mut sources = Vec::new();
    let mut stream = Box::pin(discover_captions(captions_dir, extension, config));

    while let Some(result) = stream.next().await {
        sources.push(result?);
    }

    info!("Discovered {} caption files", sources.len());
    Ok(sources)
}
