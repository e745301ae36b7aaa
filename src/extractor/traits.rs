use crate::extractor::format::FormatProfile;
use crate::extractor::models::{PlaylistEntry, VideoInfo};
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Core trait for the media extraction backend
///
/// This trait isolates the pipeline from the specific extraction method
/// (yt-dlp subprocess, an in-memory double in tests, ...).
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Returns a unique identifier for this extractor (e.g., "ytdlp")
    fn id(&self) -> &'static str;

    /// Extracts video information without downloading anything
    async fn extract_info(&self, url: &str) -> Result<VideoInfo>;

    /// Lists the entries of a playlist, metadata only
    async fn extract_playlist(&self, url: &str) -> Result<Vec<PlaylistEntry>>;

    /// Downloads a single item into `output_dir` using `profile`
    async fn download(&self, url: &str, profile: &FormatProfile, output_dir: &Path) -> Result<()>;
}
