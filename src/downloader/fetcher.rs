//! Single-item download with a size ceiling

use crate::downloader::scratch::ScratchDir;
use crate::extractor::{Extractor, FormatProfile};
use crate::utils::config::DownloadFormat;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// A downloaded file waiting to be delivered
#[derive(Debug)]
pub struct DownloadResult {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub source_url: String,
    pub title: String,
    scratch: ScratchDir,
}

impl DownloadResult {
    /// Delete the file, then its scratch directory if nothing else is in it
    pub async fn cleanup(self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
        if !self.scratch.remove_if_empty().await? {
            warn!(
                "Scratch dir {} not empty after cleanup, leaving it",
                self.scratch.path().display()
            );
        }
        Ok(())
    }
}

/// Downloads one item into its own scratch directory
#[derive(Clone)]
pub struct MediaFetcher {
    extractor: Arc<dyn Extractor>,
    scratch_root: PathBuf,
}

impl MediaFetcher {
    pub fn new(extractor: Arc<dyn Extractor>, scratch_root: impl Into<PathBuf>) -> Self {
        Self {
            extractor,
            scratch_root: scratch_root.into(),
        }
    }

    /// Download `item_url`, or `None` if it failed or came out larger than `max_size_mb`.
    ///
    /// Whenever `None` is returned the scratch directory has already been removed.
    pub async fn fetch(
        &self,
        item_url: &str,
        format: DownloadFormat,
        max_size_mb: f64,
    ) -> Option<DownloadResult> {
        let scratch = match ScratchDir::create(&self.scratch_root).await {
            Ok(scratch) => scratch,
            Err(e) => {
                error!("Error downloading {}: {:#}", item_url, e);
                return None;
            }
        };

        match self.fetch_into(&scratch, item_url, format, max_size_mb).await {
            Ok(Some(result)) => Some(result),
            Ok(None) => {
                scratch.remove_all().await;
                None
            }
            Err(e) => {
                error!("Error downloading {}: {:#}", item_url, e);
                scratch.remove_all().await;
                None
            }
        }
    }

    async fn fetch_into(
        &self,
        scratch: &ScratchDir,
        item_url: &str,
        format: DownloadFormat,
        max_size_mb: f64,
    ) -> Result<Option<DownloadResult>> {
        let profile = FormatProfile::for_format(format);

        let info = self.extractor.extract_info(item_url).await?;
        let title = info.title;

        self.extractor
            .download(item_url, &profile, scratch.path())
            .await?;

        let Some((path, size_bytes)) = scratch.first_file().await? else {
            warn!("yt-dlp produced no file for {}", item_url);
            return Ok(None);
        };

        let size_mb = size_bytes as f64 / BYTES_PER_MB;
        if size_mb > max_size_mb {
            warn!("File too large: {} ({:.1}MB)", title, size_mb);
            tokio::fs::remove_file(&path).await?;
            return Ok(None);
        }

        info!("Downloaded: {} ({:.1}MB)", title, size_mb);
        Ok(Some(DownloadResult {
            path,
            size_bytes,
            source_url: item_url.to_string(),
            title,
            scratch: scratch.clone(),
        }))
    }
}
