//! Playlist → item URLs

use crate::extractor::Extractor;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Lists the items of a playlist through the extractor.
///
/// No caching: every call asks the extractor again, so edits to the
/// playlist are picked up on the next cycle.
#[derive(Clone)]
pub struct PlaylistResolver {
    extractor: Arc<dyn Extractor>,
}

impl PlaylistResolver {
    pub fn new(extractor: Arc<dyn Extractor>) -> Self {
        Self { extractor }
    }

    /// Item page URLs of `playlist_url`; empty when the playlist cannot be read
    pub async fn resolve(&self, playlist_url: &str) -> Vec<String> {
        match self.extractor.extract_playlist(playlist_url).await {
            Ok(entries) => {
                let urls: Vec<String> = entries
                    .iter()
                    .filter_map(|entry| entry.item_url().map(str::to_string))
                    .collect();
                if urls.is_empty() {
                    warn!("No videos found in playlist: {}", playlist_url);
                } else {
                    info!("Playlist {} has {} videos", playlist_url, urls.len());
                }
                urls
            }
            Err(e) => {
                error!("Error extracting playlist {}: {:#}", playlist_url, e);
                Vec::new()
            }
        }
    }
}
