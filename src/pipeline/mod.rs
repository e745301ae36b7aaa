//! One delivery cycle: select → resolve → fetch → deliver → clean up
//!
//! A cycle never returns an error. Each failure ends the cycle early, is
//! logged, and is summarised in the returned [`CycleOutcome`]. Settings are
//! read from the shared [`ConfigStore`] at the moment each step needs them,
//! so a command that changes the format while a playlist is being resolved
//! is honoured by the fetch that follows.

use crate::downloader::{DownloadResult, MediaFetcher, PlaylistResolver};
use crate::extractor::Extractor;
use crate::telegram::Messenger;
use crate::utils::config::{ConfigStore, DownloadFormat};
use rand::seq::SliceRandom;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

/// What started the cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleTrigger {
    /// Fired by the scheduler; respects `enabled`
    Scheduled,
    /// `/send_now`; runs even while disabled
    Manual,
}

/// How a cycle ended
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    NoPlaylists,
    Disabled,
    EmptyPlaylist { playlist: String },
    FetchFailed { item: String },
    Delivered { item: String, format: DownloadFormat },
    DeliveryFailed { item: String, error: String },
}

impl CycleOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, CycleOutcome::Delivered { .. })
    }
}

/// Caption sent along with the file
pub fn caption_for(format: DownloadFormat, source_url: &str) -> String {
    match format {
        DownloadFormat::Audio => format!("🎵 Random music from your playlists!\n\n🔗 {}", source_url),
        DownloadFormat::Video => format!("🎬 Random video from your playlists!\n\n🔗 {}", source_url),
    }
}

pub struct DeliveryPipeline {
    config: Arc<ConfigStore>,
    resolver: PlaylistResolver,
    fetcher: MediaFetcher,
    messenger: Arc<dyn Messenger>,
    recipient: i64,
}

impl DeliveryPipeline {
    pub fn new(
        config: Arc<ConfigStore>,
        extractor: Arc<dyn Extractor>,
        messenger: Arc<dyn Messenger>,
        recipient: i64,
        scratch_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            config,
            resolver: PlaylistResolver::new(extractor.clone()),
            fetcher: MediaFetcher::new(extractor, scratch_root),
            messenger,
            recipient,
        }
    }

    pub fn resolver(&self) -> &PlaylistResolver {
        &self.resolver
    }

    /// Run one full cycle
    pub async fn run(&self, trigger: CycleTrigger) -> CycleOutcome {
        let outcome = self.run_inner(trigger).await;
        info!("Cycle ({:?}) finished: {:?}", trigger, outcome);
        outcome
    }

    async fn run_inner(&self, trigger: CycleTrigger) -> CycleOutcome {
        // Selecting
        let settings = self.config.snapshot().await;
        if settings.playlists.is_empty() {
            warn!("No playlists configured");
            return CycleOutcome::NoPlaylists;
        }
        if trigger == CycleTrigger::Scheduled && !settings.enabled {
            info!("Bot is disabled, skipping music send");
            return CycleOutcome::Disabled;
        }

        let Some(playlist) = pick(&settings.playlists) else {
            return CycleOutcome::NoPlaylists;
        };
        info!("Selected playlist: {}", playlist);

        // Resolving
        let items = self.resolver.resolve(&playlist).await;
        let Some(item) = pick(&items) else {
            warn!("No videos found in selected playlist");
            return CycleOutcome::EmptyPlaylist { playlist };
        };
        info!("Selected video: {}", item);

        // Fetching, with the settings as they are now
        let current = self.config.snapshot().await;
        let Some(download) = self
            .fetcher
            .fetch(&item, current.download_format, current.max_file_size_mb)
            .await
        else {
            return CycleOutcome::FetchFailed { item };
        };

        // Delivering
        let format = self.config.snapshot().await.download_format;
        let outcome = match self.deliver(&download, format).await {
            Ok(()) => {
                info!("Successfully sent file to Telegram");
                CycleOutcome::Delivered {
                    item: item.clone(),
                    format,
                }
            }
            Err(e) => {
                error!("Error sending file to Telegram: {:#}", e);
                CycleOutcome::DeliveryFailed {
                    item: item.clone(),
                    error: e.to_string(),
                }
            }
        };

        // Cleaning
        match download.cleanup().await {
            Ok(()) => info!("Cleaned up temporary files"),
            Err(e) => error!("Error cleaning up files: {:#}", e),
        }

        outcome
    }

    async fn deliver(&self, download: &DownloadResult, format: DownloadFormat) -> anyhow::Result<()> {
        let caption = caption_for(format, &download.source_url);
        self.messenger
            .send_media(self.recipient, format, &download.path, &caption)
            .await
    }
}

/// Uniform random choice; the RNG never lives across an await
fn pick(items: &[String]) -> Option<String> {
    items.choose(&mut rand::thread_rng()).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caption_embeds_source_url() {
        let audio = caption_for(DownloadFormat::Audio, "https://youtu.be/x");
        assert!(audio.starts_with("🎵"));
        assert!(audio.ends_with("🔗 https://youtu.be/x"));

        let video = caption_for(DownloadFormat::Video, "https://youtu.be/y");
        assert!(video.starts_with("🎬"));
        assert!(video.contains("https://youtu.be/y"));
    }

    #[test]
    fn test_pick_covers_all_items() {
        let items: Vec<String> = (0..3).map(|i| format!("item-{}", i)).collect();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..500 {
            seen.insert(pick(&items).unwrap());
        }
        assert_eq!(seen.len(), 3);
        assert!(pick(&[]).is_none());
    }
}
