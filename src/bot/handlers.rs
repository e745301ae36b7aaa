//! One handler per command
//!
//! Handlers reply through the [`Messenger`] and never return errors to the
//! dispatcher except for failed replies; invalid input gets a reply, not an
//! `Err`.

use crate::bot::commands::ParsedCommand;
use crate::bot::texts;
use crate::pipeline::{CycleOutcome, CycleTrigger, DeliveryPipeline};
use crate::scheduler::Scheduler;
use crate::telegram::{Messenger, ParseMode};
use crate::utils::config::{ConfigStore, DownloadFormat, MAX_INTERVAL_MINUTES};
use crate::utils::error::CourierError;
use anyhow::Result;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use url::Url;

const REMOVED_PREVIEW_CHARS: usize = 60;

/// Shared state every handler works on
#[derive(Clone)]
pub struct CommandHandlers {
    config: Arc<ConfigStore>,
    scheduler: Arc<Scheduler>,
    pipeline: Arc<DeliveryPipeline>,
    messenger: Arc<dyn Messenger>,
}

impl CommandHandlers {
    pub fn new(
        config: Arc<ConfigStore>,
        scheduler: Arc<Scheduler>,
        pipeline: Arc<DeliveryPipeline>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            config,
            scheduler,
            pipeline,
            messenger,
        }
    }

    /// Send a reply; Markdown that Telegram refuses to parse is resent as plain text
    pub async fn reply(&self, chat_id: i64, text: &str, parse_mode: Option<ParseMode>) -> Result<()> {
        match self.messenger.send_text(chat_id, text, parse_mode).await {
            Err(e)
                if parse_mode.is_some()
                    && e
                        .downcast_ref::<CourierError>()
                        .is_some_and(CourierError::is_markup_rejection) =>
            {
                warn!("Markdown rejected, resending as plain text");
                self.messenger.send_text(chat_id, text, None).await
            }
            other => other,
        }
    }

    async fn reply_md(&self, chat_id: i64, text: &str) -> Result<()> {
        self.reply(chat_id, text, Some(ParseMode::Markdown)).await
    }

    async fn reply_plain(&self, chat_id: i64, text: &str) -> Result<()> {
        self.reply(chat_id, text, None).await
    }

    pub async fn start(&self, chat_id: i64) -> Result<()> {
        self.reply_md(chat_id, texts::WELCOME).await
    }

    pub async fn help(&self, chat_id: i64) -> Result<()> {
        self.reply_md(chat_id, texts::HELP).await
    }

    pub async fn status(&self, chat_id: i64) -> Result<()> {
        let settings = self.config.snapshot().await;
        let next_run = self.scheduler.next_run().await;
        self.reply_md(chat_id, &texts::status(&settings, next_run))
            .await
    }

    pub async fn enable(&self, chat_id: i64) -> Result<()> {
        let enabled = self
            .config
            .try_update(|s| {
                if s.playlists.is_empty() {
                    None
                } else {
                    s.enabled = true;
                    Some(s.clone())
                }
            })
            .await;

        let Some(settings) = enabled else {
            return self
                .reply_md(
                    chat_id,
                    "❌ Cannot enable: No playlists configured!\nAdd playlists first with `/add_playlist <URL>`",
                )
                .await;
        };

        self.scheduler.reconfigure(&settings).await;
        info!("Bot enabled");
        self.reply_md(
            chat_id,
            &format!(
                "✅ *Music Bot Enabled!*\n\nSending random music every {} minute(s)\nFormat: {}",
                settings.interval_minutes,
                settings.download_format.as_str().to_uppercase()
            ),
        )
        .await
    }

    pub async fn disable(&self, chat_id: i64) -> Result<()> {
        self.config.update(|s| s.enabled = false).await;
        self.scheduler.clear().await;
        info!("Bot disabled");
        self.reply_md(
            chat_id,
            "❌ *Music Bot Disabled*\n\nAutomatic music sending stopped.",
        )
        .await
    }

    pub async fn add_playlist(&self, chat_id: i64, cmd: &ParsedCommand) -> Result<()> {
        let Some(playlist_url) = cmd.first_arg() else {
            return self
                .reply_md(
                    chat_id,
                    "Please provide a playlist URL. Example:\n`/add_playlist https://youtube.com/playlist?list=PLxxxxx`",
                )
                .await;
        };

        if let Err(e) = check_playlist_url(playlist_url) {
            info!("{}", e);
            return self
                .reply_plain(chat_id, "❌ Please provide a valid YouTube playlist URL")
                .await;
        }

        if self
            .config
            .snapshot()
            .await
            .playlists
            .iter()
            .any(|p| p == playlist_url)
        {
            return self
                .reply_plain(chat_id, "⚠️ This playlist is already in your list!")
                .await;
        }

        self.reply_plain(chat_id, "🔍 Testing playlist... Please wait.")
            .await?;

        let videos = self.pipeline.resolver().resolve(playlist_url).await;
        if videos.is_empty() {
            return self
                .reply_plain(
                    chat_id,
                    "❌ Could not access this playlist. Please check the URL and make sure the playlist is public.",
                )
                .await;
        }

        // Re-checked under the lock: the same URL may have been added while resolving
        let added = self
            .config
            .try_update(|s| {
                if s.playlists.iter().any(|p| p == playlist_url) {
                    None
                } else {
                    s.playlists.push(playlist_url.to_string());
                    Some(s.playlists.len())
                }
            })
            .await;

        match added {
            Some(total) => {
                info!("Added playlist {} ({} videos)", playlist_url, videos.len());
                self.reply_plain(
                    chat_id,
                    &format!(
                        "✅ Playlist added successfully!\nFound {} videos.\n\nTotal playlists: {}",
                        videos.len(),
                        total
                    ),
                )
                .await
            }
            None => {
                self.reply_plain(chat_id, "⚠️ This playlist is already in your list!")
                    .await
            }
        }
    }

    pub async fn remove_playlist(&self, chat_id: i64, cmd: &ParsedCommand) -> Result<()> {
        let Some(arg) = cmd.first_arg() else {
            return self
                .reply_md(
                    chat_id,
                    "Please provide the playlist number. Use `/list_playlists` to see numbers.",
                )
                .await;
        };

        let Ok(number) = arg.parse::<i64>() else {
            return self
                .reply_plain(chat_id, "❌ Please provide a valid number.")
                .await;
        };

        let removed = self
            .config
            .try_update(|s| {
                let index = usize::try_from(number.checked_sub(1)?).ok()?;
                (index < s.playlists.len()).then(|| s.playlists.remove(index))
            })
            .await;

        match removed {
            Some(playlist) => {
                info!("Removed playlist #{}: {}", number, playlist);
                self.reply_md(
                    chat_id,
                    &format!(
                        "✅ Removed playlist #{}\n`{}...`",
                        number,
                        texts::preview(&playlist, REMOVED_PREVIEW_CHARS)
                    ),
                )
                .await
            }
            None => {
                self.reply_md(
                    chat_id,
                    "❌ Invalid playlist number. Use `/list_playlists` to see valid numbers.",
                )
                .await
            }
        }
    }

    pub async fn list_playlists(&self, chat_id: i64) -> Result<()> {
        let settings = self.config.snapshot().await;
        if settings.playlists.is_empty() {
            return self
                .reply_md(
                    chat_id,
                    "📭 No playlists configured.\n\nAdd one with: `/add_playlist <URL>`",
                )
                .await;
        }
        self.reply_md(chat_id, &texts::playlist_list(&settings.playlists))
            .await
    }

    pub async fn set_interval(&self, chat_id: i64, cmd: &ParsedCommand) -> Result<()> {
        let Some(arg) = cmd.first_arg() else {
            return self
                .reply_md(
                    chat_id,
                    "Please specify interval in minutes. Example: `/set_interval 5`",
                )
                .await;
        };

        let Ok(interval) = arg.parse::<i64>() else {
            return self
                .reply_plain(chat_id, "❌ Please provide a valid number of minutes")
                .await;
        };
        if interval < 1 {
            return self
                .reply_plain(chat_id, "❌ Interval must be at least 1 minute")
                .await;
        }
        let interval = interval as u64;
        if interval > MAX_INTERVAL_MINUTES {
            return self
                .reply_plain(
                    chat_id,
                    &format!(
                        "❌ Interval must be at most {} minutes (one year)",
                        MAX_INTERVAL_MINUTES
                    ),
                )
                .await;
        }

        let settings = self
            .config
            .update(|s| {
                s.interval_minutes = interval;
                s.clone()
            })
            .await;
        if settings.enabled {
            self.scheduler.reconfigure(&settings).await;
        }

        self.reply_plain(chat_id, &format!("✅ Interval set to {} minute(s)", interval))
            .await
    }

    pub async fn set_format(&self, chat_id: i64, cmd: &ParsedCommand) -> Result<()> {
        let Some(arg) = cmd.first_arg() else {
            return self
                .reply_md(
                    chat_id,
                    "Please specify format: `audio` or `video`\nExample: `/set_format audio`",
                )
                .await;
        };

        let Ok(format) = arg.parse::<DownloadFormat>() else {
            return self
                .reply_plain(chat_id, "❌ Format must be either 'audio' or 'video'")
                .await;
        };

        self.config.update(|s| s.download_format = format).await;
        self.reply_md(
            chat_id,
            &format!(
                "✅ Download format set to: *{}*\nWill send: {}",
                format.as_str().to_uppercase(),
                format.description()
            ),
        )
        .await
    }

    /// Starts a manual cycle in the background and returns its handle
    pub async fn send_now(&self, chat_id: i64) -> Result<Option<JoinHandle<CycleOutcome>>> {
        if self.config.snapshot().await.playlists.is_empty() {
            self.reply_md(
                chat_id,
                "❌ No playlists configured! Add some with `/add_playlist <URL>`",
            )
            .await?;
            return Ok(None);
        }

        self.reply_plain(
            chat_id,
            "🎵 Selecting and downloading random music... Please wait!",
        )
        .await?;

        let pipeline = self.pipeline.clone();
        Ok(Some(tokio::spawn(async move {
            pipeline.run(CycleTrigger::Manual).await
        })))
    }
}

/// Accepts only http(s) URLs pointing at a YouTube playlist page
pub fn check_playlist_url(candidate: &str) -> Result<(), CourierError> {
    let url = Url::parse(candidate)
        .map_err(|e| CourierError::InvalidUrl(format!("{}: {}", candidate, e)))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CourierError::InvalidUrl(format!("{}: unsupported scheme", candidate)));
    }
    if !(candidate.contains("youtube.com/playlist") || candidate.contains("youtu.be/playlist")) {
        return Err(CourierError::InvalidUrl(format!("{}: not a playlist", candidate)));
    }
    Ok(())
}
