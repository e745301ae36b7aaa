//! Persisted bot settings
//!
//! The settings file is a flat JSON object. Keys missing from an existing
//! file are filled from [`Settings::default`], so new options can be added
//! without migrating old files.

use crate::utils::error::CourierError;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tokio::sync::RwLock;
use tracing::{error, info};

/// Longest accepted interval: one year
pub const MAX_INTERVAL_MINUTES: u64 = 365 * 24 * 60;

/// Bot settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Playlist URLs, in the order they were added
    pub playlists: Vec<String>,

    /// Minutes between scheduled deliveries, 1..=[`MAX_INTERVAL_MINUTES`]
    pub interval_minutes: u64,

    /// Send audio or video
    pub download_format: DownloadFormat,

    /// Downloads larger than this are discarded
    pub max_file_size_mb: f64,

    /// Scheduled deliveries on/off
    pub enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            playlists: Vec::new(),
            interval_minutes: 1,
            download_format: DownloadFormat::Audio,
            max_file_size_mb: 50.0,
            enabled: false,
        }
    }
}

impl Settings {
    /// A scheduled job only makes sense with something to pick from
    pub fn should_schedule(&self) -> bool {
        self.enabled && !self.playlists.is_empty()
    }
}

/// Download format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadFormat {
    Audio,
    Video,
}

impl DownloadFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            DownloadFormat::Audio => "audio",
            DownloadFormat::Video => "video",
        }
    }

    /// Human description used in command replies
    pub fn description(&self) -> &'static str {
        match self {
            DownloadFormat::Audio => "MP3 audio files",
            DownloadFormat::Video => "MP4 video files (under 50MB)",
        }
    }
}

impl fmt::Display for DownloadFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DownloadFormat {
    type Err = CourierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "audio" => Ok(DownloadFormat::Audio),
            "video" => Ok(DownloadFormat::Video),
            other => Err(CourierError::ConfigError(format!(
                "unknown download format '{}'",
                other
            ))),
        }
    }
}

/// Owner of the live [`Settings`] and the file they persist to.
///
/// Shared as `Arc<ConfigStore>` between the command handlers, the scheduler
/// and the delivery pipeline. The lock is only held to clone or to
/// mutate-and-save; readers in the middle of a cycle see whatever was last
/// written, which is the intended (field-level) consistency.
#[derive(Debug)]
pub struct ConfigStore {
    path: PathBuf,
    settings: RwLock<Settings>,
}

impl ConfigStore {
    /// Load settings from `path`, creating the file with defaults on first run.
    ///
    /// Never fails: read or parse errors are logged and defaults are used.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let settings = match read_settings(&path).await {
            Ok(Some(settings)) => settings,
            Ok(None) => {
                let defaults = Settings::default();
                if let Err(e) = write_settings(&path, &defaults).await {
                    error!("Error saving config: {:#}", e);
                }
                defaults
            }
            Err(e) => {
                error!("Error loading config: {:#}", e);
                Settings::default()
            }
        };

        Self {
            path,
            settings: RwLock::new(settings),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Clone of the current settings
    pub async fn snapshot(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Mutate the settings and persist them before returning.
    ///
    /// A failed write is logged; the in-memory change is kept either way.
    pub async fn update<T>(&self, f: impl FnOnce(&mut Settings) -> T) -> T {
        let mut guard = self.settings.write().await;
        let result = f(&mut guard);
        if let Err(e) = write_settings(&self.path, &guard).await {
            error!("Error saving config: {:#}", e);
        } else {
            info!("Configuration saved successfully");
        }
        result
    }

    /// Like [`update`](Self::update), but only persists when `f` returns `Some`
    pub async fn try_update<T>(&self, f: impl FnOnce(&mut Settings) -> Option<T>) -> Option<T> {
        let mut guard = self.settings.write().await;
        let result = f(&mut guard)?;
        if let Err(e) = write_settings(&self.path, &guard).await {
            error!("Error saving config: {:#}", e);
        } else {
            info!("Configuration saved successfully");
        }
        Some(result)
    }

    /// Persist the current settings as they are
    pub async fn save(&self) {
        self.update(|_| ()).await
    }
}

async fn read_settings(path: &Path) -> Result<Option<Settings>> {
    if !tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let settings: Settings = serde_json::from_str(&content)
        .map_err(CourierError::from)
        .with_context(|| format!("Failed to parse {}", path.display()))?;

    Ok(Some(settings))
}

/// Write to a sibling temp file, then rename over the target
async fn write_settings(path: &Path, settings: &Settings) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .context("Failed to create config directory")?;
    }

    let json = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, json.as_bytes())
        .await
        .with_context(|| format!("Failed to write {}", tmp.display()))?;
    tokio::fs::rename(&tmp, path)
        .await
        .with_context(|| format!("Failed to replace {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert!(settings.playlists.is_empty());
        assert_eq!(settings.interval_minutes, 1);
        assert_eq!(settings.download_format, DownloadFormat::Audio);
        assert_eq!(settings.max_file_size_mb, 50.0);
        assert!(!settings.enabled);
    }

    #[test]
    fn test_missing_keys_are_backfilled() {
        let json = r#"{ "playlists": ["https://youtube.com/playlist?list=PL1"], "enabled": true }"#;
        let settings: Settings = serde_json::from_str(json).unwrap();
        assert_eq!(settings.playlists.len(), 1);
        assert!(settings.enabled);
        assert_eq!(settings.interval_minutes, 1);
        assert_eq!(settings.download_format, DownloadFormat::Audio);
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("AUDIO".parse::<DownloadFormat>().unwrap(), DownloadFormat::Audio);
        assert_eq!(" video ".parse::<DownloadFormat>().unwrap(), DownloadFormat::Video);
        assert!("flac".parse::<DownloadFormat>().is_err());
    }

    #[test]
    fn test_format_serializes_lowercase() {
        let json = serde_json::to_string(&DownloadFormat::Video).unwrap();
        assert_eq!(json, "\"video\"");
    }

    #[tokio::test]
    async fn test_first_load_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("bot_config.json");

        let store = ConfigStore::load(&path).await;
        assert_eq!(store.snapshot().await, Settings::default());
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_update_persists() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bot_config.json");

        let store = ConfigStore::load(&path).await;
        store.update(|s| s.interval_minutes = 15).await;

        let reloaded = ConfigStore::load(&path).await;
        assert_eq!(reloaded.snapshot().await.interval_minutes, 15);
        assert!(!dir.path().join("bot_config.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bot_config.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let store = ConfigStore::load(&path).await;
        assert_eq!(store.snapshot().await, Settings::default());
    }
}
