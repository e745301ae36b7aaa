//! In-memory doubles for the extractor and the messenger, plus a wired-up harness.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tunecourier::bot::{CommandHandlers, Dispatcher};
use tunecourier::extractor::{Extractor, FormatProfile, PlaylistEntry, VideoInfo};
use tunecourier::pipeline::DeliveryPipeline;
use tunecourier::scheduler::Scheduler;
use tunecourier::telegram::models::{Chat, Message, User};
use tunecourier::telegram::{Messenger, ParseMode};
use tunecourier::utils::{ConfigStore, CourierError, DownloadFormat, Settings};

pub const OWNER: i64 = 1001;
pub const STRANGER: i64 = 666;
pub const PLAYLIST_A: &str = "https://www.youtube.com/playlist?list=PLaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const PLAYLIST_B: &str = "https://www.youtube.com/playlist?list=PLbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const EMPTY_PLAYLIST: &str = "https://www.youtube.com/playlist?list=PLempty";

pub const MB: u64 = 1024 * 1024;

type SettingsEdit = Box<dyn FnOnce(&mut Settings) + Send>;

/// Extractor that serves canned playlists and writes sparse files of a fixed size
pub struct MockExtractor {
    playlists: Mutex<HashMap<String, Vec<String>>>,
    file_size: Mutex<u64>,
    fail_download: bool,
    edit_while_resolving: Mutex<Option<(Arc<ConfigStore>, SettingsEdit)>>,
    pub playlist_calls: AtomicUsize,
    pub downloads: Mutex<Vec<(String, FormatProfile)>>,
}

impl MockExtractor {
    pub fn new(file_size: u64) -> Self {
        let mut playlists = HashMap::new();
        playlists.insert(
            PLAYLIST_A.to_string(),
            vec![
                "https://www.youtube.com/watch?v=a1".to_string(),
                "https://www.youtube.com/watch?v=a2".to_string(),
            ],
        );
        playlists.insert(
            PLAYLIST_B.to_string(),
            vec!["https://www.youtube.com/watch?v=b1".to_string()],
        );
        playlists.insert(EMPTY_PLAYLIST.to_string(), Vec::new());

        Self {
            playlists: Mutex::new(playlists),
            file_size: Mutex::new(file_size),
            fail_download: false,
            edit_while_resolving: Mutex::new(None),
            playlist_calls: AtomicUsize::new(0),
            downloads: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_downloads(mut self) -> Self {
        self.fail_download = true;
        self
    }

    /// Apply `edit` to the shared settings during the next playlist lookup,
    /// as a command arriving mid-cycle would
    pub fn edit_settings_while_resolving(
        &self,
        config: Arc<ConfigStore>,
        edit: impl FnOnce(&mut Settings) + Send + 'static,
    ) {
        *self.edit_while_resolving.lock().unwrap() = Some((config, Box::new(edit)));
    }

    pub fn playlist_calls(&self) -> usize {
        self.playlist_calls.load(Ordering::SeqCst)
    }

    pub fn download_count(&self) -> usize {
        self.downloads.lock().unwrap().len()
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    fn id(&self) -> &'static str {
        "mock"
    }

    async fn extract_info(&self, url: &str) -> Result<VideoInfo> {
        Ok(VideoInfo {
            id: url.rsplit('=').next().unwrap_or_default().to_string(),
            title: "Test Song".to_string(),
            webpage_url: Some(url.to_string()),
            ..Default::default()
        })
    }

    async fn extract_playlist(&self, url: &str) -> Result<Vec<PlaylistEntry>> {
        self.playlist_calls.fetch_add(1, Ordering::SeqCst);
        let pending = self.edit_while_resolving.lock().unwrap().take();
        if let Some((config, edit)) = pending {
            config.update(edit).await;
        }
        let playlists = self.playlists.lock().unwrap();
        let items = playlists
            .get(url)
            .ok_or_else(|| CourierError::ExtractionError(format!("private playlist {}", url)))?;
        Ok(items
            .iter()
            .map(|item| PlaylistEntry {
                url: Some(item.clone()),
                ..Default::default()
            })
            .collect())
    }

    async fn download(&self, url: &str, profile: &FormatProfile, output_dir: &Path) -> Result<()> {
        self.downloads
            .lock()
            .unwrap()
            .push((url.to_string(), profile.clone()));
        if self.fail_download {
            return Err(anyhow!("HTTP Error 403: Forbidden"));
        }

        let ext = if profile.extract_audio.is_some() { "mp3" } else { "mp4" };
        let file = std::fs::File::create(output_dir.join(format!("Test Song.{}", ext)))?;
        file.set_len(*self.file_size.lock().unwrap())?;
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SentMedia {
    pub chat_id: i64,
    pub format: DownloadFormat,
    pub path: PathBuf,
    pub caption: String,
    pub file_existed: bool,
}

/// Messenger that records everything it is asked to send
#[derive(Default)]
pub struct RecordingMessenger {
    pub texts: Mutex<Vec<(i64, String, Option<ParseMode>)>>,
    pub media: Mutex<Vec<SentMedia>>,
    fail_media: bool,
    reject_markdown: bool,
}

impl RecordingMessenger {
    pub fn failing_media() -> Self {
        Self {
            fail_media: true,
            ..Default::default()
        }
    }

    pub fn rejecting_markdown() -> Self {
        Self {
            reject_markdown: true,
            ..Default::default()
        }
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text, _)| text.clone())
            .collect()
    }

    pub fn last_text(&self) -> String {
        self.texts().last().cloned().unwrap_or_default()
    }

    pub fn media(&self) -> Vec<SentMedia> {
        self.media.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_text(&self, chat_id: i64, text: &str, parse_mode: Option<ParseMode>) -> Result<()> {
        if self.reject_markdown && parse_mode.is_some() {
            return Err(CourierError::TelegramError {
                code: 400,
                description: "Bad Request: can't parse entities: Can't find end of the entity".into(),
            }
            .into());
        }
        self.texts
            .lock()
            .unwrap()
            .push((chat_id, text.to_string(), parse_mode));
        Ok(())
    }

    async fn send_media(
        &self,
        chat_id: i64,
        format: DownloadFormat,
        path: &Path,
        caption: &str,
    ) -> Result<()> {
        self.media.lock().unwrap().push(SentMedia {
            chat_id,
            format,
            path: path.to_path_buf(),
            caption: caption.to_string(),
            file_existed: path.exists(),
        });
        if self.fail_media {
            return Err(CourierError::DeliveryError("Request Entity Too Large".into()).into());
        }
        Ok(())
    }
}

/// Everything wired together over a temp directory
pub struct Harness {
    pub dir: TempDir,
    pub config: Arc<ConfigStore>,
    pub extractor: Arc<MockExtractor>,
    pub messenger: Arc<RecordingMessenger>,
    pub pipeline: Arc<DeliveryPipeline>,
    pub scheduler: Arc<Scheduler>,
    pub dispatcher: Dispatcher,
}

impl Harness {
    pub async fn new(settings: Settings) -> Self {
        Self::with(settings, MockExtractor::new(MB), RecordingMessenger::default()).await
    }

    pub async fn with(
        settings: Settings,
        extractor: MockExtractor,
        messenger: RecordingMessenger,
    ) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let config_path = dir.path().join("bot_config.json");
        std::fs::write(&config_path, serde_json::to_string_pretty(&settings).unwrap()).unwrap();
        let config = Arc::new(ConfigStore::load(&config_path).await);

        let extractor = Arc::new(extractor);
        let messenger = Arc::new(messenger);
        let pipeline = Arc::new(DeliveryPipeline::new(
            config.clone(),
            extractor.clone(),
            messenger.clone(),
            OWNER,
            dir.path().join("scratch"),
        ));
        let scheduler = Arc::new(Scheduler::new(pipeline.clone()));
        let handlers = CommandHandlers::new(
            config.clone(),
            scheduler.clone(),
            pipeline.clone(),
            messenger.clone(),
        );
        let dispatcher = Dispatcher::new(handlers, OWNER);

        Self {
            dir,
            config,
            extractor,
            messenger,
            pipeline,
            scheduler,
            dispatcher,
        }
    }

    pub fn scratch_root(&self) -> PathBuf {
        self.dir.path().join("scratch")
    }

    /// Scratch directories still on disk
    pub fn leftover_scratch_dirs(&self) -> Vec<PathBuf> {
        match std::fs::read_dir(self.scratch_root()) {
            Ok(entries) => entries.filter_map(|e| e.ok()).map(|e| e.path()).collect(),
            Err(_) => Vec::new(),
        }
    }

    pub async fn send(&self, text: &str) {
        self.dispatcher.handle(message_from(OWNER, text)).await;
    }

    pub async fn settings(&self) -> Settings {
        self.config.snapshot().await
    }

    /// Settings as they are on disk
    pub async fn persisted(&self) -> Settings {
        ConfigStore::load(self.config.path()).await.snapshot().await
    }
}

pub fn message_from(user_id: i64, text: &str) -> Message {
    Message {
        message_id: 1,
        chat: Chat { id: user_id },
        from: Some(User {
            id: user_id,
            username: None,
        }),
        text: Some(text.to_string()),
    }
}

pub fn settings_with(playlists: &[&str], enabled: bool) -> Settings {
    Settings {
        playlists: playlists.iter().map(|p| p.to_string()).collect(),
        enabled,
        ..Settings::default()
    }
}
