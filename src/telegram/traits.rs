use crate::telegram::models::ParseMode;
use crate::utils::config::DownloadFormat;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Outbound side of the messaging service
///
/// The delivery pipeline and the command handlers only talk to this trait,
/// so they can run against an in-memory recorder in tests.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Send a text message
    async fn send_text(&self, chat_id: i64, text: &str, parse_mode: Option<ParseMode>)
        -> Result<()>;

    /// Upload a file as audio or video, depending on `format`
    async fn send_media(
        &self,
        chat_id: i64,
        format: DownloadFormat,
        path: &Path,
        caption: &str,
    ) -> Result<()>;
}
