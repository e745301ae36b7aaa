//! Minimal Telegram Bot API client over reqwest

use crate::telegram::models::{
    ApiResponse, BotCommand, GetUpdatesRequest, ParseMode, SendMessageRequest, Update,
};
use crate::telegram::traits::Messenger;
use crate::utils::config::DownloadFormat;
use crate::utils::error::CourierError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, Client};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::debug;

const API_BASE: &str = "https://api.telegram.org";

/// Long-poll timeout passed to `getUpdates`, in seconds
pub const POLL_TIMEOUT_SECS: u64 = 30;

pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(token: &str) -> Result<Self> {
        Self::with_base_url(API_BASE, token)
    }

    /// Point the client at another Bot API server (e.g. a local `telegram-bot-api`)
    pub fn with_base_url(api_base: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!("Telegram call: {}", method);
        let response = self
            .client
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(CourierError::from)?;
        parse_response(response).await
    }

    /// Long-poll for updates after `offset`
    pub async fn get_updates(&self, offset: i64) -> Result<Vec<Update>> {
        let request = GetUpdatesRequest {
            offset,
            timeout: POLL_TIMEOUT_SECS,
            allowed_updates: vec!["message"],
        };
        let response = self
            .client
            .post(self.method_url("getUpdates"))
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS + 10))
            .json(&request)
            .send()
            .await
            .map_err(CourierError::from)?;
        parse_response(response).await
    }

    /// Drop updates queued while the bot was offline
    pub async fn drop_pending_updates(&self) -> Result<()> {
        let _: bool = self
            .call(
                "deleteWebhook",
                &serde_json::json!({ "drop_pending_updates": true }),
            )
            .await?;
        Ok(())
    }

    /// Register the command menu shown by Telegram clients
    pub async fn set_my_commands(&self, commands: &[BotCommand]) -> Result<()> {
        let _: bool = self
            .call("setMyCommands", &serde_json::json!({ "commands": commands }))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Messenger for TelegramClient {
    async fn send_text(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<ParseMode>,
    ) -> Result<()> {
        let request = SendMessageRequest {
            chat_id,
            text,
            parse_mode,
        };
        let _: serde_json::Value = self.call("sendMessage", &request).await?;
        Ok(())
    }

    async fn send_media(
        &self,
        chat_id: i64,
        format: DownloadFormat,
        path: &Path,
        caption: &str,
    ) -> Result<()> {
        let (method, field) = match format {
            DownloadFormat::Audio => ("sendAudio", "audio"),
            DownloadFormat::Video => ("sendVideo", "video"),
        };

        let file = tokio::fs::File::open(path)
            .await
            .with_context(|| format!("Failed to open {}", path.display()))?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| field.to_string());

        let part = Part::stream_with_length(Body::wrap_stream(ReaderStream::new(file)), length)
            .file_name(file_name);
        let form = Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part(field, part);

        debug!("Telegram call: {} ({} bytes)", method, length);
        let response = self
            .client
            .post(self.method_url(method))
            .multipart(form)
            .send()
            .await
            .map_err(CourierError::from)?;
        let _: serde_json::Value = parse_response(response).await?;
        Ok(())
    }
}

async fn parse_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(CourierError::from)?;

    let envelope: ApiResponse<T> = serde_json::from_slice(&bytes).map_err(|e| {
        CourierError::DeliveryError(format!("unexpected response (HTTP {}): {}", status, e))
    })?;

    unwrap_envelope(envelope, status.as_u16())
}

fn unwrap_envelope<T>(envelope: ApiResponse<T>, http_status: u16) -> Result<T> {
    match (envelope.ok, envelope.result) {
        (true, Some(result)) => Ok(result),
        _ => Err(CourierError::TelegramError {
            code: envelope.error_code.unwrap_or(i64::from(http_status)),
            description: envelope
                .description
                .unwrap_or_else(|| "no description".to_string()),
        }
        .into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_url_includes_token() {
        let client = TelegramClient::with_base_url("http://localhost:8081/", "123:abc").unwrap();
        assert_eq!(
            client.method_url("getUpdates"),
            "http://localhost:8081/bot123:abc/getUpdates"
        );
    }

    #[test]
    fn test_error_envelope_becomes_telegram_error() {
        let envelope: ApiResponse<bool> = serde_json::from_str(
            r#"{"ok":false,"error_code":400,"description":"Bad Request: can't parse entities"}"#,
        )
        .unwrap();
        let err = unwrap_envelope(envelope, 400).unwrap_err();
        let courier = err.downcast_ref::<CourierError>().unwrap();
        assert!(courier.is_markup_rejection());
    }

    #[test]
    fn test_ok_envelope_yields_result() {
        let envelope: ApiResponse<bool> = serde_json::from_str(r#"{"ok":true,"result":true}"#).unwrap();
        assert!(unwrap_envelope(envelope, 200).unwrap());
    }
}
