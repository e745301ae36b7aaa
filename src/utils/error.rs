//! Error handling for tunecourier

use thiserror::Error;

/// Main error type for tunecourier
#[derive(Debug, Error)]
pub enum CourierError {
    #[error("yt-dlp not found. Please install yt-dlp")]
    YtDlpNotFound,

    #[error("Failed to extract video info: {0}")]
    ExtractionError(String),

    #[error("Download failed: {0}")]
    DownloadError(String),

    #[error("Delivery failed: {0}")]
    DeliveryError(String),

    #[error("Telegram API error {code}: {description}")]
    TelegramError { code: i64, description: String },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("User {0} is not authorized")]
    Unauthorized(i64),
}

impl CourierError {
    /// Telegram answers 400 when it cannot parse Markdown entities
    pub fn is_markup_rejection(&self) -> bool {
        match self {
            CourierError::TelegramError { code, description } => {
                *code == 400 && description.contains("parse entities")
            }
            _ => false,
        }
    }
}
