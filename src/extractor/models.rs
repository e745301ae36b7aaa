//! Data structures for video information

use serde::{Deserialize, Serialize};

/// Video information structure (subset of `yt-dlp --dump-json`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default = "unknown_title")]
    pub title: String,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub filesize: Option<u64>,
    pub uploader: Option<String>,
    pub extractor: Option<String>,
}

fn unknown_title() -> String {
    "Unknown".to_string()
}

/// One line of `yt-dlp --flat-playlist --dump-json`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaylistEntry {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
}

impl PlaylistEntry {
    /// Page URL of the item, preferring `webpage_url` over the flat `url`
    pub fn item_url(&self) -> Option<&str> {
        self.webpage_url
            .as_deref()
            .or(self.url.as_deref())
            .filter(|u| !u.trim().is_empty())
    }
}
