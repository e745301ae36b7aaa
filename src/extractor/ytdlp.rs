//! yt-dlp wrapper for playlist listing, metadata extraction and downloads
//!
//! The binary is located once at start-up (PATH first, then common install
//! locations). Every call spawns a fresh `yt-dlp` process through
//! `tokio::process`, so a slow extraction only suspends the calling task.

use crate::extractor::format::{FormatProfile, OUTPUT_TEMPLATE};
use crate::extractor::models::{PlaylistEntry, VideoInfo};
use crate::extractor::traits::Extractor;
use crate::utils::error::CourierError;
use anyhow::Result;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::process::Command as AsyncCommand;
use tracing::{debug, error, info, warn};

/// Extractor backed by the yt-dlp command line tool
pub struct YtDlpExtractor {
    ytdlp_path: PathBuf,
}

impl YtDlpExtractor {
    /// Locate yt-dlp and build the extractor
    pub fn new() -> Result<Self> {
        let ytdlp_path = match find_ytdlp() {
            Some(path) => {
                info!("Found yt-dlp at: {}", path.display());
                path
            }
            None => {
                error!("yt-dlp not found anywhere!");
                return Err(CourierError::YtDlpNotFound.into());
            }
        };

        Ok(Self { ytdlp_path })
    }

    /// Use an explicit binary, skipping discovery
    pub fn with_path(ytdlp_path: impl Into<PathBuf>) -> Self {
        Self {
            ytdlp_path: ytdlp_path.into(),
        }
    }

    /// Get the path to yt-dlp being used
    pub fn ytdlp_path(&self) -> &Path {
        &self.ytdlp_path
    }

    fn command(&self) -> AsyncCommand {
        let mut cmd = AsyncCommand::new(&self.ytdlp_path);
        cmd.arg("--no-warnings").kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl Extractor for YtDlpExtractor {
    fn id(&self) -> &'static str {
        "ytdlp"
    }

    /// Uses: yt-dlp --dump-json --no-download --no-playlist
    async fn extract_info(&self, url: &str) -> Result<VideoInfo> {
        debug!("Extracting video info for URL: {}", url);

        let output = self
            .command()
            .arg("--dump-json")
            .arg("--no-download")
            .arg("--no-playlist")
            .arg(url)
            .output()
            .await?;
        let stdout = check_output(output, "extraction")?;

        let video_info: VideoInfo = serde_json::from_str(&stdout).map_err(CourierError::from)?;
        Ok(video_info)
    }

    /// Uses: yt-dlp --flat-playlist --dump-json
    async fn extract_playlist(&self, url: &str) -> Result<Vec<PlaylistEntry>> {
        debug!("Extracting playlist info for URL: {}", url);

        let output = self
            .command()
            .arg("--flat-playlist")
            .arg("--dump-json")
            .arg(url)
            .output()
            .await?;
        let stdout = check_output(output, "playlist extraction")?;

        Ok(parse_playlist_lines(&stdout))
    }

    /// Uses: yt-dlp -f <selector> [--extract-audio ...] --no-playlist --quiet -o <dir>/<template>
    async fn download(&self, url: &str, profile: &FormatProfile, output_dir: &Path) -> Result<()> {
        let template = output_dir.join(OUTPUT_TEMPLATE);
        let format_args = profile.ytdlp_args();
        debug!(
            "Downloading {} with {:?} into {}",
            url,
            format_args,
            output_dir.display()
        );

        let output = self
            .command()
            .args(&format_args)
            .arg("--no-playlist")
            .arg("--quiet")
            .arg("-o")
            .arg(&template)
            .arg(url)
            .output()
            .await?;

        if !output.status.success() {
            let error_msg = String::from_utf8_lossy(&output.stderr);
            error!("yt-dlp download failed: {}", error_msg.trim());
            return Err(CourierError::DownloadError(error_msg.trim().to_string()).into());
        }

        Ok(())
    }
}

fn check_output(output: Output, what: &str) -> Result<String> {
    if !output.status.success() {
        let error_msg = String::from_utf8_lossy(&output.stderr);
        error!("yt-dlp {} failed: {}", what, error_msg.trim());
        return Err(CourierError::ExtractionError(error_msg.trim().to_string()).into());
    }

    Ok(String::from_utf8(output.stdout)?)
}

/// One JSON object per line; unparseable lines are logged and skipped
fn parse_playlist_lines(json_lines: &str) -> Vec<PlaylistEntry> {
    let mut entries = Vec::new();

    for line in json_lines.lines() {
        if line.trim().is_empty() {
            continue;
        }

        match serde_json::from_str::<PlaylistEntry>(line) {
            Ok(entry) => entries.push(entry),
            Err(e) => {
                warn!("Failed to parse playlist entry: {}", e);
            }
        }
    }

    entries
}

// ============================================================
// yt-dlp Detection Functions
// ============================================================

/// Find yt-dlp binary with priority:
/// 1. System PATH
/// 2. Common installation paths
pub fn find_ytdlp() -> Option<PathBuf> {
    if let Some(system) = find_in_path() {
        info!("✓ Using system yt-dlp: {:?}", system);
        return Some(system);
    }

    if let Some(common) = find_in_common_paths() {
        info!("✓ Using yt-dlp from common path: {:?}", common);
        return Some(common);
    }

    warn!("✗ yt-dlp not found anywhere!");
    None
}

fn find_in_path() -> Option<PathBuf> {
    which::which("yt-dlp").ok().filter(|path| path.exists())
}

fn find_in_common_paths() -> Option<PathBuf> {
    let mut candidates = vec![
        PathBuf::from("/usr/local/bin/yt-dlp"),
        PathBuf::from("/usr/bin/yt-dlp"),
        PathBuf::from("/opt/homebrew/bin/yt-dlp"),
        PathBuf::from("/snap/bin/yt-dlp"),
    ];
    if let Some(home) = dirs::home_dir() {
        candidates.push(home.join(".local").join("bin").join("yt-dlp"));
    }

    candidates
        .into_iter()
        .find(|path| path.exists() && is_executable(path))
}

/// Check if a file is executable
fn is_executable(path: &Path) -> bool {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;

        std::fs::metadata(path)
            .map(|metadata| metadata.permissions().mode() & 0o111 != 0)
            .unwrap_or(false)
    }

    #[cfg(not(unix))]
    {
        path.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_ytdlp_returns_executable() {
        // yt-dlp may be absent; whatever is found must be runnable
        if let Some(path) = find_ytdlp() {
            assert!(is_executable(&path), "{} is not executable", path.display());
        }
    }

    #[test]
    fn test_is_executable() {
        let path = PathBuf::from("/bin/sh");
        if path.exists() {
            assert!(is_executable(&path));
        }
        assert!(!is_executable(Path::new("/definitely/not/here/yt-dlp")));
    }

    #[test]
    fn test_parse_playlist_lines_skips_garbage() {
        let lines = concat!(
            r#"{"id":"a","url":"https://www.youtube.com/watch?v=a"}"#,
            "\n\n",
            "not json\n",
            r#"{"id":"b","webpage_url":"https://www.youtube.com/watch?v=b"}"#,
            "\n"
        );
        let entries = parse_playlist_lines(lines);
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].item_url(), Some("https://www.youtube.com/watch?v=b"));
    }

    #[tokio::test]
    async fn test_missing_binary_is_an_error() {
        let extractor = YtDlpExtractor::with_path("/definitely/not/here/yt-dlp");
        assert!(extractor.extract_info("https://example.com").await.is_err());
        assert!(extractor
            .extract_playlist("https://example.com")
            .await
            .is_err());
    }
}
