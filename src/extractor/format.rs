//! yt-dlp format selection per download format

use crate::utils::config::DownloadFormat;

/// Video selector: under 50MB if the site reports sizes, else 480p or lower, else the smallest.
pub const VIDEO_FORMAT_SELECTOR: &str = "best[filesize<50M]/best[height<=480]/worst";

/// Audio selector, transcoded afterwards to [`AUDIO_CODEC`] at [`AUDIO_QUALITY`]
pub const AUDIO_FORMAT_SELECTOR: &str = "bestaudio/best";
pub const AUDIO_CODEC: &str = "mp3";
pub const AUDIO_QUALITY: &str = "192K";

/// Output template, relative to the scratch directory
pub const OUTPUT_TEMPLATE: &str = "%(title)s.%(ext)s";

/// What to ask yt-dlp for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatProfile {
    pub selector: &'static str,
    /// `Some((codec, quality))` when the audio track is extracted and transcoded
    pub extract_audio: Option<(&'static str, &'static str)>,
}

impl FormatProfile {
    pub fn for_format(format: DownloadFormat) -> Self {
        match format {
            DownloadFormat::Audio => Self {
                selector: AUDIO_FORMAT_SELECTOR,
                extract_audio: Some((AUDIO_CODEC, AUDIO_QUALITY)),
            },
            DownloadFormat::Video => Self {
                selector: VIDEO_FORMAT_SELECTOR,
                extract_audio: None,
            },
        }
    }

    /// Format-related yt-dlp arguments
    pub fn ytdlp_args(&self) -> Vec<String> {
        let mut args = vec!["-f".to_string(), self.selector.to_string()];
        if let Some((codec, quality)) = self.extract_audio {
            args.push("--extract-audio".to_string());
            args.push("--audio-format".to_string());
            args.push(codec.to_string());
            args.push("--audio-quality".to_string());
            args.push(quality.to_string());
        }
        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_keeps_three_tier_fallback() {
        let profile = FormatProfile::for_format(DownloadFormat::Video);
        assert_eq!(
            profile.ytdlp_args(),
            vec!["-f", "best[filesize<50M]/best[height<=480]/worst"]
        );
    }

    #[test]
    fn test_audio_transcodes_to_mp3_192() {
        let args = FormatProfile::for_format(DownloadFormat::Audio).ytdlp_args();
        assert_eq!(args[..2], ["-f", "bestaudio/best"]);
        assert!(args.contains(&"--extract-audio".to_string()));
        let q = args.iter().position(|a| a == "--audio-quality").unwrap();
        assert_eq!(args[q + 1], "192K");
        let c = args.iter().position(|a| a == "--audio-format").unwrap();
        assert_eq!(args[c + 1], "mp3");
    }
}
