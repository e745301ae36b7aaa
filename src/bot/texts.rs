//! Reply texts (Telegram legacy Markdown)

use crate::utils::config::Settings;
use chrono::{DateTime, Utc};

pub const WELCOME: &str = "🎵 *Music Bot is Ready!*

I'll automatically send you random music from your configured playlists.

*Available Commands:*
• /help - Show all commands
• /status - Show current status
• /enable - Start automatic music sending
• /disable - Stop automatic music sending
• `/add_playlist <URL>` - Add a new playlist
• `/remove_playlist <number>` - Remove playlist by number
• /list\\_playlists - Show all playlists
• `/set_interval <minutes>` - Set sending interval
• `/set_format <audio/video>` - Set download format
• /send\\_now - Send random music immediately

*Setup Instructions:*
1. Add your playlists with `/add_playlist <URL>`
2. Configure settings with `/set_interval` and `/set_format`
3. Enable the bot with /enable

Get started by adding your first playlist!";

pub const HELP: &str = "🤖 *Music Bot Commands:*

*Playlist Management:*
• `/add_playlist <URL>` - Add YouTube playlist
• `/remove_playlist <number>` - Remove playlist (see numbers with `/list_playlists`)
• `/list_playlists` - Show all configured playlists

*Bot Control:*
• /enable - Start automatic music sending
• /disable - Stop automatic music sending
• /status - Show bot status and settings
• `/send_now` - Send random music immediately

*Settings:*
• `/set_interval <minutes>` - Set how often to send music (default: 1 minute)
• `/set_format <audio/video>` - Choose 'audio' for MP3 or 'video' for MP4

*Examples:*
• `/add_playlist https://youtube.com/playlist?list=PLxxxxx`
• `/set_interval 5` (send every 5 minutes)
• `/set_format audio` (download as MP3)";

pub const UNAUTHORIZED: &str = "🚫 You are not authorized to use this bot.";

const STATUS_PREVIEW_COUNT: usize = 3;
const STATUS_PREVIEW_CHARS: usize = 50;

/// First `max` characters of `s`
pub fn preview(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

pub fn status(settings: &Settings, next_run: Option<DateTime<Utc>>) -> String {
    let mut text = String::from("🎵 *Music Bot Status*\n\n");
    text.push_str(&format!(
        "*Enabled:* {}\n",
        if settings.enabled { "✅ Yes" } else { "❌ No" }
    ));
    text.push_str(&format!(
        "*Interval:* {} minute(s)\n",
        settings.interval_minutes
    ));
    text.push_str(&format!(
        "*Format:* {}\n",
        settings.download_format.as_str().to_uppercase()
    ));
    text.push_str(&format!("*Max File Size:* {}MB\n", settings.max_file_size_mb));
    text.push_str(&format!(
        "*Playlists:* {} configured\n",
        settings.playlists.len()
    ));
    if let Some(next) = next_run {
        text.push_str(&format!(
            "*Next delivery:* {}\n",
            next.format("%Y-%m-%d %H:%M UTC")
        ));
    }
    text.push('\n');

    if settings.playlists.is_empty() {
        text.push_str("⚠️ *No playlists configured!* Add some with `/add_playlist`");
        return text;
    }

    text.push_str("*Next random selection from:*\n");
    for (i, playlist) in settings
        .playlists
        .iter()
        .take(STATUS_PREVIEW_COUNT)
        .enumerate()
    {
        text.push_str(&format!(
            "{}. `{}...`\n",
            i + 1,
            preview(playlist, STATUS_PREVIEW_CHARS)
        ));
    }
    if settings.playlists.len() > STATUS_PREVIEW_COUNT {
        text.push_str(&format!(
            "... and {} more\n",
            settings.playlists.len() - STATUS_PREVIEW_COUNT
        ));
    }

    text
}

pub fn playlist_list(playlists: &[String]) -> String {
    let mut text = String::from("🎵 *Your Playlists:*\n\n");
    for (i, playlist) in playlists.iter().enumerate() {
        text.push_str(&format!("{}. `{}`\n\n", i + 1, playlist));
    }
    text.push_str(&format!("*Total:* {} playlist(s)\n", playlists.len()));
    text.push_str("Use `/remove_playlist <number>` to remove a playlist");
    text
}
