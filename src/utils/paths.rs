//! Default locations for the settings file, the log file and scratch space
//!
//! Everything is resolved to absolute paths through `dirs`, so the bot
//! behaves the same whether it is started from a shell, a systemd unit or a
//! container entrypoint with an arbitrary working directory.

use std::path::PathBuf;
use tracing::{debug, warn};

const APP_DIR: &str = "tunecourier";

/// Per-user configuration directory, e.g. `~/.config/tunecourier/`
pub fn get_config_dir() -> PathBuf {
    let dir = dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
        .unwrap_or_else(|| {
            warn!("Could not determine config directory, using temp dir");
            std::env::temp_dir()
        })
        .join(APP_DIR);

    debug!("Config directory: {:?}", dir);
    dir
}

/// Per-user data directory, e.g. `~/.local/share/tunecourier/`
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local").join("share")))
        .unwrap_or_else(|| {
            warn!("Could not determine data directory, using temp dir");
            std::env::temp_dir()
        })
        .join(APP_DIR)
}

/// Returns: `<config dir>/tunecourier/bot_config.json`
pub fn get_settings_path() -> PathBuf {
    get_config_dir().join("bot_config.json")
}

/// Returns: `<data dir>/tunecourier/music_bot.log`
pub fn get_log_path() -> PathBuf {
    get_data_dir().join("music_bot.log")
}

/// Root under which every fetch gets its own scratch directory
pub fn get_scratch_root() -> PathBuf {
    std::env::temp_dir().join(APP_DIR)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_path_is_not_relative() {
        let path = get_settings_path();
        assert!(path.is_absolute(), "Settings path must be absolute path");
        assert!(path.to_string_lossy().ends_with("bot_config.json"));
    }

    #[test]
    fn test_log_path_is_not_relative() {
        let path = get_log_path();
        assert!(path.is_absolute(), "Log path must be absolute path");
        assert!(path.to_string_lossy().ends_with("music_bot.log"));
    }

    #[test]
    fn test_scratch_root_lives_under_temp() {
        let root = get_scratch_root();
        assert!(root.starts_with(std::env::temp_dir()));
        assert!(root.ends_with(APP_DIR));
    }
}
