//! Utility modules for error handling, configuration, paths and logging

pub mod config;
pub mod error;
pub mod logging;
pub mod paths;

// Re-export for convenience
pub use config::{ConfigStore, DownloadFormat, Settings, MAX_INTERVAL_MINUTES};
pub use error::CourierError;
pub use logging::init_logging;
pub use paths::{get_config_dir, get_data_dir, get_log_path, get_scratch_root, get_settings_path};
