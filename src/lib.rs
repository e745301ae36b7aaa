//! tunecourier library

pub mod bot;
pub mod downloader;
pub mod extractor;
pub mod pipeline;
pub mod scheduler;
pub mod telegram;
pub mod utils;

// Re-export main types for easier use
pub use bot::{BotActor, CommandHandlers, Dispatcher};
pub use downloader::{DownloadResult, MediaFetcher, PlaylistResolver};
pub use extractor::{Extractor, FormatProfile, YtDlpExtractor};
pub use pipeline::{CycleOutcome, CycleTrigger, DeliveryPipeline};
pub use scheduler::Scheduler;
pub use telegram::{Messenger, TelegramClient};
pub use utils::{ConfigStore, CourierError, DownloadFormat, Settings};
