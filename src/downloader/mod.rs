//! Playlist resolution and media fetching

pub mod fetcher;
pub mod resolver;
pub mod scratch;

// Re-export for convenience
pub use fetcher::{DownloadResult, MediaFetcher};
pub use resolver::PlaylistResolver;
pub use scratch::ScratchDir;
