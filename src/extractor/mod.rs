pub mod format;
pub mod models;
pub mod traits;
pub mod ytdlp;

pub use format::FormatProfile;
pub use models::{PlaylistEntry, VideoInfo};
pub use traits::Extractor;
pub use ytdlp::YtDlpExtractor;
