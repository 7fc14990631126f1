//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces,
//! integrating with the ffmpeg executable, the filesystem and the host.

pub mod config;
pub mod download;
pub mod ffmpeg;
pub mod preview;
pub mod system_info;

// Re-export adapters
pub use config::XdgConfigStore;
pub use download::DirectoryDownloads;
pub use ffmpeg::{EncodePlan, FfmpegCamera, FfmpegCapabilities, FfmpegRecorderFactory};
pub use preview::PreviewStats;
