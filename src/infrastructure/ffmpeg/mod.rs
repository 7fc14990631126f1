//! FFmpeg adapters for capability detection, camera capture and encoding

mod camera;
mod capability;
pub mod format;
mod recorder;

pub use camera::{classify_startup_failure, FfmpegCamera, FfmpegVideoTrack, DEFAULT_STARTUP_TIMEOUT};
pub use capability::{parse_listing, FfmpegCapabilities};
pub use format::EncodePlan;
pub use recorder::{FfmpegRecorder, FfmpegRecorderFactory};
