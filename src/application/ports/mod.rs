//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod capability;
pub mod capture;
pub mod config;
pub mod download;
pub mod recorder;
pub mod surface;

// Re-export common types
pub use capability::CapabilityQuery;
pub use capture::{
    AcquisitionError, CaptureConstraints, CaptureDevice, CaptureStream, MediaTrack,
    StreamSettings, TrackKind, VideoFrame, FRAME_BUFFER,
};
pub use config::ConfigStore;
pub use download::{DownloadError, DownloadSink};
pub use recorder::{MediaRecorder, RecorderError, RecorderEvent, RecorderFactory};
pub use surface::FrameSurface;
