//! Application layer - Use cases and port interfaces
//!
//! Contains the probe, camera and recording operations and the trait
//! definitions for the host platform they run against.

pub mod camera;
pub mod ports;
pub mod probe;
pub mod record;
pub mod test_record;
pub mod trigger;

// Re-export use cases
pub use camera::{CameraSession, CameraStatus, RENDER_INTERVAL};
pub use probe::{PlatformUnsupportedError, SupportProbe};
pub use record::{RecordError, RecordingPipeline};
pub use test_record::{TestRecordCallbacks, TestRecordError, TestRecordOutput, TestRecordUseCase};
pub use trigger::{RecordTrigger, TriggerGuard};
