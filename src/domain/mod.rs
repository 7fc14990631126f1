//! Domain layer - Core business logic
//!
//! Contains value objects, entities, and domain errors.
//! This layer has no dependencies on external systems.

pub mod codec;
pub mod config;
pub mod device;
pub mod error;
pub mod recording;

// Re-export common types
pub use codec::{CodecCatalog, CodecIdentifier, SupportVerdict};
pub use config::AppConfig;
pub use device::{BrowserIdentity, DeviceInfo};
pub use error::*;
pub use recording::{Artifact, Duration, RecordingJob, RecordingState};
