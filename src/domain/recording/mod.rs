//! Recording value objects and the job state machine

mod artifact;
mod duration;
mod job;

pub use artifact::Artifact;
pub use duration::{Duration, DEFAULT_RECORD_DURATION_MS, DEFAULT_STOP_TIMEOUT_SECS};
pub use job::{InvalidStateTransition, RecordingJob, RecordingState};
