//! Recorder port interfaces

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use super::capture::CaptureStream;
use crate::domain::codec::CodecIdentifier;

/// Recorder errors
#[derive(Debug, Clone, Error)]
pub enum RecorderError {
    #[error("Cannot record {codec}: {message}")]
    Construction {
        codec: CodecIdentifier,
        message: String,
    },

    #[error("Failed to start recorder: {0}")]
    StartFailed(String),

    #[error("Failed to stop recorder: {0}")]
    StopFailed(String),
}

/// Events emitted by a running recorder, in order.
///
/// `Stopped` is the stop confirmation: no `Data` follows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecorderEvent {
    Data(Vec<u8>),
    Error(String),
    Stopped,
}

/// A platform recorder bound to one stream and one codec
#[async_trait]
pub trait MediaRecorder: Send {
    /// Begin recording.
    ///
    /// # Returns
    /// The ordered event channel for this recording
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<RecorderEvent>, RecorderError>;

    /// Ask the recorder to stop. Completion is signalled by `RecorderEvent::Stopped`.
    async fn stop(&mut self) -> Result<(), RecorderError>;
}

/// Port for constructing recorders
pub trait RecorderFactory: Send + Sync {
    /// Build a recorder reading from `stream` and encoding as `codec`.
    fn create(
        &self,
        stream: &CaptureStream,
        codec: &CodecIdentifier,
    ) -> Result<Box<dyn MediaRecorder>, RecorderError>;
}
