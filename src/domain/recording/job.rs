//! Recording job state machine

use std::fmt;
use thiserror::Error;

use super::Artifact;
use crate::domain::codec::CodecIdentifier;

/// Recording job states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingState {
    #[default]
    Idle,
    Recording,
    Finalizing,
    Complete,
    Failed,
}

impl RecordingState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Finalizing => "finalizing",
            Self::Complete => "complete",
            Self::Failed => "failed",
        }
    }

    /// Whether the job has reached an end state
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    /// Whether the job is inside the busy window of its trigger
    pub const fn is_busy(&self) -> bool {
        matches!(self, Self::Recording | Self::Finalizing)
    }
}

impl fmt::Display for RecordingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: RecordingState,
    pub action: String,
}

/// A single bounded recording.
///
/// State machine:
///   IDLE -> RECORDING (begin_recording)
///   RECORDING -> FINALIZING (begin_finalizing)
///   FINALIZING -> COMPLETE (complete)
///   any non-terminal -> FAILED (fail)
///
/// Fragments are accepted while recording or finalizing and kept in arrival order.
#[derive(Debug)]
pub struct RecordingJob {
    codec: CodecIdentifier,
    state: RecordingState,
    fragments: Vec<Vec<u8>>,
    failure: Option<String>,
}

impl RecordingJob {
    /// Create a new job in idle state
    pub fn new(codec: CodecIdentifier) -> Self {
        Self {
            codec,
            state: RecordingState::Idle,
            fragments: Vec::new(),
            failure: None,
        }
    }

    pub fn codec(&self) -> &CodecIdentifier {
        &self.codec
    }

    pub fn state(&self) -> RecordingState {
        self.state
    }

    pub fn fragment_count(&self) -> usize {
        self.fragments.len()
    }

    pub fn buffered_bytes(&self) -> usize {
        self.fragments.iter().map(Vec::len).sum()
    }

    /// Reason recorded by `fail`, if any
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    fn transition(
        &mut self,
        from: RecordingState,
        to: RecordingState,
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if self.state != from {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Transition from IDLE to RECORDING
    pub fn begin_recording(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            RecordingState::Idle,
            RecordingState::Recording,
            "begin recording",
        )
    }

    /// Append a fragment. Empty fragments are dropped and reported as `false`.
    pub fn push_fragment(&mut self, fragment: Vec<u8>) -> Result<bool, InvalidStateTransition> {
        if !self.state.is_busy() {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "accept a fragment".to_string(),
            });
        }
        if fragment.is_empty() {
            return Ok(false);
        }
        self.fragments.push(fragment);
        Ok(true)
    }

    /// Transition from RECORDING to FINALIZING
    pub fn begin_finalizing(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            RecordingState::Recording,
            RecordingState::Finalizing,
            "finalize",
        )
    }

    /// Transition from FINALIZING to COMPLETE, producing the artifact
    pub fn complete(&mut self) -> Result<Artifact, InvalidStateTransition> {
        self.transition(
            RecordingState::Finalizing,
            RecordingState::Complete,
            "complete",
        )?;
        let fragments = std::mem::take(&mut self.fragments);
        Ok(Artifact::from_fragments(&self.codec, fragments))
    }

    /// Move to FAILED from any non-terminal state, discarding buffered data
    pub fn fail(&mut self, reason: impl Into<String>) -> Result<(), InvalidStateTransition> {
        if self.state.is_terminal() {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: "fail".to_string(),
            });
        }
        self.state = RecordingState::Failed;
        self.fragments.clear();
        self.failure = Some(reason.into());
        Ok(())
    }
}
