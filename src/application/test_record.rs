//! Test-record use case: one press of a codec's record control

use std::path::PathBuf;

use thiserror::Error;
use tracing::info;

use crate::domain::codec::CodecIdentifier;
use crate::domain::recording::Duration;

use super::ports::{CaptureStream, DownloadError, DownloadSink, RecorderFactory};
use super::record::{RecordError, RecordingPipeline};
use super::trigger::RecordTrigger;

/// Errors from the test-record use case
#[derive(Debug, Error)]
pub enum TestRecordError {
    #[error("Camera is not active.")]
    NoActiveStream,

    #[error("A recording for {0} is already in progress")]
    Busy(CodecIdentifier),

    #[error(transparent)]
    Record(RecordError),

    #[error("Recording failed: {0}")]
    Download(#[from] DownloadError),
}

impl From<RecordError> for TestRecordError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::NoActiveStream => Self::NoActiveStream,
            other => Self::Record(other),
        }
    }
}

/// Output from a successful test recording
#[derive(Debug, Clone)]
pub struct TestRecordOutput {
    pub codec: CodecIdentifier,
    pub path: PathBuf,
    pub size: String,
}

/// Callbacks for progress and status updates
#[derive(Default)]
#[allow(clippy::type_complexity)]
pub struct TestRecordCallbacks {
    /// Called once the trigger is held and recording begins
    pub on_recording_start: Option<Box<dyn Fn(&CodecIdentifier) + Send + Sync>>,
    /// Called with the saved path and the artifact size
    pub on_saved: Option<Box<dyn Fn(&PathBuf, &str) + Send + Sync>>,
}

/// Records a short clip for a trigger's codec and hands it to the download sink.
pub struct TestRecordUseCase<F, D>
where
    F: RecorderFactory,
    D: DownloadSink,
{
    pipeline: RecordingPipeline<F>,
    downloads: D,
}

impl<F, D> TestRecordUseCase<F, D>
where
    F: RecorderFactory,
    D: DownloadSink,
{
    pub fn new(pipeline: RecordingPipeline<F>, downloads: D) -> Self {
        Self {
            pipeline,
            downloads,
        }
    }

    pub fn pipeline(&self) -> &RecordingPipeline<F> {
        &self.pipeline
    }

    /// Run one test recording.
    ///
    /// The trigger stays disabled from the start of recording until the
    /// artifact is saved or the job fails, and is re-enabled on every path.
    pub async fn execute(
        &self,
        trigger: &RecordTrigger,
        stream: Option<&CaptureStream>,
        duration: Duration,
        callbacks: &TestRecordCallbacks,
    ) -> Result<TestRecordOutput, TestRecordError> {
        if !stream.is_some_and(CaptureStream::is_active) {
            return Err(TestRecordError::NoActiveStream);
        }

        let codec = trigger.codec().clone();
        let _guard = trigger
            .try_begin()
            .ok_or_else(|| TestRecordError::Busy(codec.clone()))?;

        if let Some(ref cb) = callbacks.on_recording_start {
            cb(&codec);
        }

        let artifact = self.pipeline.record(&codec, stream, duration).await?;
        let size = artifact.human_readable_size();
        let path = self.downloads.save(artifact).await?;
        info!(codec = %codec, path = %path.display(), "test recording saved");

        if let Some(ref cb) = callbacks.on_saved {
            cb(&path, &size);
        }

        Ok(TestRecordOutput { codec, path, size })
    }
}
