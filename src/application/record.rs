//! Fixed-duration recording pipeline

use std::time::Duration as StdDuration;

use thiserror::Error;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::{interval, sleep, timeout, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::codec::CodecIdentifier;
use crate::domain::recording::{
    Artifact, Duration, InvalidStateTransition, RecordingJob, DEFAULT_STOP_TIMEOUT_SECS,
};

use super::ports::{CaptureStream, RecorderError, RecorderEvent, RecorderFactory};

/// Errors from a recording job
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Camera is not active.")]
    NoActiveStream,

    #[error("Recording failed: {0}")]
    RecorderConstruction(#[source] RecorderError),

    #[error("Recording failed: {0}")]
    Capture(String),

    #[error("Recording failed: recorder did not confirm stop within {0:?}")]
    FinalizeTimeout(StdDuration),

    #[error("Recording failed: {0}")]
    State(#[from] InvalidStateTransition),
}

/// How often the stream's tracks are checked while the window runs
pub const LIVENESS_INTERVAL: StdDuration = StdDuration::from_millis(100);

/// Runs bounded recordings against a shared capture stream.
pub struct RecordingPipeline<F: RecorderFactory> {
    factory: F,
    stop_timeout: Option<StdDuration>,
}

impl<F: RecorderFactory> RecordingPipeline<F> {
    /// Create a pipeline with the default stop confirmation bound
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            stop_timeout: Some(StdDuration::from_secs(DEFAULT_STOP_TIMEOUT_SECS)),
        }
    }

    /// Bound the wait for the recorder's stop confirmation. `None` waits forever.
    pub fn with_stop_timeout(mut self, stop_timeout: Option<StdDuration>) -> Self {
        self.stop_timeout = stop_timeout;
        self
    }

    pub fn stop_timeout(&self) -> Option<StdDuration> {
        self.stop_timeout
    }

    /// Record `duration` of `stream` encoded as `codec`.
    ///
    /// The stream is only read. Fails with [`RecordError::NoActiveStream`]
    /// before any recorder exists when there is no live stream.
    pub async fn record(
        &self,
        codec: &CodecIdentifier,
        stream: Option<&CaptureStream>,
        duration: Duration,
    ) -> Result<Artifact, RecordError> {
        let stream = match stream {
            Some(stream) if stream.is_active() => stream,
            _ => {
                warn!(codec = %codec, "record requested without an active stream");
                return Err(RecordError::NoActiveStream);
            }
        };

        let mut job = RecordingJob::new(codec.clone());
        match self.run(&mut job, stream, duration).await {
            Ok(artifact) => {
                info!(
                    codec = %codec,
                    bytes = artifact.size_bytes(),
                    filename = artifact.suggested_filename(),
                    "recording complete"
                );
                Ok(artifact)
            }
            Err(e) => {
                let from = job.state();
                let _ = job.fail(e.to_string());
                warn!(codec = %codec, state = %from, error = %e, "recording failed");
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        job: &mut RecordingJob,
        stream: &CaptureStream,
        duration: Duration,
    ) -> Result<Artifact, RecordError> {
        let codec = job.codec().clone();
        let mut recorder = self
            .factory
            .create(stream, &codec)
            .map_err(RecordError::RecorderConstruction)?;
        let mut events = recorder
            .start()
            .await
            .map_err(RecordError::RecorderConstruction)?;
        job.begin_recording()?;
        debug!(codec = %codec, duration = %duration, "recording");

        // The full window always elapses, however early fragments arrive
        let window = sleep(duration.as_std());
        tokio::pin!(window);
        let mut liveness = interval(LIVENESS_INTERVAL);
        liveness.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                _ = &mut window => break,
                _ = liveness.tick() => {
                    if !stream.is_active() {
                        return Err(RecordError::Capture(
                            "camera stopped during recording".to_string(),
                        ));
                    }
                }
                event = events.recv() => match event {
                    Some(RecorderEvent::Data(fragment)) => {
                        job.push_fragment(fragment)?;
                    }
                    Some(RecorderEvent::Error(message)) => {
                        return Err(RecordError::Capture(message));
                    }
                    Some(RecorderEvent::Stopped) | None => {
                        return Err(RecordError::Capture(
                            "recorder stopped before the recording window elapsed".to_string(),
                        ));
                    }
                },
            }
        }

        job.begin_finalizing()?;
        debug!(codec = %codec, fragments = job.fragment_count(), "finalizing");
        recorder
            .stop()
            .await
            .map_err(|e| RecordError::Capture(e.to_string()))?;

        let confirmation = drain_until_stopped(job, &mut events);
        match self.stop_timeout {
            Some(limit) => timeout(limit, confirmation)
                .await
                .map_err(|_| RecordError::FinalizeTimeout(limit))??,
            None => confirmation.await?,
        }

        Ok(job.complete()?)
    }
}

/// Collect late fragments until the recorder confirms it has stopped.
async fn drain_until_stopped(
    job: &mut RecordingJob,
    events: &mut UnboundedReceiver<RecorderEvent>,
) -> Result<(), RecordError> {
    loop {
        match events.recv().await {
            Some(RecorderEvent::Data(fragment)) => {
                job.push_fragment(fragment)?;
            }
            Some(RecorderEvent::Stopped) => return Ok(()),
            Some(RecorderEvent::Error(message)) => return Err(RecordError::Capture(message)),
            None => {
                return Err(RecordError::Capture(
                    "recorder closed without confirming stop".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{MediaRecorder, MediaTrack, StreamSettings, TrackKind};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tokio::sync::{broadcast, mpsc};

    struct LiveTrack;

    impl MediaTrack for LiveTrack {
        fn kind(&self) -> TrackKind {
            TrackKind::Video
        }
        fn label(&self) -> &str {
            "live"
        }
        fn is_live(&self) -> bool {
            true
        }
        fn stop(&self) {}
    }

    fn stream() -> CaptureStream {
        let (frames, _) = broadcast::channel(4);
        let track: Arc<dyn MediaTrack> = Arc::new(LiveTrack);
        CaptureStream::new(
            "test",
            StreamSettings {
                width: 2,
                height: 2,
                frame_rate: 30,
            },
            vec![track],
            frames,
        )
    }

    /// Emits its fragments immediately and confirms stop right away.
    struct InstantRecorder {
        fragments: Vec<Vec<u8>>,
        tx: Option<mpsc::UnboundedSender<RecorderEvent>>,
    }

    #[async_trait]
    impl MediaRecorder for InstantRecorder {
        async fn start(&mut self) -> Result<UnboundedReceiver<RecorderEvent>, RecorderError> {
            let (tx, rx) = mpsc::unbounded_channel();
            for fragment in self.fragments.drain(..) {
                let _ = tx.send(RecorderEvent::Data(fragment));
            }
            self.tx = Some(tx);
            Ok(rx)
        }

        async fn stop(&mut self) -> Result<(), RecorderError> {
            if let Some(tx) = self.tx.take() {
                let _ = tx.send(RecorderEvent::Stopped);
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct InstantFactory {
        created: AtomicUsize,
        reject: bool,
    }

    impl RecorderFactory for InstantFactory {
        fn create(
            &self,
            _stream: &CaptureStream,
            codec: &CodecIdentifier,
        ) -> Result<Box<dyn MediaRecorder>, RecorderError> {
            self.created.fetch_add(1, Ordering::SeqCst);
            if self.reject {
                return Err(RecorderError::Construction {
                    codec: codec.clone(),
                    message: "encoder missing".to_string(),
                });
            }
            Ok(Box::new(InstantRecorder {
                fragments: vec![b"A".to_vec(), Vec::new(), b"B".to_vec()],
                tx: None,
            }))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn records_and_skips_empty_fragments() {
        let pipeline = RecordingPipeline::new(InstantFactory::default());
        let codec = CodecIdentifier::new("video/webm");
        let stream = stream();

        let artifact = pipeline
            .record(&codec, Some(&stream), Duration::from_millis(100))
            .await
            .unwrap();

        assert_eq!(artifact.bytes(), b"AB");
        assert_eq!(artifact.mime_type(), &codec);
    }

    #[tokio::test]
    async fn missing_stream_never_constructs_recorder() {
        let pipeline = RecordingPipeline::new(InstantFactory::default());

        let err = pipeline
            .record(
                &CodecIdentifier::new("video/webm"),
                None,
                Duration::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RecordError::NoActiveStream));
        assert_eq!(pipeline.factory.created.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn construction_failure_is_reported() {
        let pipeline = RecordingPipeline::new(InstantFactory {
            reject: true,
            ..Default::default()
        });
        let stream = stream();

        let err = pipeline
            .record(
                &CodecIdentifier::new("video/webm;codecs=h264"),
                Some(&stream),
                Duration::default(),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, RecordError::RecorderConstruction(_)));
        assert!(err.to_string().starts_with("Recording failed:"));
        assert!(err.to_string().contains("encoder missing"));
    }

    #[test]
    fn default_stop_timeout_is_bounded() {
        let pipeline = RecordingPipeline::new(InstantFactory::default());
        assert_eq!(pipeline.stop_timeout(), Some(StdDuration::from_secs(10)));
        let unbounded = pipeline.with_stop_timeout(None);
        assert_eq!(unbounded.stop_timeout(), None);
    }
}
