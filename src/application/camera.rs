//! Camera session: owns the capture stream and the preview render loop

use std::fmt;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use tokio::sync::broadcast::{self, error::TryRecvError};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info, warn};

use super::ports::{
    AcquisitionError, CaptureConstraints, CaptureDevice, CaptureStream, FrameSurface, VideoFrame,
};

/// Default preview cadence, roughly one display refresh at 60 Hz
pub const RENDER_INTERVAL: StdDuration = StdDuration::from_millis(16);

/// Camera status as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CameraStatus {
    #[default]
    Inactive,
    Active,
    Failed(String),
    Stopped,
}

impl fmt::Display for CameraStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inactive => write!(f, "Camera inactive"),
            Self::Active => write!(f, "Camera active"),
            Self::Failed(message) => write!(f, "{}", message),
            Self::Stopped => write!(f, "Camera stopped"),
        }
    }
}

/// Single owner of the page-wide capture stream.
///
/// Dropping the session stops the camera.
pub struct CameraSession<D, S>
where
    D: CaptureDevice,
    S: FrameSurface + 'static,
{
    device: D,
    surface: Arc<S>,
    constraints: CaptureConstraints,
    render_interval: StdDuration,
    stream: Option<Arc<CaptureStream>>,
    render_task: Option<JoinHandle<()>>,
    status: CameraStatus,
}

impl<D, S> CameraSession<D, S>
where
    D: CaptureDevice,
    S: FrameSurface + 'static,
{
    pub fn new(device: D, surface: Arc<S>, constraints: CaptureConstraints) -> Self {
        Self {
            device,
            surface,
            constraints,
            render_interval: RENDER_INTERVAL,
            stream: None,
            render_task: None,
            status: CameraStatus::Inactive,
        }
    }

    /// Override the preview cadence
    pub fn with_render_interval(mut self, render_interval: StdDuration) -> Self {
        self.render_interval = render_interval;
        self
    }

    /// Acquire the camera and start the preview.
    ///
    /// Returns the already active stream if there is one. A failure is kept as
    /// the session status and not retried.
    pub async fn start(&mut self) -> Result<Arc<CaptureStream>, AcquisitionError> {
        if let Some(ref stream) = self.stream {
            if stream.is_active() {
                return Ok(Arc::clone(stream));
            }
        }
        // A previous stream that went dead on its own still needs teardown
        self.stop();

        match self.device.acquire(&self.constraints).await {
            Ok(stream) => {
                let stream = Arc::new(stream);
                let frames = stream.subscribe();
                self.render_task = Some(tokio::spawn(render_loop(
                    Arc::clone(&stream),
                    frames,
                    Arc::clone(&self.surface),
                    self.render_interval,
                )));
                info!(
                    stream = stream.id(),
                    width = stream.settings().width,
                    height = stream.settings().height,
                    "camera active"
                );
                self.stream = Some(Arc::clone(&stream));
                self.status = CameraStatus::Active;
                Ok(stream)
            }
            Err(e) => {
                warn!(error = %e, "camera acquisition failed");
                self.status = CameraStatus::Failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Stop the preview and release the hardware. Safe to call repeatedly and
    /// before `start` ever completed.
    pub fn stop(&mut self) {
        if let Some(task) = self.render_task.take() {
            task.abort();
        }
        if let Some(stream) = self.stream.take() {
            let stopped = stream.stop_tracks();
            info!(stream = stream.id(), tracks = stopped, "camera stopped");
            self.status = CameraStatus::Stopped;
        }
    }

    /// The current stream, if the camera is running
    pub fn stream(&self) -> Option<Arc<CaptureStream>> {
        self.stream
            .as_ref()
            .filter(|stream| stream.is_active())
            .map(Arc::clone)
    }

    pub fn status(&self) -> &CameraStatus {
        &self.status
    }

    /// Status line for the presenter
    pub fn status_message(&self) -> String {
        self.status.to_string()
    }

    pub fn is_active(&self) -> bool {
        self.stream().is_some()
    }

    pub fn surface(&self) -> &Arc<S> {
        &self.surface
    }
}

impl<D, S> Drop for CameraSession<D, S>
where
    D: CaptureDevice,
    S: FrameSurface + 'static,
{
    fn drop(&mut self) {
        self.stop();
    }
}

/// Copy the newest frame to the surface once per tick until the stream dies.
async fn render_loop<S: FrameSurface>(
    stream: Arc<CaptureStream>,
    mut frames: broadcast::Receiver<VideoFrame>,
    surface: Arc<S>,
    period: StdDuration,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;

        let mut latest = None;
        let mut closed = false;
        loop {
            match frames.try_recv() {
                Ok(frame) => latest = Some(frame),
                Err(TryRecvError::Lagged(skipped)) => {
                    debug!(skipped, "preview skipped frames");
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    closed = true;
                    break;
                }
            }
        }

        if let Some(frame) = latest {
            surface.present(&frame);
        }

        if closed || !stream.is_active() {
            debug!(stream = stream.id(), "render loop finished");
            break;
        }
    }
}
