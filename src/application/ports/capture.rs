//! Camera capture port interfaces

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

/// Bytes per pixel of the packed RGB frames carried by a capture stream
pub const BYTES_PER_PIXEL: usize = 3;

/// Frames buffered per subscriber before the slowest one starts lagging
pub const FRAME_BUFFER: usize = 64;

/// Camera acquisition errors
#[derive(Debug, Clone, Error)]
pub enum AcquisitionError {
    #[error("Camera access denied: {0}")]
    PermissionDenied(String),

    #[error("No camera available: {0}")]
    DeviceUnavailable(String),

    #[error("Error accessing camera: {0}")]
    Failed(String),
}

/// Resolution and cadence requested from the camera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureConstraints {
    pub ideal_width: u32,
    pub ideal_height: u32,
    pub frame_rate: u32,
}

impl Default for CaptureConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 640,
            ideal_height: 480,
            frame_rate: 30,
        }
    }
}

/// Settings the device actually delivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub width: u32,
    pub height: u32,
    pub frame_rate: u32,
}

impl StreamSettings {
    /// Size in bytes of one packed RGB frame
    pub fn frame_size(&self) -> usize {
        self.width as usize * self.height as usize * BYTES_PER_PIXEL
    }
}

impl From<CaptureConstraints> for StreamSettings {
    fn from(c: CaptureConstraints) -> Self {
        Self {
            width: c.ideal_width,
            height: c.ideal_height,
            frame_rate: c.frame_rate,
        }
    }
}

/// One packed RGB24 video frame. Cloning shares the pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct VideoFrame {
    pub sequence: u64,
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
}

impl fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VideoFrame")
            .field("sequence", &self.sequence)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("bytes", &self.data.len())
            .finish()
    }
}

/// Kind of hardware a track reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

/// A single hardware track of a capture stream
pub trait MediaTrack: Send + Sync {
    fn kind(&self) -> TrackKind;

    /// Human-readable device label
    fn label(&self) -> &str;

    /// Whether the track is still delivering data
    fn is_live(&self) -> bool;

    /// Release the underlying hardware
    fn stop(&self);
}

/// Live handle to the camera: its tracks plus a broadcast of decoded frames.
///
/// Recorders subscribe to the frames and never stop tracks; only the owning
/// camera session does.
pub struct CaptureStream {
    id: String,
    settings: StreamSettings,
    tracks: Vec<Arc<dyn MediaTrack>>,
    frames: broadcast::Sender<VideoFrame>,
}

impl CaptureStream {
    pub fn new(
        id: impl Into<String>,
        settings: StreamSettings,
        tracks: Vec<Arc<dyn MediaTrack>>,
        frames: broadcast::Sender<VideoFrame>,
    ) -> Self {
        Self {
            id: id.into(),
            settings,
            tracks,
            frames,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn settings(&self) -> StreamSettings {
        self.settings
    }

    pub fn tracks(&self) -> &[Arc<dyn MediaTrack>] {
        &self.tracks
    }

    pub fn has_track(&self, kind: TrackKind) -> bool {
        self.tracks.iter().any(|t| t.kind() == kind)
    }

    /// A stream is active while any of its tracks is live
    pub fn is_active(&self) -> bool {
        self.tracks.iter().any(|t| t.is_live())
    }

    /// Receive every frame published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<VideoFrame> {
        self.frames.subscribe()
    }

    /// Stop every track. Returns how many tracks were stopped.
    pub(crate) fn stop_tracks(&self) -> usize {
        for track in &self.tracks {
            track.stop();
        }
        self.tracks.len()
    }
}

impl fmt::Debug for CaptureStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CaptureStream")
            .field("id", &self.id)
            .field("settings", &self.settings)
            .field("tracks", &self.tracks.len())
            .field("active", &self.is_active())
            .finish()
    }
}

/// Port for acquiring camera hardware
#[async_trait]
pub trait CaptureDevice: Send + Sync {
    /// Request access to the camera.
    ///
    /// # Arguments
    /// * `constraints` - Preferred resolution and frame rate
    ///
    /// # Returns
    /// A live capture stream, or the platform's reason for refusing
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<CaptureStream, AcquisitionError>;
}
