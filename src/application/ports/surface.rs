//! Display surface port interface

use super::capture::VideoFrame;

/// Port for the surface the camera preview is drawn onto
pub trait FrameSurface: Send + Sync {
    /// Draw a frame. Called at most once per render tick.
    fn present(&self, frame: &VideoFrame);
}
