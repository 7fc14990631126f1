//! Preview surface adapters

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};

use crate::application::ports::{FrameSurface, VideoFrame};

/// Terminal stand-in for a video element: counts presented frames and
/// remembers the size of the last one for status output.
#[derive(Debug, Default)]
pub struct PreviewStats {
    presented: AtomicU64,
    last_sequence: AtomicU64,
    width: AtomicU32,
    height: AtomicU32,
}

impl PreviewStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames drawn so far
    pub fn presented(&self) -> u64 {
        self.presented.load(Ordering::SeqCst)
    }

    /// Sequence number of the last frame drawn
    pub fn last_sequence(&self) -> Option<u64> {
        (self.presented() > 0).then(|| self.last_sequence.load(Ordering::SeqCst))
    }

    /// Size of the last frame drawn
    pub fn last_size(&self) -> Option<(u32, u32)> {
        if self.presented() == 0 {
            return None;
        }
        Some((
            self.width.load(Ordering::SeqCst),
            self.height.load(Ordering::SeqCst),
        ))
    }
}

impl FrameSurface for PreviewStats {
    fn present(&self, frame: &VideoFrame) {
        self.width.store(frame.width, Ordering::SeqCst);
        self.height.store(frame.height, Ordering::SeqCst);
        self.last_sequence.store(frame.sequence, Ordering::SeqCst);
        self.presented.fetch_add(1, Ordering::SeqCst);
    }
}
