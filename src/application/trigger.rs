//! Per-codec record control

use std::sync::atomic::{AtomicBool, Ordering};

use crate::domain::codec::CodecIdentifier;

/// Label shown while the trigger can be used
pub const IDLE_LABEL: &str = "Test Record";
/// Label shown while a job owns the trigger
pub const BUSY_LABEL: &str = "Recording...";

/// A record action bound to one codec.
///
/// The enabled flag is owned by whichever job currently holds the
/// [`TriggerGuard`]; nothing else flips it.
#[derive(Debug)]
pub struct RecordTrigger {
    codec: CodecIdentifier,
    enabled: AtomicBool,
}

impl RecordTrigger {
    pub fn new(codec: CodecIdentifier) -> Self {
        Self {
            codec,
            enabled: AtomicBool::new(true),
        }
    }

    pub fn codec(&self) -> &CodecIdentifier {
        &self.codec
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    pub fn label(&self) -> &'static str {
        if self.is_enabled() {
            IDLE_LABEL
        } else {
            BUSY_LABEL
        }
    }

    /// Disable the trigger for the lifetime of the returned guard.
    /// Returns `None` while another job holds it.
    pub fn try_begin(&self) -> Option<TriggerGuard<'_>> {
        self.enabled
            .compare_exchange(true, false, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| TriggerGuard { trigger: self })
    }
}

/// Re-enables its trigger when dropped, whatever the job's outcome.
#[derive(Debug)]
pub struct TriggerGuard<'a> {
    trigger: &'a RecordTrigger,
}

impl Drop for TriggerGuard<'_> {
    fn drop(&mut self) {
        self.trigger.enabled.store(true, Ordering::SeqCst);
    }
}
