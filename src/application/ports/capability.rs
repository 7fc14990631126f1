//! Capability query port interface

use crate::domain::codec::CodecIdentifier;

/// Port for the host's recording capability query
pub trait CapabilityQuery: Send + Sync {
    /// Whether the recording facility exists at all on this host
    fn available(&self) -> bool;

    /// Whether the host reports it can record `codec`.
    ///
    /// Only meaningful when `available()` is true.
    fn supported(&self, codec: &CodecIdentifier) -> bool;
}
