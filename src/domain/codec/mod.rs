//! Codec identifiers, the candidate catalog and probe verdicts

mod catalog;
mod identifier;

use serde::Serialize;

pub use catalog::{CodecCatalog, DEFAULT_CODECS};
pub use identifier::{CodecIdentifier, MediaKind, DEFAULT_EXTENSION, FILENAME_PREFIX};

/// Result of probing a single codec
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SupportVerdict {
    pub codec: CodecIdentifier,
    pub supported: bool,
}

impl SupportVerdict {
    pub fn new(codec: CodecIdentifier, supported: bool) -> Self {
        Self { codec, supported }
    }
}
