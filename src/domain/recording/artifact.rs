//! Finalized recording artifact

use crate::domain::codec::CodecIdentifier;

/// The downloadable result of a completed recording job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    bytes: Vec<u8>,
    mime_type: CodecIdentifier,
    suggested_filename: String,
}

impl Artifact {
    /// Concatenate fragments in the given order and tag the result with `codec`
    pub fn from_fragments(codec: &CodecIdentifier, fragments: Vec<Vec<u8>>) -> Self {
        let total: usize = fragments.iter().map(Vec::len).sum();
        let mut bytes = Vec::with_capacity(total);
        for fragment in fragments {
            bytes.extend_from_slice(&fragment);
        }

        Self {
            bytes,
            mime_type: codec.clone(),
            suggested_filename: codec.suggested_filename(),
        }
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Declared type, always the codec the job recorded with
    pub fn mime_type(&self) -> &CodecIdentifier {
        &self.mime_type
    }

    pub fn suggested_filename(&self) -> &str {
        &self.suggested_filename
    }

    pub fn size_bytes(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Get human-readable size
    pub fn human_readable_size(&self) -> String {
        let bytes = self.size_bytes();
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        }
    }
}
