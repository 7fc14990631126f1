//! Codec support probe

use thiserror::Error;
use tracing::{debug, info};

use crate::domain::codec::{CodecCatalog, CodecIdentifier, SupportVerdict};

use super::ports::CapabilityQuery;

/// The host has no recording facility at all
#[derive(Debug, Clone, Error)]
#[error("Media recording is not supported on this host")]
pub struct PlatformUnsupportedError;

/// Classifies codec identifiers against the host capability query.
pub struct SupportProbe<Q: CapabilityQuery> {
    query: Q,
}

impl<Q: CapabilityQuery> SupportProbe<Q> {
    pub fn new(query: Q) -> Self {
        Self { query }
    }

    /// Whether the recording facility exists
    pub fn is_supported(&self) -> bool {
        self.query.available()
    }

    /// Verdict for a single codec
    pub fn probe(&self, codec: &CodecIdentifier) -> bool {
        self.query.supported(codec)
    }

    /// Classify every catalog entry, in catalog order.
    ///
    /// When the facility is absent no per-codec query is made and the single
    /// aggregate error is returned instead.
    pub fn classify(
        &self,
        catalog: &CodecCatalog,
    ) -> Result<Vec<SupportVerdict>, PlatformUnsupportedError> {
        if !self.is_supported() {
            info!("recording facility absent, skipping codec probe");
            return Err(PlatformUnsupportedError);
        }

        let verdicts: Vec<SupportVerdict> = catalog
            .iter()
            .map(|codec| {
                let supported = self.probe(codec);
                debug!(codec = %codec, supported, "probed codec");
                SupportVerdict::new(codec.clone(), supported)
            })
            .collect();

        info!(
            total = verdicts.len(),
            supported = verdicts.iter().filter(|v| v.supported).count(),
            "codec probe finished"
        );
        Ok(verdicts)
    }

    pub fn query(&self) -> &Q {
        &self.query
    }
}
