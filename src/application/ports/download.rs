//! Download port interface

use std::path::PathBuf;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::recording::Artifact;

/// Download errors
#[derive(Debug, Clone, Error)]
pub enum DownloadError {
    #[error("Failed to prepare download location: {0}")]
    Location(String),

    #[error("Failed to save {filename}: {message}")]
    SaveFailed { filename: String, message: String },
}

/// Port for handing a finished artifact to the user
#[async_trait]
pub trait DownloadSink: Send + Sync {
    /// Save the artifact under (a variant of) its suggested filename.
    ///
    /// # Returns
    /// Where the artifact ended up
    async fn save(&self, artifact: Artifact) -> Result<PathBuf, DownloadError>;
}
