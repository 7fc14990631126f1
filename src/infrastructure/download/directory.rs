//! Saves artifacts into a local directory

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tempfile::NamedTempFile;
use tracing::debug;

use crate::application::ports::{DownloadError, DownloadSink};
use crate::domain::recording::Artifact;

/// Upper bound on `name (n).ext` attempts
const MAX_COPIES: u32 = 10_000;

/// Writes each artifact into one directory, never replacing an existing file.
///
/// Bytes are staged in a temporary file inside the directory and moved into
/// place, so a half-written file never carries the final name.
#[derive(Debug, Clone)]
pub struct DirectoryDownloads {
    dir: PathBuf,
}

impl DirectoryDownloads {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn save_blocking(dir: &Path, artifact: &Artifact) -> Result<PathBuf, DownloadError> {
        let filename = artifact.suggested_filename();
        let save_failed = |e: io::Error| DownloadError::SaveFailed {
            filename: filename.to_string(),
            message: e.to_string(),
        };

        std::fs::create_dir_all(dir)
            .map_err(|e| DownloadError::Location(format!("{}: {}", dir.display(), e)))?;

        let mut staged = NamedTempFile::new_in(dir).map_err(save_failed)?;
        staged.write_all(artifact.bytes()).map_err(save_failed)?;
        staged.flush().map_err(save_failed)?;

        for copy in 0..MAX_COPIES {
            let target = dir.join(numbered_filename(filename, copy));
            match staged.persist_noclobber(&target) {
                Ok(_) => return Ok(target),
                Err(e) if e.error.kind() == io::ErrorKind::AlreadyExists => {
                    staged = e.file;
                }
                Err(e) => return Err(save_failed(e.error)),
            }
        }

        Err(DownloadError::SaveFailed {
            filename: filename.to_string(),
            message: "too many copies with this name".to_string(),
        })
    }
}

#[async_trait]
impl DownloadSink for DirectoryDownloads {
    async fn save(&self, artifact: Artifact) -> Result<PathBuf, DownloadError> {
        let dir = self.dir.clone();
        let filename = artifact.suggested_filename().to_string();
        let path = tokio::task::spawn_blocking(move || Self::save_blocking(&dir, &artifact))
            .await
            .map_err(|e| DownloadError::SaveFailed {
                filename,
                message: e.to_string(),
            })??;
        debug!(path = %path.display(), "artifact saved");
        Ok(path)
    }
}

/// `name.ext`, then `name (1).ext`, `name (2).ext`, ...
fn numbered_filename(filename: &str, copy: u32) -> String {
    if copy == 0 {
        return filename.to_string();
    }
    match filename.rfind('.') {
        Some(dot) if dot > 0 => {
            format!("{} ({}){}", &filename[..dot], copy, &filename[dot..])
        }
        _ => format!("{} ({})", filename, copy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::codec::CodecIdentifier;
    use tempfile::tempdir;

    fn artifact(bytes: &[u8]) -> Artifact {
        Artifact::from_fragments(&CodecIdentifier::new("video/webm"), vec![bytes.to_vec()])
    }

    #[test]
    fn numbered_names() {
        assert_eq!(numbered_filename("record-video_webm.webm", 0), "record-video_webm.webm");
        assert_eq!(numbered_filename("record-video_webm.webm", 1), "record-video_webm (1).webm");
        assert_eq!(numbered_filename("noext", 2), "noext (2)");
        assert_eq!(numbered_filename(".hidden", 1), ".hidden (1)");
    }

    #[tokio::test]
    async fn saves_under_suggested_name() {
        let dir = tempdir().unwrap();
        let sink = DirectoryDownloads::new(dir.path());

        let path = sink.save(artifact(b"webm-bytes")).await.unwrap();

        assert_eq!(path, dir.path().join("record-video_webm.webm"));
        assert_eq!(std::fs::read(&path).unwrap(), b"webm-bytes");
    }

    #[tokio::test]
    async fn never_overwrites_existing_files() {
        let dir = tempdir().unwrap();
        let sink = DirectoryDownloads::new(dir.path());

        let first = sink.save(artifact(b"one")).await.unwrap();
        let second = sink.save(artifact(b"two")).await.unwrap();
        let third = sink.save(artifact(b"three")).await.unwrap();

        assert_eq!(std::fs::read(&first).unwrap(), b"one");
        assert_eq!(second, dir.path().join("record-video_webm (1).webm"));
        assert_eq!(std::fs::read(&second).unwrap(), b"two");
        assert_eq!(third, dir.path().join("record-video_webm (2).webm"));
    }

    #[tokio::test]
    async fn leaves_no_staging_files() {
        let dir = tempdir().unwrap();
        let sink = DirectoryDownloads::new(dir.path());

        sink.save(artifact(b"x")).await.unwrap();
        sink.save(artifact(b"y")).await.unwrap();

        let entries = std::fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(entries, 2);
    }

    #[tokio::test]
    async fn creates_missing_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let sink = DirectoryDownloads::new(&nested);

        let path = sink.save(artifact(b"z")).await.unwrap();
        assert!(path.starts_with(&nested));
    }
}
