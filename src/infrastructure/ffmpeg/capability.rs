//! Recording capability detection from the ffmpeg executable

use std::collections::HashSet;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, warn};

use crate::application::ports::CapabilityQuery;
use crate::domain::codec::CodecIdentifier;

use super::format::EncodePlan;

/// Encoders and muxers a local ffmpeg build offers.
///
/// An instance built by [`FfmpegCapabilities::unavailable`] answers
/// `available() == false`, which the probe reports as an unsupported platform.
#[derive(Debug, Clone, Default)]
pub struct FfmpegCapabilities {
    available: bool,
    version: Option<String>,
    encoders: HashSet<String>,
    muxers: HashSet<String>,
}

impl FfmpegCapabilities {
    /// Query `ffmpeg` once for its encoders, muxers and version.
    pub async fn detect(ffmpeg: &str) -> Self {
        let encoders = match run_listing(ffmpeg, "-encoders").await {
            Some(out) => out,
            None => {
                warn!(ffmpeg, "media backend not runnable, recording unavailable");
                return Self::unavailable();
            }
        };
        let muxers = run_listing(ffmpeg, "-muxers").await.unwrap_or_default();
        let version = run_listing(ffmpeg, "-version")
            .await
            .and_then(|out| parse_version(&out));

        let caps = Self::from_listings(&encoders, &muxers).with_version(version);
        debug!(
            ffmpeg,
            encoders = caps.encoders.len(),
            muxers = caps.muxers.len(),
            "detected media backend"
        );
        caps
    }

    /// A host without the recording facility
    pub fn unavailable() -> Self {
        Self::default()
    }

    /// Build from `ffmpeg -encoders` and `ffmpeg -muxers` output
    pub fn from_listings(encoders: &str, muxers: &str) -> Self {
        Self {
            available: true,
            version: None,
            encoders: parse_listing(encoders),
            muxers: parse_listing(muxers),
        }
    }

    pub fn with_version(mut self, version: Option<String>) -> Self {
        self.version = version;
        self
    }

    /// Backend version line, e.g. "ffmpeg version 6.1.1"
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn has_encoder(&self, name: &str) -> bool {
        self.encoders.contains(name)
    }

    pub fn has_muxer(&self, name: &str) -> bool {
        self.muxers.contains(name)
    }
}

impl CapabilityQuery for FfmpegCapabilities {
    fn available(&self) -> bool {
        self.available
    }

    fn supported(&self, codec: &CodecIdentifier) -> bool {
        let Some(plan) = EncodePlan::resolve(codec) else {
            return false;
        };
        self.has_muxer(plan.muxer) && plan.encoders().all(|e| self.has_encoder(e))
    }
}

async fn run_listing(ffmpeg: &str, flag: &str) -> Option<String> {
    let output = Command::new(ffmpeg)
        .arg("-hide_banner")
        .arg(flag)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .await
        .ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Names from an ffmpeg component listing.
///
/// Entries follow a dashed separator line; each is a flag column followed by
/// a name (muxers may list several comma-separated names).
pub fn parse_listing(output: &str) -> HashSet<String> {
    output
        .lines()
        .skip_while(|line| !line.trim_start().starts_with("--"))
        .skip(1)
        .filter_map(|line| {
            let mut fields = line.split_whitespace();
            let _flags = fields.next()?;
            fields.next()
        })
        .flat_map(|names| names.split(','))
        .map(str::to_string)
        .collect()
}

fn parse_version(output: &str) -> Option<String> {
    let first = output.lines().next()?.trim();
    let version = first.split(" Copyright").next().unwrap_or(first).trim();
    (!version.is_empty()).then(|| version.to_string())
}
