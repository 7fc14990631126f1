//! Codec identifier value object

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::error::InvalidCodecError;

/// Prefix of every suggested download filename
pub const FILENAME_PREFIX: &str = "record-";

/// Extension used when no container rule matches
pub const DEFAULT_EXTENSION: &str = "webm";

/// Ordered container rules, first match wins.
const EXTENSION_RULES: &[(&[&str], &str)] = &[
    (&["video/mp4", "audio/mp4"], "mp4"),
    (&["video/ogg", "audio/ogg"], "ogv"),
];

/// Top-level media type of a codec identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Video,
    Audio,
    Other,
}

/// A container/codec string such as `video/webm;codecs=vp9`.
///
/// The value is opaque: equality is exact string equality, and the helper
/// views below never alter the stored text.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CodecIdentifier(String);

impl CodecIdentifier {
    /// Wrap a codec string without validation
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The identifier exactly as given
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Container essence: the text before the first `;`, trimmed and lowercased
    pub fn container(&self) -> String {
        self.0
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase()
    }

    /// Top-level media type of the container
    pub fn media_kind(&self) -> MediaKind {
        let container = self.container();
        match container.split('/').next() {
            Some("video") => MediaKind::Video,
            Some("audio") => MediaKind::Audio,
            _ => MediaKind::Other,
        }
    }

    /// Entries of the `codecs=` parameter, lowercased, quotes stripped
    pub fn codecs(&self) -> Vec<String> {
        self.0
            .split(';')
            .skip(1)
            .filter_map(|param| {
                let (key, value) = param.split_once('=')?;
                if key.trim().eq_ignore_ascii_case("codecs") {
                    Some(value)
                } else {
                    None
                }
            })
            .flat_map(|value| value.trim().trim_matches('"').split(','))
            .map(|codec| codec.trim().to_ascii_lowercase())
            .filter(|codec| !codec.is_empty())
            .collect()
    }

    /// File extension chosen by prefix match on the raw identifier
    pub fn file_extension(&self) -> &'static str {
        EXTENSION_RULES
            .iter()
            .find(|(prefixes, _)| prefixes.iter().any(|p| self.0.starts_with(p)))
            .map(|(_, ext)| *ext)
            .unwrap_or(DEFAULT_EXTENSION)
    }

    /// The identifier with every run of non-alphanumeric characters replaced by `_`
    pub fn file_stem(&self) -> String {
        let mut stem = String::with_capacity(self.0.len());
        let mut in_run = false;
        for ch in self.0.chars() {
            if ch.is_ascii_alphanumeric() {
                stem.push(ch);
                in_run = false;
            } else if !in_run {
                stem.push('_');
                in_run = true;
            }
        }
        stem
    }

    /// `record-<stem>.<ext>`
    pub fn suggested_filename(&self) -> String {
        format!(
            "{}{}.{}",
            FILENAME_PREFIX,
            self.file_stem(),
            self.file_extension()
        )
    }
}

impl FromStr for CodecIdentifier {
    type Err = InvalidCodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let essence = s.split(';').next().unwrap_or_default().trim();
        let valid = match essence.split_once('/') {
            Some((kind, subtype)) => !kind.is_empty() && !subtype.is_empty(),
            None => false,
        };

        if !valid {
            return Err(InvalidCodecError {
                input: s.to_string(),
            });
        }

        Ok(Self(s.to_string()))
    }
}

impl fmt::Display for CodecIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CodecIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl AsRef<str> for CodecIdentifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_follows_container_rules() {
        assert_eq!(CodecIdentifier::new("video/mp4").file_extension(), "mp4");
        assert_eq!(
            CodecIdentifier::new("audio/mp4;codecs=mp4a.40.2").file_extension(),
            "mp4"
        );
        assert_eq!(
            CodecIdentifier::new("video/ogg;codecs=theora").file_extension(),
            "ogv"
        );
        assert_eq!(CodecIdentifier::new("audio/ogg").file_extension(), "ogv");
        assert_eq!(CodecIdentifier::new("video/webm").file_extension(), "webm");
        assert_eq!(
            CodecIdentifier::new("video/x-matroska").file_extension(),
            "webm"
        );
    }

    #[test]
    fn extension_prefix_match_is_case_sensitive() {
        assert_eq!(CodecIdentifier::new("Video/MP4").file_extension(), "webm");
    }

    #[test]
    fn file_stem_collapses_runs() {
        assert_eq!(
            CodecIdentifier::new("video/mp4;codecs=h264").file_stem(),
            "video_mp4_codecs_h264"
        );
        assert_eq!(
            CodecIdentifier::new("video/webm; codecs=\"vp8, opus\"").file_stem(),
            "video_webm_codecs_vp8_opus_"
        );
    }

    #[test]
    fn suggested_filename_matches_recording_convention() {
        assert_eq!(
            CodecIdentifier::new("video/webm").suggested_filename(),
            "record-video_webm.webm"
        );
        assert_eq!(
            CodecIdentifier::new("video/mp4;codecs=h264").suggested_filename(),
            "record-video_mp4_codecs_h264.mp4"
        );
        assert_eq!(
            CodecIdentifier::new("video/ogg;codecs=theora").suggested_filename(),
            "record-video_ogg_codecs_theora.ogv"
        );
    }

    #[test]
    fn container_and_codecs_views() {
        let codec = CodecIdentifier::new(" Video/WebM ; codecs=\"VP8, Opus\"");
        assert_eq!(codec.container(), "video/webm");
        assert_eq!(codec.codecs(), vec!["vp8".to_string(), "opus".to_string()]);
        assert_eq!(codec.media_kind(), MediaKind::Video);
    }

    #[test]
    fn codecs_empty_without_parameter() {
        assert!(CodecIdentifier::new("video/mp4").codecs().is_empty());
    }

    #[test]
    fn media_kind_of_audio_and_other() {
        assert_eq!(
            CodecIdentifier::new("audio/ogg").media_kind(),
            MediaKind::Audio
        );
        assert_eq!(
            CodecIdentifier::new("application/json").media_kind(),
            MediaKind::Other
        );
    }

    #[test]
    fn parse_accepts_mime_types() {
        let codec: CodecIdentifier = "video/mp4;codecs=avc1".parse().unwrap();
        assert_eq!(codec.as_str(), "video/mp4;codecs=avc1");
    }

    #[test]
    fn parse_keeps_the_exact_input() {
        let codec: CodecIdentifier = " video/webm ".parse().unwrap();
        assert_eq!(codec.as_str(), " video/webm ");
        assert_ne!(codec, CodecIdentifier::new("video/webm"));
        assert_eq!(codec.container(), "video/webm");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<CodecIdentifier>().is_err());
        assert!("webm".parse::<CodecIdentifier>().is_err());
        assert!("video/".parse::<CodecIdentifier>().is_err());
        assert!(";codecs=vp8".parse::<CodecIdentifier>().is_err());
    }

    #[test]
    fn equality_is_exact() {
        assert_ne!(
            CodecIdentifier::new("video/webm"),
            CodecIdentifier::new("video/WebM")
        );
    }
}
