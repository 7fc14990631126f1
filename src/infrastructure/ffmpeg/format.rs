//! Mapping from codec identifiers to ffmpeg muxers and encoders

use crate::domain::codec::{CodecIdentifier, MediaKind};

/// Whether an encoder produces a video or an audio stream
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
}

/// An ffmpeg encoder for one codec name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderChoice {
    pub codec: &'static str,
    pub encoder: &'static str,
    pub kind: StreamKind,
    /// Options that make the encoder keep up with a live source
    pub options: &'static [&'static str],
}

struct ContainerSpec {
    mime_types: &'static [&'static str],
    muxer: &'static str,
    muxer_options: &'static [&'static str],
    default_video: Option<&'static str>,
    default_audio: Option<&'static str>,
    allowed: &'static [&'static str],
}

const CONTAINERS: &[ContainerSpec] = &[
    ContainerSpec {
        mime_types: &["video/webm", "audio/webm"],
        muxer: "webm",
        muxer_options: &["-cluster_time_limit", "1000"],
        default_video: Some("vp8"),
        default_audio: Some("opus"),
        allowed: &["vp8", "vp9", "av1", "opus", "vorbis"],
    },
    ContainerSpec {
        mime_types: &["video/mp4", "audio/mp4"],
        muxer: "mp4",
        // Fragmented so the muxer can write to a pipe
        muxer_options: &["-movflags", "frag_keyframe+empty_moov+default_base_moof"],
        default_video: Some("h264"),
        default_audio: Some("aac"),
        allowed: &["h264", "vp9", "av1", "aac", "opus"],
    },
    ContainerSpec {
        mime_types: &["video/ogg", "audio/ogg"],
        muxer: "ogg",
        muxer_options: &[],
        default_video: Some("theora"),
        default_audio: Some("vorbis"),
        allowed: &["theora", "vorbis", "opus"],
    },
    ContainerSpec {
        mime_types: &["video/x-matroska", "audio/x-matroska"],
        muxer: "matroska",
        muxer_options: &[],
        default_video: Some("h264"),
        default_audio: Some("opus"),
        allowed: &["h264", "vp8", "vp9", "av1", "theora", "opus", "vorbis", "aac"],
    },
];

const ENCODERS: &[EncoderChoice] = &[
    EncoderChoice {
        codec: "vp8",
        encoder: "libvpx",
        kind: StreamKind::Video,
        options: &["-deadline", "realtime", "-cpu-used", "8", "-b:v", "1M"],
    },
    EncoderChoice {
        codec: "vp9",
        encoder: "libvpx-vp9",
        kind: StreamKind::Video,
        options: &["-deadline", "realtime", "-cpu-used", "8", "-row-mt", "1", "-b:v", "1M"],
    },
    EncoderChoice {
        codec: "av1",
        encoder: "libaom-av1",
        kind: StreamKind::Video,
        options: &["-usage", "realtime", "-cpu-used", "8", "-b:v", "1M"],
    },
    EncoderChoice {
        codec: "h264",
        encoder: "libx264",
        kind: StreamKind::Video,
        options: &["-preset", "ultrafast", "-tune", "zerolatency"],
    },
    EncoderChoice {
        codec: "theora",
        encoder: "libtheora",
        kind: StreamKind::Video,
        options: &["-q:v", "7"],
    },
    EncoderChoice {
        codec: "opus",
        encoder: "libopus",
        kind: StreamKind::Audio,
        options: &[],
    },
    EncoderChoice {
        codec: "vorbis",
        encoder: "libvorbis",
        kind: StreamKind::Audio,
        options: &[],
    },
    EncoderChoice {
        codec: "aac",
        encoder: "aac",
        kind: StreamKind::Audio,
        options: &[],
    },
];

/// Fold codec spellings (RFC 6381 strings, aliases) onto a canonical name
pub fn canonical_codec_name(name: &str) -> &str {
    let base = name.split('.').next().unwrap_or(name);
    match base {
        "avc1" | "avc3" | "h264" => "h264",
        "vp8" => "vp8",
        "vp9" | "vp09" => "vp9",
        "av1" | "av01" => "av1",
        "mp4a" | "aac" => "aac",
        other => other,
    }
}

fn encoder_for(codec: &str) -> Option<EncoderChoice> {
    ENCODERS.iter().find(|e| e.codec == codec).copied()
}

/// How ffmpeg writes a given codec identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodePlan {
    pub muxer: &'static str,
    pub muxer_options: &'static [&'static str],
    pub video: Option<EncoderChoice>,
    pub audio: Option<EncoderChoice>,
}

impl EncodePlan {
    /// Resolve a codec identifier, or `None` when ffmpeg cannot express it.
    ///
    /// `video/*` types get a video encoder (the container default unless one is
    /// listed); `audio/*` types must not list video codecs.
    pub fn resolve(codec: &CodecIdentifier) -> Option<Self> {
        let container = codec.container();
        let format = CONTAINERS
            .iter()
            .find(|c| c.mime_types.contains(&container.as_str()))?;
        let kind = codec.media_kind();

        let mut video = None;
        let mut audio = None;
        for name in codec.codecs() {
            let canonical = canonical_codec_name(&name);
            if !format.allowed.contains(&canonical) {
                return None;
            }
            let choice = encoder_for(canonical)?;
            let slot = match choice.kind {
                StreamKind::Video => &mut video,
                StreamKind::Audio => &mut audio,
            };
            // One codec per stream kind
            if slot.is_some() {
                return None;
            }
            *slot = Some(choice);
        }

        match kind {
            MediaKind::Video => {
                if video.is_none() {
                    video = format.default_video.and_then(encoder_for);
                }
            }
            MediaKind::Audio => {
                if video.is_some() {
                    return None;
                }
                if audio.is_none() {
                    audio = format.default_audio.and_then(encoder_for);
                }
            }
            MediaKind::Other => return None,
        }

        Some(Self {
            muxer: format.muxer,
            muxer_options: format.muxer_options,
            video,
            audio,
        })
    }

    /// Every ffmpeg encoder the plan needs
    pub fn encoders(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.video.iter().chain(self.audio.iter()).map(|e| e.encoder)
    }

    pub fn needs_audio(&self) -> bool {
        self.audio.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(codec: &str) -> Option<EncodePlan> {
        EncodePlan::resolve(&CodecIdentifier::new(codec))
    }

    #[test]
    fn bare_containers_use_defaults() {
        let webm = plan("video/webm").unwrap();
        assert_eq!(webm.muxer, "webm");
        assert_eq!(webm.video.unwrap().encoder, "libvpx");
        assert!(webm.audio.is_none());

        let mp4 = plan("video/mp4").unwrap();
        assert_eq!(mp4.video.unwrap().encoder, "libx264");
        assert!(mp4.muxer_options.contains(&"frag_keyframe+empty_moov+default_base_moof"));

        let ogg = plan("video/ogg").unwrap();
        assert_eq!(ogg.video.unwrap().encoder, "libtheora");
    }

    #[test]
    fn listed_codecs_select_encoders() {
        assert_eq!(
            plan("video/webm;codecs=vp9").unwrap().video.unwrap().encoder,
            "libvpx-vp9"
        );
        assert_eq!(
            plan("video/mp4;codecs=avc1").unwrap().video.unwrap().encoder,
            "libx264"
        );
        assert_eq!(
            plan("video/mp4;codecs=avc1.42E01E").unwrap().video.unwrap().codec,
            "h264"
        );
    }

    #[test]
    fn incompatible_pairs_are_rejected() {
        assert!(plan("video/webm;codecs=h264").is_none());
        assert!(plan("video/ogg;codecs=vp8").is_none());
        assert!(plan("video/mp4;codecs=theora").is_none());
    }

    #[test]
    fn unknown_containers_and_codecs_are_rejected() {
        assert!(plan("video/quicktime").is_none());
        assert!(plan("video/webm;codecs=hevc").is_none());
        assert!(plan("application/octet-stream").is_none());
    }

    #[test]
    fn video_with_audio_codec() {
        let plan = plan("video/webm;codecs=\"vp8, opus\"").unwrap();
        assert_eq!(plan.video.unwrap().encoder, "libvpx");
        assert_eq!(plan.audio.unwrap().encoder, "libopus");
        let encoders: Vec<&str> = plan.encoders().collect();
        assert_eq!(encoders, vec!["libvpx", "libopus"]);
    }

    #[test]
    fn audio_types_get_audio_encoders_only() {
        let plan = plan("audio/ogg").unwrap();
        assert!(plan.video.is_none());
        assert_eq!(plan.audio.unwrap().encoder, "libvorbis");
        assert!(plan.needs_audio());
        assert!(EncodePlan::resolve(&CodecIdentifier::new("audio/webm;codecs=vp8")).is_none());
    }

    #[test]
    fn two_video_codecs_are_rejected() {
        assert!(plan("video/webm;codecs=vp8,vp9").is_none());
    }

    #[test]
    fn canonical_names() {
        assert_eq!(canonical_codec_name("avc1.640028"), "h264");
        assert_eq!(canonical_codec_name("vp09.00.10.08"), "vp9");
        assert_eq!(canonical_codec_name("av01.0.04M.08"), "av1");
        assert_eq!(canonical_codec_name("mp4a.40.2"), "aac");
        assert_eq!(canonical_codec_name("opus"), "opus");
    }
}
