//! FFmpeg-based media recorder adapter

use std::process::Stdio;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::application::ports::{
    CaptureStream, MediaRecorder, RecorderError, RecorderEvent, RecorderFactory, StreamSettings,
    TrackKind, VideoFrame,
};
use crate::domain::codec::CodecIdentifier;

use super::format::EncodePlan;

/// Size of each stdout read, and so the upper bound of a fragment
const FRAGMENT_SIZE: usize = 64 * 1024;

/// Builds ffmpeg encoder processes fed from a capture stream
#[derive(Debug, Clone)]
pub struct FfmpegRecorderFactory {
    ffmpeg: String,
}

impl FfmpegRecorderFactory {
    pub fn new(ffmpeg: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }
}

impl RecorderFactory for FfmpegRecorderFactory {
    fn create(
        &self,
        stream: &CaptureStream,
        codec: &CodecIdentifier,
    ) -> Result<Box<dyn MediaRecorder>, RecorderError> {
        let construction = |message: &str| RecorderError::Construction {
            codec: codec.clone(),
            message: message.to_string(),
        };

        let mut plan =
            EncodePlan::resolve(codec).ok_or_else(|| construction("no encoder for this type"))?;

        // Only video frames are captured; an audio codec has nothing to encode
        if plan.needs_audio() && !stream.has_track(TrackKind::Audio) {
            if plan.video.is_none() {
                return Err(construction("stream has no audio track"));
            }
            plan.audio = None;
        }
        if !stream.has_track(TrackKind::Video) {
            return Err(construction("stream has no video track"));
        }

        Ok(Box::new(FfmpegRecorder {
            ffmpeg: self.ffmpeg.clone(),
            codec: codec.clone(),
            plan,
            settings: stream.settings(),
            frames: Some(stream.subscribe()),
            stop: None,
            tasks: Vec::new(),
        }))
    }
}

/// One encoder process: frames go to stdin, encoded bytes come from stdout.
///
/// Closing stdin is the stop request; the process exit is the confirmation.
pub struct FfmpegRecorder {
    ffmpeg: String,
    codec: CodecIdentifier,
    plan: EncodePlan,
    settings: StreamSettings,
    frames: Option<broadcast::Receiver<VideoFrame>>,
    stop: Option<oneshot::Sender<()>>,
    tasks: Vec<JoinHandle<()>>,
}

impl FfmpegRecorder {
    /// Build FFmpeg args for encoding raw frames from stdin
    fn build_ffmpeg_args(plan: &EncodePlan, settings: &StreamSettings) -> Vec<String> {
        let mut args: Vec<String> = [
            "-hide_banner",
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgb24",
            "-video_size",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        args.push(format!("{}x{}", settings.width, settings.height));
        args.push("-framerate".to_string());
        args.push(settings.frame_rate.to_string());
        args.extend(["-i".to_string(), "pipe:0".to_string()]);

        if let Some(video) = plan.video {
            args.extend(["-c:v".to_string(), video.encoder.to_string()]);
            args.extend(video.options.iter().map(|s| s.to_string()));
            args.extend(["-pix_fmt".to_string(), "yuv420p".to_string()]);
        }
        args.push("-an".to_string());

        args.extend(plan.muxer_options.iter().map(|s| s.to_string()));
        args.extend([
            "-f".to_string(),
            plan.muxer.to_string(),
            "pipe:1".to_string(),
        ]);
        args
    }

    fn spawn_ffmpeg(&self, args: Vec<String>) -> Result<Child, RecorderError> {
        Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    RecorderError::StartFailed(format!("media backend '{}' not found", self.ffmpeg))
                } else {
                    RecorderError::StartFailed(e.to_string())
                }
            })
    }
}

#[async_trait]
impl MediaRecorder for FfmpegRecorder {
    async fn start(&mut self) -> Result<mpsc::UnboundedReceiver<RecorderEvent>, RecorderError> {
        let frames = self
            .frames
            .take()
            .ok_or_else(|| RecorderError::StartFailed("recorder already started".to_string()))?;

        let args = Self::build_ffmpeg_args(&self.plan, &self.settings);
        debug!(codec = %self.codec, muxer = self.plan.muxer, "starting encoder");
        let mut child = self.spawn_ffmpeg(args)?;

        let (stdin, stdout, stderr) =
            match (child.stdin.take(), child.stdout.take(), child.stderr.take()) {
                (Some(i), Some(o), Some(e)) => (i, o, e),
                _ => {
                    return Err(RecorderError::StartFailed(
                        "encoder process has no pipes".to_string(),
                    ))
                }
            };

        let (events, rx) = mpsc::unbounded_channel();
        let (stop_tx, stop_rx) = oneshot::channel();
        self.stop = Some(stop_tx);

        let stderr_task = tokio::spawn(last_stderr_line(stderr));
        self.tasks
            .push(tokio::spawn(feed_frames(frames, stdin, stop_rx)));
        self.tasks
            .push(tokio::spawn(forward_output(child, stdout, stderr_task, events)));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<(), RecorderError> {
        let stop = self
            .stop
            .take()
            .ok_or_else(|| RecorderError::StopFailed("recorder is not running".to_string()))?;
        // The feeder may already be gone if the encoder died; its exit is reported as an event
        let _ = stop.send(());
        Ok(())
    }
}

impl Drop for FfmpegRecorder {
    fn drop(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

/// Copy frames into the encoder until asked to stop, then close its stdin.
async fn feed_frames(
    mut frames: broadcast::Receiver<VideoFrame>,
    mut stdin: ChildStdin,
    mut stop: oneshot::Receiver<()>,
) {
    loop {
        tokio::select! {
            biased;
            _ = &mut stop => break,
            frame = frames.recv() => match frame {
                Ok(frame) => {
                    if let Err(e) = stdin.write_all(&frame.data).await {
                        debug!(error = %e, "encoder stopped accepting frames");
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "encoder fell behind the camera");
                }
                Err(RecvError::Closed) => break,
            },
        }
    }
    let _ = stdin.shutdown().await;
}

/// Emit stdout chunks as fragments, then the exit outcome.
async fn forward_output(
    mut child: Child,
    mut stdout: ChildStdout,
    stderr: JoinHandle<Option<String>>,
    events: mpsc::UnboundedSender<RecorderEvent>,
) {
    let mut buf = vec![0u8; FRAGMENT_SIZE];
    loop {
        match stdout.read(&mut buf).await {
            Ok(0) => break,
            Ok(n) => {
                if events.send(RecorderEvent::Data(buf[..n].to_vec())).is_err() {
                    return;
                }
            }
            Err(e) => {
                let _ = events.send(RecorderEvent::Error(e.to_string()));
                return;
            }
        }
    }

    let status = child.wait().await;
    let last_line = stderr.await.ok().flatten();
    let event = match status {
        Ok(status) if status.success() => RecorderEvent::Stopped,
        Ok(status) => RecorderEvent::Error(match last_line {
            Some(line) => format!("encoder exited with {}: {}", status, line),
            None => format!("encoder exited with {}", status),
        }),
        Err(e) => RecorderEvent::Error(e.to_string()),
    };
    let _ = events.send(event);
}

async fn last_stderr_line<R: AsyncRead + Unpin>(reader: R) -> Option<String> {
    let mut lines = BufReader::new(reader).lines();
    let mut last = None;
    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim().to_string();
        if !line.is_empty() {
            debug!(target: "codec_inspect::encoder", "{}", line);
            last = Some(line);
        }
    }
    last
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::MediaTrack;
    use std::sync::Arc;

    struct StaticTrack(TrackKind);

    impl MediaTrack for StaticTrack {
        fn kind(&self) -> TrackKind {
            self.0
        }
        fn label(&self) -> &str {
            "static"
        }
        fn is_live(&self) -> bool {
            true
        }
        fn stop(&self) {}
    }

    fn video_stream() -> CaptureStream {
        let (frames, _) = broadcast::channel(4);
        let track: Arc<dyn MediaTrack> = Arc::new(StaticTrack(TrackKind::Video));
        CaptureStream::new(
            "test",
            StreamSettings {
                width: 320,
                height: 240,
                frame_rate: 15,
            },
            vec![track],
            frames,
        )
    }

    fn settings() -> StreamSettings {
        StreamSettings {
            width: 320,
            height: 240,
            frame_rate: 15,
        }
    }

    #[test]
    fn encoder_args_for_webm() {
        let plan = EncodePlan::resolve(&CodecIdentifier::new("video/webm;codecs=vp9")).unwrap();
        let args = FfmpegRecorder::build_ffmpeg_args(&plan, &settings());
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo -pix_fmt rgb24 -video_size 320x240"));
        assert!(joined.contains("-framerate 15 -i pipe:0"));
        assert!(joined.contains("-c:v libvpx-vp9"));
        assert!(joined.ends_with("-f webm pipe:1"));
    }

    #[test]
    fn encoder_args_for_fragmented_mp4() {
        let plan = EncodePlan::resolve(&CodecIdentifier::new("video/mp4")).unwrap();
        let args = FfmpegRecorder::build_ffmpeg_args(&plan, &settings());
        let joined = args.join(" ");
        assert!(joined.contains("-c:v libx264"));
        assert!(joined.contains("-movflags frag_keyframe+empty_moov+default_base_moof"));
        assert!(joined.ends_with("-f mp4 pipe:1"));
    }

    #[test]
    fn unmappable_codec_fails_construction() {
        let factory = FfmpegRecorderFactory::new("ffmpeg");
        let err = factory
            .create(&video_stream(), &CodecIdentifier::new("video/webm;codecs=h264"))
            .err()
            .unwrap();
        assert!(matches!(err, RecorderError::Construction { .. }));
    }

    #[test]
    fn audio_only_codec_needs_audio_track() {
        let factory = FfmpegRecorderFactory::new("ffmpeg");
        let err = factory
            .create(&video_stream(), &CodecIdentifier::new("audio/ogg"))
            .err()
            .unwrap();
        assert!(err.to_string().contains("no audio track"));
    }

    #[test]
    fn audio_codec_is_dropped_for_video_only_stream() {
        let factory = FfmpegRecorderFactory::new("ffmpeg");
        assert!(factory
            .create(
                &video_stream(),
                &CodecIdentifier::new("video/webm;codecs=\"vp8, opus\"")
            )
            .is_ok());
    }

    #[tokio::test]
    async fn stop_before_start_is_an_error() {
        let factory = FfmpegRecorderFactory::new("ffmpeg");
        let mut recorder = factory
            .create(&video_stream(), &CodecIdentifier::new("video/webm"))
            .unwrap();
        assert!(matches!(
            recorder.stop().await,
            Err(RecorderError::StopFailed(_))
        ));
    }

    #[tokio::test]
    async fn missing_backend_fails_start() {
        let factory = FfmpegRecorderFactory::new("/nonexistent/ffmpeg-binary");
        let mut recorder = factory
            .create(&video_stream(), &CodecIdentifier::new("video/webm"))
            .unwrap();
        assert!(matches!(
            recorder.start().await,
            Err(RecorderError::StartFailed(_))
        ));
    }
}
