//! FFmpeg-based camera capture adapter

use std::process::Stdio;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::process::{Child, ChildStdout, Command};
use tokio::sync::broadcast;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::application::ports::{
    AcquisitionError, CaptureConstraints, CaptureDevice, CaptureStream, MediaTrack,
    StreamSettings, TrackKind, VideoFrame, FRAME_BUFFER,
};

/// How long a freshly spawned capture process may take to deliver a frame
pub const DEFAULT_STARTUP_TIMEOUT: StdDuration = StdDuration::from_secs(10);

/// Camera reached through an ffmpeg capture process.
///
/// The process writes packed RGB24 frames to stdout, which a reader task
/// broadcasts on the stream.
pub struct FfmpegCamera {
    ffmpeg: String,
    input_format: String,
    device: String,
    startup_timeout: StdDuration,
}

impl FfmpegCamera {
    pub fn new(
        ffmpeg: impl Into<String>,
        input_format: impl Into<String>,
        device: impl Into<String>,
    ) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            input_format: input_format.into(),
            device: device.into(),
            startup_timeout: DEFAULT_STARTUP_TIMEOUT,
        }
    }

    pub fn with_startup_timeout(mut self, startup_timeout: StdDuration) -> Self {
        self.startup_timeout = startup_timeout;
        self
    }

    /// Build FFmpeg args for capturing raw frames to stdout
    fn build_ffmpeg_args(&self, settings: &StreamSettings) -> Vec<String> {
        let size = format!("{}x{}", settings.width, settings.height);
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-f".to_string(),
            self.input_format.clone(),
            "-video_size".to_string(),
            size.clone(),
            "-framerate".to_string(),
            settings.frame_rate.to_string(),
            "-i".to_string(),
            self.device.clone(),
            "-an".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "rgb24".to_string(),
            // Scale so every frame has exactly the negotiated size
            "-s".to_string(),
            size,
            "pipe:1".to_string(),
        ]
    }

    fn spawn_ffmpeg(&self, args: Vec<String>) -> Result<Child, AcquisitionError> {
        Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AcquisitionError::DeviceUnavailable(format!(
                        "media backend '{}' not found",
                        self.ffmpeg
                    ))
                } else {
                    AcquisitionError::Failed(e.to_string())
                }
            })
    }
}

#[async_trait]
impl CaptureDevice for FfmpegCamera {
    async fn acquire(
        &self,
        constraints: &CaptureConstraints,
    ) -> Result<CaptureStream, AcquisitionError> {
        let settings = StreamSettings::from(*constraints);
        let args = self.build_ffmpeg_args(&settings);
        debug!(device = %self.device, format = %self.input_format, "requesting camera");

        let mut child = self.spawn_ffmpeg(args)?;
        let (mut stdout, stderr) = match (child.stdout.take(), child.stderr.take()) {
            (Some(out), Some(err)) => (out, err),
            _ => {
                return Err(AcquisitionError::Failed(
                    "capture process has no output pipes".to_string(),
                ))
            }
        };

        let mut first = vec![0u8; settings.frame_size()];
        match timeout(self.startup_timeout, stdout.read_exact(&mut first)).await {
            Ok(Ok(_)) => {}
            Ok(Err(_)) => {
                let diagnostic = read_all(stderr).await;
                let _ = child.wait().await;
                return Err(classify_startup_failure(&diagnostic));
            }
            Err(_) => {
                let _ = child.start_kill();
                return Err(AcquisitionError::Failed(format!(
                    "camera delivered no frame within {:?}",
                    self.startup_timeout
                )));
            }
        }

        let id = child
            .id()
            .map(|pid| format!("camera-{}", pid))
            .unwrap_or_else(|| "camera".to_string());
        let track = Arc::new(FfmpegVideoTrack::new(self.device.clone(), child));
        let (frames, _) = broadcast::channel(FRAME_BUFFER);

        tokio::spawn(log_stderr(stderr));
        tokio::spawn(read_frames(
            stdout,
            settings,
            first,
            frames.clone(),
            Arc::clone(&track),
        ));

        info!(stream = %id, device = %self.device, "camera acquired");
        let track: Arc<dyn MediaTrack> = track;
        Ok(CaptureStream::new(id, settings, vec![track], frames))
    }
}

/// Map the capture process's diagnostics to an acquisition error
pub fn classify_startup_failure(stderr: &str) -> AcquisitionError {
    let message = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .unwrap_or("capture process exited before delivering a frame")
        .to_string();

    let lower = stderr.to_lowercase();
    if lower.contains("permission denied") || lower.contains("not authorized") {
        AcquisitionError::PermissionDenied(message)
    } else {
        AcquisitionError::DeviceUnavailable(message)
    }
}

async fn read_all<R: AsyncRead + Unpin>(mut reader: R) -> String {
    let mut buf = Vec::new();
    let _ = reader.read_to_end(&mut buf).await;
    String::from_utf8_lossy(&buf).into_owned()
}

async fn log_stderr<R: AsyncRead + Unpin>(reader: R) {
    let mut lines = BufReader::new(reader).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        debug!(target: "codec_inspect::camera", "{}", line);
    }
}

/// Publish frames until the capture process ends, then mark the track dead.
async fn read_frames(
    mut stdout: ChildStdout,
    settings: StreamSettings,
    first: Vec<u8>,
    frames: broadcast::Sender<VideoFrame>,
    track: Arc<FfmpegVideoTrack>,
) {
    let mut buf = first;
    loop {
        let sequence = track.next_sequence();
        // No receivers is fine; the preview may not be attached yet
        let _ = frames.send(VideoFrame {
            sequence,
            width: settings.width,
            height: settings.height,
            data: Arc::from(buf.as_slice()),
        });

        if let Err(e) = stdout.read_exact(&mut buf).await {
            if track.is_live() {
                warn!(error = %e, "camera stream ended");
            }
            break;
        }
    }
    track.mark_ended();
    debug!(frames = track.frames(), "frame reader finished");
}

/// The video track of an ffmpeg capture process
pub struct FfmpegVideoTrack {
    label: String,
    live: AtomicBool,
    sequence: AtomicU64,
    process: Mutex<Child>,
}

impl FfmpegVideoTrack {
    fn new(label: String, process: Child) -> Self {
        Self {
            label,
            live: AtomicBool::new(true),
            sequence: AtomicU64::new(0),
            process: Mutex::new(process),
        }
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst)
    }

    fn frames(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }

    fn mark_ended(&self) {
        self.live.store(false, Ordering::SeqCst);
    }
}

impl MediaTrack for FfmpegVideoTrack {
    fn kind(&self) -> TrackKind {
        TrackKind::Video
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }

    fn stop(&self) {
        // Only the first stop kills the process
        if self.live.swap(false, Ordering::SeqCst) {
            if let Ok(mut process) = self.process.lock() {
                if let Err(e) = process.start_kill() {
                    debug!(error = %e, "capture process already gone");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capture_args_request_raw_rgb() {
        let camera = FfmpegCamera::new("ffmpeg", "v4l2", "/dev/video0");
        let args = camera.build_ffmpeg_args(&StreamSettings {
            width: 640,
            height: 480,
            frame_rate: 30,
        });
        let joined = args.join(" ");
        assert!(joined.contains("-f v4l2"));
        assert!(joined.contains("-video_size 640x480"));
        assert!(joined.contains("-framerate 30"));
        assert!(joined.contains("-i /dev/video0"));
        assert!(joined.contains("-f rawvideo -pix_fmt rgb24"));
        assert_eq!(args.last().map(String::as_str), Some("pipe:1"));
    }

    #[test]
    fn permission_failures_are_recognised() {
        let err = classify_startup_failure(
            "[video4linux2,v4l2 @ 0x5] Cannot open video device /dev/video0: Permission denied\n",
        );
        assert!(matches!(err, AcquisitionError::PermissionDenied(_)));
        assert!(err.to_string().contains("Permission denied"));
    }

    #[test]
    fn other_failures_mean_no_device() {
        let err = classify_startup_failure("/dev/video0: No such file or directory\n");
        assert!(matches!(err, AcquisitionError::DeviceUnavailable(_)));

        let err = classify_startup_failure("");
        assert!(matches!(err, AcquisitionError::DeviceUnavailable(_)));
        assert!(err.to_string().contains("exited before delivering a frame"));
    }

    #[tokio::test]
    async fn missing_backend_is_device_unavailable() {
        let camera = FfmpegCamera::new("/nonexistent/ffmpeg-binary", "v4l2", "/dev/video0");
        let err = camera
            .acquire(&CaptureConstraints::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AcquisitionError::DeviceUnavailable(_)));
    }
}
