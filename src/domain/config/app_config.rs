//! Application configuration value object

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::domain::recording::Duration;

/// Default capture width requested from the camera
pub const DEFAULT_WIDTH: u32 = 640;
/// Default capture height requested from the camera
pub const DEFAULT_HEIGHT: u32 = 480;
/// Default capture frame rate
pub const DEFAULT_FRAME_RATE: u32 = 30;
/// Default media backend executable
pub const DEFAULT_FFMPEG: &str = "ffmpeg";

#[cfg(target_os = "linux")]
const DEFAULT_INPUT_FORMAT: &str = "v4l2";
#[cfg(target_os = "linux")]
const DEFAULT_DEVICE: &str = "/dev/video0";

#[cfg(target_os = "macos")]
const DEFAULT_INPUT_FORMAT: &str = "avfoundation";
#[cfg(target_os = "macos")]
const DEFAULT_DEVICE: &str = "0";

#[cfg(target_os = "windows")]
const DEFAULT_INPUT_FORMAT: &str = "dshow";
#[cfg(target_os = "windows")]
const DEFAULT_DEVICE: &str = "video=Integrated Camera";

#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const DEFAULT_INPUT_FORMAT: &str = "v4l2";
#[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
const DEFAULT_DEVICE: &str = "/dev/video0";

/// Camera capture configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CameraConfig {
    pub device: Option<String>,
    pub input_format: Option<String>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub frame_rate: Option<u32>,
}

/// Application configuration.
/// All fields are optional to support partial configs and merging.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub ffmpeg_path: Option<String>,
    pub duration: Option<String>,
    pub stop_timeout: Option<String>,
    pub output_dir: Option<String>,
    pub camera: Option<CameraConfig>,
}

impl AppConfig {
    /// Create config with default values
    pub fn defaults() -> Self {
        Self {
            ffmpeg_path: Some(DEFAULT_FFMPEG.to_string()),
            duration: Some(Duration::default_record_duration().to_string()),
            stop_timeout: Some(Duration::default_stop_timeout().to_string()),
            output_dir: None,
            camera: Some(CameraConfig {
                device: Some(DEFAULT_DEVICE.to_string()),
                input_format: Some(DEFAULT_INPUT_FORMAT.to_string()),
                width: Some(DEFAULT_WIDTH),
                height: Some(DEFAULT_HEIGHT),
                frame_rate: Some(DEFAULT_FRAME_RATE),
            }),
        }
    }

    /// Create an empty config (all None)
    pub fn empty() -> Self {
        Self::default()
    }

    /// Merge this config with another, where other takes precedence.
    /// Only non-None values from other will override this.
    pub fn merge(self, other: Self) -> Self {
        Self {
            ffmpeg_path: other.ffmpeg_path.or(self.ffmpeg_path),
            duration: other.duration.or(self.duration),
            stop_timeout: other.stop_timeout.or(self.stop_timeout),
            output_dir: other.output_dir.or(self.output_dir),
            camera: Self::merge_camera_config(self.camera, other.camera),
        }
    }

    /// Merge camera config sections
    fn merge_camera_config(
        base: Option<CameraConfig>,
        other: Option<CameraConfig>,
    ) -> Option<CameraConfig> {
        match (base, other) {
            (None, None) => None,
            (Some(b), None) => Some(b),
            (None, Some(o)) => Some(o),
            (Some(b), Some(o)) => Some(CameraConfig {
                device: o.device.or(b.device),
                input_format: o.input_format.or(b.input_format),
                width: o.width.or(b.width),
                height: o.height.or(b.height),
                frame_rate: o.frame_rate.or(b.frame_rate),
            }),
        }
    }

    /// Media backend executable, or "ffmpeg" if not set
    pub fn ffmpeg_path_or_default(&self) -> &str {
        self.ffmpeg_path.as_deref().unwrap_or(DEFAULT_FFMPEG)
    }

    /// Get duration as parsed Duration, or default if not set/invalid
    pub fn duration_or_default(&self) -> Duration {
        self.duration
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_record_duration)
    }

    /// Get stop_timeout as parsed Duration, or default if not set/invalid
    pub fn stop_timeout_or_default(&self) -> Duration {
        self.stop_timeout
            .as_ref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(Duration::default_stop_timeout)
    }

    /// Output directory: configured value, else the user's download directory,
    /// else the working directory
    pub fn output_dir_or_default(&self) -> PathBuf {
        self.output_dir
            .as_ref()
            .map(PathBuf::from)
            .or_else(dirs::download_dir)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Capture device, or the platform default
    pub fn camera_device_or_default(&self) -> &str {
        self.camera
            .as_ref()
            .and_then(|c| c.device.as_deref())
            .unwrap_or(DEFAULT_DEVICE)
    }

    /// Capture input format, or the platform default
    pub fn camera_input_format_or_default(&self) -> &str {
        self.camera
            .as_ref()
            .and_then(|c| c.input_format.as_deref())
            .unwrap_or(DEFAULT_INPUT_FORMAT)
    }

    /// Requested (width, height), defaulting to 640x480
    pub fn camera_resolution_or_default(&self) -> (u32, u32) {
        let camera = self.camera.as_ref();
        (
            camera.and_then(|c| c.width).unwrap_or(DEFAULT_WIDTH),
            camera.and_then(|c| c.height).unwrap_or(DEFAULT_HEIGHT),
        )
    }

    /// Requested frame rate, defaulting to 30
    pub fn camera_frame_rate_or_default(&self) -> u32 {
        self.camera
            .as_ref()
            .and_then(|c| c.frame_rate)
            .unwrap_or(DEFAULT_FRAME_RATE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_have_expected_values() {
        let config = AppConfig::defaults();
        assert_eq!(config.ffmpeg_path, Some("ffmpeg".to_string()));
        assert_eq!(config.duration, Some("2s".to_string()));
        assert_eq!(config.stop_timeout, Some("10s".to_string()));
        assert!(config.output_dir.is_none());
        assert_eq!(config.camera_resolution_or_default(), (640, 480));
        assert_eq!(config.camera_frame_rate_or_default(), 30);
        assert_eq!(config.camera_device_or_default(), DEFAULT_DEVICE);
    }

    #[test]
    fn empty_has_all_none() {
        let config = AppConfig::empty();
        assert!(config.ffmpeg_path.is_none());
        assert!(config.duration.is_none());
        assert!(config.stop_timeout.is_none());
        assert!(config.camera.is_none());
    }

    #[test]
    fn merge_other_takes_precedence() {
        let base = AppConfig {
            ffmpeg_path: Some("/usr/bin/ffmpeg".to_string()),
            duration: Some("2s".to_string()),
            ..Default::default()
        };

        let other = AppConfig {
            ffmpeg_path: Some("/opt/ffmpeg".to_string()),
            duration: None,
            ..Default::default()
        };

        let merged = base.merge(other);

        assert_eq!(merged.ffmpeg_path_or_default(), "/opt/ffmpeg");
        assert_eq!(merged.duration, Some("2s".to_string()));
    }

    #[test]
    fn merge_camera_config_fieldwise() {
        let base = AppConfig {
            camera: Some(CameraConfig {
                device: Some("/dev/video0".to_string()),
                width: Some(1280),
                ..Default::default()
            }),
            ..Default::default()
        };
        let other = AppConfig {
            camera: Some(CameraConfig {
                device: Some("/dev/video2".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let merged = base.merge(other);
        assert_eq!(merged.camera_device_or_default(), "/dev/video2");
        assert_eq!(merged.camera_resolution_or_default(), (1280, 480));
    }

    #[test]
    fn duration_or_default_parses() {
        let config = AppConfig {
            duration: Some("500ms".to_string()),
            ..Default::default()
        };
        assert_eq!(config.duration_or_default().as_millis(), 500);
    }

    #[test]
    fn duration_or_default_uses_default_on_invalid() {
        let config = AppConfig {
            duration: Some("invalid".to_string()),
            ..Default::default()
        };
        assert_eq!(config.duration_or_default().as_millis(), 2000);
    }

    #[test]
    fn stop_timeout_or_default() {
        assert_eq!(AppConfig::empty().stop_timeout_or_default().as_secs(), 10);
        let config = AppConfig {
            stop_timeout: Some("3s".to_string()),
            ..Default::default()
        };
        assert_eq!(config.stop_timeout_or_default().as_secs(), 3);
    }

    #[test]
    fn output_dir_prefers_configured_value() {
        let config = AppConfig {
            output_dir: Some("/tmp/recordings".to_string()),
            ..Default::default()
        };
        assert_eq!(config.output_dir_or_default(), PathBuf::from("/tmp/recordings"));
    }
}
