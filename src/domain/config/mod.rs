//! Configuration domain module

mod app_config;

pub use app_config::{
    AppConfig, CameraConfig, DEFAULT_FFMPEG, DEFAULT_FRAME_RATE, DEFAULT_HEIGHT, DEFAULT_WIDTH,
};
