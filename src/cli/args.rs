//! CLI argument definitions using Clap

use clap::{ArgAction, Parser, Subcommand};

use crate::domain::codec::CodecIdentifier;
use crate::domain::recording::Duration;

/// codec-inspect - report which recording formats this machine can produce
#[derive(Parser, Debug)]
#[command(name = "codec-inspect")]
#[command(version)]
#[command(about = "Probe recording codec support, preview the camera and test-record clips")]
#[command(long_about = None)]
pub struct Cli {
    /// User-agent string to identify in the device report
    #[arg(long, value_name = "UA", global = true)]
    pub user_agent: Option<String>,

    /// Skip camera acquisition
    #[arg(long)]
    pub no_camera: bool,

    /// Test-record this codec once the camera is up (repeatable)
    #[arg(long = "record", value_name = "CODEC")]
    pub record: Vec<String>,

    /// Keep the camera preview running until Ctrl+C
    #[arg(long)]
    pub hold: bool,

    /// Recording duration (e.g., 500ms, 2s, 1m30s)
    #[arg(short = 'd', long, value_name = "TIME")]
    pub duration: Option<String>,

    /// Directory recordings are saved to
    #[arg(short = 'o', long, value_name = "DIR")]
    pub output_dir: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show which catalog codecs this host can record
    Codecs {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Probe these codecs instead of the built-in catalog (repeatable)
        #[arg(long = "codec", value_name = "CODEC")]
        codecs: Vec<String>,
    },
    /// Show device and media backend information
    Info {
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Record one clip and save it
    Record {
        /// Codec identifier, e.g. "video/webm;codecs=vp9"
        codec: String,

        /// Recording duration (e.g., 500ms, 2s, 1m30s)
        #[arg(short = 'd', long, value_name = "TIME")]
        duration: Option<String>,

        /// Directory the recording is saved to
        #[arg(short = 'o', long, value_name = "DIR")]
        output_dir: Option<String>,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Parsed options for the full report
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub user_agent: Option<String>,
    pub camera: bool,
    pub record: Vec<CodecIdentifier>,
    pub hold: bool,
    pub duration: Duration,
}

/// Parsed options for a single recording
#[derive(Debug, Clone)]
pub struct RecordOptions {
    pub codec: CodecIdentifier,
    pub duration: Duration,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "ffmpeg_path",
    "duration",
    "stop_timeout",
    "output_dir",
    "camera.device",
    "camera.input_format",
    "camera.width",
    "camera.height",
    "camera.frame_rate",
];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
