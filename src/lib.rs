//! codec-inspect - recording codec probe and camera test recorder
//!
//! This crate reports which media container/codec combinations the host can
//! record, drives a live camera preview, and records short clips in a chosen
//! codec which are then saved to disk.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Codec identifiers, the catalog, recording jobs and artifacts, config
//! - **Application**: Probe, camera session and recording use cases plus port traits
//! - **Infrastructure**: Adapter implementations (FFmpeg, download directory, XDG config)
//! - **CLI**: Command-line interface, argument parsing, and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
