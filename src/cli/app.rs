//! App runners for the report, codecs, info and record commands

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::application::ports::{CaptureConstraints, CaptureStream, ConfigStore};
use crate::application::trigger::BUSY_LABEL;
use crate::application::{
    CameraSession, PlatformUnsupportedError, RecordTrigger, RecordingPipeline, SupportProbe,
    TestRecordCallbacks, TestRecordError, TestRecordOutput, TestRecordUseCase,
};
use crate::domain::codec::{CodecCatalog, CodecIdentifier, SupportVerdict};
use crate::domain::config::AppConfig;
use crate::domain::device::DeviceInfo;
use crate::domain::recording::Duration;
use crate::infrastructure::{
    system_info, DirectoryDownloads, FfmpegCamera, FfmpegCapabilities, FfmpegRecorderFactory,
    PreviewStats, XdgConfigStore,
};

use super::args::{PageOptions, RecordOptions};
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Overrides the media backend executable
pub const ENV_FFMPEG: &str = "CODEC_INSPECT_FFMPEG";
/// Overrides the directory recordings are saved to
pub const ENV_OUTPUT_DIR: &str = "CODEC_INSPECT_OUTPUT_DIR";

type Camera = CameraSession<FfmpegCamera, PreviewStats>;
type TestRecorder = TestRecordUseCase<FfmpegRecorderFactory, DirectoryDownloads>;

/// JSON shape of the `codecs` command
#[derive(Debug, Serialize)]
struct CodecReport<'a> {
    platform_supported: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
    verdicts: &'a [SupportVerdict],
}

/// Run the full report: device info, codec table, camera, test recordings
pub async fn run_page(options: PageOptions, config: AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();
    let caps = FfmpegCapabilities::detect(config.ffmpeg_path_or_default()).await;

    let device = system_info::gather(
        caps.version().map(str::to_string),
        options.user_agent.clone(),
    );
    print_device(&presenter, &device);

    presenter.section("Codec Support");
    let probe = SupportProbe::new(caps);
    match probe.classify(&CodecCatalog::default()) {
        Ok(verdicts) => verdicts.iter().for_each(|v| presenter.verdict(v)),
        Err(e) => presenter.row("Recording", &e.to_string()),
    }

    presenter.section("Camera");
    let mut camera = camera_session(&config);
    if options.camera {
        presenter.start_spinner("Requesting camera...");
        let started = camera.start().await;
        presenter.stop_spinner();
        debug!(ok = started.is_ok(), "camera start finished");
    }
    presenter.camera_status(camera.status());

    let mut failed = false;
    if !options.record.is_empty() {
        presenter.section("Test Recordings");
        let recorder = test_recorder(&config);
        for codec in &options.record {
            if !(probe.is_supported() && probe.probe(codec)) {
                presenter.warn(&format!("Skipping {}: not supported on this host", codec));
                continue;
            }
            let trigger = RecordTrigger::new(codec.clone());
            let stream = camera.stream();
            let result = record_one(
                &mut presenter,
                &recorder,
                &trigger,
                stream.as_deref(),
                options.duration,
            )
            .await;
            failed |= result.is_err();
        }
    }

    if options.hold && camera.is_active() {
        hold_preview(&presenter, &camera).await;
    }

    camera.stop();
    if options.camera {
        presenter.camera_status(camera.status());
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

/// Probe the catalog (or the given codecs) and print the verdicts
pub async fn run_codecs(json: bool, codecs: Vec<CodecIdentifier>, config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let caps = FfmpegCapabilities::detect(config.ffmpeg_path_or_default()).await;
    let catalog = if codecs.is_empty() {
        CodecCatalog::default()
    } else {
        CodecCatalog::new(codecs)
    };

    let result = SupportProbe::new(caps).classify(&catalog);

    if json {
        let report = match &result {
            Ok(verdicts) => CodecReport {
                platform_supported: true,
                message: None,
                verdicts,
            },
            Err(e) => CodecReport {
                platform_supported: false,
                message: Some(e.to_string()),
                verdicts: &[],
            },
        };
        if !print_json(&presenter, &report) {
            return ExitCode::from(EXIT_ERROR);
        }
    } else {
        match &result {
            Ok(verdicts) => verdicts.iter().for_each(|v| presenter.verdict(v)),
            Err(e) => presenter.error(&e.to_string()),
        }
    }

    match result {
        Ok(_) => ExitCode::from(EXIT_SUCCESS),
        Err(_) => ExitCode::from(EXIT_ERROR),
    }
}

/// Print device and media backend information
pub async fn run_info(json: bool, user_agent: Option<String>, config: AppConfig) -> ExitCode {
    let presenter = Presenter::new();
    let caps = FfmpegCapabilities::detect(config.ffmpeg_path_or_default()).await;
    let device = system_info::gather(caps.version().map(str::to_string), user_agent);

    if json {
        if !print_json(&presenter, &device) {
            return ExitCode::from(EXIT_ERROR);
        }
    } else {
        print_device(&presenter, &device);
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Start the camera, record one clip and print where it was saved
pub async fn run_record(options: RecordOptions, config: AppConfig) -> ExitCode {
    let mut presenter = Presenter::new();
    let probe =
        SupportProbe::new(FfmpegCapabilities::detect(config.ffmpeg_path_or_default()).await);

    if !probe.is_supported() {
        presenter.error(&PlatformUnsupportedError.to_string());
        return ExitCode::from(EXIT_ERROR);
    }
    if !probe.probe(&options.codec) {
        presenter.error(&format!("{} is not supported on this host", options.codec));
        return ExitCode::from(EXIT_ERROR);
    }

    let mut camera = camera_session(&config);
    presenter.start_spinner("Requesting camera...");
    if let Err(e) = camera.start().await {
        presenter.spinner_fail(&e.to_string());
        return ExitCode::from(EXIT_ERROR);
    }
    presenter.stop_spinner();

    let recorder = test_recorder(&config);
    let trigger = RecordTrigger::new(options.codec.clone());
    let stream = camera.stream();
    let result = record_one(
        &mut presenter,
        &recorder,
        &trigger,
        stream.as_deref(),
        options.duration,
    )
    .await;
    drop(stream);
    camera.stop();

    match result {
        Ok(output) => {
            presenter.output(&output.path.to_string_lossy());
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(_) => ExitCode::from(EXIT_ERROR),
    }
}

/// Press one trigger and report the outcome on a spinner
async fn record_one(
    presenter: &mut Presenter,
    recorder: &TestRecorder,
    trigger: &RecordTrigger,
    stream: Option<&CaptureStream>,
    duration: Duration,
) -> Result<TestRecordOutput, TestRecordError> {
    presenter.start_spinner(&format!("{} {}", trigger.label(), trigger.codec()));

    let mut callbacks = TestRecordCallbacks::default();
    if let Some(bar) = presenter.spinner_handle() {
        callbacks.on_recording_start = Some(Box::new(move |codec: &CodecIdentifier| {
            bar.set_message(format!("{} {} ({})", BUSY_LABEL, codec, duration));
        }));
    }

    let result = recorder.execute(trigger, stream, duration, &callbacks).await;
    match &result {
        Ok(output) => presenter.spinner_success(&format!(
            "{} saved to {} ({})",
            output.codec,
            output.path.display(),
            output.size
        )),
        Err(e) => presenter.spinner_fail(&format!("{}: {}", trigger.codec(), e)),
    }
    result
}

async fn hold_preview(presenter: &Presenter, camera: &Camera) {
    let shutdown = ShutdownSignal::new();
    shutdown.setup();
    presenter.info("Preview running, press Ctrl+C to stop");
    shutdown.wait().await;

    let preview = camera.surface();
    let size = preview
        .last_size()
        .map(|(w, h)| format!(" at {}x{}", w, h))
        .unwrap_or_default();
    presenter.info(&format!("Presented {} frames{}", preview.presented(), size));
}

fn camera_session(config: &AppConfig) -> Camera {
    let (width, height) = config.camera_resolution_or_default();
    let device = FfmpegCamera::new(
        config.ffmpeg_path_or_default(),
        config.camera_input_format_or_default(),
        config.camera_device_or_default(),
    );
    let constraints = CaptureConstraints {
        ideal_width: width,
        ideal_height: height,
        frame_rate: config.camera_frame_rate_or_default(),
    };
    CameraSession::new(device, Arc::new(PreviewStats::new()), constraints)
}

fn test_recorder(config: &AppConfig) -> TestRecorder {
    let factory = FfmpegRecorderFactory::new(config.ffmpeg_path_or_default());
    let pipeline = RecordingPipeline::new(factory)
        .with_stop_timeout(Some(config.stop_timeout_or_default().as_std()));
    TestRecordUseCase::new(
        pipeline,
        DirectoryDownloads::new(config.output_dir_or_default()),
    )
}

fn print_device(presenter: &Presenter, device: &DeviceInfo) {
    presenter.section("Device");
    for (label, value) in device.rows() {
        presenter.row(label, &value);
    }
}

fn print_json<T: Serialize>(presenter: &Presenter, value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            presenter.output(&json);
            true
        }
        Err(e) => {
            presenter.error(&format!("Failed to encode JSON: {}", e));
            false
        }
    }
}

/// Configuration from `CODEC_INSPECT_*` environment variables
pub fn env_config() -> AppConfig {
    AppConfig {
        ffmpeg_path: env_value(ENV_FFMPEG),
        output_dir: env_value(ENV_OUTPUT_DIR),
        ..Default::default()
    }
}

fn env_value(key: &str) -> Option<String> {
    env::var(key).ok().filter(|s| !s.is_empty())
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config(cli_config: AppConfig) -> AppConfig {
    let store = XdgConfigStore::new();
    let file_config = match store.load().await {
        Ok(config) => config,
        Err(e) => {
            debug!(error = %e, "ignoring unreadable config file");
            AppConfig::empty()
        }
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config())
        .merge(cli_config)
}
