//! codec-inspect CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use codec_inspect::cli::{
    app::{
        load_merged_config, run_codecs, run_info, run_page, run_record, EXIT_ERROR,
        EXIT_USAGE_ERROR,
    },
    args::{Cli, Commands, PageOptions, RecordOptions},
    config_cmd::{handle_config_command, parse_codecs},
    presenter::Presenter,
};
use codec_inspect::domain::codec::CodecIdentifier;
use codec_inspect::domain::config::AppConfig;
use codec_inspect::domain::recording::Duration;
use codec_inspect::infrastructure::XdgConfigStore;

/// Log filter variable, e.g. `CODEC_INSPECT_LOG=codec_inspect=debug`
const LOG_ENV: &str = "CODEC_INSPECT_LOG";

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "codec_inspect=info,warn",
        _ => "codec_inspect=debug,info",
    };
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| default_level.into());

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    tracing::debug!("codec-inspect v{}", env!("CARGO_PKG_VERSION"));

    let presenter = Presenter::new();

    match cli.command {
        Some(Commands::Config { action }) => {
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
        Some(Commands::Codecs { json, codecs }) => {
            let codecs = match parse_codecs(&codecs) {
                Ok(codecs) => codecs,
                Err(e) => {
                    presenter.error(&e.to_string());
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            };
            let config = load_merged_config(AppConfig::empty()).await;
            run_codecs(json, codecs, config).await
        }
        Some(Commands::Info { json }) => {
            let config = load_merged_config(AppConfig::empty()).await;
            run_info(json, cli.user_agent, config).await
        }
        Some(Commands::Record {
            codec,
            duration,
            output_dir,
        }) => {
            let codec = match codec.parse::<CodecIdentifier>() {
                Ok(codec) => codec,
                Err(e) => {
                    presenter.error(&e.to_string());
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            };
            let config = load_merged_config(AppConfig {
                duration,
                output_dir,
                ..Default::default()
            })
            .await;
            let duration = match parse_duration(&presenter, &config) {
                Ok(d) => d,
                Err(code) => return code,
            };

            run_record(RecordOptions { codec, duration }, config).await
        }
        None => {
            let record = match parse_codecs(&cli.record) {
                Ok(codecs) => codecs,
                Err(e) => {
                    presenter.error(&e.to_string());
                    return ExitCode::from(EXIT_USAGE_ERROR);
                }
            };
            let config = load_merged_config(AppConfig {
                duration: cli.duration.clone(),
                output_dir: cli.output_dir.clone(),
                ..Default::default()
            })
            .await;
            let duration = match parse_duration(&presenter, &config) {
                Ok(d) => d,
                Err(code) => return code,
            };

            let options = PageOptions {
                user_agent: cli.user_agent,
                camera: !cli.no_camera,
                record,
                hold: cli.hold,
                duration,
            };
            run_page(options, config).await
        }
    }
}

/// Parse the merged duration, reporting a usage error when it is malformed
fn parse_duration(presenter: &Presenter, config: &AppConfig) -> Result<Duration, ExitCode> {
    match config.duration.as_ref() {
        Some(s) => s.parse::<Duration>().map_err(|e| {
            presenter.error(&format!("Invalid duration: {}", e));
            ExitCode::from(EXIT_USAGE_ERROR)
        }),
        None => Ok(Duration::default_record_duration()),
    }
}
