//! Config command handler

use crate::application::ports::ConfigStore;
use crate::domain::codec::CodecIdentifier;
use crate::domain::config::{AppConfig, CameraConfig};
use crate::domain::error::ConfigError;
use crate::domain::recording::Duration;

use super::args::{is_valid_config_key, ConfigAction, VALID_CONFIG_KEYS};
use super::presenter::Presenter;

const NOT_SET: &str = "(not set)";

/// Handle config subcommand
pub async fn handle_config_command<S: ConfigStore>(
    action: ConfigAction,
    store: &S,
    presenter: &Presenter,
) -> Result<(), ConfigError> {
    match action {
        ConfigAction::Init => handle_init(store, presenter).await,
        ConfigAction::Set { key, value } => handle_set(store, presenter, &key, &value).await,
        ConfigAction::Get { key } => handle_get(store, presenter, &key).await,
        ConfigAction::List => handle_list(store, presenter).await,
        ConfigAction::Path => handle_path(store, presenter),
    }
}

async fn handle_init<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    store.init().await?;
    presenter.success(&format!(
        "Config file created at: {}",
        store.path().display()
    ));
    Ok(())
}

async fn handle_set<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    validate_key(key)?;

    let mut config = store.load().await?;
    apply_config_value(&mut config, key, value)?;

    store.save(&config).await?;
    presenter.success(&format!("{} = {}", key, value));

    Ok(())
}

async fn handle_get<S: ConfigStore>(
    store: &S,
    presenter: &Presenter,
    key: &str,
) -> Result<(), ConfigError> {
    validate_key(key)?;

    let config = store.load().await?;
    match config_value(&config, key) {
        Some(v) => presenter.output(&v),
        None => presenter.output(NOT_SET),
    }

    Ok(())
}

async fn handle_list<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    let config = store.load().await?;

    for key in VALID_CONFIG_KEYS {
        let value = config_value(&config, key);
        presenter.key_value(key, value.as_deref().unwrap_or(NOT_SET));
    }

    Ok(())
}

fn handle_path<S: ConfigStore>(store: &S, presenter: &Presenter) -> Result<(), ConfigError> {
    presenter.output(&store.path().to_string_lossy());
    Ok(())
}

fn validate_key(key: &str) -> Result<(), ConfigError> {
    if is_valid_config_key(key) {
        Ok(())
    } else {
        Err(ConfigError::ValidationError {
            key: key.to_string(),
            message: format!("Unknown key. Valid keys: {}", VALID_CONFIG_KEYS.join(", ")),
        })
    }
}

/// Read a config value by its dotted key
pub fn config_value(config: &AppConfig, key: &str) -> Option<String> {
    let camera = config.camera.as_ref();
    match key {
        "ffmpeg_path" => config.ffmpeg_path.clone(),
        "duration" => config.duration.clone(),
        "stop_timeout" => config.stop_timeout.clone(),
        "output_dir" => config.output_dir.clone(),
        "camera.device" => camera.and_then(|c| c.device.clone()),
        "camera.input_format" => camera.and_then(|c| c.input_format.clone()),
        "camera.width" => camera.and_then(|c| c.width).map(|v| v.to_string()),
        "camera.height" => camera.and_then(|c| c.height).map(|v| v.to_string()),
        "camera.frame_rate" => camera.and_then(|c| c.frame_rate).map(|v| v.to_string()),
        _ => None,
    }
}

/// Validate `value` for `key` and store it in `config`
pub fn apply_config_value(
    config: &mut AppConfig,
    key: &str,
    value: &str,
) -> Result<(), ConfigError> {
    match key {
        "ffmpeg_path" => config.ffmpeg_path = Some(non_empty(key, value)?),
        "duration" => config.duration = Some(parse_duration(key, value)?),
        "stop_timeout" => config.stop_timeout = Some(parse_duration(key, value)?),
        "output_dir" => config.output_dir = Some(non_empty(key, value)?),
        "camera.device" => camera_mut(config).device = Some(non_empty(key, value)?),
        "camera.input_format" => camera_mut(config).input_format = Some(non_empty(key, value)?),
        "camera.width" => camera_mut(config).width = Some(parse_positive(key, value)?),
        "camera.height" => camera_mut(config).height = Some(parse_positive(key, value)?),
        "camera.frame_rate" => camera_mut(config).frame_rate = Some(parse_positive(key, value)?),
        _ => return validate_key(key),
    }
    Ok(())
}

fn camera_mut(config: &mut AppConfig) -> &mut CameraConfig {
    config.camera.get_or_insert_with(CameraConfig::default)
}

fn validation(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        key: key.to_string(),
        message: message.into(),
    }
}

fn non_empty(key: &str, value: &str) -> Result<String, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(validation(key, "Value must not be empty"));
    }
    Ok(trimmed.to_string())
}

/// Durations are stored in their canonical spelling
fn parse_duration(key: &str, value: &str) -> Result<String, ConfigError> {
    value
        .parse::<Duration>()
        .map(|d| d.to_string())
        .map_err(|e| validation(key, e.to_string()))
}

fn parse_positive(key: &str, value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(validation(key, "Value must be a positive integer")),
    }
}

/// Parse user-supplied codec identifiers, failing on the first invalid one
pub fn parse_codecs(values: &[String]) -> Result<Vec<CodecIdentifier>, ConfigError> {
    values
        .iter()
        .map(|v| {
            v.parse::<CodecIdentifier>()
                .map_err(|e| validation("codec", e.to_string()))
        })
        .collect()
}
