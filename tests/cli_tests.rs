//! CLI integration tests

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Binary with an isolated config home and no usable media backend
fn codec_inspect(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("codec-inspect").expect("binary should build");
    cmd.env("NO_COLOR", "1")
        .env("HOME", home.path())
        .env("XDG_CONFIG_HOME", home.path().join("config"))
        .env("CODEC_INSPECT_FFMPEG", "/nonexistent/ffmpeg")
        .env("CODEC_INSPECT_OUTPUT_DIR", home.path().join("downloads"))
        .env_remove("CODEC_INSPECT_LOG");
    cmd
}

#[test]
fn help_output() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--record"))
        .stdout(predicate::str::contains("--no-camera"))
        .stdout(predicate::str::contains("--duration"))
        .stdout(predicate::str::contains("codecs"))
        .stdout(predicate::str::contains("info"))
        .stdout(predicate::str::contains("record"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn version_output() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("codec-inspect"))
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn config_path_command() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("codec-inspect"))
        .stdout(predicate::str::contains("config.toml"));
}

#[test]
fn config_help() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("set"))
        .stdout(predicate::str::contains("list"));
}

#[test]
fn config_set_then_get() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .args(["config", "set", "stop_timeout", "3000ms"])
        .assert()
        .success();

    codec_inspect(&home)
        .args(["config", "get", "stop_timeout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("3s"));
}

#[test]
fn invalid_duration_is_usage_error() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .args(["--no-camera", "--duration", "invalid"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid duration"));
}

#[test]
fn invalid_codec_is_usage_error() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .args(["record", "webm"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Invalid codec identifier"));
}

#[test]
fn codecs_json_without_backend() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .args(["codecs", "--json"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("\"platform_supported\": false"))
        .stdout(predicate::str::contains("not supported on this host"));
}

#[test]
fn codecs_table_without_backend() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .arg("codecs")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Media recording is not supported"));
}

#[test]
fn info_json_reports_user_agent() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .args(["info", "--json", "--user-agent", "Firefox/128.0"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Firefox/128.0"))
        .stdout(predicate::str::contains("\"media_backend\": null"));
}

#[test]
fn record_without_backend_fails() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .args(["record", "video/webm", "-d", "500ms"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not supported"));
}

#[test]
fn report_without_camera() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .arg("--no-camera")
        .assert()
        .success()
        .stdout(predicate::str::contains("Device"))
        .stdout(predicate::str::contains("Codec Support"))
        .stdout(predicate::str::contains("Camera inactive"));
}

#[test]
fn report_skips_unsupported_recordings() {
    let home = TempDir::new().unwrap();
    codec_inspect(&home)
        .args(["--no-camera", "--record", "video/webm"])
        .assert()
        .success()
        .stderr(predicate::str::contains("Skipping video/webm"));
}
