//! Error scenario integration tests

use std::path::Path;
use std::process::Command;

fn codec_inspect_bin(home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_codec-inspect"));
    cmd.env("NO_COLOR", "1")
        .env("HOME", home)
        .env("XDG_CONFIG_HOME", home.join("config"));
    cmd
}

#[test]
fn config_get_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let output = codec_inspect_bin(home.path())
        .args(["config", "get", "unknown_key"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Unknown key") && stderr.contains("camera.device"),
        "Expected error about unknown key, got: {}",
        stderr
    );
}

#[test]
fn config_set_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let output = codec_inspect_bin(home.path())
        .args(["config", "set", "api_key", "value"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Unknown key"), "got: {}", stderr);
}

#[test]
fn config_set_invalid_duration() {
    let home = tempfile::tempdir().unwrap();
    let output = codec_inspect_bin(home.path())
        .args(["config", "set", "duration", "forever"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Invalid"),
        "Expected error about duration, got: {}",
        stderr
    );
}

#[test]
fn config_set_non_numeric_width() {
    let home = tempfile::tempdir().unwrap();
    let output = codec_inspect_bin(home.path())
        .args(["config", "set", "camera.width", "abc"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("positive integer"), "got: {}", stderr);
}

#[test]
fn config_init_twice() {
    let home = tempfile::tempdir().unwrap();
    let first = codec_inspect_bin(home.path())
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(first.status.success());

    let second = codec_inspect_bin(home.path())
        .args(["config", "init"])
        .output()
        .expect("Failed to execute command");
    assert!(!second.status.success());
    let stderr = String::from_utf8_lossy(&second.stderr);
    assert!(stderr.contains("already exists"), "got: {}", stderr);
}

#[test]
fn unknown_subcommand() {
    let home = tempfile::tempdir().unwrap();
    let output = codec_inspect_bin(home.path())
        .arg("transcode")
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(2));
}
