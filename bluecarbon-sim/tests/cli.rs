//! Integration tests for the bluecarbon-sim binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

/// Command isolated from the user's config and log settings
fn sim(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("bluecarbon-sim").unwrap();
    cmd.env("BLUECARBON_CONFIG", dir.path().join("missing.toml"))
        .env_remove("BLUECARBON_LOG_FORMAT")
        .env_remove("BLUECARBON_LOG_LEVEL")
        .env_remove("RUST_LOG");
    cmd
}

fn snapshot(output: &[u8]) -> serde_json::Value {
    serde_json::from_slice(output).expect("snapshot is JSON")
}

#[test]
fn test_snapshot_of_seed_without_streaming() {
    let dir = TempDir::new().unwrap();
    let output = sim(&dir)
        .args(["--duration", "0s", "--snapshot"])
        .assert()
        .success()
        .stderr(predicate::str::contains("bluecarbon-sim starting"))
        .get_output()
        .stdout
        .clone();

    let json = snapshot(&output);
    assert_eq!(json["overview"]["totalProjects"], 5);
    assert_eq!(json["overview"]["totalCreditsIssued"], 41_200);
    assert_eq!(json["marketplace"]["creditsAvailable"], 4_500);
    assert_eq!(json["state"]["nextId"], 100);
}

#[test]
fn test_walkthrough_reaches_retirement() {
    let dir = TempDir::new().unwrap();
    let output = sim(&dir)
        .args(["--walkthrough", "--duration", "0s", "--snapshot"])
        .assert()
        .success()
        .stderr(predicate::str::contains("walkthrough complete"))
        .get_output()
        .stdout
        .clone();

    let json = snapshot(&output);
    assert_eq!(json["mrvQueue"]["pending"], 1);
    assert_eq!(json["mrvQueue"]["approved"], 2);
    assert_eq!(json["overview"]["totalCreditsIssued"], 41_700);
    assert_eq!(json["state"]["wallet"]["role"], "Admin");

    let credits = json["state"]["carbonCredits"].as_array().unwrap();
    let issued = credits.last().unwrap();
    assert_eq!(issued["amount"], 500);
    assert_eq!(issued["status"], "Retired");

    let listing = &json["state"]["marketplace"]["listings"][1];
    assert_eq!(listing["quantity"], 500);
}

#[test]
fn test_short_stream_collects_samples() {
    let dir = TempDir::new().unwrap();
    let output = sim(&dir)
        .args([
            "--stream", "1", "--interval", "50ms", "--duration", "400ms", "--seed", "7",
            "--no-alerts", "--snapshot",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = snapshot(&output);
    let samples = json["state"]["sensorStreams"]["1"].as_array().unwrap();
    assert!(!samples.is_empty());
    assert!(json["state"]["sensorStreams"]["2"].as_array().unwrap().is_empty());
    assert!(json["state"]["notifications"].as_array().unwrap().is_empty());
}

#[test]
fn test_offline_sensor_is_not_streamed() {
    let dir = TempDir::new().unwrap();
    let output = sim(&dir)
        .args(["--stream", "3", "--interval", "20ms", "--duration", "200ms", "--snapshot"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = snapshot(&output);
    assert!(json["state"]["sensorStreams"]["3"].as_array().unwrap().is_empty());
}

#[test]
fn test_config_file_is_honored() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[activity]\nretention = 1\n").unwrap();

    let output = sim(&dir)
        .arg("--config")
        .arg(&config)
        .args(["--walkthrough", "--duration", "0s", "--snapshot"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let json = snapshot(&output);
    assert_eq!(json["state"]["activities"].as_array().unwrap().len(), 1);
}

#[test]
fn test_invalid_config_exits_with_config_code() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[notifications]\nttl = \"whenever\"\n").unwrap();

    sim(&dir)
        .env("BLUECARBON_CONFIG", &config)
        .args(["--duration", "0s"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("notifications.ttl"));
}

#[test]
fn test_bad_interval_is_rejected_by_parser() {
    let dir = TempDir::new().unwrap();
    sim(&dir)
        .args(["--interval", "fast"])
        .assert()
        .failure();
}

#[test]
fn test_zero_interval_exits_with_input_code() {
    let dir = TempDir::new().unwrap();
    sim(&dir)
        .args(["--interval", "0s", "--duration", "0s"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("--interval must be greater than zero"));
}

#[test]
fn test_help_lists_every_exit_code() {
    let dir = TempDir::new().unwrap();
    sim(&dir)
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("3 - Invalid command-line input"));
}
