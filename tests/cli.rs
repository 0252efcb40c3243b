// ABOUTME: Integration tests for the skiff CLI commands.
// ABOUTME: Validates --help output, init behavior, and config error reporting.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;

fn skiff_cmd() -> Command {
    Command::new(assert_cmd::cargo::cargo_bin!("skiff"))
}

#[test]
fn help_shows_commands() {
    skiff_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("init"))
        .stdout(predicate::str::contains("exec"))
        .stdout(predicate::str::contains("get"))
        .stdout(predicate::str::contains("put"));
}

#[test]
fn exec_help_shows_output_flags() {
    skiff_cmd()
        .args(["exec", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--raw"))
        .stdout(predicate::str::contains("--lines"));
}

#[test]
fn init_creates_config_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("skiff.yml");

    skiff_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .success();

    assert!(config_path.exists(), "skiff.yml should be created");
    let content = fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("target:"), "Config should have target field");
}

#[test]
fn init_uses_given_host() {
    let temp_dir = tempfile::tempdir().unwrap();

    skiff_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--host", "ops@db.internal:2200"])
        .assert()
        .success();

    let content = fs::read_to_string(temp_dir.path().join("skiff.yml")).unwrap();
    assert!(content.contains("host: ops@db.internal:2200"));
}

#[test]
fn init_refuses_to_overwrite_existing_config() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("skiff.yml");

    fs::write(&config_path, "existing: config").unwrap();

    skiff_cmd()
        .current_dir(temp_dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert_eq!(fs::read_to_string(&config_path).unwrap(), "existing: config");
}

#[test]
fn init_force_overwrites() {
    let temp_dir = tempfile::tempdir().unwrap();
    let config_path = temp_dir.path().join("skiff.yml");
    fs::write(&config_path, "existing: config").unwrap();

    skiff_cmd()
        .current_dir(temp_dir.path())
        .args(["init", "--force"])
        .assert()
        .success();

    assert!(fs::read_to_string(&config_path).unwrap().contains("target:"));
}

#[test]
fn exec_without_config_fails() {
    let temp_dir = tempfile::tempdir().unwrap();

    skiff_cmd()
        .current_dir(temp_dir.path())
        .args(["exec", "uptime"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("configuration file not found"));
}

#[test]
fn unknown_destination_fails() {
    let temp_dir = tempfile::tempdir().unwrap();
    fs::write(temp_dir.path().join("skiff.yml"), "target: example.com\n").unwrap();

    skiff_cmd()
        .current_dir(temp_dir.path())
        .args(["--destination", "nope", "get", "/x", "."])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown destination: nope"));
}

#[test]
fn json_errors_are_json_lines() {
    let temp_dir = tempfile::tempdir().unwrap();

    skiff_cmd()
        .current_dir(temp_dir.path())
        .args(["--json", "put", "missing", "/tmp"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(r#""event":"error""#));
}

#[test]
fn exec_requires_a_command() {
    skiff_cmd().arg("exec").assert().failure();
}
