//! CLI smoke tests for the runbook binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn runbook_cmd() -> Command {
    Command::cargo_bin("runbook").unwrap()
}

#[test]
fn help_lists_the_subcommands() {
    runbook_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("render"));
}

#[test]
fn missing_subcommand_fails() {
    runbook_cmd()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn run_prints_the_aggregate_output() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("echo.yaml");
    fs::write(
        &config,
        "commands:\n  - command: \"echo {{msg}}\"\n    required:\n      - msg: \".*\"\n",
    )
    .unwrap();

    runbook_cmd()
        .arg("run")
        .arg(&config)
        .args(["-p", "msg=hello"])
        .assert()
        .success()
        .stdout("hello\n");
}

#[test]
fn run_accepts_repeated_parameter_values() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("echo.yaml");
    fs::write(
        &config,
        "commands:\n  - command: \"echo {{msg}}\"\n    required:\n      - msg: \".*\"\n",
    )
    .unwrap();

    // Last value wins in the substituted template.
    runbook_cmd()
        .arg("run")
        .arg(&config)
        .args(["-p", "msg=first", "-p", "msg=second"])
        .assert()
        .success()
        .stdout("second\n");
}

#[test]
fn validation_failure_prints_the_json_body_and_exits_nonzero() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("guarded.yaml");
    fs::write(
        &config,
        "commands:\n  - command: \"echo {{msg}}\"\n    required:\n      - msg: \".+\"\n",
    )
    .unwrap();

    runbook_cmd()
        .arg("run")
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""Code":1"#))
        .stderr(predicate::str::contains("msg"));
}

#[test]
fn render_writes_raw_bytes_to_stdout() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("echo.yaml");
    fs::write(&config, "commands:\n  - command: \"echo raw\"\n").unwrap();

    runbook_cmd()
        .arg("render")
        .arg(&config)
        .assert()
        .success()
        .stdout("raw\n");
}

#[test]
fn render_emits_the_json_body_on_validation_failure() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("guarded.yaml");
    fs::write(
        &config,
        "commands:\n  - command: \"echo {{msg}}\"\n    required:\n      - msg: \".+\"\n",
    )
    .unwrap();

    runbook_cmd()
        .arg("render")
        .arg(&config)
        .assert()
        .failure()
        .stdout(predicate::str::contains(r#""Code":1"#));
}

#[test]
fn missing_config_file_is_a_hard_error() {
    runbook_cmd()
        .arg("run")
        .arg("/nonexistent/runbook.yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read runbook"));
}

#[test]
fn malformed_parameter_flag_is_rejected() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("any.yaml");
    fs::write(&config, "commands: []\n").unwrap();

    runbook_cmd()
        .arg("run")
        .arg(&config)
        .args(["-p", "no-equals-sign"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("name=value"));
}
