// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

//! Exit codes and report output of the runner-parity binary.

mod common;

use assert_cmd::Command;
use common::{fixtures_dir, mock_bin, parity_bin, Runners};
use predicates::prelude::*;
use std::path::Path;

fn parity(runners: &Runners) -> Command {
    parity_against(runners, &runners.proxy)
}

fn parity_against(runners: &Runners, proxy: &Path) -> Command {
    let mut cmd = Command::new(parity_bin());
    cmd.env_remove("PARITY_CONFIG")
        .env_remove("PARITY_LOG")
        .arg("--baseline")
        .arg(&runners.baseline)
        .arg("--proxy")
        .arg(proxy)
        .arg("--catalog")
        .arg(fixtures_dir().join("parity.toml"))
        .arg("--cwd")
        .arg(fixtures_dir());
    cmd
}

#[test]
fn all_scenarios_pass_with_exit_zero() {
    let runners = Runners::new();
    parity(&runners)
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS host-code"))
        .stdout(predicate::str::contains("9 passed, 0 failed"));
}

#[test]
fn divergence_exits_one_and_shows_raw_diff() {
    let runners = Runners::new();
    let quiet = runners.script("quiet-proxy", "exit 0");
    parity_against(&runners, &quiet)
        .arg("--filter")
        .arg("pending")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("FAIL pending"))
        .stdout(predicate::str::contains("--- baseline stdout"))
        .stdout(predicate::str::contains("-  backlog"));
}

#[test]
fn json_report_is_machine_readable() {
    let runners = Runners::new();
    let output = parity(&runners)
        .arg("--format")
        .arg("json")
        .arg("--filter")
        .arg("host")
        .output()
        .unwrap();
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let names: Vec<&str> = json["scenarios"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["host-help", "host-code", "host-help-description"]);
    assert_eq!(json["failed"], 0);
}

#[test]
fn missing_proxy_is_a_config_error() {
    let runners = Runners::new();
    Command::new(parity_bin())
        .env_remove("PARITY_PROXY")
        .env_remove("PARITY_CONFIG")
        .arg("--baseline")
        .arg(&runners.baseline)
        .arg("--catalog")
        .arg(fixtures_dir().join("parity.toml"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no proxy program configured"));
}

#[test]
fn unmatched_filter_is_a_config_error() {
    let runners = Runners::new();
    parity(&runners)
        .arg("--filter")
        .arg("nothing-has-this-name")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("no scenario matches filter"));
}

#[test]
fn programs_can_come_from_the_environment() {
    let runners = Runners::new();
    Command::new(parity_bin())
        .env_remove("PARITY_CONFIG")
        .env("PARITY_BASELINE", &runners.baseline)
        .env("PARITY_PROXY", &runners.proxy)
        .arg("--catalog")
        .arg(fixtures_dir().join("parity.toml"))
        .arg("--filter")
        .arg("with-helper")
        .assert()
        .success();
}

#[test]
fn config_file_supplies_everything() {
    let runners = Runners::new();
    let config = runners.dir().join("parity.config.toml");
    std::fs::write(
        &config,
        format!(
            "baseline = {:?}\nproxy = {:?}\ncatalog = {:?}\ncwd = {:?}\ntimeout_ms = 10000\n",
            runners.baseline.display().to_string(),
            runners.proxy.display().to_string(),
            fixtures_dir().join("parity.toml").display().to_string(),
            fixtures_dir().display().to_string(),
        ),
    )
    .unwrap();

    Command::new(parity_bin())
        .env_remove("PARITY_BASELINE")
        .env_remove("PARITY_PROXY")
        .arg("--config")
        .arg(&config)
        .arg("--filter")
        .arg("profile")
        .assert()
        .success()
        .stdout(predicate::str::contains("PASS profile-builder"));
}

#[test]
fn capture_log_gets_one_line_per_run() {
    let runners = Runners::new();
    let log = runners.dir().join("runs.jsonl");
    parity(&runners)
        .arg("--filter")
        .arg("test")
        .arg("--capture-log")
        .arg(&log)
        .assert()
        .success();

    let content = std::fs::read_to_string(&log).unwrap();
    let runs: Vec<serde_json::Value> = content
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    // "test" is a parity scenario: one run per side.
    assert_eq!(runs.len(), 2);
    assert!(runs.iter().all(|r| r["invocation"]["scenario"] == "test"));
}

#[test]
fn mock_runner_rejects_proxy_flags_as_baseline() {
    Command::new(mock_bin())
        .env("MOCK_RUNNER_FLAVOR", "baseline")
        .arg("--profile-builder")
        .arg(fixtures_dir().join("builder"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--profile-builder"));
}
