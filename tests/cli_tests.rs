//! CLI integration tests.

use std::fs;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

fn stakeladder() -> Command {
    let mut cmd = cargo_bin_cmd!("stakeladder");
    cmd.env_remove("STAKELADDER_BROKER_TOKEN");
    cmd
}

#[test]
fn test_help_lists_commands() {
    stakeladder()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("stakeladder"))
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("check"))
        .stdout(predicate::str::contains("parse"));
}

#[test]
fn test_version() {
    stakeladder()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_check_config_valid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[trading]\ninitial_stake = 1\nmultiplier = 2\nmax_level = 2\n").unwrap();

    stakeladder()
        .args(["--color", "never", "check", "config", "-c"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration file is valid"))
        .stdout(predicate::str::contains("Max exposure"))
        .stdout(predicate::str::contains("7"));
}

#[test]
fn test_check_config_invalid_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[trading]\nmultiplier = 0.5\n").unwrap();

    stakeladder()
        .args(["check", "config", "-c"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("multiplier"));
}

#[test]
fn test_check_config_missing_file() {
    stakeladder()
        .args(["check", "config", "-c", "/nonexistent/stakeladder.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read config file"));
}

#[test]
fn test_check_config_json_mode() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "").unwrap();

    stakeladder()
        .args(["--json", "check", "config", "-c"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""type":"success""#))
        .stdout(predicate::str::contains(r#""label":"Webhook""#));
}

#[test]
fn test_parse_from_stdin() {
    stakeladder()
        .args(["--color", "never", "parse", "-", "-c", "/nonexistent/config.toml"])
        .write_stdin("🇪🇺 EUR/USD 🇺🇸 OTC\n🕘 Expiration 5M\n⏺ Entry at 10:59\n🟩 BUY\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("EURUSD_otc"))
        .stdout(predicate::str::contains("300s"))
        .stdout(predicate::str::contains("Local entry"));
}

#[test]
fn test_parse_incomplete_notification_fails() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("signal.txt");
    fs::write(&path, "EUR/USD\nEntry at 10:59\n").unwrap();

    stakeladder()
        .args(["parse", "-c", "/nonexistent/config.toml"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing direction"));
}

#[test]
fn test_run_rejects_invalid_config() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[server]\nbind = \"not-an-address\"\n").unwrap();

    stakeladder()
        .args(["run", "-c"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("bind"));
}
