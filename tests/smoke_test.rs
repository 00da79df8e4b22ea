//! Smoke tests: the binary starts, parses its arguments and reports errors.

mod common;

use common::TestVault;
use predicates::prelude::*;

#[test]
fn test_version() {
    let vault = TestVault::new();
    vault
        .acadash()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_help_lists_commands() {
    let vault = TestVault::new();
    vault
        .acadash()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("show"))
        .stdout(predicate::str::contains("watch"))
        .stdout(predicate::str::contains("progress"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_command_is_required() {
    let vault = TestVault::new();
    vault.acadash().assert().failure();
}

#[test]
fn test_invalid_today_is_an_error() {
    let vault = TestVault::new();
    vault
        .acadash()
        .args(["--today", "tomorrow", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid date 'tomorrow'"));
}

#[test]
fn test_errors_are_json_by_default() {
    let vault = TestVault::new();
    let output = vault
        .acadash()
        .args(["--vault", "does/not/exist", "show"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    let json: serde_json::Value = serde_json::from_str(stderr.trim()).expect("Invalid JSON");
    assert!(json["error"].as_str().unwrap().contains("not a directory"));
}

#[test]
fn test_errors_are_plain_with_human_flag() {
    let vault = TestVault::new();
    vault
        .acadash()
        .args(["-H", "--vault", "does/not/exist", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("Error: "));
}

#[test]
fn test_unknown_language_is_rejected() {
    let vault = TestVault::new();
    vault
        .acadash()
        .args(["--lang", "de", "show"])
        .assert()
        .failure();
}
