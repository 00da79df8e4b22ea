//! Integration tests for configuration layering.
//!
//! Precedence, highest first: CLI flags, vault config, user config, defaults.
//! `--config <path>` replaces both file layers.

mod common;

use common::{TestVault, stdout_json};
use predicates::prelude::*;

#[test]
fn test_config_show_defaults() {
    let vault = TestVault::new();
    let output = vault.acadash().args(["config", "show"]).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["config"]["academic_year"], "2025-2026");
    assert_eq!(json["config"]["pomodoro_minutes"], 40);
    assert_eq!(json["files"].as_array().unwrap().len(), 0);
    assert_eq!(json["sources"].as_object().unwrap().len(), 0);
}

#[test]
fn test_vault_config_beats_user_config() {
    let vault = TestVault::new();
    vault.write_user_config("academic-year \"2023-2024\"\ndashboard-title \"Mine\"\n");
    vault.write_vault_config("academic-year \"2024-2025\"\n");

    let output = vault.acadash().args(["config", "show"]).output().unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["config"]["academic_year"], "2024-2025");
    assert_eq!(json["config"]["dashboard_title"], "Mine");
    assert_eq!(json["sources"]["academic-year"], "vault");
    assert_eq!(json["sources"]["dashboard-title"], "user");
    assert_eq!(json["files"].as_array().unwrap().len(), 2);
}

#[test]
fn test_cli_flags_beat_files() {
    let vault = TestVault::new();
    vault.write_vault_config("academic-year \"2024-2025\"\nlanguage \"fr\"\n");

    let output = vault
        .acadash()
        .args(["--year", "2030-2031", "--lang", "en", "config", "show"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["config"]["academic_year"], "2030-2031");
    assert_eq!(json["config"]["language"], "en");
    assert_eq!(json["sources"]["academic-year"], "cli");
}

#[test]
fn test_explicit_config_replaces_layers() {
    let vault = TestVault::new();
    vault.write_user_config("dashboard-title \"Mine\"\n");
    vault.write_vault_config("academic-year \"2024-2025\"\n");
    let explicit = vault.write_note("custom.kdl", "pomodoro-minutes 25\n");

    let output = vault
        .acadash()
        .arg("--config")
        .arg(&explicit)
        .args(["config", "show"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    assert_eq!(json["config"]["pomodoro_minutes"], 25);
    assert_eq!(json["config"]["academic_year"], "2025-2026");
    assert_eq!(json["config"]["dashboard_title"], "IED Dashboard");
    assert!(
        json["sources"]["pomodoro-minutes"]
            .as_str()
            .unwrap()
            .starts_with("file:")
    );
}

#[test]
fn test_missing_explicit_config_is_an_error() {
    let vault = TestVault::new();
    vault
        .acadash()
        .args(["-H", "--config", "nope.kdl", "config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
}

#[test]
fn test_invalid_values_are_warnings() {
    let vault = TestVault::new();
    vault.write_vault_config("pomodoro-minutes 0\nacademic-year \"2024-2025\"\n");
    let output = vault.acadash().args(["config", "show"]).output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["config"]["pomodoro_minutes"], 40);
    assert_eq!(json["config"]["academic_year"], "2024-2025");
    assert!(!json["warnings"].as_array().unwrap().is_empty());
}

#[test]
fn test_config_init_writes_vault_config() {
    let vault = TestVault::new();
    vault
        .acadash()
        .args(["-H", "config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("Wrote "));
    let written = vault.path().join(".acadash").join("config.kdl");
    let content = std::fs::read_to_string(&written).unwrap();
    assert!(content.contains("academic-year \"2025-2026\""));

    vault
        .acadash()
        .args(["config", "init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    vault
        .acadash()
        .args(["config", "init", "--force"])
        .assert()
        .success();
}

#[test]
fn test_config_init_user() {
    let vault = TestVault::new();
    vault
        .acadash()
        .args(["config", "init", "--user"])
        .assert()
        .success();
    assert!(vault.config_home.path().join("config.kdl").exists());
}

#[test]
fn test_custom_properties_drive_the_dashboard() {
    let vault = TestVault::new();
    vault.write_vault_config(
        "year-property \"year\"\nsemester-property \"term\"\nsemester-labels \"Fall\" \"Spring\"\n",
    );
    vault.write_note(
        "Algebra.md",
        "---\nyear: \"2025-2026\"\nterm: Spring\n---\n- [ ] Groups\n",
    );
    let output = vault.acadash_today().arg("show").output().unwrap();
    let json = stdout_json(&output);
    let s2 = &json["dashboard"]["buckets"][1];
    assert_eq!(s2["bucket"], "semester2");
    assert_eq!(s2["groups"][0]["documents"][0]["title"], "Algebra");
}

#[test]
fn test_excluded_folders_from_config() {
    let vault = TestVault::new();
    vault.write_vault_config("excluded-folders \"drafts\"\n");
    vault.write_course("drafts/Draft.md", "2025-2026", "S1", "", "", "- [ ] hidden\n");
    vault.write_course("templates/T.md", "2025-2026", "S1", "", "", "- [ ] shown\n");
    vault
        .acadash_today()
        .args(["-H", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("shown"))
        .stdout(predicate::str::contains("hidden").not());
}
