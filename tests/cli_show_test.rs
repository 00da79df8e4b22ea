//! Integration tests for `acadash show`.
//!
//! These tests build a small vault of course notes and check that:
//! - only notes of the configured academic year are shown
//! - excluded folders are skipped
//! - notes are grouped by semester then teaching unit
//! - effort counters add up

mod common;

use common::{TestVault, stdout_json};
use predicates::prelude::*;

/// Two courses this year, one last year, and a template.
fn course_vault() -> TestVault {
    let vault = TestVault::new();
    vault.write_course(
        "courses/Phonetics.md",
        "2025-2026",
        "S1",
        "[[UE1]]",
        "2h",
        "# Phonetics\n\n- [x] Read chapter [🍅:: 2]\n- [ ] Exercises\n",
    );
    vault.write_course(
        "courses/Ethics.md",
        "2025-2026",
        "S2",
        "",
        "",
        "- [x] Essay\n",
    );
    vault.write_course(
        "archive/Logic.md",
        "2024-2025",
        "S1",
        "UE1",
        "10",
        "- [ ] Old task\n",
    );
    vault.write_course(
        "templates/Course.md",
        "2025-2026",
        "S1",
        "UE1",
        "10",
        "- [ ] Template task\n",
    );
    vault.write_note("Inbox.md", "- [ ] not a course\n");
    vault
}

#[test]
fn test_show_json_structure() {
    let vault = course_vault();
    let output = vault.acadash_today().arg("show").output().unwrap();
    assert!(output.status.success());

    let json = stdout_json(&output);
    let dashboard = &json["dashboard"];
    assert_eq!(dashboard["title"], "IED Dashboard");
    assert_eq!(dashboard["academic_year"], "2025-2026");
    assert!(dashboard.get("empty_message").is_none());
    assert!(json.get("report").is_none());

    let buckets = dashboard["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0]["bucket"], "semester1");
    assert_eq!(buckets[1]["bucket"], "semester2");

    let group = &buckets[0]["groups"][0];
    assert_eq!(group["label"], "UE1");
    assert_eq!(group["effort_total"], 3);
    assert_eq!(group["effort_done"], 2);
    assert_eq!(group["documents"][0]["id"], "courses/Phonetics.md");
    assert_eq!(group["documents"][0]["tasks"].as_array().unwrap().len(), 2);

    let ethics = &buckets[1]["groups"][0];
    assert_eq!(ethics["show_header"], false);
    assert_eq!(ethics["documents"][0]["all_tasks_done"], true);
}

#[test]
fn test_show_semester_progress() {
    let vault = course_vault();
    let output = vault
        .acadash_today()
        .args(["--lang", "en", "show"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    let buckets = &json["dashboard"]["buckets"];

    assert_eq!(buckets[0]["title"], "Semester 1");
    assert_eq!(buckets[0]["progress"]["phase"], "in_progress");
    assert_eq!(buckets[0]["progress"]["label"], "10 week(s) left");
    assert_eq!(buckets[0]["open"], true);

    assert_eq!(buckets[1]["progress"]["phase"], "not_started");
    assert_eq!(buckets[1]["progress"]["label"], "Start in 96d");
}

#[test]
fn test_show_closed_semester() {
    let vault = course_vault();
    let output = vault
        .acadash()
        .args(["--today", "2026-02-01", "show"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    let s1 = &json["dashboard"]["buckets"][0];
    assert_eq!(s1["open"], false);
    assert_eq!(s1["progress"]["phase"], "complete");
}

#[test]
fn test_show_human() {
    let vault = course_vault();
    vault
        .acadash_today()
        .args(["-H", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("IED Dashboard (2025-2026)"))
        .stdout(predicate::str::contains("▾ Semestre 1"))
        .stdout(predicate::str::contains("UE1 (🍅 2/3)"))
        .stdout(predicate::str::contains("[x] Read chapter  🍅 2"))
        .stdout(predicate::str::contains("[ ] Exercises"))
        .stdout(predicate::str::contains("✓ Toutes les tâches sont terminées"))
        .stdout(predicate::str::contains("Old task").not())
        .stdout(predicate::str::contains("Template task").not())
        .stdout(predicate::str::contains("not a course").not());
}

#[test]
fn test_show_other_year() {
    let vault = course_vault();
    vault
        .acadash_today()
        .args(["-H", "--year", "2024-2025", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Old task"))
        .stdout(predicate::str::contains("Phonetics").not());
}

#[test]
fn test_show_empty_vault() {
    let vault = TestVault::new();
    let output = vault.acadash_today().arg("show").output().unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(
        json["dashboard"]["empty_message"],
        "Aucune page trouvée pour cette année académique."
    );

    vault
        .acadash_today()
        .args(["-H", "--lang", "en", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No pages found for this academic year."));
}

#[test]
fn test_show_report() {
    let vault = course_vault();
    let output = vault
        .acadash_today()
        .args(["show", "--report"])
        .output()
        .unwrap();
    let json = stdout_json(&output);
    let report = &json["report"];
    assert_eq!(report["documents"], 5);
    assert_eq!(report["selected"], 2);
    assert_eq!(report["misses"], 2);
    assert_eq!(report["skipped"].as_array().unwrap().len(), 0);
}

#[test]
fn test_show_unassigned_semester() {
    let vault = TestVault::new();
    vault.write_course("Thesis.md", "2025-2026", "Annual", "", "", "- [ ] Outline\n");
    let output = vault.acadash_today().arg("show").output().unwrap();
    let json = stdout_json(&output);
    let buckets = json["dashboard"]["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 3);
    assert_eq!(buckets[2]["bucket"], "unassigned");
    assert_eq!(buckets[2]["open"], true);
    assert_eq!(buckets[2]["groups"][0]["documents"][0]["title"], "Thesis");
    assert!(buckets[0]["empty_message"].is_string());
}

#[test]
fn test_show_invalid_frontmatter_is_not_fatal() {
    let vault = course_vault();
    vault.write_note("Broken.md", "---\nied_ec_academic_year: [unclosed\n---\n- [ ] x\n");
    vault.acadash_today().arg("show").assert().success();
}

#[test]
fn test_show_from_vault_flag() {
    let vault = course_vault();
    let elsewhere = common::TempDir::new().unwrap();
    let mut cmd = vault.acadash_today();
    cmd.current_dir(elsewhere.path());
    cmd.args(["--vault"]).arg(vault.path()).arg("show");
    let output = cmd.output().unwrap();
    assert!(output.status.success());
    assert_eq!(
        stdout_json(&output)["dashboard"]["buckets"][0]["groups"][0]["label"],
        "UE1"
    );
}
