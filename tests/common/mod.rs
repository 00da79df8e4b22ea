//! Common test utilities for acadash integration tests.
//!
//! Provides `TestVault` for isolated environments that never read the
//! user's `~/.config/acadash/` directory.

#![allow(dead_code)]

use assert_cmd::Command;
use std::path::{Path, PathBuf};
pub use tempfile::TempDir;

/// Date every command runs at unless a test passes its own `--today`.
pub const TODAY: &str = "2025-10-15";

/// A vault of notes plus an isolated user config directory.
///
/// The `acadash()` method returns a `Command` that sets `ACADASH_CONFIG_HOME`
/// per-invocation, making tests parallel-safe.
pub struct TestVault {
    pub vault_dir: TempDir,
    pub config_home: TempDir,
}

impl TestVault {
    pub fn new() -> Self {
        Self {
            vault_dir: TempDir::new().unwrap(),
            config_home: TempDir::new().unwrap(),
        }
    }

    /// Get a Command for the acadash binary running inside the vault.
    pub fn acadash(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_acadash"));
        cmd.current_dir(self.vault_dir.path());
        cmd.env("ACADASH_CONFIG_HOME", self.config_home.path());
        cmd.env_remove("ACADASH_VAULT");
        cmd.env_remove("ACADASH_LOG");
        cmd
    }

    /// Same as `acadash()` with `--today` pinned to [`TODAY`].
    pub fn acadash_today(&self) -> Command {
        let mut cmd = self.acadash();
        cmd.args(["--today", TODAY]);
        cmd
    }

    pub fn path(&self) -> &Path {
        self.vault_dir.path()
    }

    /// Writes a note at `relative`, creating parent folders.
    pub fn write_note(&self, relative: &str, content: &str) -> PathBuf {
        let path = self.vault_dir.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(&path, content).unwrap();
        path
    }

    /// Writes a course note with the default property names.
    pub fn write_course(
        &self,
        relative: &str,
        year: &str,
        semester: &str,
        unit: &str,
        volume: &str,
        body: &str,
    ) -> PathBuf {
        let content = format!(
            "---\nied_ec_academic_year: \"{}\"\nied_ec_semestre: \"{}\"\nied_ue: \"{}\"\nied_ec_volume: \"{}\"\n---\n{}",
            year, semester, unit, volume, body
        );
        self.write_note(relative, &content)
    }

    /// Writes `<vault>/.acadash/config.kdl`.
    pub fn write_vault_config(&self, content: &str) -> PathBuf {
        self.write_note(".acadash/config.kdl", content)
    }

    /// Writes `<config home>/config.kdl`.
    pub fn write_user_config(&self, content: &str) -> PathBuf {
        let path = self.config_home.path().join("config.kdl");
        std::fs::write(&path, content).unwrap();
        path
    }
}

impl Default for TestVault {
    fn default() -> Self {
        Self::new()
    }
}

/// Parses the stdout of a finished command as JSON.
pub fn stdout_json(output: &std::process::Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).expect("Invalid JSON")
}
