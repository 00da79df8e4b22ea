//! Command implementations for the acadash CLI.
//!
//! This module contains the logic behind each CLI command:
//! - `show` / `watch` - Build and print the dashboard
//! - `doc` - Metrics of a single note
//! - `progress` - Progress through an ad-hoc date window
//! - `config` - Inspect and initialize configuration

mod config;
mod dashboard;
mod doc;
mod progress;

pub use config::{ConfigInitResult, ConfigShowResult, config_init, config_show};
pub use dashboard::{ShowResult, show, watch};
pub use doc::{DocResult, doc};
pub use progress::{ProgressResult, progress};

use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{ConfigOverrides, ResolvedConfig, resolve_config};
use crate::engine::{Clock, Engine};
use crate::vault::{Corpus, Vault};
use crate::{Error, Result};

/// Command results that can be serialized to JSON or formatted for humans.
pub trait Output {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Everything a command needs to know about where and when it runs.
#[derive(Debug, Clone)]
pub struct Context {
    pub vault_root: PathBuf,
    pub overrides: ConfigOverrides,
    pub clock: Clock,
}

impl Context {
    pub fn new(vault_root: impl Into<PathBuf>) -> Self {
        Self {
            vault_root: vault_root.into(),
            overrides: ConfigOverrides::default(),
            clock: Clock::System,
        }
    }

    pub fn with_overrides(mut self, overrides: ConfigOverrides) -> Self {
        self.overrides = overrides;
        self
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn vault_root(&self) -> &Path {
        &self.vault_root
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn resolve(&self) -> Result<ResolvedConfig> {
        resolve_config(&self.vault_root, &self.overrides)
    }

    /// Opens the vault and builds an engine with the resolved configuration.
    pub fn engine(&self) -> Result<(Engine, ResolvedConfig)> {
        let resolved = self.resolve()?;
        let vault: Arc<dyn Corpus> = Arc::new(Vault::open(&self.vault_root)?);
        let engine = Engine::new(vault, resolved.config.clone()).with_clock(self.clock);
        Ok((engine, resolved))
    }
}

/// Parses a `--today` value into a fixed clock.
pub fn parse_today(value: &str) -> Result<Clock> {
    crate::progress::parse_date(value)
        .map(Clock::Fixed)
        .ok_or_else(|| Error::InvalidInput(format!("invalid date '{}', expected YYYY-MM-DD", value)))
}

fn to_json_string<T: serde::Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
}
