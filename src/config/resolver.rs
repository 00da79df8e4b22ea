//! Precedence resolution for the dashboard configuration.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (passed at runtime)
//! 2. Vault config.kdl (`<vault>/.acadash/config.kdl`)
//! 3. User config.kdl (`~/.config/acadash/config.kdl`)
//! 4. Built-in defaults
//!
//! An explicit `--config <path>` replaces both file layers.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use super::schema::{ConfigFile, DashboardConfig};
use crate::lang::Language;
use crate::{Error, Result};

/// Environment variable overriding the user configuration directory.
pub const CONFIG_HOME_ENV: &str = "ACADASH_CONFIG_HOME";

/// Directory inside the vault holding the vault-level config.
pub const VAULT_CONFIG_DIR: &str = ".acadash";

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from CLI flag
    CliFlag,
    /// Value from an explicit `--config` file
    Explicit(PathBuf),
    /// Value from the vault-level config
    Vault,
    /// Value from the user-level config
    User,
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::Explicit(path) => write!(f, "file:{}", path.display()),
            ValueSource::Vault => write!(f, "vault"),
            ValueSource::User => write!(f, "user"),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

/// Values passed on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub config_path: Option<PathBuf>,
    pub academic_year: Option<String>,
    pub language: Option<Language>,
}

impl ConfigOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    pub fn with_academic_year(mut self, year: impl Into<String>) -> Self {
        self.academic_year = Some(year.into());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    fn as_layer(&self) -> ConfigFile {
        ConfigFile {
            academic_year: self.academic_year.clone(),
            language: self.language,
            ..ConfigFile::default()
        }
    }
}

/// The resolved configuration plus where each setting came from.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub config: DashboardConfig,

    /// Source of each setting, keyed by its KDL node name
    pub sources: BTreeMap<&'static str, ValueSource>,

    /// Config files that were read, lowest precedence first
    pub files: Vec<PathBuf>,

    /// Skipped values, prefixed with the file they came from
    pub warnings: Vec<String>,
}

impl ResolvedConfig {
    pub fn source(&self, key: &str) -> &ValueSource {
        self.sources.get(key).unwrap_or(&ValueSource::Default)
    }
}

/// Path of the vault-level config file.
pub fn vault_config_path(vault_root: &Path) -> PathBuf {
    vault_root.join(VAULT_CONFIG_DIR).join("config.kdl")
}

/// Path of the user-level config file, if a config directory is known.
pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var(CONFIG_HOME_ENV)
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir).join("config.kdl"));
    }
    dirs::config_dir().map(|d| d.join("acadash").join("config.kdl"))
}

/// Read one layer. A missing file is an empty layer.
pub fn read_layer(path: &Path) -> Result<Option<ConfigFile>> {
    match std::fs::read_to_string(path) {
        Ok(content) => ConfigFile::parse(&content)
            .map(Some)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::Config(format!("{} not readable: {}", path.display(), e))),
    }
}

/// Resolve configuration with full precedence chain.
pub fn resolve_config(vault_root: &Path, overrides: &ConfigOverrides) -> Result<ResolvedConfig> {
    let mut layers: Vec<(PathBuf, ValueSource)> = Vec::new();
    match overrides.config_path {
        Some(ref path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "config file does not exist: {}",
                    path.display()
                )));
            }
            layers.push((path.clone(), ValueSource::Explicit(path.clone())));
        }
        None => {
            if let Some(path) = user_config_path() {
                layers.push((path, ValueSource::User));
            }
            layers.push((vault_config_path(vault_root), ValueSource::Vault));
        }
    }

    let mut result = ResolvedConfig {
        config: DashboardConfig::default(),
        sources: BTreeMap::new(),
        files: Vec::new(),
        warnings: Vec::new(),
    };

    for (path, source) in layers {
        let Some(layer) = read_layer(&path)? else {
            debug!("No config at {}", path.display());
            continue;
        };
        debug!("Loaded config layer {} ({})", path.display(), source);
        for warning in &layer.warnings {
            warn!("{}: {}", path.display(), warning);
            result
                .warnings
                .push(format!("{}: {}", path.display(), warning));
        }
        apply_layer(&mut result, &layer, source);
        result.files.push(path);
    }

    apply_layer(&mut result, &overrides.as_layer(), ValueSource::CliFlag);

    Ok(result)
}

fn apply_layer(result: &mut ResolvedConfig, layer: &ConfigFile, source: ValueSource) {
    result.config.apply(layer);
    for key in layer_keys(layer) {
        result.sources.insert(key, source.clone());
    }
}

/// Node names of the settings a layer sets.
fn layer_keys(layer: &ConfigFile) -> Vec<&'static str> {
    let mut keys = Vec::new();
    let mut mark = |set: bool, key: &'static str| {
        if set {
            keys.push(key);
        }
    };
    mark(layer.language.is_some(), "language");
    mark(layer.dashboard_title.is_some(), "dashboard-title");
    mark(layer.academic_year.is_some(), "academic-year");
    mark(layer.year_property.is_some(), "year-property");
    mark(layer.semester_property.is_some(), "semester-property");
    mark(layer.unit_property.is_some(), "unit-property");
    mark(layer.volume_property.is_some(), "volume-property");
    mark(
        layer.evaluation_type_property.is_some(),
        "evaluation-type-property",
    );
    mark(layer.session_1_property.is_some(), "session-1-property");
    mark(layer.session_2_property.is_some(), "session-2-property");
    mark(
        layer.supervision_start_property.is_some(),
        "supervision-start-property",
    );
    mark(
        layer.supervision_end_property.is_some(),
        "supervision-end-property",
    );
    mark(layer.excluded_folders.is_some(), "excluded-folders");
    mark(layer.pomodoro_minutes.is_some(), "pomodoro-minutes");
    mark(layer.semester_labels.is_some(), "semester-labels");
    mark(layer.semester_1.is_some(), "semester-1");
    mark(layer.semester_2.is_some(), "semester-2");
    mark(layer.evaluation_colors.is_some(), "evaluation-colors");
    mark(layer.refresh_delay_ms.is_some(), "refresh-delay-ms");
    keys
}
