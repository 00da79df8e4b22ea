use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::PathBuf;
use tracing::info;

use super::{Context, Output, to_json_string};
use crate::config::{ConfigFile, DashboardConfig, user_config_path, vault_config_path};
use crate::{Error, Result};

#[derive(Debug, Clone, Serialize)]
pub struct ConfigShowResult {
    pub config: DashboardConfig,
    /// Source of each setting that is not a default
    pub sources: BTreeMap<String, String>,
    pub files: Vec<PathBuf>,
    pub warnings: Vec<String>,
}

impl Output for ConfigShowResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut out = ConfigFile::from_dashboard(&self.config)
            .to_kdl()
            .to_string()
            .trim_end()
            .to_string();
        if self.files.is_empty() {
            out.push_str("\n\n// no config files found, using defaults");
        } else {
            out.push_str("\n\n// files:");
            for file in &self.files {
                let _ = write!(out, "\n//   {}", file.display());
            }
        }
        for (key, source) in &self.sources {
            let _ = write!(out, "\n// {} from {}", key, source);
        }
        for warning in &self.warnings {
            let _ = write!(out, "\n// warning: {}", warning);
        }
        out
    }
}

pub fn config_show(ctx: &Context) -> Result<ConfigShowResult> {
    let resolved = ctx.resolve()?;
    Ok(ConfigShowResult {
        sources: resolved
            .sources
            .iter()
            .map(|(key, source)| (key.to_string(), source.to_string()))
            .collect(),
        config: resolved.config,
        files: resolved.files,
        warnings: resolved.warnings,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ConfigInitResult {
    pub path: PathBuf,
    pub overwritten: bool,
}

impl Output for ConfigInitResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        if self.overwritten {
            format!("Overwrote {}", self.path.display())
        } else {
            format!("Wrote {}", self.path.display())
        }
    }
}

/// Writes a config file holding every default value.
pub fn config_init(ctx: &Context, user: bool, force: bool) -> Result<ConfigInitResult> {
    let path = if user {
        user_config_path()
            .ok_or_else(|| Error::Config("no user configuration directory".to_string()))?
    } else {
        vault_config_path(ctx.vault_root())
    };

    let exists = path.exists();
    if exists && !force {
        return Err(Error::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let content = ConfigFile::from_dashboard(&DashboardConfig::default())
        .to_kdl()
        .to_string();
    std::fs::write(&path, content)?;
    info!("Wrote default configuration to {}", path.display());

    Ok(ConfigInitResult {
        path,
        overwritten: exists,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::resolver::CONFIG_HOME_ENV;
    use serial_test::serial;
    use tempfile::TempDir;

    fn isolated() -> (TempDir, TempDir) {
        let home = TempDir::new().unwrap();
        // SAFETY: tests touching this variable are marked #[serial].
        unsafe {
            std::env::set_var(CONFIG_HOME_ENV, home.path());
        }
        (home, TempDir::new().unwrap())
    }

    #[test]
    #[serial]
    fn test_init_then_show() {
        let (_home, vault) = isolated();
        let ctx = Context::new(vault.path());

        let init = config_init(&ctx, false, false).unwrap();
        assert_eq!(init.path, vault_config_path(vault.path()));
        assert!(!init.overwritten);

        let shown = config_show(&ctx).unwrap();
        assert_eq!(shown.config, DashboardConfig::default());
        assert_eq!(shown.files, vec![init.path.clone()]);
        assert_eq!(shown.sources.get("academic-year").map(String::as_str), Some("vault"));
        assert!(shown.to_human().contains("academic-year \"2025-2026\""));
    }

    #[test]
    #[serial]
    fn test_init_refuses_to_overwrite() {
        let (_home, vault) = isolated();
        let ctx = Context::new(vault.path());
        config_init(&ctx, false, false).unwrap();
        assert!(matches!(
            config_init(&ctx, false, false),
            Err(Error::InvalidInput(_))
        ));
        assert!(config_init(&ctx, false, true).unwrap().overwritten);
    }

    #[test]
    #[serial]
    fn test_init_user_config() {
        let (home, vault) = isolated();
        let ctx = Context::new(vault.path());
        let init = config_init(&ctx, true, false).unwrap();
        assert_eq!(init.path, home.path().join("config.kdl"));
        assert!(init.path.exists());
    }
}
