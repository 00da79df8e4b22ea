//! Configuration for acadash.
//!
//! ## config.kdl
//!
//! Located at:
//! - User: `~/.config/acadash/config.kdl` (or `$ACADASH_CONFIG_HOME/config.kdl`)
//! - Vault: `<vault>/.acadash/config.kdl`
//!
//! Contains the academic year to show, the frontmatter property names, the
//! semester windows, the effort unit size and display preferences. See
//! [`schema::ConfigFile`] for the full node list.
//!
//! ## Precedence
//!
//! CLI flag > vault config > user config > defaults
//!
//! Use the [`resolver`] module for unified precedence resolution.

pub mod resolver;
pub mod schema;

pub use resolver::{
    ConfigOverrides, ResolvedConfig, ValueSource, resolve_config, user_config_path,
    vault_config_path,
};
pub use schema::{ConfigFile, DashboardConfig, EvaluationColor, PropertyNames, WindowSpec};
