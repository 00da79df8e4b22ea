//! CLI argument definitions for acadash.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::lang::Language;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("ACADASH_GIT_COMMIT"),
    ", built ",
    env!("ACADASH_BUILD_TIMESTAMP"),
    ")"
);

/// acadash - An academic dashboard over a folder of markdown notes.
///
/// Start with `acadash show` to see the courses of the configured academic year.
#[derive(Parser, Debug)]
#[command(name = "acadash")]
#[command(author, version, long_version = LONG_VERSION, about = "Semester dashboard for a vault of course notes", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Vault directory (defaults to the current directory).
    /// Can also be set via ACADASH_VAULT environment variable.
    #[arg(short = 'C', long = "vault", global = true, env = "ACADASH_VAULT")]
    pub vault_path: Option<PathBuf>,

    /// Read configuration from this file instead of the user and vault configs
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Academic year to show (overrides the configured one)
    #[arg(long, global = true)]
    pub year: Option<String>,

    /// Display language: fr or en
    #[arg(long, global = true)]
    pub lang: Option<Language>,

    /// Compute progress as of this date (YYYY-MM-DD) instead of today
    #[arg(long, global = true)]
    pub today: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the dashboard once and print it
    Show {
        /// Include the refresh pass report
        #[arg(long)]
        report: bool,
    },

    /// Print the dashboard, then again after every change in the vault
    Watch {
        /// Quiet period before refreshing, in milliseconds (overrides config)
        #[arg(long)]
        delay_ms: Option<u64>,
    },

    /// Show metrics and tasks of one note
    Doc {
        /// Path of the note, relative to the vault
        path: String,
    },

    /// Compute progress through a date window
    Progress {
        /// Window start (YYYY-MM-DD)
        start: String,
        /// Window end (YYYY-MM-DD)
        end: String,
        /// Use the compact label form
        #[arg(long)]
        mini: bool,
    },

    /// Configuration commands
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the resolved configuration and where each value comes from
    Show,

    /// Write a config file with every default value
    Init {
        /// Write the user config instead of the vault config
        #[arg(long)]
        user: bool,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
