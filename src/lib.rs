//! acadash - An academic dashboard over a folder of markdown notes.
//!
//! This library provides the core functionality for the `acadash` CLI tool:
//! an incremental metrics cache keyed by document modification time, the
//! per-document metric extractor, the academic-year filter, the
//! semester/teaching-unit aggregator and the progress calculator used to
//! render semester and supervision windows.

pub mod aggregate;
pub mod annotation;
pub mod cache;
pub mod cli;
pub mod commands;
pub mod config;
pub mod engine;
pub mod extract;
pub mod filter;
pub mod lang;
pub mod models;
pub mod progress;
pub mod runner;
pub mod vault;
pub mod watcher;


/// Library-level error type for acadash operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Frontmatter error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Document not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Watcher error: {0}")]
    Watch(#[from] notify::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for acadash operations.
pub type Result<T> = std::result::Result<T, Error>;
