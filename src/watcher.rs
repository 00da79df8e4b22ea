//! File system watcher turning vault changes into refresh triggers.
//!
//! Debouncing is left to the [`RefreshRunner`]; this module only decides
//! which events matter. Changes to a config file reload the configuration
//! before the refresh is requested.

use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::future::Future;
use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::Result;
use crate::config::DashboardConfig;
use crate::engine::Engine;
use crate::runner::RefreshRunner;

/// What a changed path means for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// A note (or a folder of notes) was created, modified or removed
    Note,
    /// One of the loaded config files changed
    Config,
}

/// Classifies `path`, or `None` when the change is irrelevant.
pub fn classify(path: &Path, vault_root: &Path, config_files: &[PathBuf]) -> Option<Change> {
    if config_files.iter().any(|c| c == path) {
        return Some(Change::Config);
    }
    let relative = path.strip_prefix(vault_root).ok()?;
    let hidden = relative.components().any(|c| match c {
        Component::Normal(name) => name.to_string_lossy().starts_with('.'),
        _ => false,
    });
    if hidden {
        return None;
    }
    match path.extension() {
        Some(ext) if ext == "md" => Some(Change::Note),
        // folders being renamed or removed
        None => Some(Change::Note),
        Some(_) => None,
    }
}

/// Watches `vault_root` until `shutdown` completes.
///
/// `reload` re-resolves the configuration when a file in `config_files`
/// changes. A failed reload keeps the current configuration.
pub async fn watch_vault<F, S>(
    vault_root: &Path,
    config_files: Vec<PathBuf>,
    engine: Arc<Engine>,
    runner: &RefreshRunner,
    reload: F,
    shutdown: S,
) -> Result<()>
where
    F: Fn() -> Result<DashboardConfig>,
    S: Future<Output = ()>,
{
    let (tx, mut rx) = tokio::sync::mpsc::channel(256);

    let mut watcher = RecommendedWatcher::new(
        move |res: std::result::Result<Event, notify::Error>| match res {
            Ok(event) => {
                let _ = tx.blocking_send(event);
            }
            Err(e) => warn!("Watch error: {}", e),
        },
        Config::default(),
    )?;

    watcher.watch(vault_root, RecursiveMode::Recursive)?;
    for file in &config_files {
        if let Some(dir) = file.parent()
            && dir.is_dir()
            && !dir.starts_with(vault_root)
        {
            watcher.watch(dir, RecursiveMode::NonRecursive)?;
        }
    }
    info!("Watching {}", vault_root.display());

    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else { break };
                if !matches!(
                    event.kind,
                    EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
                ) {
                    continue;
                }
                let changes: Vec<Change> = event
                    .paths
                    .iter()
                    .filter_map(|p| classify(p, vault_root, &config_files))
                    .collect();
                if changes.contains(&Change::Config) {
                    match reload() {
                        Ok(config) => {
                            info!("Configuration reloaded");
                            engine.set_config(config);
                        }
                        Err(e) => warn!("Keeping current configuration: {}", e),
                    }
                }
                if !changes.is_empty() {
                    debug!("Change under {:?}, requesting refresh", event.paths);
                    runner.trigger();
                }
            }
            _ = &mut shutdown => break,
        }
    }
    Ok(())
}
