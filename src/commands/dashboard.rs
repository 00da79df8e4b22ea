use serde::Serialize;
use std::fmt::Write as _;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use super::{Context, Output, to_json_string};
use crate::Result;
use crate::engine::{PassReport, Snapshot};
use crate::models::dashboard::{BucketSection, Dashboard, DocumentCard, ProgressBar, TaskRow};
use crate::runner::RefreshRunner;
use crate::watcher;

const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Serialize)]
pub struct ShowResult {
    pub dashboard: Dashboard,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<PassReport>,
}

impl ShowResult {
    fn from_snapshot(snapshot: &Snapshot, with_report: bool) -> Self {
        Self {
            dashboard: snapshot.dashboard.clone(),
            report: with_report.then(|| snapshot.report.clone()),
        }
    }
}

impl Output for ShowResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let mut out = render_dashboard(&self.dashboard);
        if let Some(ref report) = self.report {
            let _ = write!(
                out,
                "\n{} notes, {} selected, {} cached, {} read, {} skipped ({}ms)",
                report.documents,
                report.selected,
                report.hits,
                report.misses,
                report.skipped.len(),
                report.elapsed_ms
            );
            for skipped in &report.skipped {
                let _ = write!(out, "\n  skipped {}: {}", skipped.id, skipped.error);
            }
        }
        out
    }
}

/// Builds the dashboard once.
pub fn show(ctx: &Context, with_report: bool) -> Result<ShowResult> {
    let (engine, _) = ctx.engine()?;
    let snapshot = engine.refresh()?;
    Ok(ShowResult::from_snapshot(&snapshot, with_report))
}

/// Prints the dashboard, then a fresh one after every change, until
/// `shutdown` completes.
///
/// A failed pass is reported once through `notice` and the previous
/// dashboard stays current.
pub async fn watch<E, N, S>(
    ctx: &Context,
    delay_ms: Option<u64>,
    emit: E,
    notice: N,
    shutdown: S,
) -> Result<()>
where
    E: Fn(&ShowResult),
    N: Fn(&str),
    S: Future<Output = ()>,
{
    let (engine, resolved) = ctx.engine()?;
    let engine = Arc::new(engine);

    let initial = {
        let engine = Arc::clone(&engine);
        tokio::task::spawn_blocking(move || engine.refresh())
            .await
            .map_err(|e| crate::Error::Other(e.to_string()))??
    };
    emit(&ShowResult::from_snapshot(&initial, false));

    let delay = Duration::from_millis(delay_ms.unwrap_or(resolved.config.refresh_delay_ms));
    let runner = RefreshRunner::spawn(Arc::clone(&engine), delay);
    let mut state_rx = runner.subscribe();

    let mut config_files = resolved.files.clone();
    match ctx.overrides.config_path {
        Some(ref path) => config_files.push(path.clone()),
        None => {
            config_files.push(crate::config::vault_config_path(ctx.vault_root()));
            if let Some(path) = crate::config::user_config_path() {
                config_files.push(path);
            }
        }
    }
    config_files.sort();
    config_files.dedup();

    let printer = async {
        while state_rx.changed().await.is_ok() {
            let state = state_rx.borrow_and_update().clone();
            match (state.error, state.snapshot) {
                (Some(error), _) => notice(&format!("Refresh failed, showing the last dashboard: {}", error)),
                (None, Some(snapshot)) => emit(&ShowResult::from_snapshot(&snapshot, false)),
                (None, None) => {}
            }
        }
    };

    let reload = || ctx.resolve().map(|r| r.config);
    let watching = watcher::watch_vault(
        ctx.vault_root(),
        config_files,
        Arc::clone(&engine),
        &runner,
        reload,
        shutdown,
    );

    let result = tokio::select! {
        result = watching => result,
        _ = printer => Ok(()),
    };
    runner.shutdown().await;
    info!("Stopped watching {}", ctx.vault_root().display());
    result
}

fn render_bar(bar: &ProgressBar) -> String {
    let filled = ((bar.percent / 100.0) * BAR_WIDTH as f64).round() as usize;
    let filled = filled.min(BAR_WIDTH);
    format!(
        "[{}{}] {}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        bar.label
    )
}

pub(crate) fn render_dashboard(dashboard: &Dashboard) -> String {
    let mut out = format!("{} ({})\n", dashboard.title, dashboard.academic_year);
    if let Some(ref message) = dashboard.empty_message {
        let _ = write!(out, "\n{}", message);
        return out;
    }
    for bucket in &dashboard.buckets {
        out.push('\n');
        render_bucket(&mut out, bucket, dashboard);
    }
    out.trim_end().to_string()
}

fn render_bucket(out: &mut String, bucket: &BucketSection, dashboard: &Dashboard) {
    let marker = if bucket.open { "▾" } else { "▸" };
    let _ = write!(out, "{} {}", marker, bucket.title);
    if let Some(ref progress) = bucket.progress {
        let _ = write!(out, "  {}", render_bar(progress));
    }
    if let Some(ref ends) = bucket.ends {
        let _ = write!(out, "  ({})", ends);
    }
    if !bucket.open {
        let _ = writeln!(out, "  [{}]", bucket.document_count());
        return;
    }
    out.push('\n');

    if let Some(ref message) = bucket.empty_message {
        let _ = writeln!(out, "  {}", message);
        return;
    }
    for group in &bucket.groups {
        let indent = if group.show_header {
            let _ = writeln!(out, "  {}", group.header());
            "    "
        } else {
            "  "
        };
        for card in &group.documents {
            render_card(out, card, indent, dashboard);
        }
    }
}

fn render_card(out: &mut String, card: &DocumentCard, indent: &str, dashboard: &Dashboard) {
    let _ = write!(out, "{}- {}", indent, card.title);
    if let Some(ref supervision) = card.supervision {
        let _ = write!(out, "  {}", supervision.label);
    }
    if card.has_effort() {
        let _ = write!(out, "  🍅 {}/{}", card.effort_done, card.effort_total);
    }
    if let Some(ref evaluation) = card.evaluation_type {
        let _ = write!(out, "  [{}]", evaluation);
    }
    for session in &card.sessions {
        let _ = write!(out, "  {}: {}", session.label, session.display);
    }
    out.push('\n');

    if card.all_tasks_done {
        let strings = dashboard.language.strings();
        let _ = writeln!(out, "{}    ✓ {}", indent, strings.all_tasks_done);
        return;
    }
    for task in &card.tasks {
        render_task(out, task, indent);
    }
}

fn render_task(out: &mut String, task: &TaskRow, indent: &str) {
    let check = if task.checked { "[x]" } else { "[ ]" };
    let nested = " ".repeat(task.indent);
    let _ = write!(out, "{}    {}{} {}", indent, nested, check, task.text);
    if let Some(units) = task.annotation {
        let _ = write!(out, "  🍅 {}", units);
    }
    out.push('\n');
}
