use serde::Serialize;
use std::fmt::Write as _;

use super::{Context, Output, to_json_string};
use crate::Result;
use crate::models::DocumentId;
use crate::models::dashboard::DocumentCard;

#[derive(Debug, Clone, Serialize)]
pub struct DocResult {
    #[serde(flatten)]
    pub card: DocumentCard,
}

impl Output for DocResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        let card = &self.card;
        let mut out = format!("{} ({})", card.title, card.id);
        if card.has_effort() {
            let _ = write!(out, "\n  effort: 🍅 {}/{}", card.effort_done, card.effort_total);
        }
        if let Some(ref evaluation) = card.evaluation_type {
            let _ = write!(out, "\n  evaluation: {}", evaluation);
            if let Some(ref color) = card.evaluation_color {
                let _ = write!(out, " ({})", color);
            }
        }
        for session in &card.sessions {
            let _ = write!(out, "\n  {}: {}", session.label, session.display);
        }
        if let Some(ref supervision) = card.supervision {
            let _ = write!(
                out,
                "\n  supervision: {} ({:.0}%)",
                supervision.label, supervision.percent
            );
        }
        if card.tasks.is_empty() {
            out.push_str("\n  no tasks");
        }
        for task in &card.tasks {
            let check = if task.checked { "x" } else { " " };
            let _ = write!(
                out,
                "\n  {:>4}: {}[{}] {}",
                task.line + 1,
                " ".repeat(task.indent),
                check,
                task.text
            );
            if let Some(units) = task.annotation {
                let _ = write!(out, "  🍅 {}", units);
            }
        }
        out
    }
}

/// Metrics and tasks of the note at `path` (relative to the vault).
pub fn doc(ctx: &Context, path: &str) -> Result<DocResult> {
    let (engine, _) = ctx.engine()?;
    let id = DocumentId::new(path.trim_start_matches("./"));
    let card = engine.inspect(&id)?;
    Ok(DocResult { card })
}
