use chrono::NaiveDateTime;
use serde::Serialize;

use super::{Output, to_json_string};
use crate::lang::Language;
use crate::progress::{Progress, TimeWindow, compute_progress};

#[derive(Debug, Clone, Serialize)]
pub struct ProgressResult {
    pub start: String,
    pub end: String,
    pub now: NaiveDateTime,
    pub progress: Progress,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Output for ProgressResult {
    fn to_json(&self) -> String {
        to_json_string(self)
    }

    fn to_human(&self) -> String {
        match (&self.label, self.percent) {
            (Some(label), Some(percent)) => format!("{} ({:.0}%)", label, percent),
            _ => format!("No progress available for {} .. {}", self.start, self.end),
        }
    }
}

/// Progress through the window `start..end` as of `now`.
pub fn progress(
    start: &str,
    end: &str,
    now: NaiveDateTime,
    language: Language,
    mini: bool,
) -> ProgressResult {
    let progress = compute_progress(&TimeWindow::parse(start, end), now);
    ProgressResult {
        start: start.to_string(),
        end: end.to_string(),
        now,
        progress,
        percent: progress.fraction().map(|f| f * 100.0),
        label: progress.label(language, mini),
    }
}
