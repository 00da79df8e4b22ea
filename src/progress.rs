//! Progress through a dated window: not started, in progress or complete.
//!
//! Used for semester windows and for per-document supervision windows.
//! Everything here is a pure function of the window and "now".

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::lang::Language;

const DAY_MS: i64 = 86_400_000;
const WEEK_MS: i64 = 7 * DAY_MS;

/// Parses a date as written in config or frontmatter.
///
/// Accepts `YYYY-MM-DD` (read as midnight) and `YYYY-MM-DDTHH:MM[:SS]`.
pub fn parse_date(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
}

/// A start/end pair. Bounds that failed to parse are `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
}

impl TimeWindow {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn parse(start: &str, end: &str) -> Self {
        Self {
            start: parse_date(start),
            end: parse_date(end),
        }
    }

    /// Both bounds parsed and `end > start`.
    pub fn bounds(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if end > start => Some((start, end)),
            _ => None,
        }
    }
}

/// Phase of a window relative to "now".
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "phase")]
pub enum Progress {
    /// Unparsable or empty window; no bar should be drawn
    Unavailable,
    NotStarted { days: i64 },
    InProgress { weeks: i64, fraction: f64 },
    Complete,
}

/// Where `now` falls in `window`.
pub fn compute_progress(window: &TimeWindow, now: NaiveDateTime) -> Progress {
    let Some((start, end)) = window.bounds() else {
        return Progress::Unavailable;
    };
    if now < start {
        let days = ceil_div((start - now).num_milliseconds(), DAY_MS);
        return Progress::NotStarted { days };
    }
    if now >= end {
        return Progress::Complete;
    }
    let weeks = ceil_div((end - now).num_milliseconds(), WEEK_MS);
    let elapsed = (now - start).num_milliseconds() as f64;
    let total = (end - start).num_milliseconds() as f64;
    Progress::InProgress {
        weeks,
        fraction: (elapsed / total).clamp(0.0, 1.0),
    }
}

fn ceil_div(numerator: i64, denominator: i64) -> i64 {
    (numerator + denominator - 1).div_euclid(denominator)
}

impl Progress {
    pub fn is_available(&self) -> bool {
        !matches!(self, Progress::Unavailable)
    }

    /// Completed share of the window, in `0.0..=1.0`.
    pub fn fraction(&self) -> Option<f64> {
        match self {
            Progress::Unavailable => None,
            Progress::NotStarted { .. } => Some(0.0),
            Progress::InProgress { fraction, .. } => Some(*fraction),
            Progress::Complete => Some(1.0),
        }
    }

    /// Text shown next to the bar. `mini` selects the compact form used for
    /// supervision windows.
    pub fn label(&self, language: Language, mini: bool) -> Option<String> {
        let s = language.strings();
        Some(match *self {
            Progress::Unavailable => return None,
            Progress::NotStarted { days } if mini => format!("{}{}{}", s.starts_in_mini, days, s.days),
            Progress::NotStarted { days } => format!("{} {}{}", s.starts_in, days, s.days),
            Progress::InProgress { weeks, .. } if mini => format!("{}{}", weeks, s.weeks_mini),
            Progress::InProgress { weeks, .. } => format!("{} {}", weeks, s.weeks_left),
            Progress::Complete => s.done.to_string(),
        })
    }
}

/// Whether a semester ending at `end` is still running.
///
/// An empty end means the semester never closes; an unparsable one counts
/// as closed.
pub fn is_active(end: &str, now: NaiveDateTime) -> bool {
    if end.trim().is_empty() {
        return true;
    }
    parse_date(end).is_some_and(|end| now <= end)
}
