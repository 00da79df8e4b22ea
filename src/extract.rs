//! Per-document metric extraction.
//!
//! Turns one document's raw text and frontmatter into a [`Metrics`] record:
//! the declared workload expressed in effort units, the sum of the inline
//! annotations on task lines, and the task lines themselves.

use regex::Regex;
use std::sync::LazyLock;

use crate::annotation;
use crate::config::DashboardConfig;
use crate::models::{Document, MetaValue, Metrics, TaskEntry};
use crate::{Error, Result};

static LEADING_NUMBER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?").expect("valid number regex")
});

/// Builds the metrics record for `doc` from its raw `text`.
///
/// Fails when a task position reported by the corpus is outside the text,
/// which means the listing and the content are out of sync.
pub fn extract(doc: &Document, text: &str, config: &DashboardConfig) -> Result<Metrics> {
    let hours = declared_hours(doc.metadata.get(&config.properties.volume));
    let effort_total = effort_units(hours, config.pomodoro_minutes);

    let lines: Vec<&str> = text.split('\n').collect();
    let mut tasks = Vec::new();
    let mut effort_done: u32 = 0;

    for item in doc.list_items.iter() {
        let Some(state) = item.task else {
            continue;
        };
        let line = lines.get(item.line).ok_or_else(|| {
            Error::InvalidInput(format!(
                "{}: task on line {} but the document has {} lines",
                doc.id,
                item.line + 1,
                lines.len()
            ))
        })?;
        let line = line.trim_end_matches('\r');
        let effort = annotation::extract_effort(line);
        if let Some(units) = effort {
            effort_done = effort_done.saturating_add(units);
        }
        tasks.push(TaskEntry {
            line: item.line,
            text: line.to_string(),
            checked: state != ' ',
            annotation: effort,
        });
    }

    Ok(Metrics {
        effort_total,
        effort_done,
        tasks,
    })
}

/// Hours declared by a volume value. Absent or non-numeric values read as 0.
///
/// Only the leading number is read, so `"3.5h"` is 3.5 hours. A list uses its
/// first element.
pub fn declared_hours(value: &MetaValue) -> f64 {
    value
        .first()
        .and_then(|s| LEADING_NUMBER.find(s))
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .filter(|h| h.is_finite())
        .unwrap_or(0.0)
}

/// Number of `unit_minutes` blocks needed to cover `hours`, rounded up.
///
/// Zero or negative hours give 0, which downstream means "not shown".
pub fn effort_units(hours: f64, unit_minutes: u32) -> u32 {
    if hours <= 0.0 || unit_minutes == 0 {
        return 0;
    }
    let units = (hours * 60.0 / unit_minutes as f64).ceil();
    if units >= u32::MAX as f64 {
        u32::MAX
    } else {
        units as u32
    }
}
