//! Presentation snapshot produced by a refresh pass.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::view::{Bucket, BucketView, SubGroup, SubGroupKey};
use super::{Document, DocumentId, Metrics, TaskEntry};
use crate::config::DashboardConfig;
use crate::lang::Language;
use crate::progress::{self, Progress, TimeWindow};

/// A progress bar ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressBar {
    #[serde(flatten)]
    pub progress: Progress,
    /// Completed share in percent, `0.0..=100.0`
    pub percent: f64,
    pub label: String,
}

impl ProgressBar {
    /// `None` for an unavailable window, which must not be drawn.
    pub fn new(progress: Progress, language: Language, mini: bool) -> Option<Self> {
        let fraction = progress.fraction()?;
        Some(Self {
            progress,
            percent: fraction * 100.0,
            label: progress.label(language, mini)?,
        })
    }
}

/// One task line as displayed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRow {
    pub line: usize,
    /// Text without checkbox or annotation markup
    pub text: String,
    /// Indentation in columns (tab = 4, space = 1)
    pub indent: usize,
    pub checked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<u32>,
}

impl From<&TaskEntry> for TaskRow {
    fn from(task: &TaskEntry) -> Self {
        Self {
            line: task.line,
            text: task.display_text(),
            indent: task.indent_width(),
            checked: task.checked,
            annotation: task.annotation,
        }
    }
}

/// Exam session date shown on a card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionDate {
    pub label: String,
    pub date: NaiveDate,
    pub display: String,
}

/// Everything shown for one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentCard {
    pub id: DocumentId,
    pub title: String,

    /// False when the document could not be read; effort and tasks are empty
    pub metrics_available: bool,
    pub effort_total: u32,
    pub effort_done: u32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_color: Option<String>,

    pub sessions: Vec<SessionDate>,

    /// Compact progress through the supervision window
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supervision: Option<ProgressBar>,

    /// Every task is checked; the task list is shown collapsed
    pub all_tasks_done: bool,
    pub tasks: Vec<TaskRow>,
}

impl DocumentCard {
    pub fn build(
        doc: &Document,
        metrics: Option<&Metrics>,
        config: &DashboardConfig,
        now: NaiveDateTime,
    ) -> Self {
        let props = &config.properties;
        let meta = &doc.metadata;
        let language = config.language;

        let evaluation_type = meta
            .normalized(&props.evaluation_type)
            .first()
            .filter(|s| !s.is_empty())
            .map(str::to_string);
        let evaluation_color = evaluation_type
            .as_deref()
            .and_then(|t| config.evaluation_color(t))
            .map(str::to_string);

        let sessions = [("S1", &props.session_1), ("S2", &props.session_2)]
            .into_iter()
            .filter_map(|(label, key)| {
                let date = meta.get(key).first().and_then(progress::parse_date)?.date();
                Some(SessionDate {
                    label: label.to_string(),
                    date,
                    display: language.format_date(date),
                })
            })
            .collect();

        let supervision = match (
            meta.get(&props.supervision_start).first(),
            meta.get(&props.supervision_end).first(),
        ) {
            (Some(start), Some(end)) => {
                let window = TimeWindow::parse(start, end);
                ProgressBar::new(progress::compute_progress(&window, now), language, true)
            }
            _ => None,
        };

        Self {
            id: doc.id.clone(),
            title: doc.id.title().to_string(),
            metrics_available: metrics.is_some(),
            effort_total: metrics.map_or(0, |m| m.effort_total),
            effort_done: metrics.map_or(0, |m| m.effort_done),
            evaluation_type,
            evaluation_color,
            sessions,
            supervision,
            all_tasks_done: metrics.is_some_and(Metrics::all_tasks_done),
            tasks: metrics
                .map(|m| m.tasks.iter().map(TaskRow::from).collect())
                .unwrap_or_default(),
        }
    }

    pub fn has_effort(&self) -> bool {
        self.effort_total > 0 || self.effort_done > 0
    }
}

/// A teaching-unit group inside a bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSection {
    pub key: SubGroupKey,
    pub label: String,
    pub effort_total: u32,
    pub effort_done: u32,
    /// False when this is the only group of its bucket and it is `Other`
    pub show_header: bool,
    pub documents: Vec<DocumentCard>,
}

impl GroupSection {
    pub fn new(group: &SubGroup, label: &str, show_header: bool, documents: Vec<DocumentCard>) -> Self {
        Self {
            key: group.key.clone(),
            label: label.to_string(),
            effort_total: group.effort_total,
            effort_done: group.effort_done,
            show_header,
            documents,
        }
    }

    /// Header text, with the effort counter when there is any effort.
    pub fn header(&self) -> String {
        if self.effort_total > 0 || self.effort_done > 0 {
            format!("{} (🍅 {}/{})", self.label, self.effort_done, self.effort_total)
        } else {
            self.label.clone()
        }
    }
}

/// One semester (or the unassigned bucket) as displayed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketSection {
    pub bucket: Bucket,
    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<ProgressBar>,

    /// "Ends on" label, when the window has a parsable end
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ends: Option<String>,

    /// Shown expanded: the semester is still running, or this is the
    /// unassigned bucket
    pub open: bool,

    /// Message shown instead of groups when the bucket is empty
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,

    pub groups: Vec<GroupSection>,
}

impl BucketSection {
    pub fn new(
        view: &BucketView,
        config: &DashboardConfig,
        now: NaiveDateTime,
        groups: Vec<GroupSection>,
    ) -> Self {
        let language = config.language;
        let strings = language.strings();
        let window = match view.bucket {
            Bucket::Semester1 => Some(&config.semester_1),
            Bucket::Semester2 => Some(&config.semester_2),
            Bucket::Unassigned => None,
        };

        let (progress, ends, open) = match window {
            Some(spec) if !spec.end.trim().is_empty() => (
                ProgressBar::new(
                    progress::compute_progress(&spec.window(), now),
                    language,
                    false,
                ),
                progress::parse_date(&spec.end)
                    .map(|end| format!("{} {}", strings.ends, language.format_date(end.date()))),
                progress::is_active(&spec.end, now),
            ),
            _ => (None, None, true),
        };

        Self {
            bucket: view.bucket,
            title: language.bucket_title(view.bucket).to_string(),
            progress,
            ends,
            open,
            empty_message: view
                .is_empty()
                .then(|| strings.no_courses.to_string()),
            groups,
        }
    }

    pub fn document_count(&self) -> usize {
        self.groups.iter().map(|g| g.documents.len()).sum()
    }
}

/// The dashboard as of one refresh pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub title: String,
    pub academic_year: String,
    pub language: Language,
    pub generated_at: NaiveDateTime,

    /// Set when no document matches the academic year
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,

    pub buckets: Vec<BucketSection>,
}

impl Dashboard {
    pub fn document_count(&self) -> usize {
        self.buckets.iter().map(BucketSection::document_count).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.empty_message.is_some()
    }

    /// Finds the card for `id`.
    pub fn card(&self, id: &DocumentId) -> Option<&DocumentCard> {
        self.buckets
            .iter()
            .flat_map(|b| &b.groups)
            .flat_map(|g| &g.documents)
            .find(|c| &c.id == id)
    }
}
