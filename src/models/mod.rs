//! Data models for acadash.
//!
//! This module defines the core data structures:
//! - `DocumentId` - Vault-relative path identifying a note
//! - `MetaValue` / `Metadata` - Frontmatter values as absent, scalar or list
//! - `ListItem` - Position and task state of a list item, as reported by the corpus
//! - `Document` - One note as listed by the corpus
//! - `TaskEntry` / `Metrics` - Derived per-document state owned by the cache
//!
//! The grouped projection lives in [`view`], the presentation snapshot in
//! [`dashboard`].

pub mod dashboard;
pub mod view;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::annotation;

/// Modification timestamp in milliseconds since the UNIX epoch.
pub type Mtime = i64;

/// Identity of a document: its path relative to the vault root, with `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into().replace('\\', "/"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Title shown for the document: the file name without its extension.
    pub fn title(&self) -> &str {
        let name = self.0.rsplit('/').next().unwrap_or(&self.0);
        match name.rfind('.') {
            Some(dot) if dot > 0 => &name[..dot],
            _ => name,
        }
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(path: &str) -> Self {
        Self::new(path)
    }
}

/// A frontmatter value.
///
/// Numbers and booleans are kept in their textual form; nested mappings are
/// not meaningful to the dashboard and are read as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
    #[default]
    Absent,
    Scalar(String),
    List(Vec<String>),
}

impl MetaValue {
    pub fn is_absent(&self) -> bool {
        match self {
            MetaValue::Absent => true,
            MetaValue::Scalar(s) => s.is_empty(),
            MetaValue::List(items) => items.is_empty(),
        }
    }

    /// All values in declaration order (a scalar yields one value).
    pub fn values(&self) -> impl Iterator<Item = &str> {
        let items: &[String] = match self {
            MetaValue::Absent => &[],
            MetaValue::Scalar(s) => std::slice::from_ref(s),
            MetaValue::List(items) => items,
        };
        items.iter().map(String::as_str)
    }

    /// The first value, if any.
    pub fn first(&self) -> Option<&str> {
        self.values().next()
    }

    /// Applies [`normalize_text`] to every value.
    pub fn normalized(&self) -> MetaValue {
        match self {
            MetaValue::Absent => MetaValue::Absent,
            MetaValue::Scalar(s) => MetaValue::Scalar(normalize_text(s)),
            MetaValue::List(items) => {
                MetaValue::List(items.iter().map(|s| normalize_text(s)).collect())
            }
        }
    }
}

/// Strips link decoration from a metadata value.
///
/// `[[Target|Shown]]` becomes `Shown`, `[[Target]]` becomes `Target`.
pub fn normalize_text(value: &str) -> String {
    let cleaned = value.replace("[[", "").replace("]]", "");
    match cleaned.rsplit_once('|') {
        Some((_, shown)) => shown.trim().to_string(),
        None => cleaned.trim().to_string(),
    }
}

/// Parsed frontmatter of one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    values: BTreeMap<String, MetaValue>,
}

static ABSENT: MetaValue = MetaValue::Absent;

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: MetaValue) {
        self.values.insert(key.into(), value);
    }

    /// Raw value for `key`; missing keys (and an empty key name) read as absent.
    pub fn get(&self, key: &str) -> &MetaValue {
        if key.is_empty() {
            return &ABSENT;
        }
        self.values.get(key).unwrap_or(&ABSENT)
    }

    /// Normalized value for `key`.
    pub fn normalized(&self, key: &str) -> MetaValue {
        self.get(key).normalized()
    }

    pub fn contains(&self, key: &str) -> bool {
        !self.get(key).is_absent()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// A list item reported by the corpus.
///
/// `task` is the character between the checkbox brackets, `None` for plain
/// list items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListItem {
    pub line: usize,
    pub task: Option<char>,
}

impl ListItem {
    pub fn is_task(&self) -> bool {
        self.task.is_some()
    }
}

/// One note as listed by the corpus.
#[derive(Debug, Clone)]
pub struct Document {
    pub id: DocumentId,
    pub mtime: Mtime,
    pub metadata: Arc<Metadata>,
    pub list_items: Arc<Vec<ListItem>>,
}

impl Document {
    pub fn new(
        id: impl Into<DocumentId>,
        mtime: Mtime,
        metadata: Metadata,
        list_items: Vec<ListItem>,
    ) -> Self {
        Self {
            id: id.into(),
            mtime,
            metadata: Arc::new(metadata),
            list_items: Arc::new(list_items),
        }
    }
}

/// A task line derived from a document's raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskEntry {
    /// Zero-based line number in the document
    pub line: usize,

    /// The full source line, indentation included
    pub text: String,

    pub checked: bool,

    /// Effort units recorded by an inline `[🍅:: N]` annotation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<u32>,
}

impl TaskEntry {
    /// Task text without checkbox or annotation markup.
    pub fn display_text(&self) -> String {
        annotation::strip_display_noise(&self.text)
    }

    /// Indentation width in columns: tabs count 4, spaces count 1.
    pub fn indent_width(&self) -> usize {
        self.text
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| if c == '\t' { 4 } else { 1 })
            .sum()
    }
}

/// Derived state of one document, rebuilt wholesale whenever it is stale.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Declared workload in effort units (0 when no workload is declared)
    pub effort_total: u32,

    /// Sum of annotations across task lines
    pub effort_done: u32,

    pub tasks: Vec<TaskEntry>,
}

impl Metrics {
    /// Whether the effort counter should be shown at all.
    pub fn has_effort(&self) -> bool {
        self.effort_total > 0 || self.effort_done > 0
    }

    /// True when there is at least one task and every task is checked.
    pub fn all_tasks_done(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(|t| t.checked)
    }
}
