//! In-memory corpus.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Corpus, markdown};
use crate::models::{Document, DocumentId, Metadata, Mtime};
use crate::{Error, Result};

struct Entry {
    document: Document,
    text: String,
    unreadable: bool,
    reads: AtomicUsize,
}

/// A corpus held in memory, listing documents in insertion order.
///
/// Counts reads per document so callers can observe which documents were
/// actually loaded.
#[derive(Default)]
pub struct MemoryCorpus {
    entries: RwLock<Vec<Entry>>,
}

impl MemoryCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a document. List items are scanned from `text`.
    pub fn upsert(
        &self,
        id: impl Into<DocumentId>,
        mtime: Mtime,
        metadata: Metadata,
        text: impl Into<String>,
    ) {
        let text = text.into();
        let document = Document::new(id, mtime, metadata, markdown::list_items(&text));
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        match entries.iter_mut().find(|e| e.document.id == document.id) {
            Some(entry) => {
                entry.document = document;
                entry.text = text;
            }
            None => entries.push(Entry {
                document,
                text,
                unreadable: false,
                reads: AtomicUsize::new(0),
            }),
        }
    }

    pub fn remove(&self, id: &DocumentId) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|e| &e.document.id != id);
        entries.len() != before
    }

    /// Makes `read_text` fail for `id` while still listing it.
    pub fn set_unreadable(&self, id: &DocumentId, unreadable: bool) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        if let Some(entry) = entries.iter_mut().find(|e| &e.document.id == id) {
            entry.unreadable = unreadable;
        }
    }

    /// Number of times the text of `id` was read.
    pub fn read_count(&self, id: &DocumentId) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .iter()
            .find(|e| &e.document.id == id)
            .map_or(0, |e| e.reads.load(Ordering::SeqCst))
    }

    pub fn total_reads(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.iter().map(|e| e.reads.load(Ordering::SeqCst)).sum()
    }
}

impl Corpus for MemoryCorpus {
    fn documents(&self) -> Result<Vec<Document>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        Ok(entries.iter().map(|e| e.document.clone()).collect())
    }

    fn read_text(&self, id: &DocumentId) -> Result<String> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        let entry = entries
            .iter()
            .find(|e| &e.document.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        entry.reads.fetch_add(1, Ordering::SeqCst);
        if entry.unreadable {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                format!("{} is not readable", id),
            )));
        }
        Ok(entry.text.clone())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::meta;

    #[test]
    fn test_upsert_replaces_in_place() {
        let corpus = MemoryCorpus::new();
        corpus.upsert("a.md", 1, meta(&[]), "- [ ] one");
        corpus.upsert("b.md", 1, meta(&[]), "");
        corpus.upsert("a.md", 2, meta(&[]), "- [x] one\n- [ ] two");

        let docs = corpus.documents().unwrap();
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].id.as_str(), "a.md");
        assert_eq!(docs[0].mtime, 2);
        assert_eq!(docs[0].list_items.len(), 2);
    }

    #[test]
    fn test_read_counter_and_failures() {
        let corpus = MemoryCorpus::new();
        let id = DocumentId::new("a.md");
        corpus.upsert(id.clone(), 1, meta(&[]), "text");
        assert_eq!(corpus.read_text(&id).unwrap(), "text");
        corpus.set_unreadable(&id, true);
        assert!(corpus.read_text(&id).is_err());
        assert_eq!(corpus.read_count(&id), 2);
        assert!(matches!(
            corpus.read_text(&DocumentId::new("missing.md")),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_remove() {
        let corpus = MemoryCorpus::new();
        corpus.upsert("a.md", 1, meta(&[]), "");
        assert!(corpus.remove(&DocumentId::new("a.md")));
        assert!(!corpus.remove(&DocumentId::new("a.md")));
        assert!(corpus.documents().unwrap().is_empty());
    }
}
