//! Document corpus sources.
//!
//! This module provides the [`Corpus`] trait and its implementations:
//! - `Vault` - A directory of markdown notes on disk
//! - `MemoryCorpus` - Documents held in memory

pub mod markdown;
mod memory;

pub use memory::MemoryCorpus;

use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::UNIX_EPOCH;
use tracing::{debug, warn};

use crate::models::{Document, DocumentId, Mtime};
use crate::{Error, Result};

/// Source of documents for the dashboard.
///
/// Listing is expected to be cheap: it supplies identity, modification time,
/// parsed frontmatter and list item positions. Raw text is only fetched
/// through `read_text`, for documents whose cached metrics are stale.
pub trait Corpus: Send + Sync {
    /// List every document, in a stable order.
    fn documents(&self) -> Result<Vec<Document>>;

    /// Read the raw text of one document.
    fn read_text(&self, id: &DocumentId) -> Result<String>;

    /// Human-readable location of the corpus.
    fn describe(&self) -> String;
}

/// A directory of markdown notes.
///
/// Keeps an index of parsed notes keyed by modification time, so listing
/// only re-parses files that changed since the previous listing.
pub struct Vault {
    root: PathBuf,
    index: Mutex<HashMap<DocumentId, Document>>,
}

impl Vault {
    /// Open a vault rooted at `root`.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.is_dir() {
            return Err(Error::NotFound(format!(
                "vault directory {}",
                root.display()
            )));
        }
        Ok(Self {
            root,
            index: Mutex::new(HashMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Identity of the note at `path`, if it lies inside the vault.
    pub fn document_id(&self, path: &Path) -> Option<DocumentId> {
        let relative = path.strip_prefix(&self.root).ok()?;
        Some(DocumentId::new(relative.to_string_lossy()))
    }

    fn markdown_files(&self) -> Vec<(PathBuf, Mtime)> {
        ignore::WalkBuilder::new(&self.root)
            .hidden(true)
            .git_ignore(false)
            .git_global(false)
            .git_exclude(false)
            .parents(false)
            .build()
            .filter_map(|entry| entry.ok())
            .filter(|entry| {
                entry.file_type().is_some_and(|t| t.is_file())
                    && entry.path().extension().is_some_and(|ext| ext == "md")
            })
            .filter_map(|entry| {
                let mtime = entry.metadata().ok().and_then(|m| m.modified().ok())?;
                let millis = mtime.duration_since(UNIX_EPOCH).ok()?.as_millis();
                Some((entry.into_path(), millis as Mtime))
            })
            .collect()
    }

    fn load(&self, path: &Path, id: DocumentId, mtime: Mtime) -> Result<Document> {
        let text = std::fs::read_to_string(path)?;
        let metadata = markdown::parse_frontmatter(&text).unwrap_or_else(|e| {
            warn!("{}: ignoring frontmatter: {}", id, e);
            Default::default()
        });
        Ok(Document::new(id, mtime, metadata, markdown::list_items(&text)))
    }
}

impl Corpus for Vault {
    fn documents(&self) -> Result<Vec<Document>> {
        let files = self.markdown_files();
        let previous = {
            let index = self.index.lock().unwrap_or_else(|e| e.into_inner());
            index.clone()
        };

        let mut documents: Vec<Document> = files
            .into_par_iter()
            .filter_map(|(path, mtime)| {
                let id = self.document_id(&path)?;
                if let Some(doc) = previous.get(&id)
                    && doc.mtime == mtime
                {
                    return Some(doc.clone());
                }
                match self.load(&path, id, mtime) {
                    Ok(doc) => Some(doc),
                    Err(e) => {
                        warn!("Skipping {}: {}", path.display(), e);
                        None
                    }
                }
            })
            .collect();
        documents.sort_by(|a, b| a.id.cmp(&b.id));

        let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
        let reparsed = documents
            .iter()
            .filter(|d| previous.get(&d.id).is_none_or(|p| p.mtime != d.mtime))
            .count();
        debug!(
            "Listed {} notes under {} ({} parsed)",
            documents.len(),
            self.root.display(),
            reparsed
        );
        *index = documents.iter().map(|d| (d.id.clone(), d.clone())).collect();
        Ok(documents)
    }

    fn read_text(&self, id: &DocumentId) -> Result<String> {
        let path = self.root.join(id.as_str());
        std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => Error::NotFound(id.to_string()),
            _ => Error::Io(e),
        })
    }

    fn describe(&self) -> String {
        self.root.display().to_string()
    }
}
