//! Incremental metrics cache keyed by document identity.
//!
//! An entry is fresh while its stored modification time equals the
//! document's current one and it was built under the caller's extraction
//! settings generation. Fresh entries are returned without calling the
//! loader, so the cost of a refresh pass is proportional to the number of
//! changed documents rather than the size of the corpus.
//!
//! Entries are replaced wholesale: the loader runs outside the lock and the
//! finished record is swapped in under a short write lock, so readers never
//! see a partially built record. A finished record never replaces one built
//! from a newer modification time or a newer settings generation, so a slow
//! refresh working from an older listing cannot roll an entry back.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tracing::{debug, trace};

use crate::Result;
use crate::models::{Document, DocumentId, Metrics, Mtime};

#[derive(Debug, Clone)]
struct CacheEntry {
    mtime: Mtime,
    settings: u64,
    metrics: Arc<Metrics>,
}

impl CacheEntry {
    fn stamp(&self) -> (Mtime, u64) {
        (self.mtime, self.settings)
    }
}

/// Whether a lookup was served from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Hit,
    Miss,
}

/// Counters since the cache was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Keyed store of per-document metrics.
#[derive(Debug, Default)]
pub struct MetricsCache {
    entries: RwLock<HashMap<DocumentId, CacheEntry>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl MetricsCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the metrics for `doc`, calling `loader` only when the stored
    /// entry is missing, was built for a different modification time, or was
    /// built under a different `settings` generation.
    ///
    /// When `loader` fails the previous entry, if any, is left in place and
    /// the error is returned.
    pub fn get_or_refresh<F>(
        &self,
        doc: &Document,
        settings: u64,
        loader: F,
    ) -> Result<(Arc<Metrics>, Freshness)>
    where
        F: FnOnce() -> Result<Metrics>,
    {
        {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            if let Some(entry) = entries.get(&doc.id)
                && entry.stamp() == (doc.mtime, settings)
            {
                self.hits.fetch_add(1, Ordering::Relaxed);
                trace!("cache hit: {}", doc.id);
                return Ok((Arc::clone(&entry.metrics), Freshness::Hit));
            }
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(
            "cache miss: {} (mtime {}, settings {})",
            doc.id, doc.mtime, settings
        );
        let metrics = Arc::new(loader()?);

        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let newer = entries
            .get(&doc.id)
            .is_some_and(|e| e.stamp() > (doc.mtime, settings));
        if newer {
            debug!("keeping newer cache entry for {}", doc.id);
        } else {
            entries.insert(
                doc.id.clone(),
                CacheEntry {
                    mtime: doc.mtime,
                    settings,
                    metrics: Arc::clone(&metrics),
                },
            );
        }
        Ok((metrics, Freshness::Miss))
    }

    /// Stored metrics for `id`, without checking freshness.
    pub fn get(&self, id: &DocumentId) -> Option<Arc<Metrics>> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(id).map(|e| Arc::clone(&e.metrics))
    }

    /// Modification time the entry for `id` was built from.
    pub fn mtime(&self, id: &DocumentId) -> Option<Mtime> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.get(id).map(|e| e.mtime)
    }

    /// Drops entries for documents not in `live`. Returns how many were dropped.
    pub fn prune(&self, live: &HashSet<&DocumentId>) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|id, _| live.contains(id));
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}
