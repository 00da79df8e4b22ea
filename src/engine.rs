//! The refresh pass: filter, refresh the cache, aggregate, assemble.
//!
//! An [`Engine`] owns the metrics cache and the last good snapshot. Passes on
//! one engine must not overlap; the [`crate::runner`] serializes them.

use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, Freshness, MetricsCache};
use crate::config::DashboardConfig;
use crate::models::dashboard::{BucketSection, Dashboard, DocumentCard, GroupSection};
use crate::models::view::GroupedView;
use crate::models::{Document, DocumentId, Metrics};
use crate::vault::Corpus;
use crate::{Error, Result, aggregate, extract, filter};

/// Source of "now" for progress computations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    System,
    Fixed(NaiveDateTime),
}

impl Clock {
    pub fn now(&self) -> NaiveDateTime {
        match self {
            Clock::System => chrono::Local::now().naive_local(),
            Clock::Fixed(at) => *at,
        }
    }
}

/// A document that could not be refreshed during a pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedDocument {
    pub id: DocumentId,
    pub error: String,
}

/// What one refresh pass did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PassReport {
    /// Documents listed by the corpus
    pub documents: usize,
    /// Documents matching the academic year
    pub selected: usize,
    pub hits: usize,
    pub misses: usize,
    pub skipped: Vec<SkippedDocument>,
    /// Cache entries dropped for documents that left the corpus
    pub pruned: usize,
    pub elapsed_ms: u64,
}

/// Result of a successful pass.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub view: GroupedView,
    pub dashboard: Dashboard,
    pub report: PassReport,
}

/// Current configuration and the generation of the settings extraction
/// depends on. Read together so a pass never pairs one with the other's
/// successor.
struct Settings {
    config: Arc<DashboardConfig>,
    generation: u64,
}

pub struct Engine {
    corpus: Arc<dyn Corpus>,
    settings: RwLock<Settings>,
    cache: MetricsCache,
    clock: Clock,
    last: Mutex<Option<Arc<Snapshot>>>,
}

impl Engine {
    pub fn new(corpus: Arc<dyn Corpus>, config: DashboardConfig) -> Self {
        Self {
            corpus,
            settings: RwLock::new(Settings {
                config: Arc::new(config),
                generation: 0,
            }),
            cache: MetricsCache::new(),
            clock: Clock::System,
            last: Mutex::new(None),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn config(&self) -> Arc<DashboardConfig> {
        self.settings().0
    }

    fn settings(&self) -> (Arc<DashboardConfig>, u64) {
        let settings = self.settings.read().unwrap_or_else(|e| e.into_inner());
        (Arc::clone(&settings.config), settings.generation)
    }

    /// Replaces the configuration used by subsequent passes.
    ///
    /// Cached metrics depend on the volume property and the effort unit size.
    /// When either changes the settings generation moves on, so every entry
    /// built under the old one is a miss, including entries a pass already
    /// running with the old configuration has yet to write. Safe to call
    /// while a pass runs.
    pub fn set_config(&self, config: DashboardConfig) {
        let mut current = self.settings.write().unwrap_or_else(|e| e.into_inner());
        if current.config.properties.volume != config.properties.volume
            || current.config.pomodoro_minutes != config.pomodoro_minutes
        {
            current.generation += 1;
            debug!(
                "Extraction settings changed, cached metrics now stale (generation {})",
                current.generation
            );
        }
        current.config = Arc::new(config);
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Snapshot of the last successful pass.
    pub fn last_snapshot(&self) -> Option<Arc<Snapshot>> {
        let last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        last.clone()
    }

    pub fn corpus(&self) -> &Arc<dyn Corpus> {
        &self.corpus
    }

    fn refresh_document(
        &self,
        doc: &Document,
        config: &DashboardConfig,
        generation: u64,
    ) -> Result<(Arc<Metrics>, Freshness)> {
        self.cache.get_or_refresh(doc, generation, || {
            let text = self.corpus.read_text(&doc.id)?;
            extract::extract(doc, &text, config)
        })
    }

    /// Runs one pass.
    ///
    /// Failures of single documents are contained and reported in the
    /// [`PassReport`]; only a failure to list the corpus fails the pass, in
    /// which case the previous snapshot stays current.
    pub fn refresh(&self) -> Result<Arc<Snapshot>> {
        let started = Instant::now();
        let (config, generation) = self.settings();
        let now = self.clock.now();

        let documents = self.corpus.documents()?;
        let selected = filter::select(
            &documents,
            &config.academic_year,
            &config.properties.year,
            &config.excluded_folders,
        );

        let outcomes: Vec<(&DocumentId, Result<Freshness>)> = selected
            .par_iter()
            .map(|doc| {
                let outcome = self
                    .refresh_document(doc, &config, generation)
                    .map(|(_, f)| f);
                (&doc.id, outcome)
            })
            .collect();

        let mut hits = 0;
        let mut misses = 0;
        let mut skipped = Vec::new();
        for (id, outcome) in outcomes {
            match outcome {
                Ok(Freshness::Hit) => hits += 1,
                Ok(Freshness::Miss) => misses += 1,
                Err(e) => {
                    warn!("Skipping {}: {}", id, e);
                    skipped.push(SkippedDocument {
                        id: id.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        let live: HashSet<&DocumentId> = documents.iter().map(|d| &d.id).collect();
        let pruned = self.cache.prune(&live);

        let view = aggregate::group(&selected, &self.cache, &config);
        let dashboard = self.assemble(&view, &selected, &config, now);

        let report = PassReport {
            documents: documents.len(),
            selected: selected.len(),
            hits,
            misses,
            skipped,
            pruned,
            elapsed_ms: started.elapsed().as_millis() as u64,
        };
        info!(
            "Refreshed {}: {} selected, {} hits, {} misses, {} skipped in {}ms",
            self.corpus.describe(),
            report.selected,
            report.hits,
            report.misses,
            report.skipped.len(),
            report.elapsed_ms
        );

        let snapshot = Arc::new(Snapshot {
            view,
            dashboard,
            report,
        });
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        *last = Some(Arc::clone(&snapshot));
        Ok(snapshot)
    }

    fn assemble(
        &self,
        view: &GroupedView,
        selected: &[&Document],
        config: &DashboardConfig,
        now: NaiveDateTime,
    ) -> Dashboard {
        let strings = config.language.strings();
        let by_id: HashMap<&DocumentId, &Document> =
            selected.iter().map(|d| (&d.id, *d)).collect();

        let buckets = view
            .buckets
            .iter()
            .map(|bucket| {
                let headerless = bucket.is_headerless();
                let groups = bucket
                    .groups
                    .iter()
                    .map(|group| {
                        let cards = group
                            .documents
                            .iter()
                            .filter_map(|id| by_id.get(id))
                            .map(|doc| {
                                let metrics = self.cache.get(&doc.id);
                                DocumentCard::build(doc, metrics.as_deref(), config, now)
                            })
                            .collect();
                        GroupSection::new(
                            group,
                            group.key.label(strings.others),
                            !headerless,
                            cards,
                        )
                    })
                    .collect();
                BucketSection::new(bucket, config, now, groups)
            })
            .collect();

        Dashboard {
            title: config.dashboard_title.clone(),
            academic_year: config.academic_year.clone(),
            language: config.language,
            generated_at: now,
            empty_message: selected.is_empty().then(|| strings.no_pages.to_string()),
            buckets,
        }
    }

    /// Card for any document in the corpus, selected or not.
    pub fn inspect(&self, id: &DocumentId) -> Result<DocumentCard> {
        let (config, generation) = self.settings();
        let documents = self.corpus.documents()?;
        let doc = documents
            .iter()
            .find(|d| &d.id == id)
            .ok_or_else(|| Error::NotFound(id.to_string()))?;
        let (metrics, _) = self.refresh_document(doc, &config, generation)?;
        Ok(DocumentCard::build(
            doc,
            Some(&metrics),
            &config,
            self.clock.now(),
        ))
    }
}
