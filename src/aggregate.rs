//! Folding selected documents into semester buckets and teaching-unit groups.
//!
//! The aggregator only reads the cache. The refresh step must have brought
//! every member up to date first; a document with no cached metrics (its
//! extraction failed) contributes no effort.

use std::collections::BTreeMap;

use crate::cache::MetricsCache;
use crate::config::DashboardConfig;
use crate::models::Document;
use crate::models::view::{Bucket, BucketView, GroupedView, SubGroup, SubGroupKey};

/// Bucket for `doc`: the first semester value, in the document's own order,
/// that equals one of the two configured labels.
pub fn bucket_for(doc: &Document, config: &DashboardConfig) -> Bucket {
    let [first, second] = &config.semester_labels;
    doc.metadata
        .normalized(&config.properties.semester)
        .values()
        .find_map(|value| {
            if value == first.as_str() {
                Some(Bucket::Semester1)
            } else if value == second.as_str() {
                Some(Bucket::Semester2)
            } else {
                None
            }
        })
        .unwrap_or(Bucket::Unassigned)
}

/// Sub-group key for `doc`: its first teaching unit, or `Other`.
pub fn unit_for(doc: &Document, config: &DashboardConfig) -> SubGroupKey {
    match doc.metadata.normalized(&config.properties.unit).first() {
        Some(unit) if !unit.is_empty() => SubGroupKey::Named(unit.to_string()),
        _ => SubGroupKey::Other,
    }
}

/// Builds the grouped view over `documents`.
///
/// Both semester buckets are always present, empty or not; the unassigned
/// bucket only when it has members.
pub fn group(documents: &[&Document], cache: &MetricsCache, config: &DashboardConfig) -> GroupedView {
    let mut buckets: BTreeMap<Bucket, BTreeMap<SubGroupKey, SubGroup>> = BTreeMap::new();

    for doc in documents {
        let key = unit_for(doc, config);
        let group = buckets
            .entry(bucket_for(doc, config))
            .or_default()
            .entry(key.clone())
            .or_insert_with(|| SubGroup {
                key,
                documents: Vec::new(),
                effort_total: 0,
                effort_done: 0,
            });
        group.documents.push(doc.id.clone());
        if let Some(metrics) = cache.get(&doc.id) {
            group.effort_total = group.effort_total.saturating_add(metrics.effort_total);
            group.effort_done = group.effort_done.saturating_add(metrics.effort_done);
        }
    }

    let buckets = Bucket::ALL
        .into_iter()
        .filter_map(|bucket| {
            let groups: Vec<SubGroup> = buckets
                .remove(&bucket)
                .map(|groups| groups.into_values().collect())
                .unwrap_or_default();
            if bucket == Bucket::Unassigned && groups.is_empty() {
                return None;
            }
            Some(BucketView { bucket, groups })
        })
        .collect();

    GroupedView { buckets }
}
