//! The grouped projection: semester buckets containing teaching-unit sub-groups.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use super::DocumentId;

/// Top-level grouping of selected documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Bucket {
    Semester1,
    Semester2,
    /// Documents whose semester matches neither label
    Unassigned,
}

impl Bucket {
    pub const ALL: [Bucket; 3] = [Bucket::Semester1, Bucket::Semester2, Bucket::Unassigned];
}

/// Key of a sub-group inside a bucket.
///
/// `Other` collects documents without a teaching unit and always sorts last.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "label")]
pub enum SubGroupKey {
    Named(String),
    Other,
}

impl SubGroupKey {
    pub fn is_other(&self) -> bool {
        matches!(self, SubGroupKey::Other)
    }

    /// Label to display, with `other_label` standing in for [`SubGroupKey::Other`].
    pub fn label<'a>(&'a self, other_label: &'a str) -> &'a str {
        match self {
            SubGroupKey::Named(name) => name,
            SubGroupKey::Other => other_label,
        }
    }
}

impl Ord for SubGroupKey {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (SubGroupKey::Other, SubGroupKey::Other) => Ordering::Equal,
            (SubGroupKey::Other, _) => Ordering::Greater,
            (_, SubGroupKey::Other) => Ordering::Less,
            (SubGroupKey::Named(a), SubGroupKey::Named(b)) => locale_cmp(a, b),
        }
    }
}

impl PartialOrd for SubGroupKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Case-insensitive, accent-folding comparison; ties fall back to the raw strings
/// so the order stays total.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| -> String { s.chars().flat_map(fold_char).collect() };
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

fn fold_char(c: char) -> impl Iterator<Item = char> {
    let base = match c {
        'à' | 'á' | 'â' | 'ä' | 'ã' | 'å' | 'À' | 'Á' | 'Â' | 'Ä' | 'Ã' | 'Å' => 'a',
        'ç' | 'Ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' | 'È' | 'É' | 'Ê' | 'Ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' | 'Ì' | 'Í' | 'Î' | 'Ï' => 'i',
        'ñ' | 'Ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'ö' | 'õ' | 'Ò' | 'Ó' | 'Ô' | 'Ö' | 'Õ' => 'o',
        'ù' | 'ú' | 'û' | 'ü' | 'Ù' | 'Ú' | 'Û' | 'Ü' => 'u',
        'ý' | 'ÿ' | 'Ý' => 'y',
        other => other,
    };
    base.to_lowercase()
}

/// Documents of one teaching unit, with rolled-up effort.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubGroup {
    pub key: SubGroupKey,

    /// Members in corpus order
    pub documents: Vec<DocumentId>,

    pub effort_total: u32,
    pub effort_done: u32,
}

impl SubGroup {
    pub fn has_effort(&self) -> bool {
        self.effort_total > 0 || self.effort_done > 0
    }
}

/// One bucket and its sorted sub-groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketView {
    pub bucket: Bucket,
    pub groups: Vec<SubGroup>,
}

impl BucketView {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn document_count(&self) -> usize {
        self.groups.iter().map(|g| g.documents.len()).sum()
    }

    /// A bucket whose only sub-group is `Other` is shown without a group header.
    pub fn is_headerless(&self) -> bool {
        self.groups.len() == 1 && self.groups[0].key.is_other()
    }
}

/// Grouped projection over the selected documents. Rebuilt on every refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedView {
    pub buckets: Vec<BucketView>,
}

impl GroupedView {
    pub fn bucket(&self, bucket: Bucket) -> Option<&BucketView> {
        self.buckets.iter().find(|b| b.bucket == bucket)
    }

    pub fn document_count(&self) -> usize {
        self.buckets.iter().map(BucketView::document_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(s: &str) -> SubGroupKey {
        SubGroupKey::Named(s.to_string())
    }

    #[test]
    fn test_other_sorts_after_everything() {
        let mut keys = vec![SubGroupKey::Other, named("Zoology"), named("Anatomy")];
        keys.sort();
        assert_eq!(keys, vec![named("Anatomy"), named("Zoology"), SubGroupKey::Other]);
    }

    #[test]
    fn test_named_other_is_not_the_reserved_key() {
        let mut keys = vec![SubGroupKey::Other, named("Other")];
        keys.sort();
        assert_eq!(keys[0], named("Other"));
    }

    #[test]
    fn test_locale_cmp_ignores_case_and_accents() {
        assert_eq!(locale_cmp("économie", "Finance"), Ordering::Less);
        assert_eq!(locale_cmp("apple", "Banana"), Ordering::Less);
        assert_ne!(locale_cmp("Ete", "été"), Ordering::Equal);
    }

    #[test]
    fn test_headerless_bucket() {
        let bucket = BucketView {
            bucket: Bucket::Semester1,
            groups: vec![SubGroup {
                key: SubGroupKey::Other,
                documents: vec![DocumentId::new("a.md")],
                effort_total: 0,
                effort_done: 0,
            }],
        };
        assert!(bucket.is_headerless());
        assert_eq!(bucket.document_count(), 1);
    }
}
