//! Selection of the documents that belong to the configured academic year.

use crate::models::Document;

/// Documents whose `key` value (or any element of a list value) normalizes
/// to exactly `target`, skipping paths under an excluded prefix.
///
/// Corpus order is preserved. An empty `target` or `key` selects nothing.
pub fn select<'a>(
    documents: &'a [Document],
    target: &str,
    key: &str,
    excluded_prefixes: &[String],
) -> Vec<&'a Document> {
    if target.is_empty() || key.is_empty() {
        return Vec::new();
    }
    documents
        .iter()
        .filter(|doc| !is_excluded(doc.id.as_str(), excluded_prefixes))
        .filter(|doc| doc.metadata.normalized(key).values().any(|v| v == target))
        .collect()
}

/// Raw prefix match, the way the path is written in the vault.
pub fn is_excluded(path: &str, excluded_prefixes: &[String]) -> bool {
    excluded_prefixes
        .iter()
        .map(|p| p.trim())
        .any(|p| !p.is_empty() && path.starts_with(p))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::meta;

    const YEAR: &str = "ied_ec_academic_year";

    fn doc(path: &str, year: &str) -> Document {
        let pairs: Vec<(&str, &str)> = if year.is_empty() {
            Vec::new()
        } else {
            vec![(YEAR, year)]
        };
        Document::new(path, 1, meta(&pairs), Vec::new())
    }

    fn ids(selected: &[&Document]) -> Vec<String> {
        selected.iter().map(|d| d.id.to_string()).collect()
    }

    #[test]
    fn test_selects_matching_year_in_corpus_order() {
        let docs = vec![
            doc("z.md", "2025-2026"),
            doc("a.md", "2024-2025"),
            doc("m.md", "[[2025-2026]]"),
            doc("n.md", ""),
        ];
        let selected = select(&docs, "2025-2026", YEAR, &[]);
        assert_eq!(ids(&selected), vec!["z.md", "m.md"]);
    }

    #[test]
    fn test_list_values_match_any_element() {
        let docs = vec![doc("a.md", "2024-2025;2025-2026")];
        assert_eq!(select(&docs, "2025-2026", YEAR, &[]).len(), 1);
    }

    #[test]
    fn test_match_is_exact_and_case_sensitive() {
        let docs = vec![doc("a.md", "2025-2026 bis"), doc("b.md", "S1")];
        assert!(select(&docs, "2025-2026", YEAR, &[]).is_empty());
        assert!(select(&[doc("c.md", "s1")], "S1", YEAR, &[]).is_empty());
    }

    #[test]
    fn test_excluded_prefix_wins_over_matching_metadata() {
        let docs = vec![
            doc("templates/Course.md", "2025-2026"),
            doc("templates-old.md", "2025-2026"),
            doc("courses/Course.md", "2025-2026"),
        ];
        let selected = select(&docs, "2025-2026", YEAR, &["templates".to_string()]);
        assert_eq!(ids(&selected), vec!["courses/Course.md"]);
    }

    #[test]
    fn test_blank_exclusions_are_ignored() {
        let docs = vec![doc("a.md", "2025-2026")];
        assert_eq!(select(&docs, "2025-2026", YEAR, &["  ".to_string()]).len(), 1);
    }

    #[test]
    fn test_empty_target_selects_nothing() {
        let docs = vec![doc("a.md", "2025-2026")];
        assert!(select(&docs, "", YEAR, &[]).is_empty());
        assert!(select(&docs, "2025-2026", "", &[]).is_empty());
    }
}
