//! Inline effort annotations on task lines.
//!
//! A task records the effort units spent on it with an inline field:
//!
//! ```text
//! - [x] Read chapter 3 [🍅:: 2]
//! ```
//!
//! Only the first annotation on a line is counted. For display, the leading
//! list/checkbox marker and every annotation are removed.

use regex::Regex;
use std::sync::LazyLock;

static EFFORT_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[🍅::\s*(\d+)\]").expect("valid effort marker regex"));

static LIST_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s*(?:\[.\]\s*)?").expect("valid list marker regex")
});

/// Effort units recorded on `line`, or `None` when the line carries no annotation.
///
/// An annotation whose number does not fit in a `u32` is treated as absent.
pub fn extract_effort(line: &str) -> Option<u32> {
    EFFORT_MARKER
        .captures(line)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Removes the leading list/checkbox marker and all effort annotations.
pub fn strip_display_noise(line: &str) -> String {
    let without_marker = LIST_MARKER.replace(line, "");
    EFFORT_MARKER
        .replace_all(&without_marker, "")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_effort_present() {
        assert_eq!(extract_effort("- [x] Read chapter [🍅:: 2]"), Some(2));
    }

    #[test]
    fn test_extract_effort_without_space() {
        assert_eq!(extract_effort("- [ ] Draft [🍅::12]"), Some(12));
    }

    #[test]
    fn test_extract_effort_absent_is_none_not_zero() {
        assert_eq!(extract_effort("- [x] Read chapter"), None);
        assert_eq!(extract_effort("- [x] zero [🍅:: 0]"), Some(0));
    }

    #[test]
    fn test_extract_effort_first_marker_wins() {
        assert_eq!(extract_effort("a [🍅:: 3] b [🍅:: 4]"), Some(3));
    }

    #[test]
    fn test_extract_effort_rejects_malformed_marker() {
        assert_eq!(extract_effort("- [ ] x [🍅:: two]"), None);
        assert_eq!(extract_effort("- [ ] x [🍅: 2]"), None);
        assert_eq!(extract_effort("- [ ] x [🍅:: 99999999999]"), None);
    }

    #[test]
    fn test_strip_checked_task() {
        assert_eq!(
            strip_display_noise("- [x] Read chapter [🍅:: 2]"),
            "Read chapter"
        );
    }

    #[test]
    fn test_strip_indented_unchecked_task() {
        assert_eq!(
            strip_display_noise("\t* [ ] Summarise **notes**"),
            "Summarise **notes**"
        );
    }

    #[test]
    fn test_strip_ordered_task() {
        assert_eq!(strip_display_noise("1. [ ] First step"), "First step");
    }

    #[test]
    fn test_strip_removes_every_annotation() {
        assert_eq!(
            strip_display_noise("+ [/] A [🍅:: 1] and B [🍅:: 2]"),
            "A  and B"
        );
    }

    #[test]
    fn test_strip_passes_plain_text_through() {
        assert_eq!(strip_display_noise("no marker here"), "no marker here");
        assert_eq!(strip_display_noise(""), "");
    }
}
