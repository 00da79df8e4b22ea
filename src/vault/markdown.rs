//! Frontmatter and list item scanning for markdown notes.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde_yaml::Value;
use std::sync::LazyLock;

use crate::Result;
use crate::models::{ListItem, MetaValue, Metadata};

static CHECKBOX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[ \t>]*(?:[-*+]|\d+[.)])[ \t]+\[([^\]\n])\]").expect("valid checkbox regex")
});

/// Splits a leading `---` fenced block off `text`.
///
/// Returns the YAML source, or `None` when the note has no frontmatter.
pub fn frontmatter_block(text: &str) -> Option<&str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut lines = text.split_inclusive('\n');
    let first = lines.next()?;
    if first.trim_end() != "---" {
        return None;
    }
    let start = first.len();
    let mut offset = start;
    for line in lines {
        if line.trim_end() == "---" {
            return Some(&text[start..offset]);
        }
        offset += line.len();
    }
    None
}

/// Parses the frontmatter of `text` into metadata.
///
/// A note without frontmatter has empty metadata; malformed YAML is an error.
pub fn parse_frontmatter(text: &str) -> Result<Metadata> {
    let mut metadata = Metadata::new();
    let Some(block) = frontmatter_block(text) else {
        return Ok(metadata);
    };
    if block.trim().is_empty() {
        return Ok(metadata);
    }
    let value: Value = serde_yaml::from_str(block)?;
    if let Value::Mapping(map) = value {
        for (key, value) in map {
            if let Some(key) = scalar_text(&key) {
                metadata.insert(key, meta_value(value));
            }
        }
    }
    Ok(metadata)
}

fn meta_value(value: Value) -> MetaValue {
    match value {
        Value::Sequence(items) => MetaValue::List(items.iter().filter_map(scalar_text).collect()),
        Value::Tagged(tagged) => meta_value(tagged.value),
        other => scalar_text(&other).map_or(MetaValue::Absent, MetaValue::Scalar),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Every list item of `text`, with its zero-based line and checkbox state.
///
/// Items inside the frontmatter or inside code blocks are not list items.
/// The task state comes from the parser's task list marker; checkbox states
/// it does not recognize (`[/]`, `[-]`) are read from the item's first line.
pub fn list_items(text: &str) -> Vec<ListItem> {
    let line_starts: Vec<usize> = std::iter::once(0)
        .chain(text.match_indices('\n').map(|(i, _)| i + 1))
        .collect();
    let line_of = |offset: usize| line_starts.partition_point(|&s| s <= offset).saturating_sub(1);

    let mut items = Vec::new();
    // (index in `items`, byte offset where the item starts)
    let mut open: Vec<(usize, usize)> = Vec::new();

    let options = Options::ENABLE_TASKLISTS | Options::ENABLE_YAML_STYLE_METADATA_BLOCKS;
    for (event, range) in Parser::new_ext(text, options).into_offset_iter() {
        match event {
            Event::Start(Tag::Item) => {
                open.push((items.len(), range.start));
                items.push(ListItem {
                    line: line_of(range.start),
                    task: None,
                });
            }
            Event::TaskListMarker(checked) => {
                if let Some(&(index, _)) = open.last() {
                    let state = text[range]
                        .split_once('[')
                        .and_then(|(_, rest)| rest.chars().next())
                        .unwrap_or(if checked { 'x' } else { ' ' });
                    items[index].task = Some(state);
                }
            }
            Event::End(TagEnd::Item) => {
                if let Some((index, start)) = open.pop()
                    && items[index].task.is_none()
                {
                    items[index].task = CHECKBOX
                        .captures(&text[start..])
                        .and_then(|caps| caps.get(1))
                        .and_then(|m| m.as_str().chars().next());
                }
            }
            _ => {}
        }
    }
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE: &str = "---\nied_ec_academic_year: 2025-2026\nied_ec_semestre:\n  - \"[[S1]]\"\n  - S2\nied_ec_volume: 3.1\nied_ue: \"[[UE 2|Linguistique]]\"\nnested:\n  a: 1\nempty:\n---\n# Title\n\n- [x] Done [🍅:: 2]\n- [ ] Todo\n\t- [/] Nested partial\n- plain\n\n```\n- [ ] in code\n```\n";

    #[test]
    fn test_frontmatter_values() {
        let meta = parse_frontmatter(NOTE).unwrap();
        assert_eq!(
            meta.get("ied_ec_academic_year"),
            &MetaValue::Scalar("2025-2026".to_string())
        );
        assert_eq!(
            meta.get("ied_ec_semestre"),
            &MetaValue::List(vec!["[[S1]]".to_string(), "S2".to_string()])
        );
        assert_eq!(meta.get("ied_ec_volume"), &MetaValue::Scalar("3.1".to_string()));
        assert!(meta.get("nested").is_absent());
        assert!(meta.get("empty").is_absent());
    }

    #[test]
    fn test_no_frontmatter() {
        assert!(parse_frontmatter("# Just a note\n").unwrap().is_empty());
        assert!(parse_frontmatter("---\nunterminated: true\n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_frontmatter_is_an_error() {
        assert!(parse_frontmatter("---\nkey: [unclosed\n---\n").is_err());
    }

    #[test]
    fn test_list_items_positions_and_states() {
        let items = list_items(NOTE);
        let tasks: Vec<(usize, char)> = items
            .iter()
            .filter_map(|i| i.task.map(|t| (i.line, t)))
            .collect();
        assert_eq!(tasks, vec![(13, 'x'), (14, ' '), (15, '/')]);
        assert!(items.iter().any(|i| i.line == 16 && !i.is_task()));
        assert!(!items.iter().any(|i| i.line == 19));
    }

    #[test]
    fn test_tasks_inside_blockquotes() {
        let items = list_items("> - [ ] quoted\n> - [x] done\n> - [/] partial\n");
        let tasks: Vec<(usize, Option<char>)> = items.iter().map(|i| (i.line, i.task)).collect();
        assert_eq!(tasks, vec![(0, Some(' ')), (1, Some('x')), (2, Some('/'))]);
    }

    #[test]
    fn test_link_is_not_a_checkbox() {
        let items = list_items("- [link](https://example.com)\n- [ ] real\n");
        assert_eq!(items[0].task, None);
        assert_eq!(items[1].task, Some(' '));
    }
}
