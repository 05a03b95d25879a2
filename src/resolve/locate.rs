//! Cursor position to node.
//!
//! Resolution tries a fixed sequence of strategies and returns the first one
//! that produces a node:
//!
//! 1. YAML cursor hanging after `Key:` or `-`: a synthetic placeholder.
//! 2. The deepest named node containing the cursor.
//! 3. Inside a parse error: a speculative re-parse with the token completed.
//! 4. YAML cursor between a key and its value: the pair.
//! 5. A clean scalar: returned as is.
//! 6. YAML blank line: a synthetic key or value placed by indentation.
//! 7. A valid, reasonably small node below, or near, the cursor.
//! 8. Whatever is closest, even if invalid.
//!
//! Nothing here fails. A position outside the document is clamped by the
//! caller and still yields the best available node.

use tree_sitter::Point;

use crate::config::Config;
use crate::document::node::{NodeRef, SyntaxNode};
use crate::document::position::LineIndex;
use crate::document::DocumentType;
use crate::resolve::classify::{
    extract_value_from_pair, in_error_context, is_large_node, is_mapping_node, is_pair_node,
    is_scalar_node, is_sequence_item_node, is_valid_node, mapping_of,
};
use crate::resolve::search::{find_most_specific_node, find_nearby_node, named_descendant_at};
use crate::resolve::speculative::speculative_node;
use crate::resolve::synthetic::{synthetic_at, SyntheticKind};
use crate::resolve::traverse::{traverse, TraverseOptions};

/// Everything position resolution needs from one version of a document.
#[derive(Debug, Clone, Copy)]
pub struct Locator<'a> {
    pub root: &'a NodeRef,
    pub content: &'a str,
    pub lines: &'a LineIndex,
    pub document_type: DocumentType,
    pub config: &'a Config,
}

impl<'a> Locator<'a> {
    fn line(&self, row: usize) -> &'a str {
        self.lines.line(self.content, row)
    }

    fn is_yaml(&self) -> bool {
        self.document_type == DocumentType::Yaml
    }

    /// Resolves the node at `point`.
    pub fn node_at(&self, point: Point) -> SyntaxNode {
        if self.is_yaml() {
            if let Some(node) = self.hanging_cursor(point) {
                tracing::trace!("Hanging cursor at {}:{}", point.row, point.column);
                return node;
            }
        }

        let node = named_descendant_at(self.root, point);
        let erroneous = in_error_context(&node);

        if erroneous && self.config.speculative_parsing {
            if let Some(node) = speculative_node(self.document_type, self.content, self.lines, point) {
                return node.into();
            }
        }

        if self.is_yaml() {
            if let Some(pair) = self.between_key_and_value(&node, point) {
                return pair.into();
            }
        }

        if !erroneous && is_scalar_node(&node, self.document_type) {
            return node.into();
        }

        if self.is_yaml() && self.line(point.row).trim().is_empty() {
            if let Some(node) = self.blank_line(point) {
                tracing::trace!("Blank line at {}:{} resolved to {}", point.row, point.column, node.kind());
                return node;
            }
        }

        let threshold = self.config.large_node_threshold;
        if let Some(found) = find_most_specific_node(&node, point, |n| {
            n.is_named() && is_valid_node(n) && !is_large_node(n, threshold)
        }) {
            return found.into();
        }

        let hops = self.config.nearby_search_depth;
        let usable = |n: &NodeRef| n.is_named() && is_valid_node(n);
        if let Some(found) = find_nearby_node(self.root, point, &node, usable, hops) {
            return found.into();
        }

        if is_valid_node(&node) {
            return node.into();
        }

        tracing::trace!("No valid node at {}:{}", point.row, point.column);
        find_nearby_node(self.root, point, &node, NodeRef::is_named, hops)
            .unwrap_or(node)
            .into()
    }

    /// Cursor at or past the end of a line that ends in `Key:` or `-` with
    /// nothing written after it.
    fn hanging_cursor(&self, point: Point) -> Option<SyntaxNode> {
        let trimmed = self.line(point.row).trim_end();
        if trimmed.trim_start().is_empty() || point.column < trimmed.len() {
            return None;
        }

        let holder = self.holder_on_line(point.row)?;
        if is_pair_node(&holder, self.document_type) && trimmed.ends_with(':') {
            let value = extract_value_from_pair(&holder, self.document_type);
            if value.map_or(true, |value| value.start().row > point.row) {
                return Some(synthetic_at(point, SyntheticKind::Value, holder));
            }
        }
        if is_sequence_item_node(&holder, self.document_type)
            && trimmed.ends_with('-')
            && holder.named_children().next().is_none()
        {
            return Some(synthetic_at(point, SyntheticKind::KeyOrValue, holder));
        }
        None
    }

    fn between_key_and_value(&self, node: &NodeRef, point: Point) -> Option<NodeRef> {
        if !is_pair_node(node, self.document_type) {
            return None;
        }
        let key = node.child_by_field_name("key")?;
        let before_value = extract_value_from_pair(node, self.document_type)
            .map_or(true, |value| point < value.start());
        (point > key.end() && before_value).then(|| node.clone())
    }

    /// The pair or sequence item owning the last character written on `row`.
    fn holder_on_line(&self, row: usize) -> Option<NodeRef> {
        let trimmed = self.line(row).trim_end();
        let last = trimmed.char_indices().last()?.0;
        named_descendant_at(self.root, Point::new(row, last))
            .ancestors()
            .find(|node| self.owns_row(node, row))
    }

    /// The pair whose key starts on `row`, or the sequence item whose dash does.
    fn owns_row(&self, node: &NodeRef, row: usize) -> bool {
        (is_pair_node(node, self.document_type) || is_sequence_item_node(node, self.document_type))
            && node.start().row == row
    }

    /// Places a synthetic node on a whitespace-only line from the indentation
    /// of the lines above it.
    fn blank_line(&self, point: Point) -> Option<SyntaxNode> {
        let column = point.column;
        let rows: Vec<usize> = (0..point.row)
            .rev()
            .filter(|&row| is_content_line(self.line(row)))
            .collect();

        let Some(&previous) = rows.first() else {
            return self.top_level_key(point);
        };

        if column > indent_of(self.line(previous)) {
            if let Some(node) = self.nested_under(previous, point) {
                return Some(node);
            }
        }

        for &row in &rows {
            let text = self.line(row);
            let indent = indent_of(text);
            if indent == column || key_column(text) == column {
                if let Some(node) = self.sibling_of(row, point) {
                    return Some(node);
                }
            }
            if indent < column && text.trim_end().ends_with(':') {
                if let Some(pair) = self
                    .holder_on_line(row)
                    .filter(|node| is_pair_node(node, self.document_type))
                {
                    return Some(self.key_under_pair(pair, point));
                }
            }
            if indent < column {
                break;
            }
        }

        if column == 0 {
            return self.top_level_key(point);
        }
        None
    }

    /// Cursor indented deeper than the line at `row`.
    fn nested_under(&self, row: usize, point: Point) -> Option<SyntaxNode> {
        let holder = self.holder_on_line(row)?;
        if is_pair_node(&holder, self.document_type) && self.line(row).trim_end().ends_with(':') {
            return Some(self.key_under_pair(holder, point));
        }

        let item = holder
            .ancestors()
            .find(|node| is_sequence_item_node(node, self.document_type) && node.start().row == row)?;
        let mapping = item
            .named_children()
            .find_map(|value| mapping_of(&value, self.document_type));
        Some(match mapping {
            Some(mapping) => synthetic_at(point, SyntheticKind::Key, mapping),
            None => synthetic_at(point, SyntheticKind::KeyOrValue, item),
        })
    }

    /// A new key inside the value of `pair`, or an undecided node when the
    /// pair has no mapping yet.
    fn key_under_pair(&self, pair: NodeRef, point: Point) -> SyntaxNode {
        let mapping = extract_value_from_pair(&pair, self.document_type)
            .and_then(|value| mapping_of(&value, self.document_type));
        match mapping {
            Some(mapping) => synthetic_at(point, SyntheticKind::Key, mapping),
            None => synthetic_at(point, SyntheticKind::KeyOrValue, pair),
        }
    }

    /// Cursor at the same indentation as the entry on `row`.
    fn sibling_of(&self, row: usize, point: Point) -> Option<SyntaxNode> {
        let text = self.line(row);
        let indent = indent_of(text);

        if indent == point.column && text.trim_start().starts_with('-') {
            let item = named_descendant_at(self.root, Point::new(row, indent))
                .ancestors()
                .find(|node| is_sequence_item_node(node, self.document_type) && node.start().row == row)?;
            let sequence = item.parent()?;
            return Some(synthetic_at(point, SyntheticKind::KeyOrValue, sequence));
        }

        let pair = named_descendant_at(self.root, Point::new(row, key_column(text)))
            .ancestors()
            .find(|node| is_pair_node(node, self.document_type) && node.start().row == row)?;
        let mapping = pair.parent().filter(|parent| is_mapping_node(parent, self.document_type))?;
        Some(synthetic_at(point, SyntheticKind::Key, mapping))
    }

    fn top_level_key(&self, point: Point) -> Option<SyntaxNode> {
        let options = TraverseOptions::default()
            .with_max_depth(self.config.max_depth)
            .first_match_only();
        let mapping = traverse(self.root, |node| is_mapping_node(node, self.document_type), options)
            .into_iter()
            .next()?;
        Some(synthetic_at(point, SyntheticKind::Key, mapping))
    }
}

fn is_content_line(line: &str) -> bool {
    let trimmed = line.trim();
    !trimmed.is_empty() && !trimmed.starts_with('#')
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// Column of the first key on a line, past any `- ` list markers.
fn key_column(line: &str) -> usize {
    let mut rest = line.trim_start();
    while let Some(after) = rest.strip_prefix('-') {
        if !after.starts_with([' ', '\t']) {
            break;
        }
        rest = after.trim_start();
    }
    line.len() - rest.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::NodeArena;
    use crate::document::parser::parse;
    use crate::resolve::classify::extract_key_from_pair;

    fn resolve(document_type: DocumentType, text: &str, point: Point) -> SyntaxNode {
        resolve_with(document_type, text, point, &Config::default())
    }

    fn resolve_with(document_type: DocumentType, text: &str, point: Point, config: &Config) -> SyntaxNode {
        let tree = parse(document_type, text, None).unwrap();
        let root = NodeArena::build(document_type, text.into(), &tree).root();
        let lines = LineIndex::new(text);
        let locator = Locator {
            root: &root,
            content: text,
            lines: &lines,
            document_type,
            config,
        };
        locator.node_at(point)
    }

    fn anchor_key(node: &SyntaxNode) -> Option<String> {
        node.parent()?
            .ancestors()
            .find(|n| is_pair_node(n, DocumentType::Yaml))
            .and_then(|pair| extract_key_from_pair(&pair, DocumentType::Yaml))
    }

    #[test]
    fn test_key_columns() {
        assert_eq!(key_column("  - Name: x"), 4);
        assert_eq!(key_column("- - a"), 4);
        assert_eq!(key_column("    Type: x"), 4);
        assert_eq!(key_column("  -x"), 2);
        assert_eq!(indent_of("   # c"), 3);
    }

    #[test]
    fn test_scalar_fast_path() {
        let node = resolve(DocumentType::Yaml, "Type: AWS::S3::Bucket\n", Point::new(0, 10));
        assert!(!node.is_synthetic());
        assert_eq!(node.text(), "AWS::S3::Bucket");
    }

    #[test]
    fn test_hanging_after_colon_is_a_value() {
        let text = "Resources:\n  Bucket:\n    Type: \n";
        let node = resolve(DocumentType::Yaml, text, Point::new(2, 10));
        assert_eq!(node.synthetic_kind(), Some(SyntheticKind::Value));
        assert_eq!(node.start(), Point::new(2, 10));
        let anchor = node.parent().unwrap();
        assert_eq!(extract_key_from_pair(&anchor, DocumentType::Yaml).as_deref(), Some("Type"));
    }

    #[test]
    fn test_hanging_after_dash_is_undecided() {
        let text = "Tags:\n  - \n";
        let node = resolve(DocumentType::Yaml, text, Point::new(1, 4));
        assert_eq!(node.synthetic_kind(), Some(SyntheticKind::KeyOrValue));
        assert_eq!(node.parent().unwrap().kind(), "block_sequence_item");
    }

    #[test]
    fn test_between_colon_and_value_is_the_pair() {
        let text = "Name:   value\n";
        let node = resolve(DocumentType::Yaml, text, Point::new(0, 6));
        assert_eq!(node.kind(), "block_mapping_pair");
    }

    #[test]
    fn test_blank_line_under_mapping_key() {
        let text = "Resources:\n  Bucket:\n    Type: x\n    \n";
        let node = resolve(DocumentType::Yaml, text, Point::new(3, 4));
        assert_eq!(node.synthetic_kind(), Some(SyntheticKind::Key));
        assert_eq!(node.parent().unwrap().kind(), "block_mapping");
        assert_eq!(anchor_key(&node).as_deref(), Some("Bucket"));
    }

    #[test]
    fn test_blank_line_at_sibling_indent() {
        let text = "Resources:\n  Bucket:\n    Type: x\n  \n";
        let node = resolve(DocumentType::Yaml, text, Point::new(3, 2));
        assert_eq!(node.synthetic_kind(), Some(SyntheticKind::Key));
        assert_eq!(anchor_key(&node).as_deref(), Some("Resources"));
    }

    #[test]
    fn test_blank_line_at_column_zero() {
        let text = "Resources:\n  Bucket:\n    Type: x\n\n";
        let node = resolve(DocumentType::Yaml, text, Point::new(3, 0));
        assert_eq!(node.synthetic_kind(), Some(SyntheticKind::Key));
        assert_eq!(anchor_key(&node), None);
    }

    #[test]
    fn test_blank_line_under_empty_key() {
        let text = "Resources:\n  Bucket:\n    \n";
        let node = resolve(DocumentType::Yaml, text, Point::new(2, 4));
        assert!(node.is_synthetic());
        assert_eq!(anchor_key(&node).as_deref(), Some("Bucket"));
    }

    #[test]
    fn test_json_is_never_synthetic() {
        let text = "{\n  \"a\": 1,\n  \n}";
        let node = resolve(DocumentType::Json, text, Point::new(2, 2));
        assert!(!node.is_synthetic());
    }

    #[test]
    fn test_out_of_range_point_still_resolves() {
        let node = resolve(DocumentType::Json, r#"{"a": 1}"#, Point::new(0, 500));
        assert!(!node.kind().is_empty());
    }

    #[test]
    fn test_punctuation_is_never_the_answer() {
        let cases = [
            (DocumentType::Yaml, "Resources:\n  B:\n    Properties:\n      BucketName: !If [IsProd, !Ref A, \n"),
            (DocumentType::Json, r#"{"a": [1, 2, , {"b": }"#),
        ];
        for (document_type, text) in cases {
            let lines = LineIndex::new(text);
            for row in 0..lines.line_count() {
                for column in 0..=lines.line(text, row).len() + 1 {
                    let node = resolve(document_type, text, Point::new(row, column));
                    assert!(
                        node.as_real().map_or(true, NodeRef::is_named),
                        "{:?} at {}:{}",
                        node.kind(),
                        row,
                        column
                    );
                }
            }
        }
    }

    #[test]
    fn test_speculation_can_be_disabled() {
        let text = r#"{"Resources":{"Buck"#;
        let point = Point::new(0, text.len());
        let config = Config {
            speculative_parsing: false,
            ..Config::default()
        };
        let completed = |node: &SyntaxNode| {
            node.as_real()
                .is_some_and(|node| node.arena().source().contains("\": null"))
        };

        let with = resolve(DocumentType::Json, text, point);
        assert_eq!(with.text(), "Buck");
        assert!(completed(&with));

        let without = resolve_with(DocumentType::Json, text, point, &config);
        assert!(!completed(&without));
    }
}
