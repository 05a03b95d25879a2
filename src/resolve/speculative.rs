//! Throwaway re-parses with a minimal completion typed at the cursor.
//!
//! When the cursor sits in a parse error, the most likely cause is the token
//! being typed: `Buck` that will become `BucketName:`, or a JSON key whose
//! closing quote is not there yet. Inserting the smallest text that would
//! finish that token and re-parsing the whole buffer often yields a clean
//! tree around the cursor. JSON buffers are also given the closing brackets
//! they still lack, since an unclosed object turns the whole document into
//! one `ERROR` node. The registered tree is never touched.

use std::sync::LazyLock;

use regex::Regex;
use tree_sitter::Point;

use crate::document::node::{NodeArena, NodeRef};
use crate::document::parser::parse;
use crate::document::position::LineIndex;
use crate::document::DocumentType;
use crate::resolve::classify::{is_pair_node, is_sequence_item_node, node_has_error};
use crate::resolve::search::named_descendant_at;

/// A key being typed on its own, optionally as the first key of a list item.
static BARE_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(?:-\s+)?[A-Za-z0-9_"'][\w.:\-"']*$"#).expect("bare key pattern is valid")
});

/// Re-resolves `point` in a completed copy of `content`.
///
/// Returns the node only if it and its nearest enclosing pair or sequence item
/// are free of errors and no ancestor is an `ERROR` node.
pub(crate) fn speculative_node(
    document_type: DocumentType,
    content: &str,
    lines: &LineIndex,
    point: Point,
) -> Option<NodeRef> {
    let (line_start, line_end) = lines.line_range(content, point.row)?;
    let line = &content[line_start..line_end];
    let column = point.column.min(line.len());
    if !line.is_char_boundary(column) {
        return None;
    }
    let (before, after) = line.split_at(column);

    let (offset, insertion) = match document_type {
        DocumentType::Yaml => yaml_completion(before, after)?,
        DocumentType::Json => json_completion(before, after)?,
    };

    let at = line_start + column + offset;
    let mut completed = String::with_capacity(content.len() + insertion.len());
    completed.push_str(&content[..at]);
    completed.push_str(insertion);
    completed.push_str(&content[at..]);
    if document_type == DocumentType::Json {
        let closers = unclosed_brackets(&completed);
        completed.push_str(&closers);
    }

    let tree = match parse(document_type, &completed, None) {
        Ok(tree) => tree,
        Err(err) => {
            tracing::debug!("Speculative parse failed: {}", err);
            return None;
        }
    };
    let arena = NodeArena::build(document_type, completed.into(), &tree);
    let node = named_descendant_at(&arena.root(), point);

    if is_error_free(&node, document_type) {
        tracing::debug!(
            "Speculative {:?} at {}:{} resolved to {}",
            insertion,
            point.row,
            point.column,
            node.kind()
        );
        Some(node)
    } else {
        tracing::trace!("Speculative {:?} did not clear the error", insertion);
        None
    }
}

/// `(offset after the cursor, text)` that would finish a YAML key.
fn yaml_completion(before: &str, after: &str) -> Option<(usize, &'static str)> {
    let finishes_key = after.trim().is_empty()
        && !before.trim_end().ends_with(':')
        && BARE_KEY.is_match(before);
    finishes_key.then_some((0, ": "))
}

/// `(offset after the cursor, text)` that would finish a JSON key or value.
fn json_completion(before: &str, after: &str) -> Option<(usize, &'static str)> {
    if before.trim_end().ends_with(':') {
        return Some((0, " null"));
    }

    if unescaped_quotes(before) % 2 == 1 {
        // Inside a string: close it, or finish the key it already closes.
        return match closing_quote(after) {
            Some(close) if !after[close + 1..].trim_start().starts_with(':') => {
                Some((close + 1, ": null"))
            }
            Some(_) => None,
            None => Some((0, "\": null")),
        };
    }

    let after_string = before.trim_end().ends_with('"');
    (after_string && !after.trim_start().starts_with(':')).then_some((0, ": null"))
}

/// Closers, innermost first, for every `{` or `[` left open in `text`.
/// Brackets inside strings are skipped. A stray closer that does not match
/// the innermost open bracket is ignored.
fn unclosed_brackets(text: &str) -> String {
    let mut open = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    for ch in text.chars() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' | '\n' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => open.push('}'),
            '[' => open.push(']'),
            '}' | ']' if open.last() == Some(&ch) => {
                open.pop();
            }
            _ => {}
        }
    }
    open.iter().rev().collect()
}

fn unescaped_quotes(text: &str) -> usize {
    let mut count = 0;
    let mut escaped = false;
    for ch in text.chars() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => count += 1,
            _ => {}
        }
    }
    count
}

/// Byte offset of the first unescaped quote in `text`.
fn closing_quote(text: &str) -> Option<usize> {
    let mut escaped = false;
    for (offset, ch) in text.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '"' => return Some(offset),
            _ => {}
        }
    }
    None
}

fn is_error_free(node: &NodeRef, document_type: DocumentType) -> bool {
    let holder = node
        .ancestors()
        .find(|n| is_pair_node(n, document_type) || is_sequence_item_node(n, document_type));
    !node_has_error(node)
        && holder.map_or(true, |holder| !node_has_error(&holder))
        && !node.ancestors().any(|ancestor| ancestor.is_error())
}
