//! Indentation-based structure for documents the grammar could not parse.
//!
//! When recovery mangles a YAML tree, key/value pairs end up detached from
//! their mappings or inside `ERROR` nodes. This module finds every pair it can
//! recognise, including a bare scalar followed by a `:` token, and rebuilds an
//! ancestor chain for a position purely from indentation, the way YAML itself
//! defines nesting.

use std::collections::HashSet;

use tree_sitter::Point;

use crate::document::node::NodeRef;
use crate::document::DocumentType;
use crate::resolve::classify::{extract_key_from_pair, is_pair_node, key_text};
use crate::resolve::traverse::{traverse, TraverseOptions};

/// A recognised key/value pair.
#[derive(Debug, Clone, PartialEq)]
pub struct PairInfo {
    /// The pair node, or the bare key node for an implicit pair.
    pub node: NodeRef,
    pub key: String,
    /// Column of the key.
    pub indent_level: usize,
    /// Where the key starts.
    pub start: Point,
}

const KEY_LIKE: &[&str] = &[
    "flow_node",
    "plain_scalar",
    "string_scalar",
    "double_quote_scalar",
    "single_quote_scalar",
    "string",
];

/// Every pair under `root`, in document order, including ones inside error
/// subtrees. A pair seen through more than one tree path is reported once.
pub fn find_all_pairs(root: &NodeRef, document_type: DocumentType, max_depth: usize) -> Vec<PairInfo> {
    let options = TraverseOptions::default()
        .with_max_depth(max_depth)
        .including_errors();

    let mut seen = HashSet::new();
    let mut pairs: Vec<PairInfo> = traverse(
        root,
        |node| is_pair_node(node, document_type) || is_implicit_pair_key(node),
        options,
    )
    .into_iter()
    .filter_map(|node| pair_info(node, document_type))
    .filter(|pair| seen.insert((pair.key.clone(), pair.start.row, pair.start.column)))
    .collect();

    pairs.sort_by_key(|pair| pair.start);
    pairs
}

fn pair_info(node: NodeRef, document_type: DocumentType) -> Option<PairInfo> {
    if is_pair_node(&node, document_type) {
        let key_node = node.child_by_field_name("key");
        let key = extract_key_from_pair(&node, document_type)?;
        let start = key_node.map_or_else(|| node.start(), |key| key.start());
        return Some(PairInfo {
            node,
            key,
            indent_level: start.column,
            start,
        });
    }
    let key = key_text(&node);
    let start = node.start();
    Some(PairInfo {
        node,
        key,
        indent_level: start.column,
        start,
    })
}

/// A scalar-like node directly followed by a `:` token.
///
/// Inside `ERROR` nodes recovery can leave raw scanner tokens instead of
/// scalars, so any single-line leaf qualifies there as well.
fn is_implicit_pair_key(node: &NodeRef) -> bool {
    let followed_by_colon = node
        .next_sibling()
        .is_some_and(|next| !next.is_named() && next.kind() == ":");
    if !followed_by_colon {
        return false;
    }
    if KEY_LIKE.contains(&node.kind()) {
        return true;
    }
    let text = node.text().trim();
    node.child_count() == 0
        && node.parent().is_some_and(|parent| parent.is_error())
        && !matches!(node.kind(), ":" | "tag" | "anchor" | "comment" | "-")
        && !text.is_empty()
        && !text.contains('\n')
}

/// The chain of pairs enclosing `position`, outermost first, derived from
/// indentation alone.
///
/// A pair qualifies if its key starts before `position` and is indented less
/// than the cursor column. Accepting a pair discards every earlier candidate
/// that is not indented strictly less, since that one was a sibling or a
/// child rather than an ancestor. Indentation therefore strictly increases
/// along the result.
pub fn find_context_pairs_for_position(
    root: &NodeRef,
    position: Point,
    document_type: DocumentType,
    max_depth: usize,
) -> Vec<PairInfo> {
    let mut chain: Vec<PairInfo> = Vec::new();

    for pair in find_all_pairs(root, document_type, max_depth) {
        if pair.start >= position {
            break;
        }
        if pair.indent_level >= position.column {
            continue;
        }
        while chain
            .last()
            .is_some_and(|last| last.indent_level >= pair.indent_level)
        {
            chain.pop();
        }
        chain.push(pair);
    }

    chain
}
