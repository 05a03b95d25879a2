//! Grammar-aware node predicates.
//!
//! The JSON and YAML grammars name equivalent constructs differently, so every
//! predicate takes the document type. None of them fail: a node of the wrong
//! shape simply answers `false` or `None`.

use crate::document::node::NodeRef;
use crate::document::DocumentType;

/// Default size above which a node is considered too coarse to be the most
/// specific match at a position.
pub const DEFAULT_LARGE_NODE_THRESHOLD: usize = 200;

const YAML_PAIRS: &[&str] = &["block_mapping_pair", "flow_pair"];
const YAML_MAPPINGS: &[&str] = &["block_mapping", "flow_mapping"];
const YAML_SEQUENCES: &[&str] = &["block_sequence", "flow_sequence"];
const YAML_SCALARS: &[&str] = &[
    "plain_scalar",
    "double_quote_scalar",
    "single_quote_scalar",
    "block_scalar",
    "string_scalar",
    "integer_scalar",
    "float_scalar",
    "boolean_scalar",
    "null_scalar",
];
const JSON_SCALARS: &[&str] = &["string", "string_content", "number", "true", "false", "null"];

/// Kinds of YAML value wrappers that may carry a tag such as `!Ref`.
const YAML_TAGGABLE: &[&str] = &["block_node", "flow_node"];

pub fn is_pair_node(node: &NodeRef, document_type: DocumentType) -> bool {
    match document_type {
        DocumentType::Json => node.kind() == "pair",
        DocumentType::Yaml => YAML_PAIRS.contains(&node.kind()),
    }
}

pub fn is_mapping_node(node: &NodeRef, document_type: DocumentType) -> bool {
    match document_type {
        DocumentType::Json => node.kind() == "object",
        DocumentType::Yaml => YAML_MAPPINGS.contains(&node.kind()),
    }
}

pub fn is_sequence_node(node: &NodeRef, document_type: DocumentType) -> bool {
    match document_type {
        DocumentType::Json => node.kind() == "array",
        DocumentType::Yaml => YAML_SEQUENCES.contains(&node.kind()),
    }
}

/// Whether `node` is one element of a sequence.
///
/// JSON array elements are the array's named, non-comment children. In YAML
/// only block sequence items count; entries of a flow sequence (`[a, b]`) are
/// transparent.
pub fn is_sequence_item_node(node: &NodeRef, document_type: DocumentType) -> bool {
    match document_type {
        DocumentType::Json => {
            node.is_named()
                && node.kind() != "comment"
                && node.parent().is_some_and(|parent| parent.kind() == "array")
        }
        DocumentType::Yaml => node.kind() == "block_sequence_item",
    }
}

/// Zero-based index of a sequence item among its sibling items.
pub fn sequence_index(node: &NodeRef, document_type: DocumentType) -> Option<usize> {
    if !is_sequence_item_node(node, document_type) {
        return None;
    }
    let index = match document_type {
        DocumentType::Json => node
            .preceding_siblings()
            .filter(|sibling| sibling.is_named() && sibling.kind() != "comment")
            .count(),
        DocumentType::Yaml => node
            .preceding_siblings()
            .filter(|sibling| sibling.kind() == "block_sequence_item")
            .count(),
    };
    Some(index)
}

pub fn is_scalar_node(node: &NodeRef, document_type: DocumentType) -> bool {
    match document_type {
        DocumentType::Json => JSON_SCALARS.contains(&node.kind()),
        DocumentType::Yaml => YAML_SCALARS.contains(&node.kind()),
    }
}

/// Syntactically well formed: not an error, not invented by recovery, and
/// containing neither.
pub fn is_valid_node(node: &NodeRef) -> bool {
    !node_has_error(node)
}

/// Whether the node or anything below it is an error or missing token.
pub fn node_has_error(node: &NodeRef) -> bool {
    node.is_error() || node.is_missing() || node.has_error()
}

/// Whether `node` or any of its ancestors is an `ERROR` node, or the node
/// itself carries errors.
pub fn in_error_context(node: &NodeRef) -> bool {
    node_has_error(node) || node.ancestors().any(|ancestor| ancestor.is_error())
}

/// Whether the node's text is longer than `limit` characters.
pub fn is_large_node(node: &NodeRef, limit: usize) -> bool {
    node.span_len() > limit && node.text().chars().count() > limit
}

/// The key text of a pair, with surrounding quotes removed.
pub fn extract_key_from_pair(node: &NodeRef, document_type: DocumentType) -> Option<String> {
    if !is_pair_node(node, document_type) {
        return None;
    }
    let key = node
        .child_by_field_name("key")
        .or_else(|| node.named_children().find(|child| child.kind() != "comment"))?;
    Some(key_text(&key))
}

/// The value node of a pair, if one was written.
pub fn extract_value_from_pair(node: &NodeRef, document_type: DocumentType) -> Option<NodeRef> {
    if !is_pair_node(node, document_type) {
        return None;
    }
    node.child_by_field_name("value")
}

/// Text of a key node: the scalar inside a YAML wrapper, unquoted.
pub fn key_text(key: &NodeRef) -> String {
    let scalar = key
        .named_children()
        .find(|child| !matches!(child.kind(), "tag" | "anchor" | "comment"))
        .filter(|_| YAML_TAGGABLE.contains(&key.kind()));
    let text = match &scalar {
        Some(scalar) => scalar.text(),
        None => key.text(),
    };
    unquote(text.trim()).to_string()
}

/// The raw tag (`!Ref`, `!If`, ...) attached to a YAML value wrapper.
pub fn tag_of(node: &NodeRef) -> Option<&str> {
    if !YAML_TAGGABLE.contains(&node.kind()) {
        return None;
    }
    node.children()
        .find(|child| child.kind() == "tag")
        .map(|tag| node.arena().source()[tag.start_byte()..tag.end_byte()].trim())
}

/// The first mapping directly under a value node, looking through YAML's
/// `block_node`/`flow_node` wrappers.
pub fn mapping_of(node: &NodeRef, document_type: DocumentType) -> Option<NodeRef> {
    if is_mapping_node(node, document_type) {
        return Some(node.clone());
    }
    node.named_children()
        .find(|child| is_mapping_node(child, document_type))
}

/// The first sequence directly under a value node.
pub fn sequence_of(node: &NodeRef, document_type: DocumentType) -> Option<NodeRef> {
    if is_sequence_node(node, document_type) {
        return Some(node.clone());
    }
    node.named_children()
        .find(|child| is_sequence_node(child, document_type))
}

/// Strips one pair of matching quotes, or a dangling opening quote.
pub fn unquote(text: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = text.strip_prefix(quote) {
            return inner.strip_suffix(quote).unwrap_or(inner);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::node::NodeArena;
    use crate::document::parser::parse;
    use crate::resolve::traverse::{traverse, TraverseOptions};

    fn root(document_type: DocumentType, text: &str) -> NodeRef {
        let tree = parse(document_type, text, None).unwrap();
        NodeArena::build(document_type, text.into(), &tree).root()
    }

    fn find(root: &NodeRef, pred: impl Fn(&NodeRef) -> bool) -> Vec<NodeRef> {
        traverse(root, pred, TraverseOptions::default())
    }

    #[test]
    fn test_json_pairs_and_keys() {
        let root = root(DocumentType::Json, r#"{"Resources": {"Bucket": 1}}"#);
        let pairs = find(&root, |n| is_pair_node(n, DocumentType::Json));

        assert_eq!(pairs.len(), 2);
        assert_eq!(
            extract_key_from_pair(&pairs[0], DocumentType::Json).as_deref(),
            Some("Resources")
        );
        let value = extract_value_from_pair(&pairs[1], DocumentType::Json).unwrap();
        assert_eq!(value.kind(), "number");
        assert!(is_scalar_node(&value, DocumentType::Json));
    }

    #[test]
    fn test_yaml_pairs_and_keys() {
        let root = root(DocumentType::Yaml, "Resources:\n  'Bucket': 1\n");
        let pairs = find(&root, |n| is_pair_node(n, DocumentType::Yaml));

        let keys: Vec<_> = pairs
            .iter()
            .filter_map(|p| extract_key_from_pair(p, DocumentType::Yaml))
            .collect();
        assert_eq!(keys, vec!["Resources", "Bucket"]);
    }

    #[test]
    fn test_json_sequence_indices_skip_punctuation() {
        let root = root(DocumentType::Json, r#"[10, "x", {"a": 1}]"#);
        let items = find(&root, |n| is_sequence_item_node(n, DocumentType::Json));

        let indices: Vec<_> = items
            .iter()
            .map(|n| sequence_index(n, DocumentType::Json).unwrap())
            .collect();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn test_yaml_block_items_are_indexed_flow_items_are_not() {
        let root = root(DocumentType::Yaml, "- a\n- [b, c]\n- d\n");
        let items = find(&root, |n| is_sequence_item_node(n, DocumentType::Yaml));

        assert_eq!(items.len(), 3);
        assert_eq!(sequence_index(&items[2], DocumentType::Yaml), Some(2));
        let flow_entries = find(&root, |n| {
            n.parent().is_some_and(|p| p.kind() == "flow_sequence") && n.is_named()
        });
        assert!(flow_entries
            .iter()
            .all(|n| !is_sequence_item_node(n, DocumentType::Yaml)));
    }

    #[test]
    fn test_tags() {
        let root = root(DocumentType::Yaml, "A: !Ref B\n");
        let tagged = find(&root, |n| tag_of(n).is_some());
        assert_eq!(tagged.len(), 1);
        assert_eq!(tag_of(&tagged[0]), Some("!Ref"));
    }

    #[test]
    fn test_error_detection() {
        let broken = root(DocumentType::Json, r#"{"a": }"#);
        assert!(node_has_error(&broken));
        assert!(!is_valid_node(&broken));

        let clean = root(DocumentType::Json, r#"{"a": 1}"#);
        assert!(is_valid_node(&clean));
    }

    #[test]
    fn test_large_node() {
        let text = format!("{{\"a\": \"{}\"}}", "x".repeat(300));
        let root = root(DocumentType::Json, &text);
        assert!(is_large_node(&root, DEFAULT_LARGE_NODE_THRESHOLD));
        assert!(!is_large_node(&root, 1_000));
    }

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"Name\""), "Name");
        assert_eq!(unquote("'Name'"), "Name");
        assert_eq!(unquote("\"Buck"), "Buck");
        assert_eq!(unquote("Name"), "Name");
    }
}
