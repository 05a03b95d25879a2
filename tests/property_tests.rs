use cfnpath::config::Config;
use cfnpath::document::position::Position;
use cfnpath::resolve::classify::extract_key_from_pair;
use cfnpath::resolve::intrinsics::normalize_intrinsic;
use cfnpath::resolve::structure::find_context_pairs_for_position;
use cfnpath::{DocumentType, PathSegment, SyntaxTree};
use proptest::prelude::*;
use tree_sitter::Point;

/// Keys that cannot be mistaken for YAML scalars of another type.
fn key() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,6}[0-9]?"
}

/// Builds `k0:\n  k1:\n    k2: value\n` and the position of `value`.
fn nested_yaml(keys: &[String]) -> (String, Position) {
    let mut text = String::new();
    let last = keys.len() - 1;
    for (depth, key) in keys.iter().enumerate() {
        let indent = "  ".repeat(depth);
        if depth == last {
            text.push_str(&format!("{indent}{key}: value\n"));
        } else {
            text.push_str(&format!("{indent}{key}:\n"));
        }
    }
    let character = 2 * last + keys[last].len() + 3;
    (text, Position::new(last, character))
}

/// Builds `{"k0": {"k1": {"k2": "value"}}}` and the position of `value`.
fn nested_json(keys: &[String]) -> (String, Position) {
    let mut text = String::new();
    for key in keys {
        text.push_str(&format!("{{\"{key}\": "));
    }
    let character = text.len() + 2;
    text.push_str("\"value\"");
    text.push_str(&"}".repeat(keys.len()));
    (text, Position::new(0, character))
}

/// A random YAML mapping: each line is `key: value` or `key:` one level
/// deeper than or at most as deep as the previous line.
fn indented_yaml() -> impl Strategy<Value = String> {
    prop::collection::vec((0usize..4, key(), any::<bool>()), 1..12).prop_map(|lines| {
        let mut text = String::new();
        let mut max_depth = 0;
        for (depth, key, leaf) in lines {
            let depth = depth.min(max_depth);
            text.push_str(&"  ".repeat(depth));
            if leaf {
                text.push_str(&format!("{key}: 1\n"));
                max_depth = depth;
            } else {
                text.push_str(&format!("{key}:\n"));
                max_depth = depth + 1;
            }
        }
        text
    })
}

fn expected_path(keys: &[String]) -> Vec<PathSegment> {
    keys.iter().map(|key| PathSegment::from(key.as_str())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_entity_root_is_second_key_in_yaml(keys in prop::collection::vec(key(), 2..8)) {
        let (text, position) = nested_yaml(&keys);
        let tree = SyntaxTree::new(text, DocumentType::Yaml, Config::default()).unwrap();

        let (_, info) = tree.context_at(position);
        prop_assert_eq!(&info.property_path.segments, &expected_path(&keys));

        let entity = info.entity_root.unwrap();
        prop_assert_eq!(extract_key_from_pair(&entity, DocumentType::Yaml), Some(keys[1].clone()));
    }

    #[test]
    fn test_entity_root_is_second_key_in_json(keys in prop::collection::vec(key(), 2..8)) {
        let (text, position) = nested_json(&keys);
        let tree = SyntaxTree::new(text, DocumentType::Json, Config::default()).unwrap();

        let (_, info) = tree.context_at(position);
        prop_assert_eq!(&info.property_path.segments, &expected_path(&keys));

        let entity = info.entity_root.unwrap();
        prop_assert_eq!(extract_key_from_pair(&entity, DocumentType::Json), Some(keys[1].clone()));
    }

    #[test]
    fn test_single_key_is_its_own_entity(first in key()) {
        let (text, position) = nested_yaml(std::slice::from_ref(&first));
        let tree = SyntaxTree::new(text, DocumentType::Yaml, Config::default()).unwrap();

        let (_, info) = tree.context_at(position);
        let entity = info.entity_root.unwrap();
        prop_assert_eq!(extract_key_from_pair(&entity, DocumentType::Yaml), Some(first));
    }

    #[test]
    fn test_context_chain_indentation_increases(
        text in indented_yaml(),
        row in 0usize..14,
        column in 0usize..10,
    ) {
        let tree = SyntaxTree::new(text, DocumentType::Yaml, Config::default()).unwrap();
        let chain = find_context_pairs_for_position(
            &tree.root(),
            Point::new(row, column),
            DocumentType::Yaml,
            50,
        );

        for pair in &chain {
            prop_assert!(pair.indent_level < column);
        }
        for window in chain.windows(2) {
            prop_assert!(window[0].indent_level < window[1].indent_level);
        }
    }

    #[test]
    fn test_resolution_is_deterministic(
        text in indented_yaml(),
        line in 0usize..14,
        character in 0usize..20,
    ) {
        let tree = SyntaxTree::new(text, DocumentType::Yaml, Config::default()).unwrap();
        let position = Position::new(line, character);

        let (first_node, first) = tree.context_at(position);
        let (second_node, second) = tree.context_at(position);
        prop_assert_eq!(first_node.kind(), second_node.kind());
        prop_assert_eq!(first.property_path, second.property_path);
    }

    #[test]
    fn test_normalization_is_idempotent(tag in "!?[A-Za-z:]{0,12}") {
        let once = normalize_intrinsic(&tag);
        prop_assert_eq!(normalize_intrinsic(&once), once);
    }

    #[test]
    fn test_arbitrary_text_never_panics(
        text in "\\PC{0,80}",
        line in 0usize..4,
        character in 0usize..40,
    ) {
        for document_type in [DocumentType::Yaml, DocumentType::Json] {
            let tree = SyntaxTree::new(text.clone(), document_type, Config::default()).unwrap();
            let (node, info) = tree.context_at(Position::new(line, character));
            prop_assert!(!node.kind().is_empty());
            let _ = tree.node_by_path(&info.property_path.segments);
        }
    }
}
