//! Property paths: from a node up to the document root, and back down.
//!
//! A property path lists the keys and sequence indices leading from the
//! document root to a location, with YAML shorthand intrinsics (`!If`,
//! `!Sub`, ...) folded in under their canonical names. Both directions use the
//! same per-node rule (`segment_for`), so a path read off a node always leads
//! back to it:
//!
//! - a pair contributes its key,
//! - a sequence item contributes its index,
//! - a YAML value carrying a recognised intrinsic tag contributes the
//!   function name.

use std::fmt;
use std::ops::ControlFlow;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::document::node::{NodeRef, SyntaxNode};
use crate::document::DocumentType;
use crate::resolve::classify::{extract_key_from_pair, is_pair_node, sequence_index, tag_of};
use crate::resolve::intrinsics::intrinsic_for_tag;
use crate::resolve::structure::{find_context_pairs_for_position, PairInfo};
use crate::resolve::synthetic::SyntheticKind;
use crate::resolve::traverse::{traverse_with_context, TraverseOptions};

/// One step of a property path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// A mapping key or a canonical intrinsic function name.
    Key(String),
    /// A sequence index.
    Index(usize),
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }

    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathSegment::Key(_) => None,
            PathSegment::Index(index) => Some(*index),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Key(key) => f.write_str(key),
            PathSegment::Index(index) => write!(f, "[{index}]"),
        }
    }
}

/// An ordered, root-to-target list of path segments. Empty means the
/// document root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyPath {
    pub segments: Vec<PathSegment>,
}

impl PropertyPath {
    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PathSegment> {
        self.segments.iter()
    }

    /// Number of key segments (keys and intrinsic names).
    pub fn key_count(&self) -> usize {
        self.segments.iter().filter(|s| s.as_key().is_some()).count()
    }

    pub fn starts_with(&self, prefix: &[PathSegment]) -> bool {
        self.segments.starts_with(prefix)
    }
}

impl From<Vec<PathSegment>> for PropertyPath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self::new(segments)
    }
}

/// Renders `Resources.Bucket.Properties.Tags[0].Key`.
impl fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 && matches!(segment, PathSegment::Key(_)) {
                f.write_str(".")?;
            }
            write!(f, "{segment}")?;
        }
        Ok(())
    }
}

/// Where a node sits in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct PathAndEntity {
    /// Real nodes visited, root first.
    pub path: Vec<NodeRef>,
    pub property_path: PropertyPath,
    /// The node holding the complete definition (one resource, one
    /// parameter, ...) that encloses the target.
    pub entity_root: Option<NodeRef>,
    /// Whether the result came from indentation rather than the grammar tree.
    pub structural: bool,
}

impl PathAndEntity {
    /// Source text of the entity root.
    pub fn entity_text(&self) -> Option<&str> {
        self.entity_root.as_ref().map(NodeRef::text)
    }
}

/// Result of looking a path up in a tree.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeByPath {
    /// The node matching the longest prefix of the requested path; the root
    /// when nothing matched.
    pub node: NodeRef,
    pub fully_resolved: bool,
    /// How many leading segments matched.
    pub matched: usize,
}

/// The segment `node` contributes to a property path, if any.
pub fn segment_for(node: &NodeRef, document_type: DocumentType) -> Option<PathSegment> {
    if is_pair_node(node, document_type) {
        return extract_key_from_pair(node, document_type).map(PathSegment::Key);
    }
    if let Some(index) = sequence_index(node, document_type) {
        return Some(PathSegment::Index(index));
    }
    if document_type == DocumentType::Yaml {
        return tag_of(node)
            .and_then(intrinsic_for_tag)
            .map(PathSegment::Key);
    }
    None
}

#[derive(Default)]
struct Walk {
    nodes: Vec<NodeRef>,
    segments: Vec<PathSegment>,
    entities: Vec<NodeRef>,
    crossed_error: bool,
}

fn walk_to_root(start: &SyntaxNode, document_type: DocumentType, max_depth: usize) -> Walk {
    let mut walk = Walk::default();
    let mut current = match start {
        SyntaxNode::Real(node) => Some(node.clone()),
        SyntaxNode::Synthetic(node) => {
            if node.kind() == SyntheticKind::Key {
                walk.segments.push(PathSegment::Key(node.text().to_string()));
            }
            node.anchor().cloned()
        }
    };

    while let Some(node) = current {
        if walk.segments.len() > max_depth {
            tracing::trace!("Path walk stopped at depth cap {}", max_depth);
            break;
        }
        if node.is_error() {
            walk.crossed_error = true;
        }
        if let Some(segment) = segment_for(&node, document_type) {
            walk.segments.push(segment);
        }
        if is_pair_node(&node, document_type) {
            walk.entities.push(node.clone());
        }
        current = node.parent();
        walk.nodes.push(node);
    }

    walk.nodes.reverse();
    walk.segments.reverse();
    walk.entities.reverse();
    walk
}

/// Picks the entity root from the recorded pairs, outermost first.
///
/// One recorded pair is the entity. When the path holds a single key the
/// target is a top-level section and the section itself is returned.
/// Otherwise the second pair is the entity: the first is the section
/// (`Resources`), the second its definition (`Resources.MyBucket`).
pub fn choose_entity_root(entities: &[NodeRef], property_path: &PropertyPath) -> Option<NodeRef> {
    match entities {
        [] => None,
        [only] => Some(only.clone()),
        [outermost, ..] if property_path.key_count() == 1 => Some(outermost.clone()),
        [_, second, ..] => Some(second.clone()),
    }
}

/// Resolves the property path and entity root of `node`.
///
/// For YAML, an empty grammar path, or a walk through an `ERROR` node that
/// the indentation chain explains better, is replaced by the indentation
/// chain (see [`crate::resolve::structure`]). An empty JSON path is the
/// document root and is kept.
pub fn path_and_entity_info(
    node: &SyntaxNode,
    document_type: DocumentType,
    config: &Config,
) -> PathAndEntity {
    let walk = walk_to_root(node, document_type, config.max_depth);
    let property_path = PropertyPath::new(walk.segments);
    let entity_root = choose_entity_root(&walk.entities, &property_path);
    let grammar = PathAndEntity {
        path: walk.nodes,
        property_path,
        entity_root,
        structural: false,
    };

    if document_type != DocumentType::Yaml || !config.structural_fallback {
        return grammar;
    }
    if !grammar.property_path.is_empty() && !walk.crossed_error {
        return grammar;
    }
    let Some(root) = grammar.path.first().cloned().or_else(|| node.parent()) else {
        return grammar;
    };
    let root = root.ancestors().last().unwrap_or(root);

    let chain = find_context_pairs_for_position(&root, node.start(), document_type, config.max_depth);
    if grammar.property_path.is_empty() || chain.len() > grammar.property_path.len() {
        tracing::debug!(
            "Using indentation-based path at {}:{} ({} pairs)",
            node.start().row,
            node.start().column,
            chain.len()
        );
        return structural_path(chain);
    }
    grammar
}

fn structural_path(chain: Vec<PairInfo>) -> PathAndEntity {
    let property_path = PropertyPath::new(
        chain
            .iter()
            .map(|pair| PathSegment::Key(pair.key.clone()))
            .collect(),
    );
    let nodes: Vec<NodeRef> = chain.into_iter().map(|pair| pair.node).collect();
    let entity_root = choose_entity_root(&nodes, &property_path);
    PathAndEntity {
        path: nodes,
        property_path,
        entity_root,
        structural: true,
    }
}

/// The property path of every node on the way down, kept only while it can
/// still extend into `segments`.
fn common_prefix(path: &[PathSegment], segments: &[PathSegment]) -> usize {
    path.iter()
        .zip(segments)
        .take_while(|(a, b)| a == b)
        .count()
}

/// Finds the node whose property path matches `segments`.
///
/// Every node's path is built on the way down with the same rule used by
/// [`path_and_entity_info`]. The node with the longest common prefix wins,
/// the earliest visited on ties, and the walk stops at the first exact match.
pub fn node_by_path(
    root: &NodeRef,
    document_type: DocumentType,
    segments: &[PathSegment],
    max_depth: usize,
) -> NodeByPath {
    let mut best = NodeByPath {
        node: root.clone(),
        fully_resolved: false,
        matched: 0,
    };

    traverse_with_context(
        root,
        Vec::new(),
        |child, parent_path: &Vec<PathSegment>| {
            let mut path = parent_path.clone();
            path.extend(segment_for(child, document_type));
            path
        },
        |node, path| {
            let matched = common_prefix(path, segments);
            if matched == segments.len() && path.len() == segments.len() {
                best = NodeByPath {
                    node: node.clone(),
                    fully_resolved: true,
                    matched,
                };
                return ControlFlow::Break(());
            }
            if matched > best.matched {
                best = NodeByPath {
                    node: node.clone(),
                    fully_resolved: false,
                    matched,
                };
            }
            ControlFlow::Continue(())
        },
        TraverseOptions::default().with_max_depth(max_depth),
    );

    best
}
