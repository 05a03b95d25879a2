//! Syntax node representation.
//!
//! A grammar tree borrows from its parser output and cannot outlive it, which
//! makes it awkward to hand nodes from a throwaway re-parse back to callers.
//! Each parsed version is therefore lowered once into a `NodeArena`: a flat,
//! immutable copy of the tree (kinds, flags, ranges, parent/child links) that
//! owns its source text. Arenas are shared through `Arc`, so a `NodeRef` is a
//! cheap owned handle that keeps its tree alive.
//!
//! `SyntaxNode` is what position resolution hands out: either a real node or
//! a synthetic placeholder for a location that has no text yet.
//!
//! # Example
//!
//! ```
//! use cfnpath::document::node::NodeArena;
//! use cfnpath::document::parser::parse;
//! use cfnpath::DocumentType;
//!
//! let text = r#"{"Resources": {}}"#;
//! let tree = parse(DocumentType::Json, text, None).unwrap();
//! let arena = NodeArena::build(DocumentType::Json, text.into(), &tree);
//!
//! let root = arena.root();
//! assert_eq!(root.kind(), "document");
//! assert_eq!(root.named_children().next().unwrap().kind(), "object");
//! ```

use std::fmt;
use std::sync::Arc;

use tree_sitter::{Point, Tree};

use super::DocumentType;
use crate::resolve::synthetic::{SyntheticKind, SyntheticNode};

/// Index of a node inside its arena.
pub type NodeId = usize;

#[derive(Debug, Clone)]
struct NodeData {
    kind: &'static str,
    field: Option<&'static str>,
    named: bool,
    error: bool,
    missing: bool,
    has_error: bool,
    start_byte: usize,
    end_byte: usize,
    start: Point,
    end: Point,
    parent: Option<NodeId>,
    index_in_parent: usize,
    children: Vec<NodeId>,
}

/// An immutable, lowered copy of one parsed document version.
#[derive(Debug)]
pub struct NodeArena {
    document_type: DocumentType,
    source: Arc<str>,
    nodes: Vec<NodeData>,
}

impl NodeArena {
    /// Lowers a grammar tree into an arena.
    ///
    /// The walk is iterative, so arbitrarily deep documents cannot overflow
    /// the stack here.
    pub fn build(document_type: DocumentType, source: Arc<str>, tree: &Tree) -> Arc<Self> {
        let mut nodes: Vec<NodeData> = Vec::new();
        let mut parents: Vec<NodeId> = Vec::new();
        let mut cursor = tree.walk();

        loop {
            let node = cursor.node();
            let id = nodes.len();
            let parent = parents.last().copied();
            let index_in_parent = match parent {
                Some(p) => {
                    nodes[p].children.push(id);
                    nodes[p].children.len() - 1
                }
                None => 0,
            };
            nodes.push(NodeData {
                kind: node.kind(),
                field: cursor.field_name(),
                named: node.is_named(),
                error: node.is_error(),
                missing: node.is_missing(),
                has_error: node.has_error(),
                start_byte: node.start_byte(),
                end_byte: node.end_byte(),
                start: node.start_position(),
                end: node.end_position(),
                parent,
                index_in_parent,
                children: Vec::with_capacity(node.child_count()),
            });

            if cursor.goto_first_child() {
                parents.push(id);
                continue;
            }
            loop {
                if cursor.goto_next_sibling() {
                    break;
                }
                if !cursor.goto_parent() {
                    return Arc::new(Self {
                        document_type,
                        source,
                        nodes,
                    });
                }
                parents.pop();
            }
        }
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// The root node. The grammar always produces one.
    pub fn root(self: &Arc<Self>) -> NodeRef {
        NodeRef {
            arena: Arc::clone(self),
            id: 0,
        }
    }
}

/// A handle to one real node produced by the grammar.
#[derive(Clone)]
pub struct NodeRef {
    arena: Arc<NodeArena>,
    id: NodeId,
}

impl NodeRef {
    fn data(&self) -> &NodeData {
        &self.arena.nodes[self.id]
    }

    fn sibling(&self, id: NodeId) -> NodeRef {
        NodeRef {
            arena: Arc::clone(&self.arena),
            id,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn arena(&self) -> &Arc<NodeArena> {
        &self.arena
    }

    pub fn document_type(&self) -> DocumentType {
        self.arena.document_type
    }

    pub fn kind(&self) -> &'static str {
        self.data().kind
    }

    /// The grammar field this node occupies in its parent (`key`, `value`, ...).
    pub fn field_name(&self) -> Option<&'static str> {
        self.data().field
    }

    pub fn is_named(&self) -> bool {
        self.data().named
    }

    /// True for `ERROR` nodes inserted by grammar recovery.
    pub fn is_error(&self) -> bool {
        self.data().error
    }

    /// True for zero-width tokens the grammar invented to recover.
    pub fn is_missing(&self) -> bool {
        self.data().missing
    }

    /// True if this node or any descendant is an error or missing token.
    pub fn has_error(&self) -> bool {
        self.data().has_error
    }

    pub fn start(&self) -> Point {
        self.data().start
    }

    pub fn end(&self) -> Point {
        self.data().end
    }

    pub fn start_byte(&self) -> usize {
        self.data().start_byte
    }

    pub fn end_byte(&self) -> usize {
        self.data().end_byte
    }

    /// Length of the node's text in bytes.
    pub fn span_len(&self) -> usize {
        self.data().end_byte - self.data().start_byte
    }

    pub fn text(&self) -> &str {
        let data = self.data();
        self.arena
            .source
            .get(data.start_byte..data.end_byte)
            .unwrap_or_default()
    }

    /// Whether `point` lies within the node; both ends are inclusive so a
    /// cursor sitting right after a token still belongs to it.
    pub fn contains(&self, point: Point) -> bool {
        self.start() <= point && point <= self.end()
    }

    pub fn parent(&self) -> Option<NodeRef> {
        self.data().parent.map(|id| self.sibling(id))
    }

    /// This node followed by every ancestor up to the root.
    pub fn ancestors(&self) -> impl Iterator<Item = NodeRef> {
        std::iter::successors(Some(self.clone()), |node| node.parent())
    }

    pub fn child_count(&self) -> usize {
        self.data().children.len()
    }

    pub fn children(&self) -> impl DoubleEndedIterator<Item = NodeRef> + '_ {
        self.data().children.iter().map(|&id| self.sibling(id))
    }

    pub fn named_children(&self) -> impl DoubleEndedIterator<Item = NodeRef> + '_ {
        self.children().filter(NodeRef::is_named)
    }

    pub fn child_by_field_name(&self, field: &str) -> Option<NodeRef> {
        self.children().find(|child| child.field_name() == Some(field))
    }

    pub fn next_sibling(&self) -> Option<NodeRef> {
        let parent = self.data().parent?;
        let next = self.arena.nodes[parent]
            .children
            .get(self.data().index_in_parent + 1)?;
        Some(self.sibling(*next))
    }

    pub fn prev_sibling(&self) -> Option<NodeRef> {
        let parent = self.data().parent?;
        let index = self.data().index_in_parent.checked_sub(1)?;
        Some(self.sibling(self.arena.nodes[parent].children[index]))
    }

    /// Siblings that come before this node, nearest first.
    pub fn preceding_siblings(&self) -> impl Iterator<Item = NodeRef> {
        std::iter::successors(self.prev_sibling(), |node| node.prev_sibling())
    }

    pub fn next_named_sibling(&self) -> Option<NodeRef> {
        std::iter::successors(self.next_sibling(), |node| node.next_sibling())
            .find(NodeRef::is_named)
    }

    pub fn prev_named_sibling(&self) -> Option<NodeRef> {
        self.preceding_siblings().find(NodeRef::is_named)
    }

    /// Whether both handles point into the same parsed version.
    pub fn same_tree(&self, other: &NodeRef) -> bool {
        Arc::ptr_eq(&self.arena, &other.arena)
    }
}

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        self.same_tree(other) && self.id == other.id
    }
}

impl Eq for NodeRef {}

impl fmt::Debug for NodeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}:{} - {}:{}]",
            self.kind(),
            self.start().row,
            self.start().column,
            self.end().row,
            self.end().column
        )
    }
}

/// A resolved location: a real grammar node or a synthetic placeholder.
#[derive(Debug, Clone, PartialEq)]
pub enum SyntaxNode {
    Real(NodeRef),
    Synthetic(SyntheticNode),
}

impl SyntaxNode {
    pub fn kind(&self) -> &'static str {
        match self {
            SyntaxNode::Real(node) => node.kind(),
            SyntaxNode::Synthetic(node) => node.kind().as_str(),
        }
    }

    pub fn start(&self) -> Point {
        match self {
            SyntaxNode::Real(node) => node.start(),
            SyntaxNode::Synthetic(node) => node.start(),
        }
    }

    pub fn end(&self) -> Point {
        match self {
            SyntaxNode::Real(node) => node.end(),
            SyntaxNode::Synthetic(node) => node.end(),
        }
    }

    pub fn text(&self) -> &str {
        match self {
            SyntaxNode::Real(node) => node.text(),
            SyntaxNode::Synthetic(node) => node.text(),
        }
    }

    /// The parent of a real node, or the anchor a synthetic node hangs off.
    pub fn parent(&self) -> Option<NodeRef> {
        match self {
            SyntaxNode::Real(node) => node.parent(),
            SyntaxNode::Synthetic(node) => node.anchor().cloned(),
        }
    }

    pub fn as_real(&self) -> Option<&NodeRef> {
        match self {
            SyntaxNode::Real(node) => Some(node),
            SyntaxNode::Synthetic(_) => None,
        }
    }

    pub fn synthetic_kind(&self) -> Option<SyntheticKind> {
        match self {
            SyntaxNode::Real(_) => None,
            SyntaxNode::Synthetic(node) => Some(node.kind()),
        }
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self, SyntaxNode::Synthetic(_))
    }
}

impl From<NodeRef> for SyntaxNode {
    fn from(node: NodeRef) -> Self {
        SyntaxNode::Real(node)
    }
}
