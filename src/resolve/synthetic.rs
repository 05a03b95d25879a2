//! Placeholder nodes for cursor locations with no text yet.
//!
//! When the cursor hangs after `Key:` or sits on a blank line inside a
//! mapping there is no grammar node to return. A synthetic node stands in for
//! it: it has a position and (usually empty) text and borrows its ancestry
//! from an anchor node, so path resolution treats it like any other node. It
//! never feeds back into the tree.

use std::fmt;

use tree_sitter::Point;

use crate::document::node::{NodeRef, SyntaxNode};

/// What the user is expected to type at a synthetic location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntheticKind {
    /// A new key inside an existing mapping.
    Key,
    /// The value of an existing key.
    Value,
    /// Either a nested key or a value; the text so far cannot tell.
    KeyOrValue,
}

impl SyntheticKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyntheticKind::Key => "synthetic_key",
            SyntheticKind::Value => "synthetic_value",
            SyntheticKind::KeyOrValue => "synthetic_key_or_value",
        }
    }
}

impl fmt::Display for SyntheticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticNode {
    kind: SyntheticKind,
    text: String,
    start: Point,
    end: Point,
    anchor: Option<NodeRef>,
}

impl SyntheticNode {
    pub fn kind(&self) -> SyntheticKind {
        self.kind
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    /// The real node this placeholder hangs off.
    pub fn anchor(&self) -> Option<&NodeRef> {
        self.anchor.as_ref()
    }
}

/// Builds a synthetic node.
pub fn create_synthetic_node(
    text: impl Into<String>,
    start: Point,
    end: Point,
    kind: SyntheticKind,
    anchor: Option<NodeRef>,
) -> SyntaxNode {
    SyntaxNode::Synthetic(SyntheticNode {
        kind,
        text: text.into(),
        start,
        end,
        anchor,
    })
}

/// A zero-width synthetic node at `point`.
pub fn synthetic_at(point: Point, kind: SyntheticKind, anchor: NodeRef) -> SyntaxNode {
    create_synthetic_node(String::new(), point, point, kind, Some(anchor))
}
