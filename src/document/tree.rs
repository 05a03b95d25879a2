//! The per-document syntax tree.
//!
//! A `SyntaxTree` owns the current text of one document together with its
//! grammar tree, and answers position and path queries against it. Edits are
//! applied incrementally: the old tree is told about the edit and handed to
//! the parser, which reuses every subtree the edit did not touch.
//!
//! The node arena and line index are derived from the current version on
//! first use and dropped on every edit, so queries never see stale offsets.
//!
//! # Example
//!
//! ```
//! use cfnpath::config::Config;
//! use cfnpath::document::position::Position;
//! use cfnpath::{DocumentType, PathSegment, SyntaxTree};
//!
//! let mut tree = SyntaxTree::new(
//!     "Resources:\n  Bucket:\n    Type: x\n",
//!     DocumentType::Yaml,
//!     Config::default(),
//! )
//! .unwrap();
//!
//! // Rename `Bucket` to `Queue`
//! tree.update("Queue", Position::new(1, 2), Position::new(1, 8)).unwrap();
//! assert_eq!(tree.content(), "Resources:\n  Queue:\n    Type: x\n");
//!
//! let found = tree.node_by_path(&["Resources".into(), PathSegment::from("Queue")]);
//! assert!(found.fully_resolved);
//! ```

use std::sync::{Arc, OnceLock};

use indexmap::IndexMap;
use tree_sitter::{InputEdit, Tree};

use super::node::{NodeArena, NodeRef, SyntaxNode};
use super::parser::{apply_change, parse, validate_edit, TextChange};
use super::position::{LineIndex, Position};
use super::DocumentType;
use crate::config::Config;
use crate::error::SyntaxError;
use crate::resolve::locate::Locator;
use crate::resolve::path::{self, NodeByPath, PathAndEntity, PathSegment};
use crate::resolve::sections::{self, TopLevelSection};

/// One parsed document.
///
/// A tree is either live or, after [`cleanup`](Self::cleanup), gone: cleanup
/// consumes it, so a disposed tree cannot be queried.
pub struct SyntaxTree {
    document_type: DocumentType,
    content: Arc<str>,
    tree: Tree,
    config: Config,
    version: u64,
    arena: OnceLock<Arc<NodeArena>>,
    lines: OnceLock<LineIndex>,
}

impl SyntaxTree {
    /// Parses `content` as a new document.
    pub fn new(
        content: impl Into<String>,
        document_type: DocumentType,
        config: Config,
    ) -> Result<Self, SyntaxError> {
        let content: String = content.into();
        let tree = parse(document_type, &content, None)?;
        tracing::debug!(
            "Parsed {} document ({} bytes, errors: {})",
            document_type,
            content.len(),
            tree.root_node().has_error()
        );

        Ok(Self {
            document_type,
            content: content.into(),
            tree,
            config,
            version: 0,
            arena: OnceLock::new(),
            lines: OnceLock::new(),
        })
    }

    pub fn document_type(&self) -> DocumentType {
        self.document_type
    }

    /// Number of edits applied since the tree was created.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The current full text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the grammar had to recover from errors anywhere in the text.
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    pub fn lines(&self) -> &LineIndex {
        self.lines.get_or_init(|| LineIndex::new(&self.content))
    }

    /// Text of line `row` without its terminator.
    pub fn line(&self, row: usize) -> &str {
        self.lines().line(&self.content, row)
    }

    /// The root node of the current version.
    ///
    /// The first call after an edit lowers the whole grammar tree into a new
    /// arena, which is linear in document size (well under a millisecond at a
    /// few thousand lines). Later calls share that arena. Speculative
    /// re-parses pay the same cost again for their own buffer.
    pub fn root(&self) -> NodeRef {
        self.arena
            .get_or_init(|| NodeArena::build(self.document_type, Arc::clone(&self.content), &self.tree))
            .root()
    }

    /// Applies an edit described by `edit` and adopts `new_text`.
    ///
    /// The grammar tree is re-parsed incrementally; if that fails the text is
    /// parsed from scratch. A tree full of errors afterwards is normal.
    pub fn update_with_edit(
        &mut self,
        new_text: impl Into<String>,
        edit: InputEdit,
    ) -> Result<(), SyntaxError> {
        let new_text: String = new_text.into();
        validate_edit(&edit, self.content.len(), new_text.len())?;

        let mut old = self.tree.clone();
        old.edit(&edit);
        let tree = match parse(self.document_type, &new_text, Some(&old)) {
            Ok(tree) => tree,
            Err(err) => {
                tracing::debug!("Incremental parse failed ({}), parsing from scratch", err);
                parse(self.document_type, &new_text, None)?
            }
        };

        self.install(new_text, tree);
        tracing::trace!(
            "Applied edit at {}:{} (version {})",
            edit.start_position.row,
            edit.start_position.column,
            self.version
        );
        Ok(())
    }

    /// Replaces the text between `start` and `end` with `inserted`.
    pub fn update(
        &mut self,
        inserted: impl Into<String>,
        start: Position,
        end: Position,
    ) -> Result<(), SyntaxError> {
        let change = TextChange::new(start, end, inserted);
        let (new_text, edit) = apply_change(&self.content, self.lines(), &change)?;
        self.update_with_edit(new_text, edit)
    }

    /// Replaces the whole text and parses it from scratch.
    pub fn replace(&mut self, content: impl Into<String>) -> Result<(), SyntaxError> {
        let content: String = content.into();
        let tree = parse(self.document_type, &content, None)?;
        self.install(content, tree);
        Ok(())
    }

    fn install(&mut self, content: String, tree: Tree) {
        self.content = content.into();
        self.tree = tree;
        self.version += 1;
        self.arena = OnceLock::new();
        self.lines = OnceLock::new();
    }

    /// The node at `position`: a real node, or a synthetic placeholder where
    /// the user has not typed anything yet.
    ///
    /// Positions past the end of a line or of the document are clamped.
    pub fn node_at_position(&self, position: Position) -> SyntaxNode {
        let point = self.lines().point_for(&self.content, position);
        let root = self.root();
        let locator = Locator {
            root: &root,
            content: &self.content,
            lines: self.lines(),
            document_type: self.document_type,
            config: &self.config,
        };
        locator.node_at(point)
    }

    /// The property path, visited nodes and entity root of `node`.
    pub fn path_and_entity_info(&self, node: &SyntaxNode) -> PathAndEntity {
        path::path_and_entity_info(node, self.document_type, &self.config)
    }

    /// The node at `position` together with its path information.
    pub fn context_at(&self, position: Position) -> (SyntaxNode, PathAndEntity) {
        let node = self.node_at_position(position);
        let info = self.path_and_entity_info(&node);
        (node, info)
    }

    /// The node at `segments`, or the deepest node along it.
    pub fn node_by_path(&self, segments: &[PathSegment]) -> NodeByPath {
        path::node_by_path(&self.root(), self.document_type, segments, self.config.max_depth)
    }

    /// The pair nodes of the requested top-level sections that are present.
    pub fn find_top_level_sections(
        &self,
        sections: &[TopLevelSection],
    ) -> IndexMap<TopLevelSection, NodeRef> {
        sections::find_top_level_sections(&self.root(), self.document_type, sections, self.config.max_depth)
    }

    /// Releases the tree.
    ///
    /// Nodes handed out earlier stay readable: they keep their own version of
    /// the document alive until they are dropped.
    pub fn cleanup(self) {
        tracing::debug!(
            "Disposing {} syntax tree at version {}",
            self.document_type,
            self.version
        );
    }
}

impl std::fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("document_type", &self.document_type)
            .field("version", &self.version)
            .field("len", &self.content.len())
            .finish_non_exhaustive()
    }
}
