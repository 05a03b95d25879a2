//! Registry of open documents.
//!
//! The manager owns one [`SyntaxTree`] per document URI. Updates never
//! propagate failures: a rejected edit is logged and the previous version of
//! the document stays in place, so a bad change from the host degrades
//! resolution instead of breaking it.

use std::collections::HashMap;

use tree_sitter::InputEdit;

use crate::config::Config;
use crate::document::position::Position;
use crate::document::tree::SyntaxTree;
use crate::document::DocumentType;
use crate::error::SyntaxError;

#[derive(Debug, Default)]
pub struct TreeManager {
    trees: HashMap<String, SyntaxTree>,
    config: Config,
}

impl TreeManager {
    /// Creates a manager whose trees all use `config`.
    pub fn new(config: Config) -> Self {
        Self {
            trees: HashMap::new(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Parses and registers a document, detecting its type from the URI and
    /// content. Replaces any tree already registered for `uri`.
    pub fn add(&mut self, uri: impl Into<String>, content: &str) -> Result<(), SyntaxError> {
        let uri = uri.into();
        let document_type = DocumentType::detect(&uri, content);
        self.add_with_type(uri, content, document_type)
    }

    /// Parses and registers a document of a known type.
    pub fn add_with_type(
        &mut self,
        uri: impl Into<String>,
        content: &str,
        document_type: DocumentType,
    ) -> Result<(), SyntaxError> {
        let uri = uri.into();
        let tree = SyntaxTree::new(content, document_type, self.config.clone())?;
        tracing::debug!("Registered {} tree for {}", document_type, uri);
        if let Some(previous) = self.trees.insert(uri, tree) {
            previous.cleanup();
        }
        Ok(())
    }

    pub fn get_syntax_tree(&self, uri: &str) -> Option<&SyntaxTree> {
        self.trees.get(uri)
    }

    pub fn get_syntax_tree_mut(&mut self, uri: &str) -> Option<&mut SyntaxTree> {
        self.trees.get_mut(uri)
    }

    pub fn contains(&self, uri: &str) -> bool {
        self.trees.contains_key(uri)
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// URIs of every registered document, in no particular order.
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.trees.keys().map(String::as_str)
    }

    /// Replaces the text between `start` and `end` of a registered document.
    ///
    /// Failures are logged, not returned.
    pub fn update_syntax_tree(&mut self, uri: &str, inserted: &str, start: Position, end: Position) {
        let result = self
            .tree_for_update(uri)
            .and_then(|tree| tree.update(inserted, start, end));
        if let Err(err) = result {
            tracing::warn!("Failed to update syntax tree for {}: {}", uri, err);
        }
    }

    /// Applies an edit descriptor to a registered document.
    ///
    /// Failures are logged, not returned.
    pub fn update_with_edit(&mut self, uri: &str, new_text: &str, edit: InputEdit) {
        let result = self
            .tree_for_update(uri)
            .and_then(|tree| tree.update_with_edit(new_text, edit));
        if let Err(err) = result {
            tracing::warn!("Failed to apply edit to {}: {}", uri, err);
        }
    }

    /// Replaces the whole text of a registered document.
    ///
    /// Failures are logged, not returned.
    pub fn replace_content(&mut self, uri: &str, content: &str) {
        let result = self
            .tree_for_update(uri)
            .and_then(|tree| tree.replace(content));
        if let Err(err) = result {
            tracing::warn!("Failed to replace content of {}: {}", uri, err);
        }
    }

    fn tree_for_update(&mut self, uri: &str) -> Result<&mut SyntaxTree, SyntaxError> {
        self.trees
            .get_mut(uri)
            .ok_or_else(|| SyntaxError::UnknownDocument {
                uri: uri.to_string(),
            })
    }

    /// Unregisters and disposes the tree for `uri`. Returns whether one was
    /// registered.
    pub fn delete_syntax_tree(&mut self, uri: &str) -> bool {
        match self.trees.remove(uri) {
            Some(tree) => {
                tree.cleanup();
                true
            }
            None => false,
        }
    }

    /// Disposes every tree.
    pub fn delete_all_trees(&mut self) {
        let count = self.trees.len();
        for (_, tree) in self.trees.drain() {
            tree.cleanup();
        }
        tracing::debug!("Disposed {} syntax trees", count);
    }
}
