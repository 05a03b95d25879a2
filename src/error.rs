//! Error types for syntax tree construction and editing.
//!
//! Broken documents are not errors: the grammars always produce a tree, with
//! parse failures embedded as ordinary nodes. The variants here cover the few
//! conditions a caller can actually act on.

use thiserror::Error;

use crate::document::DocumentType;

/// Errors raised while building or updating a [`SyntaxTree`](crate::SyntaxTree).
#[derive(Debug, Error)]
pub enum SyntaxError {
    /// The grammar could not be loaded into a parser.
    #[error("failed to load {document_type} grammar: {source}")]
    Language {
        document_type: DocumentType,
        #[source]
        source: tree_sitter::LanguageError,
    },

    /// The parser returned no tree at all.
    #[error("{document_type} parser produced no tree")]
    ParseFailed { document_type: DocumentType },

    /// An edit descriptor does not fit the current content.
    #[error("invalid edit: {reason}")]
    InvalidEdit { reason: String },

    /// No syntax tree is registered for the URI.
    #[error("no syntax tree registered for {uri}")]
    UnknownDocument { uri: String },
}

impl SyntaxError {
    pub(crate) fn invalid_edit(reason: impl Into<String>) -> Self {
        SyntaxError::InvalidEdit {
            reason: reason.into(),
        }
    }
}
