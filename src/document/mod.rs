//! Document model: grammar selection, positions, nodes and syntax trees.
//!
//! # Modules
//!
//! - `position`: LSP-style positions and the per-version line index
//! - `node`: the immutable node arena and the real/synthetic node handle
//! - `parser`: grammar singletons, parsing and edit descriptors
//! - `tree`: the per-document `SyntaxTree`

pub mod node;
pub mod parser;
pub mod position;
pub mod tree;

use std::fmt;
use std::path::Path;

/// The syntax a document is written in.
///
/// Fixed for the lifetime of a document; it selects both the grammar and the
/// position-resolution strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentType {
    Json,
    Yaml,
}

impl DocumentType {
    /// Detects the document type from a URI and its content.
    ///
    /// A `.json`, `.yaml` or `.yml` extension decides outright. Otherwise the
    /// content is sniffed: a leading `{` or `[` (after whitespace) means JSON,
    /// anything else is treated as YAML.
    ///
    /// # Example
    ///
    /// ```
    /// use cfnpath::DocumentType;
    ///
    /// assert_eq!(DocumentType::detect("file:///a.yml", "{}"), DocumentType::Yaml);
    /// assert_eq!(DocumentType::detect("untitled:1", "  {\"a\": 1}"), DocumentType::Json);
    /// assert_eq!(DocumentType::detect("untitled:2", "a: 1"), DocumentType::Yaml);
    /// ```
    pub fn detect(uri: &str, content: &str) -> Self {
        Self::from_extension(uri).unwrap_or_else(|| Self::sniff(content))
    }

    /// Maps a file extension to a document type, if it is a known one.
    pub fn from_extension(uri: &str) -> Option<Self> {
        let extension = Path::new(uri).extension()?.to_str()?;
        match extension.to_ascii_lowercase().as_str() {
            "json" => Some(DocumentType::Json),
            "yaml" | "yml" => Some(DocumentType::Yaml),
            _ => None,
        }
    }

    /// Guesses the document type from its first non-whitespace character.
    pub fn sniff(content: &str) -> Self {
        match content.trim_start().chars().next() {
            Some('{') | Some('[') => DocumentType::Json,
            _ => DocumentType::Yaml,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Json => "JSON",
            DocumentType::Yaml => "YAML",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
