//! Position resolution for JSON and YAML infrastructure templates.
//!
//! `cfnpath` keeps one tolerant, incrementally re-parsed syntax tree per open
//! document and answers "which entity and property path does this character
//! belong to?", even while the buffer is syntactically broken.
//!
//! # Example
//!
//! ```
//! use cfnpath::document::position::Position;
//! use cfnpath::manager::TreeManager;
//!
//! let mut manager = TreeManager::default();
//! manager
//!     .add("file:///stack.yaml", "Resources:\n  Bucket:\n    Type: AWS::S3::Bucket\n")
//!     .unwrap();
//!
//! let tree = manager.get_syntax_tree("file:///stack.yaml").unwrap();
//! let (_node, info) = tree.context_at(Position::new(2, 12));
//! assert_eq!(info.property_path.to_string(), "Resources.Bucket.Type");
//! ```

pub mod config;
pub mod document;
pub mod error;
pub mod manager;
pub mod resolve;

pub use document::tree::SyntaxTree;
pub use document::DocumentType;
pub use error::SyntaxError;
pub use manager::TreeManager;
pub use resolve::path::{PathAndEntity, PathSegment, PropertyPath};
