//! Position and path resolution over syntax trees.
//!
//! # Modules
//!
//! - `classify`: grammar-aware node predicates (pairs, items, scalars, errors)
//! - `search`: most-specific and nearby node search around a point
//! - `traverse`: depth-bounded walks, with or without propagated context
//! - `structure`: indentation-based pair indexing for broken YAML
//! - `intrinsics`: shorthand intrinsic tag normalisation
//! - `synthetic`: placeholder nodes for locations with no text yet
//! - `locate`: cursor position to node
//! - `path`: node to property path and entity root, and back
//! - `sections`: top-level template sections

pub mod classify;
pub mod intrinsics;
pub mod locate;
pub mod path;
pub mod search;
pub mod sections;
pub mod structure;
pub mod synthetic;
pub mod traverse;

mod speculative;
