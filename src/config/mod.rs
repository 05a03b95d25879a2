//! Configuration for position resolution.
//!
//! This module provides the tunables used by the syntax trees with sensible
//! defaults and support for serialization/deserialization via serde. The
//! configuration can be loaded from a TOML file; missing fields fall back to
//! their defaults.
//!
//! # Example
//!
//! ```
//! use cfnpath::config::Config;
//!
//! // Use default configuration
//! let config = Config::default();
//! assert_eq!(config.max_depth, 50);
//! assert_eq!(config.large_node_threshold, 200);
//!
//! // Create custom configuration
//! let custom = Config {
//!     speculative_parsing: false,
//!     ..Config::default()
//! };
//! assert!(!custom.speculative_parsing);
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Tunables for syntax trees and position resolution.
///
/// # Fields
///
/// * `max_depth` - Depth cap for tree walks and traversals (default: 50)
/// * `large_node_threshold` - Text length above which a node is too coarse to be a "most specific" match (default: 200)
/// * `nearby_search_depth` - How many hops the outward neighbour search may take (default: 8)
/// * `speculative_parsing` - Re-parse a locally completed copy of the buffer when the cursor sits in an error (default: true)
/// * `structural_fallback` - Rebuild YAML paths from indentation when the grammar tree cannot be trusted (default: true)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Depth cap for tree walks and traversals
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Text length above which a node counts as "large"
    #[serde(default = "default_large_node_threshold")]
    pub large_node_threshold: usize,

    /// Hop limit for the outward neighbour search
    #[serde(default = "default_nearby_search_depth")]
    pub nearby_search_depth: usize,

    /// Try a minimal completion when the cursor is inside a parse error
    #[serde(default = "default_true")]
    pub speculative_parsing: bool,

    /// Fall back to indentation-based paths for broken YAML
    #[serde(default = "default_true")]
    pub structural_fallback: bool,
}

fn default_max_depth() -> usize {
    50
}

fn default_large_node_threshold() -> usize {
    200
}

fn default_nearby_search_depth() -> usize {
    8
}

fn default_true() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            large_node_threshold: default_large_node_threshold(),
            nearby_search_depth: default_nearby_search_depth(),
            speculative_parsing: true,
            structural_fallback: true,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/cfnpath/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("cfnpath");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Loads configuration from `path`, falling back to defaults on any failure.
    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(contents) => Self::from_toml_str(&contents).unwrap_or_else(|err| {
                tracing::warn!("Ignoring invalid config {}: {}", path.display(), err);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Parses configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Saves configuration to the default config file.
    ///
    /// Creates the config directory if it doesn't exist.
    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        self.save_to(&config_path)
    }

    /// Saves configuration to `path`, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }
}
