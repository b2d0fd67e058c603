//! Project configuration loaded from `bakery.toml`
//!
//! Every field has a default mirroring a plain browser project, so a
//! missing config file is not an error. CLI flags override file values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{BakeryError, BakeryResult};

/// Project configuration
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Entrypoints rooting the backend's dependency traversal
    pub entrypoints: Vec<PathBuf>,
    /// Directory rewritten artifacts are written to
    pub out_dir: PathBuf,
    /// Directory subtree watched in watch mode
    pub source: PathBuf,
    /// Backend platform tag
    pub platform: String,
    /// Bundler executable to invoke
    pub backend: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            entrypoints: vec![PathBuf::from("src/index.html")],
            out_dir: PathBuf::from("dist"),
            source: PathBuf::from("src"),
            platform: "browser".to_string(),
            backend: "esbuild".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> BakeryResult<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| BakeryError::Config {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }
}
