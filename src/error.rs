//! Error types for Bakery
//!
//! Uses `thiserror` for library errors; the binary boundary wraps them in
//! `anyhow::Result`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Bakery operations
pub type BakeryResult<T> = Result<T, BakeryError>;

/// Main error type for Bakery operations
#[derive(Error, Debug)]
pub enum BakeryError {
    /// The bundling backend could not produce a bundle
    /// (unresolvable entrypoint, syntax error, ...)
    #[error("build failed: {message}")]
    Build { message: String },

    /// The bundler executable could not be spawned at all
    #[error("bundler '{program}' is not available: {message}")]
    BackendUnavailable { program: String, message: String },

    /// A build was requested without any entrypoints
    #[error("no entrypoints configured - pass --entry or set 'entrypoints' in bakery.toml")]
    NoEntrypoints,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration file
    #[error("invalid config {path}: {message}")]
    Config { path: PathBuf, message: String },
}
