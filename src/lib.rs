//! Bakery - bundler driver that bakes environment configuration into
//! browser bundles at build time
//!
//! Bakery drives an external bundling backend (esbuild) over a set of
//! browser entrypoints, rewrites `ENV_GET("KEY")` placeholders in the
//! returned artifacts into literal values from the build environment, and
//! writes the results to the output directory - optionally rebuilding
//! whenever sources change.

pub mod bundler;
pub mod config;
pub mod emitter;
pub mod error;
pub mod substitute;
pub mod watcher;

// Re-exports for convenience
pub use bundler::{BuildRequest, BundleBackend, EsbuildBackend, OutputArtifact};
pub use config::Config;
pub use emitter::{emit, EmitEvent, EmitOptions, EmitReport};
pub use error::{BakeryError, BakeryResult};
pub use substitute::{substitute, EnvSnapshot};
pub use watcher::{watch, WatchEvent, WatchOptions};
