//! Emitter: one bundling pass
//!
//! Drives the backend, rewrites each returned artifact with the
//! substitution pass, and writes the results under the output directory.
//! Writes are independent, not transactional: a failed write surfaces
//! without rolling back earlier ones, and the next invocation overwrites
//! files deterministically.

use std::fs;
use std::path::PathBuf;

use crate::bundler::{BuildRequest, BundleBackend};
use crate::error::BakeryResult;
use crate::substitute::{substitute, EnvSnapshot};

/// Options for one emitter invocation
#[derive(Debug, Clone)]
pub struct EmitOptions {
    /// Entrypoints handed to the backend
    pub entrypoints: Vec<PathBuf>,
    /// Directory rewritten artifacts are written to
    pub out_dir: PathBuf,
    /// Backend platform tag
    pub platform: String,
    /// Minify bundled output
    pub minify: bool,
}

/// Progress events reported while a build runs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmitEvent {
    /// One rewritten artifact landed on disk
    FileWritten { path: String },
    /// An artifact referenced keys absent from the build environment;
    /// those spans degraded to `undefined` instead of failing the build
    UnresolvedKeys { path: String, count: usize },
}

/// Result of a completed emitter invocation
#[derive(Debug, Clone, Default)]
pub struct EmitReport {
    /// Paths written, in artifact order
    pub written: Vec<PathBuf>,
    /// Total placeholders that degraded to `undefined`
    pub unresolved_keys: usize,
}

/// Run one bundling pass: bundle, substitute, write.
///
/// The backend is asked for in-memory artifacts so substitution always runs
/// before anything touches disk; a raw configuration-read call is never
/// persisted. The environment snapshot is recaptured here on every call.
pub fn emit(
    backend: &dyn BundleBackend,
    options: &EmitOptions,
    callback: impl Fn(EmitEvent),
) -> BakeryResult<EmitReport> {
    let request = BuildRequest {
        entrypoints: options.entrypoints.clone(),
        out_dir: options.out_dir.clone(),
        platform: options.platform.clone(),
        minify: options.minify,
        write: false,
    };
    let artifacts = backend.bundle(&request)?;

    // Idempotent: "already exists" is success.
    fs::create_dir_all(&options.out_dir)?;

    let env = EnvSnapshot::capture();
    let mut report = EmitReport::default();

    for artifact in artifacts {
        let (text, missing) = substitute(&artifact.text, &env);
        if missing > 0 {
            callback(EmitEvent::UnresolvedKeys {
                path: artifact.path.display().to_string(),
                count: missing,
            });
            report.unresolved_keys += missing;
        }

        if let Some(parent) = artifact.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&artifact.path, text)?;

        callback(EmitEvent::FileWritten {
            path: artifact.path.display().to_string(),
        });
        report.written.push(artifact.path);
    }

    Ok(report)
}
