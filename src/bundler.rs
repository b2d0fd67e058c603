//! Bundling backend boundary
//!
//! The backend owns module resolution, minification, and tree-shaking; this
//! crate only defines the request/response contract and a driver for the
//! esbuild CLI. Artifacts always come back in memory so the substitution
//! pass can run before anything is written under the output directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{BakeryError, BakeryResult};

/// Configuration for one backend invocation.
///
/// Constructed fresh per build and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    /// Source files rooting the dependency traversal (non-empty)
    pub entrypoints: Vec<PathBuf>,
    /// Directory the artifact paths are destined for
    pub out_dir: PathBuf,
    /// Target platform tag, e.g. "browser"
    pub platform: String,
    /// Ask the backend to minify
    pub minify: bool,
    /// When false, artifacts are returned in memory instead of written by
    /// the backend. The emitter always sets this to false.
    pub write: bool,
}

/// One output file produced by a build, prior to substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputArtifact {
    /// Destination path, already inside the requested output directory
    pub path: PathBuf,
    /// Textual content
    pub text: String,
}

/// Abstract bundling backend interface
pub trait BundleBackend {
    /// Run one bundling pass, returning every produced artifact in memory
    fn bundle(&self, request: &BuildRequest) -> BakeryResult<Vec<OutputArtifact>>;
}

/// Backend driving the esbuild CLI.
///
/// esbuild only writes to disk, so output is staged in a temporary
/// directory, read back into memory, and each path is remapped into the
/// requested output directory. The staging directory is dropped with the
/// call, which preserves the in-memory contract of [`BundleBackend`].
pub struct EsbuildBackend {
    program: String,
}

impl EsbuildBackend {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check if the bundler executable is installed and runnable
    pub fn check_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl BundleBackend for EsbuildBackend {
    fn bundle(&self, request: &BuildRequest) -> BakeryResult<Vec<OutputArtifact>> {
        if request.entrypoints.is_empty() {
            return Err(BakeryError::NoEntrypoints);
        }

        let staging = tempfile::tempdir()?;

        let mut cmd = Command::new(&self.program);
        for entry in &request.entrypoints {
            cmd.arg(entry);
        }
        cmd.arg("--bundle")
            .arg(format!("--platform={}", request.platform))
            .arg(format!("--outdir={}", staging.path().display()))
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if request.minify {
            cmd.arg("--minify");
        }

        let output = cmd.output().map_err(|e| BakeryError::BackendUnavailable {
            program: self.program.clone(),
            message: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(BakeryError::Build {
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let mut artifacts = Vec::new();
        collect_artifacts(staging.path(), staging.path(), &request.out_dir, &mut artifacts)?;
        // Deterministic ordering regardless of directory iteration order
        artifacts.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(artifacts)
    }
}

fn collect_artifacts(
    staging_root: &Path,
    current: &Path,
    out_dir: &Path,
    artifacts: &mut Vec<OutputArtifact>,
) -> BakeryResult<()> {
    for entry in fs::read_dir(current)? {
        let entry = entry?;
        let path = entry.path();

        if path.is_dir() {
            collect_artifacts(staging_root, &path, out_dir, artifacts)?;
        } else {
            let relative = path
                .strip_prefix(staging_root)
                .unwrap_or(&path)
                .to_path_buf();
            artifacts.push(OutputArtifact {
                path: out_dir.join(relative),
                text: fs::read_to_string(&path)?,
            });
        }
    }
    Ok(())
}

/// Mock backend for testing.
///
/// Uses `Arc<Mutex<>>` internally so it can be cloned into watcher threads.
/// Produces a fixed artifact set remapped into the requested output
/// directory, optionally failing the first N calls.
#[cfg(test)]
#[derive(Clone)]
pub struct MockBackend {
    files: Vec<(PathBuf, String)>,
    failures_remaining: std::sync::Arc<std::sync::Mutex<usize>>,
    calls: std::sync::Arc<std::sync::Mutex<Vec<BuildRequest>>>,
    in_flight: std::sync::Arc<std::sync::atomic::AtomicBool>,
}

#[cfg(test)]
impl MockBackend {
    pub fn returning<K: Into<PathBuf>, V: Into<String>>(
        files: impl IntoIterator<Item = (K, V)>,
    ) -> Self {
        Self {
            files: files
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            failures_remaining: Default::default(),
            calls: Default::default(),
            in_flight: Default::default(),
        }
    }

    /// Fail the first `n` bundle calls with a build error, then succeed
    pub fn with_failures(self, n: usize) -> Self {
        self.set_failures(n);
        self
    }

    /// Arm failures on an already-shared backend (clones share the counter)
    pub fn set_failures(&self, n: usize) {
        *self.failures_remaining.lock().unwrap() = n;
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[cfg(test)]
impl BundleBackend for MockBackend {
    fn bundle(&self, request: &BuildRequest) -> BakeryResult<Vec<OutputArtifact>> {
        use std::sync::atomic::Ordering;

        // Rebuilds are serialized by contract; overlapping calls are a bug.
        assert!(
            !self.in_flight.swap(true, Ordering::SeqCst),
            "concurrent bundle invocation"
        );
        std::thread::sleep(std::time::Duration::from_millis(10));

        self.calls.lock().unwrap().push(request.clone());

        let result = {
            let mut failures = self.failures_remaining.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                Err(BakeryError::Build {
                    message: "simulated backend failure".to_string(),
                })
            } else {
                Ok(self
                    .files
                    .iter()
                    .map(|(name, text)| OutputArtifact {
                        path: request.out_dir.join(name),
                        text: text.clone(),
                    })
                    .collect())
            }
        };

        self.in_flight.store(false, Ordering::SeqCst);
        result
    }
}
