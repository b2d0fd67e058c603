//! File watcher for continuous rebuilds
//!
//! Implements `--watch` with:
//! - Debouncing (100ms)
//! - Strictly serialized rebuilds (at most one in flight)
//! - Error isolation (a failed rebuild never stops the watcher)
//! - Graceful Ctrl+C shutdown
//! - NDJSON output for CI

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::bundler::BundleBackend;
use crate::emitter::{emit, EmitEvent, EmitOptions, EmitReport};
use crate::error::{BakeryError, BakeryResult};

/// Debounce duration in milliseconds
const DEBOUNCE_MS: u64 = 100;

/// Watch options
#[derive(Debug, Clone)]
pub struct WatchOptions {
    /// Directory subtree watched for changes
    pub source: PathBuf,
    /// Build configuration reused for every rebuild
    pub emit: EmitOptions,
    /// Output as NDJSON
    pub json: bool,
}

/// Watch event types for NDJSON output
#[derive(Debug, Clone)]
pub enum WatchEvent {
    Started { source: String },
    FileChanged { path: String },
    BuildStarted,
    FileWritten { path: String },
    UnresolvedKeys { path: String, count: usize },
    BuildComplete { written: usize, unresolved_keys: usize },
    Error { message: String },
    Shutdown,
}

impl WatchEvent {
    pub fn to_json(&self) -> String {
        match self {
            WatchEvent::Started { source } => {
                format!(r#"{{"event":"started","source":"{}"}}"#, source)
            }
            WatchEvent::FileChanged { path } => {
                format!(r#"{{"event":"file_changed","path":"{}"}}"#, path)
            }
            WatchEvent::BuildStarted => r#"{"event":"build_started"}"#.to_string(),
            WatchEvent::FileWritten { path } => {
                format!(r#"{{"event":"file_written","path":"{}"}}"#, path)
            }
            WatchEvent::UnresolvedKeys { path, count } => {
                format!(
                    r#"{{"event":"unresolved_keys","path":"{}","count":{}}}"#,
                    path, count
                )
            }
            WatchEvent::BuildComplete {
                written,
                unresolved_keys,
            } => {
                format!(
                    r#"{{"event":"build_complete","written":{},"unresolved_keys":{}}}"#,
                    written, unresolved_keys
                )
            }
            WatchEvent::Error { message } => {
                format!(
                    r#"{{"event":"error","message":"{}"}}"#,
                    message.replace('"', "\\\"")
                )
            }
            WatchEvent::Shutdown => r#"{"event":"shutdown"}"#.to_string(),
        }
    }
}

/// Watcher state for debouncing
struct WatcherState {
    pending_changes: HashSet<PathBuf>,
    last_change: Option<Instant>,
}

impl WatcherState {
    fn new() -> Self {
        Self {
            pending_changes: HashSet::new(),
            last_change: None,
        }
    }

    fn add_change(&mut self, path: PathBuf) {
        self.pending_changes.insert(path);
        self.last_change = Some(Instant::now());
    }

    fn should_rebuild(&self) -> bool {
        if let Some(last) = self.last_change {
            !self.pending_changes.is_empty()
                && last.elapsed() >= Duration::from_millis(DEBOUNCE_MS)
        } else {
            false
        }
    }

    fn take_changes(&mut self) -> Vec<PathBuf> {
        let changes: Vec<_> = self.pending_changes.drain().collect();
        self.last_change = None;
        changes
    }
}

/// Start watching for file changes.
///
/// Runs the initial build before subscribing; a failure there propagates
/// like a one-shot run. Once the loop is live, each rebuild returns a
/// tagged result handled in a single branch: failures are reported through
/// the callback and the subscription stays alive until `running` clears.
pub fn watch(
    options: WatchOptions,
    backend: &dyn BundleBackend,
    running: Arc<AtomicBool>,
    event_callback: impl Fn(WatchEvent),
) -> BakeryResult<()> {
    event_callback(WatchEvent::Started {
        source: options.source.display().to_string(),
    });

    rebuild(&options, backend, &event_callback)?;

    let (tx, rx) = channel();

    let mut watcher = RecommendedWatcher::new(
        move |res: Result<Event, notify::Error>| {
            if let Ok(event) = res {
                for path in event.paths {
                    let _ = tx.send(path);
                }
            }
        },
        Config::default(),
    )
    .map_err(|e| BakeryError::Io(std::io::Error::other(e.to_string())))?;

    watcher
        .watch(&options.source, RecursiveMode::Recursive)
        .map_err(|e| BakeryError::Io(std::io::Error::other(e.to_string())))?;

    let mut state = WatcherState::new();

    // notify reports absolute paths; the initial build created the out dir
    let out_dir = options
        .emit
        .out_dir
        .canonicalize()
        .unwrap_or_else(|_| options.emit.out_dir.clone());

    while running.load(Ordering::SeqCst) {
        // Check for file changes (non-blocking with timeout)
        if let Ok(path) = rx.recv_timeout(Duration::from_millis(50)) {
            // Our own writes must not retrigger a rebuild
            if path.starts_with(&out_dir) {
                continue;
            }
            event_callback(WatchEvent::FileChanged {
                path: path.display().to_string(),
            });
            state.add_change(path);
        }

        // Rebuilds run synchronously here, so a new batch is never
        // processed while one is in flight.
        if state.should_rebuild() {
            let _changes = state.take_changes();
            if let Err(e) = rebuild(&options, backend, &event_callback) {
                event_callback(WatchEvent::Error {
                    message: e.to_string(),
                });
            }
        }
    }

    event_callback(WatchEvent::Shutdown);
    Ok(())
}

fn rebuild(
    options: &WatchOptions,
    backend: &dyn BundleBackend,
    callback: &impl Fn(WatchEvent),
) -> BakeryResult<EmitReport> {
    callback(WatchEvent::BuildStarted);

    let report = emit(backend, &options.emit, |event| match event {
        EmitEvent::FileWritten { path } => callback(WatchEvent::FileWritten { path }),
        EmitEvent::UnresolvedKeys { path, count } => {
            callback(WatchEvent::UnresolvedKeys { path, count })
        }
    })?;

    callback(WatchEvent::BuildComplete {
        written: report.written.len(),
        unresolved_keys: report.unresolved_keys,
    });

    Ok(report)
}
