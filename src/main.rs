//! Bakery CLI - bundle browser entrypoints and bake env configuration in
//!
//! Usage: bakery [OPTIONS]
//!
//! Runs one build unconditionally; with --watch, keeps rebuilding on
//! source changes until Ctrl+C.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use bakery::bundler::EsbuildBackend;
use bakery::config::Config;
use bakery::emitter::{emit, EmitEvent, EmitOptions};
use bakery::watcher::{watch, WatchEvent, WatchOptions};

/// Bakery - bake environment configuration into browser bundles
#[derive(Parser, Debug)]
#[command(name = "bakery")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Entrypoint files (repeatable; overrides bakery.toml)
    #[arg(short, long)]
    entry: Vec<PathBuf>,

    /// Output directory for rewritten artifacts
    #[arg(short, long)]
    out_dir: Option<PathBuf>,

    /// Directory watched in watch mode
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Minify bundled output
    #[arg(long)]
    minify: bool,

    /// Rebuild on source changes until interrupted
    #[arg(long)]
    watch: bool,

    /// Bundler executable to invoke
    #[arg(long)]
    backend: Option<String>,

    /// Path to config file
    #[arg(long, default_value = "bakery.toml")]
    config: PathBuf,

    /// Output NDJSON events for CI
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(&cli.config).unwrap_or_default();

    let emit_options = EmitOptions {
        entrypoints: if cli.entry.is_empty() {
            config.entrypoints.clone()
        } else {
            cli.entry.clone()
        },
        out_dir: cli.out_dir.clone().unwrap_or_else(|| config.out_dir.clone()),
        platform: config.platform.clone(),
        minify: cli.minify,
    };
    let source = cli.source.clone().unwrap_or_else(|| config.source.clone());
    let backend = EsbuildBackend::new(cli.backend.clone().unwrap_or_else(|| config.backend.clone()));

    if cli.watch {
        cmd_watch(emit_options, source, backend, cli.json)
    } else {
        cmd_build(emit_options, backend, cli.json)
    }
}

fn cmd_build(options: EmitOptions, backend: EsbuildBackend, json: bool) -> Result<()> {
    if !json {
        println!("🍞 Bakery Build");
        println!("Out dir: {}", options.out_dir.display());
        if options.minify {
            println!("Mode: Minify");
        }
        println!();
    }

    let report = emit(&backend, &options, |event| {
        render_emit_event(&event, json);
    })?;

    if json {
        let output = serde_json::json!({
            "event": "build_complete",
            "written": report.written.len(),
            "unresolved_keys": report.unresolved_keys,
        });
        println!("{}", serde_json::to_string(&output)?);
    } else {
        println!();
        println!(
            "✓ Build: {} files written, {} unresolved keys",
            report.written.len(),
            report.unresolved_keys
        );
    }

    Ok(())
}

fn render_emit_event(event: &EmitEvent, json: bool) {
    if json {
        let line = match event {
            EmitEvent::FileWritten { path } => {
                serde_json::json!({"event": "file_written", "path": path})
            }
            EmitEvent::UnresolvedKeys { path, count } => {
                serde_json::json!({"event": "unresolved_keys", "path": path, "count": count})
            }
        };
        println!("{}", line);
    } else {
        match event {
            EmitEvent::FileWritten { path } => println!("  ✓ Wrote {}", path),
            EmitEvent::UnresolvedKeys { path, count } => {
                eprintln!("  ⚠ {} unresolved env keys in {}", count, path)
            }
        }
    }
}

fn cmd_watch(
    emit_options: EmitOptions,
    source: PathBuf,
    backend: EsbuildBackend,
    json: bool,
) -> Result<()> {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    let options = WatchOptions {
        source: source.clone(),
        emit: emit_options,
        json,
    };

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let running_clone = running.clone();

    ctrlc::set_handler(move || {
        running_clone.store(false, Ordering::SeqCst);
    })?;

    if !json {
        println!("👀 Bakery Watch");
        println!("Source: {}", source.display());
        println!("Press Ctrl+C to stop\n");
    }

    watch(options, &backend, running, |event| {
        if json {
            println!("{}", event.to_json());
        } else {
            match event {
                WatchEvent::Started { source } => {
                    println!("📂 Watching: {}", source);
                }
                WatchEvent::FileChanged { path } => {
                    println!("📝 Changed: {}", path);
                }
                WatchEvent::BuildStarted => {
                    println!("🔄 Building...");
                }
                WatchEvent::FileWritten { path } => {
                    println!("  ✓ Wrote {}", path);
                }
                WatchEvent::UnresolvedKeys { path, count } => {
                    eprintln!("  ⚠ {} unresolved env keys in {}", count, path);
                }
                WatchEvent::BuildComplete {
                    written,
                    unresolved_keys,
                } => {
                    if unresolved_keys > 0 {
                        println!("⚠ Build: {} written, {} unresolved keys", written, unresolved_keys);
                    } else {
                        println!("✓ Build: {} written", written);
                    }
                }
                WatchEvent::Error { message } => {
                    eprintln!("✗ Error: {}", message);
                }
                WatchEvent::Shutdown => {
                    println!("\n👋 Shutting down...");
                }
            }
        }
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parse_defaults() {
        let cli = Cli::try_parse_from(["bakery"]).unwrap();
        assert!(cli.entry.is_empty());
        assert!(!cli.minify);
        assert!(!cli.watch);
        assert!(!cli.json);
        assert_eq!(cli.config, PathBuf::from("bakery.toml"));
    }

    #[test]
    fn test_cli_parse_minify_and_watch_are_presence_flags() {
        let cli = Cli::try_parse_from(["bakery", "--minify", "--watch"]).unwrap();
        assert!(cli.minify);
        assert!(cli.watch);
    }

    #[test]
    fn test_cli_parse_repeated_entries() {
        let cli = Cli::try_parse_from([
            "bakery",
            "--entry",
            "src/index.html",
            "--entry",
            "src/admin.html",
        ])
        .unwrap();
        assert_eq!(cli.entry.len(), 2);
        assert_eq!(cli.entry[0], PathBuf::from("src/index.html"));
    }

    #[test]
    fn test_cli_parse_out_dir_and_source() {
        let cli = Cli::try_parse_from([
            "bakery",
            "--out-dir",
            "public",
            "--source",
            "frontend/src",
        ])
        .unwrap();
        assert_eq!(cli.out_dir, Some(PathBuf::from("public")));
        assert_eq!(cli.source, Some(PathBuf::from("frontend/src")));
    }

    #[test]
    fn test_cli_parse_backend_override() {
        let cli = Cli::try_parse_from(["bakery", "--backend", "/usr/local/bin/esbuild"]).unwrap();
        assert_eq!(cli.backend, Some("/usr/local/bin/esbuild".to_string()));
    }

    #[test]
    fn test_cli_json_flag() {
        let cli = Cli::try_parse_from(["bakery", "--json"]).unwrap();
        assert!(cli.json);
    }
}
