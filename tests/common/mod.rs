//! Shared helpers for E2E tests
//!
//! The stub bundler stands in for esbuild: it honors the `--outdir=` flag
//! bakery passes and emits one fixed artifact into it, failing instead
//! whenever a marker file exists next to the script.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

#[cfg(unix)]
pub fn write_stub_backend(dir: &Path, artifact: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let script = dir.join("stub-esbuild");
    let marker = dir.join("fail-marker");
    let body = format!(
        r#"#!/bin/sh
if [ -f "{marker}" ]; then
  echo "simulated bundler failure" >&2
  exit 1
fi
outdir=""
for arg in "$@"; do
  case "$arg" in
    --outdir=*) outdir="${{arg#--outdir=}}" ;;
  esac
done
mkdir -p "$outdir"
cat > "$outdir/app.js" <<'ARTIFACT'
{artifact}
ARTIFACT
"#,
        marker = marker.display(),
        artifact = artifact,
    );
    fs::write(&script, body).unwrap();

    let mut perms = fs::metadata(&script).unwrap().permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&script, perms).unwrap();

    script
}

#[cfg(unix)]
pub fn arm_backend_failure(dir: &Path) {
    fs::write(dir.join("fail-marker"), "").unwrap();
}

#[cfg(unix)]
pub fn clear_backend_failure(dir: &Path) {
    let _ = fs::remove_file(dir.join("fail-marker"));
}
