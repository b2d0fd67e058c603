//! Compile-time environment substitution
//!
//! Rewrites `ENV_GET("KEY")` placeholders in bundled output into literal
//! values read from the build environment, so shipped assets never carry a
//! runtime configuration read.
//!
//! The pass is pure: the environment is captured into an [`EnvSnapshot`]
//! once per build invocation and passed in explicitly.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::{Captures, Regex};

lazy_static! {
    /// The single recognized placeholder form: a call-like token naming the
    /// configuration key as a double-quoted string literal.
    static ref PLACEHOLDER: Regex = Regex::new(r#"ENV_GET\("([^"]*)"\)"#).unwrap();
}

/// Read-only snapshot of the process environment.
///
/// Recaptured at the start of every build invocation, so repeated builds
/// observe environment changes made between them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvSnapshot {
    vars: BTreeMap<String, String>,
}

impl EnvSnapshot {
    /// Capture the current process environment
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit pairs (tests, embedding)
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Replace every placeholder occurrence in `text` against `env`.
///
/// Returns the rewritten text and the number of placeholders whose key was
/// absent from the snapshot. An absent key is not an error: the span becomes
/// the literal `undefined` and the count lets callers warn the operator.
///
/// All replacements are computed against the original text in a single scan.
/// Present keys are re-encoded as quoted string literals with `"` and `\`
/// escaped, so the output can never contain a further match and a second run
/// is a no-op.
pub fn substitute(text: &str, env: &EnvSnapshot) -> (String, usize) {
    let mut missing = 0usize;
    let rewritten = PLACEHOLDER.replace_all(text, |caps: &Captures| match env.get(&caps[1]) {
        Some(value) => encode_string_literal(value),
        None => {
            missing += 1;
            "undefined".to_string()
        }
    });
    (rewritten.into_owned(), missing)
}

/// Encode a value as a JS double-quoted string literal
fn encode_string_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}
