//! Stable warning identity and deduplication.
//!
//! A fingerprint is a pure function of the check id, the warning type,
//! the message with variable parts elided, and the literal-elided
//! skeleton of the implicated expression. Line numbers and file paths
//! never participate, so fingerprints survive line drift and collapse
//! identical content reached from several places (a shared partial
//! rendered by multiple templates).

use crate::warning::Warning;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

static QUOTED: OnceLock<Regex> = OnceLock::new();
static DIGITS: OnceLock<Regex> = OnceLock::new();

/// Elides the variable parts of a message: quoted fragments and digit
/// runs are normalized so two warnings differing only in embedded values
/// share a template.
fn normalize_message(message: &str) -> String {
    let quoted = QUOTED.get_or_init(|| Regex::new(r#""[^"]*"|'[^']*'"#).expect("quoted regex"));
    let digits = DIGITS.get_or_init(|| Regex::new(r"\d+").expect("digit regex"));
    let out = quoted.replace_all(message, "\"\"");
    digits.replace_all(&out, "0").into_owned()
}

/// Content digest of a warning. Deterministic across runs and platforms.
pub fn fingerprint(warning: &Warning) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(warning.check_name.as_bytes());
    hasher.update(b"\0");
    hasher.update(warning.warning_type.as_bytes());
    hasher.update(b"\0");
    hasher.update(normalize_message(&warning.message).as_bytes());
    hasher.update(b"\0");
    hasher.update(warning.skeleton.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Fills in the fingerprint. Called by the check registry on every
/// warning it collects, so no warning leaves the engine without one.
pub fn seal(warning: &mut Warning) {
    warning.fingerprint = fingerprint(warning);
}

/// Collapses warnings sharing a fingerprint, keeping the strongest
/// confidence, then orders the survivors deterministically.
pub fn dedup(mut warnings: Vec<Warning>) -> Vec<Warning> {
    // Strongest confidence first within a fingerprint group, so retain
    // keeps it.
    warnings.sort_by(|a, b| {
        a.fingerprint
            .cmp(&b.fingerprint)
            .then(a.confidence.cmp(&b.confidence))
            .then(a.file.cmp(&b.file))
            .then(a.line.cmp(&b.line))
    });
    let mut seen = HashSet::new();
    warnings.retain(|w| seen.insert(w.fingerprint.clone()));
    warnings.sort_by(|a, b| {
        a.file
            .cmp(&b.file)
            .then(a.line.cmp(&b.line))
            .then(a.check_name.cmp(&b.check_name))
            .then(a.fingerprint.cmp(&b.fingerprint))
    });
    warnings
}

/// Splits warnings into (kept, suppressed) against an ignore list.
/// Suppressed entries are returned, not dropped, so tooling can count
/// them separately from true negatives.
pub fn apply_ignore_list(
    warnings: Vec<Warning>,
    ignored: &HashSet<String>,
) -> (Vec<Warning>, Vec<Warning>) {
    warnings
        .into_iter()
        .partition(|w| !ignored.contains(&w.fingerprint))
}
