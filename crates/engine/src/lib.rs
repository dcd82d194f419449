//! Analysis engine: taint propagation over convention-shaped syntax
//! trees, the fixed check registry, and warning identity.
//!
//! `scan` is the whole pipeline. The app index is built once as a
//! barrier, then every file is analyzed independently in parallel, then
//! the merged warning set is deduplicated and filtered. Two scans of the
//! same input produce identical reports.

pub mod checks;
mod fingerprint;
pub mod sanitizers;
mod taint;
mod version;
mod warning;

pub use fingerprint::{apply_ignore_list, dedup, fingerprint, seal};
pub use sanitizers::{SanitizerKind, SanitizerTable, SinkContext};
pub use taint::{
    FileTaint, MemoCache, Origin, SinkFinding, SourceKind, TaintDescriptor, TaintEngine, TaintEnv,
};
pub use warning::{Category, Confidence, Warning};

use checks::{run_checks, CheckContext};
use index::{AppIndex, StructuralError};
use ir::FileSyntax;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::debug;

/// Scan-wide knobs. Everything else is fixed.
#[derive(Debug, Default, Clone)]
pub struct ScanConfig {
    /// Check names to skip entirely.
    pub disabled_checks: HashSet<String>,
    /// Fingerprints to suppress from the final report.
    pub ignore: HashSet<String>,
}

/// Everything a scan produces.
#[derive(Debug)]
pub struct Report {
    pub warnings: Vec<Warning>,
    /// Warnings matched by the ignore list, kept for accounting.
    pub suppressed: Vec<Warning>,
    /// Per-file indexing failures. Never fatal to the scan.
    pub errors: Vec<StructuralError>,
}

impl Report {
    /// Warning count per category, ordered by category label.
    pub fn tally(&self) -> Vec<(&'static str, usize)> {
        let mut out: Vec<(&'static str, usize)> = Vec::new();
        for w in &self.warnings {
            let label = w.category.label();
            match out.iter_mut().find(|(l, _)| *l == label) {
                Some((_, n)) => *n += 1,
                None => out.push((label, 1)),
            }
        }
        out.sort_by(|a, b| a.0.cmp(b.0));
        out
    }
}

/// Runs the full pipeline over a parsed application.
pub fn scan(files: &[FileSyntax], config: &ScanConfig) -> Report {
    let (index, errors) = AppIndex::build(files);

    let sanitizers = SanitizerTable::builtin();
    let memo = MemoCache::default();
    let checks = checks::default_checks();
    let engine = TaintEngine::new(&index, &sanitizers, &memo);

    let warnings: Vec<Warning> = files
        .par_iter()
        .flat_map(|file| {
            debug!(file = %file.path, role = ?file.role, "analyzing");
            let taint = engine.analyze_file(file);
            let cx = CheckContext {
                index: &index,
                file,
                taint: &taint,
                sanitizers: &sanitizers,
            };
            run_checks(&checks, &cx, &config.disabled_checks)
        })
        .collect();

    let warnings = fingerprint::dedup(warnings);
    let (warnings, suppressed) = fingerprint::apply_ignore_list(warnings, &config.ignore);

    Report {
        warnings,
        suppressed,
        errors,
    }
}
