// src/report.rs
// =============================================================================
// This module sorts validation outcomes into buckets and presents them.
//
// Every outcome lands in exactly one bucket, checked in this order:
// 1. skipped - the error message carries the "skipped" marker
// 2. valid   - the probe succeeded (bare URL)
// 3. broken  - everything else, annotated with the status code when there
//              is one, otherwise with the error text
//
// Outcomes arrive in whatever order the dispatcher produced them; the
// buckets are sorted afterwards so reports are stable between runs.
// =============================================================================

use crate::checker::ValidationOutcome;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

/// How many broken links the console summary lists.
pub const PREVIEW_LIMIT: usize = 10;

// The three buckets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultSet {
    pub valid: Vec<String>,
    pub broken: Vec<String>,
    pub skipped: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub valid: usize,
    pub broken: usize,
    pub skipped: usize,
    pub total: usize,
}

// JSON envelope for --json and --output
#[derive(Debug, Serialize)]
pub struct Report<'a> {
    pub status: &'static str,
    pub data: &'a ResultSet,
    pub summary: Summary,
}

impl ResultSet {
    /// Classifies a whole batch, in any order.
    pub fn from_outcomes(outcomes: impl IntoIterator<Item = ValidationOutcome>) -> Self {
        let mut results = Self::default();
        for outcome in outcomes {
            results.classify(outcome);
        }
        results.valid.sort();
        results.broken.sort();
        results.skipped.sort();
        results
    }

    pub fn classify(&mut self, outcome: ValidationOutcome) {
        if outcome.is_skipped() {
            self.skipped.push(outcome.target);
        } else if outcome.valid {
            self.valid.push(outcome.target);
        } else {
            self.broken.push(broken_entry(&outcome));
        }
    }

    pub fn summary(&self) -> Summary {
        Summary {
            valid: self.valid.len(),
            broken: self.broken.len(),
            skipped: self.skipped.len(),
            total: self.valid.len() + self.broken.len() + self.skipped.len(),
        }
    }

    /// The first `limit` broken entries and how many were left out.
    pub fn broken_preview(&self, limit: usize) -> (&[String], usize) {
        let shown = self.broken.len().min(limit);
        (&self.broken[..shown], self.broken.len() - shown)
    }

    pub fn report(&self) -> Report<'_> {
        Report {
            status: "success",
            data: self,
            summary: self.summary(),
        }
    }
}

// "<url> (status: 404)" or "<url> (<error text>)"
fn broken_entry(outcome: &ValidationOutcome) -> String {
    match (outcome.status_code, outcome.error_message.as_deref()) {
        (Some(code), _) => format!("{} (status: {})", outcome.target, code),
        (None, Some(error)) => format!("{} ({})", outcome.target, error),
        (None, None) => outcome.target.clone(),
    }
}

// Human-readable summary for the terminal
pub fn render_console(results: &ResultSet) -> String {
    let summary = results.summary();
    let mut out = String::new();

    let _ = writeln!(out, "✅ Valid links: {}", summary.valid);
    let _ = writeln!(out, "❌ Broken links: {}", summary.broken);
    let _ = writeln!(out, "⏭️  Skipped links: {}", summary.skipped);

    let (shown, hidden) = results.broken_preview(PREVIEW_LIMIT);
    if !shown.is_empty() {
        let _ = writeln!(out, "\n❌ Broken links:");
        for entry in shown {
            let _ = writeln!(out, "  - {}", entry);
        }
        if hidden > 0 {
            let _ = writeln!(out, "  ... and {} more", hidden);
        }
    }

    out
}

// Where --output actually writes: a bare name gets ".json" appended
pub fn report_path(requested: &Path) -> PathBuf {
    if requested.extension().is_some() {
        requested.to_path_buf()
    } else {
        let mut name = requested.as_os_str().to_owned();
        name.push(".json");
        PathBuf::from(name)
    }
}

// Writes the JSON report and returns the path used
pub fn write_report(results: &ResultSet, requested: &Path) -> Result<PathBuf> {
    let path = report_path(requested);
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(&results.report())?;
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}
