//! JSON output formatter for machine processing
//!
//! This module provides:
//! - JSON serialization of propagation reports
//! - Structured target-by-target status information

use crate::orchestrator::{PropagationReport, TargetOutcome};
use crate::output::{OutputFormatter, Verbosity};
use chrono::Utc;
use serde::Serialize;
use std::io::Write;

/// JSON formatter for machine-readable output
pub struct JsonFormatter {
    /// Verbosity level affects detail in output
    verbosity: Verbosity,
}

impl JsonFormatter {
    /// Create a new JSON formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self { verbosity }
    }
}

/// JSON representation of the full report
#[derive(Serialize)]
struct JsonOutput {
    /// When the report was produced (RFC 3339)
    generated_at: String,
    /// Whether this was a dry-run
    dry_run: bool,
    /// Source of the versions
    source: JsonSource,
    /// Planned steps
    steps: Vec<JsonStep>,
    /// Summary statistics
    summary: JsonSummary,
    /// Per-target results
    targets: Vec<JsonTarget>,
}

#[derive(Serialize)]
struct JsonSource {
    clone_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    git_ref: String,
}

#[derive(Serialize)]
struct JsonStep {
    kind: String,
    name: String,
    version: String,
}

#[derive(Serialize)]
struct JsonSummary {
    targets: usize,
    changed: usize,
    failed: usize,
}

/// JSON representation of one target
#[derive(Serialize)]
struct JsonTarget {
    repository: String,
    dir: String,
    status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    title: Option<String>,
    pushed: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    steps: Vec<JsonStep>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    updated_files: Vec<String>,
}

impl JsonFormatter {
    fn target_to_json(&self, target: &TargetOutcome) -> JsonTarget {
        let verbose = self.verbosity == Verbosity::Verbose;
        JsonTarget {
            repository: target.repository.clone(),
            dir: target.dir.display().to_string(),
            status: target.status.as_str().to_string(),
            reason: target.status.reason().map(str::to_string),
            title: target.title.clone(),
            pushed: target.pushed,
            steps: if verbose {
                target
                    .steps
                    .iter()
                    .map(|s| JsonStep {
                        kind: s.kind.key().to_string(),
                        name: s.name.clone(),
                        version: s.version.clone(),
                    })
                    .collect()
            } else {
                Vec::new()
            },
            updated_files: target
                .updated_files
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
        }
    }

    fn write_json<T: Serialize>(value: &T, writer: &mut dyn Write) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(std::io::Error::other)?;
        writeln!(writer, "{}", json)
    }
}

impl OutputFormatter for JsonFormatter {
    fn format(&self, report: &PropagationReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let output = JsonOutput {
            generated_at: Utc::now().to_rfc3339(),
            dry_run: report.dry_run,
            source: JsonSource {
                clone_url: report.source.clone(),
                name: report.source_name.clone(),
                git_ref: report.git_ref.clone(),
            },
            steps: report
                .steps
                .iter()
                .map(|s| JsonStep {
                    kind: s.kind.key().to_string(),
                    name: s.name.clone(),
                    version: s.version.clone(),
                })
                .collect(),
            summary: JsonSummary {
                targets: report.targets.len(),
                changed: report.changed_count(),
                failed: report.failed_count(),
            },
            targets: report
                .targets
                .iter()
                .filter(|t| self.verbosity != Verbosity::Quiet || t.status.reason().is_some())
                .map(|t| self.target_to_json(t))
                .collect(),
        };

        Self::write_json(&output, writer)
    }

    fn format_target(&self, target: &TargetOutcome, writer: &mut dyn Write) -> std::io::Result<()> {
        Self::write_json(&self.target_to_json(target), writer)
    }
}
