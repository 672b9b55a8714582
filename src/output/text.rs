//! Text output formatter for human-readable display
//!
//! This module provides:
//! - The source, ref and planned steps as a header
//! - One status line per target with its commit title
//! - Updated files in verbose mode
//! - A summary line with the run time

use crate::domain::DependencyVersionChange;
use crate::orchestrator::{PropagationReport, TargetOutcome, TargetStatus};
use crate::output::{OutputFormatter, Verbosity};
use chrono::Local;
use colored::{ColoredString, Colorize};
use std::io::Write;

/// Text formatter for human-readable output
pub struct TextFormatter {
    /// Verbosity level
    verbosity: Verbosity,
    /// Whether to use colors
    color: bool,
}

impl TextFormatter {
    /// Create a new text formatter
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            color: true,
        }
    }

    /// Create a new text formatter with color option
    pub fn with_color(verbosity: Verbosity, color: bool) -> Self {
        Self { verbosity, color }
    }

    fn paint(&self, text: &str, style: fn(&str) -> ColoredString) -> String {
        if self.color {
            style(text).to_string()
        } else {
            text.to_string()
        }
    }

    /// Get the dry-run prefix if applicable
    fn dry_run_prefix(&self, report: &PropagationReport) -> String {
        if report.dry_run {
            format!("{} ", self.paint("(dry-run)", |s| s.cyan()))
        } else {
            String::new()
        }
    }

    fn status_marker(&self, status: &TargetStatus) -> String {
        match status {
            TargetStatus::Changed => self.paint("✓", |s| s.green()),
            TargetStatus::Unchanged => self.paint("·", |s| s.dimmed()),
            TargetStatus::Skipped => self.paint("-", |s| s.dimmed()),
            TargetStatus::Failed(_) => self.paint("✗", |s| s.red().bold()),
        }
    }

    fn format_step(&self, step: &DependencyVersionChange) -> String {
        format!(
            "{} {} {} {}",
            self.paint(step.kind.display_name(), |s| s.cyan()),
            step.name,
            self.paint("→", |s| s.dimmed()),
            self.paint(&step.version, |s| s.bright_white().bold())
        )
    }

    fn format_header(&self, report: &PropagationReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let source = match &report.source_name {
            Some(name) => format!("{} ({})", name, report.source),
            None => report.source.clone(),
        };
        writeln!(
            writer,
            "{}Pushing versions from {} at {}",
            self.dry_run_prefix(report),
            self.paint(&source, |s| s.bold()),
            report.git_ref
        )?;

        if report.steps.is_empty() {
            writeln!(writer, "  {}", self.paint("No versions to push", |s| s.dimmed()))?;
        } else {
            for step in &report.steps {
                writeln!(writer, "  {}", self.format_step(step))?;
            }
        }
        writeln!(writer)
    }

    fn format_summary(&self, report: &PropagationReport, writer: &mut dyn Write) -> std::io::Result<()> {
        let changed = report.changed_count();
        let failed = report.failed_count();
        let total = report.targets.len();

        let mut parts = vec![format!(
            "{} of {} target(s) changed",
            self.paint(&changed.to_string(), |s| s.green()),
            total
        )];
        if failed > 0 {
            parts.push(format!(
                "{} failed",
                self.paint(&failed.to_string(), |s| s.red().bold())
            ));
        }
        writeln!(writer, "{}{}", self.dry_run_prefix(report), parts.join(", "))?;

        if self.verbosity == Verbosity::Verbose {
            let finished = Local::now().format("%Y/%m/%d %H:%M:%S").to_string();
            writeln!(writer, "{}", self.paint(&format!("Finished at {}", finished), |s| s.dimmed()))?;
        }
        Ok(())
    }
}

impl OutputFormatter for TextFormatter {
    fn format(&self, report: &PropagationReport, writer: &mut dyn Write) -> std::io::Result<()> {
        if self.verbosity == Verbosity::Quiet {
            for target in report.targets.iter().filter(|t| t.status.reason().is_some()) {
                self.format_target(target, writer)?;
            }
            return self.format_summary(report, writer);
        }

        self.format_header(report, writer)?;

        let mut shown = 0;
        for target in &report.targets {
            let quiet_status = matches!(target.status, TargetStatus::Unchanged | TargetStatus::Skipped);
            if quiet_status && self.verbosity != Verbosity::Verbose {
                continue;
            }
            self.format_target(target, writer)?;
            shown += 1;
        }
        if shown > 0 {
            writeln!(writer)?;
        }

        self.format_summary(report, writer)
    }

    fn format_target(&self, target: &TargetOutcome, writer: &mut dyn Write) -> std::io::Result<()> {
        let marker = self.status_marker(&target.status);
        let name = self.paint(&target.repository, |s| s.bold());

        match &target.status {
            TargetStatus::Changed => {
                let title = target.title.as_deref().unwrap_or_default();
                let pushed = if target.pushed {
                    String::new()
                } else {
                    format!(" {}", self.paint("(not pushed)", |s| s.dimmed()))
                };
                writeln!(writer, "{} {}: {}{}", marker, name, title, pushed)?;
            }
            TargetStatus::Unchanged => {
                writeln!(writer, "{} {}: {}", marker, name, self.paint("up to date", |s| s.dimmed()))?;
            }
            TargetStatus::Skipped => {
                writeln!(writer, "{} {}: {}", marker, name, self.paint("source repository", |s| s.dimmed()))?;
            }
            TargetStatus::Failed(reason) => {
                writeln!(writer, "{} {}: {}", marker, name, self.paint(reason, |s| s.red()))?;
            }
        }

        if self.verbosity == Verbosity::Verbose {
            for file in &target.updated_files {
                writeln!(writer, "    {}", self.paint(&file.display().to_string(), |s| s.dimmed()))?;
            }
        }
        Ok(())
    }
}
