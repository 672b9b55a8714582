//! Manifest file writing and update operations
//!
//! This module provides:
//! - ManifestWriter for applying one version change to a manifest file
//! - Dry-run mode support (no actual file modifications)
//! - Format preservation when updating versions

use crate::domain::DependencyVersionChange;
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use std::fs;
use std::path::{Path, PathBuf};

/// Writer for manifest files that applies version changes
#[derive(Debug, Clone, Copy, Default)]
pub struct ManifestWriter {
    /// Whether to run in dry-run mode (no file modifications)
    dry_run: bool,
}

/// Result of applying a change to a manifest file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteResult {
    /// Path to the manifest file
    pub path: PathBuf,
    /// Whether the manifest declares the dependency at all
    pub declared: bool,
    /// Whether the content differs after the change
    pub changed: bool,
    /// Whether the new content was written to disk
    pub file_modified: bool,
}

impl WriteResult {
    fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            declared: false,
            changed: false,
            file_modified: false,
        }
    }
}

impl ManifestWriter {
    /// Create a new ManifestWriter
    pub fn new(dry_run: bool) -> Self {
        Self { dry_run }
    }

    /// Create a ManifestWriter in dry-run mode
    pub fn dry_run() -> Self {
        Self { dry_run: true }
    }

    /// Check if this writer is in dry-run mode
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Applies one version change to the manifest at `path`
    ///
    /// A manifest that does not declare the dependency is reported as not
    /// declared rather than as an error. In dry-run mode the change is
    /// computed and reported but never written.
    pub fn apply_change(
        &self,
        path: &Path,
        parser: &dyn ManifestParser,
        change: &DependencyVersionChange,
    ) -> Result<WriteResult, ManifestError> {
        let mut result = WriteResult::new(path);
        let content = read_manifest(path)?;

        let updated = match parser.update_version(&content, &change.name, &change.version) {
            Ok(updated) => updated,
            Err(e) if e.is_not_found() => return Ok(result),
            Err(e) => return Err(e.at(path)),
        };

        result.declared = true;
        result.changed = updated != content;
        if !result.changed {
            log_unchanged(path, parser, &content, change);
        }

        if result.changed && !self.dry_run {
            write_manifest(path, &updated)?;
            result.file_modified = true;
        }

        Ok(result)
    }
}

/// Explains at debug level why a declaring manifest was left alone
fn log_unchanged(
    path: &Path,
    parser: &dyn ManifestParser,
    content: &str,
    change: &DependencyVersionChange,
) {
    let Ok(dependencies) = parser.parse(content) else {
        return;
    };
    for dependency in dependencies
        .iter()
        .filter(|d| parser.same_name(&d.name, &change.name))
    {
        let reason = if dependency.version_spec.is_updatable() {
            "already at version"
        } else {
            "requirement is not updatable"
        };
        tracing::debug!(
            file = %path.display(),
            dependency = %dependency.name,
            spec = %dependency.version_spec,
            reason,
            "manifest left unchanged"
        );
    }
}

/// Read a manifest file content safely
pub fn read_manifest(path: &Path) -> Result<String, ManifestError> {
    fs::read_to_string(path).map_err(|e| ManifestError::read_error(path, e))
}

/// Write content to a manifest file
pub fn write_manifest(path: &Path, content: &str) -> Result<(), ManifestError> {
    fs::write(path, content).map_err(|e| ManifestError::write_error(path, e))
}
