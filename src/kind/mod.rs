//! Project kinds and their updaters
//!
//! This module provides:
//! - The `KindUpdater` capability every supported ecosystem implements
//! - Resolution of declared push entries into version changes
//! - The fixed-order registry shared by every propagation run

mod manifest_kind;

pub use manifest_kind::ManifestKindUpdater;

use crate::context::{ContextId, UpdateContextTree};
use crate::domain::{DependencyVersionChange, Kind, KindPush};
use crate::error::ManifestError;
use crate::manifest::ManifestWriter;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Operations one project kind supports
pub trait KindUpdater: Send + Sync {
    /// Returns the kind this updater handles
    fn kind(&self) -> Kind;

    /// Returns true if the working copy has a manifest of this kind
    fn applies_to(&self, dir: &Path) -> bool;

    /// Returns the version the working copy publishes for `name`
    fn read_version(&self, dir: &Path, name: &str) -> Result<Option<String>, ManifestError>;

    /// Edits every manifest of this kind that depends on `change.name`
    ///
    /// Returns the paths that were (or in dry-run mode would be) modified.
    fn apply_step(
        &self,
        tree: &UpdateContextTree,
        ctx: ContextId,
        change: &DependencyVersionChange,
    ) -> Result<BTreeSet<PathBuf>, ManifestError>;

    /// Turns the declared entries of this kind into version changes
    ///
    /// Entries without an explicit version read it from the repository the
    /// tree is rooted at. Entries that cannot be resolved are logged and
    /// skipped.
    fn emit_push_steps(
        &self,
        tree: &UpdateContextTree,
        _ctx: ContextId,
        push: &KindPush,
    ) -> Vec<DependencyVersionChange> {
        let kind = self.kind();
        let dir = tree.repository().dir();
        let mut steps = Vec::new();

        for entry in push.entries() {
            let version = match entry.version {
                Some(version) => version,
                None => match self.read_version(dir, &entry.name) {
                    Ok(Some(version)) => version,
                    Ok(None) => {
                        tracing::warn!(
                            kind = %kind,
                            name = %entry.name,
                            dir = %dir.display(),
                            "source does not publish a version for this name"
                        );
                        continue;
                    }
                    Err(e) => {
                        tracing::warn!(kind = %kind, name = %entry.name, error = %e, "failed to read source version");
                        continue;
                    }
                },
            };

            if let Err(reason) = validate_version(kind, &version) {
                tracing::warn!(kind = %kind, name = %entry.name, version = %version, "{}", reason);
                continue;
            }

            let version = normalize_version(kind, &version);
            steps.push(DependencyVersionChange::new(kind, entry.name, version));
        }

        steps
    }
}

/// Checks that a version is acceptable for a kind
///
/// npm and cargo versions must be valid semver (a leading `v` is tolerated);
/// other kinds accept any non-empty version.
pub fn validate_version(kind: Kind, version: &str) -> Result<(), String> {
    let version = version.trim();
    if version.is_empty() {
        return Err("empty version".to_string());
    }
    if kind.requires_semver() {
        semver::Version::parse(version.strip_prefix('v').unwrap_or(version))
            .map_err(|e| format!("not a valid {} version: {}", kind.display_name(), e))?;
    }
    Ok(())
}

/// Returns the version as it is written into target manifests
///
/// The leading `v` tolerated on semver kinds is dropped, since npm and cargo
/// requirements never carry it.
pub fn normalize_version(kind: Kind, version: &str) -> String {
    let version = version.trim();
    if kind.requires_semver() {
        version.strip_prefix('v').unwrap_or(version).to_string()
    } else {
        version.to_string()
    }
}

/// Fixed-order collection of updaters, one per kind
pub struct KindRegistry {
    updaters: Vec<Box<dyn KindUpdater>>,
}

impl KindRegistry {
    /// Creates the registry of every supported kind in `Kind::all()` order
    pub fn new(writer: ManifestWriter) -> Self {
        Self {
            updaters: Kind::all()
                .iter()
                .map(|kind| Box::new(ManifestKindUpdater::new(*kind, writer)) as Box<dyn KindUpdater>)
                .collect(),
        }
    }

    /// Creates a registry from explicit updaters, kept in the given order
    pub fn with_updaters(updaters: Vec<Box<dyn KindUpdater>>) -> Self {
        Self { updaters }
    }

    /// Iterates the updaters in evaluation order
    pub fn iter(&self) -> impl Iterator<Item = &dyn KindUpdater> {
        self.updaters.iter().map(|u| u.as_ref())
    }

    /// Returns the updater for a kind
    pub fn get(&self, kind: Kind) -> Option<&dyn KindUpdater> {
        self.iter().find(|u| u.kind() == kind)
    }

    /// Returns the kinds that have a manifest in the working copy
    pub fn applicable(&self, dir: &Path) -> Vec<Kind> {
        self.iter()
            .filter(|u| u.applies_to(dir))
            .map(|u| u.kind())
            .collect()
    }
}

impl std::fmt::Debug for KindRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.updaters.iter().map(|u| u.kind()))
            .finish()
    }
}
