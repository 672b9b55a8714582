//! Kind updater backed by a manifest parser

use super::KindUpdater;
use crate::context::{ContextId, UpdateContextTree};
use crate::domain::{DependencyVersionChange, Kind};
use crate::error::ManifestError;
use crate::manifest::{get_parser, manifest_paths, read_manifest, ManifestParser, ManifestWriter};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Updates the manifests of one kind through its parser
pub struct ManifestKindUpdater {
    kind: Kind,
    parser: Box<dyn ManifestParser>,
    writer: ManifestWriter,
}

impl ManifestKindUpdater {
    /// Creates an updater using the standard parser for `kind`
    pub fn new(kind: Kind, writer: ManifestWriter) -> Self {
        Self {
            kind,
            parser: get_parser(kind),
            writer,
        }
    }
}

impl KindUpdater for ManifestKindUpdater {
    fn kind(&self) -> Kind {
        self.kind
    }

    fn applies_to(&self, dir: &Path) -> bool {
        !manifest_paths(self.kind, dir).is_empty()
    }

    fn read_version(&self, dir: &Path, name: &str) -> Result<Option<String>, ManifestError> {
        for path in manifest_paths(self.kind, dir) {
            let content = read_manifest(&path)?;
            let published = self.parser.published(&content).map_err(|e| e.at(&path))?;
            if let Some(published) = published {
                if self.parser.same_name(&published.name, name) {
                    return Ok(published.version);
                }
            }
        }
        Ok(None)
    }

    fn apply_step(
        &self,
        tree: &UpdateContextTree,
        ctx: ContextId,
        change: &DependencyVersionChange,
    ) -> Result<BTreeSet<PathBuf>, ManifestError> {
        let mut updated = BTreeSet::new();
        if change.kind != self.kind {
            return Ok(updated);
        }

        let dir = tree.repository().dir();
        for path in manifest_paths(self.kind, dir) {
            let result = self.writer.apply_change(&path, self.parser.as_ref(), change)?;
            if result.changed {
                let relative = path.strip_prefix(dir).unwrap_or(&path);
                tracing::debug!(context = ?ctx, file = %relative.display(), change = %change, "updated manifest");
                updated.insert(tree.file(relative));
            }
        }

        Ok(updated)
    }
}
