//! Version change steps produced by the planner

use super::Kind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single unit of propagation work: set `name` of `kind` to `version`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyVersionChange {
    /// Kind whose manifests carry this dependency
    pub kind: Kind,
    /// Package, crate, module or image name
    pub name: String,
    /// Target version
    pub version: String,
}

impl DependencyVersionChange {
    /// Creates a new change
    pub fn new(kind: Kind, name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            version: version.into(),
        }
    }

    /// Renders a list of changes for log lines and commit bodies
    pub fn describe(changes: &[DependencyVersionChange]) -> String {
        if changes.is_empty() {
            return "(none)".to_string();
        }
        changes
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for DependencyVersionChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}@{}", self.kind, self.name, self.version)
    }
}
