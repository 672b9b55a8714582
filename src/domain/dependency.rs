//! Dependency information structures

use super::{Kind, VersionSpec};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A dependency declared in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dependency {
    /// Package, crate, module or image name
    pub name: String,
    /// Version specification
    pub version_spec: VersionSpec,
    /// Whether this is a development dependency
    pub is_dev: bool,
    /// The kind this dependency belongs to
    pub kind: Kind,
}

impl Dependency {
    /// Creates a new dependency
    pub fn new(name: impl Into<String>, version_spec: VersionSpec, is_dev: bool, kind: Kind) -> Self {
        Self {
            name: name.into(),
            version_spec,
            is_dev,
            kind,
        }
    }

    /// Creates a new production dependency
    pub fn production(name: impl Into<String>, version_spec: VersionSpec, kind: Kind) -> Self {
        Self::new(name, version_spec, false, kind)
    }

    /// Creates a new development dependency
    pub fn development(name: impl Into<String>, version_spec: VersionSpec, kind: Kind) -> Self {
        Self::new(name, version_spec, true, kind)
    }

    /// Returns the current version string
    pub fn version(&self) -> &str {
        &self.version_spec.version
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dev_marker = if self.is_dev { " (dev)" } else { "" };
        write!(
            f,
            "{}@{}{} [{}]",
            self.name, self.version_spec, dev_marker, self.kind
        )
    }
}

/// The package a manifest publishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Publication {
    /// Published name
    pub name: String,
    /// Published version, if the manifest records one
    pub version: Option<String>,
}

impl Publication {
    /// Creates a new publication
    pub fn new(name: impl Into<String>, version: Option<String>) -> Self {
        Self {
            name: name.into(),
            version,
        }
    }
}
