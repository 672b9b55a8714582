//! Project kind definitions for supported ecosystems

use serde::{Deserialize, Serialize};
use std::fmt;

/// Supported project kinds, in the fixed order the kind registry evaluates them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    /// npm packages (package.json)
    Npm,
    /// Rust crates (Cargo.toml)
    Cargo,
    /// Python packages (pyproject.toml)
    Python,
    /// Go modules (go.mod)
    Go,
    /// Container images (Dockerfile)
    Docker,
}

impl Kind {
    /// Returns the manifest filename for this kind
    pub fn manifest_filename(&self) -> &'static str {
        match self {
            Kind::Npm => "package.json",
            Kind::Cargo => "Cargo.toml",
            Kind::Python => "pyproject.toml",
            Kind::Go => "go.mod",
            Kind::Docker => "Dockerfile",
        }
    }

    /// Returns the configuration key for this kind
    pub fn key(&self) -> &'static str {
        match self {
            Kind::Npm => "npm",
            Kind::Cargo => "cargo",
            Kind::Python => "python",
            Kind::Go => "go",
            Kind::Docker => "docker",
        }
    }

    /// Returns the display name for this kind
    pub fn display_name(&self) -> &'static str {
        match self {
            Kind::Npm => "npm",
            Kind::Cargo => "Cargo",
            Kind::Python => "Python",
            Kind::Go => "Go",
            Kind::Docker => "Docker",
        }
    }

    /// Whether declared versions for this kind must be valid semver
    pub fn requires_semver(&self) -> bool {
        matches!(self, Kind::Npm | Kind::Cargo)
    }

    /// Returns all kinds in evaluation order
    pub fn all() -> &'static [Kind] {
        &[Kind::Npm, Kind::Cargo, Kind::Python, Kind::Go, Kind::Docker]
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}
