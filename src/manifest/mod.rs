//! Manifest file detection, parsing and editing
//!
//! This module provides functionality to:
//! - Find the manifests of a kind inside a working copy
//! - Parse dependencies and the published name/version from each format
//! - Rewrite dependency versions while keeping the original formatting
//! - Support monorepo structures (pnpm-workspace.yaml)
//! - Support Tauri projects (src-tauri/Cargo.toml)

mod cargo_toml;
mod detector;
mod dockerfile;
mod go_mod;
mod package_json;
mod pyproject_toml;
mod writer;

pub use cargo_toml::CargoTomlParser;
pub use detector::{has_pnpm_workspace, manifest_paths};
pub use dockerfile::DockerfileParser;
pub use go_mod::GoModParser;
pub use package_json::PackageJsonParser;
pub use pyproject_toml::{normalize_python_name, PyprojectTomlParser};
pub use writer::{read_manifest, write_manifest, ManifestWriter, WriteResult};

use crate::domain::{Dependency, Kind, Publication, VersionSpec};
use crate::error::ManifestError;
use regex::{Captures, Regex};
use std::path::PathBuf;

/// Trait for parsing and editing manifest files
pub trait ManifestParser: Send + Sync {
    /// Returns the kind this parser handles
    fn kind(&self) -> Kind;

    /// Parse dependencies from manifest content
    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError>;

    /// Returns the name and version this manifest publishes, if any
    fn published(&self, content: &str) -> Result<Option<Publication>, ManifestError>;

    /// Rewrite every updatable occurrence of `package` to `new_version`
    ///
    /// Occurrences that already name `new_version`, or whose requirement
    /// cannot be rewritten (ranges, wildcards, git or path sources), are
    /// kept as they are. Returns `DependencyNotFound` when the manifest
    /// does not mention `package` at all.
    fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError>;

    /// Returns true if `declared` refers to `package`
    fn same_name(&self, declared: &str, package: &str) -> bool {
        declared == package
    }
}

/// Get a manifest parser for the specified kind
pub fn get_parser(kind: Kind) -> Box<dyn ManifestParser> {
    match kind {
        Kind::Npm => Box::new(PackageJsonParser),
        Kind::Cargo => Box::new(CargoTomlParser),
        Kind::Python => Box::new(PyprojectTomlParser),
        Kind::Go => Box::new(GoModParser),
        Kind::Docker => Box::new(DockerfileParser),
    }
}

/// Rewrites the `ver` group of every match of `re`
///
/// `re` must capture the text before the version as `pre` and the version
/// itself as `ver`; nothing after the version may be consumed. Sets `found`
/// when at least one match exists.
pub(crate) fn rewrite_versions(
    content: &str,
    re: &Regex,
    new_version: &str,
    found: &mut bool,
) -> String {
    re.replace_all(content, |caps: &Captures| {
        *found = true;
        let spec = VersionSpec::parse(&caps["ver"]);
        if spec.is_updatable() && !spec.matches_version(new_version) {
            format!("{}{}", &caps["pre"], spec.format_updated(new_version))
        } else {
            caps[0].to_string()
        }
    })
    .into_owned()
}

/// Builds a pattern for one package, reporting a bad name as an invalid spec
pub(crate) fn package_pattern(
    kind: Kind,
    package: &str,
    pattern: String,
) -> Result<Regex, ManifestError> {
    Regex::new(&pattern).map_err(|e| {
        ManifestError::invalid_version_spec(
            PathBuf::from(kind.manifest_filename()),
            package,
            format!("invalid regex pattern: {}", e),
        )
    })
}
