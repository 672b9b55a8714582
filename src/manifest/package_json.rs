//! package.json parser for npm projects
//!
//! Handles:
//! - dependencies
//! - devDependencies
//! - peerDependencies
//! - optionalDependencies
//! - the published `name` and `version`

use crate::domain::{Dependency, Kind, Publication, VersionSpec};
use crate::error::ManifestError;
use crate::manifest::{package_pattern, rewrite_versions, ManifestParser};
use serde_json::{Map, Value};

/// Dependency sections and whether they hold development dependencies
const SECTIONS: [(&str, bool); 4] = [
    ("dependencies", false),
    ("devDependencies", true),
    ("peerDependencies", false),
    ("optionalDependencies", false),
];

/// Parser for package.json files
pub struct PackageJsonParser;

impl PackageJsonParser {
    fn parse_json(content: &str) -> Result<Value, ManifestError> {
        serde_json::from_str(content)
            .map_err(|e| ManifestError::json_parse_error(Kind::Npm.manifest_filename(), e.to_string()))
    }
}

impl ManifestParser for PackageJsonParser {
    fn kind(&self) -> Kind {
        Kind::Npm
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let json = Self::parse_json(content)?;

        let mut dependencies = Vec::new();
        for (section, is_dev) in SECTIONS {
            if let Some(deps) = json.get(section).and_then(|v| v.as_object()) {
                parse_dependency_object(deps, is_dev, &mut dependencies);
            }
        }

        Ok(dependencies)
    }

    fn published(&self, content: &str) -> Result<Option<Publication>, ManifestError> {
        let json = Self::parse_json(content)?;
        Ok(json.get("name").and_then(|v| v.as_str()).map(|name| {
            Publication::new(
                name,
                json.get("version").and_then(|v| v.as_str()).map(String::from),
            )
        }))
    }

    fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError> {
        // Text replacement keeps the original formatting and key order.
        // Matches "package-name": "version" with flexible whitespace.
        let re = package_pattern(
            Kind::Npm,
            package,
            format!(r#"(?P<pre>"{}"\s*:\s*")(?P<ver>[^"]+)"#, regex::escape(package)),
        )?;

        let mut found = false;
        let result = rewrite_versions(content, &re, new_version, &mut found);
        if !found {
            return Err(ManifestError::dependency_not_found(
                Kind::Npm.manifest_filename(),
                package,
            ));
        }
        Ok(result)
    }
}

fn parse_dependency_object(deps: &Map<String, Value>, is_dev: bool, output: &mut Vec<Dependency>) {
    for (name, version_value) in deps {
        if let Some(version_str) = version_value.as_str() {
            output.push(Dependency::new(
                name.clone(),
                VersionSpec::parse(version_str),
                is_dev,
                Kind::Npm,
            ));
        }
    }
}
