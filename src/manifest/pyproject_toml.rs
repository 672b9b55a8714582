//! pyproject.toml parser for Python projects
//!
//! Handles:
//! - project.dependencies (PEP 621)
//! - project.optional-dependencies (PEP 621)
//! - tool.poetry.dependencies (Poetry)
//! - tool.poetry.dev-dependencies (Poetry)
//! - tool.poetry.group.*.dependencies (Poetry 1.2+)
//!
//! Names are compared after PEP 503 normalization.

use crate::domain::{Dependency, Kind, Publication, VersionSpec};
use crate::error::ManifestError;
use crate::manifest::{package_pattern, rewrite_versions, ManifestParser};
use regex::Regex;
use std::sync::LazyLock;
use toml::Value;

/// Parser for pyproject.toml files
pub struct PyprojectTomlParser;

// Regex to parse PEP 508 dependency specifiers
// Matches: package-name[extra]>=1.0,<2.0 ; marker
static PEP508_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9][-a-zA-Z0-9._]*)\s*(?:\[[^\]]*\])?\s*([^;]*)").unwrap()
});

static SEPARATOR_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_.]+").unwrap());

/// Normalizes a Python distribution name (PEP 503)
pub fn normalize_python_name(name: &str) -> String {
    SEPARATOR_RE.replace_all(name.trim(), "-").to_lowercase()
}

/// Builds a pattern matching every spelling of a name that normalizes alike
fn name_pattern(package: &str) -> String {
    let normalized = normalize_python_name(package);
    let parts: Vec<String> = normalized.split('-').map(regex::escape).collect();
    format!("(?i:{})", parts.join("[-_.]+"))
}

impl PyprojectTomlParser {
    fn parse_toml(content: &str) -> Result<Value, ManifestError> {
        toml::from_str::<toml::Table>(content)
            .map(Value::Table)
            .map_err(|e| {
                ManifestError::toml_parse_error(Kind::Python.manifest_filename(), e.to_string())
            })
    }
}

impl ManifestParser for PyprojectTomlParser {
    fn kind(&self) -> Kind {
        Kind::Python
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let toml = Self::parse_toml(content)?;
        let mut dependencies = Vec::new();

        let project = toml.get("project");
        if let Some(deps) = project
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_array())
        {
            dependencies.extend(
                deps.iter()
                    .filter_map(|d| d.as_str())
                    .filter_map(|d| parse_pep508_dependency(d, false)),
            );
        }

        if let Some(optional) = project
            .and_then(|p| p.get("optional-dependencies"))
            .and_then(|d| d.as_table())
        {
            for deps in optional.values().filter_map(|d| d.as_array()) {
                dependencies.extend(
                    deps.iter()
                        .filter_map(|d| d.as_str())
                        .filter_map(|d| parse_pep508_dependency(d, false)),
                );
            }
        }

        let poetry = toml.get("tool").and_then(|t| t.get("poetry"));
        if let Some(deps) = poetry
            .and_then(|p| p.get("dependencies"))
            .and_then(|d| d.as_table())
        {
            for (name, value) in deps {
                // The interpreter requirement is not a dependency
                if name == "python" {
                    continue;
                }
                dependencies.extend(parse_poetry_dependency(name, value, false));
            }
        }

        if let Some(deps) = poetry
            .and_then(|p| p.get("dev-dependencies"))
            .and_then(|d| d.as_table())
        {
            for (name, value) in deps {
                dependencies.extend(parse_poetry_dependency(name, value, true));
            }
        }

        if let Some(groups) = poetry.and_then(|p| p.get("group")).and_then(|g| g.as_table()) {
            for (group_name, group) in groups {
                let is_dev = group_name == "dev" || group_name == "test";
                if let Some(deps) = group.get("dependencies").and_then(|d| d.as_table()) {
                    for (name, value) in deps {
                        dependencies.extend(parse_poetry_dependency(name, value, is_dev));
                    }
                }
            }
        }

        Ok(dependencies)
    }

    fn published(&self, content: &str) -> Result<Option<Publication>, ManifestError> {
        let toml = Self::parse_toml(content)?;
        let table = toml
            .get("project")
            .filter(|p| p.get("name").is_some())
            .or_else(|| toml.get("tool").and_then(|t| t.get("poetry")));

        Ok(table.and_then(|t| {
            t.get("name").and_then(|v| v.as_str()).map(|name| {
                Publication::new(
                    name,
                    t.get("version").and_then(|v| v.as_str()).map(String::from),
                )
            })
        }))
    }

    fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError> {
        let name = name_pattern(package);
        let mut found = false;

        // PEP 508 strings: "package[extra]>=1.0 ; marker"
        let pep508 = package_pattern(
            Kind::Python,
            package,
            format!(
                r#"(?P<pre>["']{}[ \t]*(?:\[[^\]"']*\])?[ \t]*)(?P<ver>[<>=!~]{{1,3}}[^"';\s,]+(?:[ \t]*,[ \t]*[^"';\s,]+)*)"#,
                name
            ),
        )?;
        let result = rewrite_versions(content, &pep508, new_version, &mut found);

        // Poetry: package = "^1.0.0"
        let simple = package_pattern(
            Kind::Python,
            package,
            format!(r#"(?m)^(?P<pre>[ \t]*{}[ \t]*=[ \t]*")(?P<ver>[^"]+)"#, name),
        )?;
        let result = rewrite_versions(&result, &simple, new_version, &mut found);

        // Poetry inline table: package = { version = "^1.0.0", ... }
        let inline = package_pattern(
            Kind::Python,
            package,
            format!(
                r#"(?m)^(?P<pre>[ \t]*{}[ \t]*=[ \t]*\{{[^}}\n]*?\bversion[ \t]*=[ \t]*")(?P<ver>[^"]+)"#,
                name
            ),
        )?;
        let result = rewrite_versions(&result, &inline, new_version, &mut found);

        if !found {
            return Err(ManifestError::dependency_not_found(
                Kind::Python.manifest_filename(),
                package,
            ));
        }
        Ok(result)
    }

    fn same_name(&self, declared: &str, package: &str) -> bool {
        normalize_python_name(declared) == normalize_python_name(package)
    }
}

fn parse_pep508_dependency(dep_str: &str, is_dev: bool) -> Option<Dependency> {
    let caps = PEP508_RE.captures(dep_str.trim())?;
    let name = caps.get(1)?.as_str();
    let version_part = caps
        .get(2)
        .map(|m| m.as_str())
        .unwrap_or("")
        .trim()
        .trim_start_matches('(')
        .trim_end_matches(')')
        .trim();

    // An unversioned requirement cannot be rewritten
    if version_part.is_empty() {
        return None;
    }

    Some(Dependency::new(
        name,
        VersionSpec::parse(version_part),
        is_dev,
        Kind::Python,
    ))
}

fn parse_poetry_dependency(name: &str, value: &Value, is_dev: bool) -> Option<Dependency> {
    let version_str = match value {
        Value::String(s) => s.as_str(),
        Value::Table(t) => t.get("version")?.as_str()?,
        _ => return None,
    };

    Some(Dependency::new(
        name,
        VersionSpec::parse(version_str),
        is_dev,
        Kind::Python,
    ))
}
