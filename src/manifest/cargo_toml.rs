//! Cargo.toml parser for Rust projects
//!
//! Handles:
//! - dependencies
//! - dev-dependencies
//! - build-dependencies
//! - Inline table format: { version = "1.0" }
//! - Dotted table format: [dependencies.name]
//! - Target-specific tables: [target.'cfg(unix)'.dependencies]
//! - workspace.dependencies

use crate::domain::{Dependency, Kind, Publication, VersionSpec};
use crate::error::ManifestError;
use crate::manifest::{package_pattern, rewrite_versions, ManifestParser};
use toml::Value;

/// Dependency tables and whether they hold development dependencies
const TABLES: [(&str, bool); 3] = [
    ("dependencies", false),
    ("dev-dependencies", true),
    ("build-dependencies", true),
];

/// Parser for Cargo.toml files
pub struct CargoTomlParser;

impl CargoTomlParser {
    fn parse_toml(content: &str) -> Result<Value, ManifestError> {
        toml::from_str::<toml::Table>(content)
            .map(Value::Table)
            .map_err(|e| {
                ManifestError::toml_parse_error(Kind::Cargo.manifest_filename(), e.to_string())
            })
    }
}

impl ManifestParser for CargoTomlParser {
    fn kind(&self) -> Kind {
        Kind::Cargo
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let toml = Self::parse_toml(content)?;
        let mut dependencies = Vec::new();

        for (table, is_dev) in TABLES {
            if let Some(deps) = toml.get(table).and_then(|d| d.as_table()) {
                parse_cargo_dependencies(deps, is_dev, &mut dependencies);
            }
        }

        if let Some(target) = toml.get("target").and_then(|t| t.as_table()) {
            for target_config in target.values() {
                for (table, is_dev) in TABLES {
                    if let Some(deps) = target_config.get(table).and_then(|d| d.as_table()) {
                        parse_cargo_dependencies(deps, is_dev, &mut dependencies);
                    }
                }
            }
        }

        if let Some(deps) = toml
            .get("workspace")
            .and_then(|w| w.get("dependencies"))
            .and_then(|d| d.as_table())
        {
            parse_cargo_dependencies(deps, false, &mut dependencies);
        }

        Ok(dependencies)
    }

    fn published(&self, content: &str) -> Result<Option<Publication>, ManifestError> {
        let toml = Self::parse_toml(content)?;
        let Some(package) = toml.get("package") else {
            return Ok(None);
        };
        Ok(package.get("name").and_then(|v| v.as_str()).map(|name| {
            // `version.workspace = true` has no literal version
            Publication::new(
                name,
                package.get("version").and_then(|v| v.as_str()).map(String::from),
            )
        }))
    }

    fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError> {
        let name = regex::escape(package);
        let mut found = false;

        // package = "1.0.0"
        let simple = package_pattern(
            Kind::Cargo,
            package,
            format!(r#"(?m)^(?P<pre>[ \t]*{}[ \t]*=[ \t]*")(?P<ver>[^"]+)"#, name),
        )?;
        let result = rewrite_versions(content, &simple, new_version, &mut found);

        // package = { version = "1.0.0", ... }
        let inline = package_pattern(
            Kind::Cargo,
            package,
            format!(
                r#"(?m)^(?P<pre>[ \t]*{}[ \t]*=[ \t]*\{{[^}}\n]*?\bversion[ \t]*=[ \t]*")(?P<ver>[^"]+)"#,
                name
            ),
        )?;
        let result = rewrite_versions(&result, &inline, new_version, &mut found);

        // [dependencies.package]
        // version = "1.0.0"
        let dotted = package_pattern(
            Kind::Cargo,
            package,
            format!(
                r#"(?m)(?P<pre>^\[(?:target\.[^\]\n]+\.)?(?:workspace\.)?(?:dependencies|dev-dependencies|build-dependencies)\.{}\][ \t]*\n(?:(?:[ \t]*[^\[\n][^\n]*)?\n)*?[ \t]*version[ \t]*=[ \t]*")(?P<ver>[^"]+)"#,
                name
            ),
        )?;
        let result = rewrite_versions(&result, &dotted, new_version, &mut found);

        // A dotted table without a version (path or git) still counts as declared
        if !found {
            let table = package_pattern(
                Kind::Cargo,
                package,
                format!(
                    r#"(?m)^\[(?:target\.[^\]\n]+\.)?(?:workspace\.)?(?:dependencies|dev-dependencies|build-dependencies)\.{}\]"#,
                    name
                ),
            )?;
            let inline_without_version = package_pattern(
                Kind::Cargo,
                package,
                format!(r#"(?m)^[ \t]*{}[ \t]*=[ \t]*\{{"#, name),
            )?;
            found = table.is_match(&result) || inline_without_version.is_match(&result);
        }

        if !found {
            return Err(ManifestError::dependency_not_found(
                Kind::Cargo.manifest_filename(),
                package,
            ));
        }
        Ok(result)
    }
}

fn parse_cargo_dependencies(
    deps: &toml::map::Map<String, Value>,
    is_dev: bool,
    output: &mut Vec<Dependency>,
) {
    for (name, value) in deps {
        let version_str = match value {
            // Simple string: package = "1.0.0"
            Value::String(s) => Some(s.as_str()),
            // Inline table: package = { version = "1.0.0", features = [...] }
            Value::Table(t) => t.get("version").and_then(|v| v.as_str()),
            _ => None,
        };

        // Git, path and workspace dependencies carry no version to rewrite
        if let Some(version_str) = version_str {
            output.push(Dependency::new(
                name.clone(),
                VersionSpec::parse(version_str),
                is_dev,
                Kind::Cargo,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionSpecKind;

    fn parse(content: &str) -> Result<Vec<Dependency>, ManifestError> {
        CargoTomlParser.parse(content)
    }

    #[test]
    fn test_parse_simple_and_inline() {
        let content = r#"
[dependencies]
serde = { version = "1.0", features = ["derive"] }
tokio = "^1.28.0"
"#;

        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 2);

        let serde = deps.iter().find(|d| d.name == "serde").unwrap();
        assert_eq!(serde.version(), "1.0");
        assert!(!serde.is_dev);

        let tokio = deps.iter().find(|d| d.name == "tokio").unwrap();
        assert_eq!(tokio.version_spec.kind, VersionSpecKind::Caret);
    }

    #[test]
    fn test_parse_dev_and_build_dependencies() {
        let content = r#"
[dev-dependencies]
tempfile = "3.0"

[build-dependencies]
cc = "1.0"
"#;

        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().all(|d| d.is_dev));
    }

    #[test]
    fn test_parse_skips_git_path_and_workspace() {
        let content = r#"
[dependencies]
my-crate = { git = "https://github.com/example/my-crate" }
local-crate = { path = "../local-crate" }
serde = { workspace = true }
"#;

        assert!(parse(content).unwrap().is_empty());
    }

    #[test]
    fn test_parse_target_specific() {
        let content = r#"
[target.'cfg(windows)'.dependencies]
winapi = "0.3"

[target.'cfg(unix)'.dev-dependencies]
libc = "0.2"
"#;

        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().find(|d| d.name == "libc").unwrap().is_dev);
    }

    #[test]
    fn test_parse_workspace_dependencies() {
        let content = r#"
[workspace.dependencies]
anyhow = "1.0"
"#;

        let deps = parse(content).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "anyhow");
    }

    #[test]
    fn test_parse_invalid_toml() {
        let result = parse("not valid toml");
        assert!(matches!(result, Err(ManifestError::TomlParseError { .. })));
    }

    #[test]
    fn test_published() {
        let content = r#"
[package]
name = "acme-core"
version = "1.4.0"
"#;
        let published = CargoTomlParser.published(content).unwrap().unwrap();
        assert_eq!(published.name, "acme-core");
        assert_eq!(published.version.as_deref(), Some("1.4.0"));

        let content = r#"
[package]
name = "acme-core"
version.workspace = true
"#;
        let published = CargoTomlParser.published(content).unwrap().unwrap();
        assert!(published.version.is_none());

        let content = "[workspace]\nmembers = [\"a\"]\n";
        assert!(CargoTomlParser.published(content).unwrap().is_none());
    }

    #[test]
    fn test_update_caret_version() {
        let content = r#"
[dependencies]
tokio = "^1.28.0"
"#;

        let result = CargoTomlParser
            .update_version(content, "tokio", "1.35.0")
            .unwrap();
        assert!(result.contains("tokio = \"^1.35.0\""));
    }

    #[test]
    fn test_update_inline_table() {
        let content = r#"
[dependencies]
serde = { features = ["derive"], version = "1.0.0" }
"#;

        let result = CargoTomlParser
            .update_version(content, "serde", "1.1.0")
            .unwrap();
        assert!(result.contains("serde = { features = [\"derive\"], version = \"1.1.0\" }"));
    }

    #[test]
    fn test_update_dotted_table() {
        let content = r#"
[dependencies.acme-core]
features = ["full"]
version = "1.0.0"

[dependencies.other]
version = "1.0.0"
"#;

        let result = CargoTomlParser
            .update_version(content, "acme-core", "1.4.0")
            .unwrap();
        assert!(result.contains("features = [\"full\"]\nversion = \"1.4.0\""));
        assert!(result.contains("[dependencies.other]\nversion = \"1.0.0\""));
    }

    #[test]
    fn test_update_every_table() {
        let content = r#"
[dependencies]
acme-core = "1.0.0"

[dev-dependencies]
acme-core = { version = "1.0.0", features = ["test"] }

[target.'cfg(unix)'.dependencies]
acme-core = "=1.0.0"
"#;

        let result = CargoTomlParser
            .update_version(content, "acme-core", "1.4.0")
            .unwrap();
        assert!(result.contains("acme-core = \"1.4.0\""));
        assert!(result.contains("acme-core = { version = \"1.4.0\", features = [\"test\"] }"));
        assert!(result.contains("acme-core = \"=1.4.0\""));
    }

    #[test]
    fn test_update_does_not_touch_prefixed_names() {
        let content = r#"
[dependencies]
serde = "1.0.0"
serde_json = "1.0.0"
"#;

        let result = CargoTomlParser
            .update_version(content, "serde", "1.1.0")
            .unwrap();
        assert!(result.contains("serde = \"1.1.0\""));
        assert!(result.contains("serde_json = \"1.0.0\""));
    }

    #[test]
    fn test_update_path_dependency_is_unchanged() {
        let content = r#"
[dependencies]
local = { path = "../local" }
"#;

        let result = CargoTomlParser.update_version(content, "local", "2.0.0").unwrap();
        assert_eq!(result, content);
    }

    #[test]
    fn test_update_version_not_found() {
        let content = r#"
[dependencies]
serde = "1.0.0"
"#;

        let err = CargoTomlParser
            .update_version(content, "nonexistent", "1.0.0")
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
