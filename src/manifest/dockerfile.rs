//! Dockerfile parser for container images
//!
//! Handles `FROM [--platform=...] image[:tag][@digest] [AS stage]` lines.
//! The image repository is the dependency name and the tag its version.

use crate::domain::{Dependency, Kind, Publication, VersionSpec};
use crate::error::ManifestError;
use crate::manifest::{package_pattern, rewrite_versions, ManifestParser};
use regex::Regex;
use std::sync::LazyLock;

/// Parser for Dockerfiles
pub struct DockerfileParser;

static FROM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^\s*FROM\s+(?:--\S+\s+)*(\S+)").unwrap());

/// Splits an image reference into repository and tag
///
/// A digest is dropped. The tag separator is the last `:` after the last `/`
/// so registry ports are kept in the repository.
fn split_image(reference: &str) -> (&str, Option<&str>) {
    let reference = reference.split('@').next().unwrap_or(reference);
    let name_start = reference.rfind('/').map(|i| i + 1).unwrap_or(0);
    match reference[name_start..].rfind(':') {
        Some(i) => {
            let colon = name_start + i;
            (&reference[..colon], Some(&reference[colon + 1..]))
        }
        None => (reference, None),
    }
}

impl ManifestParser for DockerfileParser {
    fn kind(&self) -> Kind {
        Kind::Docker
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let mut dependencies = Vec::new();

        for line in content.lines() {
            let Some(caps) = FROM_RE.captures(line) else {
                continue;
            };
            let reference = &caps[1];
            // Build arguments are resolved at build time
            if reference.contains('$') {
                continue;
            }
            let (image, tag) = split_image(reference);
            let spec = match tag {
                Some(tag) => VersionSpec::parse(tag),
                None => VersionSpec::parse(""),
            };
            dependencies.push(Dependency::production(image, spec, Kind::Docker));
        }

        Ok(dependencies)
    }

    fn published(&self, _content: &str) -> Result<Option<Publication>, ManifestError> {
        Ok(None)
    }

    fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError> {
        let re = package_pattern(
            Kind::Docker,
            package,
            format!(
                r"(?mi)^(?P<pre>[ \t]*FROM[ \t]+(?:--\S+[ \t]+)*{}:)(?P<ver>[^\s@]+)",
                regex::escape(package)
            ),
        )?;

        let mut found = false;
        let result = rewrite_versions(content, &re, new_version, &mut found);

        if !found {
            // An untagged reference still declares the image
            let untagged = package_pattern(
                Kind::Docker,
                package,
                format!(
                    r"(?mi)^[ \t]*FROM[ \t]+(?:--\S+[ \t]+)*{}(?:[ \t@]|$)",
                    regex::escape(package)
                ),
            )?;
            found = untagged.is_match(content);
        }

        if !found {
            return Err(ManifestError::dependency_not_found(
                Kind::Docker.manifest_filename(),
                package,
            ));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::VersionSpecKind;

    const DOCKERFILE: &str = "FROM --platform=linux/amd64 acme/base:1.2.0 AS build\n\
RUN make\n\
\n\
from registry.example.com:5000/acme/runtime:3.19-alpine\n\
COPY --from=build /out /app\n\
FROM scratch\n";

    #[test]
    fn test_split_image() {
        assert_eq!(split_image("node:20"), ("node", Some("20")));
        assert_eq!(
            split_image("registry:5000/acme/app:1.0"),
            ("registry:5000/acme/app", Some("1.0"))
        );
        assert_eq!(split_image("registry:5000/acme/app"), ("registry:5000/acme/app", None));
        assert_eq!(split_image("alpine@sha256:abc"), ("alpine", None));
    }

    #[test]
    fn test_parse_from_lines() {
        let deps = DockerfileParser.parse(DOCKERFILE).unwrap();
        assert_eq!(deps.len(), 3);

        assert_eq!(deps[0].name, "acme/base");
        assert_eq!(deps[0].version(), "1.2.0");

        assert_eq!(deps[1].name, "registry.example.com:5000/acme/runtime");
        assert_eq!(deps[1].version(), "3.19-alpine");

        assert_eq!(deps[2].name, "scratch");
        assert_eq!(deps[2].version_spec.kind, VersionSpecKind::Unsupported);
    }

    #[test]
    fn test_parse_skips_build_args() {
        let deps = DockerfileParser.parse("ARG BASE=alpine\nFROM ${BASE}\n").unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn test_published_is_none() {
        assert!(DockerfileParser.published(DOCKERFILE).unwrap().is_none());
    }

    #[test]
    fn test_update_keeps_platform_and_stage() {
        let result = DockerfileParser
            .update_version(DOCKERFILE, "acme/base", "1.3.0")
            .unwrap();
        assert!(result.starts_with("FROM --platform=linux/amd64 acme/base:1.3.0 AS build\n"));
        assert!(result.contains("runtime:3.19-alpine"));
    }

    #[test]
    fn test_update_does_not_touch_longer_names() {
        let content = "FROM acme/base-dev:1.2.0\n";
        let err = DockerfileParser
            .update_version(content, "acme/base", "1.3.0")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_update_latest_is_unchanged() {
        let content = "FROM acme/base:latest\n";
        let result = DockerfileParser
            .update_version(content, "acme/base", "1.3.0")
            .unwrap();
        assert_eq!(result, content);
    }
}
