//! go.mod parser for Go modules
//!
//! Handles:
//! - the `module` directive
//! - require statements (single and block)
//! - replace directives (never rewritten)

use crate::domain::{Dependency, Kind, Publication, VersionSpec};
use crate::error::ManifestError;
use crate::manifest::ManifestParser;
use regex::Regex;
use std::sync::LazyLock;

/// Parser for go.mod files
pub struct GoModParser;

// Regex for single require: require module/path v1.2.3
static SINGLE_REQUIRE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*require\s+(\S+)\s+(v\d+\.\d+\.\d+\S*)\s*(//.*)?$").unwrap()
});

// Regex for require block entry: module/path v1.2.3
static BLOCK_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\S+)\s+(v\d+\.\d+\.\d+\S*)\s*(//.*)?$").unwrap());

static MODULE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s*module\s+"?([^\s"]+)"?"#).unwrap());

/// Where a line sits inside go.mod
#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Require,
    Other,
}

/// A parsed require line
struct RequireLine<'a> {
    module: &'a str,
    version: &'a str,
    comment: Option<&'a str>,
}

/// Walks go.mod and calls `f` for each line with its require entry, if any
fn for_each_line<'a>(content: &'a str, mut f: impl FnMut(&'a str, Option<RequireLine<'a>>)) {
    let mut block = Block::None;

    for line in content.lines() {
        let trimmed = line.trim();

        let entry = if trimmed == ")" {
            block = Block::None;
            None
        } else if trimmed.starts_with("require (") {
            block = Block::Require;
            None
        } else if trimmed.ends_with('(') {
            // replace, exclude and retract blocks
            block = Block::Other;
            None
        } else if block == Block::Other || trimmed.starts_with("//") {
            None
        } else {
            let caps = if block == Block::Require {
                BLOCK_ENTRY_RE.captures(line)
            } else {
                SINGLE_REQUIRE_RE.captures(line)
            };
            caps.and_then(|caps| {
                Some(RequireLine {
                    module: caps.get(1)?.as_str(),
                    version: caps.get(2)?.as_str(),
                    comment: caps.get(3).map(|m| m.as_str()),
                })
            })
        };

        f(line, entry);
    }
}

impl ManifestParser for GoModParser {
    fn kind(&self) -> Kind {
        Kind::Go
    }

    fn parse(&self, content: &str) -> Result<Vec<Dependency>, ManifestError> {
        let mut dependencies = Vec::new();

        for_each_line(content, |_, entry| {
            if let Some(entry) = entry {
                // Indirect dependencies are treated as dev dependencies
                let is_indirect = entry.comment.is_some_and(|c| c.contains("indirect"));
                dependencies.push(Dependency::new(
                    entry.module,
                    VersionSpec::parse(entry.version),
                    is_indirect,
                    Kind::Go,
                ));
            }
        });

        Ok(dependencies)
    }

    fn published(&self, content: &str) -> Result<Option<Publication>, ManifestError> {
        // Module versions live in VCS tags, not in go.mod
        Ok(content
            .lines()
            .find_map(|line| MODULE_RE.captures(line))
            .map(|caps| Publication::new(&caps[1], None)))
    }

    fn update_version(
        &self,
        content: &str,
        package: &str,
        new_version: &str,
    ) -> Result<String, ManifestError> {
        let mut result = String::with_capacity(content.len());
        let mut found = false;

        for_each_line(content, |line, entry| {
            let rewritten = entry.filter(|e| e.module == package).and_then(|e| {
                found = true;
                let spec = VersionSpec::parse(e.version);
                if !spec.is_updatable() || spec.matches_version(new_version) {
                    return None;
                }
                let start = line.find(e.version)?;
                let mut new_line = String::with_capacity(line.len());
                new_line.push_str(&line[..start]);
                new_line.push('v');
                new_line.push_str(new_version.trim_start_matches('v'));
                new_line.push_str(&line[start + e.version.len()..]);
                Some(new_line)
            });

            result.push_str(rewritten.as_deref().unwrap_or(line));
            result.push('\n');
        });

        // Remove trailing newline if original didn't have one
        if !content.ends_with('\n') && result.ends_with('\n') {
            result.pop();
        }

        if !found {
            return Err(ManifestError::dependency_not_found(
                Kind::Go.manifest_filename(),
                package,
            ));
        }
        Ok(result)
    }
}
