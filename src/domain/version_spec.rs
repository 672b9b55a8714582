//! Version specification types shared by every kind
//!
//! Handles version requirements like:
//! - npm: `^1.2.3`, `~1.2.3`, `>=1.0.0`, `1.2.3`
//! - Python: `>=1.2.3`, `==1.2.3`, `~=1.2`
//! - Cargo: `1.2.3`, `^1.2.3`, `=1.2.3`
//! - Go: `v1.2.3`
//!
//! A requirement is split into an operator prefix and a bare version so the
//! operator survives when a new version is written back.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static SINGLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\^|~=|~|>=|<=|==|>|<|=|v)?(\d+(?:\.\d+){0,3}(?:[-+][0-9A-Za-z.+\-]+)?)$")
        .unwrap()
});

static WILDCARD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+(?:\.\d+)?\.)?[xX*]$").unwrap());

/// The kind of version specification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSpecKind {
    /// Exact version (`1.2.3`, `==1.2.3`, `=1.2.3`, `v1.2.3`)
    Exact,
    /// Caret range (`^1.2.3`)
    Caret,
    /// Tilde range (`~1.2.3`)
    Tilde,
    /// Python compatible release (`~=1.2`)
    Compatible,
    /// Greater than or equal (`>=1.2.3`)
    GreaterOrEqual,
    /// Greater than (`>1.2.3`)
    Greater,
    /// Less than or equal (`<=1.2.3`)
    LessOrEqual,
    /// Less than (`<1.2.3`)
    Less,
    /// Compound range (`>=1.0.0 <2.0.0`, `>=1,<2`, `1 || 2`)
    Range,
    /// Wildcard (`*`, `1.x`, `1.2.*`)
    Wildcard,
    /// Anything else: git urls, `workspace:`, `file:`, dist-tags
    Unsupported,
}

impl VersionSpecKind {
    /// Returns true if a new version can be written into this requirement
    pub fn is_updatable(&self) -> bool {
        !matches!(
            self,
            VersionSpecKind::Range | VersionSpecKind::Wildcard | VersionSpecKind::Unsupported
        )
    }

    fn from_prefix(prefix: Option<&str>) -> Self {
        match prefix {
            Some("^") => VersionSpecKind::Caret,
            Some("~") => VersionSpecKind::Tilde,
            Some("~=") => VersionSpecKind::Compatible,
            Some(">=") => VersionSpecKind::GreaterOrEqual,
            Some(">") => VersionSpecKind::Greater,
            Some("<=") => VersionSpecKind::LessOrEqual,
            Some("<") => VersionSpecKind::Less,
            _ => VersionSpecKind::Exact,
        }
    }
}

/// A version specification with its original string representation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSpec {
    /// The kind of version specification
    pub kind: VersionSpecKind,
    /// The raw version string as it appears in the manifest
    pub raw: String,
    /// The extracted version number (without prefix/suffix)
    pub version: String,
    /// Optional prefix to preserve during updates (e.g., `^`, `~`, `>=`, `v`)
    pub prefix: Option<String>,
    /// Optional suffix to preserve (e.g., `// indirect`)
    pub suffix: Option<String>,
}

impl VersionSpec {
    /// Creates a new VersionSpec
    pub fn new(kind: VersionSpecKind, raw: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
            version: version.into(),
            prefix: None,
            suffix: None,
        }
    }

    /// Creates an exact spec whose raw text is the version itself
    pub fn exact(version: impl Into<String>) -> Self {
        let version = version.into();
        Self::new(VersionSpecKind::Exact, version.clone(), version)
    }

    /// Parses a version requirement as written in a manifest
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Some(caps) = SINGLE_RE.captures(trimmed) {
            let prefix = caps.get(1).map(|m| m.as_str());
            let version = caps.get(2).map(|m| m.as_str()).unwrap_or_default();
            let mut spec = Self::new(VersionSpecKind::from_prefix(prefix), trimmed, version);
            spec.prefix = prefix.map(String::from);
            return spec;
        }

        let kind = if trimmed == "*" || WILDCARD_RE.is_match(trimmed) {
            VersionSpecKind::Wildcard
        } else if trimmed.contains(',')
            || trimmed.contains("||")
            || trimmed.contains(" - ")
            || trimmed.split_whitespace().count() > 1
        {
            VersionSpecKind::Range
        } else {
            VersionSpecKind::Unsupported
        };
        Self::new(kind, trimmed, "")
    }

    /// Sets the prefix (builder pattern)
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the suffix (builder pattern)
    pub fn with_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    /// Returns true if a new version can be written into this spec
    pub fn is_updatable(&self) -> bool {
        self.kind.is_updatable()
    }

    /// Returns true if this spec already names the given version
    ///
    /// A leading `v` is ignored on both sides so `v1.2.0` matches `1.2.0`.
    pub fn matches_version(&self, version: &str) -> bool {
        let ours = self.version.trim_start_matches('v');
        !ours.is_empty() && ours == version.trim().trim_start_matches('v')
    }

    /// Formats a new version while preserving the original format
    pub fn format_updated(&self, new_version: &str) -> String {
        let mut result = String::new();

        match self.prefix.as_deref() {
            // Go versions keep exactly one `v`
            Some("v") => {
                result.push('v');
                result.push_str(new_version.trim_start_matches('v'));
            }
            Some(prefix) => {
                result.push_str(prefix);
                result.push_str(new_version);
            }
            None => result.push_str(new_version),
        }

        if let Some(ref suffix) = self.suffix {
            result.push_str(suffix);
        }

        result
    }
}

impl fmt::Display for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
