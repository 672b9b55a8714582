//! Locally checked-out repositories

use super::PushDeclaration;
use crate::repository::{normalize_clone_url, same_repository};
use std::path::{Path, PathBuf};

/// Configured metadata for a repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryDetails {
    /// Full name such as `acme/widgets`
    pub full_name: Option<String>,
    /// Versions this repository pushes into downstream repositories
    pub push: Option<PushDeclaration>,
}

/// A known repository with a local working copy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalRepository {
    /// Working copy directory
    pub dir: PathBuf,
    /// Every clone URL this repository is known by
    pub clone_urls: Vec<String>,
    /// Optional configured metadata
    pub details: Option<RepositoryDetails>,
}

impl LocalRepository {
    /// Creates a repository without metadata
    pub fn new(dir: impl Into<PathBuf>, clone_urls: Vec<String>) -> Self {
        Self {
            dir: dir.into(),
            clone_urls,
            details: None,
        }
    }

    /// Attaches metadata (builder pattern)
    pub fn with_details(mut self, details: RepositoryDetails) -> Self {
        self.details = Some(details);
        self
    }

    /// Returns the working copy directory
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns the primary clone URL
    pub fn clone_url(&self) -> Option<&str> {
        self.clone_urls.first().map(String::as_str)
    }

    /// Returns true if `url` denotes this repository
    pub fn has_clone_url(&self, url: &str) -> bool {
        self.clone_urls.iter().any(|known| same_repository(known, url))
    }

    /// Returns the configured push declaration, if any
    pub fn push(&self) -> Option<&PushDeclaration> {
        self.details.as_ref().and_then(|d| d.push.as_ref())
    }

    /// Returns a human readable name
    ///
    /// Prefers the configured full name, then the path of the first clone
    /// URL, then the directory name.
    pub fn full_name(&self) -> String {
        if let Some(name) = self.details.as_ref().and_then(|d| d.full_name.as_ref()) {
            return name.clone();
        }
        if let Some(url) = self.clone_url() {
            let normalized = normalize_clone_url(url);
            let path = normalized
                .split_once('/')
                .map(|(_, path)| path)
                .unwrap_or(normalized.as_str());
            if !path.is_empty() {
                return path.to_string();
            }
        }
        self.dir
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.dir.display().to_string())
    }
}
