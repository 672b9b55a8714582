//! Application error types using thiserror
//!
//! Error hierarchy:
//! - ManifestError: Issues reading or editing manifest files
//! - ConfigError: Issues with CLI arguments or the configuration file
//! - IoError: File system operation failures
//! - RepositoryError: Issues locating repositories and their remotes
//! - PublishError: Failures reported by the change publisher

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

use crate::domain::DependencyVersionChange;

/// Application-level error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Manifest file related errors
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Configuration related errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// IO related errors
    #[error(transparent)]
    Io(#[from] IoError),

    /// Repository lookup errors
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// Change publisher errors
    #[error(transparent)]
    Publish(#[from] PublishError),

    /// A step could not be applied to a target working copy
    #[error("failed to apply {change} to {repository}: {source}")]
    Apply {
        repository: String,
        change: DependencyVersionChange,
        #[source]
        source: ManifestError,
    },
}

/// Errors related to manifest file operations
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Failed to read manifest file
    #[error("failed to read manifest file {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write manifest file
    #[error("failed to write manifest file {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON parsing error (for package.json)
    #[error("failed to parse JSON in {path}: {message}")]
    JsonParseError { path: PathBuf, message: String },

    /// TOML parsing error (for pyproject.toml, Cargo.toml)
    #[error("failed to parse TOML in {path}: {message}")]
    TomlParseError { path: PathBuf, message: String },

    /// The dependency is not declared in the manifest
    #[error("dependency '{package}' not found in {path}")]
    DependencyNotFound { path: PathBuf, package: String },

    /// Invalid version specification
    #[error("invalid version specification '{spec}' in {path}: {message}")]
    InvalidVersionSpec {
        path: PathBuf,
        spec: String,
        message: String,
    },
}

/// Errors related to configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Neither a clone URL nor a directory was supplied
    #[error("no clone URL specified: pass CLONE_URL or --dir")]
    MissingCloneUrl,

    /// Failed to read the configuration file
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file is not valid TOML or has unknown keys
    #[error("failed to parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    /// Invalid path
    #[error("invalid path '{path}': {message}")]
    InvalidPath { path: PathBuf, message: String },

    /// Invalid setting value
    #[error("invalid setting '{key}': {message}")]
    InvalidSetting { key: String, message: String },
}

/// Errors related to IO operations
#[derive(Error, Debug)]
pub enum IoError {
    /// Directory not found
    #[error("directory does not exist: {path}")]
    DirectoryNotFound { path: PathBuf },

    /// Generic IO error
    #[error("IO error at {path}: {source}")]
    Generic {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Errors related to repository lookup
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Directory is not a git working copy
    #[error("not a git repository: {path}")]
    NotAGitRepository { path: PathBuf },

    /// No remote URL could be found in the git configuration
    #[error("could not find the git clone URL in {path}")]
    NoRemote { path: PathBuf },
}

/// Errors reported by a change publisher
#[derive(Error, Debug)]
pub enum PublishError {
    /// The publisher did not finish in time
    #[error("publishing changes to {repository} timed out after {}s", timeout.as_secs())]
    Timeout {
        repository: String,
        timeout: Duration,
    },

    /// The publisher rejected or failed the change
    #[error("failed to publish changes to {repository}: {message}")]
    Failed { repository: String, message: String },
}

impl ManifestError {
    /// Creates a new ReadError
    pub fn read_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::ReadError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new WriteError
    pub fn write_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ManifestError::WriteError {
            path: path.into(),
            source,
        }
    }

    /// Creates a new JsonParseError
    pub fn json_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::JsonParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new TomlParseError
    pub fn toml_parse_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ManifestError::TomlParseError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Creates a new DependencyNotFound error
    pub fn dependency_not_found(path: impl Into<PathBuf>, package: impl Into<String>) -> Self {
        ManifestError::DependencyNotFound {
            path: path.into(),
            package: package.into(),
        }
    }

    /// Creates a new InvalidVersionSpec error
    pub fn invalid_version_spec(
        path: impl Into<PathBuf>,
        spec: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ManifestError::InvalidVersionSpec {
            path: path.into(),
            spec: spec.into(),
            message: message.into(),
        }
    }

    /// Returns true if this error only means the dependency is absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, ManifestError::DependencyNotFound { .. })
    }

    /// Replaces the path reported by a content-only parser
    pub fn at(mut self, actual: &std::path::Path) -> Self {
        match &mut self {
            ManifestError::ReadError { path, .. }
            | ManifestError::WriteError { path, .. }
            | ManifestError::JsonParseError { path, .. }
            | ManifestError::TomlParseError { path, .. }
            | ManifestError::DependencyNotFound { path, .. }
            | ManifestError::InvalidVersionSpec { path, .. } => *path = actual.to_path_buf(),
        }
        self
    }
}

impl ConfigError {
    /// Creates a new Parse error
    pub fn parse(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        ConfigError::Parse {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl IoError {
    /// Creates a new DirectoryNotFound error
    pub fn directory_not_found(path: impl Into<PathBuf>) -> Self {
        IoError::DirectoryNotFound { path: path.into() }
    }

    /// Creates a new Generic IO error
    pub fn generic(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        IoError::Generic {
            path: path.into(),
            source,
        }
    }
}

impl PublishError {
    /// Creates a new Failed error
    pub fn failed(repository: impl Into<String>, message: impl Into<String>) -> Self {
        PublishError::Failed {
            repository: repository.into(),
            message: message.into(),
        }
    }
}
