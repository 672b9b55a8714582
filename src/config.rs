//! Configuration file loading
//!
//! The configuration lists every locally checked-out repository, optionally
//! with a full name and a `push` declaration, plus run settings.
//!
//! ```toml
//! [settings]
//! concurrency = 4
//! publish-timeout-secs = 300
//! default-ref = "master"
//!
//! [[repositories]]
//! name = "acme/widgets"
//! dir = "widgets"
//! clone-urls = ["https://github.com/acme/widgets.git"]
//!
//! [repositories.push]
//! npm = ["@acme/widgets"]
//! ```

use crate::domain::PushDeclaration;
use crate::error::ConfigError;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default configuration filename
pub const DEFAULT_CONFIG_FILE: &str = "depush.toml";

/// Default number of target repositories processed at once
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default publisher timeout in seconds
pub const DEFAULT_PUBLISH_TIMEOUT_SECS: u64 = 300;

/// Run settings
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    /// Maximum number of target repositories processed concurrently
    pub concurrency: usize,
    /// Upper bound for a single publisher call
    pub publish_timeout_secs: u64,
    /// Ref used when none is given on the command line
    pub default_ref: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            publish_timeout_secs: DEFAULT_PUBLISH_TIMEOUT_SECS,
            default_ref: None,
        }
    }
}

impl Settings {
    /// Returns the publisher timeout
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_secs(self.publish_timeout_secs)
    }
}

/// One `[[repositories]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepositoryConfig {
    /// Optional full name
    #[serde(default)]
    pub name: Option<String>,
    /// Working copy directory, relative to the configuration file
    pub dir: PathBuf,
    /// Known clone URLs; read from `.git/config` when empty
    #[serde(default)]
    pub clone_urls: Vec<String>,
    /// Versions this repository pushes downstream
    #[serde(default)]
    pub push: Option<PushDeclaration>,
}

/// Parsed configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    pub settings: Settings,
    pub repositories: Vec<RepositoryConfig>,
}

/// Configuration together with where it was loaded from
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory relative repository paths resolve against
    pub base_dir: PathBuf,
    /// Parsed contents
    pub file: ConfigFile,
}

impl Config {
    /// Loads and validates a configuration file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let base_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self::from_str(&content, path, base_dir)
    }

    /// Parses configuration content
    pub fn from_str(content: &str, path: &Path, base_dir: PathBuf) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            toml::from_str(content).map_err(|e| ConfigError::parse(path, e.to_string()))?;

        if file.settings.concurrency == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "concurrency".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if file.settings.publish_timeout_secs == 0 {
            return Err(ConfigError::InvalidSetting {
                key: "publish-timeout-secs".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        if let Some(entry) = file
            .repositories
            .iter()
            .find(|r| r.dir.as_os_str().is_empty())
        {
            return Err(ConfigError::InvalidPath {
                path: entry.dir.clone(),
                message: format!(
                    "repository {} has an empty dir",
                    entry.name.as_deref().unwrap_or("(unnamed)")
                ),
            });
        }

        Ok(Self { base_dir, file })
    }

    /// Returns the run settings
    pub fn settings(&self) -> &Settings {
        &self.file.settings
    }

    /// Resolves a repository directory against the configuration file
    pub fn resolve_dir(&self, dir: &Path) -> PathBuf {
        if dir.is_absolute() {
            dir.to_path_buf()
        } else {
            self.base_dir.join(dir)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Kind;
    use tempfile::TempDir;

    fn parse(content: &str) -> Result<Config, ConfigError> {
        Config::from_str(content, Path::new("depush.toml"), PathBuf::from("/cfg"))
    }

    #[test]
    fn test_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.settings().concurrency, 4);
        assert_eq!(config.settings().publish_timeout(), Duration::from_secs(300));
        assert!(config.settings().default_ref.is_none());
        assert!(config.file.repositories.is_empty());
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
[settings]
concurrency = 2
publish-timeout-secs = 60
default-ref = "main"

[[repositories]]
name = "acme/core"
dir = "core"
clone-urls = ["https://github.com/acme/core.git"]

[repositories.push]
npm = ["@acme/core"]
docker = { "acme/core" = "1.2.0" }

[[repositories]]
dir = "/abs/app"
"#,
        )
        .unwrap();

        assert_eq!(config.settings().concurrency, 2);
        assert_eq!(config.settings().default_ref.as_deref(), Some("main"));
        assert_eq!(config.file.repositories.len(), 2);

        let core = &config.file.repositories[0];
        assert_eq!(core.name.as_deref(), Some("acme/core"));
        let push = core.push.as_ref().unwrap();
        assert!(push.get(Kind::Npm).is_some());
        assert!(push.get(Kind::Docker).is_some());

        let app = &config.file.repositories[1];
        assert!(app.push.is_none());
        assert!(app.clone_urls.is_empty());
    }

    #[test]
    fn test_resolve_dir() {
        let config = parse("").unwrap();
        assert_eq!(config.resolve_dir(Path::new("core")), PathBuf::from("/cfg/core"));
        assert_eq!(config.resolve_dir(Path::new("/abs")), PathBuf::from("/abs"));
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = parse("[settings]\nthreads = 3\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let err = parse("[settings]\nconcurrency = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSetting { .. }));
    }

    #[test]
    fn test_empty_dir_rejected() {
        let err = parse("[[repositories]]\nname = \"acme/core\"\ndir = \"\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPath { .. }));
        assert!(err.to_string().contains("acme/core"));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(&dir.path().join("depush.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_load_uses_parent_as_base_dir() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("depush.toml");
        std::fs::write(&path, "[[repositories]]\ndir = \"core\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.base_dir, dir.path());
        assert_eq!(
            config.resolve_dir(&config.file.repositories[0].dir),
            dir.path().join("core")
        );
    }
}
