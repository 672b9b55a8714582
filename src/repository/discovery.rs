//! Builds the known repositories from the configuration file

use crate::config::Config;
use crate::domain::{LocalRepository, RepositoryDetails};
use crate::error::{AppError, IoError, RepositoryError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Matches a `[remote "name"]` section header
static REMOTE_SECTION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\[\s*remote\s+"([^"]+)"\s*\]$"#).unwrap());

/// Matches a `url = value` entry
static URL_ENTRY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^url\s*=\s*(.+?)\s*$").unwrap());

/// Reads the clone URL of a working copy from its git configuration
///
/// The `origin` remote wins; otherwise the first remote with a URL is used.
/// Worktrees and submodules whose `.git` is a file pointing elsewhere are
/// followed.
pub fn extract_git_url(dir: &Path) -> Result<String, AppError> {
    if !dir.is_dir() {
        return Err(IoError::directory_not_found(dir).into());
    }

    let config_path = git_config_path(dir)?;
    let content = std::fs::read_to_string(&config_path)
        .map_err(|e| IoError::generic(&config_path, e))?;

    parse_remote_url(&content).ok_or_else(|| {
        RepositoryError::NoRemote {
            path: dir.to_path_buf(),
        }
        .into()
    })
}

/// Builds the known repositories in configuration order
///
/// Repositories whose directory is missing are skipped with a warning.
/// When no clone URL is configured it is read from the working copy.
pub fn discover(config: &Config) -> Vec<LocalRepository> {
    let mut repositories = Vec::with_capacity(config.file.repositories.len());

    for entry in &config.file.repositories {
        let dir = config.resolve_dir(&entry.dir);
        if !dir.is_dir() {
            tracing::warn!(dir = %dir.display(), "repository directory does not exist, skipping");
            continue;
        }

        let clone_urls = if entry.clone_urls.is_empty() {
            match extract_git_url(&dir) {
                Ok(url) => vec![url],
                Err(e) => {
                    tracing::warn!(dir = %dir.display(), error = %e, "no clone URL for repository");
                    Vec::new()
                }
            }
        } else {
            entry.clone_urls.clone()
        };

        let mut repository = LocalRepository::new(dir, clone_urls);
        if entry.name.is_some() || entry.push.is_some() {
            repository = repository.with_details(RepositoryDetails {
                full_name: entry.name.clone(),
                push: entry.push.clone(),
            });
        }
        repositories.push(repository);
    }

    repositories
}

/// Locates the git config file for a working copy
fn git_config_path(dir: &Path) -> Result<PathBuf, AppError> {
    let dot_git = dir.join(".git");

    if dot_git.is_dir() {
        return Ok(dot_git.join("config"));
    }

    if dot_git.is_file() {
        let content =
            std::fs::read_to_string(&dot_git).map_err(|e| IoError::generic(&dot_git, e))?;
        if let Some(gitdir) = content
            .lines()
            .find_map(|line| line.trim().strip_prefix("gitdir:"))
        {
            let gitdir = PathBuf::from(gitdir.trim());
            let gitdir = if gitdir.is_absolute() {
                gitdir
            } else {
                dir.join(gitdir)
            };
            // Linked worktrees keep the shared config in the common dir
            let common = match std::fs::read_to_string(gitdir.join("commondir")) {
                Ok(common) => {
                    let common = PathBuf::from(common.trim());
                    if common.is_absolute() {
                        common
                    } else {
                        gitdir.join(common)
                    }
                }
                Err(_) => gitdir,
            };
            return Ok(common.join("config"));
        }
    }

    Err(RepositoryError::NotAGitRepository {
        path: dir.to_path_buf(),
    }
    .into())
}

/// Returns the URL of `origin`, or of the first remote that has one
fn parse_remote_url(content: &str) -> Option<String> {
    let mut current: Option<String> = None;
    let mut first: Option<String> = None;

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with('[') {
            current = REMOTE_SECTION_RE
                .captures(line)
                .map(|caps| caps[1].to_string());
            continue;
        }

        let Some(remote) = current.as_deref() else {
            continue;
        };
        if let Some(caps) = URL_ENTRY_RE.captures(line) {
            let url = caps[1].trim_matches('"').to_string();
            if remote == "origin" {
                return Some(url);
            }
            if first.is_none() {
                first = Some(url);
            }
        }
    }

    first
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Kind;
    use std::fs;
    use tempfile::TempDir;

    fn init_git(dir: &Path, config: &str) {
        fs::create_dir_all(dir.join(".git")).unwrap();
        fs::write(dir.join(".git/config"), config).unwrap();
    }

    const ORIGIN_CONFIG: &str = r#"[core]
	repositoryformatversion = 0
[remote "upstream"]
	url = git@github.com:upstream/app.git
	fetch = +refs/heads/*:refs/remotes/upstream/*
[remote "origin"]
	url = https://github.com/acme/app.git
	fetch = +refs/heads/*:refs/remotes/origin/*
[branch "master"]
	remote = origin
"#;

    #[test]
    fn test_parse_remote_url_prefers_origin() {
        assert_eq!(
            parse_remote_url(ORIGIN_CONFIG).as_deref(),
            Some("https://github.com/acme/app.git")
        );
    }

    #[test]
    fn test_parse_remote_url_falls_back_to_first() {
        let config = "[remote \"fork\"]\n\turl = git@host:me/app.git\n[remote \"other\"]\n\turl = git@host:x/app.git\n";
        assert_eq!(parse_remote_url(config).as_deref(), Some("git@host:me/app.git"));
    }

    #[test]
    fn test_parse_remote_url_ignores_other_sections() {
        let config = "[submodule \"lib\"]\n\turl = https://host/lib.git\n";
        assert!(parse_remote_url(config).is_none());
    }

    #[test]
    fn test_extract_git_url() {
        let dir = TempDir::new().unwrap();
        init_git(dir.path(), ORIGIN_CONFIG);
        assert_eq!(
            extract_git_url(dir.path()).unwrap(),
            "https://github.com/acme/app.git"
        );
    }

    #[test]
    fn test_extract_git_url_missing_directory() {
        let dir = TempDir::new().unwrap();
        let err = extract_git_url(&dir.path().join("missing")).unwrap_err();
        assert!(matches!(err, AppError::Io(IoError::DirectoryNotFound { .. })));
    }

    #[test]
    fn test_extract_git_url_not_a_repository() {
        let dir = TempDir::new().unwrap();
        let err = extract_git_url(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Repository(RepositoryError::NotAGitRepository { .. })
        ));
    }

    #[test]
    fn test_extract_git_url_without_remote() {
        let dir = TempDir::new().unwrap();
        init_git(dir.path(), "[core]\n\tbare = false\n");
        let err = extract_git_url(dir.path()).unwrap_err();
        assert!(matches!(
            err,
            AppError::Repository(RepositoryError::NoRemote { .. })
        ));
    }

    #[test]
    fn test_extract_git_url_worktree() {
        let dir = TempDir::new().unwrap();
        let main = dir.path().join("main");
        init_git(&main, ORIGIN_CONFIG);
        let worktree_git = main.join(".git/worktrees/feature");
        fs::create_dir_all(&worktree_git).unwrap();
        fs::write(worktree_git.join("commondir"), "../..\n").unwrap();

        let feature = dir.path().join("feature");
        fs::create_dir_all(&feature).unwrap();
        fs::write(
            feature.join(".git"),
            format!("gitdir: {}\n", worktree_git.display()),
        )
        .unwrap();

        assert_eq!(
            extract_git_url(&feature).unwrap(),
            "https://github.com/acme/app.git"
        );
    }

    #[test]
    fn test_discover() {
        let dir = TempDir::new().unwrap();
        let core = dir.path().join("core");
        let app = dir.path().join("app");
        fs::create_dir_all(&core).unwrap();
        init_git(&app, ORIGIN_CONFIG);

        let config_path = dir.path().join("depush.toml");
        fs::write(
            &config_path,
            r#"
[[repositories]]
name = "acme/core"
dir = "core"
clone-urls = ["https://github.com/acme/core.git"]

[repositories.push]
npm = ["@acme/core"]

[[repositories]]
dir = "app"

[[repositories]]
dir = "gone"
"#,
        )
        .unwrap();

        let config = Config::load(&config_path).unwrap();
        let repos = discover(&config);
        assert_eq!(repos.len(), 2);

        assert_eq!(repos[0].dir(), core.as_path());
        assert_eq!(repos[0].full_name(), "acme/core");
        assert!(repos[0].push().unwrap().get(Kind::Npm).is_some());

        assert_eq!(repos[1].dir(), app.as_path());
        assert_eq!(repos[1].clone_url(), Some("https://github.com/acme/app.git"));
        assert!(repos[1].details.is_none());
    }

    #[test]
    fn test_discover_without_remote_keeps_repository() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("plain")).unwrap();
        let config_path = dir.path().join("depush.toml");
        fs::write(&config_path, "[[repositories]]\ndir = \"plain\"\n").unwrap();

        let config = Config::load(&config_path).unwrap();
        let repos = discover(&config);
        assert_eq!(repos.len(), 1);
        assert!(repos[0].clone_urls.is_empty());
    }
}
