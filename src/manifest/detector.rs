//! Manifest file detection with monorepo and Tauri support
//!
//! Features:
//! - Finds the root manifest of each kind
//! - Supports pnpm-workspace.yaml for npm monorepos
//! - Supports Cargo workspace members
//! - Supports Tauri projects (src-tauri/Cargo.toml)

use crate::domain::Kind;
use std::path::{Path, PathBuf};

/// Returns every manifest of `kind` inside a working copy
///
/// The root manifest comes first; nested manifests follow in path order.
/// Paths are absolute when `dir` is.
pub fn manifest_paths(kind: Kind, dir: &Path) -> Vec<PathBuf> {
    let mut paths = Vec::new();

    let root = dir.join(kind.manifest_filename());
    if root.is_file() {
        paths.push(root.clone());
    }

    let mut nested = Vec::new();
    match kind {
        Kind::Npm if has_pnpm_workspace(dir) => {
            for package_dir in pnpm_workspace_packages(dir) {
                nested.push(package_dir.join(kind.manifest_filename()));
            }
        }
        Kind::Cargo => {
            nested.push(dir.join("src-tauri").join(kind.manifest_filename()));
            for member_dir in cargo_workspace_members(&root, dir) {
                nested.push(member_dir.join(kind.manifest_filename()));
            }
        }
        _ => {}
    }

    nested.sort();
    nested.dedup();
    paths.extend(
        nested
            .into_iter()
            .filter(|path| path.is_file() && *path != root),
    );
    paths
}

/// Check if a directory is a pnpm workspace
pub fn has_pnpm_workspace(dir: &Path) -> bool {
    dir.join("pnpm-workspace.yaml").is_file()
}

/// Parse pnpm-workspace.yaml and return package directories
fn pnpm_workspace_packages(dir: &Path) -> Vec<PathBuf> {
    let Ok(content) = std::fs::read_to_string(dir.join("pnpm-workspace.yaml")) else {
        return Vec::new();
    };

    // Format: packages:
    //           - 'packages/*'
    //           - 'apps/*'
    let mut patterns = Vec::new();
    let mut in_packages = false;
    for line in content.lines() {
        let trimmed = line.trim();

        if trimmed.starts_with("packages:") {
            in_packages = true;
            continue;
        }

        if in_packages {
            // Check if we've moved to a new section
            if !trimmed.is_empty() && !trimmed.starts_with('-') && !trimmed.starts_with('#') {
                break;
            }
            if let Some(pattern) = trimmed.strip_prefix('-') {
                patterns.push(pattern.trim().trim_matches('\'').trim_matches('"').to_string());
            }
        }
    }

    patterns
        .iter()
        .flat_map(|pattern| expand_pattern(dir, pattern))
        .collect()
}

/// Reads `[workspace] members` from the root Cargo.toml
fn cargo_workspace_members(root_manifest: &Path, dir: &Path) -> Vec<PathBuf> {
    let Ok(content) = std::fs::read_to_string(root_manifest) else {
        return Vec::new();
    };
    let Ok(table) = toml::from_str::<toml::Table>(&content) else {
        return Vec::new();
    };

    table
        .get("workspace")
        .and_then(|w| w.get("members"))
        .and_then(|m| m.as_array())
        .map(|members| {
            members
                .iter()
                .filter_map(|m| m.as_str())
                .flat_map(|pattern| expand_pattern(dir, pattern))
                .collect()
        })
        .unwrap_or_default()
}

/// Expands `base/*`, `base/**` and plain directory patterns
///
/// `**` is expanded one level deep.
fn expand_pattern(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    // Exclusions such as '!**/test/**' are not supported
    if pattern.starts_with('!') {
        return Vec::new();
    }

    let base = pattern
        .strip_suffix("/**")
        .or_else(|| pattern.strip_suffix("/*"));

    match base {
        Some(base) => std::fs::read_dir(dir.join(base))
            .map(|entries| {
                entries
                    .flatten()
                    .map(|entry| entry.path())
                    .filter(|path| path.is_dir())
                    .collect()
            })
            .unwrap_or_default(),
        None if !pattern.contains('*') => {
            let path = dir.join(pattern);
            if path.is_dir() {
                vec![path]
            } else {
                Vec::new()
            }
        }
        None => Vec::new(),
    }
}
