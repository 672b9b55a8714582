//! Integration tests for depush
//!
//! These tests verify:
//! - Repository discovery from a configuration file
//! - Push plans built from the source working copy
//! - Manifest rewrites across every supported kind with format preservation
//! - Per-target isolation of failures

use depush::config::Config;
use depush::domain::{DependencyVersionChange, Kind};
use depush::orchestrator::{OrchestratorConfig, PushSourceChanges, TargetStatus};
use depush::repository::discover;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Test fixture directory creation helper
fn create_test_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp directory")
}

fn write(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}

fn read(root: &Path, relative: &str) -> String {
    fs::read_to_string(root.join(relative)).unwrap()
}

/// Lays out a source repository `core` and three consumers
fn create_workspace(root: &Path) {
    write(
        root,
        "depush.toml",
        r#"[settings]
concurrency = 2
default-ref = "main"

[[repositories]]
name = "acme/core"
dir = "core"
clone-urls = ["https://github.com/acme/core.git"]

[repositories.push]
npm = ["@acme/core"]
cargo = ["acme-core"]
python = ["acme-core"]
go = { "github.com/acme/core" = "v1.5.0" }
docker = { "acme/core" = "1.5.0" }

[[repositories]]
dir = "web"
clone-urls = ["git@github.com:acme/web.git"]

[[repositories]]
dir = "engine"
clone-urls = ["git@github.com:acme/engine.git"]

[[repositories]]
dir = "missing"
clone-urls = ["git@github.com:acme/missing.git"]
"#,
    );

    // Source publishes the same version in every ecosystem
    write(root, "core/package.json", r#"{ "name": "@acme/core", "version": "1.5.0" }"#);
    write(
        root,
        "core/Cargo.toml",
        "[package]\nname = \"acme-core\"\nversion = \"1.5.0\"\n",
    );
    write(
        root,
        "core/pyproject.toml",
        "[project]\nname = \"acme_core\"\nversion = \"1.5.0\"\n",
    );

    write(
        root,
        "web/package.json",
        r#"{
  "name": "web",
  "dependencies": {
    "@acme/core": "^1.4.2",
    "react": "^18.2.0"
  }
}
"#,
    );
    write(root, "web/Dockerfile", "FROM acme/core:1.4.2 AS base\nRUN make\n");

    write(
        root,
        "engine/Cargo.toml",
        r#"[workspace]
members = ["crates/*"]

[workspace.dependencies]
acme-core = { version = "1.4", features = ["full"] }
"#,
    );
    write(
        root,
        "engine/crates/cli/Cargo.toml",
        "[package]\nname = \"engine-cli\"\nversion = \"0.1.0\"\n\n[dependencies]\nacme-core = \"=1.4.2\"\n",
    );
    write(
        root,
        "engine/pyproject.toml",
        "[project]\nname = \"engine\"\ndependencies = [\n    \"Acme.Core>=1.4.0\",\n    \"requests>=2.28\",\n]\n",
    );
    write(
        root,
        "engine/go.mod",
        "module github.com/acme/engine\n\ngo 1.22\n\nrequire (\n\tgithub.com/acme/core v1.4.2\n\tgithub.com/other/lib v0.3.0\n)\n",
    );
}

mod discovery {
    use super::*;

    #[test]
    fn test_discover_skips_missing_directories() {
        let temp_dir = create_test_dir();
        create_workspace(temp_dir.path());

        let config = Config::load(&temp_dir.path().join("depush.toml")).unwrap();
        let repositories = discover(&config);

        let names: Vec<String> = repositories.iter().map(|r| r.full_name()).collect();
        assert_eq!(names, vec!["acme/core", "acme/web", "acme/engine"]);
        assert!(repositories[0].push().is_some());
        assert!(repositories[1].details.is_none());
        assert_eq!(config.settings().default_ref.as_deref(), Some("main"));
    }
}

mod propagation {
    use super::*;

    fn orchestrator(root: &Path, clone_url: &str, dry_run: bool) -> Arc<PushSourceChanges> {
        let config = Config::load(&root.join("depush.toml")).unwrap();
        let repositories = discover(&config);
        let orchestrator_config = OrchestratorConfig::from_settings(config.settings(), dry_run);
        Arc::new(PushSourceChanges::new(clone_url, "main", repositories, orchestrator_config))
    }

    #[test]
    fn test_plan_covers_every_kind() {
        let temp_dir = create_test_dir();
        create_workspace(temp_dir.path());

        let push = orchestrator(temp_dir.path(), "git@github.com:acme/core", true);
        let steps = push.push_steps();
        assert_eq!(
            steps.as_slice(),
            &[
                DependencyVersionChange::new(Kind::Npm, "@acme/core", "1.5.0"),
                DependencyVersionChange::new(Kind::Cargo, "acme-core", "1.5.0"),
                DependencyVersionChange::new(Kind::Python, "acme-core", "1.5.0"),
                DependencyVersionChange::new(Kind::Go, "github.com/acme/core", "v1.5.0"),
                DependencyVersionChange::new(Kind::Docker, "acme/core", "1.5.0"),
            ]
        );
    }

    #[tokio::test]
    async fn test_run_all_rewrites_consumers() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        create_workspace(root);

        let report = orchestrator(root, "https://github.com/acme/core", false)
            .run_all()
            .await;

        let statuses: Vec<(&str, &TargetStatus)> = report
            .targets
            .iter()
            .map(|t| (t.repository.as_str(), &t.status))
            .collect();
        assert_eq!(
            statuses,
            vec![
                ("acme/core", &TargetStatus::Skipped),
                ("acme/web", &TargetStatus::Changed),
                ("acme/engine", &TargetStatus::Changed),
            ]
        );
        assert!(!report.has_failures());

        // npm keeps its caret and the untouched neighbours
        let web = read(root, "web/package.json");
        assert!(web.contains(r#""@acme/core": "^1.5.0""#));
        assert!(web.contains(r#""react": "^18.2.0""#));
        assert_eq!(read(root, "web/Dockerfile"), "FROM acme/core:1.5.0 AS base\nRUN make\n");
        assert_eq!(report.targets[1].title.as_deref(), Some("update @acme/core to 1.5.0"));

        // Workspace table and member crate both follow
        let engine = read(root, "engine/Cargo.toml");
        assert!(engine.contains(r#"acme-core = { version = "1.5.0", features = ["full"] }"#));
        assert!(read(root, "engine/crates/cli/Cargo.toml").contains("acme-core = \"=1.5.0\""));
        assert!(read(root, "engine/pyproject.toml").contains("\"Acme.Core>=1.5.0\""));
        assert!(read(root, "engine/go.mod").contains("\tgithub.com/acme/core v1.5.0\n"));
        assert!(read(root, "engine/go.mod").contains("\tgithub.com/other/lib v0.3.0\n"));

        // engine has no npm manifest, so its title names the first step that changed it
        let engine_outcome = &report.targets[2];
        assert_eq!(engine_outcome.title.as_deref(), Some("update acme-core to 1.5.0"));
        assert_eq!(engine_outcome.steps.len(), 3);
        assert_eq!(engine_outcome.updated_files.len(), 4);

        // Source repository is left alone
        assert_eq!(
            read(root, "core/package.json"),
            r#"{ "name": "@acme/core", "version": "1.5.0" }"#
        );
    }

    #[tokio::test]
    async fn test_dry_run_leaves_files_unchanged() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        create_workspace(root);
        let before = read(root, "web/package.json");

        let report = orchestrator(root, "https://github.com/acme/core", true)
            .run_all()
            .await;

        assert!(report.dry_run);
        assert_eq!(report.changed_count(), 2);
        assert!(report.targets.iter().all(|t| !t.pushed));
        assert_eq!(read(root, "web/package.json"), before);
    }

    #[tokio::test]
    async fn test_second_run_is_a_no_op() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        create_workspace(root);

        orchestrator(root, "https://github.com/acme/core", false)
            .run_all()
            .await;
        let report = orchestrator(root, "https://github.com/acme/core", false)
            .run_all()
            .await;

        assert_eq!(report.changed_count(), 0);
        assert!(!report.has_failures());
    }

    #[tokio::test]
    async fn test_unknown_source_changes_nothing() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        create_workspace(root);

        let report = orchestrator(root, "https://github.com/acme/unknown", false)
            .run_all()
            .await;

        assert!(report.steps.is_empty());
        assert!(report.source_name.is_none());
        assert!(report
            .targets
            .iter()
            .all(|t| t.status == TargetStatus::Unchanged));
    }

    #[tokio::test]
    async fn test_broken_manifest_fails_only_its_target() {
        let temp_dir = create_test_dir();
        let root = temp_dir.path();
        create_workspace(root);
        // go.mod that is not valid UTF-8 cannot be read
        fs::write(root.join("engine/go.mod"), [0xff, 0xfe, 0x00, 0x01]).unwrap();

        let report = orchestrator(root, "https://github.com/acme/core", false)
            .run_all()
            .await;

        assert_eq!(report.targets[1].status, TargetStatus::Changed);
        let engine = &report.targets[2];
        let reason = engine.status.reason().unwrap();
        assert!(reason.contains("go:github.com/acme/core@v1.5.0"), "{}", reason);
        assert_eq!(report.failed_count(), 1);

        // Steps before the failing one stay applied
        assert!(read(root, "engine/crates/cli/Cargo.toml").contains("acme-core = \"=1.5.0\""));
    }
}
