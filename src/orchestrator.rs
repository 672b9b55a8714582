//! Propagation orchestrator
//!
//! This module provides:
//! - Resolution of the source repository and its push plan, computed once per run
//! - Application of the plan to one target inside a fresh context tree
//! - Parallel runs over every known repository with bounded concurrency
//! - Error handling with partial continuation: one failing target never stops the others

use crate::config::{Settings, DEFAULT_CONCURRENCY, DEFAULT_PUBLISH_TIMEOUT_SECS};
use crate::context::UpdateContextTree;
use crate::domain::{DependencyVersionChange, LocalRepository};
use crate::error::{AppError, PublishError};
use crate::kind::KindRegistry;
use crate::manifest::ManifestWriter;
use crate::planner::PushStepPlanner;
use crate::progress::Progress;
use crate::publish::{ChangePublisher, PublishRequest, WorkingCopyPublisher};
use crate::repository::resolve;
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Configuration for the orchestrator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestratorConfig {
    /// Maximum number of targets processed at once
    pub concurrency: usize,
    /// Upper bound for a single publisher call
    pub publish_timeout: Duration,
    /// Report what would change without writing or publishing
    pub dry_run: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            publish_timeout: Duration::from_secs(DEFAULT_PUBLISH_TIMEOUT_SECS),
            dry_run: false,
        }
    }
}

impl OrchestratorConfig {
    /// Builds the configuration from file settings
    pub fn from_settings(settings: &Settings, dry_run: bool) -> Self {
        Self {
            concurrency: settings.concurrency,
            publish_timeout: settings.publish_timeout(),
            dry_run,
        }
    }
}

/// What happened to one target
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetStatus {
    /// The target is the source repository itself
    Skipped,
    /// No manifest needed a change
    Unchanged,
    /// At least one manifest was (or in dry-run mode would be) modified
    Changed,
    /// Applying or publishing failed
    Failed(String),
}

impl TargetStatus {
    /// Returns a short machine friendly label
    pub fn as_str(&self) -> &'static str {
        match self {
            TargetStatus::Skipped => "skipped",
            TargetStatus::Unchanged => "unchanged",
            TargetStatus::Changed => "changed",
            TargetStatus::Failed(_) => "failed",
        }
    }

    /// Returns the failure message, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            TargetStatus::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Result of running the plan against one target
#[derive(Debug, Clone)]
pub struct TargetOutcome {
    /// Full name of the target
    pub repository: String,
    /// Working copy of the target
    pub dir: PathBuf,
    /// What happened
    pub status: TargetStatus,
    /// Steps that modified at least one file
    pub steps: Vec<DependencyVersionChange>,
    /// Modified files, relative to the working copy
    pub updated_files: Vec<PathBuf>,
    /// Title of the root context when something changed
    pub title: Option<String>,
    /// Whether the publisher reported the changes as pushed
    pub pushed: bool,
}

impl TargetOutcome {
    fn empty(target: &LocalRepository, status: TargetStatus) -> Self {
        Self {
            repository: target.full_name(),
            dir: target.dir().to_path_buf(),
            status,
            steps: Vec::new(),
            updated_files: Vec::new(),
            title: None,
            pushed: false,
        }
    }

    /// Outcome for the source repository itself
    pub fn skipped(target: &LocalRepository) -> Self {
        Self::empty(target, TargetStatus::Skipped)
    }

    /// Outcome for a target whose run failed
    pub fn failed(target: &LocalRepository, reason: impl Into<String>) -> Self {
        Self::empty(target, TargetStatus::Failed(reason.into()))
    }

    /// Returns true if files were modified
    pub fn is_changed(&self) -> bool {
        self.status == TargetStatus::Changed
    }
}

/// Result of a full propagation run
#[derive(Debug, Clone)]
pub struct PropagationReport {
    /// Clone URL of the source repository
    pub source: String,
    /// Full name of the source when it is known
    pub source_name: Option<String>,
    /// Ref the versions were taken at
    pub git_ref: String,
    /// Whether this was a dry-run
    pub dry_run: bool,
    /// Planned steps, shared by every target
    pub steps: Vec<DependencyVersionChange>,
    /// Per-target outcomes in discovery order
    pub targets: Vec<TargetOutcome>,
}

impl PropagationReport {
    /// Number of targets with modified files
    pub fn changed_count(&self) -> usize {
        self.targets.iter().filter(|t| t.is_changed()).count()
    }

    /// Number of targets that failed
    pub fn failed_count(&self) -> usize {
        self.targets
            .iter()
            .filter(|t| matches!(t.status, TargetStatus::Failed(_)))
            .count()
    }

    /// Returns true if any target failed
    pub fn has_failures(&self) -> bool {
        self.failed_count() > 0
    }
}

/// Pushes the versions of one source repository into every known repository
pub struct PushSourceChanges {
    clone_url: String,
    git_ref: String,
    repositories: Vec<Arc<LocalRepository>>,
    registry: Arc<KindRegistry>,
    publisher: Arc<dyn ChangePublisher>,
    config: OrchestratorConfig,
    source: OnceLock<Option<Arc<LocalRepository>>>,
    steps: OnceLock<Arc<Vec<DependencyVersionChange>>>,
}

impl PushSourceChanges {
    /// Creates an orchestrator using the standard kinds and the working copy publisher
    pub fn new(
        clone_url: impl Into<String>,
        git_ref: impl Into<String>,
        repositories: Vec<LocalRepository>,
        config: OrchestratorConfig,
    ) -> Self {
        let registry = KindRegistry::new(ManifestWriter::new(config.dry_run));
        Self {
            clone_url: clone_url.into(),
            git_ref: git_ref.into(),
            repositories: repositories.into_iter().map(Arc::new).collect(),
            registry: Arc::new(registry),
            publisher: Arc::new(WorkingCopyPublisher),
            config,
            source: OnceLock::new(),
            steps: OnceLock::new(),
        }
    }

    /// Replaces the publisher (builder pattern)
    pub fn with_publisher(mut self, publisher: Arc<dyn ChangePublisher>) -> Self {
        self.publisher = publisher;
        self
    }

    /// Replaces the kind registry (builder pattern)
    pub fn with_registry(mut self, registry: Arc<KindRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Returns the clone URL versions are pushed from
    pub fn clone_url(&self) -> &str {
        &self.clone_url
    }

    /// Returns the known repositories in discovery order
    pub fn repositories(&self) -> &[Arc<LocalRepository>] {
        &self.repositories
    }

    /// Returns the known repository matching the source clone URL
    pub fn source_repository(&self) -> Option<&Arc<LocalRepository>> {
        self.source
            .get_or_init(|| {
                let source = resolve(&self.clone_url, &self.repositories).cloned();
                if source.is_none() {
                    tracing::warn!(clone_url = %self.clone_url, "source repository is not a known repository");
                }
                source
            })
            .as_ref()
    }

    /// Returns the steps pushed by the source, planned on first use
    pub fn push_steps(&self) -> Arc<Vec<DependencyVersionChange>> {
        let steps = self.steps.get_or_init(|| {
            let source = self.source_repository().map(|s| s.as_ref());
            Arc::new(PushStepPlanner::new(&self.registry).plan(source))
        });
        Arc::clone(steps)
    }

    /// Returns the known name of the source, or its clone URL when it is unknown
    fn source_name(&self) -> String {
        self.source_repository()
            .map(|s| s.full_name())
            .unwrap_or_else(|| self.clone_url.clone())
    }

    fn source_description(&self) -> String {
        format!("pushing versions from {}", self.source_name())
    }

    /// Applies every planned step to one target and hands the result to the publisher
    ///
    /// The source repository is never its own target. On the first step that
    /// fails, the changes made so far are still published before the error
    /// is returned.
    pub async fn run_target(&self, target: Arc<LocalRepository>) -> Result<TargetOutcome, AppError> {
        if target.has_clone_url(&self.clone_url) {
            tracing::debug!(repository = %target.full_name(), "not pushing into the source repository");
            return Ok(TargetOutcome::skipped(&target));
        }

        let steps = self.push_steps();
        let mut tree = UpdateContextTree::new_root(Arc::clone(&target));
        let root = tree.root();
        let mut applied = Vec::new();

        for step in steps.iter() {
            let Some(updater) = self.registry.get(step.kind) else {
                tracing::warn!(kind = %step.kind, "no updater registered for kind");
                continue;
            };

            match updater.apply_step(&tree, root, step) {
                Ok(paths) if paths.is_empty() => {}
                Ok(paths) => {
                    // Version nodes exist only for applied steps
                    let child = tree.update_version(root, step.clone());
                    applied.push(step.clone());
                    for path in paths {
                        tree.updated(child, path.clone());
                        tree.updated(root, path);
                    }
                }
                Err(source) => {
                    if tree.is_updated(root) && !self.config.dry_run {
                        if let Err(e) = self.publish(&target, &steps, tree).await {
                            tracing::warn!(error = %e, "failed to publish partial changes");
                        }
                    }
                    return Err(AppError::Apply {
                        repository: target.full_name(),
                        change: step.clone(),
                        source,
                    });
                }
            }
        }

        let changed = tree.is_updated(root);
        let title = changed.then(|| tree.title(root));
        let updated_files = tree
            .updated_files(root)
            .iter()
            .map(|path| path.strip_prefix(target.dir()).unwrap_or(path).to_path_buf())
            .collect();

        let pushed = if self.config.dry_run {
            false
        } else {
            self.publish(&target, &steps, tree).await?
        };

        let status = if changed {
            TargetStatus::Changed
        } else {
            TargetStatus::Unchanged
        };
        tracing::info!(
            source = %self.source_name(),
            repository = %target.full_name(),
            status = status.as_str(),
            changes = %DependencyVersionChange::describe(&applied),
            pushed,
            "target processed"
        );

        Ok(TargetOutcome {
            repository: target.full_name(),
            dir: target.dir().to_path_buf(),
            status,
            steps: applied,
            updated_files,
            title,
            pushed,
        })
    }

    async fn publish(
        &self,
        target: &Arc<LocalRepository>,
        steps: &Arc<Vec<DependencyVersionChange>>,
        context: UpdateContextTree,
    ) -> Result<bool, PublishError> {
        let request = PublishRequest {
            target: Arc::clone(target),
            source_description: self.source_description(),
            git_ref: self.git_ref.clone(),
            steps: Arc::clone(steps),
            context,
        };

        let timeout = self.config.publish_timeout;
        match tokio::time::timeout(timeout, self.publisher.publish(&request)).await {
            Ok(result) => result,
            Err(_) => Err(PublishError::Timeout {
                repository: target.full_name(),
                timeout,
            }),
        }
    }

    /// Runs every known repository as a target
    pub async fn run_all(self: &Arc<Self>) -> PropagationReport {
        self.run_all_with_progress(false).await
    }

    /// Runs every known repository as a target with optional progress display
    pub async fn run_all_with_progress(self: &Arc<Self>, show_progress: bool) -> PropagationReport {
        let mut progress = Progress::new(show_progress);

        progress.spinner("Planning push steps...");
        let steps = self.push_steps();
        let source_name = self.source_repository().map(|s| s.full_name());
        progress.finish_and_clear();

        progress.start(self.repositories.len() as u64, "Pushing versions");
        let semaphore = Arc::new(Semaphore::new(self.config.concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (index, target) in self.repositories.iter().enumerate() {
            let this = Arc::clone(self);
            let target = Arc::clone(target);
            let semaphore = Arc::clone(&semaphore);
            let span = tracing::info_span!("target", repository = %target.full_name());

            tasks.spawn(
                async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    let outcome = match this.run_target(Arc::clone(&target)).await {
                        Ok(outcome) => outcome,
                        Err(e) => {
                            tracing::warn!(error = %e, "target failed");
                            TargetOutcome::failed(&target, e.to_string())
                        }
                    };
                    (index, outcome)
                }
                .instrument(span),
            );
        }

        let mut outcomes: Vec<Option<TargetOutcome>> =
            (0..self.repositories.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => {
                    progress.target_done(&outcome.repository);
                    outcomes[index] = Some(outcome);
                }
                Err(e) => tracing::error!(error = %e, "target task did not complete"),
            }
        }
        progress.finish_and_clear();

        let targets = outcomes
            .into_iter()
            .zip(self.repositories.iter())
            .map(|(outcome, target)| {
                outcome.unwrap_or_else(|| TargetOutcome::failed(target, "target task did not complete"))
            })
            .collect();

        PropagationReport {
            source: self.clone_url.clone(),
            source_name,
            git_ref: self.git_ref.clone(),
            dry_run: self.config.dry_run,
            steps: steps.as_ref().clone(),
            targets,
        }
    }
}
