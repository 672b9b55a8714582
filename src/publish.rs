//! Handing finished contexts to a change publisher
//!
//! A publisher receives the root context of one target once every step has
//! been applied. Committing, pushing and opening pull requests belong to
//! publisher implementations; the default one leaves the edits in the
//! working copy.

use crate::context::UpdateContextTree;
use crate::domain::{DependencyVersionChange, LocalRepository};
use crate::error::PublishError;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Everything a publisher needs for one target
#[derive(Debug)]
pub struct PublishRequest {
    /// Repository the changes were applied to
    pub target: Arc<LocalRepository>,
    /// Where the versions come from, e.g. `pushing versions from <url>`
    pub source_description: String,
    /// Ref of the source the versions were taken at
    pub git_ref: String,
    /// Steps that were planned for the target
    pub steps: Arc<Vec<DependencyVersionChange>>,
    /// Context tree rooted at the target
    pub context: UpdateContextTree,
}

impl PublishRequest {
    /// Returns the commit message derived from the context
    pub fn commit_message(&self) -> CommitMessage {
        CommitMessage::from_context(&self.context, &self.source_description, &self.steps)
    }
}

/// Trait for publishing the changes made to one target
#[async_trait]
pub trait ChangePublisher: Send + Sync {
    /// Publishes the changes, returning true if anything was pushed
    async fn publish(&self, request: &PublishRequest) -> Result<bool, PublishError>;
}

/// Commit title and body derived from a context tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitMessage {
    pub title: String,
    pub body: String,
}

impl CommitMessage {
    /// Builds the message for the root of `tree`
    ///
    /// The body names the source, every step and every file touched under
    /// the root, relative to the working copy.
    pub fn from_context(
        tree: &UpdateContextTree,
        source_description: &str,
        steps: &[DependencyVersionChange],
    ) -> Self {
        let root = tree.root();
        let dir = tree.repository().dir();

        let mut body = String::new();
        body.push_str(source_description);
        body.push('\n');

        if !steps.is_empty() {
            body.push('\n');
            for step in steps {
                body.push_str(&format!("* {}\n", step));
            }
        }

        let files = tree.collect_updated_files(root);
        if !files.is_empty() {
            body.push_str("\nUpdated files:\n");
            for file in files {
                let relative = file.strip_prefix(dir).unwrap_or(&file);
                body.push_str(&format!("* {}\n", relative.display()));
            }
        }

        Self {
            title: tree.title(root),
            body,
        }
    }
}

impl fmt::Display for CommitMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", self.title, self.body)
    }
}

/// Publisher that leaves the edits in the working copy
#[derive(Debug, Default, Clone, Copy)]
pub struct WorkingCopyPublisher;

#[async_trait]
impl ChangePublisher for WorkingCopyPublisher {
    async fn publish(&self, request: &PublishRequest) -> Result<bool, PublishError> {
        let updated = request.context.is_updated(request.context.root());
        if updated {
            let message = request.commit_message();
            tracing::info!(
                target_repo = %request.target.full_name(),
                git_ref = %request.git_ref,
                title = %message.title,
                "changes left in working copy"
            );
            tracing::debug!(message = %message, "derived commit message");
        }
        Ok(updated)
    }
}
