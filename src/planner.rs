//! Push-step planning
//!
//! Turns the push declaration of a source repository into the ordered list
//! of version changes to apply downstream.

use crate::context::UpdateContextTree;
use crate::domain::{DependencyVersionChange, LocalRepository, PushDeclaration};
use crate::kind::KindRegistry;
use std::sync::Arc;

/// Plans version changes through a registry of kinds
pub struct PushStepPlanner<'a> {
    registry: &'a KindRegistry,
}

impl<'a> PushStepPlanner<'a> {
    /// Creates a planner over a registry
    pub fn new(registry: &'a KindRegistry) -> Self {
        Self { registry }
    }

    /// Returns the steps the source repository pushes, in kind order
    ///
    /// A missing source or missing repository details yield no steps. A
    /// missing push declaration is treated as an empty one.
    pub fn plan(&self, source: Option<&LocalRepository>) -> Vec<DependencyVersionChange> {
        let Some(source) = source else {
            tracing::warn!("cannot plan push steps: source repository is not known");
            return Vec::new();
        };

        let Some(details) = source.details.as_ref() else {
            tracing::warn!(
                dir = %source.dir().display(),
                "cannot plan push steps: source repository has no details"
            );
            return Vec::new();
        };

        let empty = PushDeclaration::new();
        let push = match details.push.as_ref() {
            Some(push) => push,
            None => {
                tracing::debug!(
                    repository = %source.full_name(),
                    "no push declaration, nothing to propagate"
                );
                &empty
            }
        };

        let tree = UpdateContextTree::new_root(Arc::new(source.clone()));
        let root = tree.root();

        let mut steps = Vec::new();
        for updater in self.registry.iter() {
            if let Some(kind_push) = push.get(updater.kind()) {
                steps.extend(updater.emit_push_steps(&tree, root, kind_push));
            }
        }

        tracing::debug!(
            repository = %source.full_name(),
            steps = %DependencyVersionChange::describe(&steps),
            "planned push steps"
        );
        steps
    }
}
