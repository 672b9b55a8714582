//! Update context tree
//!
//! One tree is built per propagation run. Every node is scoped to the same
//! repository and tracks the files it mutated. Nodes are stored in an arena
//! and addressed by [`ContextId`]; each node knows its parent and keeps its
//! children in creation order.

use crate::domain::{DependencyVersionChange, LocalRepository};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Title used when no more specific title is available
pub const DEFAULT_TITLE: &str = "Pulling new versions";

/// Handle of a node inside an [`UpdateContextTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContextId(usize);

/// What a node is scoped to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextScope {
    /// A batch of operations
    Batch,
    /// A single dependency version change
    Version(DependencyVersionChange),
}

#[derive(Debug)]
struct ContextNode {
    parent: Option<ContextId>,
    children: Vec<ContextId>,
    updated_files: BTreeSet<PathBuf>,
    scope: ContextScope,
}

/// Arena of update contexts rooted at one repository
#[derive(Debug)]
pub struct UpdateContextTree {
    repository: Arc<LocalRepository>,
    nodes: Vec<ContextNode>,
}

impl UpdateContextTree {
    /// Creates a tree with a single batch root
    pub fn new_root(repository: Arc<LocalRepository>) -> Self {
        Self {
            repository,
            nodes: vec![ContextNode {
                parent: None,
                children: Vec::new(),
                updated_files: BTreeSet::new(),
                scope: ContextScope::Batch,
            }],
        }
    }

    /// Returns the root node
    pub fn root(&self) -> ContextId {
        ContextId(0)
    }

    /// Returns the repository every node is scoped to
    pub fn repository(&self) -> &Arc<LocalRepository> {
        &self.repository
    }

    /// Creates a batch child of `parent`
    pub fn new_child(&mut self, parent: ContextId) -> ContextId {
        self.push_node(parent, ContextScope::Batch)
    }

    /// Creates a child of `parent` scoped to one version change
    pub fn update_version(
        &mut self,
        parent: ContextId,
        change: DependencyVersionChange,
    ) -> ContextId {
        self.push_node(parent, ContextScope::Version(change))
    }

    fn push_node(&mut self, parent: ContextId, scope: ContextScope) -> ContextId {
        let id = ContextId(self.nodes.len());
        self.nodes.push(ContextNode {
            parent: Some(parent),
            children: Vec::new(),
            updated_files: BTreeSet::new(),
            scope,
        });
        self.node_mut(parent).children.push(id);
        id
    }

    /// Records that `path` was modified by the operation of this node
    ///
    /// Recording the same path twice has no further effect.
    pub fn updated(&mut self, id: ContextId, path: impl Into<PathBuf>) {
        self.node_mut(id).updated_files.insert(path.into());
    }

    /// Returns true if this node itself recorded at least one file
    ///
    /// Files recorded only on descendants are not considered.
    pub fn is_updated(&self, id: ContextId) -> bool {
        !self.node(id).updated_files.is_empty()
    }

    /// Returns the files recorded on this node, in path order
    pub fn updated_files(&self, id: ContextId) -> &BTreeSet<PathBuf> {
        &self.node(id).updated_files
    }

    /// Returns the union of the files recorded on this node and its descendants
    pub fn collect_updated_files(&self, id: ContextId) -> BTreeSet<PathBuf> {
        let mut files = BTreeSet::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let node = self.node(current);
            files.extend(node.updated_files.iter().cloned());
            stack.extend(node.children.iter().copied());
        }
        files
    }

    /// Resolves a path relative to the repository working copy
    pub fn file(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.repository.dir().join(relative)
    }

    /// Returns the parent of a node, `None` for the root
    pub fn parent(&self, id: ContextId) -> Option<ContextId> {
        self.node(id).parent
    }

    /// Returns the children of a node in creation order
    pub fn children(&self, id: ContextId) -> &[ContextId] {
        &self.node(id).children
    }

    /// Returns what the node is scoped to
    pub fn scope(&self, id: ContextId) -> &ContextScope {
        &self.node(id).scope
    }

    /// Returns a human readable title for the node
    ///
    /// The first child's title wins when there is one.
    pub fn title(&self, id: ContextId) -> String {
        let leaf = self.first_leaf(id);
        match &self.node(leaf).scope {
            ContextScope::Batch => DEFAULT_TITLE.to_string(),
            ContextScope::Version(change) => {
                format!("update {} to {}", change.name, change.version)
            }
        }
    }

    /// Returns a stable title prefix used to match earlier proposals
    pub fn title_prefix(&self, id: ContextId) -> String {
        let leaf = self.first_leaf(id);
        match &self.node(leaf).scope {
            ContextScope::Batch => self.title(leaf),
            ContextScope::Version(change) => format!("update {} to ", change.name),
        }
    }

    fn first_leaf(&self, mut id: ContextId) -> ContextId {
        while let Some(first) = self.node(id).children.first() {
            id = *first;
        }
        id
    }

    fn node(&self, id: ContextId) -> &ContextNode {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: ContextId) -> &mut ContextNode {
        &mut self.nodes[id.0]
    }
}
