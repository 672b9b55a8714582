//! Push declarations: the versions a source repository publishes forward

use super::Kind;
use serde::Deserialize;
use std::collections::BTreeMap;

/// Declared push entries for one kind
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum KindPush {
    /// Names whose version is read from the source working copy
    Names(Vec<String>),
    /// Names with explicit target versions
    Versions(BTreeMap<String, String>),
}

/// One declared (name, version) pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushEntry {
    /// Declared name
    pub name: String,
    /// Explicit version, or `None` to read it from the source
    pub version: Option<String>,
}

impl KindPush {
    /// Returns the entries in declaration order
    ///
    /// Explicit versions come from a map and therefore iterate in
    /// lexicographic name order.
    pub fn entries(&self) -> Vec<PushEntry> {
        match self {
            KindPush::Names(names) => names
                .iter()
                .map(|name| PushEntry {
                    name: name.clone(),
                    version: None,
                })
                .collect(),
            KindPush::Versions(versions) => versions
                .iter()
                .map(|(name, version)| PushEntry {
                    name: name.clone(),
                    version: Some(version.clone()),
                })
                .collect(),
        }
    }

    /// Returns true if nothing is declared
    pub fn is_empty(&self) -> bool {
        match self {
            KindPush::Names(names) => names.is_empty(),
            KindPush::Versions(versions) => versions.is_empty(),
        }
    }
}

/// The `push` section of a repository's configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PushDeclaration {
    #[serde(default)]
    npm: Option<KindPush>,
    #[serde(default)]
    cargo: Option<KindPush>,
    #[serde(default)]
    python: Option<KindPush>,
    #[serde(default)]
    go: Option<KindPush>,
    #[serde(default)]
    docker: Option<KindPush>,
}

impl PushDeclaration {
    /// Creates an empty declaration
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the entries for one kind (builder pattern)
    pub fn with(mut self, kind: Kind, push: KindPush) -> Self {
        *self.slot_mut(kind) = Some(push);
        self
    }

    /// Returns the entries declared for a kind
    pub fn get(&self, kind: Kind) -> Option<&KindPush> {
        match kind {
            Kind::Npm => self.npm.as_ref(),
            Kind::Cargo => self.cargo.as_ref(),
            Kind::Python => self.python.as_ref(),
            Kind::Go => self.go.as_ref(),
            Kind::Docker => self.docker.as_ref(),
        }
    }

    /// Returns true if no kind declares anything
    pub fn is_empty(&self) -> bool {
        Kind::all()
            .iter()
            .all(|kind| self.get(*kind).is_none_or(KindPush::is_empty))
    }

    fn slot_mut(&mut self, kind: Kind) -> &mut Option<KindPush> {
        match kind {
            Kind::Npm => &mut self.npm,
            Kind::Cargo => &mut self.cargo,
            Kind::Python => &mut self.python,
            Kind::Go => &mut self.go,
            Kind::Docker => &mut self.docker,
        }
    }
}
