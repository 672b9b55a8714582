//! Core domain models for depush
//!
//! This module contains the fundamental types used throughout the application:
//! - Project kinds for supported ecosystems
//! - Version specification types for reading and rewriting requirements
//! - Dependency and publication structures read from manifests
//! - Version change steps and push declarations
//! - Locally checked-out repositories

mod change;
mod dependency;
mod kind;
mod push;
mod repository;
mod version_spec;

pub use change::DependencyVersionChange;
pub use dependency::{Dependency, Publication};
pub use kind::Kind;
pub use push::{KindPush, PushDeclaration, PushEntry};
pub use repository::{LocalRepository, RepositoryDetails};
pub use version_spec::{VersionSpec, VersionSpecKind};
