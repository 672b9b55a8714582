//! depush - dependency version propagation library
//!
//! Pushes the versions a source repository publishes into every known
//! repository that depends on them:
//! - npm (package.json, pnpm workspaces)
//! - Cargo (Cargo.toml, workspaces)
//! - Python (pyproject.toml)
//! - Go (go.mod)
//! - Docker (Dockerfile base images)

pub mod cli;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod kind;
pub mod manifest;
pub mod orchestrator;
pub mod output;
pub mod planner;
pub mod progress;
pub mod publish;
pub mod repository;
pub mod telemetry;
