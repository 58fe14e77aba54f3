//! # Manifest Render Library
//!
//! This library turns a repository checkout holding many Kubernetes
//! deployment packages (plain YAML, Kustomize overlays, Helm charts) into a
//! single stream of rendered manifests. It backs the `manifest-render`
//! command-line tool, which GitOps controllers such as Argo CD run as a
//! config-management plugin.
//!
//! ## Quick Example
//!
//! ```
//! use manifest_render::discovery::discover;
//! use std::fs;
//!
//! let repo = tempfile::tempdir().unwrap();
//! fs::create_dir_all(repo.path().join("app/base")).unwrap();
//! fs::write(repo.path().join("app/base/deployment.yaml"), "kind: Deployment\n").unwrap();
//!
//! let packages = discover(repo.path()).unwrap();
//! assert_eq!(packages.len(), 1);
//! assert!(packages.packages()[0].ends_with("app/base"));
//! ```
//!
//! ## Core Concepts
//!
//! - **Packages (`packages`, `discovery`)**: a package is the shallowest
//!   directory containing a YAML file. Nested YAML belongs to the nearest
//!   registered ancestor, so a Helm chart's `templates/` never becomes a
//!   package of its own.
//! - **Working copies (`working_copy`, `git`, `filesystem`)**: rendering
//!   happens in an isolated copy of the checkout, either a temporary copy or
//!   the checkout itself after a git restore and clean.
//! - **Processors (`processors`)**: a prioritised chain of backends (yaml,
//!   Kustomize, Helm, plugin) that render each package.
//! - **Collection (`collection`)**: the orchestrator that runs the whole
//!   pipeline and concatenates the output.
//!
//! Errors are reported through [`error::Error`]; configuration is the plain
//! [`config::Config`] struct, assembled by the binary from flags and
//! environment variables.

pub mod collection;
pub mod config;
pub mod discovery;
pub mod error;
pub mod filesystem;
pub mod git;
pub mod merge;
pub mod packages;
pub mod processors;
pub mod working_copy;

#[cfg(test)]
mod packages_proptest;
