//! # Working-Copy Isolation
//!
//! Processors patch files while rendering (merged Helm values, downloaded
//! chart dependencies, plugin scratch files). None of that may leak into the
//! checkout the controller owns, so every run renders inside a
//! [`WorkingCopy`]: a path plus the cleanup that releases it.
//!
//! ## Strategies
//!
//! - **In place** ([`Strategy::InPlace`]): the checkout itself is used after
//!   `git checkout HEAD -- .` and `git clean -fdx .` restore it to the
//!   committed state. Cleanup runs the same restore-and-clean again, so the
//!   tree is left sanitised for the next run.
//! - **Ephemeral** ([`Strategy::Ephemeral`]): the tree is copied into a fresh
//!   temporary directory at a destination that does not exist yet, so no
//!   stale partial content can survive into the copy. Cleanup deletes the
//!   temporary directory.
//!
//! ## Release guarantee
//!
//! The cleanup lives in an `Option` and is taken the first time it runs.
//! [`WorkingCopy::release`] runs it and reports failure; if the guard is
//! dropped without being released (an early `?` return, a panic, or a
//! failed acquisition) `Drop` runs it instead and logs any failure. Either
//! way it runs exactly once.

use std::path::{Path, PathBuf};

use log::{info, warn};
use tempfile::TempDir;

use crate::config::Config;
use crate::error::Result;
use crate::filesystem::{copy_name, copy_tree};
use crate::git::VersionControl;

/// Prefix of the temporary directories holding ephemeral copies.
pub const TEMP_PREFIX: &str = "manifest-render-";

/// How the working copy is isolated from the live checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Restore and clean the checkout with git, then render in it.
    InPlace,
    /// Render in a disposable copy of the checkout.
    Ephemeral,
}

impl Strategy {
    pub fn from_config(config: &Config) -> Self {
        if config.allow_git_checkout {
            Strategy::InPlace
        } else {
            Strategy::Ephemeral
        }
    }
}

enum Cleanup<'a> {
    Sanitize(&'a dyn VersionControl),
    Remove(TempDir),
}

impl Cleanup<'_> {
    fn run(self, path: &Path) -> Result<()> {
        match self {
            Cleanup::Sanitize(vcs) => vcs.sanitize(path),
            Cleanup::Remove(scratch) => {
                info!("Removing working copy {}", scratch.path().display());
                scratch.close()?;
                Ok(())
            }
        }
    }
}

/// An isolated tree that is safe for processors to mutate.
pub struct WorkingCopy<'a> {
    path: PathBuf,
    cleanup: Option<Cleanup<'a>>,
}

impl<'a> WorkingCopy<'a> {
    /// Prepare a working copy of `source` using `strategy`.
    ///
    /// On failure whatever was created is cleaned up before the error is
    /// returned.
    pub fn acquire(
        source: &Path,
        strategy: Strategy,
        vcs: &'a dyn VersionControl,
    ) -> Result<Self> {
        match strategy {
            Strategy::InPlace => {
                let guard = WorkingCopy {
                    path: source.to_path_buf(),
                    cleanup: Some(Cleanup::Sanitize(vcs)),
                };
                vcs.sanitize(&guard.path)?;
                Ok(guard)
            }
            Strategy::Ephemeral => {
                let scratch = tempfile::Builder::new().prefix(TEMP_PREFIX).tempdir()?;
                let guard = WorkingCopy {
                    path: scratch.path().join(copy_name(source)),
                    cleanup: Some(Cleanup::Remove(scratch)),
                };
                info!(
                    "Copying {} to {}",
                    source.display(),
                    guard.path.display()
                );
                copy_tree(source, &guard.path)?;
                Ok(guard)
            }
        }
    }

    /// The directory processors should work in.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run the cleanup now and report whether it succeeded.
    pub fn release(mut self) -> Result<()> {
        match self.cleanup.take() {
            Some(cleanup) => cleanup.run(&self.path),
            None => Ok(()),
        }
    }
}

impl Drop for WorkingCopy<'_> {
    fn drop(&mut self) {
        if let Some(cleanup) = self.cleanup.take() {
            if let Err(e) = cleanup.run(&self.path) {
                warn!(
                    "Failed to clean up working copy {}: {}",
                    self.path.display(),
                    e
                );
            }
        }
    }
}
