//! # Git Working-Tree Sanitising
//!
//! The in-place working-copy strategy renders directly in the controller's
//! checkout. The controller does not guarantee that checkout is unpatched
//! when the plugin runs, so before rendering (and again afterwards) the tree
//! is restored to `HEAD` and every untracked or ignored file is removed.
//!
//! Git access sits behind the [`VersionControl`] trait so the working-copy
//! guard can be exercised with a mock that records calls. [`GitCli`] is the
//! real implementation and shells out to the system `git`.

use std::path::Path;
use std::process::Command;

use log::info;

use crate::error::{Error, Result};

/// Trait for the two version-control operations the guard needs - allows
/// mocking in tests
pub trait VersionControl {
    /// Restore every tracked file under `dir` to its committed content.
    fn restore_tracked(&self, dir: &Path) -> Result<()>;

    /// Delete untracked and ignored files and directories under `dir`.
    fn remove_untracked(&self, dir: &Path) -> Result<()>;

    /// Restore then clean: leaves `dir` exactly as committed.
    fn sanitize(&self, dir: &Path) -> Result<()> {
        self.restore_tracked(dir)?;
        info!("Cleaning {}", dir.display());
        self.remove_untracked(dir)
    }
}

/// The default implementation of `VersionControl`, which runs the system's
/// `git` command.
#[derive(Debug, Clone)]
pub struct GitCli {
    binary: String,
}

impl GitCli {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new("git")
    }
}

impl VersionControl for GitCli {
    fn restore_tracked(&self, dir: &Path) -> Result<()> {
        run_git(&self.binary, &["checkout", "HEAD", "--", "."], dir)
    }

    fn remove_untracked(&self, dir: &Path) -> Result<()> {
        run_git(&self.binary, &["clean", "-fdx", "."], dir)
    }
}

/// Run `git <args>` with `dir` as the working directory.
fn run_git(binary: &str, args: &[&str], dir: &Path) -> Result<()> {
    let command = format!("{} {}", binary, args.join(" "));

    let output = Command::new(binary)
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|e| Error::GitCommand {
            command: command.clone(),
            path: dir.to_path_buf(),
            stderr: e.to_string(),
        })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(Error::GitCommand {
            command,
            path: dir.to_path_buf(),
            stderr: stderr.trim().to_string(),
        });
    }

    Ok(())
}
