//! Shared test utilities for CLI end-to-end tests.
//!
//! Add `mod common;` to a test file, then use the helpers:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_file("app/deployment.yaml", manifests::CONFIG_MAP);
//!     fixture.command().assert().success();
//! }
//! ```

use assert_cmd::Command;
use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::manifests;
    pub use super::TestFixture;
}

/// Environment variables the binary reads. Cleared so the developer's shell
/// cannot change what a test sees.
const CONTROLLED_ENV: &[&str] = &[
    "ARGOCD_ENV_ALLOW_GIT_CHECKOUT",
    "ARGOCD_ENV_HELM_VALUES",
    "ARGOCD_ENV_HELM_MERGE",
    "ARGOCD_ENV_HELM_ARGS",
    "ARGOCD_ENV_KUSTOMIZE_MERGE",
    "ARGOCD_ENV_KUSTOMIZE_ARGS",
    "ARGOCD_ENV_PLUGINS",
    "ARGOCD_ENV_PREPROCESSORS",
    "ARGOCD_ENV_COMMAND_TIMEOUT",
    "ARGOCD_APP_NAME",
    "ARGOCD_APP_NAMESPACE",
    "GIT_BINARY",
    "HELM_BINARY",
    "KUSTOMIZE_BINARY",
    "MANIFEST_RENDER_LOG",
];

/// Small manifests for populating fixtures.
#[allow(dead_code)]
pub mod manifests {
    pub const CONFIG_MAP: &str = "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: settings\n";

    pub const DEPLOYMENT: &str = "apiVersion: apps/v1\nkind: Deployment\nmetadata:\n  name: web\n";
}

/// A temporary repository checkout to run the binary in.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Read a file from the fixture.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// List every file in the fixture, relative and sorted.
    #[allow(dead_code)]
    pub fn files(&self) -> Vec<String> {
        let mut files: Vec<String> = walkdir::WalkDir::new(self.path())
            .into_iter()
            .map(|e| e.expect("Failed to walk fixture"))
            .filter(|e| e.file_type().is_file())
            .map(|e| {
                e.path()
                    .strip_prefix(self.path())
                    .expect("entry outside fixture")
                    .to_string_lossy()
                    .into_owned()
            })
            .collect();
        files.sort();
        files
    }

    /// A command for the binary running in the fixture with a clean
    /// environment.
    pub fn command(&self) -> Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("manifest-render");
        cmd.current_dir(self.path());
        for var in CONTROLLED_ENV {
            cmd.env_remove(var);
        }
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
