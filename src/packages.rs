//! Registry of directories classified as packages.
//!
//! A package is a directory that holds YAML and is not itself inside another
//! package. Discovery walks the tree top-down and registers the parent of
//! every YAML file it meets, so the first (outermost) YAML-bearing directory
//! on a branch claims everything beneath it. The registry answers the one
//! question the walker needs to enforce that: "is this path already owned?"

use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Package directories in the order they were first registered.
///
/// The order is the order rendered output is concatenated in, so it is part
/// of the observable behaviour and must not be sorted or deduplicated any
/// other way.
#[derive(Debug, Clone, Default)]
pub struct PackageDirectories {
    dirs: Vec<PathBuf>,
    known: HashSet<PathBuf>,
}

impl PackageDirectories {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `path` as a package. Registering the same path again is a
    /// no-op.
    pub fn add_directory<P: AsRef<Path>>(&mut self, path: P) {
        let path = path.as_ref();
        if self.known.insert(path.to_path_buf()) {
            self.dirs.push(path.to_path_buf());
        }
    }

    /// True if `path` lies strictly beneath a registered package.
    ///
    /// Comparison is by path component, so `/app/base2` is not beneath
    /// `/app/base`. Correct results rely on parents being registered before
    /// their children are queried, which a top-down walk guarantees.
    pub fn known_sub_directory<P: AsRef<Path>>(&self, path: P) -> bool {
        let path = path.as_ref();
        path.ancestors()
            .skip(1)
            .any(|ancestor| self.known.contains(ancestor))
    }

    /// Check whether `path` itself is a registered package.
    pub fn contains<P: AsRef<Path>>(&self, path: P) -> bool {
        self.known.contains(path.as_ref())
    }

    /// Registered packages in insertion order.
    pub fn packages(&self) -> &[PathBuf] {
        &self.dirs
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }
}
