//! Package discovery
//!
//! Walks a working copy once, depth-first and top-down, and classifies
//! directories as packages.
//!
//! ## Rules
//!
//! 1.  Entering a directory that lies beneath an already registered package
//!     prunes the whole subtree. Packages are opaque: YAML nested inside one
//!     belongs to it and never forms a package of its own.
//! 2.  A non-directory entry whose name ends in `.yml` or `.yaml` registers
//!     its parent directory.
//! 3.  Any error from the walk aborts discovery. There are no partial
//!     results.
//!
//! Within each directory the walk yields files before subdirectories, both in
//! file-name order. A directory's own YAML is therefore registered before any
//! of its children are entered, which is what makes the outermost
//! YAML-bearing directory win regardless of how its entries are named.
//! `.git` directories are never entered. Symbolic links are not followed.

use std::cmp::Ordering;
use std::ffi::OsStr;
use std::path::Path;

use log::debug;
use regex::Regex;
use walkdir::{DirEntry, WalkDir};

use crate::error::Result;
use crate::packages::PackageDirectories;

/// Matches manifest file names. Case-sensitive, anchored at the end.
pub const YAML_PATTERN: &str = r"\.ya?ml$";

/// Directory names that are never descended into.
const SKIP_DIRS: &[&str] = &[".git"];

/// Discover every package beneath `root`.
pub fn discover(root: &Path) -> Result<PackageDirectories> {
    Scanner::new()?.scan(root)
}

/// Walks a tree and registers package directories.
#[derive(Debug, Clone)]
pub struct Scanner {
    yaml: Regex,
}

impl Scanner {
    pub fn new() -> Result<Self> {
        Ok(Self {
            yaml: Regex::new(YAML_PATTERN)?,
        })
    }

    /// True if `name` is a YAML file name.
    pub fn is_yaml_name(&self, name: &OsStr) -> bool {
        self.yaml.is_match(&name.to_string_lossy())
    }

    /// Walk `root` and return the packages found, in discovery order.
    pub fn scan(&self, root: &Path) -> Result<PackageDirectories> {
        let mut dirs = PackageDirectories::new();
        let mut walker = walk_sorted(root).into_iter();

        while let Some(entry) = walker.next() {
            let entry = entry?;

            if entry.file_type().is_dir() {
                if entry.depth() > 0
                    && (is_skipped_dir(&entry) || dirs.known_sub_directory(entry.path()))
                {
                    walker.skip_current_dir();
                }
                continue;
            }

            if self.is_yaml_name(entry.file_name()) {
                if let Some(parent) = entry.path().parent() {
                    if !dirs.contains(parent) {
                        debug!("Found package {}", parent.display());
                    }
                    dirs.add_directory(parent);
                }
            }
        }

        Ok(dirs)
    }
}

/// A `WalkDir` that yields each directory's files before its subdirectories,
/// each group sorted by file name.
pub(crate) fn walk_sorted(root: &Path) -> WalkDir {
    WalkDir::new(root).sort_by(files_first)
}

pub(crate) fn is_skipped_dir(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|name| SKIP_DIRS.contains(&name))
        .unwrap_or(false)
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}
