//! Host filesystem helpers for building the ephemeral working copy

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Recursively copy the tree at `src` to `dst`.
///
/// `dst` must not exist yet; it is created by the copy. Directories are
/// recreated and regular files are copied with their permissions. Symbolic
/// links are never followed during the walk. A link is handled by where it
/// resolves:
///
/// - inside `src`: recreated as a link to the matching path under `dst`, so
///   writes through it stay inside the copy;
/// - a file outside `src`: replaced by a copy of that file;
/// - a directory outside `src`: refused with `Error::Copy`;
/// - nowhere (dangling): skipped.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    if dst.exists() {
        return Err(copy_error(src, dst, "destination already exists"));
    }
    let root = fs::canonicalize(src).map_err(|e| copy_error(src, dst, e))?;

    for entry in WalkDir::new(src).follow_links(false) {
        let entry = entry.map_err(|e| copy_error(src, dst, e))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| copy_error(src, dst, e))?;
        let target = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            fs::create_dir_all(&target).map_err(|e| copy_error(entry.path(), &target, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(&root, dst, entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| copy_error(entry.path(), &target, e))?;
        }
    }

    Ok(())
}

fn copy_symlink(root: &Path, dst: &Path, link: &Path, target: &Path) -> Result<()> {
    let resolved = match fs::canonicalize(link) {
        Ok(resolved) => resolved,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!("Skipping dangling symbolic link {}", link.display());
            return Ok(());
        }
        Err(e) => return Err(copy_error(link, target, e)),
    };

    match resolved.strip_prefix(root) {
        Ok(inside) => relink(&dst.join(inside), link, target),
        Err(_) if resolved.is_file() => {
            debug!(
                "Copying {} in place of link {}",
                resolved.display(),
                link.display()
            );
            fs::copy(&resolved, target).map_err(|e| copy_error(link, target, e))?;
            Ok(())
        }
        Err(_) => Err(copy_error(
            link,
            target,
            format!(
                "symbolic link to directory {} escapes the source tree",
                resolved.display()
            ),
        )),
    }
}

#[cfg(unix)]
fn relink(points_to: &Path, link: &Path, target: &Path) -> Result<()> {
    std::os::unix::fs::symlink(points_to, target).map_err(|e| copy_error(link, target, e))
}

#[cfg(not(unix))]
fn relink(points_to: &Path, link: &Path, target: &Path) -> Result<()> {
    // No portable way to recreate the link; copy what it points at if that is a file.
    if link.is_file() {
        fs::copy(link, target).map_err(|e| copy_error(link, target, e))?;
    } else {
        warn!(
            "Not recreating directory link {} -> {}",
            link.display(),
            points_to.display()
        );
    }
    Ok(())
}

fn copy_error(src: &Path, dst: &Path, message: impl ToString) -> Error {
    Error::Copy {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        message: message.to_string(),
    }
}

/// Name to give the copy of `src` inside a scratch directory.
///
/// Keeps the source directory's own name when it has one, so processors that
/// look at the package path see something recognisable.
pub fn copy_name(src: &Path) -> PathBuf {
    src.file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("checkout"))
}
