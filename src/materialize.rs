//! # Materialization
//!
//! Turns a tag in the mirror into files in the target directory:
//!
//! 1. detach the mirror at the tag and discard local modifications,
//! 2. copy the mirror's contents over the target,
//! 3. regenerate the target's exclusion file,
//! 4. record the tag in the target's marker file.
//!
//! The marker is written last so that an interrupted run leaves the previous
//! marker in place and the next run repeats the work. Nothing here is
//! transactional: an interruption during the copy leaves a mix of old and new
//! files until the next successful run.
//!
//! Top-level entries whose name starts with `.` are skipped by both the copy
//! and the exclusion listing, so the mirror's `.git` never reaches the target.
//! Hidden entries further down the tree are copied. Files present in the
//! target but absent from the tag are left alone.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;

use log::debug;
use walkdir::WalkDir;

use crate::defaults::{IGNORE_FILE, MARKER_FILE};
use crate::error::{Error, Result};
use crate::git::GitOperations;
use crate::progress::{Progress, Reporter};
use crate::state::write_marker;
use crate::version::VersionTag;

/// Copies a checked-out tag from a mirror into a target directory.
pub struct Materializer {
    git: Arc<dyn GitOperations>,
    reporter: Arc<dyn Reporter>,
}

impl Materializer {
    pub fn new(git: Arc<dyn GitOperations>, reporter: Arc<dyn Reporter>) -> Self {
        Self { git, reporter }
    }

    /// Materialize `version` from `mirror` into `target`.
    ///
    /// Returns the entries written to the exclusion file.
    pub fn materialize(
        &self,
        mirror: &Path,
        target: &Path,
        version: &VersionTag,
    ) -> Result<Vec<String>> {
        self.reporter.report(&Progress::Updating {
            version: version.to_string(),
        });
        self.git.checkout_tag(mirror, version.as_str())?;
        self.reporter.report(&Progress::CheckedOut {
            version: version.to_string(),
        });

        self.reporter.report(&Progress::Copying {
            target: target.to_path_buf(),
        });
        copy_tree(mirror, target)?;

        let ignore_path = target.join(IGNORE_FILE);
        self.reporter.report(&Progress::WritingIgnoreFile {
            path: ignore_path.clone(),
        });
        let entries = ignore_entries(mirror)?;
        fs::write(&ignore_path, render_ignore_file(&entries))?;

        write_marker(target, version)?;
        self.reporter.report(&Progress::Finished {
            target: target.to_path_buf(),
            version: version.to_string(),
        });

        Ok(entries)
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

/// Recursively copy `src` over `dst`, overwriting files that already exist.
///
/// `dst` is created if needed. Top-level hidden entries of `src` are skipped.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| copy_error(src, dst, e))?;

    let walker = WalkDir::new(src)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| e.depth() != 1 || !is_hidden(e.file_name()));

    for entry in walker {
        let entry = entry.map_err(|e| Error::Copy {
            src: e.path().unwrap_or(src).to_path_buf(),
            dst: dst.to_path_buf(),
            message: e.to_string(),
        })?;

        let relative = entry.path().strip_prefix(src).map_err(|e| Error::Copy {
            src: entry.path().to_path_buf(),
            dst: dst.to_path_buf(),
            message: e.to_string(),
        })?;
        let destination = dst.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            remove_symlink(&destination)
                .and_then(|_| fs::create_dir_all(&destination))
                .map_err(|e| copy_error(entry.path(), &destination, e))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &destination)
                .map_err(|e| copy_error(entry.path(), &destination, e))?;
        } else {
            remove_symlink(&destination)
                .and_then(|_| fs::copy(entry.path(), &destination))
                .map_err(|e| copy_error(entry.path(), &destination, e))?;
        }
    }

    debug!("Copied {} to {}", src.display(), dst.display());
    Ok(())
}

/// A link left in the target by an earlier version is replaced, not
/// written through.
fn remove_symlink(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.file_type().is_symlink() => fs::remove_file(path),
        _ => Ok(()),
    }
}

#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    let link = fs::read_link(src)?;
    if fs::symlink_metadata(dst).is_ok() {
        fs::remove_file(dst)?;
    }
    std::os::unix::fs::symlink(link, dst)
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> io::Result<()> {
    fs::copy(src, dst).map(|_| ())
}

fn copy_error(src: &Path, dst: &Path, err: io::Error) -> Error {
    Error::Copy {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        message: err.to_string(),
    }
}

/// Entries for the exclusion file: the mirror's visible top-level names,
/// sorted, followed by the marker and exclusion file names.
pub fn ignore_entries(mirror: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(mirror)? {
        let entry = entry?;
        if is_hidden(&entry.file_name()) {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();

    for name in [MARKER_FILE, IGNORE_FILE] {
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    Ok(names)
}

/// One entry per line, newline-terminated.
pub fn render_ignore_file(entries: &[String]) -> String {
    let mut out = String::new();
    for entry in entries {
        out.push_str(entry);
        out.push('\n');
    }
    out
}
