//! # Applied-Version State
//!
//! Tracks which tag was last materialized into a target directory and decides
//! whether another materialization is needed.
//!
//! The state is a single-line marker file ([`MARKER_FILE`]) inside the target
//! directory. It is anchored to the target, never to the mirror, so the
//! decision always reflects what is actually on disk in the target rather than
//! whatever the mirror happens to have checked out.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};

use crate::defaults::MARKER_FILE;
use crate::error::Result;
use crate::version::VersionTag;

/// Path of the marker file for a target directory.
pub fn marker_path(target_dir: &Path) -> PathBuf {
    target_dir.join(MARKER_FILE)
}

/// Read the applied version from the target's marker file.
///
/// A missing, unreadable, empty or unparseable marker yields `None`, which
/// makes the next decision an update. Self-healing wins over strict
/// validation here.
pub fn read_marker(target_dir: &Path) -> Option<VersionTag> {
    let path = marker_path(target_dir);

    let contents = match fs::read_to_string(&path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No marker at {}", path.display());
            return None;
        }
        Err(e) => {
            warn!("Ignoring unreadable marker {}: {}", path.display(), e);
            return None;
        }
    };

    let first_line = contents.lines().next().map(str::trim).unwrap_or_default();
    if first_line.is_empty() {
        return None;
    }

    match VersionTag::parse(first_line) {
        Ok(version) => Some(version),
        Err(_) => {
            warn!(
                "Ignoring marker {}: '{}' is not a version",
                path.display(),
                first_line
            );
            None
        }
    }
}

/// Persist `version` as the applied version of `target_dir`.
///
/// Creates the target directory if needed and overwrites any previous marker.
pub fn write_marker(target_dir: &Path, version: &VersionTag) -> Result<()> {
    fs::create_dir_all(target_dir)?;
    fs::write(marker_path(target_dir), format!("{}\n", version))?;
    Ok(())
}

/// Whether the target needs to be (re)materialized.
///
/// | marker  | force | selected vs marker | result    |
/// |---------|-------|--------------------|-----------|
/// | absent  | any   |                    | update    |
/// | present | true  | any                | update    |
/// | present | false | selected > marker  | update    |
/// | present | false | selected <= marker | no update |
pub fn needs_update(current: Option<&VersionTag>, selected: &VersionTag, force: bool) -> bool {
    match current {
        None => true,
        Some(_) if force => true,
        Some(marker) => selected > marker,
    }
}

/// Outcome of the per-run update decision. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncDecision {
    /// The version the target should end up at.
    pub selected: VersionTag,
    /// The version recorded in the target's marker, if any.
    pub current: Option<VersionTag>,
    /// Whether a materialization has to happen.
    pub update: bool,
}

impl SyncDecision {
    /// Decide for a version picked as the latest tag.
    pub fn for_latest(current: Option<VersionTag>, selected: VersionTag, force: bool) -> Self {
        let update = needs_update(current.as_ref(), &selected, force);
        Self {
            selected,
            current,
            update,
        }
    }

    /// Decide for an explicitly pinned version.
    ///
    /// A pin moves the target to exactly that version, downgrades included, so
    /// only an identical marker (without force) skips the update.
    pub fn for_pinned(current: Option<VersionTag>, selected: VersionTag, force: bool) -> Self {
        let differs = current.as_ref() != Some(&selected);
        let update = needs_update(current.as_ref(), &selected, force || differs);
        Self {
            selected,
            current,
            update,
        }
    }
}
