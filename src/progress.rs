//! # Progress Reporting
//!
//! Synchronization steps announce themselves through a [`Reporter`]. The
//! library never prints; the CLI installs a terminal reporter
//! (`output::ConsoleReporter`) and library users get [`LogReporter`] by
//! default.
//!
//! Events are typed so callers can tell a first clone from a recovery
//! re-clone, or an up-to-date target from a fresh materialization, without
//! parsing messages.

use std::fmt;
use std::path::PathBuf;

use log::info;

/// A progress notification emitted before or after a synchronization step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Progress {
    /// The mirror failed its status probe and is being deleted.
    MirrorInvalid { mirror: PathBuf },
    /// A fresh clone is about to start.
    Cloning { remote: String, mirror: PathBuf },
    /// The mirror is stale (or forced) and is about to be refreshed.
    Refreshing { mirror: PathBuf },
    /// The refresh finished; `head` is the short commit id now checked out.
    Refreshed { head: String },
    /// The mirror is recent enough and is used as is.
    MirrorFresh { mirror: PathBuf },
    /// The applied and selected versions, reported before deciding.
    VersionStatus {
        current: Option<String>,
        selected: String,
    },
    /// Nothing to do: the target already holds the selected version.
    UpToDate { version: String },
    /// Materialization of `version` is about to start.
    Updating { version: String },
    /// `version` is checked out in the mirror.
    CheckedOut { version: String },
    /// Files are about to be copied into `target`.
    Copying { target: PathBuf },
    /// The exclusion file is about to be written.
    WritingIgnoreFile { path: PathBuf },
    /// The target now holds `version`.
    Finished { target: PathBuf, version: String },
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Progress::MirrorInvalid { mirror } => write!(
                f,
                "Repository at '{}' seems to be invalid. Deleting it.",
                mirror.display()
            ),
            Progress::Cloning { remote, mirror } => {
                write!(f, "Cloning repository {} to {}", remote, mirror.display())
            }
            Progress::Refreshing { mirror } => write!(
                f,
                "Updating local repository at '{}'",
                mirror.display()
            ),
            Progress::Refreshed { head } => {
                write!(f, "Updated local repository to {}", head)
            }
            Progress::MirrorFresh { mirror } => write!(
                f,
                "Local repository at '{}' is up to date",
                mirror.display()
            ),
            Progress::VersionStatus { current, selected } => write!(
                f,
                "Currently checked out tag is {}, latest tag is {}",
                current.as_deref().unwrap_or("(none)"),
                selected
            ),
            Progress::UpToDate { version } => write!(f, "Already at '{}'", version),
            Progress::Updating { version } => {
                write!(f, "About to update target path to tag '{}'", version)
            }
            Progress::CheckedOut { version } => write!(f, "Updated to '{}'", version),
            Progress::Copying { target } => {
                write!(f, "Copying updated files to '{}'", target.display())
            }
            Progress::WritingIgnoreFile { path } => write!(f, "Updating {}", path.display()),
            Progress::Finished { target, version } => write!(
                f,
                "Finished updating '{}' to '{}'",
                target.display(),
                version
            ),
        }
    }
}

/// Receives progress notifications.
pub trait Reporter: Send + Sync {
    fn report(&self, event: &Progress);
}

/// Forwards progress to the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl Reporter for LogReporter {
    fn report(&self, event: &Progress) {
        info!("{}", event);
    }
}

/// Discards all progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentReporter;

impl Reporter for SilentReporter {
    fn report(&self, _event: &Progress) {}
}

/// Keeps every event, for assertions in tests.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    events: std::sync::Mutex<Vec<Progress>>,
}

#[cfg(test)]
impl RecordingReporter {
    pub(crate) fn events(&self) -> Vec<Progress> {
        self.events.lock().unwrap().clone()
    }
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn report(&self, event: &Progress) {
        self.events.lock().unwrap().push(event.clone());
    }
}
