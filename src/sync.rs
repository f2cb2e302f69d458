//! # Synchronisation Engine
//!
//! [`SyncEngine`] runs one synchronisation end to end:
//!
//! ```text
//! ensure mirror -> list tags -> select version -> read marker -> decide -> materialize
//! ```
//!
//! Every collaborator (git, clock, progress reporter) is injected, so several
//! engines can coexist in one process and tests can run without a network or
//! a `git` binary. The engine never reads the environment; the force flag is
//! an argument.
//!
//! Runs are not safe to overlap on the same mirror or target path. Callers
//! that may run concurrently should serialise around an external lock file.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use log::debug;

use crate::clock::{Clock, SystemClock};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::git::{CliGitOperations, GitOperations};
use crate::materialize::Materializer;
use crate::mirror::{last_refreshed, Mirror, MirrorManager, MirrorRequest};
use crate::progress::{LogReporter, Progress, Reporter};
use crate::state::{read_marker, SyncDecision};
use crate::version::{latest_from_tags, select_forced, VersionTag};

/// Result of [`SyncEngine::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOutcome {
    /// The mirror as left by the run.
    pub mirror: Mirror,
    /// The decision taken for the target.
    pub decision: SyncDecision,
    /// Exclusion file entries, when the target was materialized.
    pub ignored: Option<Vec<String>>,
}

impl SyncOutcome {
    /// Whether the target was (re)materialized.
    pub fn updated(&self) -> bool {
        self.ignored.is_some()
    }
}

/// Read-only view of a synchronisation, from [`SyncEngine::status`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStatus {
    pub target: PathBuf,
    pub mirror: PathBuf,
    /// Version recorded in the target's marker.
    pub current: Option<VersionTag>,
    /// Whether a valid mirror exists.
    pub mirror_present: bool,
    /// Last clone or refresh of the mirror.
    pub last_refreshed: Option<SystemTime>,
    /// Latest version tag known to the mirror, without fetching.
    pub latest: Option<VersionTag>,
}

impl SyncStatus {
    /// Whether a non-forced `run` against the current mirror would update.
    pub fn update_available(&self) -> bool {
        match (&self.current, &self.latest) {
            (_, None) => false,
            (None, Some(_)) => true,
            (Some(current), Some(latest)) => latest > current,
        }
    }
}

/// Composes mirror management, version selection and materialization.
pub struct SyncEngine {
    git: Arc<dyn GitOperations>,
    reporter: Arc<dyn Reporter>,
    mirrors: MirrorManager,
    materializer: Materializer,
}

impl SyncEngine {
    /// Engine using the system `git`, the wall clock and [`LogReporter`].
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(LogReporter))
    }

    /// Engine using the system `git` and wall clock with a custom reporter.
    pub fn with_reporter(reporter: Arc<dyn Reporter>) -> Self {
        Self::with_operations(
            Arc::new(CliGitOperations::default()),
            Arc::new(SystemClock),
            reporter,
        )
    }

    /// Engine with every collaborator supplied by the caller.
    pub fn with_operations(
        git: Arc<dyn GitOperations>,
        clock: Arc<dyn Clock>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            mirrors: MirrorManager::new(git.clone(), clock, reporter.clone()),
            materializer: Materializer::new(git.clone(), reporter.clone()),
            git,
            reporter,
        }
    }

    /// Synchronise `config.target` with its remote.
    ///
    /// `force` refreshes the mirror regardless of its age and materializes
    /// regardless of the marker.
    pub fn run(&self, config: &SyncConfig, force: bool) -> Result<SyncOutcome> {
        let mirror_path = config.mirror_path();
        let mirror = self.mirrors.ensure(&MirrorRequest {
            remote: &config.remote,
            path: &mirror_path,
            update_interval: config.update_interval(),
            force,
            branch: config.branch.as_deref(),
        })?;

        let current = read_marker(&config.target);
        let decision = match &config.version {
            Some(pinned) => SyncDecision::for_pinned(current, select_forced(pinned)?, force),
            None => {
                let tags = self.git.list_tags(&mirror.path)?;
                let latest = latest_from_tags(&mirror.path, &tags)?;
                SyncDecision::for_latest(current, latest, force)
            }
        };

        self.reporter.report(&Progress::VersionStatus {
            current: decision.current.as_ref().map(|v| v.to_string()),
            selected: decision.selected.to_string(),
        });
        debug!(
            "Target {}: marker {:?}, selected {}, force {}, update {}",
            config.target.display(),
            decision.current.as_ref().map(VersionTag::as_str),
            decision.selected,
            force,
            decision.update
        );

        let ignored = if decision.update {
            Some(self.materializer.materialize(
                &mirror.path,
                &config.target,
                &decision.selected,
            )?)
        } else {
            self.reporter.report(&Progress::UpToDate {
                version: decision.selected.to_string(),
            });
            None
        };

        Ok(SyncOutcome {
            mirror,
            decision,
            ignored,
        })
    }

    /// Inspect a synchronisation without touching the network, the mirror or
    /// the target.
    pub fn status(&self, config: &SyncConfig) -> Result<SyncStatus> {
        let mirror = config.mirror_path();
        let mirror_present = mirror.exists() && self.git.is_valid(&mirror);

        let latest = if mirror_present {
            let tags = self.git.list_tags(&mirror)?;
            match latest_from_tags(&mirror, &tags) {
                Ok(latest) => Some(latest),
                Err(e) => {
                    debug!("No latest version in {}: {}", mirror.display(), e);
                    None
                }
            }
        } else {
            None
        };

        Ok(SyncStatus {
            target: config.target.clone(),
            current: read_marker(&config.target),
            last_refreshed: if mirror_present {
                last_refreshed(&mirror)
            } else {
                None
            },
            mirror,
            mirror_present,
            latest,
        })
    }
}

impl Default for SyncEngine {
    fn default() -> Self {
        Self::new()
    }
}
