//! # Mirror Management
//!
//! The mirror is a full local clone of the remote repository, used only as a
//! staging area for tagged contents. Nobody edits it by hand, so it can be
//! thrown away at any time.
//!
//! [`MirrorManager::ensure`] brings a mirror into a usable state:
//!
//! 1.  If the mirror path exists but fails the status probe, the whole tree is
//!     deleted. Parts of a mirror kept under a temporary or cache directory can
//!     disappear during OS cleanup, and a half-deleted clone is easier to
//!     replace than to repair.
//! 2.  A missing mirror is cloned fresh.
//! 3.  An existing mirror is refreshed when forced or when it was last
//!     refreshed longer ago than the update interval: check out the primary
//!     branch, fetch history and tags, hard-reset to `origin/<branch>`, then
//!     touch the mirror directory to restart the staleness clock.
//! 4.  Otherwise the mirror is left alone.
//!
//! The last-refresh time is the modification time of the mirror directory.
//!
//! No locking is done here. Two runs against the same mirror path at the same
//! time can corrupt it; callers must serialize them.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use filetime::FileTime;
use log::debug;

use crate::clock::Clock;
use crate::error::Result;
use crate::git::GitOperations;
use crate::progress::{Progress, Reporter};

/// How a mirror got into its current state during [`MirrorManager::ensure`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirrorStatus {
    /// No mirror existed; it was cloned.
    Cloned,
    /// The mirror was invalid, deleted and cloned again.
    Recloned,
    /// The mirror was refreshed from the remote; `head` is the short commit id.
    Refreshed { head: String },
    /// The mirror was recent enough and left untouched.
    Fresh,
}

/// A ready-to-use local clone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mirror {
    /// Location of the clone.
    pub path: PathBuf,
    /// Remote it was cloned from.
    pub remote: String,
    /// What `ensure` did to it.
    pub status: MirrorStatus,
}

/// Parameters of one [`MirrorManager::ensure`] call.
#[derive(Debug, Clone)]
pub struct MirrorRequest<'a> {
    pub remote: &'a str,
    pub path: &'a Path,
    pub update_interval: Duration,
    pub force: bool,
    /// Primary branch; resolved from the mirror when `None`.
    pub branch: Option<&'a str>,
}

/// Modification time of `path`, if it can be read.
pub fn last_refreshed(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Whether a mirror last refreshed at `last` is due for a refresh at `now`.
///
/// An unknown refresh time counts as stale. A refresh time in the future
/// (clock skew) counts as fresh.
pub fn is_stale(last: Option<SystemTime>, now: SystemTime, interval: Duration) -> bool {
    match last {
        None => true,
        Some(last) => now.duration_since(last).unwrap_or(Duration::ZERO) > interval,
    }
}

/// Creates, validates, heals and refreshes mirrors.
pub struct MirrorManager {
    git: Arc<dyn GitOperations>,
    clock: Arc<dyn Clock>,
    reporter: Arc<dyn Reporter>,
}

impl MirrorManager {
    pub fn new(
        git: Arc<dyn GitOperations>,
        clock: Arc<dyn Clock>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        Self {
            git,
            clock,
            reporter,
        }
    }

    /// Make sure a valid, sufficiently fresh mirror exists at `request.path`.
    ///
    /// Clone, fetch and reset failures are returned as is. A failed refresh
    /// leaves the mirror in place; if it ends up invalid the next call deletes
    /// it.
    pub fn ensure(&self, request: &MirrorRequest<'_>) -> Result<Mirror> {
        let path = request.path;
        let recovered = self.discard_if_invalid(path)?;

        let status = if !path.exists() {
            self.reporter.report(&Progress::Cloning {
                remote: request.remote.to_string(),
                mirror: path.to_path_buf(),
            });
            self.git.clone_repo(request.remote, path)?;
            if recovered {
                MirrorStatus::Recloned
            } else {
                MirrorStatus::Cloned
            }
        } else if request.force || self.is_due(path, request.update_interval) {
            let head = self.refresh(path, request.branch)?;
            MirrorStatus::Refreshed { head }
        } else {
            self.reporter.report(&Progress::MirrorFresh {
                mirror: path.to_path_buf(),
            });
            MirrorStatus::Fresh
        };

        Ok(Mirror {
            path: path.to_path_buf(),
            remote: request.remote.to_string(),
            status,
        })
    }

    /// Delete the mirror if it exists but fails the status probe. Returns
    /// whether something was deleted.
    fn discard_if_invalid(&self, path: &Path) -> Result<bool> {
        if !path.exists() || self.git.is_valid(path) {
            return Ok(false);
        }

        self.reporter.report(&Progress::MirrorInvalid {
            mirror: path.to_path_buf(),
        });
        if path.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        Ok(true)
    }

    fn is_due(&self, path: &Path, interval: Duration) -> bool {
        let last = last_refreshed(path);
        let now = self.clock.now();
        let due = is_stale(last, now, interval);
        debug!(
            "Mirror {} last refreshed {:?} ago, interval {:?}: {}",
            path.display(),
            last.and_then(|l| now.duration_since(l).ok()),
            interval,
            if due { "stale" } else { "fresh" }
        );
        due
    }

    fn refresh(&self, path: &Path, branch: Option<&str>) -> Result<String> {
        self.reporter.report(&Progress::Refreshing {
            mirror: path.to_path_buf(),
        });

        let branch = match branch {
            Some(b) => b.to_string(),
            None => self.git.primary_branch(path)?,
        };

        self.git.checkout_branch(path, &branch)?;
        self.git.fetch(path)?;
        self.git.reset_hard(path, &format!("origin/{}", branch))?;

        let head: String = self.git.head(path)?.chars().take(8).collect();
        self.reporter.report(&Progress::Refreshed { head: head.clone() });

        filetime::set_file_mtime(path, FileTime::from_system_time(self.clock.now()))?;
        Ok(head)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::ManualClock;
    use super::*;
    use crate::git::mock::MockGitOperations;
    use crate::progress::RecordingReporter;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(86_400);
    const REMOTE: &str = "https://example.com/org/config.git";

    struct Fixture {
        _temp: TempDir,
        mirror: PathBuf,
        git: Arc<MockGitOperations>,
        clock: Arc<ManualClock>,
        reporter: Arc<RecordingReporter>,
        manager: MirrorManager,
    }

    fn fixture() -> Fixture {
        let temp = TempDir::new().unwrap();
        let mirror = temp.path().join("mirror");
        let git = Arc::new(MockGitOperations::new(&["1.0.0"]));
        let clock = Arc::new(ManualClock::new());
        let reporter = Arc::new(RecordingReporter::default());
        let manager = MirrorManager::new(git.clone(), clock.clone(), reporter.clone());
        Fixture {
            _temp: temp,
            mirror,
            git,
            clock,
            reporter,
            manager,
        }
    }

    fn request(path: &Path, force: bool) -> MirrorRequest<'_> {
        MirrorRequest {
            remote: REMOTE,
            path,
            update_interval: DAY,
            force,
            branch: None,
        }
    }

    #[test]
    fn test_is_stale() {
        let now = SystemTime::now();
        assert!(is_stale(None, now, DAY));
        assert!(!is_stale(Some(now), now, DAY));
        assert!(!is_stale(Some(now - DAY), now, DAY));
        assert!(is_stale(Some(now - DAY - Duration::from_secs(1)), now, DAY));
        assert!(!is_stale(Some(now + DAY), now, DAY));
    }

    #[test]
    fn test_ensure_clones_missing_mirror() {
        let f = fixture();

        let mirror = f.manager.ensure(&request(&f.mirror, false)).unwrap();

        assert_eq!(mirror.status, MirrorStatus::Cloned);
        assert_eq!(mirror.remote, REMOTE);
        assert_eq!(f.git.calls(), vec![format!("clone {}", REMOTE)]);
        assert!(f.mirror.join("deploy.rb").exists());
        assert!(matches!(
            f.reporter.events().as_slice(),
            [Progress::Cloning { .. }]
        ));
    }

    #[test]
    fn test_ensure_leaves_fresh_mirror_alone() {
        let f = fixture();
        f.manager.ensure(&request(&f.mirror, false)).unwrap();

        let mirror = f.manager.ensure(&request(&f.mirror, false)).unwrap();

        assert_eq!(mirror.status, MirrorStatus::Fresh);
        assert_eq!(f.git.count("clone"), 1);
        assert_eq!(f.git.count("fetch"), 0);
    }

    #[test]
    fn test_ensure_refreshes_stale_mirror() {
        let f = fixture();
        f.manager.ensure(&request(&f.mirror, false)).unwrap();
        f.clock.advance(DAY + Duration::from_secs(60));

        let mirror = f.manager.ensure(&request(&f.mirror, false)).unwrap();

        assert_eq!(
            mirror.status,
            MirrorStatus::Refreshed {
                head: "01234567".to_string()
            }
        );
        assert_eq!(
            &f.git.calls()[1..],
            &[
                "status",
                "primary_branch",
                "checkout_branch main",
                "fetch",
                "reset_hard origin/main",
                "head"
            ]
        );
        assert!(f
            .reporter
            .events()
            .contains(&Progress::Refreshed {
                head: "01234567".to_string()
            }));
    }

    #[test]
    fn test_refresh_touches_mirror() {
        let f = fixture();
        f.manager.ensure(&request(&f.mirror, false)).unwrap();
        f.clock.advance(DAY * 2);

        f.manager.ensure(&request(&f.mirror, false)).unwrap();

        let touched = last_refreshed(&f.mirror).unwrap();
        let drift = match f.clock.now().duration_since(touched) {
            Ok(d) => d,
            Err(e) => e.duration(),
        };
        assert!(drift < Duration::from_secs(2));
        let again = f.manager.ensure(&request(&f.mirror, false)).unwrap();
        assert_eq!(again.status, MirrorStatus::Fresh);
        assert_eq!(f.git.count("fetch"), 1);
    }

    #[test]
    fn test_old_mtime_makes_mirror_stale() {
        let f = fixture();
        f.manager.ensure(&request(&f.mirror, false)).unwrap();
        let two_days_ago = f.clock.now() - DAY * 2;
        filetime::set_file_mtime(&f.mirror, FileTime::from_system_time(two_days_ago)).unwrap();

        let mirror = f.manager.ensure(&request(&f.mirror, false)).unwrap();

        assert!(matches!(mirror.status, MirrorStatus::Refreshed { .. }));
    }

    #[test]
    fn test_force_refreshes_fresh_mirror() {
        let f = fixture();
        f.manager.ensure(&request(&f.mirror, false)).unwrap();

        let mirror = f.manager.ensure(&request(&f.mirror, true)).unwrap();

        assert!(matches!(mirror.status, MirrorStatus::Refreshed { .. }));
        assert_eq!(f.git.count("fetch"), 1);
    }

    #[test]
    fn test_explicit_branch_skips_resolution() {
        let f = fixture();
        f.manager.ensure(&request(&f.mirror, false)).unwrap();

        let mut req = request(&f.mirror, true);
        req.branch = Some("release");
        f.manager.ensure(&req).unwrap();

        assert_eq!(f.git.count("primary_branch"), 0);
        assert_eq!(f.git.count("checkout_branch release"), 1);
        assert_eq!(f.git.count("reset_hard origin/release"), 1);
    }

    #[test]
    fn test_invalid_mirror_is_deleted_and_recloned() {
        let f = fixture();
        fs::create_dir_all(&f.mirror).unwrap();
        fs::write(f.mirror.join("leftover.txt"), "stale").unwrap();
        f.git.set_valid(false);

        let mirror = f.manager.ensure(&request(&f.mirror, false)).unwrap();

        assert_eq!(mirror.status, MirrorStatus::Recloned);
        assert!(!f.mirror.join("leftover.txt").exists());
        assert_eq!(f.git.calls(), vec!["status".to_string(), format!("clone {}", REMOTE)]);

        let events = f.reporter.events();
        assert!(matches!(events[0], Progress::MirrorInvalid { .. }));
        assert!(matches!(events[1], Progress::Cloning { .. }));
    }

    #[test]
    fn test_invalid_mirror_file_is_removed() {
        let f = fixture();
        fs::write(&f.mirror, "not a directory").unwrap();
        f.git.set_valid(false);

        let mirror = f.manager.ensure(&request(&f.mirror, false)).unwrap();

        assert_eq!(mirror.status, MirrorStatus::Recloned);
        assert!(f.mirror.is_dir());
    }

    #[test]
    fn test_clone_failure_propagates() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mirror");
        let git = Arc::new(MockGitOperations::new(&[]).failing_on("clone"));
        let manager = MirrorManager::new(
            git.clone(),
            Arc::new(ManualClock::new()),
            Arc::new(RecordingReporter::default()),
        );

        let err = manager.ensure(&request(&path, false)).unwrap_err();
        assert!(err.to_string().contains("simulated failure"));
    }

    #[test]
    fn test_fetch_failure_propagates_and_keeps_mirror() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("mirror");
        fs::create_dir_all(path.join(".git")).unwrap();
        let git = Arc::new(MockGitOperations::new(&[]).failing_on("fetch"));
        let manager = MirrorManager::new(
            git.clone(),
            Arc::new(ManualClock::new()),
            Arc::new(RecordingReporter::default()),
        );

        let result = manager.ensure(&request(&path, true));

        assert!(result.is_err());
        assert!(path.exists());
        assert_eq!(git.count("reset_hard"), 0);
    }
}
