//! # Git Operations
//!
//! The git commands the mirror manager and materializer need, expressed as the
//! [`GitOperations`] trait so they can be replaced in tests.
//!
//! [`CliGitOperations`] drives the system `git` binary through a
//! [`CommandRunner`], which means authentication works exactly as it does on
//! the command line:
//! - SSH keys from ~/.ssh/
//! - Git credential helpers
//! - Personal access tokens
//! - Any authentication configured in ~/.gitconfig

use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::debug;

use crate::command::{quote, CommandRunner, ShellCommandRunner};
use crate::defaults::FALLBACK_BRANCH;
use crate::error::Result;

/// Git operations on a local mirror. Allows mocking in tests.
pub trait GitOperations: Send + Sync {
    /// Cheap probe: is `mirror` a usable clone?
    fn is_valid(&self, mirror: &Path) -> bool;

    /// Clone `remote` into `mirror`, which must not exist yet.
    fn clone_repo(&self, remote: &str, mirror: &Path) -> Result<()>;

    /// Name of the remote's primary branch as recorded in the mirror.
    fn primary_branch(&self, mirror: &Path) -> Result<String>;

    /// Switch the mirror to a local branch.
    fn checkout_branch(&self, mirror: &Path, branch: &str) -> Result<()>;

    /// Fetch all history and tags from `origin`.
    fn fetch(&self, mirror: &Path) -> Result<()>;

    /// Hard-reset the mirror's current branch to `rev`.
    fn reset_hard(&self, mirror: &Path, rev: &str) -> Result<()>;

    /// Full commit id of the mirror's HEAD.
    fn head(&self, mirror: &Path) -> Result<String>;

    /// All tag names in the mirror.
    fn list_tags(&self, mirror: &Path) -> Result<Vec<String>>;

    /// Detach the mirror at `tag`, discarding any local modifications.
    fn checkout_tag(&self, mirror: &Path, tag: &str) -> Result<()>;
}

/// [`GitOperations`] backed by the `git` command line.
#[derive(Clone)]
pub struct CliGitOperations {
    runner: Arc<dyn CommandRunner>,
}

impl CliGitOperations {
    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }

    fn git(&self, mirror: &Path, args: &str) -> Result<String> {
        self.runner.run(&format!("git {}", args), mirror)
    }
}

impl Default for CliGitOperations {
    fn default() -> Self {
        Self::new(Arc::new(ShellCommandRunner::new()))
    }
}

impl GitOperations for CliGitOperations {
    fn is_valid(&self, mirror: &Path) -> bool {
        // Without the .git check a mirror nested in another work tree would
        // pass the status probe on behalf of its parent.
        mirror.join(".git").exists() && self.git(mirror, "status").is_ok()
    }

    fn clone_repo(&self, remote: &str, mirror: &Path) -> Result<()> {
        let (parent, name) = clone_destination(mirror)?;
        fs::create_dir_all(&parent)?;

        let command = format!(
            "git clone {} {}",
            quote(&clone_source(remote)?),
            quote(&name.to_string_lossy())
        );
        self.runner.run(&command, &parent)?;
        Ok(())
    }

    fn primary_branch(&self, mirror: &Path) -> Result<String> {
        match self.git(mirror, "symbolic-ref --short refs/remotes/origin/HEAD") {
            Ok(out) => {
                let name = out.trim();
                Ok(name.strip_prefix("origin/").unwrap_or(name).to_string())
            }
            Err(e) => {
                debug!(
                    "Could not resolve origin/HEAD in {} ({}); using '{}'",
                    mirror.display(),
                    e,
                    FALLBACK_BRANCH
                );
                Ok(FALLBACK_BRANCH.to_string())
            }
        }
    }

    fn checkout_branch(&self, mirror: &Path, branch: &str) -> Result<()> {
        self.git(mirror, &format!("checkout --force {}", quote(branch)))?;
        Ok(())
    }

    fn fetch(&self, mirror: &Path) -> Result<()> {
        self.git(mirror, "fetch --tags --force origin")?;
        Ok(())
    }

    fn reset_hard(&self, mirror: &Path, rev: &str) -> Result<()> {
        self.git(mirror, &format!("reset --hard {}", quote(rev)))?;
        Ok(())
    }

    fn head(&self, mirror: &Path) -> Result<String> {
        Ok(self.git(mirror, "rev-parse HEAD")?.trim().to_string())
    }

    fn list_tags(&self, mirror: &Path) -> Result<Vec<String>> {
        let out = self.git(mirror, "tag")?;
        Ok(out
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }

    fn checkout_tag(&self, mirror: &Path, tag: &str) -> Result<()> {
        self.git(
            mirror,
            &format!("checkout --force --detach {}", quote(&format!("refs/tags/{}", tag))),
        )?;
        self.git(mirror, "clean -ffdx")?;
        Ok(())
    }
}

/// Absolute parent directory and final component of `mirror`.
///
/// `git clone` runs inside the parent and receives only the name, so a
/// relative mirror is not joined onto its own parent twice.
fn clone_destination(mirror: &Path) -> Result<(PathBuf, OsString)> {
    let mirror = std::path::absolute(mirror)?;
    let name = mirror.file_name().map(OsStr::to_os_string).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("mirror path {} has no directory name", mirror.display()),
        )
    })?;
    let parent = mirror
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("/"));
    Ok((parent, name))
}

/// A remote naming an existing relative path is made absolute against the
/// caller's working directory. URLs and absolute paths pass through.
fn clone_source(remote: &str) -> Result<String> {
    let path = Path::new(remote);
    if path.is_relative() && path.exists() {
        return Ok(std::path::absolute(path)?.to_string_lossy().into_owned());
    }
    Ok(remote.to_string())
}
