//! Shared test utilities for the CLI end-to-end tests.
//!
//! [`TestFixture`] owns a temporary directory holding a local "remote" git
//! repository with tags, a mirror location and a target directory. Building
//! the remote needs a `git` binary, so tests using it are gated behind the
//! `integration-tests` feature.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! #[cfg_attr(not(feature = "integration-tests"), ignore)]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_release("1.0.0", &[("deploy.rb", "v1")]);
//!     fixture.sync().assert().success();
//! }
//! ```

use assert_fs::prelude::*;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    #[allow(unused_imports)]
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    pub use super::TestFixture;
}

/// Environment variables the binary reads; cleared so the host environment
/// cannot leak into a test.
const ENV_VARS: &[&str] = &[
    "NQS_REMOTE",
    "NQS_TARGET",
    "NQS_MIRROR",
    "FORCE_UPDATE",
    "CAPBOOTSTRAP_FORCE",
    "RUST_LOG",
];

/// Temporary workspace with a tagged remote repository.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
    remote_ready: bool,
}

#[allow(dead_code)]
impl TestFixture {
    /// Create a fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
            remote_ready: false,
        }
    }

    /// Commit `files` to the remote and tag the commit as `tag`.
    ///
    /// Files from earlier releases stay unless overwritten.
    pub fn with_release(mut self, tag: &str, files: &[(&str, &str)]) -> Self {
        self.add_release(tag, files);
        self
    }

    /// Same as [`with_release`](Self::with_release) on an existing fixture.
    pub fn add_release(&mut self, tag: &str, files: &[(&str, &str)]) {
        if !self.remote_ready {
            std::fs::create_dir_all(self.remote()).expect("Failed to create remote dir");
            self.git(&["init", "--quiet"]);
            self.git(&["config", "user.email", "tests@example.com"]);
            self.git(&["config", "user.name", "Tests"]);
            self.git(&["config", "commit.gpgsign", "false"]);
            self.remote_ready = true;
        }
        for (path, content) in files {
            self.temp_dir
                .child("remote")
                .child(path)
                .write_str(content)
                .expect("Failed to write remote file");
        }
        self.git(&["add", "--all"]);
        self.git(&["commit", "--quiet", "--allow-empty", "-m", tag]);
        self.git(&["tag", tag]);
    }

    /// Add a lightweight tag to the remote's current commit.
    pub fn add_tag(&self, tag: &str) {
        self.git(&["tag", tag]);
    }

    fn git(&self, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(self.remote())
            .status()
            .expect("Failed to run git");
        assert!(status.success(), "git {:?} failed", args);
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// The local repository acting as the remote.
    pub fn remote(&self) -> PathBuf {
        self.path().join("remote")
    }

    /// Where the mirror is kept.
    pub fn mirror(&self) -> PathBuf {
        self.path().join("mirror")
    }

    /// The directory receiving materialized files.
    pub fn target(&self) -> PathBuf {
        self.path().join("target")
    }

    /// Read a file from the target directory.
    pub fn target_file(&self, name: &str) -> String {
        std::fs::read_to_string(self.target().join(name)).expect("Failed to read target file")
    }

    /// Create a CLI command running in the fixture directory with a clean
    /// environment.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("not-quite-submodules");
        cmd.current_dir(self.path());
        for var in ENV_VARS {
            cmd.env_remove(var);
        }
        cmd.env("NO_COLOR", "1");
        cmd
    }

    fn with_locations(&self, subcommand: &str) -> assert_cmd::Command {
        let mut cmd = self.command();
        cmd.arg(subcommand)
            .arg("--remote")
            .arg(self.remote())
            .arg("--target")
            .arg(self.target())
            .arg("--mirror")
            .arg(self.mirror());
        cmd
    }

    /// `sync` against the fixture's remote, mirror and target.
    pub fn sync(&self) -> assert_cmd::Command {
        self.with_locations("sync")
    }

    /// `status` against the fixture's remote, mirror and target.
    pub fn status(&self) -> assert_cmd::Command {
        self.with_locations("status")
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
