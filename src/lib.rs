//! # not-quite-submodules
//!
//! Keeps a plain directory filled with the contents of the latest tag of a
//! remote git repository, without the target becoming a git submodule. It is
//! meant for bootstrapping shared configuration (deployment recipes, CI
//! snippets) into consumer projects.
//!
//! ## Quick Example
//!
//! ```no_run
//! use not_quite_submodules::config::{force_from_env, SyncConfig};
//! use not_quite_submodules::sync::SyncEngine;
//!
//! let config = SyncConfig::new("git@github.com:org/deploy-recipes.git", "config/deploy");
//! let outcome = SyncEngine::new().run(&config, force_from_env())?;
//! println!("target at {}", outcome.decision.selected);
//! # Ok::<(), not_quite_submodules::error::Error>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Mirror (`mirror`)**: a disposable local clone of the remote, refreshed
//!   when older than the update interval and deleted and recloned when it
//!   stops looking like a git repository.
//! - **Version selection (`version`)**: tags are parsed as dotted versions and
//!   compared numerically, so `1.10.0` sorts after `1.2.0`.
//! - **Applied-version marker (`state`)**: `.CURRENT_TAG` in the target records
//!   the tag whose files were last copied there; it decides whether any work
//!   is needed.
//! - **Materialization (`materialize`)**: check out the tag in the mirror, copy
//!   it over the target, regenerate the target's `.gitignore`, write the
//!   marker.
//! - **Engine (`sync`)**: composes the above behind injected collaborators
//!   (`git::GitOperations`, `clock::Clock`, `progress::Reporter`).
//!
//! ## Limitations
//!
//! - External commands have no timeout; a hung `git` hangs the run.
//! - Nothing is locked. Concurrent runs against the same mirror or target are
//!   unsupported; serialise them externally, for example with a lock file.
//! - Materialization is not transactional. An interrupted copy leaves a
//!   partially updated target, and the unchanged marker makes the next run
//!   redo the work.

pub mod clock;
pub mod command;
pub mod config;
pub mod defaults;
pub mod error;
pub mod git;
pub mod materialize;
pub mod mirror;
pub mod output;
pub mod progress;
pub mod state;
pub mod sync;
pub mod version;

#[cfg(test)]
mod version_proptest;
