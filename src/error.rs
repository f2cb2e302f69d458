//! # Error Handling
//!
//! This module defines the centralized error type for `not-quite-submodules`.
//! It uses the `thiserror` library to build a single `Error` enum covering
//! every failure mode of a synchronization run, each variant carrying enough
//! context to diagnose the problem without re-running with extra logging.
//!
//! ## Taxonomy
//!
//! - **Command failures** (`CommandExecution`, `CommandSpawn`): an external
//!   command exited non-zero or could not be started. Clone, fetch, reset and
//!   checkout failures against the remote all surface this way, with the
//!   literal command string and its captured combined output.
//! - **Tag problems** (`NoTags`, `NoVersionTags`, `AmbiguousVersion`,
//!   `InvalidVersion`): the mirror has no usable version to materialize. These
//!   point at a misconfigured source repository rather than connectivity.
//! - **Configuration** (`ConfigParse`, `Yaml`): the config file is invalid.
//! - **Filesystem** (`Copy`, `Io`): writing into the target directory failed.
//!
//! An invalid mirror is *not* an error: it is healed by deletion and reported
//! through the progress collaborator instead. An unreadable marker is treated
//! as absent.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for not-quite-submodules operations
#[derive(Error, Debug)]
pub enum Error {
    /// An external command exited with a non-zero status.
    #[error("There was an error executing '{command}'. Output:\n{output}")]
    CommandExecution { command: String, output: String },

    /// An external command could not be started at all.
    #[error("Failed to start '{command}': {message}")]
    CommandSpawn { command: String, message: String },

    /// The mirror's tag listing is empty.
    #[error("Repository in path {} does not contain any tags (no tags present)", path.display())]
    NoTags { path: PathBuf },

    /// Tags exist, but none of them parse as a dotted version.
    #[error("Repository in path {} has {count} tag(s) but none of them is a version", path.display())]
    NoVersionTags { path: PathBuf, count: usize },

    /// Two distinct tag strings parse to the same version at the top of the
    /// ordering, so there is no single latest tag.
    #[error("Tags '{first}' and '{second}' describe the same version; cannot pick the latest")]
    AmbiguousVersion { first: String, second: String },

    /// A version string (forced version or marker contents) could not be
    /// parsed.
    #[error("Invalid version '{tag}': expected dot-separated numeric segments")]
    InvalidVersion { tag: String },

    /// The configuration file is well-formed YAML but semantically invalid.
    #[error("Configuration parsing error: {message}{}", hint.as_ref().map(|h| format!("\n  hint: {}", h)).unwrap_or_default())]
    ConfigParse {
        message: String,
        /// Optional hint for how to fix the configuration issue
        hint: Option<String>,
    },

    /// Copying a file from the mirror into the target failed.
    #[error("Failed to copy {} to {}: {message}", src.display(), dst.display())]
    Copy {
        src: PathBuf,
        dst: PathBuf,
        message: String,
    },

    /// An I/O error, wrapped from `std::io::Error`.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A YAML parsing error, wrapped from `serde_yaml::Error`.
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// A convenient type alias for `Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
