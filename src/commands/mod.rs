//! # CLI Command Implementations
//!
//! Each subcommand of `not-quite-submodules` lives in its own file with:
//! - an `Args` struct that defines the command-specific arguments and options,
//!   derived using `clap`;
//! - an `execute` function that takes the parsed `Args` and calls into the
//!   `not_quite_submodules` library.
//!
//! [`resolve_configs`] is shared by the commands that accept either
//! `--remote`/`--target` flags or a configuration file.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::{Path, PathBuf};
use std::time::Duration;

use not_quite_submodules::config::{self, SyncConfig};
use not_quite_submodules::defaults::{CONFIG_FILE, DEFAULT_UPDATE_INTERVAL_SECS};

pub mod clean;
pub mod completions;
pub mod status;
pub mod sync;

/// Where to sync from and to. Shared by `sync` and `status`.
#[derive(Args, Debug, Clone)]
pub struct SourceArgs {
    /// Remote repository to follow (anything `git clone` accepts)
    #[arg(short, long, value_name = "URL", env = "NQS_REMOTE", requires = "target")]
    pub remote: Option<String>,

    /// Directory receiving the files of the selected tag
    #[arg(short, long, value_name = "DIR", env = "NQS_TARGET", requires = "remote")]
    pub target: Option<PathBuf>,

    /// Location of the local mirror (defaults to a per-remote cache directory)
    #[arg(long, value_name = "DIR", env = "NQS_MIRROR")]
    pub mirror: Option<PathBuf>,

    /// Seconds before the mirror is refreshed from the remote
    #[arg(long, value_name = "SECS", default_value_t = DEFAULT_UPDATE_INTERVAL_SECS)]
    pub update_interval: u64,

    /// Materialize this tag instead of the latest one
    #[arg(long = "version", value_name = "TAG")]
    pub pinned_version: Option<String>,

    /// Primary branch of the remote (defaults to the remote's HEAD)
    #[arg(long, value_name = "NAME")]
    pub branch: Option<String>,

    /// Configuration file listing several synchronisations
    #[arg(
        short,
        long,
        value_name = "FILE",
        conflicts_with_all = ["remote", "target"]
    )]
    pub config: Option<PathBuf>,
}

/// Build the list of synchronisations from flags or a configuration file.
///
/// Without `--remote`/`--target` and `--config`, `.not-quite-submodules.yaml`
/// in the current directory is used if it exists.
pub fn resolve_configs(args: &SourceArgs) -> Result<Vec<SyncConfig>> {
    if let (Some(remote), Some(target)) = (&args.remote, &args.target) {
        let mut entry = SyncConfig::new(remote.clone(), target.clone())
            .with_update_interval(Duration::from_secs(args.update_interval));
        if let Some(mirror) = &args.mirror {
            entry = entry.with_mirror(mirror.clone());
        }
        if let Some(version) = &args.pinned_version {
            entry = entry.with_version(version.clone());
        }
        if let Some(branch) = &args.branch {
            entry = entry.with_branch(branch.clone());
        }
        entry.validate()?;
        return Ok(vec![entry]);
    }

    let path = match &args.config {
        Some(path) => path.clone(),
        None => {
            let default = Path::new(CONFIG_FILE);
            if !default.exists() {
                bail!(
                    "Nothing to sync: pass --remote and --target, or create {}",
                    CONFIG_FILE
                );
            }
            default.to_path_buf()
        }
    };

    if !path.exists() {
        bail!("Configuration file not found: {}", path.display());
    }

    let entries = config::from_file(&path)
        .with_context(|| format!("Failed to load config from {}", path.display()))?;
    if entries.is_empty() {
        bail!("Configuration file {} has no entries", path.display());
    }
    Ok(entries)
}
