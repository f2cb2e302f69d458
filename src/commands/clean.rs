//! # Clean Command Implementation
//!
//! Deletes the local mirror of a remote. The next `sync` clones it again.
//! Target directories are never touched.

use anyhow::{bail, Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use not_quite_submodules::defaults::default_mirror_path;

/// Delete the local mirror of a remote
#[derive(Args, Debug)]
pub struct CleanArgs {
    /// Remote whose mirror should be deleted
    #[arg(
        short,
        long,
        value_name = "URL",
        env = "NQS_REMOTE",
        required_unless_present = "mirror"
    )]
    pub remote: Option<String>,

    /// Mirror directory to delete (overrides the path derived from --remote)
    #[arg(long, value_name = "DIR", env = "NQS_MIRROR")]
    pub mirror: Option<PathBuf>,

    /// Show what would be deleted without deleting it
    #[arg(long)]
    pub dry_run: bool,
}

/// Execute the `clean` command.
pub fn execute(args: CleanArgs) -> Result<()> {
    let path = match (&args.mirror, &args.remote) {
        (Some(mirror), _) => mirror.clone(),
        (None, Some(remote)) => default_mirror_path(remote),
        (None, None) => bail!("Pass --remote or --mirror"),
    };

    if !path.exists() {
        println!("No mirror at {}", path.display());
        return Ok(());
    }

    if args.dry_run {
        println!("Would delete {}", path.display());
        return Ok(());
    }

    if path.is_dir() {
        fs::remove_dir_all(&path)
    } else {
        fs::remove_file(&path)
    }
    .with_context(|| format!("Failed to delete {}", path.display()))?;
    println!("Deleted {}", path.display());
    Ok(())
}
