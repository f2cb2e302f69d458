//! # Sync Command Implementation
//!
//! Runs the synchronisation engine for one `--remote`/`--target` pair or for
//! every entry of a configuration file, in order. The first failing entry
//! aborts the command.
//!
//! The force flag is set by `--force` or by the `FORCE_UPDATE` environment
//! variable.

use anyhow::{Context, Result};
use clap::Args;
use std::sync::Arc;

use not_quite_submodules::config::force_from_env;
use not_quite_submodules::output::{ConsoleReporter, OutputConfig};
use not_quite_submodules::progress::{Reporter, SilentReporter};
use not_quite_submodules::sync::SyncEngine;

use super::{resolve_configs, SourceArgs};

/// Sync target directories to the latest tag of their remote
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Refresh the mirror and re-copy files even if already up to date
    #[arg(short, long)]
    pub force: bool,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,
}

/// Execute the `sync` command.
pub fn execute(args: SyncArgs, color: &str) -> Result<()> {
    let configs = resolve_configs(&args.source)?;
    let force = args.force || force_from_env();

    let reporter: Arc<dyn Reporter> = if args.quiet {
        Arc::new(SilentReporter)
    } else {
        let output = OutputConfig::from_env_and_flag(color);
        Arc::new(ConsoleReporter::stdout(&output))
    };
    let engine = SyncEngine::with_reporter(reporter);

    for config in &configs {
        engine.run(config, force).with_context(|| {
            format!(
                "Failed to sync {} from {}",
                config.target.display(),
                config.remote
            )
        })?;
    }

    Ok(())
}
