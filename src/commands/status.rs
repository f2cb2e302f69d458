//! # Status Command Implementation
//!
//! Shows, for each synchronisation, the version recorded in the target, the
//! state of the mirror and the latest tag the mirror knows about.
//!
//! This command is read-only: it never fetches, clones or writes. The latest
//! tag is therefore only as recent as the last refresh.

use anyhow::Result;
use clap::Args;
use std::time::SystemTime;

use not_quite_submodules::sync::{SyncEngine, SyncStatus};

use super::{resolve_configs, SourceArgs};

/// Show applied and available versions without touching anything
#[derive(Args, Debug)]
pub struct StatusArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// Execute the `status` command.
pub fn execute(args: StatusArgs) -> Result<()> {
    let engine = SyncEngine::new();

    for config in resolve_configs(&args.source)? {
        let status = engine.status(&config)?;
        print!("{}", format_status(&config.remote, &status, SystemTime::now()));
    }

    Ok(())
}

fn format_status(remote: &str, status: &SyncStatus, now: SystemTime) -> String {
    let mut out = String::new();
    out.push_str(&format!("{}\n", remote));
    out.push_str(&format!("  target:  {}\n", status.target.display()));
    out.push_str(&format!(
        "  applied: {}\n",
        status
            .current
            .as_ref()
            .map(|v| v.to_string())
            .unwrap_or_else(|| "(none)".to_string())
    ));

    let mirror_state = if !status.mirror_present {
        "not cloned".to_string()
    } else {
        match status
            .last_refreshed
            .and_then(|t| now.duration_since(t).ok())
        {
            Some(age) => format!("refreshed {} ago", format_age(age.as_secs())),
            None => "present".to_string(),
        }
    };
    out.push_str(&format!(
        "  mirror:  {} ({})\n",
        status.mirror.display(),
        mirror_state
    ));

    if let Some(latest) = &status.latest {
        let note = if status.update_available() {
            " (update available)"
        } else {
            ""
        };
        out.push_str(&format!("  latest:  {}{}\n", latest, note));
    }
    out
}

fn format_age(secs: u64) -> String {
    match secs {
        0..=59 => format!("{}s", secs),
        60..=3599 => format!("{}m", secs / 60),
        3600..=86_399 => format!("{}h", secs / 3600),
        _ => format!("{}d", secs / 86_400),
    }
}
