//! # Terminal Output
//!
//! Colour detection for the CLI and the [`ConsoleReporter`] that prints
//! progress events.
//!
//! ## Respecting User Preferences
//!
//! Colour is controlled by the following flags and environment variables:
//! - `--color=never|always|auto` - CLI flag for color control
//! - `NO_COLOR` - Disables colors when set (per https://no-color.org/)
//! - `CLICOLOR=0` - Disables colors
//! - `CLICOLOR_FORCE=1` - Forces colors even in non-TTY
//! - `TERM=dumb` - Disables colors for dumb terminals
//!
//! ## Progress format
//!
//! The first event a reporter prints is preceded by a banner line; every
//! event is then printed as an indented arrow line:
//!
//! ```text
//! [NotQuiteSubmodules]
//! 	=> Cloning repository git@github.com:org/deploy.git to /home/me/.cache/not-quite-submodules/3f2a9c01b
//! 	=> Currently checked out tag is (none), latest tag is 2.0.0
//! ```
//!
//! The banner flag belongs to the reporter instance, so two reporters print
//! two banners.

use std::env;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use console::style;

use crate::progress::{Progress, Reporter};

/// Banner printed before the first progress line.
pub const BANNER: &str = "[NotQuiteSubmodules]";

/// Output configuration for controlling colors.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Whether colors should be used in output.
    pub use_color: bool,
}

impl OutputConfig {
    /// Create an output configuration from environment and CLI flag.
    ///
    /// - `always`: force colors on (overrides NO_COLOR)
    /// - `never`: force colors off
    /// - anything else: detect from the environment and terminal
    pub fn from_env_and_flag(color_flag: &str) -> Self {
        let use_color = match color_flag.to_lowercase().as_str() {
            "always" => true,
            "never" => false,
            _ => Self::detect_color_support(),
        };

        Self { use_color }
    }

    fn detect_color_support() -> bool {
        // Presence of NO_COLOR (even empty) disables colors
        if env::var_os("NO_COLOR").is_some() {
            return false;
        }

        if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
            return false;
        }

        if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
            return true;
        }

        if env::var("TERM").is_ok_and(|v| v == "dumb") {
            return false;
        }

        console::Term::stdout().features().colors_supported()
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::from_env_and_flag("auto")
    }
}

/// Prints progress events in the `[NotQuiteSubmodules]` / `\t=> ...` format.
pub struct ConsoleReporter {
    out: Mutex<Box<dyn Write + Send>>,
    use_color: bool,
    banner_printed: AtomicBool,
}

impl ConsoleReporter {
    /// Reporter writing to stdout.
    pub fn stdout(config: &OutputConfig) -> Self {
        Self::with_writer(Box::new(io::stdout()), config)
    }

    pub fn with_writer(out: Box<dyn Write + Send>, config: &OutputConfig) -> Self {
        Self {
            out: Mutex::new(out),
            use_color: config.use_color,
            banner_printed: AtomicBool::new(false),
        }
    }

    fn format_event(&self, event: &Progress) -> String {
        let message = event.to_string();
        if !self.use_color {
            return message;
        }
        match event {
            Progress::MirrorInvalid { .. } => style(message).yellow().to_string(),
            Progress::Finished { .. } | Progress::UpToDate { .. } => {
                style(message).green().to_string()
            }
            _ => message,
        }
    }
}

impl Reporter for ConsoleReporter {
    fn report(&self, event: &Progress) {
        let line = self.format_event(event);
        let Ok(mut out) = self.out.lock() else {
            return;
        };

        // Progress output is best effort; a closed stdout must not abort a sync.
        if !self.banner_printed.swap(true, Ordering::SeqCst) {
            let banner = if self.use_color {
                style(BANNER).bold().to_string()
            } else {
                BANNER.to_string()
            };
            let _ = writeln!(out, "{}", banner);
        }
        let _ = writeln!(out, "\t=> {}", line);
        let _ = out.flush();
    }
}
