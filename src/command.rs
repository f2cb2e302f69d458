//! # Command Runner
//!
//! Executes external command strings through the platform shell and captures
//! their combined stdout/stderr.
//!
//! The working directory is a parameter of every call and is applied to the
//! child process only (`Command::current_dir`). The runner never changes the
//! process-wide current directory, so independent runners (or threads) cannot
//! observe each other's directory state.
//!
//! There is no timeout: a hung child process blocks the caller until it exits.

use std::path::Path;
use std::process::Command;

use log::debug;

use crate::error::{Error, Result};

/// Runs an external command in a given directory.
///
/// Implemented by [`ShellCommandRunner`] for real use and by recording mocks in
/// tests.
pub trait CommandRunner: Send + Sync {
    /// Run `command` with `working_dir` as the child's current directory.
    ///
    /// Returns the captured combined output on success. A non-zero exit status
    /// yields [`Error::CommandExecution`] carrying the command string and the
    /// output captured so far.
    fn run(&self, command: &str, working_dir: &Path) -> Result<String>;
}

/// Runs commands through `sh -c` (or `cmd /C` on Windows).
///
/// Stderr is merged into stdout inside the shell so the captured output keeps
/// the original interleaving.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShellCommandRunner;

impl ShellCommandRunner {
    pub fn new() -> Self {
        Self
    }

    #[cfg(not(windows))]
    fn build(command: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(format!("exec 2>&1\n{}", command));
        cmd
    }

    #[cfg(windows)]
    fn build(command: &str) -> Command {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(format!("{} 2>&1", command));
        cmd
    }
}

impl CommandRunner for ShellCommandRunner {
    fn run(&self, command: &str, working_dir: &Path) -> Result<String> {
        debug!("Running '{}' in {}", command, working_dir.display());

        let output = Self::build(command)
            .current_dir(working_dir)
            .output()
            .map_err(|e| Error::CommandSpawn {
                command: command.to_string(),
                message: e.to_string(),
            })?;

        // stderr is normally empty because of the redirect, but keep anything
        // the shell itself wrote there.
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));

        if !output.status.success() {
            return Err(Error::CommandExecution {
                command: command.to_string(),
                output: combined,
            });
        }

        Ok(combined)
    }
}

/// Quote a single argument for inclusion in a shell command string.
///
/// Arguments made only of characters the shell treats literally are returned
/// unchanged; everything else is wrapped in single quotes.
pub fn quote(arg: &str) -> String {
    let is_plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:@%+=,".contains(c));

    if is_plain {
        return arg.to_string();
    }

    if cfg!(windows) {
        format!("\"{}\"", arg.replace('"', "\"\""))
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
