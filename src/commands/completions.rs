//! # Completions Command Implementation
//!
//! Prints a shell completion script generated by `clap_complete` for every
//! `not-quite-submodules` command and option.
//!
//! ```bash
//! not-quite-submodules completions bash > ~/.local/share/bash-completion/completions/not-quite-submodules
//! not-quite-submodules completions zsh > ~/.zfunc/_not-quite-submodules
//! not-quite-submodules completions fish > ~/.config/fish/completions/not-quite-submodules.fish
//! ```

use anyhow::Result;
use clap::{Args, CommandFactory};
use clap_complete::{generate, Shell};
use std::io;

use crate::cli::Cli;

/// Generate shell completion scripts
#[derive(Args, Debug)]
pub struct CompletionsArgs {
    /// The shell to generate completions for (bash, zsh, fish, powershell, elvish)
    #[arg(value_enum)]
    pub shell: Shell,
}

/// Execute the `completions` command.
pub fn execute(args: CompletionsArgs) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(args.shell, &mut cmd, name, &mut io::stdout());
    Ok(())
}
