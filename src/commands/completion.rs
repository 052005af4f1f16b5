//! Implementation of the `statectl completion` command.

use crate::cli::{Cli, CompletionArgs};
use crate::error::Result;
use clap::CommandFactory;
use std::io;

/// Print a completion script for the requested shell to stdout.
pub fn cmd_completion(args: CompletionArgs) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(args.shell, &mut command, name, &mut io::stdout());
    Ok(())
}
