//! statectl: distributed lock and sync for remotely stored state files.
//!
//! This is the main entry point for the `statectl` CLI. It parses arguments,
//! sets up logging, dispatches to the appropriate command handler, and
//! handles errors with proper exit codes.

mod cli;
mod commands;
pub mod config;
pub mod confirm;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod git;
pub mod locks;
pub mod logging;
pub mod manifest;
pub mod store;

#[cfg(test)]
mod test_support;

use cli::Cli;
use colored::Colorize;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();
    logging::init(cli.verbose);

    match commands::dispatch(cli) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            // Print user-actionable error message to stderr
            eprintln!("{} {}", "Error:".red().bold(), err);

            ExitCode::from(err.exit_code() as u8)
        }
    }
}
