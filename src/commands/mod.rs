//! Command implementations for statectl.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations.

mod completion;
mod lock;
mod manifest;

use crate::cli::{Cli, Command, LockAction, LockCommand, ManifestAction, ManifestCommand};
use crate::error::Result;
use std::path::Path;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Lock(lock_cmd) => dispatch_lock(lock_cmd, cli.config.as_deref()),
        Command::Manifest(manifest_cmd) => dispatch_manifest(manifest_cmd, cli.config.as_deref()),
        Command::Completion(args) => completion::cmd_completion(args),
    }
}

/// Dispatch lock subcommands.
fn dispatch_lock(lock_cmd: LockCommand, config_path: Option<&Path>) -> Result<()> {
    match lock_cmd.action {
        LockAction::Acquire(args) => lock::cmd_acquire(&lock::connect(&args, config_path)?),
        LockAction::Status(args) => lock::cmd_status(&lock::connect(&args, config_path)?),
        LockAction::Release(args) => lock::cmd_release(&lock::connect(&args, config_path)?),
        LockAction::ForceRelease(args) => {
            lock::cmd_force_release(&lock::connect(&args.target, config_path)?, args.yes)
        }
    }
}

/// Dispatch manifest subcommands.
fn dispatch_manifest(manifest_cmd: ManifestCommand, config_path: Option<&Path>) -> Result<()> {
    match manifest_cmd.action {
        ManifestAction::Push(args) => manifest::cmd_push(
            &manifest::connect(&args.manifest, config_path)?,
            args.file.as_deref(),
        ),
        ManifestAction::Pull(args) => manifest::cmd_pull(
            &manifest::connect(&args.manifest, config_path)?,
            args.file.as_deref(),
        ),
        ManifestAction::List(args) => manifest::cmd_list(&manifest::connect(&args, config_path)?),
    }
}
