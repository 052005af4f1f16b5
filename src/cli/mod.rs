//! CLI argument parsing for statectl.
//!
//! Uses clap derive macros for declarative argument definitions.
//! This module defines the command structure; actual implementations
//! are in the `commands` module.

use crate::config::BackendKind;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

/// statectl: lock remotely stored state files across machines and CI jobs.
///
/// A lock is a single JSON object in a shared bucket. Acquire it before
/// modifying the state file and release it afterwards; concurrent acquirers
/// see the lock as already held.
#[derive(Parser, Debug)]
#[command(name = "statectl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file (default: ./.statectl.yaml when present).
    #[arg(short, long, global = true, env = "STATECTL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands for statectl.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Lock management commands.
    ///
    /// Acquire, inspect, release or force-release the state lock.
    Lock(LockCommand),

    /// State manifest commands.
    ///
    /// Push the local manifest while holding the lock, pull the remote one
    /// for comparison, or list what is stored next to it.
    Manifest(ManifestCommand),

    /// Print a shell completion script.
    Completion(CompletionArgs),
}

/// Lock subcommands.
#[derive(Parser, Debug)]
pub struct LockCommand {
    #[command(subcommand)]
    pub action: LockAction,
}

/// Available lock actions.
#[derive(Subcommand, Debug)]
pub enum LockAction {
    /// Acquire the lock.
    ///
    /// Creates the lock object if no lock exists. If the lock is already
    /// held, reports it and exits successfully without touching it.
    Acquire(TargetArgs),

    /// Show whether the lock is held and by whom.
    Status(TargetArgs),

    /// Release the lock.
    ///
    /// Fails if there is no lock to release.
    Release(TargetArgs),

    /// Forcefully remove the lock, whoever holds it.
    ///
    /// Asks for confirmation first. This can disrupt an ongoing operation.
    ForceRelease(ForceReleaseArgs),
}

/// Manifest subcommands.
#[derive(Parser, Debug)]
pub struct ManifestCommand {
    #[command(subcommand)]
    pub action: ManifestAction,
}

/// Available manifest actions.
#[derive(Subcommand, Debug)]
pub enum ManifestAction {
    /// Upload the local manifest (default: target/manifest.json).
    ///
    /// Requires the lock to be held.
    Push(ManifestFileArgs),

    /// Download the remote manifest (default: state/manifest.json).
    Pull(ManifestFileArgs),

    /// List objects stored next to the remote manifest.
    List(ManifestTargetArgs),
}

/// Where the lock object lives.
#[derive(Args, Debug, Clone, Default)]
pub struct TargetArgs {
    /// Bucket storing the lock object.
    #[arg(short, long, env = "BUCKET_NAME")]
    pub bucket: Option<String>,

    /// Key of the lock object.
    #[arg(short, long, env = "LOCK_KEY_PATH")]
    pub key: Option<String>,

    /// Storage backend.
    #[arg(long, env = "STATECTL_BACKEND", value_enum)]
    pub backend: Option<BackendKind>,

    /// Root directory for the fs backend.
    #[arg(long, env = "STATECTL_FS_ROOT")]
    pub root: Option<PathBuf>,

    /// AWS region for the s3 backend.
    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Endpoint URL for S3-compatible services.
    #[arg(long, env = "AWS_ENDPOINT_URL")]
    pub endpoint: Option<String>,
}

/// Where the manifest lives.
#[derive(Args, Debug, Clone, Default)]
pub struct ManifestTargetArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Key of the manifest object (default: manifest.json).
    #[arg(short, long, env = "MANIFEST_KEY_PATH")]
    pub manifest_key: Option<String>,
}

/// Arguments for `manifest push` and `manifest pull`.
#[derive(Args, Debug, Clone, Default)]
pub struct ManifestFileArgs {
    #[command(flatten)]
    pub manifest: ManifestTargetArgs,

    /// Local manifest file.
    #[arg(short, long)]
    pub file: Option<PathBuf>,
}

/// Arguments for the `lock force-release` command.
#[derive(Args, Debug, Clone)]
pub struct ForceReleaseArgs {
    #[command(flatten)]
    pub target: TargetArgs,

    /// Skip the interactive confirmation.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the `completion` command.
#[derive(Args, Debug, Clone)]
pub struct CompletionArgs {
    /// Shell to generate completions for.
    #[arg(value_enum)]
    pub shell: Shell,
}

impl Cli {
    /// Parse command line arguments.
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
