//! Implementation of the `statectl manifest` commands.
//!
//! - `push`: upload the local manifest; the lock must be held
//! - `pull`: download the remote manifest into a local file
//! - `list`: show the objects stored next to the remote manifest

mod display;

#[cfg(test)]
mod tests;

use crate::cli::ManifestTargetArgs;
use crate::config::{self, Config};
use crate::error::{Error, Result};
use crate::fs::atomic_write;
use crate::locks::LockTarget;
use crate::manifest::{DEFAULT_PULL_FILE, DEFAULT_PUSH_FILE, ManifestSync, ManifestTarget};
use crate::store::{self, StateStore};
use colored::Colorize;
use std::path::{Path, PathBuf};

/// A resolved manifest target with sync operations over its store.
pub struct ManifestSession {
    pub manifest: ManifestTarget,
    pub lock: Option<LockTarget>,
    pub sync: ManifestSync<Box<dyn StateStore>>,
}

/// Resolve the manifest target from arguments and config file, then open
/// its store.
pub fn connect(args: &ManifestTargetArgs, config_path: Option<&Path>) -> Result<ManifestSession> {
    let cwd = std::env::current_dir()
        .map_err(|e| Error::Config(format!("failed to read working directory: {}", e)))?;
    let config = Config::discover(config_path, &cwd)?;
    let resolved = config::resolve_manifest(args, &config)?;
    let store = store::open(&resolved.backend)?;

    Ok(ManifestSession {
        manifest: resolved.manifest,
        lock: resolved.lock,
        sync: ManifestSync::new(store),
    })
}

pub fn cmd_push(session: &ManifestSession, file: Option<&Path>) -> Result<()> {
    let lock = session.lock.as_ref().ok_or_else(|| {
        Error::Config(
            "manifest push needs the lock key: pass --key, set LOCK_KEY_PATH, or add `key` to the config file"
                .to_string(),
        )
    })?;
    let path = file.map_or_else(|| PathBuf::from(DEFAULT_PUSH_FILE), Path::to_path_buf);

    let body = std::fs::read(&path)
        .map_err(|e| Error::Io(format!("failed to read '{}': {}", path.display(), e)))?;
    session.sync.push(&session.manifest, lock, &body)?;

    println!(
        "{} {} -> {}",
        "Manifest pushed:".green(),
        path.display(),
        session.manifest
    );
    Ok(())
}

pub fn cmd_pull(session: &ManifestSession, file: Option<&Path>) -> Result<()> {
    let path = file.map_or_else(|| PathBuf::from(DEFAULT_PULL_FILE), Path::to_path_buf);

    let body = session.sync.pull(&session.manifest)?;
    atomic_write(&path, &body)
        .map_err(|e| Error::Io(format!("failed to write '{}': {}", path.display(), e)))?;

    println!(
        "{} {} -> {}",
        "Manifest pulled:".green(),
        session.manifest,
        path.display()
    );
    Ok(())
}

pub fn cmd_list(session: &ManifestSession) -> Result<()> {
    let entries = session.sync.list(&session.manifest)?;
    display::print_listing(&session.manifest, &entries);
    Ok(())
}
