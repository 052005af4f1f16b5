//! Merge command-line values with the config file into lock and manifest
//! targets.

use super::model::{BackendKind, Config, DEFAULT_FS_ROOT};
use crate::cli::{ManifestTargetArgs, TargetArgs};
use crate::error::{Error, Result};
use crate::locks::LockTarget;
use crate::manifest::{DEFAULT_MANIFEST_KEY, ManifestTarget};
use std::path::PathBuf;
use tracing::debug;

/// Storage backend settings after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub kind: BackendKind,
    /// Root directory, used by the `fs` backend.
    pub root: PathBuf,
    /// AWS region override, used by the `s3` backend.
    pub region: Option<String>,
    /// Custom endpoint, used by the `s3` backend.
    pub endpoint: Option<String>,
}

/// Everything a lock command needs to reach the lock object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub target: LockTarget,
    pub backend: BackendConfig,
}

/// Everything a manifest command needs.
///
/// The lock is optional here: only push requires it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedManifest {
    pub manifest: ManifestTarget,
    pub lock: Option<LockTarget>,
    pub backend: BackendConfig,
}

/// Resolve the lock target: flag or environment first, then config file.
///
/// Bucket and key have no defaults. Blank values count as unset, so an empty
/// `BUCKET_NAME` falls through to the config file.
pub fn resolve(args: &TargetArgs, config: &Config) -> Result<ResolvedTarget> {
    let bucket = resolve_bucket(args, config)?;
    let key = lock_key(args, config).ok_or_else(|| {
        Error::Config(
            "no lock key configured: pass --key, set LOCK_KEY_PATH, or add `key` to the config file"
                .to_string(),
        )
    })?;

    let resolved = ResolvedTarget {
        target: LockTarget::new(bucket, key),
        backend: resolve_backend(args, config),
    };
    debug!(target = %resolved.target, backend = ?resolved.backend.kind, "resolved lock target");
    Ok(resolved)
}

/// Resolve the manifest target. The manifest key defaults to
/// `manifest.json`; the lock key is kept when one is configured.
pub fn resolve_manifest(args: &ManifestTargetArgs, config: &Config) -> Result<ResolvedManifest> {
    let bucket = resolve_bucket(&args.target, config)?;
    let manifest_key = pick(args.manifest_key.as_deref(), config.manifest_key.as_deref())
        .unwrap_or_else(|| DEFAULT_MANIFEST_KEY.to_string());

    let resolved = ResolvedManifest {
        manifest: ManifestTarget::new(bucket.clone(), manifest_key),
        lock: lock_key(&args.target, config).map(|key| LockTarget::new(bucket, key)),
        backend: resolve_backend(&args.target, config),
    };
    debug!(manifest = %resolved.manifest, lock = ?resolved.lock, "resolved manifest target");
    Ok(resolved)
}

fn resolve_bucket(args: &TargetArgs, config: &Config) -> Result<String> {
    pick(args.bucket.as_deref(), config.bucket.as_deref()).ok_or_else(|| {
        Error::Config(
            "no bucket configured: pass --bucket, set BUCKET_NAME, or add `bucket` to the config file"
                .to_string(),
        )
    })
}

fn lock_key(args: &TargetArgs, config: &Config) -> Option<String> {
    pick(args.key.as_deref(), config.key.as_deref())
}

fn resolve_backend(args: &TargetArgs, config: &Config) -> BackendConfig {
    BackendConfig {
        kind: args.backend.or(config.backend).unwrap_or_default(),
        root: args
            .root
            .clone()
            .filter(|root| !root.as_os_str().is_empty())
            .or_else(|| config.root.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_FS_ROOT)),
        region: pick(args.region.as_deref(), config.region.as_deref()),
        endpoint: pick(args.endpoint.as_deref(), config.endpoint.as_deref()),
    }
}

fn pick(primary: Option<&str>, fallback: Option<&str>) -> Option<String> {
    [primary, fallback]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}
