//! Sync of the state manifest the lock guards.
//!
//! The manifest is a JSON file (e.g. a dbt `manifest.json`) stored next to
//! the lock object. Pushing replaces the remote copy and is only allowed while
//! the lock is held; pulling and listing are read-only.


use crate::error::{Error, Result};
use crate::locks::{LockManager, LockTarget};
use crate::store::{ObjectEntry, StateStore, StoreError};
use std::fmt;
use tracing::{debug, info};

/// Remote manifest key when none is configured.
pub const DEFAULT_MANIFEST_KEY: &str = "manifest.json";

/// Local file uploaded by `manifest push` when none is given.
pub const DEFAULT_PUSH_FILE: &str = "target/manifest.json";

/// Local file written by `manifest pull` when none is given.
pub const DEFAULT_PULL_FILE: &str = "state/manifest.json";

/// The (bucket, key) pair addressing the remote manifest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ManifestTarget {
    pub bucket: String,
    pub key: String,
}

impl ManifestTarget {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }

    /// Directory-like prefix holding the manifest, empty at the bucket root.
    pub fn prefix(&self) -> &str {
        self.key.rsplit_once('/').map_or("", |(dir, _)| dir)
    }
}

impl fmt::Display for ManifestTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Push, pull and list operations over a state store.
#[derive(Debug)]
pub struct ManifestSync<S> {
    store: S,
}

impl<S: StateStore> ManifestSync<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Replace the remote manifest with `body`.
    ///
    /// `body` must be JSON and the lock at `lock` must be held. A corrupt
    /// lock record does not count as held.
    pub fn push(&self, target: &ManifestTarget, lock: &LockTarget, body: &[u8]) -> Result<()> {
        serde_json::from_slice::<serde_json::Value>(body)
            .map_err(|e| Error::InvalidManifest(e.to_string()))?;

        match LockManager::new(&self.store).check(lock)? {
            Some(record) => {
                debug!(%lock, lock_id = %record.lock_id, "lock held, pushing manifest");
            }
            None => {
                return Err(Error::LockRequired {
                    target: lock.clone(),
                });
            }
        }

        self.store.put(&target.bucket, &target.key, body)?;
        info!(%target, bytes = body.len(), "manifest pushed");
        Ok(())
    }

    /// Read the remote manifest.
    pub fn pull(&self, target: &ManifestTarget) -> Result<Vec<u8>> {
        match self.store.get(&target.bucket, &target.key) {
            Ok(body) => {
                info!(%target, bytes = body.len(), "manifest pulled");
                Ok(body)
            }
            Err(StoreError::NotFound) => Err(Error::ManifestNotFound {
                target: target.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Objects stored alongside the manifest, sorted by key.
    pub fn list(&self, target: &ManifestTarget) -> Result<Vec<ObjectEntry>> {
        debug!(%target, prefix = target.prefix(), "listing manifest directory");
        Ok(self.store.list(&target.bucket, target.prefix())?)
    }
}
