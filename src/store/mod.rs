//! Object store adapter for the lock protocol.
//!
//! The lock protocol needs exactly three primitives from a backing store:
//! - `create_if_absent`: atomic create that fails if an object is present
//! - `get`: read the current object body
//! - `delete`: remove the object, reporting absence as `NotFound`
//!
//! Manifest sync needs two more, overwrite and listing, provided by
//! [`StateStore`].
//!
//! Two backends implement both traits:
//! - [`ObjectLockStore`] over any `object_store` backend (S3 in production,
//!   `PutMode::Create` provides the conditional create)
//! - [`FsLockStore`] over a local or shared directory tree, using
//!   **create_new** semantics for the conditional create
//!
//! Every store call is blocking; async backends drive their own runtime.

mod fs;
mod object;

pub use fs::FsLockStore;
pub use object::ObjectLockStore;

use crate::config::{BackendConfig, BackendKind};
use chrono::{DateTime, Utc};
use std::fmt::Display;
use thiserror::Error;

/// Failure reported by a [`LockStore`].
#[derive(Error, Debug)]
pub enum StoreError {
    /// `create_if_absent` found an existing object.
    #[error("object already exists")]
    AlreadyExists,

    /// No object exists at the requested key.
    #[error("object not found")]
    NotFound,

    /// Any other failure from the backing service.
    #[error("store {operation} failed: {message}")]
    Backend {
        operation: &'static str,
        message: String,
    },
}

impl StoreError {
    pub(crate) fn backend(operation: &'static str, err: impl Display) -> Self {
        StoreError::Backend {
            operation,
            message: err.to_string(),
        }
    }
}

/// Minimal capability interface the lock protocol is built on.
pub trait LockStore: Send + Sync {
    /// Atomically create the object only if nothing exists at `bucket/key`.
    fn create_if_absent(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError>;

    /// Read the object body.
    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError>;

    /// Remove the object. Absence is reported as [`StoreError::NotFound`].
    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError>;

    /// Remove the object without first establishing that it exists.
    ///
    /// Absence is success. Backends whose delete needs an extra request to
    /// detect absence override this to skip it.
    fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        match self.delete(bucket, key) {
            Err(StoreError::NotFound) => Ok(()),
            other => other,
        }
    }
}

/// One object found by [`StateStore::list`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Key relative to the bucket.
    pub key: String,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Store operations used to sync the state file itself.
pub trait StateStore: LockStore {
    /// Write the object, replacing any existing body.
    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError>;

    /// Objects directly under `prefix` (a directory-like key, may be empty).
    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError>;
}

impl<T: LockStore + ?Sized> LockStore for Box<T> {
    fn create_if_absent(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        (**self).create_if_absent(bucket, key, body)
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(bucket, key)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(bucket, key)
    }

    fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        (**self).remove(bucket, key)
    }
}

impl<T: StateStore + ?Sized> StateStore for Box<T> {
    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        (**self).put(bucket, key, body)
    }

    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        (**self).list(bucket, prefix)
    }
}

impl<T: LockStore + ?Sized> LockStore for &T {
    fn create_if_absent(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        (**self).create_if_absent(bucket, key, body)
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        (**self).get(bucket, key)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        (**self).delete(bucket, key)
    }

    fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        (**self).remove(bucket, key)
    }
}

impl<T: StateStore + ?Sized> StateStore for &T {
    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        (**self).put(bucket, key, body)
    }

    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        (**self).list(bucket, prefix)
    }
}

/// Open the store described by a resolved backend configuration.
pub fn open(backend: &BackendConfig) -> Result<Box<dyn StateStore>, StoreError> {
    tracing::debug!(backend = ?backend.kind, "opening lock store");
    match backend.kind {
        BackendKind::S3 => Ok(Box::new(ObjectLockStore::s3(
            backend.region.as_deref(),
            backend.endpoint.as_deref(),
        )?)),
        BackendKind::Fs => Ok(Box::new(FsLockStore::new(&backend.root))),
    }
}
