//! Directory-backed lock store.
//!
//! Each bucket is a directory under the store root and each key is a relative
//! path inside it. Objects are created with **create_new** semantics
//! (exclusive create), so only one process can create a given key even when
//! the root lives on a shared filesystem.

use super::{LockStore, ObjectEntry, StateStore, StoreError};
use crate::fs::{atomic_write, is_temp_name};
use chrono::{DateTime, Utc};
use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Component, Path, PathBuf};

/// Lock store rooted at a local or shared directory.
#[derive(Debug, Clone)]
pub struct FsLockStore {
    root: PathBuf,
}

impl FsLockStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    fn bucket_path(&self, bucket: &str) -> Result<PathBuf, StoreError> {
        let bucket_path = Path::new(bucket);
        if !is_plain_relative(bucket_path) || bucket_path.components().count() != 1 {
            return Err(StoreError::backend(
                "resolve",
                format!("invalid bucket name '{}'", bucket),
            ));
        }
        Ok(self.root.join(bucket_path))
    }

    /// Map `bucket/key` to a path, refusing anything that escapes the bucket.
    fn object_path(&self, bucket: &str, key: &str) -> Result<PathBuf, StoreError> {
        let bucket_path = self.bucket_path(bucket)?;

        let key_path = Path::new(key);
        if !is_plain_relative(key_path) {
            return Err(StoreError::backend(
                "resolve",
                format!("invalid key '{}': must be a relative path without '..'", key),
            ));
        }

        Ok(bucket_path.join(key_path))
    }
}

fn is_plain_relative(path: &Path) -> bool {
    let mut components = path.components().peekable();
    components.peek().is_some() && components.all(|c| matches!(c, Component::Normal(_)))
}

impl LockStore for FsLockStore {
    fn create_if_absent(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;

        if let Some(parent) = path.parent()
            && !parent.exists()
        {
            fs::create_dir_all(parent).map_err(|e| {
                StoreError::backend(
                    "create",
                    format!("failed to create directory '{}': {}", parent.display(), e),
                )
            })?;
        }

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .map_err(|e| {
                if e.kind() == ErrorKind::AlreadyExists {
                    StoreError::AlreadyExists
                } else {
                    StoreError::backend(
                        "create",
                        format!("failed to create '{}': {}", path.display(), e),
                    )
                }
            })?;

        // A half-written object would read back as a corrupt record, so the
        // file is removed if the body cannot be persisted.
        file.write_all(body).map_err(|e| {
            let _ = fs::remove_file(&path);
            StoreError::backend("create", format!("failed to write '{}': {}", path.display(), e))
        })?;

        file.sync_all().map_err(|e| {
            let _ = fs::remove_file(&path);
            StoreError::backend("create", format!("failed to sync '{}': {}", path.display(), e))
        })?;

        Ok(())
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let path = self.object_path(bucket, key)?;
        fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound,
            _ => StoreError::backend("get", format!("failed to read '{}': {}", path.display(), e)),
        })
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => StoreError::NotFound,
            _ => StoreError::backend(
                "delete",
                format!("failed to remove '{}': {}", path.display(), e),
            ),
        })
    }
}

impl StateStore for FsLockStore {
    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let path = self.object_path(bucket, key)?;
        atomic_write(&path, body).map_err(|e| {
            StoreError::backend("put", format!("failed to write '{}': {}", path.display(), e))
        })
    }

    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        let prefix = prefix.trim_matches('/');
        let dir = if prefix.is_empty() {
            self.bucket_path(bucket)?
        } else {
            self.object_path(bucket, prefix)?
        };

        let entries = match fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StoreError::backend(
                    "list",
                    format!("failed to read '{}': {}", dir.display(), e),
                ));
            }
        };

        let mut objects = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| StoreError::backend("list", e))?;
            let metadata = entry.metadata().map_err(|e| StoreError::backend("list", e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if !metadata.is_file() || is_temp_name(&name) {
                continue;
            }

            objects.push(ObjectEntry {
                key: if prefix.is_empty() {
                    name
                } else {
                    format!("{}/{}", prefix, name)
                },
                size: metadata.len(),
                last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            });
        }

        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }
}
