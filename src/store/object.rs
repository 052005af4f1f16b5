//! Lock store over the `object_store` crate.
//!
//! Conditional create maps to `PutMode::Create`, which S3 implements with an
//! `If-None-Match: *` header. The store owns a current-thread tokio runtime so
//! the [`LockStore`] surface stays blocking.

use super::{LockStore, ObjectEntry, StateStore, StoreError};
use object_store::aws::{AmazonS3Builder, S3ConditionalPut};
use object_store::path::Path;
use object_store::{ObjectStore, PutMode, PutOptions, PutPayload};
use std::sync::Arc;
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

/// How object paths and clients are derived from a bucket name.
enum Provider {
    /// One S3 client per bucket, credentials from the AWS environment.
    S3 {
        region: Option<String>,
        endpoint: Option<String>,
    },
    /// A single store shared by all buckets; the bucket becomes a path prefix.
    Shared(Arc<dyn ObjectStore>),
}

/// Lock store backed by an `object_store` implementation.
pub struct ObjectLockStore {
    runtime: Runtime,
    provider: Provider,
}

impl ObjectLockStore {
    /// Store talking to Amazon S3 (or an S3-compatible endpoint).
    pub fn s3(region: Option<&str>, endpoint: Option<&str>) -> Result<Self, StoreError> {
        Ok(Self {
            runtime: build_runtime()?,
            provider: Provider::S3 {
                region: region.map(str::to_string),
                endpoint: endpoint.map(str::to_string),
            },
        })
    }

    /// Store sharing one `ObjectStore` across buckets, addressed as `bucket/key`.
    pub fn shared(store: Arc<dyn ObjectStore>) -> Result<Self, StoreError> {
        Ok(Self {
            runtime: build_runtime()?,
            provider: Provider::Shared(store),
        })
    }

    /// Client for `bucket` and the path prefix its keys live under.
    fn client(&self, bucket: &str) -> Result<(Arc<dyn ObjectStore>, String), StoreError> {
        if bucket.trim().is_empty() {
            return Err(StoreError::backend("resolve", "bucket must not be empty"));
        }

        match &self.provider {
            Provider::S3 { region, endpoint } => {
                let mut builder = AmazonS3Builder::from_env()
                    .with_bucket_name(bucket)
                    .with_conditional_put(S3ConditionalPut::ETagMatch);
                if let Some(region) = region {
                    builder = builder.with_region(region);
                }
                if let Some(endpoint) = endpoint {
                    builder = builder
                        .with_endpoint(endpoint)
                        .with_allow_http(endpoint.starts_with("http://"));
                }
                let client = builder
                    .build()
                    .map_err(|e| StoreError::backend("connect", e))?;
                Ok((Arc::new(client), String::new()))
            }
            Provider::Shared(store) => Ok((Arc::clone(store), format!("{bucket}/"))),
        }
    }

    fn resolve(&self, bucket: &str, key: &str) -> Result<(Arc<dyn ObjectStore>, Path), StoreError> {
        if key.trim().is_empty() {
            return Err(StoreError::backend("resolve", "key must not be empty"));
        }
        let (store, base) = self.client(bucket)?;
        Ok((store, Path::from(format!("{base}{key}"))))
    }
}

fn build_runtime() -> Result<Runtime, StoreError> {
    Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| StoreError::backend("runtime", e))
}

impl LockStore for ObjectLockStore {
    fn create_if_absent(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let (store, path) = self.resolve(bucket, key)?;
        debug!(%path, "conditional put");

        let payload = PutPayload::from(body.to_vec());
        let result = self.runtime.block_on(store.put_opts(
            &path,
            payload,
            PutOptions::from(PutMode::Create),
        ));

        match result {
            Ok(_) => Ok(()),
            Err(object_store::Error::AlreadyExists { .. })
            | Err(object_store::Error::Precondition { .. }) => Err(StoreError::AlreadyExists),
            Err(e) => Err(StoreError::backend("create", e)),
        }
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        let (store, path) = self.resolve(bucket, key)?;
        debug!(%path, "get");

        let result = self.runtime.block_on(async {
            let object = store.get(&path).await?;
            object.bytes().await
        });

        match result {
            Ok(bytes) => Ok(bytes.to_vec()),
            Err(object_store::Error::NotFound { .. }) => Err(StoreError::NotFound),
            Err(e) => Err(StoreError::backend("get", e)),
        }
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let (store, path) = self.resolve(bucket, key)?;
        debug!(%path, "delete");

        // S3 deletes are idempotent, so absence has to be observed with a head.
        let result = self.runtime.block_on(async {
            store.head(&path).await?;
            store.delete(&path).await
        });

        match result {
            Ok(()) => Ok(()),
            Err(object_store::Error::NotFound { .. }) => Err(StoreError::NotFound),
            Err(e) => Err(StoreError::backend("delete", e)),
        }
    }

    fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        let (store, path) = self.resolve(bucket, key)?;
        debug!(%path, "remove");

        match self.runtime.block_on(store.delete(&path)) {
            Ok(()) | Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(StoreError::backend("delete", e)),
        }
    }
}

impl StateStore for ObjectLockStore {
    fn put(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        let (store, path) = self.resolve(bucket, key)?;
        debug!(%path, "put");

        self.runtime
            .block_on(store.put(&path, PutPayload::from(body.to_vec())))
            .map(|_| ())
            .map_err(|e| StoreError::backend("put", e))
    }

    fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectEntry>, StoreError> {
        let (store, base) = self.client(bucket)?;
        let prefix = prefix.trim_matches('/');
        let location = format!("{base}{prefix}");
        let location = (!location.is_empty()).then(|| Path::from(location));
        debug!(?location, "list");

        let listing = self
            .runtime
            .block_on(store.list_with_delimiter(location.as_ref()))
            .map_err(|e| StoreError::backend("list", e))?;

        let mut objects: Vec<ObjectEntry> = listing
            .objects
            .into_iter()
            .map(|meta| ObjectEntry {
                key: meta
                    .location
                    .as_ref()
                    .strip_prefix(base.as_str())
                    .unwrap_or(meta.location.as_ref())
                    .to_string(),
                size: meta.size as u64,
                last_modified: Some(meta.last_modified),
            })
            .collect();
        objects.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(objects)
    }
}
