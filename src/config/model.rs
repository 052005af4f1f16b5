//! Config data model.

use clap::ValueEnum;
use serde::Deserialize;
use std::path::PathBuf;

/// File name looked up in the working directory when no config path is given.
pub const DEFAULT_CONFIG_FILE: &str = ".statectl.yaml";

/// Root directory of the `fs` backend when none is configured.
pub const DEFAULT_FS_ROOT: &str = ".statectl";

/// Storage backend holding lock objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Amazon S3 or an S3-compatible service (default).
    #[default]
    S3,
    /// A local or shared directory; buckets are subdirectories.
    Fs,
}

/// Contents of the YAML config file.
///
/// Every field is optional; unknown fields are ignored for forward
/// compatibility.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Bucket holding the lock object.
    pub bucket: Option<String>,

    /// Key of the lock object inside the bucket.
    pub key: Option<String>,

    /// Key of the state manifest inside the bucket.
    pub manifest_key: Option<String>,

    /// Storage backend.
    pub backend: Option<BackendKind>,

    /// Root directory for the `fs` backend.
    pub root: Option<PathBuf>,

    /// AWS region for the `s3` backend.
    pub region: Option<String>,

    /// Custom endpoint for S3-compatible services.
    pub endpoint: Option<String>,
}
