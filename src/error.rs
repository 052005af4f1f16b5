//! Error types for statectl.
//!
//! Uses thiserror for derive macros. The lock protocol classifies every
//! failure into one of these variants and never recovers locally; the CLI
//! layer decides how each one is rendered and which exit code it maps to.

use crate::exit_codes;
use crate::locks::LockTarget;
use crate::manifest::ManifestTarget;
use crate::store::StoreError;
use thiserror::Error;

/// Main error type for statectl operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Acquire found an existing lock object. Callers treat this as benign.
    #[error("lock already held at {target}")]
    AlreadyLocked { target: LockTarget },

    /// Release or force-release found nothing to remove.
    #[error("lock does not exist at {target}, nothing to release")]
    NotLocked { target: LockTarget },

    /// An object exists at the lock key but is not a valid lock record.
    #[error("corrupt lock record at {target}: {reason}")]
    CorruptRecord { target: LockTarget, reason: String },

    /// Manifest push attempted without holding the lock.
    #[error("lock at {target} is not held; acquire it before pushing the manifest")]
    LockRequired { target: LockTarget },

    /// No manifest exists at the remote key.
    #[error("no manifest found at {target}")]
    ManifestNotFound { target: ManifestTarget },

    /// The manifest to push is not valid JSON.
    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    /// Reading or writing a local file failed.
    #[error("{0}")]
    Io(String),

    /// The backing store failed (network, permissions, service error).
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Missing or invalid configuration (bucket, key, backend, config file).
    #[error("{0}")]
    Config(String),

    /// Reading the operator's confirmation failed.
    #[error("failed to read confirmation: {0}")]
    Prompt(String),

    /// A lock record could not be serialized.
    #[error("failed to serialize lock record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Git operation failed.
    #[error("{0}")]
    Git(String),
}

impl Error {
    /// Returns the process exit code for this error.
    ///
    /// `AlreadyLocked` is the only non-fatal outcome: acquiring a lock that is
    /// already present exits successfully.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::AlreadyLocked { .. } => exit_codes::SUCCESS,
            Error::NotLocked { .. }
            | Error::CorruptRecord { .. }
            | Error::LockRequired { .. }
            | Error::ManifestNotFound { .. }
            | Error::InvalidManifest(_)
            | Error::Io(_)
            | Error::Store(_)
            | Error::Config(_)
            | Error::Prompt(_)
            | Error::Serialization(_)
            | Error::Git(_) => exit_codes::FAILURE,
        }
    }
}

/// Result type alias for statectl operations.
pub type Result<T> = std::result::Result<T, Error>;
