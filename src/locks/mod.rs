//! Distributed lock protocol for statectl.
//!
//! A lock is a single object at a (bucket, key) pair in a shared store. Its
//! body is a JSON [`LockRecord`]:
//! - `lock_id`: commit SHA of the operation holding the lock
//! - `timestamp`: RFC 3339 creation time
//! - `signer`: pipeline run ID of the holder
//! - `diagnostics`: where those identities came from
//!
//! # States
//!
//! The resource is either unlocked (no object) or locked (object present).
//! Acquire is a single atomic create-if-absent, so no intermediate state is
//! ever visible. Locks never expire: a crashed holder's lock stays until it is
//! released or force-released.

mod identity;
mod manager;
mod record;
mod types;

#[cfg(test)]
mod tests;

// Re-export public API
pub use identity::{
    CI_COMMIT_SHA_VAR, CI_PIPELINE_ID_VAR, EnvIdentity, IdentitySource, LOCAL_SHA_NOTE,
    RANDOM_COMMIT_NOTE, RANDOM_SIGNER_NOTE,
};
pub use manager::{ForceReleaseOutcome, LockManager};
pub use record::{Diagnostics, FALLBACK_WARNING, LockRecord, SOURCE_OK};
pub use types::LockTarget;
