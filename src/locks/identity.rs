//! Identity sources for new lock records.
//!
//! A lock record names the operation that took the lock (`lock_id`) and who
//! took it (`signer`). In CI both come from pipeline metadata; elsewhere they
//! fall back to the local checkout and finally to random UUIDs.

use super::record::SOURCE_OK;
use crate::git;
use std::path::PathBuf;
use tracing::{debug, warn};
use uuid::Uuid;

/// Environment variable holding the CI commit SHA.
pub const CI_COMMIT_SHA_VAR: &str = "CI_COMMIT_SHA";

/// Environment variable holding the CI pipeline run ID.
pub const CI_PIPELINE_ID_VAR: &str = "CI_PIPELINE_IID";

pub const LOCAL_SHA_NOTE: &str = "No CI commit SHA available, using local commit SHA";
pub const RANDOM_COMMIT_NOTE: &str = "No commit SHA available, using random UUID";
pub const RANDOM_SIGNER_NOTE: &str = "No pipeline ID available, using random UUID";

/// Where lock identities come from.
///
/// Implementations return `None` for any source that is unavailable; empty
/// strings are treated as unavailable by the caller.
pub trait IdentitySource {
    /// Commit SHA supplied by the CI system.
    fn ci_commit_sha(&self) -> Option<String>;

    /// Commit SHA of the local checkout.
    fn local_commit_sha(&self) -> Option<String>;

    /// Pipeline run ID supplied by the CI system.
    fn pipeline_id(&self) -> Option<String>;
}

/// Identity source reading the process environment and the local git checkout.
#[derive(Debug, Clone)]
pub struct EnvIdentity {
    repo_dir: PathBuf,
}

impl EnvIdentity {
    /// Read identities relative to the current working directory.
    pub fn current() -> Self {
        Self::in_dir(".")
    }

    /// Read identities, resolving the local commit in `repo_dir`.
    pub fn in_dir(repo_dir: impl Into<PathBuf>) -> Self {
        Self {
            repo_dir: repo_dir.into(),
        }
    }
}

impl IdentitySource for EnvIdentity {
    fn ci_commit_sha(&self) -> Option<String> {
        std::env::var(CI_COMMIT_SHA_VAR).ok()
    }

    fn local_commit_sha(&self) -> Option<String> {
        match git::head_sha(&self.repo_dir) {
            Ok(sha) => Some(sha),
            Err(e) => {
                debug!(error = %e, "local commit SHA unavailable");
                None
            }
        }
    }

    fn pipeline_id(&self) -> Option<String> {
        std::env::var(CI_PIPELINE_ID_VAR).ok()
    }
}

/// An identity value together with a note on where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Provenance {
    pub value: String,
    pub note: String,
}

impl Provenance {
    /// CI commit SHA, else local commit SHA, else a random UUID.
    pub fn commit<I: IdentitySource + ?Sized>(source: &I) -> Self {
        if let Some(sha) = non_empty(source.ci_commit_sha()) {
            return Self::ok(sha);
        }
        if let Some(sha) = non_empty(source.local_commit_sha()) {
            warn!("{}", LOCAL_SHA_NOTE);
            return Self::fallback(sha, LOCAL_SHA_NOTE);
        }
        warn!("{}", RANDOM_COMMIT_NOTE);
        Self::fallback(Uuid::new_v4().to_string(), RANDOM_COMMIT_NOTE)
    }

    /// CI pipeline ID, else a random UUID.
    pub fn signer<I: IdentitySource + ?Sized>(source: &I) -> Self {
        if let Some(id) = non_empty(source.pipeline_id()) {
            return Self::ok(id);
        }
        warn!("{}", RANDOM_SIGNER_NOTE);
        Self::fallback(Uuid::new_v4().to_string(), RANDOM_SIGNER_NOTE)
    }

    pub fn is_fallback(&self) -> bool {
        self.note != SOURCE_OK
    }

    fn ok(value: String) -> Self {
        Self {
            value,
            note: SOURCE_OK.to_string(),
        }
    }

    fn fallback(value: String, note: &str) -> Self {
        Self {
            value,
            note: note.to_string(),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
