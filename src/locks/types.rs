//! Lock addressing types.

use std::fmt;

/// The (bucket, key) pair addressing a lock object.
///
/// Passed explicitly into every lock operation; there is no process-wide
/// default target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LockTarget {
    /// Bucket (or top-level directory) holding the lock object.
    pub bucket: String,

    /// Key of the lock object inside the bucket.
    pub key: String,
}

impl LockTarget {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

impl fmt::Display for LockTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}
