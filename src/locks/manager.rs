//! Acquire, check, release and force-release operations.

use super::record::LockRecord;
use super::types::LockTarget;
use crate::error::{Error, Result};
use crate::store::{LockStore, StoreError};
use tracing::{debug, info, warn};

/// Single-resource mutex built on a store's atomic create-if-absent.
///
/// The manager holds no state between calls: every operation is one round
/// trip to the store (two for force-release). Mutual exclusion across
/// processes rests entirely on `create_if_absent` being atomic.
#[derive(Debug)]
pub struct LockManager<S> {
    store: S,
}

impl<S: LockStore> LockManager<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    #[cfg(test)]
    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    /// Create the lock object, failing with `AlreadyLocked` if one exists.
    ///
    /// The existing object is neither overwritten nor read. No retries are
    /// attempted on store errors.
    pub fn acquire(&self, target: &LockTarget, record: &LockRecord) -> Result<()> {
        let body = record.to_json()?;
        debug!(%target, lock_id = %record.lock_id, signer = %record.signer, "acquiring lock");

        match self
            .store
            .create_if_absent(&target.bucket, &target.key, &body)
        {
            Ok(()) => {
                info!(%target, "lock acquired");
                Ok(())
            }
            Err(StoreError::AlreadyExists) => Err(Error::AlreadyLocked {
                target: target.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Read the lock object without side effects.
    ///
    /// Absence is `Ok(None)`, not an error. An object that is not a valid
    /// lock record is reported as `CorruptRecord`.
    pub fn check(&self, target: &LockTarget) -> Result<Option<LockRecord>> {
        debug!(%target, "checking lock");

        let body = match self.store.get(&target.bucket, &target.key) {
            Ok(body) => body,
            Err(StoreError::NotFound) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        LockRecord::from_json(&body)
            .map(Some)
            .map_err(|reason| Error::CorruptRecord {
                target: target.clone(),
                reason,
            })
    }

    /// Delete the lock object, failing with `NotLocked` if there is none.
    pub fn release(&self, target: &LockTarget) -> Result<()> {
        debug!(%target, "releasing lock");

        match self.store.delete(&target.bucket, &target.key) {
            Ok(()) => {
                info!(%target, "lock released");
                Ok(())
            }
            Err(StoreError::NotFound) => Err(Error::NotLocked {
                target: target.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete the lock object without any ownership check, once `approve`
    /// agrees.
    ///
    /// Exactly two store calls: one read, one delete. The read fails with
    /// `NotLocked` when nothing is there, before `approve` is asked. A
    /// corrupt record can still be removed; `approve` then sees `None`. The
    /// delete does not re-establish existence, so a lock that vanished in
    /// between counts as released. Returns the removed record when it was
    /// readable.
    ///
    /// This can destroy another process's active lock; `approve` must obtain
    /// explicit confirmation from the operator.
    pub fn force_release<F>(&self, target: &LockTarget, approve: F) -> Result<ForceReleaseOutcome>
    where
        F: FnOnce(Option<&LockRecord>) -> Result<bool>,
    {
        let existing = match self.check(target) {
            Ok(Some(record)) => Some(record),
            Ok(None) => {
                return Err(Error::NotLocked {
                    target: target.clone(),
                });
            }
            Err(Error::CorruptRecord { reason, .. }) => {
                warn!(%target, %reason, "lock record is corrupt");
                None
            }
            Err(e) => return Err(e),
        };

        if !approve(existing.as_ref())? {
            debug!(%target, "force-release declined");
            return Ok(ForceReleaseOutcome::Cancelled);
        }

        warn!(%target, "force-releasing lock");
        self.store.remove(&target.bucket, &target.key)?;

        info!(%target, "lock force-released");
        Ok(ForceReleaseOutcome::Released(existing))
    }
}

/// Result of a force-release that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ForceReleaseOutcome {
    /// The lock was removed; the record is present when it was readable.
    Released(Option<LockRecord>),
    /// Approval was refused; nothing was changed.
    Cancelled,
}
