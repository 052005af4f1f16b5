//! Tests for the lock protocol.

use super::*;
use crate::error::Error;
use crate::store::{FsLockStore, LockStore, ObjectLockStore, StoreError};
use crate::test_support::{CountingStore, FixedIdentity};
use object_store::memory::InMemory;
use std::sync::{Arc, Barrier};
use std::thread;
use tempfile::TempDir;

fn target() -> LockTarget {
    LockTarget::new("s", "lock.json")
}

/// Lock manager over a temporary directory.
fn fs_manager() -> (TempDir, LockManager<FsLockStore>) {
    let temp_dir = TempDir::new().unwrap();
    let manager = LockManager::new(FsLockStore::new(temp_dir.path()));
    (temp_dir, manager)
}

/// Lock manager over an in-memory object store.
fn memory_manager() -> LockManager<ObjectLockStore> {
    LockManager::new(ObjectLockStore::shared(Arc::new(InMemory::new())).unwrap())
}

/// Run a protocol scenario against every store backend.
fn for_each_backend(scenario: impl Fn(&dyn Fn() -> Box<dyn LockStore>)) {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().to_path_buf();
    scenario(&move || Box::new(FsLockStore::new(&root)) as Box<dyn LockStore>);

    let memory = Arc::new(InMemory::new());
    scenario(&move || {
        Box::new(ObjectLockStore::shared(memory.clone()).unwrap()) as Box<dyn LockStore>
    });
}

#[test]
fn acquire_then_check_round_trips_record() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());
        let record = LockRecord::generate(&FixedIdentity::ci("abc123", "42"));

        manager.acquire(&target(), &record).unwrap();
        let stored = manager.check(&target()).unwrap();

        assert_eq!(stored, Some(record));
    });
}

#[test]
fn check_on_unlocked_key_is_not_an_error() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());
        assert_eq!(manager.check(&target()).unwrap(), None);
    });
}

#[test]
fn second_acquire_is_already_locked_and_leaves_object_unchanged() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());
        let first = LockRecord::new("abc123", "42");
        let second = LockRecord::new("def456", "43");

        manager.acquire(&target(), &first).unwrap();
        let before = manager.store().get("s", "lock.json").unwrap();

        let err = manager.acquire(&target(), &second).unwrap_err();
        assert!(matches!(err, Error::AlreadyLocked { .. }));

        let after = manager.store().get("s", "lock.json").unwrap();
        assert_eq!(before, after);
        assert!(after.starts_with(b"{\"lock_id\":\"abc123\","));
    });
}

#[test]
fn acquire_does_not_read_an_existing_corrupt_object() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());
        manager
            .store()
            .create_if_absent("s", "lock.json", b"garbage")
            .unwrap();

        let err = manager
            .acquire(&target(), &LockRecord::new("a", "b"))
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyLocked { .. }));
    });
}

#[test]
fn release_on_unlocked_key_is_not_locked() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());

        let err = manager.release(&target()).unwrap_err();
        assert!(matches!(err, Error::NotLocked { .. }));
    });
}

#[test]
fn release_on_locked_key_unlocks_it() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());
        manager
            .acquire(&target(), &LockRecord::new("abc123", "42"))
            .unwrap();

        manager.release(&target()).unwrap();

        assert_eq!(manager.check(&target()).unwrap(), None);
        // The key can be locked again once released.
        manager
            .acquire(&target(), &LockRecord::new("def456", "43"))
            .unwrap();
    });
}

#[test]
fn force_release_ignores_which_identity_holds_the_lock() {
    for_each_backend(|open| {
        let holder = LockManager::new(open());
        let other = LockManager::new(open());
        let record = LockRecord::generate(&FixedIdentity::ci("abc123", "42"));
        holder.acquire(&target(), &record).unwrap();

        let outcome = other.force_release(&target(), |_| Ok(true)).unwrap();

        assert_eq!(outcome, ForceReleaseOutcome::Released(Some(record)));
        assert_eq!(holder.check(&target()).unwrap(), None);
    });
}

#[test]
fn force_release_on_unlocked_key_is_not_locked() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());

        let mut asked = false;
        let err = manager
            .force_release(&target(), |_| {
                asked = true;
                Ok(true)
            })
            .unwrap_err();

        assert!(matches!(err, Error::NotLocked { .. }));
        assert!(!asked);
    });
}

#[test]
fn force_release_removes_corrupt_record() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());
        manager
            .store()
            .create_if_absent("s", "lock.json", b"{not json")
            .unwrap();

        let outcome = manager
            .force_release(&target(), |record| {
                assert!(record.is_none());
                Ok(true)
            })
            .unwrap();

        assert_eq!(outcome, ForceReleaseOutcome::Released(None));
        assert_eq!(manager.check(&target()).unwrap(), None);
    });
}

#[test]
fn force_release_declined_leaves_lock_in_place() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());
        let record = LockRecord::new("abc123", "42");
        manager.acquire(&target(), &record).unwrap();

        let outcome = manager
            .force_release(&target(), |seen| {
                assert_eq!(seen, Some(&record));
                Ok(false)
            })
            .unwrap();

        assert_eq!(outcome, ForceReleaseOutcome::Cancelled);
        assert_eq!(manager.check(&target()).unwrap(), Some(record));
    });
}

#[test]
fn force_release_is_one_read_and_one_delete() {
    for_each_backend(|open| {
        let manager = LockManager::new(CountingStore::new(open()));
        manager
            .acquire(&target(), &LockRecord::new("abc123", "42"))
            .unwrap();
        manager.store().take_calls();

        manager.force_release(&target(), |_| Ok(true)).unwrap();

        assert_eq!(manager.store().take_calls(), 2);
        assert_eq!(manager.check(&target()).unwrap(), None);
    });
}

/// Store where the lock is visible to reads but gone by the time of delete.
struct VanishingLockStore {
    body: Vec<u8>,
}

impl LockStore for VanishingLockStore {
    fn create_if_absent(&self, _: &str, _: &str, _: &[u8]) -> Result<(), StoreError> {
        Err(StoreError::AlreadyExists)
    }

    fn get(&self, _: &str, _: &str) -> Result<Vec<u8>, StoreError> {
        Ok(self.body.clone())
    }

    fn delete(&self, _: &str, _: &str) -> Result<(), StoreError> {
        Err(StoreError::NotFound)
    }
}

#[test]
fn force_release_succeeds_when_lock_vanishes_before_delete() {
    let record = LockRecord::new("abc123", "42");
    let manager = LockManager::new(VanishingLockStore {
        body: record.to_json().unwrap(),
    });

    let outcome = manager.force_release(&target(), |_| Ok(true)).unwrap();

    assert_eq!(outcome, ForceReleaseOutcome::Released(Some(record)));
}

#[test]
fn release_still_reports_a_lock_that_vanished() {
    let manager = LockManager::new(VanishingLockStore {
        body: LockRecord::new("abc123", "42").to_json().unwrap(),
    });

    let err = manager.release(&target()).unwrap_err();
    assert!(matches!(err, Error::NotLocked { .. }));
}

#[test]
fn check_reports_corrupt_record_for_malformed_object() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());
        manager
            .store()
            .create_if_absent("s", "lock.json", b"<html>AccessDenied</html>")
            .unwrap();

        let err = manager.check(&target()).unwrap_err();
        match err {
            Error::CorruptRecord { target: t, reason } => {
                assert_eq!(t, target());
                assert!(!reason.is_empty());
            }
            other => panic!("expected CorruptRecord, got {:?}", other),
        }
    });
}

#[test]
fn check_reports_corrupt_record_for_empty_identity() {
    for_each_backend(|open| {
        let manager = LockManager::new(open());
        manager
            .store()
            .create_if_absent(
                "s",
                "lock.json",
                br#"{"lock_id":"","timestamp":"2024-05-01T12:00:00Z","signer":"42"}"#,
            )
            .unwrap();

        assert!(matches!(
            manager.check(&target()),
            Err(Error::CorruptRecord { .. })
        ));
    });
}

#[test]
fn acquire_with_no_commit_source_documents_fallback() {
    let (_temp_dir, manager) = fs_manager();
    let source = FixedIdentity::default();
    let record = LockRecord::generate(&source);

    manager.acquire(&target(), &record).unwrap();
    let stored = manager.check(&target()).unwrap().unwrap();

    assert_eq!(stored.diagnostics.commit, RANDOM_COMMIT_NOTE);
    assert_eq!(stored.diagnostics.signer, RANDOM_SIGNER_NOTE);
    assert_eq!(stored.diagnostics.warning, FALLBACK_WARNING);
    assert!(!stored.lock_id.is_empty());
    assert!(!stored.signer.is_empty());
}

#[test]
fn different_keys_lock_independently() {
    let manager = memory_manager();
    let a = LockTarget::new("s", "a.json");
    let b = LockTarget::new("s", "b.json");

    manager.acquire(&a, &LockRecord::new("1", "1")).unwrap();
    manager.acquire(&b, &LockRecord::new("2", "2")).unwrap();
    manager.release(&a).unwrap();

    assert_eq!(manager.check(&a).unwrap(), None);
    assert!(manager.check(&b).unwrap().is_some());
}

/// Race `contenders` acquirers on one key and return how many succeeded and
/// how many saw `AlreadyLocked`.
fn race_acquire<S: LockStore + 'static>(
    manager: Arc<LockManager<S>>,
    contenders: usize,
) -> (usize, usize) {
    let barrier = Arc::new(Barrier::new(contenders));
    let handles: Vec<_> = (0..contenders)
        .map(|i| {
            let manager = Arc::clone(&manager);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let record = LockRecord::new(format!("sha-{}", i), format!("{}", i));
                barrier.wait();
                manager.acquire(&target(), &record)
            })
        })
        .collect();

    let mut acquired = 0;
    let mut already_locked = 0;
    for handle in handles {
        match handle.join().unwrap() {
            Ok(()) => acquired += 1,
            Err(Error::AlreadyLocked { .. }) => already_locked += 1,
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
    (acquired, already_locked)
}

#[test]
fn concurrent_acquires_on_fs_store_have_exactly_one_winner() {
    for _ in 0..10 {
        let (_temp_dir, manager) = fs_manager();
        assert_eq!(race_acquire(Arc::new(manager), 2), (1, 1));
    }

    let (_temp_dir, manager) = fs_manager();
    assert_eq!(race_acquire(Arc::new(manager), 8), (1, 7));
}

#[test]
fn concurrent_acquires_on_object_store_have_exactly_one_winner() {
    for _ in 0..10 {
        assert_eq!(race_acquire(Arc::new(memory_manager()), 2), (1, 1));
    }

    assert_eq!(race_acquire(Arc::new(memory_manager()), 8), (1, 7));
}

#[test]
fn concurrent_winner_record_is_the_stored_one() {
    let manager = Arc::new(memory_manager());
    race_acquire(Arc::clone(&manager), 4);

    let stored = manager.check(&target()).unwrap().unwrap();
    assert!(stored.lock_id.starts_with("sha-"));
    assert_eq!(stored.lock_id, format!("sha-{}", stored.signer));
}
