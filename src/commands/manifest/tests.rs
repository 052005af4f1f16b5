//! Tests for the manifest commands.

use super::*;
use crate::cli::TargetArgs;
use crate::locks::{LockManager, LockRecord};
use crate::store::FsLockStore;
use tempfile::TempDir;

const MANIFEST: &[u8] = br#"{"nodes":{}}"#;

fn session(root: &Path, lock: Option<LockTarget>) -> ManifestSession {
    let store: Box<dyn StateStore> = Box::new(FsLockStore::new(root));
    ManifestSession {
        manifest: ManifestTarget::new("s", "dbt/manifest.json"),
        lock,
        sync: ManifestSync::new(store),
    }
}

fn hold_lock(root: &Path) -> LockTarget {
    let lock = LockTarget::new("s", "dbt/lock.json");
    LockManager::new(FsLockStore::new(root))
        .acquire(&lock, &LockRecord::new("abc123", "42"))
        .unwrap();
    lock
}

#[test]
fn push_then_pull_copies_the_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("remote");
    let lock = hold_lock(&root);
    let session = session(&root, Some(lock));

    let local = temp_dir.path().join("target/manifest.json");
    std::fs::create_dir_all(local.parent().unwrap()).unwrap();
    std::fs::write(&local, MANIFEST).unwrap();
    cmd_push(&session, Some(&local)).unwrap();

    let pulled = temp_dir.path().join("state/manifest.json");
    cmd_pull(&session, Some(&pulled)).unwrap();

    assert_eq!(std::fs::read(&pulled).unwrap(), MANIFEST);
    assert_eq!(
        std::fs::read(root.join("s/dbt/manifest.json")).unwrap(),
        MANIFEST
    );
}

#[test]
fn push_without_lock_key_is_a_config_error() {
    let temp_dir = TempDir::new().unwrap();
    let session = session(temp_dir.path(), None);
    let local = temp_dir.path().join("manifest.json");
    std::fs::write(&local, MANIFEST).unwrap();

    let err = cmd_push(&session, Some(&local)).unwrap_err();

    assert!(matches!(err, Error::Config(_)));
    assert!(err.to_string().contains("LOCK_KEY_PATH"));
}

#[test]
fn push_of_missing_local_file_is_io_error() {
    let temp_dir = TempDir::new().unwrap();
    let lock = hold_lock(temp_dir.path());
    let session = session(temp_dir.path(), Some(lock));

    let err = cmd_push(&session, Some(&temp_dir.path().join("absent.json"))).unwrap_err();

    assert!(matches!(err, Error::Io(_)));
    assert!(err.to_string().contains("absent.json"));
}

#[test]
fn pull_of_missing_manifest_leaves_local_file_alone() {
    let temp_dir = TempDir::new().unwrap();
    let session = session(&temp_dir.path().join("remote"), None);
    let local = temp_dir.path().join("manifest.json");
    std::fs::write(&local, "previous").unwrap();

    let err = cmd_pull(&session, Some(&local)).unwrap_err();

    assert!(matches!(err, Error::ManifestNotFound { .. }));
    assert_eq!(std::fs::read_to_string(&local).unwrap(), "previous");
}

#[test]
fn connect_resolves_manifest_from_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("remote");
    let config_path = temp_dir.path().join("statectl.yaml");
    std::fs::write(
        &config_path,
        format!(
            "bucket: s\nkey: dbt/lock.json\nmanifest_key: dbt/manifest.json\nbackend: fs\nroot: {}\n",
            root.display()
        ),
    )
    .unwrap();
    let args = ManifestTargetArgs {
        target: TargetArgs {
            bucket: Some("s".to_string()),
            ..Default::default()
        },
        manifest_key: None,
    };

    let session = connect(&args, Some(&config_path)).unwrap();

    assert_eq!(session.manifest, ManifestTarget::new("s", "dbt/manifest.json"));
    assert_eq!(session.lock, Some(LockTarget::new("s", "dbt/lock.json")));
    cmd_list(&session).unwrap();
}
