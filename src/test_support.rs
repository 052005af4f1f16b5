use crate::locks::IdentitySource;
use crate::store::{LockStore, StoreError};
use std::path::Path;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

/// Identity source with fixed answers, standing in for CI metadata.
#[derive(Debug, Default, Clone)]
pub(crate) struct FixedIdentity {
    pub ci_sha: Option<String>,
    pub local_sha: Option<String>,
    pub pipeline: Option<String>,
}

impl FixedIdentity {
    pub(crate) fn ci(sha: &str, pipeline: &str) -> Self {
        Self {
            ci_sha: Some(sha.to_string()),
            local_sha: None,
            pipeline: Some(pipeline.to_string()),
        }
    }
}

impl IdentitySource for FixedIdentity {
    fn ci_commit_sha(&self) -> Option<String> {
        self.ci_sha.clone()
    }

    fn local_commit_sha(&self) -> Option<String> {
        self.local_sha.clone()
    }

    fn pipeline_id(&self) -> Option<String> {
        self.pipeline.clone()
    }
}

/// Store that counts every call before passing it on.
pub(crate) struct CountingStore<S> {
    inner: S,
    calls: AtomicUsize,
}

impl<S> CountingStore<S> {
    pub(crate) fn new(inner: S) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
        }
    }

    /// Calls since the last take.
    pub(crate) fn take_calls(&self) -> usize {
        self.calls.swap(0, Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl<S: LockStore> LockStore for CountingStore<S> {
    fn create_if_absent(&self, bucket: &str, key: &str, body: &[u8]) -> Result<(), StoreError> {
        self.count();
        self.inner.create_if_absent(bucket, key, body)
    }

    fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StoreError> {
        self.count();
        self.inner.get(bucket, key)
    }

    fn delete(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.count();
        self.inner.delete(bucket, key)
    }

    fn remove(&self, bucket: &str, key: &str) -> Result<(), StoreError> {
        self.count();
        self.inner.remove(bucket, key)
    }
}

/// Create a git repository with a single commit.
pub(crate) fn create_test_repo() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path();

    git(path, &["init"]);
    git(path, &["config", "user.email", "test@example.com"]);
    git(path, &["config", "user.name", "Test User"]);
    // Keep the fixture independent of the host's signing setup.
    git(path, &["config", "commit.gpgsign", "false"]);

    std::fs::write(path.join("manifest.json"), "{}\n").unwrap();
    git(path, &["add", "."]);
    git(path, &["commit", "-m", "Initial commit"]);

    temp_dir
}

fn git(repo_dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .current_dir(repo_dir)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("failed to execute git {}: {}", args.join(" "), e));

    if !output.status.success() {
        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!(
            "git {} failed (exit code {:?})\nstdout:\n{}\nstderr:\n{}",
            args.join(" "),
            output.status.code(),
            stdout,
            stderr
        );
    }
}
