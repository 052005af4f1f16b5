//! Git command runner for statectl.
//!
//! Only used to derive a lock identity from the local checkout when no CI
//! commit SHA is available.

use crate::error::{Error, Result};
use std::path::Path;
use std::process::{Command, Output};

/// Result of a successful git command execution.
#[derive(Debug, Clone)]
pub struct GitOutput {
    /// Standard output from the command (trimmed).
    pub stdout: String,
    /// Standard error from the command (trimmed).
    pub stderr: String,
}

impl GitOutput {
    fn from_output(output: &Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        }
    }
}

/// Run a git command in `cwd`.
///
/// # Returns
///
/// * `Ok(GitOutput)` - On exit code 0
/// * `Err(Error::Git)` - If git could not be spawned or exited non-zero
pub fn run_git<P: AsRef<Path>>(cwd: P, args: &[&str]) -> Result<GitOutput> {
    let output = Command::new("git")
        .current_dir(cwd.as_ref())
        .args(args)
        .output()
        .map_err(|e| {
            Error::Git(format!(
                "failed to execute git {}: {}",
                args.first().unwrap_or(&""),
                e
            ))
        })?;

    let git_output = GitOutput::from_output(&output);

    if output.status.success() {
        Ok(git_output)
    } else {
        let exit_code = output.status.code().unwrap_or(-1);
        let error_msg = if git_output.stderr.is_empty() {
            git_output.stdout
        } else {
            git_output.stderr
        };

        Err(Error::Git(format!(
            "git {} failed (exit code {}): {}",
            args.first().unwrap_or(&""),
            exit_code,
            error_msg
        )))
    }
}

/// Commit SHA of `HEAD` in the repository containing `cwd`.
pub fn head_sha<P: AsRef<Path>>(cwd: P) -> Result<String> {
    let output = run_git(cwd, &["rev-parse", "HEAD"])?;
    if output.stdout.is_empty() {
        return Err(Error::Git("git rev-parse HEAD printed nothing".to_string()));
    }
    Ok(output.stdout)
}
