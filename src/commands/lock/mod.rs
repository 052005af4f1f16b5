//! Implementation of the `statectl lock` commands.
//!
//! Each command resolves the lock target, opens the configured store and
//! performs exactly one lock protocol operation:
//! - `acquire`: create the lock; an existing lock is reported, not an error
//! - `status`: read the lock record
//! - `release`: delete the lock; a missing lock is an error
//! - `force-release`: delete the lock whoever holds it, after confirmation

mod display;


use crate::cli::TargetArgs;
use crate::config::{self, Config};
use crate::confirm::{AssumeYes, Confirm, PromptConfirm};
use crate::error::{Error, Result};
use crate::locks::{
    EnvIdentity, ForceReleaseOutcome, IdentitySource, LockManager, LockRecord, LockTarget,
};
use crate::store::{self, LockStore, StateStore};
use colored::Colorize;
use std::path::Path;

/// A resolved lock target with a manager over its store.
pub struct LockSession {
    pub target: LockTarget,
    pub manager: LockManager<Box<dyn StateStore>>,
}

/// Resolve the target from arguments and config file, then open its store.
pub fn connect(args: &TargetArgs, config_path: Option<&Path>) -> Result<LockSession> {
    let cwd = std::env::current_dir()
        .map_err(|e| Error::Config(format!("failed to read working directory: {}", e)))?;
    let config = Config::discover(config_path, &cwd)?;
    let resolved = config::resolve(args, &config)?;
    let store = store::open(&resolved.backend)?;

    Ok(LockSession {
        target: resolved.target,
        manager: LockManager::new(store),
    })
}

/// Result of an acquire attempt that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquireOutcome {
    /// The lock was created with this record.
    Acquired(LockRecord),
    /// Another process already holds the lock.
    AlreadyHeld,
}

/// Acquire the lock with identities taken from `identity`.
///
/// An existing lock is a normal outcome here, not an error.
pub fn acquire<S: LockStore, I: IdentitySource + ?Sized>(
    manager: &LockManager<S>,
    target: &LockTarget,
    identity: &I,
) -> Result<AcquireOutcome> {
    let record = LockRecord::generate(identity);

    match manager.acquire(target, &record) {
        Ok(()) => Ok(AcquireOutcome::Acquired(record)),
        Err(Error::AlreadyLocked { .. }) => Ok(AcquireOutcome::AlreadyHeld),
        Err(e) => Err(e),
    }
}

/// Confirm with the operator, then force-release the lock.
///
/// A missing lock fails before the operator is asked anything.
pub fn force_release<S: LockStore, C: Confirm + ?Sized>(
    manager: &LockManager<S>,
    target: &LockTarget,
    confirm: &mut C,
) -> Result<ForceReleaseOutcome> {
    manager.force_release(target, |_| {
        confirm.confirm(&display::force_release_question(target))
    })
}

pub fn cmd_acquire(session: &LockSession) -> Result<()> {
    let identity = EnvIdentity::current();

    match acquire(&session.manager, &session.target, &identity)? {
        AcquireOutcome::Acquired(record) => display::print_acquired(&session.target, &record),
        AcquireOutcome::AlreadyHeld => {
            println!("{}", "Lock already acquired, exiting...".yellow());
        }
    }
    Ok(())
}

pub fn cmd_status(session: &LockSession) -> Result<()> {
    match session.manager.check(&session.target)? {
        Some(record) => display::print_record(&session.target, &record),
        None => println!("{} {}", "Unlocked:".green(), session.target),
    }
    Ok(())
}

pub fn cmd_release(session: &LockSession) -> Result<()> {
    session.manager.release(&session.target)?;
    println!("{}", "Lock released successfully.".green());
    Ok(())
}

pub fn cmd_force_release(session: &LockSession, yes: bool) -> Result<()> {
    let mut confirm: Box<dyn Confirm> = if yes {
        Box::new(AssumeYes)
    } else {
        Box::new(PromptConfirm::stdio())
    };

    match force_release(&session.manager, &session.target, confirm.as_mut())? {
        ForceReleaseOutcome::Released(record) => display::print_force_released(record.as_ref()),
        ForceReleaseOutcome::Cancelled => {
            println!("{}", "Force release cancelled.".yellow());
        }
    }
    Ok(())
}
