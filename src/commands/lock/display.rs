//! Console output for lock commands.

use crate::locks::{LockRecord, LockTarget};
use colored::Colorize;

pub fn print_acquired(target: &LockTarget, record: &LockRecord) {
    println!("{}", "Lock acquired successfully.".green());
    println!("  Lock:       {}", target);
    println!("  Lock ID:    {}", record.lock_id);
    println!("  Signer:     {}", record.signer);
    if !record.diagnostics.warning.is_empty() {
        println!("  {}", record.diagnostics.warning.yellow());
    }
}

/// Print the full record, as shown by `lock status`.
pub fn print_record(target: &LockTarget, record: &LockRecord) {
    println!("{} {}", "Locked:".yellow(), target);
    println!("  Lock ID:    {}", record.lock_id);
    println!("  Signer:     {}", record.signer);
    match record.age_string() {
        Some(age) => println!("  Created:    {} ({} ago)", record.timestamp, age),
        None => println!("  Created:    {}", record.timestamp),
    }
    if record.used_fallback() {
        println!("  Commit:     {}", record.diagnostics.commit);
        println!("  Signed by:  {}", record.diagnostics.signer);
    }
    if !record.diagnostics.warning.is_empty() {
        println!("  {}", record.diagnostics.warning.yellow());
    }
}

pub fn print_force_released(record: Option<&LockRecord>) {
    println!("{}", "Lock forcefully released successfully.".green());
    if let Some(record) = record {
        println!(
            "  Removed lock {} held by {} since {}",
            record.lock_id, record.signer, record.timestamp
        );
    }
}

pub fn force_release_question(target: &LockTarget) -> String {
    format!(
        "{}\n{}",
        format!(
            "WARNING: You are about to forcefully remove the remote lock file {}. \
             This may disrupt ongoing operations.",
            target
        )
        .yellow(),
        "Are you sure you want to proceed?".cyan()
    )
}
