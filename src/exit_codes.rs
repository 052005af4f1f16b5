//! Exit code constants for the statectl CLI.
//!
//! - 0: Success, including "lock already acquired" and a declined force-release
//! - 1: Any failure (store error, missing lock, corrupt record, bad config)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// Any failure.
pub const FAILURE: i32 = 1;
