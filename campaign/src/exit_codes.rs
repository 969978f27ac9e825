//! Stable exit codes for campaign CLI commands.

/// Command succeeded; for `status`, work is still pending.
pub const OK: i32 = 0;
/// Command failed: missing or corrupted store, bad arguments, worker not found.
///
/// Argument errors reported by clap are mapped here too.
pub const INVALID: i32 = 1;
/// `campaign status` found every task completed.
pub const COMPLETE: i32 = 2;
