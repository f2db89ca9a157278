//! Stable exit codes for the demo CLI.

/// The actor finished and the state carries no errors.
pub const OK: i32 = 0;
/// The actor finished but the state carries errors.
pub const FAILED: i32 = 1;
/// Bad command-line input, unreadable config, or a contract violation.
pub const INVALID: i32 = 2;
