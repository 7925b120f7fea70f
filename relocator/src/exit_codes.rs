//! Stable exit codes for the relocator CLI.

/// Template instantiated.
pub const OK: i32 = 0;
/// Resolution, precondition, parse, identifier or I/O failure.
pub const FAILURE: i32 = 1;
/// Wrong arguments or a malformed destination module path.
pub const USAGE: i32 = 2;
