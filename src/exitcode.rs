//! Exit codes: 1 and 2 for description errors, BSD sysexits.h for the rest
//!
//! Usage errors are reported by clap with its own status.

/// Description is well-formed but inconsistent (propagation failed)
pub const PROPAGATION: i32 = 1;

/// Description could not be parsed
pub const PARSE: i32 = 2;

/// Cannot open input
pub const NOINPUT: i32 = 66;

/// Internal software error
pub const SOFTWARE: i32 = 70;

/// Can't create output file
pub const CANTCREAT: i32 = 73;

/// Input/output error
pub const IOERR: i32 = 74;

/// Configuration error
pub const CONFIG: i32 = 78;
