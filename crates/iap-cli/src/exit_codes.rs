//! Exit codes for `iap`. Part of the public contract for scripts.

pub const SUCCESS: i32 = 0;
pub const VERIFY_FAILED: i32 = 1; // Envelope returned with isSuccess=false
pub const CONFIG_ERROR: i32 = 2; // Credentials missing/malformed or bad arguments
