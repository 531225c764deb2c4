//! Exit codes for the gavel binary. Part of the public contract for CI
//! and reward-pipeline callers.

pub const SUCCESS: i32 = 0;
pub const GRADING_FAILED: i32 = 1; // report carries an error, score is 0.0
pub const CONFIG_ERROR: i32 = 2; // bad rubric, flags, or environment
