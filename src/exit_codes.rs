//! Process exit codes used by the `clouds-gen` binary.
//!
//! - `0`: at least one source produced output (possibly with warnings)
//! - `1`: general failure (no sources processed, bad credential lists, ...)
//! - `2`: discovery mode could not resolve an identity endpoint. clap also
//!   uses `2` for invalid command-line usage.
//! - `9`: the scratch working directory could not be entered
//! - `130`: interrupted by `SIGINT`/`SIGTERM` after cleanup ran

pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const UNRESOLVED_ENVIRONMENT: i32 = 2;
pub const SCRATCH_DIR: i32 = 9;
pub const INTERRUPTED: i32 = 130;
