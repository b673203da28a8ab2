//! Stable exit codes for scribe CLI commands.

/// Command succeeded (or `run` without `--strict`).
pub const OK: i32 = 0;
/// Run failed at some stage, or the command could not load the site.
pub const FAILED: i32 = 1;
/// The curriculum is exhausted; nothing left to publish.
pub const COMPLETE: i32 = 2;
/// The article failed the validation gate.
pub const REJECTED: i32 = 3;
