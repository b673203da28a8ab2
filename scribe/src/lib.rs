//! Autonomous content-publishing pipeline.
//!
//! A site holds a fixed curriculum of phases and topics plus a durable
//! cursor. Each `scribe run` picks the topic under the cursor, asks an
//! external generation agent for a draft, asks it again to critique and
//! revise that draft, gates the result on structural constraints, and
//! publishes it as a dated Markdown post committed to git.
//!
//! - **[`core`]**: Pure logic (navigation, prompts, response parsing,
//!   validation, post rendering). No I/O.
//! - **[`io`]**: Filesystem, subprocess, lock and git adapters.
//!
//! Orchestration modules ([`pipeline`], [`publish`], [`status`]) combine the
//! two to implement CLI commands. Every run ends in a [`outcome::RunOutcome`].

pub mod core;
pub mod exit_codes;
pub mod io;
pub mod logging;
pub mod outcome;
pub mod pipeline;
pub mod publish;
pub mod status;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
