//! How a pipeline run ended.
//!
//! Every stage returns `Result<_, StageError>`; the run controller folds the
//! result into a [`RunOutcome`] instead of letting errors escape.

use std::fmt;

use thiserror::Error;
use tracing::{error, info, warn};

use crate::core::validator::Verdict;
use crate::exit_codes;
use crate::publish::PublishedPost;

/// Pipeline stage, used to attribute failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Config,
    Lock,
    Select,
    Prompt,
    Draft,
    Critique,
    Write,
    Persist,
    Publish,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Config => "config",
            Stage::Lock => "lock",
            Stage::Select => "select",
            Stage::Prompt => "prompt",
            Stage::Draft => "draft",
            Stage::Critique => "critique",
            Stage::Write => "write",
            Stage::Persist => "persist",
            Stage::Publish => "publish",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failure attributed to the stage that produced it.
#[derive(Debug, Error)]
#[error("{stage} stage failed: {error:#}")]
pub struct StageError {
    pub stage: Stage,
    pub error: anyhow::Error,
}

impl StageError {
    pub fn new(stage: Stage, error: impl Into<anyhow::Error>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }

    /// Adapter for `map_err`: `result.map_err(StageError::at(Stage::Draft))`.
    pub fn at<E: Into<anyhow::Error>>(stage: Stage) -> impl FnOnce(E) -> Self {
        move |error| Self::new(stage, error)
    }
}

/// Result of one pipeline invocation.
#[derive(Debug)]
pub enum RunOutcome {
    /// Post written, cursor advanced and persisted, publish step completed.
    Published(PublishedPost),
    /// The cursor is past the last phase; nothing was generated.
    CurriculumComplete { total_posts: u64 },
    /// The article failed the validation gate; nothing was written.
    Rejected {
        phase: String,
        topic: String,
        verdict: Verdict,
    },
    Failed(StageError),
}

impl RunOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            RunOutcome::Published(_) => "published",
            RunOutcome::CurriculumComplete { .. } => "complete",
            RunOutcome::Rejected { .. } => "rejected",
            RunOutcome::Failed(_) => "failed",
        }
    }

    /// Process exit code. Without `strict`, every outcome exits 0.
    pub fn exit_code(&self, strict: bool) -> i32 {
        if !strict {
            return exit_codes::OK;
        }
        match self {
            RunOutcome::Published(_) => exit_codes::OK,
            RunOutcome::CurriculumComplete { .. } => exit_codes::COMPLETE,
            RunOutcome::Rejected { .. } => exit_codes::REJECTED,
            RunOutcome::Failed(_) => exit_codes::FAILED,
        }
    }

    /// Emit the single summary log entry for this outcome.
    pub fn log(&self) {
        match self {
            RunOutcome::Published(post) => info!(
                phase = %post.phase,
                topic = %post.topic,
                path = %post.path.display(),
                total_posts = post.state.total_posts,
                committed = post.receipt.committed,
                pushed = post.receipt.pushed,
                "post published"
            ),
            RunOutcome::CurriculumComplete { total_posts } => {
                info!(total_posts, "curriculum completed, nothing to publish");
            }
            RunOutcome::Rejected {
                phase,
                topic,
                verdict,
            } => warn!(
                %phase,
                %topic,
                reason = %verdict.reason(),
                "validation failed, run aborted without changes"
            ),
            RunOutcome::Failed(err) => error!(
                stage = %err.stage,
                error = ?err.error,
                "run failed"
            ),
        }
    }
}
