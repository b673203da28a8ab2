//! Read-only view of the publishing cursor for `scribe status`.

use std::fmt;
use std::path::Path;

use anyhow::{Context, Result, anyhow};

use crate::core::curriculum::Curriculum;
use crate::core::navigator::{CursorError, next_topic, remaining_topics};
use crate::core::progress::ProgressState;
use crate::io::definitions::load_curriculum;
use crate::io::progress_store::load_progress;
use crate::pipeline::load_site;

/// Where the cursor stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusReport {
    /// Curriculum exhausted.
    Complete { total_posts: u64 },
    Next(NextTopic),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NextTopic {
    pub state: ProgressState,
    pub phase: String,
    pub topic: String,
    /// Topics left, the next one included.
    pub remaining: usize,
}

impl fmt::Display for StatusReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusReport::Complete { total_posts } => {
                write!(f, "curriculum complete ({total_posts} posts published)")
            }
            StatusReport::Next(next) => {
                writeln!(
                    f,
                    "cursor: phase {} topic {} ({} posts published)",
                    next.state.current_phase, next.state.current_topic_index, next.state.total_posts
                )?;
                writeln!(f, "next: {} / {}", next.phase, next.topic)?;
                write!(f, "remaining topics: {}", next.remaining)
            }
        }
    }
}

/// Report the cursor against a curriculum. No side effects.
pub fn report(state: &ProgressState, curriculum: &Curriculum) -> Result<StatusReport> {
    if let Some(problem) = state.consistency_error(curriculum) {
        return Err(anyhow!(problem));
    }
    match next_topic(state, curriculum) {
        Ok(selection) => Ok(StatusReport::Next(NextTopic {
            state: *state,
            phase: selection.phase.to_string(),
            topic: selection.topic.to_string(),
            remaining: remaining_topics(state, curriculum),
        })),
        Err(CursorError::CurriculumExhausted { .. }) => Ok(StatusReport::Complete {
            total_posts: state.total_posts,
        }),
        Err(err) => Err(err.into()),
    }
}

/// Load the site at `root` and report its cursor.
pub fn status_from_root(root: &Path) -> Result<StatusReport> {
    let (_, paths) = load_site(root)?;
    let curriculum = load_curriculum(&paths.curriculum_path)?;
    let state = load_progress(&paths.state_path)?;
    report(&state, &curriculum).with_context(|| format!("check {}", paths.state_path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::curriculum;

    #[test]
    fn reports_next_topic_and_remaining() {
        let c = curriculum(&[("Foundations", &["Memory Models", "Schedulers"]), ("Scale", &["Sharding"])]);
        let report = report(&ProgressState::new(0, 1, 1), &c).expect("report");
        assert_eq!(
            report,
            StatusReport::Next(NextTopic {
                state: ProgressState::new(0, 1, 1),
                phase: "Foundations".to_string(),
                topic: "Schedulers".to_string(),
                remaining: 2,
            })
        );
        assert_eq!(
            report.to_string(),
            "cursor: phase 0 topic 1 (1 posts published)\nnext: Foundations / Schedulers\nremaining topics: 2"
        );
    }

    #[test]
    fn reports_completion_on_sentinel() {
        let c = curriculum(&[("Foundations", &["Memory Models"])]);
        let report = report(&ProgressState::new(1, 0, 7), &c).expect("report");
        assert_eq!(report, StatusReport::Complete { total_posts: 7 });
    }

    #[test]
    fn rejects_cursor_past_sentinel() {
        let c = curriculum(&[("Foundations", &["Memory Models"])]);
        let err = report(&ProgressState::new(3, 0, 7), &c).unwrap_err();
        assert!(err.to_string().contains("beyond the curriculum"));
    }
}
