//! Durable publishing cursor.

use serde::{Deserialize, Serialize};

use crate::core::curriculum::Curriculum;

/// Persisted pipeline position (`state.json`).
///
/// `current_phase == curriculum.phases.len()` is the exhausted sentinel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    /// Index of the phase holding the next topic.
    pub current_phase: usize,
    /// Index of the next topic within the current phase.
    pub current_topic_index: usize,
    /// Number of posts published so far.
    pub total_posts: u64,
}

impl ProgressState {
    pub fn new(current_phase: usize, current_topic_index: usize, total_posts: u64) -> Self {
        Self {
            current_phase,
            current_topic_index,
            total_posts,
        }
    }

    /// True when the cursor sits on the exhausted sentinel.
    pub fn is_exhausted(&self, curriculum: &Curriculum) -> bool {
        self.current_phase >= curriculum.phases.len()
    }

    /// Check that the cursor is meaningful for `curriculum`.
    pub fn consistency_error(&self, curriculum: &Curriculum) -> Option<String> {
        let phases = curriculum.phases.len();
        if self.current_phase > phases {
            return Some(format!(
                "current_phase {} is beyond the curriculum ({phases} phases)",
                self.current_phase
            ));
        }
        if self.current_phase == phases {
            return None;
        }
        let topics = curriculum.phases[self.current_phase].topics.len();
        if self.current_topic_index >= topics {
            return Some(format!(
                "current_topic_index {} is out of range for phase {} ({topics} topics)",
                self.current_topic_index, self.current_phase
            ));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::curriculum;

    #[test]
    fn sentinel_is_consistent_and_exhausted() {
        let c = curriculum(&[("A", &["one"])]);
        let state = ProgressState::new(1, 0, 1);
        assert!(state.is_exhausted(&c));
        assert_eq!(state.consistency_error(&c), None);
    }

    #[test]
    fn topic_index_out_of_range_is_reported() {
        let c = curriculum(&[("A", &["one", "two"])]);
        let err = ProgressState::new(0, 2, 0)
            .consistency_error(&c)
            .expect("error");
        assert!(err.contains("current_topic_index 2"));
    }

    #[test]
    fn phase_past_sentinel_is_reported() {
        let c = curriculum(&[("A", &["one"])]);
        let err = ProgressState::new(3, 0, 0)
            .consistency_error(&c)
            .expect("error");
        assert!(err.contains("beyond the curriculum"));
    }

    #[test]
    fn serializes_with_stable_field_names() {
        let json = serde_json::to_string(&ProgressState::new(0, 1, 1)).expect("json");
        assert_eq!(
            json,
            r#"{"current_phase":0,"current_topic_index":1,"total_posts":1}"#
        );
    }
}
