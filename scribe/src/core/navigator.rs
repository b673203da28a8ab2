//! Curriculum navigation: which topic is next, and how the cursor moves.

use thiserror::Error;

use crate::core::curriculum::Curriculum;
use crate::core::progress::ProgressState;

/// Topic at the current cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'a> {
    pub phase_index: usize,
    pub topic_index: usize,
    pub phase: &'a str,
    pub topic: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CursorError {
    /// The cursor sits past the last phase; nothing is left to publish.
    #[error("curriculum completed ({phases} phases)")]
    CurriculumExhausted { phases: usize },
    #[error("topic index {topic_index} out of range for phase {phase_index} ({topics} topics)")]
    TopicOutOfRange {
        phase_index: usize,
        topic_index: usize,
        topics: usize,
    },
}

/// Return the phase name and topic at the cursor. No side effects.
pub fn next_topic<'a>(
    state: &ProgressState,
    curriculum: &'a Curriculum,
) -> Result<Selection<'a>, CursorError> {
    let phase = curriculum
        .phases
        .get(state.current_phase)
        .ok_or(CursorError::CurriculumExhausted {
            phases: curriculum.phases.len(),
        })?;
    let topic = phase
        .topics
        .get(state.current_topic_index)
        .ok_or(CursorError::TopicOutOfRange {
            phase_index: state.current_phase,
            topic_index: state.current_topic_index,
            topics: phase.topics.len(),
        })?;
    Ok(Selection {
        phase_index: state.current_phase,
        topic_index: state.current_topic_index,
        phase: &phase.name,
        topic,
    })
}

/// Move the cursor one topic forward, rolling into the next phase when the
/// current one is finished. `total_posts` always grows by one.
pub fn advance(
    state: &ProgressState,
    curriculum: &Curriculum,
) -> Result<ProgressState, CursorError> {
    let phase = curriculum
        .phases
        .get(state.current_phase)
        .ok_or(CursorError::CurriculumExhausted {
            phases: curriculum.phases.len(),
        })?;

    let mut next = *state;
    next.current_topic_index += 1;
    if next.current_topic_index >= phase.topics.len() {
        next.current_phase += 1;
        next.current_topic_index = 0;
    }
    next.total_posts += 1;
    Ok(next)
}

/// Topic the cursor most recently moved past, or `None` before the first post.
pub fn previous_topic<'a>(
    state: &ProgressState,
    curriculum: &'a Curriculum,
) -> Option<Selection<'a>> {
    if state.total_posts == 0 {
        return None;
    }
    let (phase_index, topic_index) = if state.current_topic_index > 0 {
        (state.current_phase, state.current_topic_index - 1)
    } else {
        let phase_index = state.current_phase.checked_sub(1)?;
        let topics = curriculum.phases.get(phase_index)?.topics.len();
        (phase_index, topics.checked_sub(1)?)
    };
    let phase = curriculum.phases.get(phase_index)?;
    let topic = phase.topics.get(topic_index)?;
    Some(Selection {
        phase_index,
        topic_index,
        phase: &phase.name,
        topic,
    })
}

/// Topics still to be published from the cursor onwards (cursor included).
pub fn remaining_topics(state: &ProgressState, curriculum: &Curriculum) -> usize {
    curriculum
        .phases
        .iter()
        .enumerate()
        .skip(state.current_phase)
        .map(|(idx, phase)| {
            if idx == state.current_phase {
                phase.topics.len().saturating_sub(state.current_topic_index)
            } else {
                phase.topics.len()
            }
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::curriculum;

    #[test]
    fn next_topic_reads_the_cursor_without_mutation() {
        let c = curriculum(&[("Foundations", &["Memory Models", "Schedulers"])]);
        let state = ProgressState::new(0, 1, 1);

        let first = next_topic(&state, &c).expect("topic");
        let second = next_topic(&state, &c).expect("topic");

        assert_eq!(first, second);
        assert_eq!(first.phase, "Foundations");
        assert_eq!(first.topic, "Schedulers");
        assert_eq!(state, ProgressState::new(0, 1, 1));
    }

    #[test]
    fn advance_within_phase_moves_topic_index() {
        let c = curriculum(&[("Foundations", &["Memory Models", "Schedulers"])]);
        let next = advance(&ProgressState::default(), &c).expect("advance");
        assert_eq!(next, ProgressState::new(0, 1, 1));
    }

    #[test]
    fn advance_rolls_over_phase_exactly_once() {
        let c = curriculum(&[("A", &["a1", "a2", "a3"]), ("B", &["b1"])]);
        let mut state = ProgressState::default();
        let mut rollovers = 0;
        for _ in 0..3 {
            let next = advance(&state, &c).expect("advance");
            if next.current_phase != state.current_phase {
                rollovers += 1;
            }
            assert_eq!(next.total_posts, state.total_posts + 1);
            state = next;
        }
        assert_eq!(rollovers, 1);
        assert_eq!(state, ProgressState::new(1, 0, 3));
    }

    #[test]
    fn advancing_to_the_end_terminates_in_exhaustion() {
        let c = curriculum(&[("A", &["a1", "a2"]), ("B", &["b1"]), ("C", &["c1", "c2"])]);
        let mut state = ProgressState::default();
        let mut steps = 0;
        while !state.is_exhausted(&c) {
            state = advance(&state, &c).expect("advance");
            steps += 1;
            assert!(steps <= c.total_topics(), "advance must terminate");
        }
        assert_eq!(steps, 5);
        assert_eq!(state, ProgressState::new(3, 0, 5));
        assert_eq!(
            next_topic(&state, &c),
            Err(CursorError::CurriculumExhausted { phases: 3 })
        );
        assert_eq!(
            advance(&state, &c),
            Err(CursorError::CurriculumExhausted { phases: 3 })
        );
    }

    #[test]
    fn exhausted_cursor_past_single_phase() {
        let c = curriculum(&[("Foundations", &["Memory Models"])]);
        let state = ProgressState::new(1, 0, 7);
        assert!(matches!(
            next_topic(&state, &c),
            Err(CursorError::CurriculumExhausted { .. })
        ));
    }

    #[test]
    fn corrupt_topic_index_is_not_an_index_panic() {
        let c = curriculum(&[("A", &["a1"])]);
        let err = next_topic(&ProgressState::new(0, 4, 0), &c).unwrap_err();
        assert_eq!(
            err,
            CursorError::TopicOutOfRange {
                phase_index: 0,
                topic_index: 4,
                topics: 1
            }
        );
    }

    #[test]
    fn previous_topic_steps_back_across_phases() {
        let c = curriculum(&[("A", &["a1", "a2"]), ("B", &["b1"])]);
        assert_eq!(previous_topic(&ProgressState::default(), &c), None);

        let within = previous_topic(&ProgressState::new(0, 1, 1), &c).expect("previous");
        assert_eq!((within.phase, within.topic), ("A", "a1"));

        let across = previous_topic(&ProgressState::new(1, 0, 2), &c).expect("previous");
        assert_eq!((across.phase, across.topic), ("A", "a2"));

        let last = previous_topic(&ProgressState::new(2, 0, 3), &c).expect("previous");
        assert_eq!((last.phase_index, last.topic_index, last.topic), (1, 0, "b1"));
    }

    #[test]
    fn remaining_topics_counts_from_cursor() {
        let c = curriculum(&[("A", &["a1", "a2", "a3"]), ("B", &["b1", "b2"])]);
        assert_eq!(remaining_topics(&ProgressState::default(), &c), 5);
        assert_eq!(remaining_topics(&ProgressState::new(0, 2, 2), &c), 3);
        assert_eq!(remaining_topics(&ProgressState::new(1, 1, 4), &c), 1);
        assert_eq!(remaining_topics(&ProgressState::new(2, 0, 5), &c), 0);
    }
}
