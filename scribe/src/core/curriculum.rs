//! Curriculum definition: ordered phases, each with ordered topics.

use serde::{Deserialize, Serialize};

/// A named, ordered group of topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub topics: Vec<String>,
}

/// Read-only curriculum loaded from `curriculum.yaml`.
///
/// Topic order is significant: the progress cursor indexes into it, so
/// reordering topics between runs shifts what gets published next.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Curriculum {
    pub phases: Vec<Phase>,
}

impl Curriculum {
    /// Number of topics across all phases.
    pub fn total_topics(&self) -> usize {
        self.phases.iter().map(|phase| phase.topics.len()).sum()
    }

    /// Check structural invariants. Returns one message per violation.
    pub fn invariant_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.phases.is_empty() {
            errors.push("curriculum must contain at least one phase".to_string());
        }
        for (idx, phase) in self.phases.iter().enumerate() {
            if phase.name.trim().is_empty() {
                errors.push(format!("phase {idx}: name must not be blank"));
            }
            if phase.topics.is_empty() {
                errors.push(format!("phase '{}': must contain at least one topic", phase.name));
            }
            for (topic_idx, topic) in phase.topics.iter().enumerate() {
                if topic.trim().is_empty() {
                    errors.push(format!(
                        "phase '{}': topic {topic_idx} must not be blank",
                        phase.name
                    ));
                } else if topic.contains(['/', '\\']) {
                    // Topics become post file names.
                    errors.push(format!(
                        "phase '{}': topic '{topic}' must not contain path separators",
                        phase.name
                    ));
                }
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::curriculum;

    #[test]
    fn total_topics_sums_all_phases() {
        let c = curriculum(&[("A", &["one", "two"]), ("B", &["three"])]);
        assert_eq!(c.total_topics(), 3);
    }

    #[test]
    fn valid_curriculum_has_no_errors() {
        let c = curriculum(&[("Foundations", &["Memory Models", "Schedulers"])]);
        assert!(c.invariant_errors().is_empty());
    }

    #[test]
    fn invariant_errors_report_each_violation() {
        let c = Curriculum {
            phases: vec![
                Phase {
                    name: " ".to_string(),
                    topics: vec!["ok".to_string()],
                },
                Phase {
                    name: "Empty".to_string(),
                    topics: Vec::new(),
                },
                Phase {
                    name: "Paths".to_string(),
                    topics: vec!["io/uring".to_string(), "".to_string()],
                },
            ],
        };

        let errors = c.invariant_errors();
        assert!(errors.iter().any(|e| e.contains("name must not be blank")));
        assert!(errors.iter().any(|e| e.contains("at least one topic")));
        assert!(errors.iter().any(|e| e.contains("path separators")));
        assert!(errors.iter().any(|e| e.contains("topic 1 must not be blank")));
    }

    #[test]
    fn empty_curriculum_is_rejected() {
        let c = Curriculum { phases: Vec::new() };
        assert_eq!(
            c.invariant_errors(),
            vec!["curriculum must contain at least one phase".to_string()]
        );
    }
}
