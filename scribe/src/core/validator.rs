//! Structural quality gate for generated articles.

use serde::{Deserialize, Serialize};

/// Read-only constraints loaded from `constraints.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Constraints {
    pub min_words: usize,
    #[serde(default)]
    pub required_sections: Vec<String>,
}

/// Gate decision for one article.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Pass,
    TooShort { words: usize, min_words: usize },
    MissingSection { section: String },
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Human-readable reason: `OK`, `too short`, or `missing section: {name}`.
    pub fn reason(&self) -> String {
        match self {
            Verdict::Pass => "OK".to_string(),
            Verdict::TooShort { .. } => "too short".to_string(),
            Verdict::MissingSection { section } => format!("missing section: {section}"),
        }
    }
}

/// Count whitespace-delimited tokens.
pub fn word_count(article: &str) -> usize {
    article.split_whitespace().count()
}

/// Check word count first, then each required section in configured order.
pub fn validate(article: &str, constraints: &Constraints) -> Verdict {
    let words = word_count(article);
    if words < constraints.min_words {
        return Verdict::TooShort {
            words,
            min_words: constraints.min_words,
        };
    }
    for section in &constraints.required_sections {
        if !article.contains(section.as_str()) {
            return Verdict::MissingSection {
                section: section.clone(),
            };
        }
    }
    Verdict::Pass
}

#[cfg(test)]
mod tests {
    use super::*;

    fn constraints(min_words: usize, sections: &[&str]) -> Constraints {
        Constraints {
            min_words,
            required_sections: sections.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn short_article_fails_with_too_short() {
        let verdict = validate("only five words right here", &constraints(200, &[]));
        assert_eq!(
            verdict,
            Verdict::TooShort {
                words: 5,
                min_words: 200
            }
        );
        assert_eq!(verdict.reason(), "too short");
        assert!(!verdict.is_pass());
    }

    #[test]
    fn exact_minimum_passes() {
        let verdict = validate("one two\tthree\nfour", &constraints(4, &[]));
        assert_eq!(verdict, Verdict::Pass);
        assert_eq!(verdict.reason(), "OK");
    }

    #[test]
    fn first_missing_section_is_reported_in_order() {
        let article = "## Overview\nbody text\n";
        let verdict = validate(
            article,
            &constraints(0, &["## Overview", "## Tradeoffs", "## Failure Modes"]),
        );
        assert_eq!(verdict.reason(), "missing section: ## Tradeoffs");
    }

    #[test]
    fn sections_match_as_literal_substrings() {
        let article = "intro\n## Tradeoffs and costs\n## Summary\n";
        let verdict = validate(article, &constraints(3, &["## Tradeoffs", "Summary"]));
        assert!(verdict.is_pass());
    }

    #[test]
    fn word_count_checked_before_sections() {
        let verdict = validate("tiny", &constraints(10, &["## Missing"]));
        assert_eq!(verdict.reason(), "too short");
    }
}
