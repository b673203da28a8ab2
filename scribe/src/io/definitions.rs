//! Loaders for the read-only site definitions.
//!
//! Curriculum and constraints are YAML; prompt fragments are plain text read
//! verbatim. Every failure names the file it came from.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::core::curriculum::Curriculum;
use crate::core::prompt::PromptFragments;
use crate::core::validator::Constraints;
use crate::io::init::SitePaths;

/// Everything a run reads but never writes.
#[derive(Debug, Clone)]
pub struct SiteDefinitions {
    pub curriculum: Curriculum,
    pub constraints: Constraints,
    pub fragments: PromptFragments,
}

impl SiteDefinitions {
    pub fn load(paths: &SitePaths) -> Result<Self> {
        Ok(Self {
            curriculum: load_curriculum(&paths.curriculum_path)?,
            constraints: load_constraints(&paths.constraints_path)?,
            fragments: PromptFragments {
                persona: load_text(&paths.persona_path)?,
                system: load_text(&paths.system_prompt_path)?,
            },
        })
    }
}

/// Load and check a curriculum definition.
pub fn load_curriculum(path: &Path) -> Result<Curriculum> {
    let curriculum: Curriculum = load_yaml(path)?;
    let errors = curriculum.invariant_errors();
    if !errors.is_empty() {
        bail!(
            "invalid curriculum {}:\n- {}",
            path.display(),
            errors.join("\n- ")
        );
    }
    debug!(
        path = %path.display(),
        phases = curriculum.phases.len(),
        topics = curriculum.total_topics(),
        "curriculum loaded"
    );
    Ok(curriculum)
}

pub fn load_constraints(path: &Path) -> Result<Constraints> {
    let constraints: Constraints = load_yaml(path)?;
    debug!(
        path = %path.display(),
        min_words = constraints.min_words,
        sections = constraints.required_sections.len(),
        "constraints loaded"
    );
    Ok(constraints)
}

pub fn load_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("read {}", path.display()))
}

fn load_yaml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = load_text(path)?;
    serde_yaml::from_str(&contents).with_context(|| format!("parse {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_curriculum_yaml() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("curriculum.yaml");
        fs::write(
            &path,
            "phases:\n  - name: Foundations\n    topics:\n      - Memory Models\n      - Schedulers\n",
        )
        .expect("write");

        let curriculum = load_curriculum(&path).expect("load");
        assert_eq!(curriculum.phases[0].name, "Foundations");
        assert_eq!(curriculum.phases[0].topics, vec!["Memory Models", "Schedulers"]);
    }

    #[test]
    fn rejects_phase_without_topics() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("curriculum.yaml");
        fs::write(&path, "phases:\n  - name: Empty\n    topics: []\n").expect("write");

        let err = load_curriculum(&path).unwrap_err();
        assert!(err.to_string().contains("at least one topic"));
    }

    #[test]
    fn loads_constraints_with_optional_sections() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("constraints.yaml");
        fs::write(&path, "min_words: 800\n").expect("write");

        let constraints = load_constraints(&path).expect("load");
        assert_eq!(constraints.min_words, 800);
        assert!(constraints.required_sections.is_empty());
    }

    #[test]
    fn missing_file_error_names_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("constraints.yaml");
        let err = load_constraints(&path).unwrap_err();
        assert!(err.to_string().contains("constraints.yaml"));
    }

    #[test]
    fn malformed_yaml_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("constraints.yaml");
        fs::write(&path, "min_words: [not a number\n").expect("write");
        let err = load_constraints(&path).unwrap_err();
        assert!(err.to_string().contains("parse"));
    }
}
