//! Test-only helpers: curriculum builders, scripted collaborators, and a
//! throwaway site fixture.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use anyhow::{Result, anyhow};
use tempfile::TempDir;

use crate::core::curriculum::{Curriculum, Phase};
use crate::core::progress::ProgressState;
use crate::core::validator::Constraints;
use crate::io::agent::GenerationAgent;
use crate::io::config::{CONFIG_FILE, ScribeConfig, write_config};
use crate::io::init::SitePaths;
use crate::io::progress_store::{load_progress, write_progress};
use crate::publish::{PublishReceipt, PublishTarget};

/// Build a curriculum from `(phase, topics)` pairs.
pub fn curriculum(phases: &[(&str, &[&str])]) -> Curriculum {
    Curriculum {
        phases: phases
            .iter()
            .map(|(name, topics)| Phase {
                name: (*name).to_string(),
                topics: topics.iter().map(|topic| (*topic).to_string()).collect(),
            })
            .collect(),
    }
}

/// Initialize a git repo with an identity and one commit.
pub fn init_git_repo(path: &Path) {
    git(path, &["init", "--quiet"]);
    git(path, &["config", "user.email", "scribe@example.com"]);
    git(path, &["config", "user.name", "Scribe Tests"]);
    git(path, &["config", "commit.gpgsign", "false"]);
    fs::write(path.join("README.md"), "site\n").expect("write README");
    git(path, &["add", "README.md"]);
    git(path, &["commit", "--quiet", "-m", "initial"]);
}

/// Run git in `path`, panicking on failure.
pub fn git(path: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(path)
        .output()
        .expect("spawn git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Agent that replays canned results in order and records every prompt.
#[derive(Debug, Default)]
pub struct ScriptedAgent {
    responses: RefCell<VecDeque<Result<String>>>,
    prompts: RefCell<Vec<String>>,
}

impl ScriptedAgent {
    pub fn new<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_results(responses.into_iter().map(|text| Ok(text.into())).collect())
    }

    pub fn from_results(results: Vec<Result<String>>) -> Self {
        Self {
            responses: RefCell::new(results.into()),
            prompts: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.prompts.borrow().len()
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.borrow().clone()
    }
}

impl GenerationAgent for ScriptedAgent {
    fn generate(&self, prompt: &str) -> Result<String> {
        self.prompts.borrow_mut().push(prompt.to_string());
        self.responses
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(anyhow!("scripted agent has no responses left")))
    }
}

/// Publisher that only records commit messages.
///
/// Built with [`RecordingPublisher::watching`], it also snapshots the
/// progress file at publish time.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    state_path: Option<PathBuf>,
    messages: RefCell<Vec<String>>,
    states: RefCell<Vec<Option<ProgressState>>>,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn watching(state_path: &Path) -> Self {
        Self {
            state_path: Some(state_path.to_path_buf()),
            ..Self::default()
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.messages.borrow().clone()
    }

    pub fn observed_states(&self) -> Vec<Option<ProgressState>> {
        self.states.borrow().clone()
    }
}

impl PublishTarget for RecordingPublisher {
    fn publish(&self, message: &str) -> Result<PublishReceipt> {
        self.messages.borrow_mut().push(message.to_string());
        if let Some(path) = &self.state_path {
            self.states.borrow_mut().push(load_progress(path).ok());
        }
        Ok(PublishReceipt {
            committed: true,
            pushed: false,
        })
    }
}

/// Publisher that always fails with a fixed message.
#[derive(Debug)]
pub struct FailingPublisher {
    message: String,
}

impl FailingPublisher {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }
}

impl PublishTarget for FailingPublisher {
    fn publish(&self, _message: &str) -> Result<PublishReceipt> {
        Err(anyhow!("{}", self.message))
    }
}

/// A complete site in a temp directory.
///
/// Constraints default to no word floor and no required sections; the
/// config disables `git push`.
pub struct TestSite {
    temp: TempDir,
    config: ScribeConfig,
    paths: SitePaths,
}

impl TestSite {
    pub fn new(phases: &[(&str, &[&str])]) -> Self {
        let temp = tempfile::tempdir().expect("tempdir");
        let mut config = ScribeConfig::default();
        config.publish.push = false;
        let paths = SitePaths::new(temp.path(), &config.paths);
        write_config(&temp.path().join(CONFIG_FILE), &config).expect("write config");

        let site = Self {
            temp,
            config,
            paths,
        };
        site.write_curriculum(&curriculum(phases));
        site.write_constraints(&Constraints::default());
        fs::write(&site.paths.persona_path, "You are a careful engineer.\n").expect("persona");
        fs::write(&site.paths.system_prompt_path, "Write in Markdown.\n").expect("system");
        site.write_state(ProgressState::default());
        site
    }

    pub fn root(&self) -> &Path {
        self.temp.path()
    }

    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    pub fn config(&self) -> ScribeConfig {
        self.config.clone()
    }

    /// Replace the config on disk (and for [`TestSite::config`]).
    pub fn set_config(&mut self, config: ScribeConfig) {
        write_config(&self.root().join(CONFIG_FILE), &config).expect("write config");
        self.config = config;
    }

    pub fn write_curriculum(&self, curriculum: &Curriculum) {
        let yaml = serde_yaml::to_string(curriculum).expect("curriculum yaml");
        fs::write(&self.paths.curriculum_path, yaml).expect("write curriculum");
    }

    pub fn write_constraints(&self, constraints: &Constraints) {
        let yaml = serde_yaml::to_string(constraints).expect("constraints yaml");
        fs::write(&self.paths.constraints_path, yaml).expect("write constraints");
    }

    pub fn write_state(&self, state: ProgressState) {
        write_progress(&self.paths.state_path, &state).expect("write state");
    }

    pub fn read_state(&self) -> ProgressState {
        load_progress(&self.paths.state_path).expect("read state")
    }

    /// Post file names, sorted.
    pub fn posts(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.paths.posts_dir) else {
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        names
    }
}
