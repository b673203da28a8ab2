//! Site configuration stored in `scribe.toml`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};

use super::atomic::write_atomic;

/// File name of the site configuration, relative to the site root.
pub const CONFIG_FILE: &str = "scribe.toml";

/// Site configuration (TOML).
///
/// Intended to be edited by humans. Missing fields default to the layout
/// produced by `scribe init`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ScribeConfig {
    pub paths: PathsConfig,
    pub agent: AgentConfig,
    pub publish: PublishConfig,
    pub logging: LoggingConfig,
}

/// Locations of site files, relative to the site root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PathsConfig {
    pub curriculum: PathBuf,
    pub constraints: PathBuf,
    /// Persona/voice fragment.
    pub persona: PathBuf,
    pub system_prompt: PathBuf,
    /// Durable progress cursor.
    pub state: PathBuf,
    pub posts_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            curriculum: PathBuf::from("curriculum.yaml"),
            constraints: PathBuf::from("constraints.yaml"),
            persona: PathBuf::from("soul.md"),
            system_prompt: PathBuf::from("system_prompt.txt"),
            state: PathBuf::from("state.json"),
            posts_dir: PathBuf::from("posts"),
        }
    }
}

/// How the prompt reaches the agent process.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PromptMode {
    /// Appended as the final command-line argument.
    Argument,
    /// Written to the child's stdin.
    Stdin,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AgentConfig {
    /// Command to execute for generation (e.g. `["openclaw"]`).
    pub command: Vec<String>,
    pub prompt_mode: PromptMode,
    /// Wall-clock limit for a single generation call.
    pub timeout_secs: u64,
    /// Truncate captured stdout/stderr beyond this many bytes.
    pub output_limit_bytes: usize,
    /// Attempts per pass; 1 disables retry.
    pub max_attempts: u32,
    /// Delay before the first retry, doubled for each later one.
    pub retry_backoff_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            command: vec!["openclaw".to_string()],
            prompt_mode: PromptMode::Argument,
            timeout_secs: 30 * 60,
            output_limit_bytes: 1_000_000,
            max_attempts: 1,
            retry_backoff_secs: 5,
        }
    }
}

impl AgentConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_secs(self.retry_backoff_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PublishConfig {
    /// Commit published posts to git.
    pub enabled: bool,
    /// Push after committing.
    pub push: bool,
    pub remote: Option<String>,
    pub branch: Option<String>,
    pub commit_prefix: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            push: true,
            remote: None,
            branch: None,
            commit_prefix: "Daily Post".to_string(),
        }
    }
}

impl PublishConfig {
    pub fn commit_message(&self, topic: &str) -> String {
        format!("{}: {topic}", self.commit_prefix)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Also append log lines to this file (relative to the site root).
    pub file: Option<PathBuf>,
}

impl ScribeConfig {
    pub fn validate(&self) -> Result<()> {
        if self.agent.command.is_empty() || self.agent.command[0].trim().is_empty() {
            return Err(anyhow!("agent.command must be a non-empty array"));
        }
        if self.agent.timeout_secs == 0 {
            return Err(anyhow!("agent.timeout_secs must be > 0"));
        }
        if self.agent.output_limit_bytes == 0 {
            return Err(anyhow!("agent.output_limit_bytes must be > 0"));
        }
        if self.agent.max_attempts == 0 {
            return Err(anyhow!("agent.max_attempts must be >= 1"));
        }
        if self.publish.remote.is_none() && self.publish.branch.is_some() {
            return Err(anyhow!("publish.branch requires publish.remote"));
        }
        Ok(())
    }
}

/// Load config from a TOML file.
///
/// If the file is missing, returns `ScribeConfig::default()`.
pub fn load_config(path: &Path) -> Result<ScribeConfig> {
    if !path.exists() {
        let cfg = ScribeConfig::default();
        cfg.validate()?;
        return Ok(cfg);
    }
    let contents = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
    let cfg: ScribeConfig =
        toml::from_str(&contents).with_context(|| format!("parse {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid {}", path.display()))?;
    Ok(cfg)
}

/// Atomically write config to disk.
pub fn write_config(path: &Path, cfg: &ScribeConfig) -> Result<()> {
    cfg.validate()?;
    let mut buf = toml::to_string_pretty(cfg).context("serialize config toml")?;
    buf.push('\n');
    write_atomic(path, &buf)
}
