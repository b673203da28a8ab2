//! Site layout and `scribe init` scaffolding.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use tracing::info;

use super::config::{CONFIG_FILE, PathsConfig, ScribeConfig, load_config, write_config};
use super::progress_store::write_progress;
use crate::core::progress::ProgressState;

/// All canonical paths of a site, resolved against its root.
#[derive(Debug, Clone)]
pub struct SitePaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub curriculum_path: PathBuf,
    pub constraints_path: PathBuf,
    pub persona_path: PathBuf,
    pub system_prompt_path: PathBuf,
    pub state_path: PathBuf,
    pub posts_dir: PathBuf,
    /// Private working directory (lock, run logs), ignored by git.
    pub scribe_dir: PathBuf,
    pub lock_path: PathBuf,
    pub runs_dir: PathBuf,
}

impl SitePaths {
    pub fn new(root: impl Into<PathBuf>, paths: &PathsConfig) -> Self {
        let root = root.into();
        let scribe_dir = root.join(".scribe");
        Self {
            config_path: root.join(CONFIG_FILE),
            curriculum_path: root.join(&paths.curriculum),
            constraints_path: root.join(&paths.constraints),
            persona_path: root.join(&paths.persona),
            system_prompt_path: root.join(&paths.system_prompt),
            state_path: root.join(&paths.state),
            posts_dir: root.join(&paths.posts_dir),
            lock_path: scribe_dir.join("run.lock"),
            runs_dir: scribe_dir.join("runs"),
            scribe_dir,
            root,
        }
    }

    /// Create `.scribe/` with its `*` ignore file so nothing under it is
    /// ever staged by `git add -A`. An existing ignore file is left alone.
    pub fn ensure_private_dir(&self) -> Result<()> {
        create_dir(&self.scribe_dir)?;
        write_file(&self.scribe_dir.join(".gitignore"), SCRIBE_GITIGNORE, false)
    }
}

/// Options for `init_site`.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Overwrite existing site files.
    pub force: bool,
}

const SCRIBE_GITIGNORE: &str = "*\n";

const CURRICULUM_TEMPLATE: &str = "\
phases:
  - name: Foundations
    topics:
      - Memory Models
      - Schedulers
      - Event Loops
  - name: Distributed Systems
    topics:
      - Consensus
      - Replication Lag
";

const CONSTRAINTS_TEMPLATE: &str = "\
min_words: 1200
required_sections:
  - \"## Tradeoffs\"
  - \"## Failure Modes\"
  - \"## Conclusion\"
";

const PERSONA_TEMPLATE: &str = "\
You are a senior systems engineer who writes for practitioners. You prefer
concrete mechanisms over slogans, and you say plainly when something is a
tradeoff rather than a best practice.
";

const SYSTEM_PROMPT_TEMPLATE: &str = "\
Write in Markdown with a single top-level heading. Use code blocks only for
code. Cite mechanisms, not vendors.
";

/// Scaffold a site in `root`.
///
/// Existing files are left alone unless `options.force` is set; the progress
/// cursor is only ever reset with `force`.
pub fn init_site(root: &Path, options: &InitOptions) -> Result<SitePaths> {
    if root.exists() && !root.is_dir() {
        return Err(anyhow!("{} exists but is not a directory", root.display()));
    }
    // An existing config decides where the other files live.
    let config = if options.force {
        ScribeConfig::default()
    } else {
        load_config(&root.join(CONFIG_FILE))?
    };
    let paths = SitePaths::new(root, &config.paths);

    create_dir(&paths.posts_dir)?;
    paths.ensure_private_dir()?;

    if options.force || !paths.config_path.exists() {
        write_config(&paths.config_path, &config)?;
    }
    write_file(&paths.curriculum_path, CURRICULUM_TEMPLATE, options.force)?;
    write_file(&paths.constraints_path, CONSTRAINTS_TEMPLATE, options.force)?;
    write_file(&paths.persona_path, PERSONA_TEMPLATE, options.force)?;
    write_file(&paths.system_prompt_path, SYSTEM_PROMPT_TEMPLATE, options.force)?;
    if options.force || !paths.state_path.exists() {
        write_progress(&paths.state_path, &ProgressState::default())?;
    }

    info!(root = %root.display(), "site initialized");
    Ok(paths)
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).with_context(|| format!("create {}", path.display()))
}

fn write_file(path: &Path, contents: &str, overwrite: bool) -> Result<()> {
    if !overwrite && path.exists() {
        return Ok(());
    }
    fs::write(path, contents).with_context(|| format!("write {}", path.display()))
}
