//! Run controller for a single `scribe run`.
//!
//! One invocation publishes at most one post. Every stage reports failure as
//! a [`StageError`]; [`Pipeline::run`] folds them into a [`RunOutcome`] so no
//! error escapes to the caller.

use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use tracing::{info, info_span, warn};

use crate::core::navigator::{CursorError, next_topic};
use crate::core::prompt::PromptCompositor;
use crate::core::validator::validate;
use crate::io::agent::{CommandAgent, GenerationAgent, RetryPolicy, generate_with_retry};
use crate::io::config::{CONFIG_FILE, ScribeConfig, load_config};
use crate::io::definitions::SiteDefinitions;
use crate::io::init::SitePaths;
use crate::io::lock::RunLock;
use crate::io::progress_store::load_progress;
use crate::io::run_log::{ARTICLE_FILE, DRAFT_FILE, RunLog, RunRecord};
use crate::outcome::{RunOutcome, Stage, StageError};
use crate::publish::{GitPublisher, PublishRequest, PublishTarget, publish_post};

/// Sequences one run against a site.
pub struct Pipeline<'a, A: ?Sized, P: ?Sized> {
    paths: SitePaths,
    config: ScribeConfig,
    agent: &'a A,
    publisher: &'a P,
}

impl<'a, A, P> Pipeline<'a, A, P>
where
    A: GenerationAgent + ?Sized,
    P: PublishTarget + ?Sized,
{
    pub fn new(root: &Path, config: ScribeConfig, agent: &'a A, publisher: &'a P) -> Self {
        Self {
            paths: SitePaths::new(root, &config.paths),
            config,
            agent,
            publisher,
        }
    }

    pub fn paths(&self) -> &SitePaths {
        &self.paths
    }

    /// Run the whole sequence once and report how it ended.
    ///
    /// Failures are logged and returned as [`RunOutcome::Failed`]; nothing
    /// partially completed is rolled back.
    pub fn run(&self, today: NaiveDate) -> RunOutcome {
        let span = info_span!("run", root = %self.paths.root.display(), %today);
        let _enter = span.enter();
        let start = Instant::now();

        if let Err(err) = self.paths.ensure_private_dir() {
            return finish(RunOutcome::Failed(StageError::new(Stage::Lock, err)));
        }
        let mut lock = match RunLock::open(&self.paths.lock_path) {
            Ok(lock) => lock,
            Err(err) => return finish(RunOutcome::Failed(StageError::new(Stage::Lock, err))),
        };
        let _guard = match lock.try_acquire() {
            Ok(guard) => guard,
            Err(err) => return finish(RunOutcome::Failed(StageError::new(Stage::Lock, err))),
        };

        let mut ctx = RunContext::default();
        let outcome = self
            .run_locked(today, &mut ctx)
            .unwrap_or_else(RunOutcome::Failed);
        let outcome = finish(outcome);
        ctx.write_record(&outcome, start.elapsed());
        outcome
    }

    fn run_locked(&self, today: NaiveDate, ctx: &mut RunContext) -> Result<RunOutcome, StageError> {
        let definitions = SiteDefinitions::load(&self.paths).map_err(StageError::at(Stage::Config))?;
        let state = load_progress(&self.paths.state_path).map_err(StageError::at(Stage::Config))?;
        if let Some(problem) = state.consistency_error(&definitions.curriculum) {
            return Err(StageError::new(
                Stage::Config,
                anyhow!("{problem} in {}", self.paths.state_path.display()),
            ));
        }

        let curriculum = &definitions.curriculum;
        let selection = match next_topic(&state, curriculum) {
            Ok(selection) => selection,
            Err(CursorError::CurriculumExhausted { .. }) => {
                return Ok(RunOutcome::CurriculumComplete {
                    total_posts: state.total_posts,
                });
            }
            Err(err) => return Err(StageError::new(Stage::Select, err)),
        };
        info!(
            phase = selection.phase,
            topic = selection.topic,
            total_posts = state.total_posts,
            "topic selected"
        );
        ctx.begin(&self.paths.runs_dir, today, selection.phase, selection.topic);

        let compositor = PromptCompositor::new(&definitions.fragments, &definitions.constraints)
            .map_err(StageError::at(Stage::Prompt))?;
        let policy = RetryPolicy::from_config(&self.config.agent);

        let draft_prompt = compositor
            .draft(&selection)
            .map_err(StageError::at(Stage::Prompt))?;
        let draft = generate_with_retry(self.agent, &draft_prompt, policy, "draft")
            .map_err(StageError::at(Stage::Draft))?;
        ctx.artifact(DRAFT_FILE, &draft);

        let critique_prompt = compositor
            .critique(&selection, &draft)
            .map_err(StageError::at(Stage::Prompt))?;
        let article = generate_with_retry(self.agent, &critique_prompt, policy, "critique")
            .map_err(StageError::at(Stage::Critique))?;
        ctx.artifact(ARTICLE_FILE, &article);

        let verdict = validate(&article, &definitions.constraints);
        if !verdict.is_pass() {
            return Ok(RunOutcome::Rejected {
                phase: selection.phase.to_string(),
                topic: selection.topic.to_string(),
                verdict,
            });
        }

        let post = publish_post(
            &PublishRequest {
                paths: &self.paths,
                config: &self.config.publish,
                curriculum,
                state: &state,
                selection: &selection,
                article: &article,
                date: today,
            },
            self.publisher,
        )?;
        Ok(RunOutcome::Published(post))
    }
}

fn finish(outcome: RunOutcome) -> RunOutcome {
    outcome.log();
    outcome
}

/// Run-log bookkeeping; only populated once a topic is selected.
#[derive(Debug, Default)]
struct RunContext {
    log: Option<RunLog>,
    phase: String,
    topic: String,
}

impl RunContext {
    fn begin(&mut self, runs_dir: &Path, today: NaiveDate, phase: &str, topic: &str) {
        self.phase = phase.to_string();
        self.topic = topic.to_string();
        match RunLog::create(runs_dir, today, topic) {
            Ok(log) => {
                info!(run_id = log.run_id(), "run log created");
                self.log = Some(log);
            }
            Err(err) => warn!(error = %format!("{err:#}"), "run log unavailable"),
        }
    }

    fn artifact(&self, name: &str, contents: &str) {
        let Some(log) = &self.log else {
            return;
        };
        if let Err(err) = log.write_text(name, contents) {
            warn!(name, error = %format!("{err:#}"), "failed to save run artifact");
        }
    }

    fn write_record(&self, outcome: &RunOutcome, elapsed: Duration) {
        let Some(log) = &self.log else {
            return;
        };
        let (reason, post_path) = match outcome {
            RunOutcome::Published(post) => ("OK".to_string(), Some(post.path.clone())),
            RunOutcome::CurriculumComplete { .. } => ("curriculum completed".to_string(), None),
            RunOutcome::Rejected { verdict, .. } => (verdict.reason(), None),
            RunOutcome::Failed(err) => (err.to_string(), None),
        };
        let record = RunRecord {
            run_id: log.run_id().to_string(),
            phase: self.phase.clone(),
            topic: self.topic.clone(),
            outcome: outcome.label().to_string(),
            reason,
            post_path,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
        };
        if let Err(err) = log.write_record(&record) {
            warn!(error = %format!("{err:#}"), "failed to write run record");
        }
    }
}

/// Run the pipeline for the site at `root` with the configured agent and
/// git publisher.
pub fn run_site(root: &Path, today: NaiveDate) -> RunOutcome {
    let config = match load_config(&root.join(CONFIG_FILE))
        .with_context(|| format!("load site config in {}", root.display()))
    {
        Ok(config) => config,
        Err(err) => {
            return finish(RunOutcome::Failed(StageError::new(Stage::Config, err)));
        }
    };
    let agent = CommandAgent::from_config(&config.agent);
    let publisher = GitPublisher::new(root, &config.publish);
    Pipeline::new(root, config, &agent, &publisher).run(today)
}

/// Load the site config and return it with the resolved paths.
pub fn load_site(root: &Path) -> Result<(ScribeConfig, SitePaths)> {
    let config = load_config(&root.join(CONFIG_FILE))?;
    let paths = SitePaths::new(root, &config.paths);
    Ok((config, paths))
}
