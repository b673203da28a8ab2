//! Publisher: render the post, write it, advance the cursor, publish.
//!
//! Ordering matters. The post file and the advanced cursor are on disk
//! before the publish target runs, so a failed commit or push leaves the
//! local site ahead of the remote. `scribe sync` (see [`sync_pending`])
//! re-runs the publish step without touching the cursor.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDate;
use tracing::{debug, info, instrument};

use crate::core::curriculum::Curriculum;
use crate::core::navigator::{Selection, advance, previous_topic};
use crate::core::post::{PostHeader, post_filename, render_post};
use crate::core::progress::ProgressState;
use crate::io::atomic::write_atomic;
use crate::io::config::PublishConfig;
use crate::io::git::Git;
use crate::io::init::SitePaths;
use crate::io::lock::RunLock;
use crate::io::definitions::load_curriculum;
use crate::io::progress_store::{load_progress, write_progress};
use crate::outcome::{Stage, StageError};

/// What the publish target did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PublishReceipt {
    pub committed: bool,
    pub pushed: bool,
}

/// Durable, visible publication of the site's pending changes.
pub trait PublishTarget {
    /// Record everything pending under `message` and make it visible.
    fn publish(&self, message: &str) -> Result<PublishReceipt>;
}

/// Publishes by staging everything, committing, and pushing with git.
#[derive(Debug, Clone)]
pub struct GitPublisher {
    git: Git,
    config: PublishConfig,
}

impl GitPublisher {
    pub fn new(root: &Path, config: &PublishConfig) -> Self {
        Self {
            git: Git::new(root),
            config: config.clone(),
        }
    }
}

impl PublishTarget for GitPublisher {
    #[instrument(skip_all, fields(workdir = %self.git.workdir().display()))]
    fn publish(&self, message: &str) -> Result<PublishReceipt> {
        if !self.config.enabled {
            info!("publishing disabled, leaving changes uncommitted");
            return Ok(PublishReceipt::default());
        }
        self.git.add_all().context("stage changes")?;
        let committed = self.git.commit_staged(message).context("commit")?;
        if committed {
            debug!(sha = %self.git.head_short_sha()?, "committed");
        }
        let pushed = if self.config.push {
            self.git
                .push(self.config.remote.as_deref(), self.config.branch.as_deref())
                .context("push")?;
            true
        } else {
            false
        };
        Ok(PublishReceipt { committed, pushed })
    }
}

/// A post that made it through the whole publish sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub phase: String,
    pub topic: String,
    pub path: PathBuf,
    /// Cursor after this post.
    pub state: ProgressState,
    pub receipt: PublishReceipt,
}

/// Inputs for [`publish_post`].
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
    pub paths: &'a SitePaths,
    pub config: &'a PublishConfig,
    pub curriculum: &'a Curriculum,
    pub state: &'a ProgressState,
    pub selection: &'a Selection<'a>,
    /// Validated article body.
    pub article: &'a str,
    pub date: NaiveDate,
}

/// Write the post, advance and persist the cursor, then publish.
pub fn publish_post<P: PublishTarget + ?Sized>(
    request: &PublishRequest<'_>,
    target: &P,
) -> Result<PublishedPost, StageError> {
    let selection = request.selection;
    let path = request
        .paths
        .posts_dir
        .join(post_filename(request.date, selection.topic));
    if path.exists() {
        return Err(StageError::new(
            Stage::Write,
            anyhow!("refuse to overwrite existing post {}", path.display()),
        ));
    }
    let header = PostHeader::new(selection.phase, selection.topic, request.date);
    write_atomic(&path, &render_post(&header, request.article))
        .with_context(|| format!("write post {}", path.display()))
        .map_err(StageError::at(Stage::Write))?;
    info!(path = %path.display(), "post written");

    let next = advance(request.state, request.curriculum).map_err(StageError::at(Stage::Persist))?;
    write_progress(&request.paths.state_path, &next).map_err(StageError::at(Stage::Persist))?;
    info!(
        current_phase = next.current_phase,
        current_topic_index = next.current_topic_index,
        total_posts = next.total_posts,
        "progress advanced"
    );

    let receipt = target
        .publish(&request.config.commit_message(selection.topic))
        .with_context(|| {
            format!(
                "post {} and advanced cursor are saved locally; run `scribe sync` to retry publishing",
                path.display()
            )
        })
        .map_err(StageError::at(Stage::Publish))?;

    Ok(PublishedPost {
        phase: selection.phase.to_string(),
        topic: selection.topic.to_string(),
        path,
        state: next,
        receipt,
    })
}

/// Re-run the publish step for whatever is pending in the site.
///
/// The commit message names the topic the cursor last moved past, which is
/// the post a failed publish left behind.
pub fn sync_pending<P: PublishTarget + ?Sized>(
    paths: &SitePaths,
    config: &PublishConfig,
    target: &P,
) -> Result<PublishReceipt> {
    paths.ensure_private_dir()?;
    let mut lock = RunLock::open(&paths.lock_path)?;
    let _guard = lock.try_acquire()?;
    let curriculum = load_curriculum(&paths.curriculum_path)?;
    let state = load_progress(&paths.state_path)?;
    let message = match previous_topic(&state, &curriculum) {
        Some(selection) => config.commit_message(selection.topic),
        None => format!("{}: sync pending changes", config.commit_prefix),
    };
    let receipt = target.publish(&message)?;
    info!(
        committed = receipt.committed,
        pushed = receipt.pushed,
        "sync finished"
    );
    Ok(receipt)
}
