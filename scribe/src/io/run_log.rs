//! Per-run artifacts under `.scribe/runs/<run-id>/`.
//!
//! These are diagnostics for humans: the draft, the revised article, and a
//! summary of how the run ended. They are never read back by the pipeline.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::core::post::post_filename;
use chrono::NaiveDate;

pub const DRAFT_FILE: &str = "draft.md";
pub const ARTICLE_FILE: &str = "article.md";
pub const OUTCOME_FILE: &str = "outcome.json";

/// Summary written to `outcome.json`.
#[derive(Debug, Clone, Serialize)]
pub struct RunRecord {
    pub run_id: String,
    pub phase: String,
    pub topic: String,
    /// `published`, `rejected` or `failed`.
    pub outcome: String,
    pub reason: String,
    pub post_path: Option<PathBuf>,
    pub duration_ms: u64,
}

/// Directory holding one run's artifacts.
#[derive(Debug, Clone)]
pub struct RunLog {
    run_id: String,
    dir: PathBuf,
}

impl RunLog {
    /// Create a fresh directory named after the date and topic.
    ///
    /// Repeat runs for the same topic on the same day get a numeric suffix.
    pub fn create(runs_dir: &Path, date: NaiveDate, topic: &str) -> Result<Self> {
        let base = post_filename(date, topic)
            .trim_end_matches(".md")
            .to_string();
        let mut run_id = base.clone();
        let mut attempt = 1;
        while runs_dir.join(&run_id).exists() {
            attempt += 1;
            run_id = format!("{base}-{attempt}");
        }
        let dir = runs_dir.join(&run_id);
        fs::create_dir_all(&dir)
            .with_context(|| format!("create run log dir {}", dir.display()))?;
        Ok(Self { run_id, dir })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn write_text(&self, name: &str, contents: &str) -> Result<()> {
        let path = self.dir.join(name);
        fs::write(&path, contents).with_context(|| format!("write {}", path.display()))
    }

    pub fn write_record(&self, record: &RunRecord) -> Result<()> {
        let mut buf = serde_json::to_string_pretty(record).context("serialize run record")?;
        buf.push('\n');
        self.write_text(OUTCOME_FILE, &buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_runs_get_distinct_directories() {
        let temp = tempfile::tempdir().expect("tempdir");
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).expect("date");

        let first = RunLog::create(temp.path(), date, "Memory Models").expect("first");
        let second = RunLog::create(temp.path(), date, "Memory Models").expect("second");

        assert_eq!(first.run_id(), "2026-05-01-memory-models");
        assert_eq!(second.run_id(), "2026-05-01-memory-models-2");
        assert!(second.dir().is_dir());
    }

    #[test]
    fn writes_record_as_json() {
        let temp = tempfile::tempdir().expect("tempdir");
        let date = NaiveDate::from_ymd_opt(2026, 5, 1).expect("date");
        let log = RunLog::create(temp.path(), date, "Schedulers").expect("create");

        log.write_record(&RunRecord {
            run_id: log.run_id().to_string(),
            phase: "Foundations".to_string(),
            topic: "Schedulers".to_string(),
            outcome: "rejected".to_string(),
            reason: "too short".to_string(),
            post_path: None,
            duration_ms: 12,
        })
        .expect("write");

        let raw = fs::read_to_string(log.dir().join(OUTCOME_FILE)).expect("read");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["outcome"], "rejected");
        assert_eq!(value["reason"], "too short");
    }
}
