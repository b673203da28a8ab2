//! Progress cursor storage (`state.json`).

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

use super::atomic::write_atomic;
use crate::core::progress::ProgressState;

/// Load progress state from disk.
pub fn load_progress(path: &Path) -> Result<ProgressState> {
    debug!(path = %path.display(), "loading progress state");
    let contents = fs::read_to_string(path)
        .with_context(|| format!("read progress state {}", path.display()))?;
    let state: ProgressState = serde_json::from_str(&contents)
        .with_context(|| format!("parse progress state {}", path.display()))?;
    debug!(
        current_phase = state.current_phase,
        current_topic_index = state.current_topic_index,
        total_posts = state.total_posts,
        "progress state loaded"
    );
    Ok(state)
}

/// Atomically write progress state to disk (temp file + rename).
pub fn write_progress(path: &Path, state: &ProgressState) -> Result<()> {
    debug!(
        path = %path.display(),
        current_phase = state.current_phase,
        current_topic_index = state.current_topic_index,
        total_posts = state.total_posts,
        "writing progress state"
    );
    let mut buf = serde_json::to_string_pretty(state).context("serialize progress state")?;
    buf.push('\n');
    write_atomic(path, &buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_round_trips() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("state.json");
        let state = ProgressState::new(2, 3, 17);

        write_progress(&path, &state).expect("write");
        assert_eq!(load_progress(&path).expect("load"), state);
    }

    /// Guards the on-disk format shared with hand-edited state files.
    #[test]
    fn default_state_serializes_to_known_json() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("state.json");

        write_progress(&path, &ProgressState::default()).expect("write");
        let contents = fs::read_to_string(&path).expect("read");
        let expected =
            "{\n  \"current_phase\": 0,\n  \"current_topic_index\": 0,\n  \"total_posts\": 0\n}\n";
        assert_eq!(contents, expected);
    }

    #[test]
    fn missing_state_is_an_error() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = load_progress(&temp.path().join("state.json")).unwrap_err();
        assert!(err.to_string().contains("read progress state"));
    }
}
