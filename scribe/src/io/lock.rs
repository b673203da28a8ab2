//! Exclusive run lock so two invocations never race on the cursor.

use std::fs::{self, File, OpenOptions};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use fd_lock::{RwLock, RwLockWriteGuard};
use tracing::debug;

/// Advisory lock file (`.scribe/run.lock`).
///
/// The lock is released when the guard returned by [`RunLock::try_acquire`]
/// is dropped, or when the process exits.
pub struct RunLock {
    path: PathBuf,
    inner: RwLock<File>,
}

impl RunLock {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create lock dir {}", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(path)
            .with_context(|| format!("open lock file {}", path.display()))?;
        Ok(Self {
            path: path.to_path_buf(),
            inner: RwLock::new(file),
        })
    }

    /// Take the lock without waiting; fails if another run holds it.
    pub fn try_acquire(&mut self) -> Result<RwLockWriteGuard<'_, File>> {
        match self.inner.try_write() {
            Ok(guard) => {
                debug!(path = %self.path.display(), "run lock acquired");
                Ok(guard)
            }
            Err(err) if err.kind() == ErrorKind::WouldBlock => Err(anyhow!(
                "another run holds {} (refuse to run concurrently)",
                self.path.display()
            )),
            Err(err) => Err(err).with_context(|| format!("lock {}", self.path.display())),
        }
    }
}
