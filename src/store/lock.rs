//! Cross-process lock file
//!
//! Created with `create_new` (O_CREAT | O_EXCL), so exactly one process can
//! hold it. A lock whose mtime is older than the timeout is treated as left
//! behind by a crashed holder and removed by the next waiter. The file is
//! deleted when the guard drops.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::models::errors::{AppError, AppResult};

#[derive(Debug)]
pub struct LockFile {
    path: PathBuf,
}

impl LockFile {
    /// Acquire the lock, polling every `poll` until `timeout` elapses
    pub async fn acquire(path: impl Into<PathBuf>, timeout: Duration, poll: Duration) -> AppResult<Self> {
        let path = path.into();
        let start = Instant::now();

        loop {
            match tokio::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(mut file) => {
                    let _ = file.write_all(std::process::id().to_string().as_bytes()).await;
                    debug!("🔒 Acquired {}", path.display());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    if is_stale(&path, timeout).await {
                        warn!("🔓 Breaking stale lock {}", path.display());
                        if tokio::fs::remove_file(&path).await.is_ok() {
                            continue;
                        }
                    }
                    if start.elapsed() >= timeout {
                        return Err(AppError::lock_timeout(format!(
                            "{} still held after {:?}",
                            path.display(),
                            timeout
                        )));
                    }
                    tokio::time::sleep(poll).await;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for LockFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

/// Lock last modified longer ago than `timeout`
async fn is_stale(path: &Path, timeout: Duration) -> bool {
    let Ok(meta) = tokio::fs::metadata(path).await else {
        return false;
    };
    meta.modified()
        .ok()
        .and_then(|mtime| SystemTime::now().duration_since(mtime).ok())
        .is_some_and(|age| age > timeout)
}
