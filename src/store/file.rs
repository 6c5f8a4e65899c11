//! File-backed dominance store
//!
//! Layout: one `<key>.json` file per token under the store directory, holding
//! the history as a JSON array of `{ts, val}`. Writes go to `<key>.json.tmp`
//! and are renamed into place.
//!
//! Mutual exclusion is per key at two levels: an in-process async mutex and a
//! `<key>.lock` file for other processes. If the lock file cannot be acquired
//! in time the update proceeds without it.

use async_trait::async_trait;
use dashmap::DashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{error, warn};

use super::lock::LockFile;
use super::{push_bounded, Appended, DominanceStore};
use crate::models::config::DominanceConfig;
use crate::models::errors::AppResult;
use crate::models::types::DominanceSample;

pub struct FileStore {
    dir: PathBuf,
    lock_timeout: Duration,
    lock_poll: Duration,
    key_locks: DashMap<String, Arc<Mutex<()>>>,
}

/// Held for the duration of one read-modify-write
struct KeyGuard {
    _local: OwnedMutexGuard<()>,
    _file: Option<LockFile>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, lock_timeout: Duration, lock_poll: Duration) -> Self {
        Self {
            dir: dir.into(),
            lock_timeout,
            lock_poll,
            key_locks: DashMap::new(),
        }
    }

    pub fn from_config(config: &DominanceConfig) -> Self {
        Self::new(config.store_dir.clone(), config.lock_timeout, config.lock_poll)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// History file for a key
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", file_stem(key)))
    }

    fn lock_path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.lock", file_stem(key)))
    }

    /// Drop the in-process mutex of a key nobody is holding or waiting on
    fn forget_idle(&self, key: &str) {
        self.key_locks.remove_if(key, |_, lock| Arc::strong_count(lock) == 1);
    }

    async fn lock(&self, key: &str) -> KeyGuard {
        let local = self.key_locks.entry(key.to_string()).or_default().clone();
        let local = local.lock_owned().await;

        if let Err(e) = tokio::fs::create_dir_all(&self.dir).await {
            warn!("⚠️ Cannot create store dir {}: {}", self.dir.display(), e);
        }

        let file = match LockFile::acquire(self.lock_path_for(key), self.lock_timeout, self.lock_poll).await {
            Ok(lock) => Some(lock),
            Err(e) => {
                warn!("⏳ Dominance lock for {} not acquired, proceeding unlocked: {}", key, e);
                None
            }
        };

        KeyGuard {
            _local: local,
            _file: file,
        }
    }

    /// Stored history; missing or corrupt files read as empty
    async fn read_history(&self, path: &Path) -> Vec<DominanceSample> {
        let bytes = match tokio::fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!("⚠️ Cannot read {}: {}", path.display(), e);
                return Vec::new();
            }
        };

        serde_json::from_slice(&bytes).unwrap_or_else(|e| {
            warn!("⚠️ Corrupt dominance history {}, starting fresh: {}", path.display(), e);
            Vec::new()
        })
    }

    async fn write_history(&self, path: &Path, history: &[DominanceSample]) -> AppResult<()> {
        let tmp = path.with_extension("json.tmp");
        let body = serde_json::to_vec_pretty(history)?;
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl DominanceStore for FileStore {
    async fn get(&self, key: &str) -> Vec<DominanceSample> {
        self.read_history(&self.path_for(key)).await
    }

    async fn append(&self, key: &str, sample: DominanceSample, limit: usize) -> Appended {
        let guard = self.lock(key).await;
        let path = self.path_for(key);

        let mut history = self.read_history(&path).await;
        push_bounded(&mut history, sample, limit);

        let durable = match self.write_history(&path, &history).await {
            Ok(()) => true,
            Err(e) => {
                error!("💾 Dominance save failed for {}: {}", key, e);
                false
            }
        };

        drop(guard);
        self.forget_idle(key);
        Appended { history, durable }
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &[DominanceSample],
        next: Vec<DominanceSample>,
    ) -> bool {
        let guard = self.lock(key).await;
        let path = self.path_for(key);

        let swapped = if self.read_history(&path).await.as_slice() != expected {
            false
        } else {
            match self.write_history(&path, &next).await {
                Ok(()) => true,
                Err(e) => {
                    error!("💾 Dominance save failed for {}: {}", key, e);
                    false
                }
            }
        };

        drop(guard);
        self.forget_idle(key);
        swapped
    }
}

/// Filesystem-safe name for a key
fn file_stem(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINT: &str = "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263";

    fn store(dir: &Path) -> FileStore {
        FileStore::new(dir, Duration::from_secs(5), Duration::from_millis(10))
    }

    fn sample(ts: i64, val: f64) -> DominanceSample {
        DominanceSample { ts, val }
    }

    #[tokio::test]
    async fn test_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();

        let first = store(dir.path());
        first.append(MINT, sample(1, 10.0), 10).await;
        let appended = first.append(MINT, sample(2, 12.5), 10).await;
        assert!(appended.durable);

        let second = store(dir.path());
        assert_eq!(second.get(MINT).await, vec![sample(1, 10.0), sample(2, 12.5)]);

        // lock and temp files are cleaned up
        assert!(!dir.path().join(format!("{}.lock", MINT)).exists());
        assert!(!dir.path().join(format!("{}.json.tmp", MINT)).exists());
    }

    #[tokio::test]
    async fn test_history_is_bounded() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        for i in 0..12 {
            store.append(MINT, sample(i, i as f64), 10).await;
        }

        let history = store.get(MINT).await;
        assert_eq!(history.len(), 10);
        assert_eq!(history[0], sample(2, 2.0));
        assert_eq!(history[9], sample(11, 11.0));
    }

    #[tokio::test]
    async fn test_corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        std::fs::write(store.path_for(MINT), "{not json").unwrap();

        assert!(store.get(MINT).await.is_empty());

        let appended = store.append(MINT, sample(5, 7.0), 10).await;
        assert_eq!(appended.history, vec![sample(5, 7.0)]);
        assert!(appended.durable);
    }

    #[tokio::test]
    async fn test_write_failure_still_returns_history() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "file").unwrap();

        let store = FileStore::new(&blocker, Duration::from_millis(50), Duration::from_millis(10));
        let appended = store.append(MINT, sample(1, 3.0), 10).await;

        assert!(!appended.durable);
        assert_eq!(appended.history, vec![sample(1, 3.0)]);
    }

    #[tokio::test]
    async fn test_held_lock_times_out_and_proceeds() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path(), Duration::from_millis(100), Duration::from_millis(10));
        std::fs::create_dir(dir.path().join(format!("{}.lock", MINT))).unwrap();

        let appended = store.append(MINT, sample(1, 4.0), 10).await;
        assert!(appended.durable);
        assert_eq!(store.get(MINT).await, vec![sample(1, 4.0)]);
    }

    #[tokio::test]
    async fn test_compare_and_swap() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store.append(MINT, sample(1, 1.0), 10).await;

        assert!(!store.compare_and_swap(MINT, &[], vec![]).await);
        assert!(store.compare_and_swap(MINT, &[sample(1, 1.0)], vec![sample(2, 2.0)]).await);
        assert_eq!(store.get(MINT).await, vec![sample(2, 2.0)]);
    }

    #[tokio::test]
    async fn test_concurrent_appends_same_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(store(dir.path()));

        let tasks: Vec<_> = (0..6)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.append(MINT, sample(i, i as f64), 10).await })
            })
            .collect();
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.get(MINT).await.len(), 6);
        assert!(store.key_locks.is_empty());
    }

    #[tokio::test]
    async fn test_key_locks_released_after_use() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        for i in 0..20 {
            store.append(&format!("mint-{}", i), sample(i, 1.0), 10).await;
        }
        assert!(!store.compare_and_swap("mint-0", &[], vec![]).await);

        assert!(store.key_locks.is_empty());
    }

    #[test]
    fn test_file_stem_sanitizes() {
        assert_eq!(file_stem(MINT), MINT);
        assert_eq!(file_stem("../etc/passwd"), "___etc_passwd");
    }
}
