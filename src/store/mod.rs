//! Dominance Store - keyed, bounded, append-only history
//!
//! The tracker talks to storage only through [`DominanceStore`], so the
//! backend is injected: [`MemoryStore`] for tests and single-process use,
//! [`FileStore`] for durable state shared between processes.
//!
//! Every operation is atomic per key. Unrelated keys never contend.

use async_trait::async_trait;

use crate::models::types::DominanceSample;

pub mod file;
pub mod lock;
pub mod memory;

pub use file::FileStore;
pub use lock::LockFile;
pub use memory::MemoryStore;

/// Outcome of an append
#[derive(Debug, Clone, PartialEq)]
pub struct Appended {
    /// History after the append and trim, oldest first
    pub history: Vec<DominanceSample>,
    /// False when the backend could not persist the update
    pub durable: bool,
}

#[async_trait]
pub trait DominanceStore: Send + Sync {
    /// Stored history for a key, oldest first (empty when absent)
    async fn get(&self, key: &str) -> Vec<DominanceSample>;

    /// Append a sample and keep only the newest `limit` entries
    async fn append(&self, key: &str, sample: DominanceSample, limit: usize) -> Appended;

    /// Replace the history with `next` only if it still equals `expected`
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &[DominanceSample],
        next: Vec<DominanceSample>,
    ) -> bool;
}

/// Push `sample` and evict from the front until at most `limit` remain
///
/// Timestamps never go backwards: a sample older than the newest stored one
/// is recorded at the newest timestamp.
pub(crate) fn push_bounded(history: &mut Vec<DominanceSample>, mut sample: DominanceSample, limit: usize) {
    if let Some(last) = history.last() {
        sample.ts = sample.ts.max(last.ts);
    }
    history.push(sample);
    let limit = limit.max(1);
    if history.len() > limit {
        let excess = history.len() - limit;
        history.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_bounded_evicts_oldest() {
        let mut history = Vec::new();
        for i in 0..13 {
            push_bounded(&mut history, DominanceSample { ts: i, val: i as f64 }, 10);
        }
        assert_eq!(history.len(), 10);
        assert_eq!(history.first().unwrap().ts, 3);
        assert_eq!(history.last().unwrap().ts, 12);
        assert!(history.windows(2).all(|w| w[0].ts < w[1].ts));
    }

    #[test]
    fn test_push_bounded_keeps_time_order() {
        let mut history = vec![DominanceSample { ts: 100, val: 1.0 }];
        push_bounded(&mut history, DominanceSample { ts: 40, val: 2.0 }, 10);
        push_bounded(&mut history, DominanceSample { ts: 160, val: 3.0 }, 10);

        assert_eq!(
            history,
            vec![
                DominanceSample { ts: 100, val: 1.0 },
                DominanceSample { ts: 100, val: 2.0 },
                DominanceSample { ts: 160, val: 3.0 },
            ]
        );
    }
}
