//! In-memory dominance store backed by DashMap.
//! The map's per-shard entry lock makes each operation atomic per key.

use async_trait::async_trait;
use dashmap::DashMap;

use super::{push_bounded, Appended, DominanceStore};
use crate::models::types::DominanceSample;

#[derive(Debug, Default)]
pub struct MemoryStore {
    histories: DashMap<String, Vec<DominanceSample>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tracked tokens
    pub fn len(&self) -> usize {
        self.histories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histories.is_empty()
    }
}

#[async_trait]
impl DominanceStore for MemoryStore {
    async fn get(&self, key: &str) -> Vec<DominanceSample> {
        self.histories
            .get(key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    async fn append(&self, key: &str, sample: DominanceSample, limit: usize) -> Appended {
        let mut entry = self.histories.entry(key.to_string()).or_default();
        push_bounded(entry.value_mut(), sample, limit);
        Appended {
            history: entry.value().clone(),
            durable: true,
        }
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: &[DominanceSample],
        next: Vec<DominanceSample>,
    ) -> bool {
        let mut entry = self.histories.entry(key.to_string()).or_default();
        if entry.value().as_slice() != expected {
            return false;
        }
        *entry.value_mut() = next;
        true
    }
}
