//! In-process cache backed by a sharded concurrent map.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use tessera_core::{Record, RecordId};

use super::traits::{CacheStats, RecordCache};

/// Unbounded in-process record cache.
///
/// Values are cloned in and out, so callers never share state with the
/// cache or with each other.
#[derive(Debug, Default)]
pub struct InMemoryRecordCache {
    entries: DashMap<RecordId, Record>,
    hits: AtomicU64,
    misses: AtomicU64,
    invalidations: AtomicU64,
}

impl InMemoryRecordCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `id` is cached, without touching the hit/miss counters.
    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }
}

#[async_trait]
impl RecordCache for InMemoryRecordCache {
    async fn get(&self, id: &str) -> Option<Record> {
        let found = self.entries.get(id).map(|entry| entry.value().clone());
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    async fn set(&self, id: &str, record: Record) {
        self.entries.insert(id.to_string(), record);
    }

    async fn invalidate(&self, id: &str) {
        self.entries.remove(id);
        self.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    async fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entry_count: self.entries.len() as u64,
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}
