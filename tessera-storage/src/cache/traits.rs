//! Cache backend trait.

use async_trait::async_trait;
use tessera_core::Record;

/// Key/value cache of hydrated records.
///
/// Implementations must tolerate concurrent `get`/`set`/`invalidate` on the
/// same or different keys. A `get` racing a write for the same key may see
/// the old or the new state, never a partially written record.
#[async_trait]
pub trait RecordCache: Send + Sync {
    /// Cached copy of the record, or `None` on a miss.
    async fn get(&self, id: &str) -> Option<Record>;

    /// Store a copy of `record` under `id`.
    async fn set(&self, id: &str, record: Record);

    /// Drop the entry for `id`; a no-op when absent.
    async fn invalidate(&self, id: &str);

    async fn stats(&self) -> CacheStats;
}

/// Statistics about cache usage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of cache hits.
    pub hits: u64,
    /// Number of cache misses.
    pub misses: u64,
    /// Number of entries currently in cache.
    pub entry_count: u64,
    /// Number of explicit invalidations.
    pub invalidations: u64,
}

impl CacheStats {
    /// Calculate the hit rate (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 80,
            misses: 20,
            ..Default::default()
        };
        assert!((stats.hit_rate() - 0.8).abs() < 0.001);

        let empty_stats = CacheStats::default();
        assert!((empty_stats.hit_rate() - 0.0).abs() < 0.001);
    }
}
