//! Observability snapshots.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::codec::RECORD_SIZE;

/// Counters of one bounded cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub max_size: usize,
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub evictions: u64,
}

impl CacheStats {
    /// Hit rate in [0, 1]; 0 when nothing was looked up yet.
    #[must_use]
    pub fn compute_hit_rate(hits: u64, misses: u64) -> f64 {
        let total = hits + misses;
        if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        }
    }
}

/// Router dispatch counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RouterStats {
    pub total_queries: u64,
    pub dispatch_counts: BTreeMap<String, u64>,
}

/// Prefetch predictor size counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchStats {
    pub history_len: usize,
    pub tracked_keys: usize,
}

/// Full observability snapshot of the shared memory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryStats {
    pub per_expert: BTreeMap<String, CacheStats>,
    pub router: RouterStats,
    pub prefetch: PrefetchStats,
    pub record_size_bytes: usize,
}

impl MemoryStats {
    #[must_use]
    pub fn new(
        per_expert: BTreeMap<String, CacheStats>,
        router: RouterStats,
        prefetch: PrefetchStats,
    ) -> Self {
        Self {
            per_expert,
            router,
            prefetch,
            record_size_bytes: RECORD_SIZE,
        }
    }
}
