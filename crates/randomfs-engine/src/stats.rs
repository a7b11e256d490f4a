//! Per-instance statistics counter.

use std::sync::Mutex;

use randomfs_types::Stats;

/// Counters for completed store operations.
///
/// Cache hits and misses live with the cache itself, under its own lock;
/// [`StatsCounter::snapshot`] merges them in.
#[derive(Default)]
pub struct StatsCounter {
    inner: Mutex<Stats>,
}

impl StatsCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successfully stored file.
    pub fn record_store(&self, blocks: u64, bytes: u64) {
        let mut stats = self.inner.lock().expect("stats lock poisoned");
        stats.files_stored += 1;
        stats.blocks_generated += blocks;
        stats.total_size += bytes;
    }

    /// Copy of the counters with the given cache lookup counts filled in.
    pub fn snapshot(&self, cache_hits: u64, cache_misses: u64) -> Stats {
        let stats = *self.inner.lock().expect("stats lock poisoned");
        Stats {
            cache_hits,
            cache_misses,
            ..stats
        }
    }
}
