//! Shared test utilities for randomfs-engine tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bytes::Bytes;
use randomfs_store::{ContentStore, MemoryStore, StoreError};
use randomfs_types::ContentId;

use crate::randomfs::{RandomFs, RandomFsConfig};

pub const TEST_CACHE_BYTES: u64 = 64 * 1024 * 1024;

/// Generate deterministic, non-repeating test data.
pub fn test_data(size: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(size);
    let mut state: u32 = 0xDEAD_BEEF;
    for _ in 0..size {
        state = state.wrapping_mul(1103515245).wrapping_add(12345);
        data.push((state >> 16) as u8);
    }
    data
}

/// An instance over a fresh in-memory store, returning both.
pub fn memory_fs(cache_max_bytes: u64) -> (RandomFs, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let fs = RandomFs::new(
        RandomFsConfig {
            cache_max_bytes,
            ..RandomFsConfig::default()
        },
        store.clone(),
    )
    .unwrap();
    (fs, store)
}

/// An instance with a generous cache over an in-memory store.
pub fn default_fs() -> RandomFs {
    memory_fs(TEST_CACHE_BYTES).0
}

/// Store wrapper whose puts start failing after a fixed number of
/// successes, and whose gets can be switched off.
pub struct FlakyStore {
    pub inner: Arc<MemoryStore>,
    puts_left: AtomicUsize,
    gets_down: AtomicBool,
}

impl FlakyStore {
    pub fn new(successful_puts: usize) -> Self {
        Self {
            inner: Arc::new(MemoryStore::new()),
            puts_left: AtomicUsize::new(successful_puts),
            gets_down: AtomicBool::new(false),
        }
    }

    pub fn fail_gets(&self) {
        self.gets_down.store(true, Ordering::SeqCst);
    }
}

#[async_trait::async_trait]
impl ContentStore for FlakyStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, StoreError> {
        let allowed = self
            .puts_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if !allowed {
            return Err(StoreError::Unavailable("connection refused".to_string()));
        }
        self.inner.put(data).await
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, StoreError> {
        if self.gets_down.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("connection reset".to_string()));
        }
        self.inner.get(id).await
    }
}
