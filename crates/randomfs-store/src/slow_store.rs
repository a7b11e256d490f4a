//! A [`ContentStore`] wrapper that adds configurable random round-trip latency.
//!
//! Stands in for a remote IPFS node in tests and benchmarks: every `put` and
//! `get` sleeps for a random duration before reaching the wrapped store. The
//! RNG is seeded so runs are reproducible.
//!
//! ```ignore
//! let slow = SlowStore::new(Arc::new(MemoryStore::new()))
//!     .read_latency(1, 5)
//!     .write_latency(2, 8)
//!     .seed(42);
//! ```

use std::sync::{Arc, Mutex};
use std::time::Duration;

use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use randomfs_types::ContentId;

use crate::error::StoreError;
use crate::traits::ContentStore;

/// A [`ContentStore`] wrapper that injects random latency before each call.
pub struct SlowStore {
    inner: Arc<dyn ContentStore>,
    read_latency_ms: (u64, u64),
    write_latency_ms: (u64, u64),
    rng: Mutex<StdRng>,
}

impl SlowStore {
    /// Wrap a store with no added latency.
    pub fn new(inner: Arc<dyn ContentStore>) -> Self {
        Self {
            inner,
            read_latency_ms: (0, 0),
            write_latency_ms: (0, 0),
            rng: Mutex::new(StdRng::seed_from_u64(0)),
        }
    }

    /// Latency range for `get`, in milliseconds.
    pub fn read_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.read_latency_ms = (min_ms, max_ms.max(min_ms));
        self
    }

    /// Latency range for `put`, in milliseconds.
    pub fn write_latency(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.write_latency_ms = (min_ms, max_ms.max(min_ms));
        self
    }

    pub fn seed(self, seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
            ..self
        }
    }

    async fn delay(&self, (min, max): (u64, u64)) {
        if max == 0 {
            return;
        }

        let ms = if min == max {
            min
        } else {
            self.rng
                .lock()
                .expect("rng lock poisoned")
                .random_range(min..=max)
        };

        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[async_trait::async_trait]
impl ContentStore for SlowStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, StoreError> {
        self.delay(self.write_latency_ms).await;
        self.inner.put(data).await
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, StoreError> {
        self.delay(self.read_latency_ms).await;
        self.inner.get(id).await
    }
}
