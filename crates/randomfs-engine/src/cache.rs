//! Bounded in-memory block cache.
//!
//! Masked blocks written or fetched by the engine are kept here, keyed by
//! their content id, up to a configurable `max_bytes`. When an insertion
//! leaves the cache over its bound, entries are evicted until the cache is
//! at most half full. Which entries go first is decided by an
//! [`EvictionPolicy`]: least recently used by default, or first in first
//! out.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

use bytes::Bytes;
use randomfs_types::ContentId;
use serde::Deserialize;
use tracing::debug;

/// Decides the order in which cached blocks are evicted.
///
/// The cache calls the hooks while holding its lock, so implementations
/// only need `&mut self` and must not block.
pub trait EvictionPolicy: Send {
    /// A new entry was inserted, or an existing one overwritten.
    fn on_insert(&mut self, id: &ContentId);

    /// An entry was read.
    fn on_access(&mut self, id: &ContentId);

    /// An entry was removed by the cache.
    fn on_remove(&mut self, id: &ContentId);

    /// Pick and forget the next entry to evict.
    fn next_victim(&mut self) -> Option<ContentId>;

    /// Short name for logs.
    fn name(&self) -> &'static str;
}

/// Ids in the order they were last queued: front = oldest.
///
/// Both policies share it; they differ only in what re-queues an entry.
#[derive(Default)]
struct Queue {
    next_seq: u64,
    seq_of: HashMap<ContentId, u64>,
    order: BTreeMap<u64, ContentId>,
}

impl Queue {
    fn push_back(&mut self, id: &ContentId) {
        self.remove(id);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.seq_of.insert(id.clone(), seq);
        self.order.insert(seq, id.clone());
    }

    fn contains(&self, id: &ContentId) -> bool {
        self.seq_of.contains_key(id)
    }

    fn remove(&mut self, id: &ContentId) {
        if let Some(seq) = self.seq_of.remove(id) {
            self.order.remove(&seq);
        }
    }

    fn pop_front(&mut self) -> Option<ContentId> {
        let (_, id) = self.order.pop_first()?;
        self.seq_of.remove(&id);
        Some(id)
    }
}

/// Least-recently-used eviction: reads and overwrites refresh an entry.
#[derive(Default)]
pub struct LruPolicy {
    queue: Queue,
}

impl EvictionPolicy for LruPolicy {
    fn on_insert(&mut self, id: &ContentId) {
        self.queue.push_back(id);
    }

    fn on_access(&mut self, id: &ContentId) {
        self.queue.push_back(id);
    }

    fn on_remove(&mut self, id: &ContentId) {
        self.queue.remove(id);
    }

    fn next_victim(&mut self) -> Option<ContentId> {
        self.queue.pop_front()
    }

    fn name(&self) -> &'static str {
        "lru"
    }
}

/// First-in-first-out eviction: an entry keeps the slot of its first
/// insertion regardless of reads or overwrites.
#[derive(Default)]
pub struct FifoPolicy {
    queue: Queue,
}

impl EvictionPolicy for FifoPolicy {
    fn on_insert(&mut self, id: &ContentId) {
        if !self.queue.contains(id) {
            self.queue.push_back(id);
        }
    }

    fn on_access(&mut self, _id: &ContentId) {}

    fn on_remove(&mut self, id: &ContentId) {
        self.queue.remove(id);
    }

    fn next_victim(&mut self) -> Option<ContentId> {
        self.queue.pop_front()
    }

    fn name(&self) -> &'static str {
        "fifo"
    }
}

/// Selects one of the built-in eviction policies by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvictionKind {
    #[default]
    Lru,
    Fifo,
}

impl EvictionKind {
    /// Instantiate the policy.
    pub fn build(self) -> Box<dyn EvictionPolicy> {
        match self {
            Self::Lru => Box::new(LruPolicy::default()),
            Self::Fifo => Box::new(FifoPolicy::default()),
        }
    }
}

impl fmt::Display for EvictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lru => "lru",
            Self::Fifo => "fifo",
        })
    }
}

impl FromStr for EvictionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "fifo" => Ok(Self::Fifo),
            other => Err(format!("unknown eviction policy {other:?} (expected lru or fifo)")),
        }
    }
}

/// Thread-safe, size-bounded block cache.
///
/// The entry map, size tally, policy state and hit/miss counters sit behind
/// a single lock. The critical section is pure in-memory work and no lock
/// is ever held across store I/O.
pub struct BlockCache {
    max_bytes: u64,
    inner: Mutex<CacheInner>,
}

struct CacheInner {
    data: HashMap<ContentId, Bytes>,
    /// Always equal to the sum of the lengths in `data`.
    used_bytes: u64,
    policy: Box<dyn EvictionPolicy>,
    hits: u64,
    misses: u64,
}

impl BlockCache {
    /// Create an LRU cache bounded at `max_bytes`.
    pub fn new(max_bytes: u64) -> Self {
        Self::with_policy(max_bytes, Box::new(LruPolicy::default()))
    }

    /// Create a cache bounded at `max_bytes` with a custom eviction policy.
    pub fn with_policy(max_bytes: u64, policy: Box<dyn EvictionPolicy>) -> Self {
        Self {
            max_bytes,
            inner: Mutex::new(CacheInner {
                data: HashMap::new(),
                used_bytes: 0,
                policy,
                hits: 0,
                misses: 0,
            }),
        }
    }

    /// Look up a block, counting a hit or a miss.
    pub fn get(&self, id: &ContentId) -> Option<Bytes> {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        match inner.data.get(id).cloned() {
            Some(data) => {
                inner.hits += 1;
                inner.policy.on_access(id);
                Some(data)
            }
            None => {
                inner.misses += 1;
                None
            }
        }
    }

    /// Insert or overwrite a block, then evict if the cache is over its bound.
    ///
    /// A block larger than the whole cache is still admitted; the eviction
    /// that follows removes it along with everything else.
    pub fn put(&self, id: ContentId, data: Bytes) {
        let mut inner = self.inner.lock().expect("cache lock poisoned");

        let len = data.len() as u64;
        inner.policy.on_insert(&id);
        if let Some(old) = inner.data.insert(id, data) {
            inner.used_bytes -= old.len() as u64;
        }
        inner.used_bytes += len;

        if inner.used_bytes > self.max_bytes {
            self.evict_locked(&mut inner);
        }
    }

    /// Evict entries if the cache is over its bound.
    ///
    /// Returns the number of entries removed. `put` already calls this, so
    /// it only does something after `max_bytes` has been exceeded.
    pub fn evict(&self) -> usize {
        let mut inner = self.inner.lock().expect("cache lock poisoned");
        if inner.used_bytes > self.max_bytes {
            self.evict_locked(&mut inner)
        } else {
            0
        }
    }

    fn evict_locked(&self, inner: &mut CacheInner) -> usize {
        let target = self.max_bytes / 2;
        let before = inner.used_bytes;
        let mut evicted = 0;

        while inner.used_bytes > target {
            let Some(victim) = inner.policy.next_victim() else {
                break;
            };
            if let Some(data) = inner.data.remove(&victim) {
                inner.used_bytes -= data.len() as u64;
                evicted += 1;
            }
        }

        // The policy lost track of something; drop the untracked rest.
        if inner.used_bytes > target {
            let stray: Vec<ContentId> = inner.data.keys().cloned().collect();
            for id in stray {
                inner.policy.on_remove(&id);
                if let Some(data) = inner.data.remove(&id) {
                    inner.used_bytes -= data.len() as u64;
                    evicted += 1;
                }
            }
        }

        debug!(
            policy = inner.policy.name(),
            evicted,
            freed = before - inner.used_bytes,
            used = inner.used_bytes,
            "evicted cached blocks"
        );
        evicted
    }

    /// Configured byte bound.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// Current number of cached entries.
    pub fn len(&self) -> usize {
        self.inner.lock().expect("cache lock poisoned").data.len()
    }

    /// Whether the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .expect("cache lock poisoned")
            .data
            .is_empty()
    }

    /// Current bytes used by cached data.
    pub fn used_bytes(&self) -> u64 {
        self.inner.lock().expect("cache lock poisoned").used_bytes
    }

    /// Lookup counters as `(hits, misses)`.
    pub fn hit_counts(&self) -> (u64, u64) {
        let inner = self.inner.lock().expect("cache lock poisoned");
        (inner.hits, inner.misses)
    }
}
