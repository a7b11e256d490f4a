//! In-memory content store backend.

use std::collections::HashMap;
use std::sync::RwLock;

use bytes::Bytes;
use randomfs_types::ContentId;
use tracing::debug;

use crate::error::StoreError;
use crate::traits::ContentStore;

/// In-memory content store backed by a `RwLock<HashMap>`.
///
/// Identifiers are the BLAKE3 hex digest of the stored bytes. Useful for
/// tests, benchmarks, and running the daemon without an IPFS node.
#[derive(Default)]
pub struct MemoryStore {
    objects: RwLock<HashMap<ContentId, Bytes>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.read().expect("lock poisoned").len()
    }

    /// Whether the store holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.read().expect("lock poisoned").is_empty()
    }

    /// Whether an object with the given id is stored.
    pub fn contains(&self, id: &ContentId) -> bool {
        self.objects.read().expect("lock poisoned").contains_key(id)
    }

    /// Drop an object, simulating data loss on the remote side.
    pub fn remove(&self, id: &ContentId) -> Option<Bytes> {
        self.objects.write().expect("lock poisoned").remove(id)
    }

    /// Total bytes held across all objects.
    pub fn used_bytes(&self) -> u64 {
        self.objects
            .read()
            .expect("lock poisoned")
            .values()
            .map(|v| v.len() as u64)
            .sum()
    }
}

#[async_trait::async_trait]
impl ContentStore for MemoryStore {
    async fn put(&self, data: Bytes) -> Result<ContentId, StoreError> {
        let id = ContentId::from_data(&data);
        debug!(%id, size = data.len(), "storing object in memory");
        self.objects
            .write()
            .expect("lock poisoned")
            .insert(id.clone(), data);
        Ok(id)
    }

    async fn get(&self, id: &ContentId) -> Result<Bytes, StoreError> {
        self.objects
            .read()
            .expect("lock poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(id.clone()))
    }
}
