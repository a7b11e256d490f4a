//! Core trait for content-addressable storage.

use bytes::Bytes;
use randomfs_types::ContentId;

use crate::error::StoreError;

/// A content-addressable object store.
///
/// The store, not the caller, assigns identifiers. Each call is a single
/// attempt: implementations do not retry, back off, or time out on their
/// own, and surface the first failure to the caller.
///
/// All implementations must be `Send + Sync` for use across async tasks.
#[async_trait::async_trait]
pub trait ContentStore: Send + Sync {
    /// Store bytes, returning the identifier the store assigned to them.
    async fn put(&self, data: Bytes) -> Result<ContentId, StoreError>;

    /// Fetch bytes by identifier.
    ///
    /// Returns [`StoreError::NotFound`] if the store does not have them.
    async fn get(&self, id: &ContentId) -> Result<Bytes, StoreError>;
}
