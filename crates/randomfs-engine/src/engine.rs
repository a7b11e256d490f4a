//! [`RandomFsEngine`]: the interface front ends program against.
//!
//! The HTTP API and the CLI depend on this trait instead of the concrete
//! [`RandomFs`](crate::RandomFs) struct, so tests can swap in a stub.

use randomfs_types::{ContentId, Locator, Representation, Stats};

use crate::error::EngineError;

/// Store, retrieve and inspect files.
#[async_trait::async_trait]
pub trait RandomFsEngine: Send + Sync {
    /// Store a file and return the locator that names it.
    async fn store_file(
        &self,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Locator, EngineError>;

    /// Rebuild a file from its representation id.
    async fn retrieve_file(
        &self,
        representation_id: &ContentId,
    ) -> Result<(Vec<u8>, Representation), EngineError>;

    /// Parse an `rd://` locator string.
    fn parse_locator(&self, raw: &str) -> Result<Locator, EngineError> {
        Ok(Locator::parse(raw)?)
    }

    /// Snapshot of the instance counters.
    fn stats(&self) -> Stats;
}
