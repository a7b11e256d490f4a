//! [`RandomFs`]: the instance that ties store, cache and codec together.
//!
//! One `RandomFs` is created per server and shared through an `Arc`. It
//! owns the content store handle, the block cache and the statistics
//! counter, and exposes the store/retrieve pipeline for whole files.

use std::sync::Arc;

use bytes::Bytes;
use randomfs_cas::{
    Chunker, build_representation, deserialize_representation, mask, select_block_size,
    serialize_representation, unmask,
};
use randomfs_store::ContentStore;
use randomfs_types::{ContentId, DEFAULT_HOST, Locator, PROTOCOL_VERSION, Representation, Stats};
use tracing::{debug, info, warn};

use crate::cache::{BlockCache, EvictionKind};
use crate::engine::RandomFsEngine;
use crate::error::EngineError;
use crate::stats::StatsCounter;

/// Default cache bound: 500 MiB.
pub const DEFAULT_CACHE_MAX_BYTES: u64 = 500 * 1024 * 1024;

/// Configuration for creating a [`RandomFs`].
#[derive(Debug, Clone)]
pub struct RandomFsConfig {
    /// Host segment written into every locator.
    pub host: String,
    /// Upper bound on cached block bytes. Must be positive.
    pub cache_max_bytes: u64,
    /// Cache eviction order.
    pub eviction: EvictionKind,
}

impl Default for RandomFsConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            cache_max_bytes: DEFAULT_CACHE_MAX_BYTES,
            eviction: EvictionKind::Lru,
        }
    }
}

impl RandomFsConfig {
    fn validate(&self) -> Result<(), EngineError> {
        if self.cache_max_bytes == 0 {
            return Err(EngineError::Configuration(
                "cache size must be positive".to_string(),
            ));
        }
        if self.host.is_empty() || self.host.contains('/') {
            return Err(EngineError::Configuration(format!(
                "locator host {:?} must be non-empty and contain no '/'",
                self.host
            )));
        }
        Ok(())
    }
}

/// A RandomFS instance.
pub struct RandomFs {
    host: String,
    store: Arc<dyn ContentStore>,
    cache: BlockCache,
    stats: StatsCounter,
}

impl RandomFs {
    /// Create an instance on top of `store`.
    ///
    /// Fails with [`EngineError::Configuration`] on a zero cache size or an
    /// unusable locator host.
    pub fn new(config: RandomFsConfig, store: Arc<dyn ContentStore>) -> Result<Self, EngineError> {
        config.validate()?;
        info!(
            host = %config.host,
            cache_max_bytes = config.cache_max_bytes,
            eviction = %config.eviction,
            "randomfs instance created"
        );
        Ok(Self {
            host: config.host,
            store,
            cache: BlockCache::with_policy(config.cache_max_bytes, config.eviction.build()),
            stats: StatsCounter::new(),
        })
    }

    /// Host segment used in produced locators.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The block cache.
    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    /// The content store.
    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    // ------------------------------------------------------------------
    // Store path
    // ------------------------------------------------------------------

    /// Store a file: chunk → mask → put blocks → put record → locator.
    ///
    /// Blocks are written one at a time in file order. The first store
    /// failure aborts the operation; blocks already written stay in the
    /// store and the counters are left untouched.
    pub async fn store_file(
        &self,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Locator, EngineError> {
        let file_size = data.len() as u64;
        let block_size = select_block_size(file_size);
        info!(filename, file_size, block_size, "store_file: starting");

        let chunks = Chunker::new(block_size).chunk(data);
        let mut block_ids = Vec::with_capacity(chunks.len());

        for chunk in &chunks {
            let block = Bytes::from(mask(chunk.data, block_size)?);
            let id = self.store.put(block.clone()).await.map_err(|e| {
                warn!(index = chunk.index, error = %e, "block put failed, aborting store");
                e
            })?;
            debug!(index = chunk.index, %id, len = chunk.data.len(), "stored block");
            self.cache.put(id.clone(), block);
            block_ids.push(id);
        }

        let rep = build_representation(filename, file_size, block_ids, block_size, content_type);
        let record = serialize_representation(&rep)?;
        let representation_id = self.store.put(Bytes::from(record)).await?;

        self.stats
            .record_store(rep.block_ids.len() as u64, file_size);

        let locator = Locator {
            host: self.host.clone(),
            version: PROTOCOL_VERSION.to_string(),
            file_size,
            file_name: rep.filename,
            timestamp: rep.created_at,
            representation_id,
        };
        info!(
            %locator,
            blocks = chunks.len(),
            "store_file: complete"
        );
        Ok(locator)
    }

    // ------------------------------------------------------------------
    // Retrieve path
    // ------------------------------------------------------------------

    /// Rebuild a file from its representation id.
    ///
    /// A failure to fetch the record itself is returned as-is (so an
    /// unknown id is [`StoreError::NotFound`]); anything that goes wrong
    /// after that is [`EngineError::ReconstructionFailed`] and no partial
    /// data is returned.
    ///
    /// [`StoreError::NotFound`]: randomfs_store::StoreError::NotFound
    pub async fn retrieve_file(
        &self,
        representation_id: &ContentId,
    ) -> Result<(Vec<u8>, Representation), EngineError> {
        info!(%representation_id, "retrieve_file: starting");

        let record = self.store.get(representation_id).await?;
        let rep = deserialize_representation(&record)
            .map_err(|e| EngineError::reconstruction(representation_id, e))?;

        let mut data = Vec::new();
        for (index, block_id) in rep.block_ids.iter().enumerate() {
            let block = self.fetch_block(representation_id, index, block_id).await?;
            if block.len() != rep.block_size as usize {
                return Err(EngineError::reconstruction(
                    representation_id,
                    format!(
                        "block {index} ({block_id}) is {} bytes, expected {}",
                        block.len(),
                        rep.block_size
                    ),
                ));
            }
            let payload = unmask(&block, rep.payload_len(index))
                .map_err(|e| EngineError::reconstruction(representation_id, e))?;
            data.extend_from_slice(payload);
        }

        info!(
            %representation_id,
            filename = %rep.filename,
            size = data.len(),
            "retrieve_file: complete"
        );
        Ok((data, rep))
    }

    /// Cache first, then the store; a store hit is cached.
    async fn fetch_block(
        &self,
        representation_id: &ContentId,
        index: usize,
        block_id: &ContentId,
    ) -> Result<Bytes, EngineError> {
        if let Some(block) = self.cache.get(block_id) {
            debug!(index, %block_id, "block cache hit");
            return Ok(block);
        }

        let block = self.store.get(block_id).await.map_err(|e| {
            warn!(%representation_id, index, %block_id, error = %e, "block fetch failed");
            EngineError::reconstruction(
                representation_id,
                format!("block {index} ({block_id}): {e}"),
            )
        })?;
        debug!(index, %block_id, "block fetched from store");
        self.cache.put(block_id.clone(), block.clone());
        Ok(block)
    }

    // ------------------------------------------------------------------
    // Inspection
    // ------------------------------------------------------------------

    /// Parse an `rd://` locator string.
    pub fn parse_locator(&self, raw: &str) -> Result<Locator, EngineError> {
        Ok(Locator::parse(raw)?)
    }

    /// Snapshot of the instance counters.
    pub fn stats(&self) -> Stats {
        let (hits, misses) = self.cache.hit_counts();
        self.stats.snapshot(hits, misses)
    }
}

#[async_trait::async_trait]
impl RandomFsEngine for RandomFs {
    async fn store_file(
        &self,
        filename: &str,
        data: &[u8],
        content_type: &str,
    ) -> Result<Locator, EngineError> {
        RandomFs::store_file(self, filename, data, content_type).await
    }

    async fn retrieve_file(
        &self,
        representation_id: &ContentId,
    ) -> Result<(Vec<u8>, Representation), EngineError> {
        RandomFs::retrieve_file(self, representation_id).await
    }

    fn parse_locator(&self, raw: &str) -> Result<Locator, EngineError> {
        RandomFs::parse_locator(self, raw)
    }

    fn stats(&self) -> Stats {
        RandomFs::stats(self)
    }
}
