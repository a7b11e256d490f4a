//! Store/retrieve orchestration for RandomFS.
//!
//! The [`RandomFs`] instance owns the content store handle, the bounded
//! [`BlockCache`] and the statistics counter, and exposes the full
//! store/retrieve pipeline for files.
//!
//! Front ends (the HTTP API, the CLI) depend on the [`RandomFsEngine`]
//! trait rather than the concrete struct.

pub mod cache;
pub mod engine;
pub mod error;
pub mod randomfs;
pub mod stats;

pub use cache::{BlockCache, EvictionKind, EvictionPolicy, FifoPolicy, LruPolicy};
pub use engine::RandomFsEngine;
pub use error::{EngineError, ErrorKind};
pub use randomfs::{DEFAULT_CACHE_MAX_BYTES, RandomFs, RandomFsConfig};
pub use stats::StatsCounter;

#[cfg(test)]
mod tests;
