//! Content store trait and backend implementations.
//!
//! This crate defines the [`ContentStore`] trait ("put bytes, get id" and
//! "get bytes by id") along with the backends RandomFS can run on:
//!
//! - [`IpfsStore`]: the IPFS HTTP API (`/api/v0/add`, `/api/v0/cat`).
//! - [`FileStore`]: local directory with a 2-level fan-out layout.
//! - [`MemoryStore`]: in-memory storage backed by a `RwLock<HashMap>`.
//! - [`SlowStore`]: wrapper injecting random latency, for tests.

mod error;
mod file_store;
mod ipfs_store;
mod memory_store;
mod slow_store;
mod traits;

pub use error::StoreError;
pub use file_store::FileStore;
pub use ipfs_store::IpfsStore;
pub use memory_store::MemoryStore;
pub use slow_store::SlowStore;
pub use traits::ContentStore;
