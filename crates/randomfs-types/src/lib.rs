//! Shared types and identifiers for RandomFS.
//!
//! This crate defines the types used across the RandomFS workspace:
//! the content-store identifier ([`ContentId`]), the per-file
//! reconstruction record ([`Representation`]), the `rd://` address
//! ([`Locator`]) with its codec, and the statistics snapshot ([`Stats`]).

mod locator;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use locator::{Locator, LocatorError};

/// Format tag written into every representation record and locator.
pub const PROTOCOL_VERSION: &str = "v4";

/// Scheme tag of the locator string (`rd://...`).
pub const LOCATOR_SCHEME: &str = "rd";

/// Default host/namespace field of a locator.
pub const DEFAULT_HOST: &str = "randomfs";

// ---------------------------------------------------------------------------
// ID types
// ---------------------------------------------------------------------------

/// Identifier assigned by the content store to a stored byte sequence.
///
/// The core never invents these for remote stores: an IPFS backend hands
/// back a CID, the local backends use the BLAKE3 hex digest of the bytes.
#[derive(Clone, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContentId(String);

impl ContentId {
    /// Wrap an identifier returned by a content store.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an identifier by hashing the data with BLAKE3.
    pub fn from_data(data: &[u8]) -> Self {
        Self(blake3::hash(data).to_hex().to_string())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is the empty string.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for ContentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&str> for ContentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

// ---------------------------------------------------------------------------
// Core data structures
// ---------------------------------------------------------------------------

/// Reconstruction record for one stored file.
///
/// Lists, in file order, the identifiers of the masked blocks the file was
/// split into. Every block is exactly `block_size` bytes long; only the
/// first `file_size` bytes of the concatenated unmasked payloads are data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Representation {
    /// Base name of the original file.
    pub filename: String,
    /// Exact byte length of the original file.
    pub file_size: u64,
    /// Block identifiers, one per block, in file order.
    pub block_ids: Vec<ContentId>,
    /// Mask size used for every block.
    pub block_size: u32,
    /// Unix timestamp (seconds) when the file was stored.
    pub created_at: u64,
    /// MIME type supplied at store time.
    pub content_type: String,
    /// Format tag, checked before the rest of the record is trusted.
    pub format_version: String,
}

impl Representation {
    /// Number of blocks a file of `file_size` bytes splits into.
    pub fn block_count_for(file_size: u64, block_size: u32) -> usize {
        if block_size == 0 {
            return 0;
        }
        file_size.div_ceil(u64::from(block_size)) as usize
    }

    /// Number of blocks this record should list.
    pub fn expected_block_count(&self) -> usize {
        Self::block_count_for(self.file_size, self.block_size)
    }

    /// Payload length carried by the block at `index`.
    ///
    /// All blocks but the last carry `block_size` bytes; the last carries
    /// whatever remains of `file_size`.
    pub fn payload_len(&self, index: usize) -> usize {
        let block_size = u64::from(self.block_size);
        let start = index as u64 * block_size;
        self.file_size.saturating_sub(start).min(block_size) as usize
    }
}

/// Snapshot of the per-instance counters.
///
/// All fields are monotonically non-decreasing for the lifetime of an
/// engine instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Files successfully stored.
    pub files_stored: u64,
    /// Blocks generated by store operations.
    pub blocks_generated: u64,
    /// Total original bytes stored.
    pub total_size: u64,
    /// Block lookups served from the local cache.
    pub cache_hits: u64,
    /// Block lookups that had to go to the content store.
    pub cache_misses: u64,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
