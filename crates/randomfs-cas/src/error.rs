//! Error types for the block codec and representation records.

/// Errors that can occur while masking blocks or handling representations.
#[derive(Debug, thiserror::Error)]
pub enum CasError {
    /// Serialization or deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Representation has an unsupported format version.
    #[error("unsupported representation version {found:?}, this node supports {supported:?}")]
    UnsupportedVersion {
        /// Version found in the record.
        found: String,
        /// Version this node supports.
        supported: &'static str,
    },

    /// Representation fields are inconsistent with each other.
    #[error("invalid representation: {0}")]
    InvalidRepresentation(String),

    /// The random source could not produce padding bytes.
    #[error("random source unavailable: {0}")]
    RandomSource(String),

    /// A chunk does not fit in the block it is being masked into.
    #[error("chunk of {len} bytes exceeds block size {block_size}")]
    ChunkTooLarge {
        /// Chunk length.
        len: usize,
        /// Target block size.
        block_size: u32,
    },

    /// A block is shorter than the payload it is supposed to carry.
    #[error("block of {len} bytes cannot carry {wanted} payload bytes")]
    BlockTooShort {
        /// Block length.
        len: usize,
        /// Requested payload length.
        wanted: usize,
    },
}
