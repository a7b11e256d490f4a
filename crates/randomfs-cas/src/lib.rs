//! Block codec and representation records.
//!
//! This crate provides:
//! - [`select_block_size`]: the three-tier block size policy.
//! - [`Chunker`]: splits a payload into fixed-size chunks.
//! - [`mask`] / [`unmask`]: turn a chunk into a full-size block padded with
//!   random bytes, and back.
//! - [`build_representation`]: constructs the [`Representation`] record that
//!   lists a file's blocks, plus its JSON encoding.
//!
//! [`Representation`]: randomfs_types::Representation

mod chunker;
mod error;
mod mask;
mod representation;

pub use chunker::{
    Chunk, Chunker, LARGE_BLOCK_SIZE, MEDIUM_BLOCK_SIZE, MEDIUM_FILE_THRESHOLD, SMALL_BLOCK_SIZE,
    SMALL_FILE_THRESHOLD, select_block_size,
};
pub use error::CasError;
pub use mask::{mask, mask_with_rng, unmask};
pub use representation::{
    base_name, build_representation, build_representation_with_timestamp,
    deserialize_representation, serialize_representation,
};
