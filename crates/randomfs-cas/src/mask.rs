//! Block masking.
//!
//! A block is always exactly `block_size` bytes: the chunk occupies the
//! front, the remainder is random padding drawn fresh for every block, so a
//! short final chunk is indistinguishable in length from a full one.
//! Nothing but the block itself is needed to recover the chunk, given the
//! payload length from the representation record.
//!
//! Pads are single-use and never shared between files, so identical chunks
//! produce different blocks. The scheme gives neither cross-file
//! deduplication nor deniability; it is not encryption.

use rand::TryRngCore;
use rand::rngs::OsRng;

use crate::error::CasError;

/// Mask a chunk into a `block_size` block using the operating system CSPRNG.
pub fn mask(chunk: &[u8], block_size: u32) -> Result<Vec<u8>, CasError> {
    mask_with_rng(chunk, block_size, &mut OsRng)
}

/// Mask a chunk into a `block_size` block, drawing padding from `rng`.
///
/// Fails if the chunk is longer than the block or the random source errors;
/// neither case is retried.
pub fn mask_with_rng<R>(chunk: &[u8], block_size: u32, rng: &mut R) -> Result<Vec<u8>, CasError>
where
    R: TryRngCore + ?Sized,
{
    let size = block_size as usize;
    if chunk.len() > size {
        return Err(CasError::ChunkTooLarge {
            len: chunk.len(),
            block_size,
        });
    }

    let mut block = vec![0u8; size];
    rng.try_fill_bytes(&mut block)
        .map_err(|e| CasError::RandomSource(e.to_string()))?;
    block[..chunk.len()].copy_from_slice(chunk);

    Ok(block)
}

/// Recover the first `original_length` payload bytes of a block.
pub fn unmask(block: &[u8], original_length: usize) -> Result<&[u8], CasError> {
    block
        .get(..original_length)
        .ok_or(CasError::BlockTooShort {
            len: block.len(),
            wanted: original_length,
        })
}
