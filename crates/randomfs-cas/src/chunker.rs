//! Block size policy and fixed-size chunker.

/// Block size for files up to [`SMALL_FILE_THRESHOLD`] bytes.
pub const SMALL_BLOCK_SIZE: u32 = 1024; // 1 KB

/// Block size for files up to [`MEDIUM_FILE_THRESHOLD`] bytes.
pub const MEDIUM_BLOCK_SIZE: u32 = 64 * 1024; // 64 KB

/// Block size for everything larger.
pub const LARGE_BLOCK_SIZE: u32 = 1024 * 1024; // 1 MB

/// Largest file size (inclusive) that uses [`SMALL_BLOCK_SIZE`].
pub const SMALL_FILE_THRESHOLD: u64 = 100 * 1024; // 100 KB

/// Largest file size (inclusive) that uses [`MEDIUM_BLOCK_SIZE`].
pub const MEDIUM_FILE_THRESHOLD: u64 = 10 * 1024 * 1024; // 10 MB

/// Pick the block size for a file of `file_size` bytes.
///
/// A file exactly at a threshold stays in the smaller tier.
pub fn select_block_size(file_size: u64) -> u32 {
    if file_size <= SMALL_FILE_THRESHOLD {
        SMALL_BLOCK_SIZE
    } else if file_size <= MEDIUM_FILE_THRESHOLD {
        MEDIUM_BLOCK_SIZE
    } else {
        LARGE_BLOCK_SIZE
    }
}

/// A slice of the original payload destined for one block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    /// Position of the chunk in file order.
    pub index: usize,
    /// Byte offset within the original payload.
    pub offset: u64,
    /// The chunk bytes.
    pub data: &'a [u8],
}

/// Fixed-size chunker.
///
/// The last chunk may be smaller than `block_size`.
/// Empty data produces zero chunks.
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    block_size: u32,
}

impl Chunker {
    /// Create a chunker with the given block size in bytes.
    pub fn new(block_size: u32) -> Self {
        Self { block_size }
    }

    /// Create a chunker using the tier policy for a file of `file_size` bytes.
    pub fn for_file_size(file_size: u64) -> Self {
        Self::new(select_block_size(file_size))
    }

    /// The block size this chunker splits at.
    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Split data into consecutive chunks of `block_size` bytes.
    pub fn chunk<'a>(&self, data: &'a [u8]) -> Vec<Chunk<'a>> {
        if data.is_empty() || self.block_size == 0 {
            return Vec::new();
        }

        let mut offset = 0u64;
        data.chunks(self.block_size as usize)
            .enumerate()
            .map(|(index, slice)| {
                let chunk = Chunk {
                    index,
                    offset,
                    data: slice,
                };
                offset += slice.len() as u64;
                chunk
            })
            .collect()
    }
}
