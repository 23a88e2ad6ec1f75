//! Read-only snapshots of an arena's bookkeeping.

/// A block currently on the free list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FreeBlock {
    /// Payload address of the block.
    pub address: usize,
    /// Aligned payload size in bytes.
    pub size: usize,
}

/// Point-in-time view of one arena.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArenaStats {
    /// Number of chunks backing the arena.
    pub chunk_count: usize,
    /// Total bytes held across all chunks.
    pub capacity: usize,
    /// Bytes bump-carved (headers included) since creation or the last reset.
    pub used: usize,
    /// Free-list entries in address order.
    pub free_blocks: Vec<FreeBlock>,
}

impl ArenaStats {
    /// Number of free-list entries.
    pub fn free_block_count(&self) -> usize {
        self.free_blocks.len()
    }

    /// Total payload bytes sitting on the free list.
    pub fn free_bytes(&self) -> usize {
        self.free_blocks.iter().map(|b| b.size).sum()
    }
}
