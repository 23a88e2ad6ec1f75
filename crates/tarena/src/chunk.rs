//! Growable, append-only chunk lists.
//!
//! A [`ChunkList`] is the backing buffer of one arena. Blocks are
//! bump-carved from the current chunk; when it cannot hold a request the
//! list moves on to the next retained chunk, and only when none is left
//! does it append a new one. Existing chunks never move, so growth never
//! invalidates outstanding payload pointers.

use tracing::{debug, warn};

use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::raw::{align_up, Chunk, HeaderPtr, HEADER_SIZE};

pub(crate) struct ChunkList {
    chunks: Vec<Chunk>,
    /// Index of the chunk currently being bump-allocated.
    current: usize,
    growth_factor: usize,
    max_capacity: Option<usize>,
}

impl ChunkList {
    /// Create a list holding one chunk of the configured initial capacity.
    pub(crate) fn new(config: &ArenaConfig) -> Result<Self, ArenaError> {
        let initial = align_up(config.initial_capacity).ok_or(ArenaError::SizeOverflow {
            count: 1,
            size: config.initial_capacity,
        })?;
        Ok(Self {
            chunks: vec![Chunk::new(initial)?],
            current: 0,
            growth_factor: config.growth_factor,
            max_capacity: config.max_capacity,
        })
    }

    /// Carve a block with an aligned payload of `size` bytes.
    ///
    /// Tries the current chunk, then any later chunk retained across a
    /// reset, then grows. Blocks never straddle chunks; the unused tail of
    /// a chunk that was skipped stays idle until the next reset.
    pub(crate) fn carve(&mut self, size: usize) -> Result<HeaderPtr, ArenaError> {
        for index in self.current..self.chunks.len() {
            if let Some(block) = self.chunks[index].carve(size, chunk_tag(index)?) {
                self.current = index;
                return Ok(block);
            }
        }

        let total = size
            .checked_add(HEADER_SIZE)
            .ok_or(ArenaError::SizeOverflow { count: 1, size })?;
        let index = self.grow(total)?;
        self.chunks[index]
            .carve(size, chunk_tag(index)?)
            .ok_or(ArenaError::OutOfMemory { requested: total })
    }

    /// Append a chunk able to hold `total` bytes and make it current.
    ///
    /// With a ceiling set, a chunk that would pass it is cut down to the
    /// exact requirement; growth fails only if even that does not fit.
    fn grow(&mut self, total: usize) -> Result<usize, ArenaError> {
        let capacity = self.capacity();
        let mut len = growth_len(capacity, total, self.growth_factor)
            .ok_or(ArenaError::SizeOverflow { count: 1, size: total })?;

        if let Some(limit) = self.max_capacity {
            let exceeds = |len: usize| capacity.checked_add(len).is_none_or(|grown| grown > limit);
            if exceeds(len) {
                // Near the ceiling, settle for a chunk that just fits.
                len = align_up(total).ok_or(ArenaError::SizeOverflow { count: 1, size: total })?;
            }
            if exceeds(len) {
                warn!(capacity, requested = len, limit, "arena growth refused");
                return Err(ArenaError::CapacityExceeded {
                    requested: len,
                    capacity,
                    limit,
                });
            }
        }

        let index = self.chunks.len();
        chunk_tag(index)?;
        let chunk = Chunk::new(len).inspect_err(|err| {
            warn!(capacity, requested = len, error = %err, "arena growth failed");
        })?;
        self.chunks.push(chunk);
        self.current = index;
        debug!(
            chunk = index,
            chunk_bytes = len,
            capacity = self.capacity(),
            "arena grew"
        );
        Ok(index)
    }

    /// Rewind every chunk and restart bumping from the first one.
    pub(crate) fn reset(&mut self) {
        for chunk in &mut self.chunks {
            chunk.reset();
        }
        self.current = 0;
    }

    pub(crate) fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Total bytes held across all chunks.
    pub(crate) fn capacity(&self) -> usize {
        self.chunks.iter().map(Chunk::capacity).sum()
    }

    /// Total bytes bump-carved across all chunks.
    pub(crate) fn used(&self) -> usize {
        self.chunks.iter().map(Chunk::used).sum()
    }

    /// Whether `payload` lies in the carved region of any chunk.
    pub(crate) fn holds_payload(&self, payload: usize) -> bool {
        self.chunks.iter().any(|c| c.holds_payload(payload))
    }
}

fn chunk_tag(index: usize) -> Result<u32, ArenaError> {
    u32::try_from(index).map_err(|_| ArenaError::OutOfMemory { requested: 0 })
}

/// Size of the chunk to append so that a block of `total` bytes fits.
///
/// The target capacity is multiplied by `factor` until the added span
/// covers `total`; if that would overflow, the exact requirement is used.
fn growth_len(capacity: usize, total: usize, factor: usize) -> Option<usize> {
    let floor = capacity.checked_add(total)?;
    let mut target = capacity;
    while target < floor {
        target = match target.checked_mul(factor) {
            Some(next) if next > target => next,
            _ => floor,
        };
    }
    align_up(target - capacity)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(initial: usize) -> ChunkList {
        ChunkList::new(&ArenaConfig::new().with_initial_capacity(initial)).unwrap()
    }

    #[test]
    fn growth_doubles_capacity() {
        assert_eq!(growth_len(1024, 64, 2), Some(1024));
        assert_eq!(growth_len(1024, 1024, 2), Some(1024));
    }

    #[test]
    fn growth_doubles_repeatedly_for_large_requests() {
        // 1024 -> 2048 -> 4096 -> 8192: added span 7168 >= 5000.
        assert_eq!(growth_len(1024, 5000, 2), Some(7168));
    }

    #[test]
    fn growth_from_empty_uses_exact_floor() {
        assert_eq!(growth_len(0, 96, 2), Some(96));
    }

    #[test]
    fn growth_overflow_falls_back_to_exact_fit() {
        let capacity = usize::MAX / 2 + 16;
        assert_eq!(growth_len(capacity, 64, 2), Some(64));
        assert_eq!(growth_len(usize::MAX - 8, 64, 2), None);
    }

    #[test]
    fn carve_within_first_chunk() {
        let mut chunks = list(1024);
        let block = chunks.carve(64).unwrap();
        assert_eq!(block.chunk(), 0);
        assert_eq!(chunks.used(), HEADER_SIZE + 64);
        assert_eq!(chunks.chunk_count(), 1);
    }

    #[test]
    fn grows_into_new_chunk_on_overflow() {
        let mut chunks = list(256);
        chunks.carve(256 - HEADER_SIZE).unwrap();
        let block = chunks.carve(64).unwrap();
        assert_eq!(block.chunk(), 1);
        assert_eq!(chunks.chunk_count(), 2);
        assert_eq!(chunks.capacity(), 512);
    }

    #[test]
    fn oversized_request_gets_dedicated_chunk() {
        let mut chunks = list(256);
        let block = chunks.carve(4096).unwrap();
        assert_eq!(block.chunk(), 1);
        assert!(chunks.capacity() >= 256 + 4096 + HEADER_SIZE);
    }

    #[test]
    fn max_capacity_refuses_growth() {
        let config = ArenaConfig::new()
            .with_initial_capacity(256)
            .with_max_capacity(300);
        let mut chunks = ChunkList::new(&config).unwrap();
        chunks.carve(128).unwrap();
        let err = chunks.carve(128).unwrap_err();
        assert!(matches!(err, ArenaError::CapacityExceeded { limit: 300, .. }));
        assert_eq!(chunks.chunk_count(), 1);
    }

    #[test]
    fn growth_near_ceiling_falls_back_to_exact_fit() {
        let config = ArenaConfig::new()
            .with_initial_capacity(4096)
            .with_max_capacity(12288);
        let mut chunks = ChunkList::new(&config).unwrap();
        chunks.carve(4000).unwrap();
        // Doubling would overshoot the ceiling; an exact chunk does not.
        let block = chunks.carve(6000).unwrap();
        assert_eq!(block.chunk(), 1);
        assert_eq!(chunks.capacity(), 4096 + 6000 + HEADER_SIZE);
        assert!(chunks.capacity() <= 12288);

        // No room left for another exact chunk either.
        let err = chunks.carve(4096).unwrap_err();
        assert!(matches!(err, ArenaError::CapacityExceeded { limit: 12288, .. }));
        assert_eq!(chunks.chunk_count(), 2);
    }

    #[test]
    fn reset_reuses_retained_chunks() {
        let mut chunks = list(256);
        let first = chunks.carve(128).unwrap();
        chunks.carve(256).unwrap();
        assert_eq!(chunks.chunk_count(), 2);

        chunks.reset();
        assert_eq!(chunks.used(), 0);
        let again = chunks.carve(128).unwrap();
        assert_eq!(again, first);

        // Does not fit in chunk 0 any more; lands in retained chunk 1.
        let spill = chunks.carve(128).unwrap();
        assert_eq!(spill.chunk(), 1);
        assert_eq!(chunks.chunk_count(), 2);
    }

    #[test]
    fn growth_keeps_existing_blocks_in_place() {
        let mut chunks = list(256);
        let first = chunks.carve(64).unwrap();
        let before = first.payload();
        chunks.carve(10_000).unwrap();
        assert_eq!(first.payload(), before);
        assert!(chunks.holds_payload(before.as_ptr() as usize));
    }
}
