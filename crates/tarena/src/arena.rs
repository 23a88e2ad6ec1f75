//! The arena state: chunked bump region plus coalescing free list.
//!
//! [`Arena`] is the explicit-handle form of the allocator. The
//! thread-local registry owns one per thread and forwards the free
//! functions of this crate to it; an `Arena` can also be owned directly
//! when a caller wants a private arena without the registry.
//!
//! Allocation order per request:
//! 1. Round the size up to [`MAX_ALIGN`](crate::MAX_ALIGN).
//! 2. First-fit search of the free list (whole block, no split).
//! 3. Bump-carve from the chunk list, growing it if needed.

use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::chunk::ChunkList;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::freelist::FreeList;
use crate::raw::{align_up, HeaderPtr};
use crate::stats::{ArenaStats, FreeBlock};

/// A single-threaded arena allocator.
///
/// Holds raw pointers into its chunks and is therefore neither `Send` nor
/// `Sync`: an arena is touched by exactly one thread for its whole life.
///
/// Payload pointers stay valid until they are freed, until
/// [`reset`](Arena::reset), or until the arena is dropped. Growth never
/// moves existing blocks.
pub struct Arena {
    chunks: ChunkList,
    free_list: FreeList,
}

impl Arena {
    /// Create an arena with one chunk of `config.initial_capacity` bytes.
    pub fn new(config: ArenaConfig) -> Result<Self, ArenaError> {
        config.validate()?;
        let chunks = ChunkList::new(&config)?;
        debug!(capacity = chunks.capacity(), "arena created");
        Ok(Self {
            chunks,
            free_list: FreeList::new(),
        })
    }

    /// Allocate `size` bytes. See [`try_allocate`](Arena::try_allocate).
    pub fn allocate(&mut self, size: usize) -> Option<NonNull<u8>> {
        self.try_allocate(size).ok()
    }

    /// Allocate `size` bytes, returning a [`MAX_ALIGN`](crate::MAX_ALIGN)-aligned
    /// payload pointer.
    ///
    /// Size 0 is legal and yields a distinct, reusable zero-length block.
    /// The returned memory is not initialised. A recycled block may be
    /// larger than requested.
    pub fn try_allocate(&mut self, size: usize) -> Result<NonNull<u8>, ArenaError> {
        self.allocate_block(size).map(HeaderPtr::payload)
    }

    /// Allocate `count * size` zeroed bytes. See
    /// [`try_zero_allocate`](Arena::try_zero_allocate).
    pub fn zero_allocate(&mut self, count: usize, size: usize) -> Option<NonNull<u8>> {
        self.try_zero_allocate(count, size).ok()
    }

    /// Allocate `count * size` bytes and zero the whole payload.
    ///
    /// Fails with [`ArenaError::SizeOverflow`] without touching the arena
    /// if the product overflows `usize`.
    pub fn try_zero_allocate(
        &mut self,
        count: usize,
        size: usize,
    ) -> Result<NonNull<u8>, ArenaError> {
        let total = count
            .checked_mul(size)
            .ok_or(ArenaError::SizeOverflow { count, size })?;
        let block = self.allocate_block(total)?;
        block.zero_payload();
        Ok(block.payload())
    }

    /// Resize an allocation. See [`try_reallocate`](Arena::try_reallocate).
    ///
    /// # Safety
    ///
    /// Same contract as [`try_reallocate`](Arena::try_reallocate).
    #[allow(unsafe_code)]
    pub unsafe fn reallocate(
        &mut self,
        ptr: Option<NonNull<u8>>,
        new_size: usize,
    ) -> Option<NonNull<u8>> {
        // SAFETY: forwarded caller contract.
        unsafe { self.try_reallocate(ptr, new_size) }.ok()
    }

    /// Resize an allocation.
    ///
    /// `None` behaves like [`try_allocate`](Arena::try_allocate). Shrinking
    /// (including any request that fits in the block's current aligned
    /// size) rewrites the recorded size and returns the same pointer; the
    /// released tail is not reclaimed. Growing allocates a new block,
    /// copies the old payload, frees the old block and returns the new
    /// pointer. On failure the original block is left untouched.
    ///
    /// # Safety
    ///
    /// `ptr`, if present, must have been returned by this arena, must not
    /// have been freed, and the arena must not have been reset since.
    #[allow(unsafe_code)]
    pub unsafe fn try_reallocate(
        &mut self,
        ptr: Option<NonNull<u8>>,
        new_size: usize,
    ) -> Result<NonNull<u8>, ArenaError> {
        let Some(ptr) = ptr else {
            return self.try_allocate(new_size);
        };
        debug_assert!(self.owns(ptr), "pointer was not allocated by this arena");
        let aligned = align_up(new_size).ok_or(ArenaError::SizeOverflow {
            count: 1,
            size: new_size,
        })?;

        // SAFETY: caller guarantees `ptr` is a live payload of this arena.
        let block = unsafe { HeaderPtr::from_payload(ptr) };
        debug_assert!(!block.is_freed(), "reallocating a freed block");
        if aligned <= block.size() {
            block.set_size(aligned);
            return Ok(ptr);
        }

        let grown = self.allocate_block(aligned)?;
        block.copy_payload_to(grown, block.size());
        self.release(block);
        Ok(grown.payload())
    }

    /// Return a block to the free list.
    ///
    /// `None` is a no-op, as is freeing a block that is already free.
    ///
    /// # Safety
    ///
    /// `ptr`, if present, must have been returned by this arena and the
    /// arena must not have been reset since. Passing any other pointer is
    /// undefined behaviour; debug builds assert that it lies inside one of
    /// the arena's chunks.
    #[allow(unsafe_code)]
    pub unsafe fn free(&mut self, ptr: Option<NonNull<u8>>) {
        let Some(ptr) = ptr else { return };
        debug_assert!(self.owns(ptr), "pointer was not allocated by this arena");
        // SAFETY: caller guarantees `ptr` is a payload of this arena.
        let block = unsafe { HeaderPtr::from_payload(ptr) };
        self.release(block);
    }

    /// Drop every allocation at once, keeping all chunks for reuse.
    ///
    /// Memory is not overwritten. Every pointer previously returned by
    /// this arena becomes invalid; the next allocation starts again at the
    /// front of the first chunk.
    pub fn reset(&mut self) {
        trace!(
            used = self.chunks.used(),
            capacity = self.chunks.capacity(),
            "arena reset"
        );
        self.chunks.reset();
        self.free_list.clear();
    }

    /// Whether `ptr` lies in the carved region of one of this arena's chunks.
    ///
    /// This is a range check, not proof that `ptr` is a block payload.
    pub fn owns(&self, ptr: NonNull<u8>) -> bool {
        self.chunks.holds_payload(ptr.as_ptr() as usize)
    }

    /// Total bytes held across all chunks.
    pub fn capacity(&self) -> usize {
        self.chunks.capacity()
    }

    /// Snapshot the arena's bookkeeping.
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            chunk_count: self.chunks.chunk_count(),
            capacity: self.chunks.capacity(),
            used: self.chunks.used(),
            free_blocks: self
                .free_list
                .iter()
                .map(|b| FreeBlock {
                    address: b.payload().as_ptr() as usize,
                    size: b.size(),
                })
                .collect(),
        }
    }

    fn allocate_block(&mut self, size: usize) -> Result<HeaderPtr, ArenaError> {
        let aligned = align_up(size).ok_or(ArenaError::SizeOverflow { count: 1, size })?;
        if let Some(block) = self.free_list.take_first_fit(aligned) {
            return Ok(block);
        }
        self.chunks.carve(aligned)
    }

    fn release(&mut self, block: HeaderPtr) {
        if block.is_freed() {
            #[cfg(debug_assertions)]
            tracing::warn!(
                address = block.payload().as_ptr() as usize,
                "ignoring free of an already freed block"
            );
            return;
        }
        self.free_list.insert(block);
    }
}

impl Drop for Arena {
    fn drop(&mut self) {
        debug!(
            chunks = self.chunks.chunk_count(),
            capacity = self.chunks.capacity(),
            "arena released"
        );
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("chunks", &self.chunks.chunk_count())
            .field("capacity", &self.chunks.capacity())
            .field("used", &self.chunks.used())
            .finish()
    }
}
