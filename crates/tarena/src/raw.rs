//! Low-level primitives for arena memory operations.
//!
//! Everything that touches raw memory lives here: chunk acquisition and
//! release through the global allocator, the inline [`BlockHeader`], and
//! payload copies. Every `unsafe` block carries a mandatory `// SAFETY:`
//! comment.
//!
//! The rest of the crate manipulates blocks through [`HeaderPtr`]. A
//! `HeaderPtr` is only ever produced by [`Chunk::carve`] (which writes a
//! fresh header) or by the `unsafe` [`HeaderPtr::from_payload`], whose
//! caller vouches that the payload came from a live arena. Under that
//! invariant the accessor methods are sound.

#![allow(unsafe_code)]

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::{self, NonNull};

use crate::error::ArenaError;

/// Alignment guaranteed for every payload address and payload size.
///
/// Matches the strictest scalar alignment on mainstream 64-bit targets
/// (`max_align_t` / `u128`).
pub const MAX_ALIGN: usize = 16;

/// Width in bytes of the header that precedes every payload.
pub const HEADER_SIZE: usize = mem::size_of::<BlockHeader>();

const _: () = assert!(mem::align_of::<BlockHeader>() == MAX_ALIGN);
const _: () = assert!(HEADER_SIZE % MAX_ALIGN == 0);
const _: () = assert!(mem::align_of::<u128>() <= MAX_ALIGN);
const _: () = assert!(mem::align_of::<f64>() <= MAX_ALIGN);

/// Round `size` up to the next multiple of [`MAX_ALIGN`].
///
/// Returns `None` if the rounded value does not fit in `usize`.
pub const fn align_up(size: usize) -> Option<usize> {
    match size.checked_add(MAX_ALIGN - 1) {
        Some(padded) => Some(padded & !(MAX_ALIGN - 1)),
        None => None,
    }
}

/// Metadata stored immediately before every payload.
#[repr(C, align(16))]
pub(crate) struct BlockHeader {
    /// Aligned payload length in bytes.
    size: usize,
    /// Next block on the free list. Only meaningful while `freed`.
    next: Option<HeaderPtr>,
    /// Index of the chunk this block was carved from.
    chunk: u32,
    freed: bool,
}

/// Pointer to a [`BlockHeader`] living inside one of an arena's chunks.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct HeaderPtr(NonNull<BlockHeader>);

impl HeaderPtr {
    /// Recover the header of a payload pointer.
    ///
    /// # Safety
    ///
    /// `payload` must have been returned by an allocation on an arena
    /// that has not been reset or dropped since.
    pub(crate) unsafe fn from_payload(payload: NonNull<u8>) -> Self {
        // SAFETY: per the caller contract the header sits HEADER_SIZE
        // bytes before `payload` inside the same chunk, so the
        // subtraction stays in bounds and cannot produce null.
        unsafe {
            let header = payload.as_ptr().sub(HEADER_SIZE);
            Self(NonNull::new_unchecked(header.cast::<BlockHeader>()))
        }
    }

    /// Payload address handed to callers.
    pub(crate) fn payload(self) -> NonNull<u8> {
        // SAFETY: every header is followed by its payload within the same
        // chunk; for a zero-length block at the very end of a chunk the
        // result is the one-past-the-end address, which is allowed.
        unsafe { NonNull::new_unchecked(self.0.as_ptr().cast::<u8>().add(HEADER_SIZE)) }
    }

    /// Address of the header itself.
    pub(crate) fn addr(self) -> usize {
        self.0.as_ptr() as usize
    }

    /// Address one past the end of this block's payload.
    pub(crate) fn end(self) -> usize {
        self.addr() + HEADER_SIZE + self.size()
    }

    /// Free-list ordering key: chunk first, then address within the chunk.
    pub(crate) fn sort_key(self) -> (u32, usize) {
        (self.chunk(), self.addr())
    }

    /// Whether `next` starts at the byte where this block ends.
    pub(crate) fn adjoins(self, next: HeaderPtr) -> bool {
        self.chunk() == next.chunk() && self.end() == next.addr()
    }

    pub(crate) fn size(self) -> usize {
        // SAFETY: HeaderPtr invariant (module docs).
        unsafe { (*self.0.as_ptr()).size }
    }

    pub(crate) fn set_size(self, size: usize) {
        debug_assert_eq!(size % MAX_ALIGN, 0);
        // SAFETY: HeaderPtr invariant (module docs).
        unsafe { (*self.0.as_ptr()).size = size }
    }

    pub(crate) fn is_freed(self) -> bool {
        // SAFETY: HeaderPtr invariant (module docs).
        unsafe { (*self.0.as_ptr()).freed }
    }

    pub(crate) fn set_freed(self, freed: bool) {
        // SAFETY: HeaderPtr invariant (module docs).
        unsafe { (*self.0.as_ptr()).freed = freed }
    }

    pub(crate) fn next(self) -> Option<HeaderPtr> {
        // SAFETY: HeaderPtr invariant (module docs).
        unsafe { (*self.0.as_ptr()).next }
    }

    pub(crate) fn set_next(self, next: Option<HeaderPtr>) {
        // SAFETY: HeaderPtr invariant (module docs).
        unsafe { (*self.0.as_ptr()).next = next }
    }

    pub(crate) fn chunk(self) -> u32 {
        // SAFETY: HeaderPtr invariant (module docs).
        unsafe { (*self.0.as_ptr()).chunk }
    }

    /// Fill the whole payload with zero bytes.
    pub(crate) fn zero_payload(self) {
        // SAFETY: the payload spans `size` bytes inside the chunk.
        unsafe { ptr::write_bytes(self.payload().as_ptr(), 0, self.size()) }
    }

    /// Copy the first `len` payload bytes of `self` into `dst`.
    pub(crate) fn copy_payload_to(self, dst: HeaderPtr, len: usize) {
        debug_assert!(len <= self.size() && len <= dst.size());
        debug_assert_ne!(self, dst);
        // SAFETY: both payloads hold at least `len` bytes and distinct
        // live blocks never overlap.
        unsafe { ptr::copy_nonoverlapping(self.payload().as_ptr(), dst.payload().as_ptr(), len) }
    }
}

/// A single contiguous, never-relocating piece of an arena's buffer.
///
/// Chunks are obtained from the global allocator at [`MAX_ALIGN`] and
/// bump-allocated from the front. They are only released on drop.
pub(crate) struct Chunk {
    base: NonNull<u8>,
    layout: Layout,
    /// Bump pointer: bytes carved so far.
    offset: usize,
}

impl Chunk {
    /// Obtain a new chunk of `capacity` bytes.
    ///
    /// `capacity` must be a non-zero multiple of [`MAX_ALIGN`].
    pub(crate) fn new(capacity: usize) -> Result<Self, ArenaError> {
        debug_assert_eq!(capacity % MAX_ALIGN, 0);
        if capacity == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "chunk capacity must be non-zero".to_string(),
            });
        }
        let layout = Layout::from_size_align(capacity, MAX_ALIGN)
            .map_err(|_| ArenaError::OutOfMemory {
                requested: capacity,
            })?;
        // SAFETY: `layout` has a non-zero size.
        let base = unsafe { alloc::alloc(layout) };
        let base = NonNull::new(base).ok_or(ArenaError::OutOfMemory {
            requested: capacity,
        })?;
        Ok(Self {
            base,
            layout,
            offset: 0,
        })
    }

    /// Carve a block with an aligned payload of `size` bytes from the
    /// bump region, writing a fresh in-use header tagged with `index`.
    ///
    /// Returns `None` if the remaining space cannot hold header + payload.
    pub(crate) fn carve(&mut self, size: usize, index: u32) -> Option<HeaderPtr> {
        debug_assert_eq!(size % MAX_ALIGN, 0);
        let total = size.checked_add(HEADER_SIZE)?;
        let end = self.offset.checked_add(total)?;
        if end > self.capacity() {
            return None;
        }
        // SAFETY: `offset + total <= capacity`, so the header lies inside
        // the allocation; `offset` is a multiple of MAX_ALIGN, so it is
        // suitably aligned for BlockHeader.
        let header = unsafe { self.base.as_ptr().add(self.offset).cast::<BlockHeader>() };
        // SAFETY: `header` is in bounds, aligned, and not aliased by any
        // live block (it lies past the previous bump offset).
        unsafe {
            header.write(BlockHeader {
                size,
                next: None,
                chunk: index,
                freed: false,
            });
        }
        self.offset = end;
        // SAFETY: derived from a non-null base by an in-bounds offset.
        Some(HeaderPtr(unsafe { NonNull::new_unchecked(header) }))
    }

    /// Rewind the bump pointer. Memory is not overwritten.
    pub(crate) fn reset(&mut self) {
        self.offset = 0;
    }

    pub(crate) fn capacity(&self) -> usize {
        self.layout.size()
    }

    pub(crate) fn used(&self) -> usize {
        self.offset
    }

    /// Whether `payload` could be the payload of a block carved here.
    pub(crate) fn holds_payload(&self, payload: usize) -> bool {
        let base = self.base.as_ptr() as usize;
        payload >= base + HEADER_SIZE && payload <= base + self.offset
    }
}

impl Drop for Chunk {
    fn drop(&mut self) {
        // SAFETY: `base` was returned by `alloc::alloc(self.layout)`.
        unsafe { alloc::dealloc(self.base.as_ptr(), self.layout) }
    }
}
