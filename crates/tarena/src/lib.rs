//! Per-thread arena allocator.
//!
//! Each thread gets a private arena on first use. Allocation bump-carves
//! from the arena's buffer or recycles a block from an address-ordered,
//! coalescing free list; nothing is shared between threads, so no
//! operation takes a lock. Arenas are released automatically when their
//! thread exits, and [`reset`] drops every allocation at once between
//! independent batches of work.
//!
//! # Architecture
//!
//! ```text
//! registry (thread_local! slot per thread, OnceLock<ArenaConfig>)
//! └── Arena
//!     ├── ChunkList → Chunk[] (append-only, never relocated)
//!     │   └── [BlockHeader | payload][BlockHeader | payload]... bump offset →
//!     └── FreeList (sorted by chunk + address, coalesced, first-fit)
//! ```
//!
//! Every payload is preceded by a [`HEADER_SIZE`]-byte header and aligned
//! to [`MAX_ALIGN`]. Growth appends a chunk instead of resizing the
//! buffer, so outstanding pointers survive it.
//!
//! # Example
//!
//! ```
//! let p = tarena::allocate(64).expect("allocation");
//! // SAFETY: `p` came from `allocate` on this thread and was not freed.
//! unsafe { tarena::free(Some(p)) };
//! tarena::reset();
//! ```
//!
//! # Safety
//!
//! Pointers are raw. A pointer must only be freed or reallocated on the
//! thread that allocated it, and must not be used after that thread's
//! arena is reset or the thread exits. `unsafe` code is confined to the
//! `raw` module and the `unsafe fn` entry points that forward to it.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

pub mod arena;
mod chunk;
pub mod config;
pub mod error;
mod freelist;
mod raw;
pub mod registry;
pub mod stats;

// Public re-exports for the primary API surface.
pub use arena::Arena;
pub use config::ArenaConfig;
pub use error::ArenaError;
pub use raw::{align_up, HEADER_SIZE, MAX_ALIGN};
pub use registry::{
    allocate, config, configure, free, reallocate, reset, stats, try_with_arena, with_arena,
    zero_allocate,
};
pub use stats::{ArenaStats, FreeBlock};
