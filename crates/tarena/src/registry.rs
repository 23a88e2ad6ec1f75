//! Thread-local registry and the implicit per-thread allocation API.
//!
//! Each thread owns at most one [`Arena`], stored in a `thread_local!`
//! slot. It is created lazily by the first allocating call on that thread
//! from the process-wide [`ArenaConfig`], and released by the slot's
//! destructor when the thread exits. The allocate/free path takes no
//! lock: the only process-wide state is the configuration, fixed once
//! through a `OnceLock`.
//!
//! Every operation degrades to a no-value result instead of panicking
//! when the arena cannot be created, is already borrowed (re-entrant
//! use from inside [`with_arena`]), or has been torn down during thread
//! exit.

use std::cell::RefCell;
use std::ptr::NonNull;
use std::sync::OnceLock;

use tracing::warn;

use crate::arena::Arena;
use crate::config::ArenaConfig;
use crate::error::ArenaError;
use crate::stats::ArenaStats;

static CONFIG: OnceLock<ArenaConfig> = OnceLock::new();

thread_local! {
    static THREAD_ARENA: RefCell<Option<Arena>> = const { RefCell::new(None) };
}

/// Install the process-wide configuration used for every thread arena.
///
/// Must be called before the first arena is created on any thread.
/// Fails with [`ArenaError::AlreadyConfigured`] once a configuration is in
/// effect, including the default one adopted by the first allocation.
pub fn configure(config: ArenaConfig) -> Result<(), ArenaError> {
    config.validate()?;
    CONFIG
        .set(config)
        .map_err(|_| ArenaError::AlreadyConfigured)
}

/// The configuration new thread arenas are built from.
///
/// Fixes the default configuration if none was installed yet.
pub fn config() -> ArenaConfig {
    *CONFIG.get_or_init(ArenaConfig::default)
}

/// Run `f` against the calling thread's arena, creating it if needed.
///
/// Returns `None` if the arena cannot be created, is already borrowed by
/// an enclosing `with_arena`, or the thread is being torn down. See
/// [`try_with_arena`] for the reason.
pub fn with_arena<R>(f: impl FnOnce(&mut Arena) -> R) -> Option<R> {
    try_with_arena(f).ok()
}

/// Like [`with_arena`], but reports why no arena was available.
///
/// Creation failures surface the error of [`Arena::new`]; a slot that is
/// already borrowed or already torn down yields
/// [`ArenaError::Unavailable`]. A failed creation leaves the slot empty,
/// so the next call tries again.
pub fn try_with_arena<R>(f: impl FnOnce(&mut Arena) -> R) -> Result<R, ArenaError> {
    THREAD_ARENA
        .try_with(|slot| {
            let mut slot = slot
                .try_borrow_mut()
                .map_err(|_| ArenaError::Unavailable)?;
            if slot.is_none() {
                let arena = Arena::new(config()).inspect_err(|err| {
                    warn!(error = %err, "failed to create thread arena");
                })?;
                *slot = Some(arena);
            }
            slot.as_mut().map(f).ok_or(ArenaError::Unavailable)
        })
        .map_err(|_| ArenaError::Unavailable)?
}

/// Like [`with_arena`], but never creates an arena.
fn with_existing<R>(f: impl FnOnce(&mut Arena) -> R) -> Option<R> {
    THREAD_ARENA
        .try_with(|slot| {
            let mut slot = slot.try_borrow_mut().ok()?;
            slot.as_mut().map(f)
        })
        .ok()
        .flatten()
}

/// Allocate `size` bytes from the calling thread's arena.
///
/// The pointer is aligned to [`MAX_ALIGN`](crate::MAX_ALIGN) and the
/// memory is uninitialised. Returns `None` on allocation failure.
pub fn allocate(size: usize) -> Option<NonNull<u8>> {
    with_arena(|arena| arena.allocate(size)).flatten()
}

/// Allocate `count * size` zeroed bytes from the calling thread's arena.
///
/// Returns `None`, allocating nothing, if the product overflows.
pub fn zero_allocate(count: usize, size: usize) -> Option<NonNull<u8>> {
    count.checked_mul(size)?;
    with_arena(|arena| arena.zero_allocate(count, size)).flatten()
}

/// Resize an allocation made on the calling thread.
///
/// See [`Arena::try_reallocate`] for the shrink and grow policy.
///
/// # Safety
///
/// `ptr`, if present, must have been returned by this module's functions
/// on the calling thread, must not have been freed, and the thread's
/// arena must not have been reset since.
#[allow(unsafe_code)]
pub unsafe fn reallocate(ptr: Option<NonNull<u8>>, new_size: usize) -> Option<NonNull<u8>> {
    // SAFETY: forwarded caller contract.
    with_arena(|arena| unsafe { arena.reallocate(ptr, new_size) }).flatten()
}

/// Return an allocation to the calling thread's arena.
///
/// `None` and already-freed blocks are ignored.
///
/// # Safety
///
/// `ptr`, if present, must have been returned by this module's functions
/// on the calling thread, and the thread's arena must not have been reset
/// since.
#[allow(unsafe_code)]
pub unsafe fn free(ptr: Option<NonNull<u8>>) {
    if ptr.is_none() {
        return;
    }
    // SAFETY: forwarded caller contract.
    with_existing(|arena| unsafe { arena.free(ptr) });
}

/// Invalidate every allocation made on the calling thread, keeping the
/// arena's buffer for the next batch of work.
pub fn reset() {
    with_existing(Arena::reset);
}

/// Snapshot the calling thread's arena, if it has one.
pub fn stats() -> Option<ArenaStats> {
    with_existing(|arena| arena.stats())
}
