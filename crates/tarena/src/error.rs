//! Arena-specific error types.

use std::error::Error;
use std::fmt;

/// Errors that can occur during arena operations.
///
/// The thread-local API and the C API collapse every variant into a
/// no-value result; the explicit-handle [`Arena`](crate::Arena) surfaces
/// them through its `try_*` methods.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// The system allocator refused to provide a new chunk.
    OutOfMemory {
        /// Number of bytes requested from the system allocator.
        requested: usize,
    },
    /// Growing the arena would exceed the configured `max_capacity`.
    CapacityExceeded {
        /// Number of bytes the new chunk would have added.
        requested: usize,
        /// Total capacity currently held by the arena.
        capacity: usize,
        /// The configured ceiling.
        limit: usize,
    },
    /// A size computation overflowed `usize`.
    ///
    /// Raised by zero-allocation when `count * size` overflows, and by
    /// every allocation whose size cannot be rounded up to the alignment.
    SizeOverflow {
        /// Element count (1 for plain allocations).
        count: usize,
        /// Element size in bytes.
        size: usize,
    },
    /// Configuration failed validation.
    InvalidConfig {
        /// Human-readable reason.
        reason: String,
    },
    /// A process-wide configuration is already in effect.
    AlreadyConfigured,
    /// The calling thread's arena slot is in use by an enclosing call or
    /// has already been torn down during thread exit.
    Unavailable,
}

impl fmt::Display for ArenaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory { requested } => {
                write!(f, "out of memory: could not obtain {requested} bytes")
            }
            Self::CapacityExceeded {
                requested,
                capacity,
                limit,
            } => {
                write!(
                    f,
                    "arena capacity exceeded: growing by {requested} bytes from {capacity} bytes would pass the {limit} byte limit"
                )
            }
            Self::SizeOverflow { count, size } => {
                write!(f, "size overflow: {count} x {size} bytes does not fit in usize")
            }
            Self::InvalidConfig { reason } => write!(f, "invalid arena config: {reason}"),
            Self::AlreadyConfigured => write!(f, "arena configuration is already in effect"),
            Self::Unavailable => write!(f, "no arena is available on this thread"),
        }
    }
}

impl Error for ArenaError {}
