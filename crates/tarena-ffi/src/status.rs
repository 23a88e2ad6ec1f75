//! C-compatible status codes.
//!
//! [`TarenaStatus`] is returned by the entry points that can report a
//! reason for failure. Allocation entry points signal failure with a null
//! pointer instead.

use tarena::ArenaError;

/// C-compatible status code.
///
/// `Ok` = 0, all errors are negative. Values are ABI-stable.
#[repr(i32)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TarenaStatus {
    /// Success.
    Ok = 0,
    /// An argument was rejected (invalid configuration values).
    InvalidArgument = -1,
    /// The process-wide configuration was already installed or read.
    AlreadyConfigured = -2,
    /// The system allocator refused memory.
    OutOfMemory = -3,
    /// The configured capacity ceiling would be exceeded.
    CapacityExceeded = -4,
    /// A size computation overflowed.
    SizeOverflow = -5,
    /// The calling thread has no usable arena.
    Unavailable = -6,
    /// A Rust panic was caught at the FFI boundary.
    Panicked = -128,
}

impl From<&ArenaError> for TarenaStatus {
    fn from(e: &ArenaError) -> Self {
        match e {
            ArenaError::OutOfMemory { .. } => TarenaStatus::OutOfMemory,
            ArenaError::CapacityExceeded { .. } => TarenaStatus::CapacityExceeded,
            ArenaError::SizeOverflow { .. } => TarenaStatus::SizeOverflow,
            ArenaError::InvalidConfig { .. } => TarenaStatus::InvalidArgument,
            ArenaError::AlreadyConfigured => TarenaStatus::AlreadyConfigured,
            ArenaError::Unavailable => TarenaStatus::Unavailable,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_map_to_negative_codes() {
        let errors = [
            ArenaError::OutOfMemory { requested: 1 },
            ArenaError::CapacityExceeded {
                requested: 1,
                capacity: 2,
                limit: 2,
            },
            ArenaError::SizeOverflow { count: 2, size: 3 },
            ArenaError::InvalidConfig {
                reason: "bad".into(),
            },
            ArenaError::AlreadyConfigured,
            ArenaError::Unavailable,
        ];
        for e in &errors {
            assert!((TarenaStatus::from(e) as i32) < 0, "{e}");
        }
        assert_eq!(
            TarenaStatus::from(&ArenaError::AlreadyConfigured) as i32,
            -2
        );
    }
}
