//! Arena configuration parameters.

use crate::error::ArenaError;
use crate::raw::{align_up, HEADER_SIZE};

/// Configuration for a thread arena.
///
/// Controls the initial buffer size, how fast the arena grows, and an
/// optional ceiling on its total capacity. The thread-local registry
/// builds every arena from one process-wide config (see
/// [`configure`](crate::configure)).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Size of the first chunk in bytes.
    ///
    /// Default: 5 MiB, generous enough that per-task working sets of
    /// codec-style workloads rarely trigger growth. Must be at least
    /// [`HEADER_SIZE`]. Rounded up to the payload alignment when used.
    pub initial_capacity: usize,

    /// Multiplier applied to the total capacity on each growth step.
    ///
    /// Default: 2. Must be at least 2.
    pub growth_factor: usize,

    /// Upper bound on the total capacity across all chunks.
    ///
    /// `None` (the default) means growth is limited only by the system
    /// allocator.
    pub max_capacity: Option<usize>,
}

impl ArenaConfig {
    /// Default initial capacity: 5 MiB.
    pub const DEFAULT_INITIAL_CAPACITY: usize = 5 * 1024 * 1024;

    /// Default growth multiplier.
    pub const DEFAULT_GROWTH_FACTOR: usize = 2;

    /// Create a config with default values.
    pub fn new() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
            growth_factor: Self::DEFAULT_GROWTH_FACTOR,
            max_capacity: None,
        }
    }

    /// Set the initial capacity in bytes.
    pub fn with_initial_capacity(mut self, bytes: usize) -> Self {
        self.initial_capacity = bytes;
        self
    }

    /// Set the growth multiplier.
    pub fn with_growth_factor(mut self, factor: usize) -> Self {
        self.growth_factor = factor;
        self
    }

    /// Cap the total capacity in bytes.
    pub fn with_max_capacity(mut self, bytes: usize) -> Self {
        self.max_capacity = Some(bytes);
        self
    }

    /// Check the invariants documented on each field.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.initial_capacity < HEADER_SIZE {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "initial_capacity must be >= {HEADER_SIZE} bytes (got {})",
                    self.initial_capacity
                ),
            });
        }
        if align_up(self.initial_capacity).is_none() {
            return Err(ArenaError::InvalidConfig {
                reason: format!(
                    "initial_capacity {} cannot be aligned",
                    self.initial_capacity
                ),
            });
        }
        if self.growth_factor < 2 {
            return Err(ArenaError::InvalidConfig {
                reason: format!("growth_factor must be >= 2 (got {})", self.growth_factor),
            });
        }
        if let Some(limit) = self.max_capacity {
            if limit < self.initial_capacity {
                return Err(ArenaError::InvalidConfig {
                    reason: format!(
                        "max_capacity ({limit}) must be >= initial_capacity ({})",
                        self.initial_capacity
                    ),
                });
            }
        }
        Ok(())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
