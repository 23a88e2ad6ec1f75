//! Benchmark workloads for the tarena allocator.
//!
//! Provides deterministic request-size mixes and arena configurations
//! shared by the Criterion benches:
//!
//! - [`request_sizes`]: seeded size mix for allocate/free churn
//! - [`bench_config`]: arena sized so a workload never grows
//! - [`Workload`]: a request mix together with its total footprint

#![forbid(unsafe_code)]
#![deny(rustdoc::broken_intra_doc_links)]

use tarena::{align_up, ArenaConfig, HEADER_SIZE};

/// Generate `n` request sizes in `1..=max` from `seed`.
///
/// Small sizes dominate: three out of four requests fall in the lowest
/// eighth of the range, matching typical scratch-buffer traffic.
pub fn request_sizes(n: usize, max: usize, seed: u64) -> Vec<usize> {
    let max = max.max(1);
    let mut state = seed;
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let bits = (state >> 33) as usize;
            let span = if bits % 4 == 0 { max } else { (max / 8).max(1) };
            1 + (bits >> 2) % span
        })
        .collect()
}

/// A request mix and the arena bytes it consumes when nothing is freed.
#[derive(Clone, Debug)]
pub struct Workload {
    /// Requested payload sizes, in order.
    pub sizes: Vec<usize>,
    /// Header plus aligned payload bytes over every request.
    pub footprint: usize,
}

impl Workload {
    /// Build a seeded workload of `n` requests up to `max` bytes each.
    pub fn new(n: usize, max: usize, seed: u64) -> Self {
        let sizes = request_sizes(n, max, seed);
        let footprint = sizes
            .iter()
            .map(|&s| HEADER_SIZE + align_up(s).unwrap_or(s))
            .sum();
        Self { sizes, footprint }
    }
}

/// Arena configuration large enough that `workload` fits in one chunk.
pub fn bench_config(workload: &Workload) -> ArenaConfig {
    let initial = workload
        .footprint
        .max(ArenaConfig::DEFAULT_INITIAL_CAPACITY);
    ArenaConfig::new().with_initial_capacity(initial)
}
