//! Test utilities for tarena development.
//!
//! Provides a small work-dispatch [`WorkPool`] (the producer/worker
//! pipeline the allocator is built for), byte-pattern helpers for
//! detecting corruption in arena payloads, and a tracing initialiser for
//! tests and benches.

#![forbid(unsafe_code)]
#![allow(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod pool;

pub use pool::{DispatchError, JobQueue, WorkPool};

use tracing_subscriber::EnvFilter;

/// Install a test-friendly `tracing` subscriber once per process.
///
/// Honours `RUST_LOG`; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn pattern_byte(seed: u64, index: usize) -> u8 {
    let mixed = seed
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(index as u64);
    (mixed ^ (mixed >> 29)) as u8
}

/// Fill `buf` with a byte pattern derived from `seed`.
pub fn fill_pattern(buf: &mut [u8], seed: u64) {
    for (i, b) in buf.iter_mut().enumerate() {
        *b = pattern_byte(seed, i);
    }
}

/// Whether `buf` still holds the pattern written by [`fill_pattern`].
pub fn verify_pattern(buf: &[u8], seed: u64) -> bool {
    buf.iter()
        .enumerate()
        .all(|(i, &b)| b == pattern_byte(seed, i))
}
