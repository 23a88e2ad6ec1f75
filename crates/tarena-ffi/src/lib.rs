//! C ABI for the tarena per-thread arena allocator.
//!
//! Exposes drop-in `malloc`-family entry points backed by the calling
//! thread's arena. The header `include/tarena.h` is generated by
//! cbindgen at build time. This crate is one of two that may contain
//! `unsafe` code (along with `tarena`).
//!
//! Every entry point catches panics; no unwind crosses the C boundary.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(unsafe_code)]

/// Run `$body`, returning `$fallback` and logging the panic if it panics.
macro_rules! ffi_guard {
    ($entry:literal, $fallback:expr, $body:block) => {
        match std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| $body)) {
            Ok(value) => value,
            Err(payload) => {
                $crate::log_panic($entry, payload.as_ref());
                $fallback
            }
        }
    };
}

pub mod alloc;
pub mod config;
pub mod status;

pub use alloc::{arcalloc, arfree, armalloc, arrealloc, arreset};
pub use config::arconfigure;
pub use status::TarenaStatus;

/// Report a panic caught at the C boundary.
fn log_panic(entry: &str, payload: &(dyn std::any::Any + Send)) {
    let message = payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload");
    tracing::error!(entry, message, "panic caught at the C boundary");
}
