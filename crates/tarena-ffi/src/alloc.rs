//! `malloc`-family entry points.
//!
//! All pointers returned here belong to the calling thread's arena. Passing
//! them to another thread, or using them after [`arreset`] or thread exit,
//! is undefined behavior.

use std::ffi::c_void;
use std::ptr::{self, NonNull};

fn into_raw(ptr: Option<NonNull<u8>>) -> *mut c_void {
    ptr.map_or(ptr::null_mut(), |p| p.as_ptr().cast())
}

/// Allocate `size` bytes from the calling thread's arena.
///
/// Returns a pointer aligned to 16 bytes, or null on failure.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn armalloc(size: usize) -> *mut c_void {
    ffi_guard!("armalloc", ptr::null_mut(), {
        into_raw(tarena::allocate(size))
    })
}

/// Allocate a zeroed array of `count` elements of `size` bytes.
///
/// Returns null when `count * size` overflows or memory is exhausted.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arcalloc(count: usize, size: usize) -> *mut c_void {
    ffi_guard!("arcalloc", ptr::null_mut(), {
        into_raw(tarena::zero_allocate(count, size))
    })
}

/// Resize the allocation at `ptr` to `size` bytes.
///
/// A null `ptr` behaves like [`armalloc`]. Returns null on failure, in
/// which case the original allocation is left untouched.
///
/// # Safety
///
/// `ptr` must be null or a live pointer returned by this thread's
/// `armalloc`, `arcalloc` or `arrealloc`.
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn arrealloc(ptr: *mut c_void, size: usize) -> *mut c_void {
    ffi_guard!("arrealloc", ptr::null_mut(), {
        // SAFETY: caller guarantees `ptr` is null or a live allocation of
        // the calling thread.
        into_raw(unsafe { tarena::reallocate(NonNull::new(ptr.cast()), size) })
    })
}

/// Return the allocation at `ptr` to the calling thread's arena.
///
/// A null `ptr` is ignored. Freeing the same pointer twice is a no-op.
///
/// # Safety
///
/// `ptr` must be null or a pointer returned by this thread's allocation
/// functions since the last [`arreset`].
#[no_mangle]
#[allow(unsafe_code)]
pub unsafe extern "C" fn arfree(ptr: *mut c_void) {
    ffi_guard!("arfree", (), {
        // SAFETY: caller guarantees `ptr` is null or owned by the calling
        // thread's arena.
        unsafe { tarena::free(NonNull::new(ptr.cast())) }
    })
}

/// Invalidate every allocation of the calling thread at once.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arreset() {
    ffi_guard!("arreset", (), { tarena::reset() })
}

#[cfg(test)]
#[allow(unsafe_code)]
mod tests {
    use super::*;
    use std::thread;

    fn on_fresh_thread(f: impl FnOnce() + Send + 'static) {
        thread::spawn(f).join().unwrap();
    }

    #[test]
    fn malloc_free_reuses_address() {
        on_fresh_thread(|| {
            let a = armalloc(40);
            assert!(!a.is_null());
            assert_eq!(a as usize % tarena::MAX_ALIGN, 0);
            // SAFETY: `a` was returned by `armalloc` on this thread.
            unsafe { arfree(a) };
            let b = armalloc(40);
            assert_eq!(a, b);
        });
    }

    #[test]
    fn calloc_zeroes_and_rejects_overflow() {
        on_fresh_thread(|| {
            let p = arcalloc(16, 8).cast::<u8>();
            assert!(!p.is_null());
            // SAFETY: `p` is a live 128-byte allocation.
            let bytes = unsafe { std::slice::from_raw_parts(p, 128) };
            assert!(bytes.iter().all(|&b| b == 0));
            assert!(arcalloc(usize::MAX, 2).is_null());
        });
    }

    #[test]
    fn realloc_null_allocates_and_growth_copies() {
        on_fresh_thread(|| {
            // SAFETY: null is always accepted.
            let p = unsafe { arrealloc(ptr::null_mut(), 8) }.cast::<u8>();
            assert!(!p.is_null());
            // SAFETY: `p` is a live allocation of at least 8 bytes.
            unsafe { p.copy_from_nonoverlapping(b"abcdefgh".as_ptr(), 8) };
            // SAFETY: `p` is the live allocation from the call above.
            let q = unsafe { arrealloc(p.cast(), 4096) }.cast::<u8>();
            assert!(!q.is_null());
            // SAFETY: `q` holds at least 8 bytes copied from `p`.
            let bytes = unsafe { std::slice::from_raw_parts(q, 8) };
            assert_eq!(bytes, b"abcdefgh");
        });
    }

    #[test]
    fn free_null_and_reset_without_arena_are_no_ops() {
        on_fresh_thread(|| {
            // SAFETY: null is always accepted.
            unsafe { arfree(ptr::null_mut()) };
            arreset();
            assert!(tarena::stats().is_none());
        });
    }

    #[test]
    fn reset_rewinds_to_first_address() {
        on_fresh_thread(|| {
            let first = armalloc(100);
            armalloc(200);
            arreset();
            assert_eq!(armalloc(300), first);
        });
    }
}
