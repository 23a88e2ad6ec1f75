//! Process-wide configuration entry point.

use tarena::ArenaConfig;

use crate::status::TarenaStatus;

/// Install the arena configuration used by every thread.
///
/// `initial_capacity` of 0 keeps the default; `max_capacity` of 0 means
/// unlimited. Must be called before any thread allocates. Returns a
/// [`TarenaStatus`] code.
#[no_mangle]
#[allow(unsafe_code)]
pub extern "C" fn arconfigure(initial_capacity: usize, max_capacity: usize) -> i32 {
    ffi_guard!("arconfigure", TarenaStatus::Panicked as i32, {
        let mut config = ArenaConfig::new();
        if initial_capacity != 0 {
            config = config.with_initial_capacity(initial_capacity);
        }
        if max_capacity != 0 {
            config = config.with_max_capacity(max_capacity);
        }
        match tarena::configure(config) {
            Ok(()) => TarenaStatus::Ok as i32,
            Err(e) => TarenaStatus::from(&e) as i32,
        }
    })
}
