//! Integration test: configuring through the C entry point.

use tarena_ffi::{arconfigure, armalloc, arreset, TarenaStatus};

#[test]
fn configure_once_then_allocate() {
    tarena_test_utils::init_tracing();
    assert_eq!(arconfigure(8192, 32 * 1024), TarenaStatus::Ok as i32);
    assert_eq!(
        arconfigure(0, 0),
        TarenaStatus::AlreadyConfigured as i32
    );

    std::thread::spawn(|| {
        assert!(!armalloc(100).is_null());
        assert_eq!(tarena::stats().unwrap().capacity, 8192);
        assert!(armalloc(64 * 1024).is_null());
        assert!(!armalloc(100).is_null());
        arreset();
    })
    .join()
    .unwrap();
}
