//! Integration test: arena lifetime is bound to thread lifetime.

use std::cell::Cell;
use std::sync::Barrier;
use std::thread;

use crossbeam_channel::unbounded;

#[test]
fn each_thread_starts_with_a_fresh_arena() {
    let (tx, rx) = unbounded();
    for _ in 0..32 {
        let tx = tx.clone();
        thread::spawn(move || {
            let fresh = tarena::stats().is_none();
            let p = tarena::allocate(1024).expect("allocation");
            let used = tarena::stats().map(|s| s.used).unwrap_or(0);
            tx.send((fresh, p.as_ptr() as usize % tarena::MAX_ALIGN, used))
                .unwrap();
        })
        .join()
        .unwrap();
    }
    drop(tx);
    let reports: Vec<_> = rx.iter().collect();
    assert_eq!(reports.len(), 32);
    for (fresh, misalignment, used) in reports {
        assert!(fresh);
        assert_eq!(misalignment, 0);
        assert_eq!(used, 1024 + tarena::HEADER_SIZE);
    }
}

struct AllocOnDrop(Cell<bool>);

impl Drop for AllocOnDrop {
    fn drop(&mut self) {
        if self.0.get() {
            // Runs during thread teardown; the arena slot may already be
            // gone. Either outcome is fine as long as nothing panics.
            if let Some(p) = tarena::allocate(16) {
                // SAFETY: allocated on this thread just above.
                unsafe { tarena::free(Some(p)) };
            }
            tarena::reset();
            let _ = tarena::stats();
        }
    }
}

thread_local! {
    static LATE_USER: AllocOnDrop = const { AllocOnDrop(Cell::new(false)) };
}

#[test]
fn use_during_thread_teardown_does_not_panic() {
    thread::spawn(|| {
        tarena::allocate(8).expect("allocation");
        LATE_USER.with(|u| u.0.set(true));
    })
    .join()
    .expect("teardown must not panic");
}

#[test]
fn allocations_of_concurrent_threads_are_disjoint() {
    let (tx, rx) = unbounded();
    let barrier = Barrier::new(8);
    thread::scope(|s| {
        for _ in 0..8 {
            let tx = tx.clone();
            let barrier = &barrier;
            s.spawn(move || {
                let p = tarena::allocate(256).expect("allocation");
                tx.send(p.as_ptr() as usize).unwrap();
                // Hold the arena until every thread has allocated.
                barrier.wait();
            });
        }
    });
    drop(tx);
    let mut addrs: Vec<usize> = rx.iter().collect();
    addrs.sort_unstable();
    for pair in addrs.windows(2) {
        assert!(pair[1] - pair[0] >= 256, "arenas overlap");
    }
}
