//! Minimal thread pool with per-pipeline-stage result queues.
//!
//! Mirrors the dispatch API a producer/worker pipeline consumes: create a
//! pool, open one [`JobQueue`] per stage, `dispatch` jobs into it, and
//! collect results with [`JobQueue::next_result_wait`]. Every job runs on
//! a pool thread, so any arena it allocates from is that thread's arena.
//!
//! ```text
//! producer ──dispatch──► [task channel] ──► worker threads
//!                                               │
//! consumer ◄──next_result_wait── [result channel: bounded(capacity)]
//! ```

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use crossbeam_channel::{Receiver, Sender};

type Task = Box<dyn FnOnce() + Send + 'static>;

/// Errors returned by [`JobQueue::dispatch`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchError {
    /// The pool has been shut down.
    ShutDown,
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShutDown => write!(f, "work pool is shut down"),
        }
    }
}

impl std::error::Error for DispatchError {}

/// Fixed-size pool of worker threads fed by a shared task channel.
pub struct WorkPool {
    task_tx: Option<Sender<Task>>,
    workers: Vec<JoinHandle<()>>,
}

impl WorkPool {
    /// Spawn `threads` workers (at least one).
    pub fn new(threads: usize) -> Self {
        let (task_tx, task_rx) = crossbeam_channel::unbounded::<Task>();
        let workers = (0..threads.max(1))
            .map(|i| {
                let task_rx: Receiver<Task> = task_rx.clone();
                thread::Builder::new()
                    .name(format!("tarena-worker-{i}"))
                    .spawn(move || {
                        for task in task_rx {
                            task();
                        }
                    })
                    .expect("failed to spawn pool worker")
            })
            .collect();
        Self {
            task_tx: Some(task_tx),
            workers,
        }
    }

    /// Number of worker threads.
    pub fn thread_count(&self) -> usize {
        self.workers.len()
    }

    /// Open a result queue holding at most `capacity` uncollected results.
    ///
    /// Workers block when the queue is full until results are collected.
    pub fn queue<T: Send + 'static>(&self, capacity: usize) -> JobQueue<'_, T> {
        let (result_tx, result_rx) = crossbeam_channel::bounded(capacity.max(1));
        JobQueue {
            pool: self,
            result_tx,
            result_rx,
            pending: AtomicUsize::new(0),
        }
    }

    /// Stop accepting work, let queued tasks finish, and join the workers.
    pub fn shutdown(&mut self) {
        self.task_tx = None;
        for handle in self.workers.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// One pipeline stage: jobs dispatched here report results here.
pub struct JobQueue<'p, T> {
    pool: &'p WorkPool,
    result_tx: Sender<T>,
    result_rx: Receiver<T>,
    /// Jobs dispatched whose results have not been collected yet.
    pending: AtomicUsize,
}

impl<T: Send + 'static> JobQueue<'_, T> {
    /// Run `job(arg)` on a pool thread; its return value becomes a result.
    pub fn dispatch<A, F>(&self, job: F, arg: A) -> Result<(), DispatchError>
    where
        A: Send + 'static,
        F: FnOnce(A) -> T + Send + 'static,
    {
        let task_tx = self.pool.task_tx.as_ref().ok_or(DispatchError::ShutDown)?;
        let result_tx = self.result_tx.clone();
        self.pending.fetch_add(1, Ordering::AcqRel);
        task_tx
            .send(Box::new(move || {
                let _ = result_tx.send(job(arg));
            }))
            .map_err(|_| {
                self.pending.fetch_sub(1, Ordering::AcqRel);
                DispatchError::ShutDown
            })
    }

    /// Block until the next result is available.
    ///
    /// Returns `None` immediately when no dispatched job is outstanding.
    pub fn next_result_wait(&self) -> Option<T> {
        if self.is_empty() {
            return None;
        }
        let result = self.result_rx.recv().ok()?;
        self.pending.fetch_sub(1, Ordering::AcqRel);
        Some(result)
    }

    /// Whether every dispatched job has had its result collected.
    pub fn is_empty(&self) -> bool {
        self.pending.load(Ordering::Acquire) == 0
    }

    /// Wait for every outstanding job and return their results.
    pub fn flush(&self) -> Vec<T> {
        let mut results = Vec::new();
        while let Some(result) = self.next_result_wait() {
            results.push(result);
        }
        results
    }
}
