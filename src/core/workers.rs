//! Worker pool for background fetch execution.
//!
//! Uses crossbeam for an MPMC queue with closure-based task execution. All
//! gateway fetches run on these threads and complete via callback; the
//! callbacks re-enter shared state through the coordinator's mutex, where
//! staleness is decided (see the coordinator's generation counter).

use crossbeam_channel::{Sender, unbounded};
use log::{debug, error};
use std::thread;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Default pool size for the fetch workloads this crate drives: a handful of
/// concurrent image downloads plus at most one page fetch.
pub const DEFAULT_WORKER_THREADS: usize = 4;

/// Worker pool for IO-bound fetch tasks.
///
/// Workers execute arbitrary closures with captured state. Dropping the pool
/// closes the channel and lets the threads exit after their current job.
pub struct Workers {
    sender: Sender<Job>,
    _handles: Vec<thread::JoinHandle<()>>, // Keep handles to prevent premature drop
}

impl Workers {
    /// Create a pool with `num_threads` threads.
    pub fn new(num_threads: usize) -> Self {
        let num_threads = num_threads.max(1);
        let (tx, rx): (Sender<Job>, _) = unbounded();
        let mut handles = Vec::new();

        for worker_id in 0..num_threads {
            let rx = rx.clone();

            let handle = thread::Builder::new()
                .name(format!("photowall-worker-{}", worker_id))
                .spawn(move || {
                    debug!("Worker {} started", worker_id);

                    // Worker loop: execute closures until channel closes
                    while let Ok(job) = rx.recv() {
                        job();
                    }

                    debug!("Worker {} stopped", worker_id);
                })
                .expect("Failed to spawn worker thread");

            handles.push(handle);
        }

        debug!("Workers initialized: {} threads", num_threads);

        Self {
            sender: tx,
            _handles: handles,
        }
    }

    /// Execute closure on a worker thread.
    ///
    /// Runs asynchronously, no return value. Use Arc/Mutex for shared state.
    pub fn execute<F>(&self, f: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if let Err(e) = self.sender.send(Box::new(f)) {
            error!("Failed to enqueue job: {}", e);
        }
    }
}

impl Drop for Workers {
    fn drop(&mut self) {
        debug!("Workers shutting down ({} threads)...", self._handles.len());
        // Sender drops -> channel closes -> workers exit recv() loop
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[test]
    fn test_jobs_run_on_worker_threads() {
        let workers = Workers::new(2);
        let counter = Arc::new(AtomicUsize::new(0));
        let (done_tx, done_rx) = crossbeam_channel::unbounded();

        for _ in 0..10 {
            let counter = Arc::clone(&counter);
            let done_tx = done_tx.clone();
            workers.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                done_tx.send(()).unwrap();
            });
        }

        for _ in 0..10 {
            done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_drop_closes_pool() {
        let workers = Workers::new(1);
        let (done_tx, done_rx) = crossbeam_channel::unbounded();
        workers.execute(move || {
            done_tx.send(()).unwrap();
        });
        done_rx.recv_timeout(Duration::from_secs(5)).unwrap();
        drop(workers); // Must not hang
    }
}
