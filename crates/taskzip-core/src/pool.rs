//! Bounded worker pool with fan-in of results.
//!
//! Up to `limit` scoped OS threads pull jobs from a shared queue; each worker
//! sends `(index, result)` back over a channel and the calling thread is the
//! only one that writes into the result vector. The pool lives for one call.

use std::collections::VecDeque;
use std::sync::mpsc;
use std::sync::Mutex;

/// Runs `f` over every job with at most `limit` jobs in flight and returns the
/// results in input order. Returns only after every job has finished.
///
/// A `limit` of 0 is treated as 1.
pub fn run_bounded<T, R, F>(jobs: Vec<T>, limit: usize, f: F) -> Vec<R>
where
    T: Send,
    R: Send,
    F: Fn(T) -> R + Sync,
{
    let count = jobs.len();
    if count == 0 {
        return Vec::new();
    }

    let work: Mutex<VecDeque<(usize, T)>> = Mutex::new(jobs.into_iter().enumerate().collect());
    let num_workers = limit.max(1).min(count);
    let mut slots: Vec<Option<R>> = (0..count).map(|_| None).collect();

    std::thread::scope(|scope| {
        let (tx, rx) = mpsc::channel::<(usize, R)>();
        for _ in 0..num_workers {
            let tx = tx.clone();
            let work = &work;
            let f = &f;
            scope.spawn(move || loop {
                let next = work
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .pop_front();
                let Some((index, job)) = next else {
                    break;
                };
                if tx.send((index, f(job))).is_err() {
                    break;
                }
            });
        }
        drop(tx);
        for (index, result) in rx {
            slots[index] = Some(result);
        }
    });

    slots.into_iter().flatten().collect()
}
