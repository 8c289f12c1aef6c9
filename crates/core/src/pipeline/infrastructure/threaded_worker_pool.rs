use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use thiserror::Error;

/// A task that panicked instead of returning.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("worker task panicked: {message}")]
pub struct TaskPanic {
    pub message: String,
}

impl TaskPanic {
    fn from_payload(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        Self { message }
    }
}

/// Bounded pool of scoped worker threads draining a pre-filled task queue.
///
/// Layout: `queue (all tasks) → N workers → completion channel → caller`
///
/// Every item is queued up front; `min(max_workers, items)` threads pull
/// from the queue until it is empty. Completions are delivered on the
/// calling thread, tagged with the item's submission index, in whatever
/// order they finish. A panicking task is reported as [`TaskPanic`] for its
/// index and does not take down its worker or siblings.
pub struct ThreadedWorkerPool {
    max_workers: usize,
}

impl ThreadedWorkerPool {
    pub fn new(max_workers: usize) -> Self {
        Self {
            max_workers: max_workers.max(1),
        }
    }

    pub fn max_workers(&self) -> usize {
        self.max_workers
    }

    /// Run `task` over `items`, calling `on_complete(index, result)` on this
    /// thread as each one finishes. Returns once every task has completed.
    pub fn run<T, R, F, C>(&self, items: Vec<T>, task: F, mut on_complete: C)
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
        C: FnMut(usize, Result<R, TaskPanic>),
    {
        if items.is_empty() {
            return;
        }
        let workers = self.max_workers.min(items.len());

        let (job_tx, job_rx) = crossbeam_channel::unbounded::<(usize, T)>();
        for job in items.into_iter().enumerate() {
            // Receiver is alive in this scope; send cannot fail.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        let (done_tx, done_rx) = crossbeam_channel::unbounded::<(usize, Result<R, TaskPanic>)>();
        let task = &task;

        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let done_tx = done_tx.clone();
                scope.spawn(move || {
                    for (index, item) in job_rx {
                        let result = panic::catch_unwind(AssertUnwindSafe(|| task(item)))
                            .map_err(TaskPanic::from_payload);
                        if done_tx.send((index, result)).is_err() {
                            break;
                        }
                    }
                });
            }
            drop(done_tx);

            for (index, result) in done_rx {
                on_complete(index, result);
            }
        });
    }

    /// Run `task` over `items` and return the results in submission order.
    pub fn map_indexed<T, R, F>(&self, items: Vec<T>, task: F) -> Vec<Result<R, TaskPanic>>
    where
        T: Send,
        R: Send,
        F: Fn(T) -> R + Sync,
    {
        let mut slots: Vec<Option<Result<R, TaskPanic>>> = (0..items.len()).map(|_| None).collect();
        self.run(items, task, |index, result| slots[index] = Some(result));
        slots
            .into_iter()
            .map(|slot| {
                slot.unwrap_or_else(|| {
                    Err(TaskPanic {
                        message: "task never completed".to_string(),
                    })
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Barrier;
    use std::time::Duration;

    #[test]
    fn test_results_are_returned_in_submission_order() {
        let pool = ThreadedWorkerPool::new(4);
        // Earlier items sleep longer so they finish last.
        let items: Vec<u64> = (0..8).collect();
        let results = pool.map_indexed(items, |i| {
            thread::sleep(Duration::from_millis((8 - i) * 5));
            i * 10
        });
        let values: Vec<u64> = results.into_iter().map(|r| r.unwrap()).collect();
        assert_eq!(values, vec![0, 10, 20, 30, 40, 50, 60, 70]);
    }

    #[test]
    fn test_concurrency_never_exceeds_bound() {
        let pool = ThreadedWorkerPool::new(3);
        let active = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);

        pool.map_indexed((0..12).collect::<Vec<_>>(), |_: i32| {
            let now = active.fetch_add(1, Ordering::SeqCst) + 1;
            peak.fetch_max(now, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(5));
            active.fetch_sub(1, Ordering::SeqCst);
        });

        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[test]
    fn test_workers_actually_run_in_parallel() {
        // Each group of three tasks can only pass the barrier together, so
        // this would hang with fewer than three concurrent workers.
        let pool = ThreadedWorkerPool::new(3);
        let barrier = Barrier::new(3);
        let results = pool.map_indexed((0..6).collect::<Vec<_>>(), |i: i32| {
            barrier.wait();
            i
        });
        assert_eq!(results.len(), 6);
        assert!(results.iter().all(|r| r.is_ok()));
    }

    #[test]
    fn test_panicking_task_is_isolated() {
        let pool = ThreadedWorkerPool::new(2);
        let results = pool.map_indexed(vec![1, 2, 3, 4], |i: i32| {
            if i == 2 {
                panic!("boom on {i}");
            }
            i
        });

        assert_eq!(results[0], Ok(1));
        assert_eq!(results[2], Ok(3));
        assert_eq!(results[3], Ok(4));
        let err = results[1].clone().unwrap_err();
        assert!(err.message.contains("boom on 2"), "got: {}", err.message);
    }

    #[test]
    fn test_completions_delivered_on_calling_thread() {
        let pool = ThreadedWorkerPool::new(4);
        let caller = thread::current().id();
        let mut seen = Vec::new();
        pool.run(
            vec!["a", "b", "c"],
            |s: &str| s.to_uppercase(),
            |index, result| {
                assert_eq!(thread::current().id(), caller);
                seen.push((index, result.unwrap()));
            },
        );
        seen.sort();
        assert_eq!(
            seen,
            vec![(0, "A".to_string()), (1, "B".to_string()), (2, "C".to_string())]
        );
    }

    #[test]
    fn test_empty_input_runs_nothing() {
        let pool = ThreadedWorkerPool::new(2);
        let mut calls = 0;
        pool.run(Vec::<u8>::new(), |x| x, |_, _| calls += 1);
        assert_eq!(calls, 0);
    }

    #[test]
    fn test_zero_workers_is_clamped_to_one() {
        let pool = ThreadedWorkerPool::new(0);
        assert_eq!(pool.max_workers(), 1);
        let results = pool.map_indexed(vec![5, 6], |x: i32| x + 1);
        assert_eq!(results, vec![Ok(6), Ok(7)]);
    }
}
