//! Dispatch a fixed set of slice jobs, block until all of them are done, then
//! hand each job's outcome back through its own [`CompletionHandle`].
//!
//! Two strategies share this interface: [`ThreadDispatcher`] starts one
//! scoped OS thread per job and joins them all, [`PoolDispatcher`] queues the
//! jobs on a bounded rayon pool and waits for it to drain. Jobs may borrow
//! from the caller's stack (regions, containers, accumulators) since both
//! strategies return only once every job has finished.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded};
use log::error;

use crate::errors::{EngineError, Result, WorkerError};
use crate::partition::Slice;

type Work<'env, T> = Box<dyn FnOnce() -> std::result::Result<T, WorkerError> + Send + 'env>;
type Outcome<T> = std::result::Result<T, WorkerError>;

/// One unit of work bound to the slice it processes.
pub struct Job<'env, T> {
    slice: Slice,
    work: Work<'env, T>,
}

impl<'env, T> Job<'env, T> {
    pub fn new<F>(slice: Slice, work: F) -> Self
    where
        F: FnOnce() -> std::result::Result<T, WorkerError> + Send + 'env,
    {
        Job {
            slice,
            work: Box::new(work),
        }
    }

    pub fn slice(&self) -> Slice {
        self.slice
    }
}

/// The outcome of one dispatched job, consumed exactly once.
#[derive(Debug)]
pub struct CompletionHandle<T> {
    index: usize,
    slice: Slice,
    receiver: Receiver<Outcome<T>>,
}

impl<T> CompletionHandle<T> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn slice(&self) -> Slice {
        self.slice
    }

    /// The job's value, or the failure it reported tagged with its slice.
    pub fn wait(self) -> Result<T> {
        let outcome = self
            .receiver
            .recv()
            .unwrap_or(Err(WorkerError::Vanished));

        outcome.map_err(|source| EngineError::WorkerFailure {
            index: self.index,
            slice: self.slice,
            source,
        })
    }
}

pub trait Dispatcher {
    /// Run every job and return once all have completed. Handles come back in
    /// job order.
    fn dispatch<'env, T: Send + 'env>(&self, jobs: Vec<Job<'env, T>>) -> Vec<CompletionHandle<T>>;
}

/// One OS thread per job, all joined before returning.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadDispatcher;

impl Dispatcher for ThreadDispatcher {
    fn dispatch<'env, T: Send + 'env>(&self, jobs: Vec<Job<'env, T>>) -> Vec<CompletionHandle<T>> {
        let (units, handles) = bind(jobs);

        thread::scope(|scope| {
            for (index, (work, sender)) in units.into_iter().enumerate() {
                let fallback = sender.clone();
                let spawned = thread::Builder::new()
                    .name(format!("cpgkin-worker-{}", index))
                    .spawn_scoped(scope, move || {
                        let _ = sender.send(run_guarded(work));
                    });

                if let Err(err) = spawned {
                    error!("Could not start worker {}: {}", index, err);
                    let _ = fallback.send(Err(WorkerError::Io(err)));
                }
            }
        });

        handles
    }
}

/// A rayon pool with a fixed number of slots. More jobs than slots simply queue.
pub struct PoolDispatcher {
    pool: rayon::ThreadPool,
    slots: usize,
}

impl PoolDispatcher {
    pub fn new(slots: usize) -> Result<Self> {
        if slots == 0 {
            return Err(EngineError::Configuration(
                "a worker pool needs at least one slot".to_string(),
            ));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(slots)
            .thread_name(|i| format!("cpgkin-pool-{}", i))
            .build()
            .map_err(|err| {
                EngineError::Configuration(format!("cannot build worker pool: {}", err))
            })?;

        Ok(PoolDispatcher { pool, slots })
    }

    pub fn slots(&self) -> usize {
        self.slots
    }
}

impl Dispatcher for PoolDispatcher {
    fn dispatch<'env, T: Send + 'env>(&self, jobs: Vec<Job<'env, T>>) -> Vec<CompletionHandle<T>> {
        let (units, handles) = bind(jobs);

        // the scope only returns once every spawned job has run
        self.pool.scope(move |scope| {
            for (work, sender) in units {
                scope.spawn(move |_| {
                    let _ = sender.send(run_guarded(work));
                });
            }
        });

        handles
    }
}

#[allow(clippy::type_complexity)]
fn bind<'env, T>(
    jobs: Vec<Job<'env, T>>,
) -> (
    Vec<(Work<'env, T>, Sender<Outcome<T>>)>,
    Vec<CompletionHandle<T>>,
) {
    let mut units = Vec::with_capacity(jobs.len());
    let mut handles = Vec::with_capacity(jobs.len());

    for (index, job) in jobs.into_iter().enumerate() {
        let (sender, receiver) = bounded(1);
        units.push((job.work, sender));
        handles.push(CompletionHandle {
            index,
            slice: job.slice,
            receiver,
        });
    }

    (units, handles)
}

fn run_guarded<T>(work: Work<'_, T>) -> Outcome<T> {
    match panic::catch_unwind(AssertUnwindSafe(work)) {
        Ok(outcome) => outcome,
        Err(payload) => Err(WorkerError::Panicked(panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use pretty_assertions::assert_eq;
    use rstest::*;

    use crate::partition::split_range;

    fn square_jobs<'a>(values: &'a [usize], parts: usize) -> Vec<Job<'a, Vec<usize>>> {
        split_range(values.len(), parts)
            .unwrap()
            .into_iter()
            .map(|slice| {
                Job::new(slice, move || {
                    Ok(values[slice.range()].iter().map(|v| v * v).collect())
                })
            })
            .collect()
    }

    fn collect(handles: Vec<CompletionHandle<Vec<usize>>>) -> Vec<usize> {
        handles
            .into_iter()
            .flat_map(|handle| handle.wait().unwrap())
            .collect()
    }

    #[rstest]
    fn test_threads_keep_job_order() {
        let values: Vec<usize> = (0..23).collect();
        let handles = ThreadDispatcher.dispatch(square_jobs(&values, 4));

        assert_eq!(handles.len(), 4);
        assert_eq!(
            collect(handles),
            values.iter().map(|v| v * v).collect::<Vec<_>>()
        );
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(5)]
    fn test_pool_with_more_jobs_than_slots(#[case] slots: usize) {
        let values: Vec<usize> = (0..40).collect();
        let pool = PoolDispatcher::new(slots).unwrap();
        let handles = pool.dispatch(square_jobs(&values, 7));

        assert_eq!(
            collect(handles),
            values.iter().map(|v| v * v).collect::<Vec<_>>()
        );
    }

    #[rstest]
    fn test_jobs_may_mutate_borrowed_state() {
        let mut totals = vec![0usize; 3];
        let slices = split_range(9, 3).unwrap();

        let jobs: Vec<Job<'_, ()>> = totals
            .iter_mut()
            .zip(slices)
            .map(|(total, slice)| {
                Job::new(slice, move || {
                    *total = slice.range().sum();
                    Ok(())
                })
            })
            .collect();

        for handle in ThreadDispatcher.dispatch(jobs) {
            handle.wait().unwrap();
        }

        assert_eq!(totals, vec![3, 12, 21]);
    }

    #[rstest]
    fn test_errors_are_tagged_with_their_slice() {
        let slices = split_range(6, 3).unwrap();
        let jobs: Vec<Job<'_, ()>> = slices
            .iter()
            .map(|&slice| {
                Job::new(slice, move || {
                    if slice.from == 2 {
                        Err(WorkerError::Accumulator("boom".to_string()))
                    } else {
                        Ok(())
                    }
                })
            })
            .collect();

        let outcomes: Vec<_> = PoolDispatcher::new(3)
            .unwrap()
            .dispatch(jobs)
            .into_iter()
            .map(CompletionHandle::wait)
            .collect();

        assert!(outcomes[0].is_ok());
        assert!(outcomes[2].is_ok());
        match &outcomes[1] {
            Err(EngineError::WorkerFailure { index, slice, .. }) => {
                assert_eq!(*index, 1);
                assert_eq!(*slice, Slice { from: 2, to: 4 });
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[rstest]
    fn test_panics_are_captured() {
        let slice = Slice { from: 0, to: 1 };
        let jobs: Vec<Job<'_, ()>> = vec![Job::new(slice, || panic!("bad record"))];

        for dispatcher_outcome in [
            ThreadDispatcher.dispatch(jobs).remove(0).wait(),
            PoolDispatcher::new(1)
                .unwrap()
                .dispatch(vec![Job::new(slice, || -> Outcome<()> {
                    panic!("bad record")
                })])
                .remove(0)
                .wait(),
        ] {
            match dispatcher_outcome {
                Err(EngineError::WorkerFailure {
                    source: WorkerError::Panicked(message),
                    ..
                }) => assert_eq!(message, "bad record"),
                other => panic!("unexpected outcome: {:?}", other),
            }
        }
    }

    #[rstest]
    fn test_every_job_runs_once() {
        let runs = AtomicUsize::new(0);
        let slices = split_range(100, 10).unwrap();
        let jobs: Vec<Job<'_, ()>> = slices
            .into_iter()
            .map(|slice| {
                let runs = &runs;
                Job::new(slice, move || {
                    runs.fetch_add(1, Ordering::SeqCst);
                    Ok(())
                })
            })
            .collect();

        let handles = PoolDispatcher::new(3).unwrap().dispatch(jobs);
        assert_eq!(handles.len(), 10);
        assert_eq!(runs.load(Ordering::SeqCst), 10);
    }

    #[rstest]
    fn test_zero_slot_pool_is_rejected() {
        assert!(matches!(
            PoolDispatcher::new(0),
            Err(EngineError::Configuration(_))
        ));
    }
}
