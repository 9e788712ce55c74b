use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

/// A unit of work handed to the pool.
pub(crate) type Job = Box<dyn FnOnce() + Send + 'static>;

/// Shared handle to the job queue.
pub(crate) type InjectorHandle = Arc<Injector>;

/// Returned when a job is pushed after shutdown.
///
/// The job itself has already been dropped by the time the caller sees this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Rejected;

/// Global job queue shared by every worker of the pool.
///
/// Submitters push to the back, workers pop from the front. Idle workers
/// sleep on the condition variable until a job arrives or the pool shuts
/// down.
pub(crate) struct Injector {
    /// Queued jobs and the shutdown flag, guarded together so a worker can
    /// never miss the wake-up that goes with either.
    state: Mutex<State>,

    /// Condition variable used to wake sleeping workers.
    condvar: Condvar,
}

struct State {
    jobs: VecDeque<Job>,
    shutdown: bool,
}

impl Injector {
    /// Creates an empty injector.
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(State {
                jobs: VecDeque::new(),
                shutdown: false,
            }),
            condvar: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        // Jobs never run under this lock, so a poisoned guard still holds
        // consistent data.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Pushes a job and wakes one sleeping worker.
    ///
    /// After shutdown the job is dropped instead of queued.
    pub(crate) fn push(&self, job: Job) -> Result<(), Rejected> {
        {
            let mut state = self.lock();

            if !state.shutdown {
                state.jobs.push_back(job);
                drop(state);

                self.condvar.notify_one();
                return Ok(());
            }
        }

        drop(job);
        Err(Rejected)
    }

    /// Takes the next job, sleeping while the queue is empty.
    ///
    /// Returns `None` once the pool is shutting down.
    pub(crate) fn pop(&self) -> Option<Job> {
        let mut state = self.lock();

        loop {
            if state.shutdown {
                return None;
            }

            if let Some(job) = state.jobs.pop_front() {
                return Some(job);
            }

            state = self
                .condvar
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Signals shutdown and wakes every worker.
    ///
    /// Jobs still queued are dropped here, outside the lock, so whatever they
    /// own is released before the workers are joined.
    pub(crate) fn shutdown(&self) {
        let abandoned = {
            let mut state = self.lock();
            state.shutdown = true;
            std::mem::take(&mut state.jobs)
        };

        self.condvar.notify_all();

        if !abandoned.is_empty() {
            tracing::warn!(
                jobs = abandoned.len(),
                "pool shut down with queued work; dropping it"
            );
        }

        drop(abandoned);
    }
}
