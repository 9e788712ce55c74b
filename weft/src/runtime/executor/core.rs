use crate::error::{Error, Result};
use crate::runtime::executor::worker::Worker;
use crate::runtime::injector::{Injector, InjectorHandle};

use std::sync::Arc;
use std::thread::{self, JoinHandle};

/// Multi-threaded job executor.
///
/// The `Executor` is responsible for:
/// - spawning the worker threads,
/// - sharing the job injector with submitters,
/// - orderly shutdown and thread joining.
pub(crate) struct Executor {
    /// Job queue shared by all workers.
    injector: InjectorHandle,

    /// Join handles for worker threads.
    handles: Vec<JoinHandle<()>>,
}

impl Executor {
    /// Creates a new executor with the given number of worker threads.
    ///
    /// Threads are named `{name}-{index}`. If any thread fails to spawn, the
    /// ones already running are shut down and joined before the error is
    /// returned.
    ///
    /// # Arguments
    ///
    /// * `threads` - Number of worker threads
    /// * `name` - Thread name prefix
    pub(crate) fn new(threads: usize, name: &str) -> Result<Self> {
        let injector = Arc::new(Injector::new());

        let mut executor = Self {
            injector,
            handles: Vec::with_capacity(threads),
        };

        for id in 0..threads {
            let worker = Worker::new(id, executor.injector.clone());

            let spawned = thread::Builder::new()
                .name(format!("{name}-{id}"))
                .spawn(move || worker.run());

            match spawned {
                Ok(handle) => executor.handles.push(handle),
                Err(err) => {
                    executor.shutdown();
                    executor.join();
                    return Err(Error::Spawn(err));
                }
            }
        }

        tracing::debug!(threads, "executor started");

        Ok(executor)
    }

    /// Returns a handle submitters can push jobs through.
    pub(crate) fn injector(&self) -> InjectorHandle {
        self.injector.clone()
    }

    /// Returns the number of worker threads.
    pub(crate) fn threads(&self) -> usize {
        self.handles.len()
    }

    /// Signals all workers to shut down.
    pub(crate) fn shutdown(&self) {
        self.injector.shutdown();
    }

    /// Waits for all worker threads to terminate.
    ///
    /// This should be called after initiating shutdown.
    pub(crate) fn join(&mut self) {
        for h in self.handles.drain(..) {
            let _ = h.join();
        }
    }
}
