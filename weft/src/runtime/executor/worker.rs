use crate::runtime::injector::InjectorHandle;

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// A worker thread of the pool.
///
/// Workers pull jobs from the shared injector and run them to completion one
/// at a time. A panicking job is contained here so the thread survives and
/// keeps serving the queue.
pub(crate) struct Worker {
    /// Index of the worker, used for diagnostics.
    id: usize,

    /// Handle to the shared job queue.
    injector: InjectorHandle,
}

impl Worker {
    /// Creates a new worker.
    ///
    /// # Arguments
    ///
    /// * `id` - Worker index
    /// * `injector` - Shared job queue
    pub(crate) fn new(id: usize, injector: InjectorHandle) -> Self {
        Self { id, injector }
    }

    /// Runs the worker loop until the injector shuts down.
    pub(crate) fn run(&self) {
        tracing::trace!(worker = self.id, "worker started");

        while let Some(job) = self.injector.pop() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                tracing::error!(
                    worker = self.id,
                    panic = panic_message(payload.as_ref()),
                    "work item panicked"
                );
            }
        }

        tracing::trace!(worker = self.id, "worker stopped");
    }
}

/// Extracts the message of a panic payload, if it carries one.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "<non-string panic payload>"
    }
}
