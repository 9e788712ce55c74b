//! Hand-off of a work item's result from the pool back to the owner thread.
//!
//! Submitting work produces two halves: an [`Outcome`] kept by the owner and
//! a [`Resolver`] that travels with the job. The resolver stores the value and
//! then posts the task id to the owner's completion channel. If the resolver
//! is dropped without a value (the work panicked, or the pool rejected the
//! job) it still posts the id, so the owner always hears back exactly once.

use crate::runtime::injector::{InjectorHandle, Rejected};
use crate::task::TaskId;

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};

type Slot<T> = Arc<Mutex<Option<T>>>;

/// Owner-side half: becomes ready once the resolver has run or been dropped.
pub(crate) struct Outcome<T> {
    slot: Slot<T>,
}

impl<T> Outcome<T> {
    /// Takes the resolved value.
    ///
    /// `None` means the work never produced one.
    pub(crate) fn take(&self) -> Option<T> {
        self.slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Worker-side half.
pub(crate) struct Resolver<T> {
    slot: Slot<T>,
    notify: Option<Notify>,
}

impl<T> Resolver<T> {
    /// Stores the value, then tells the owner it is ready.
    pub(crate) fn resolve(mut self, value: T) {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(value);

        if let Some(notify) = self.notify.take() {
            notify.send();
        }
    }
}

impl<T> Drop for Resolver<T> {
    fn drop(&mut self) {
        if let Some(notify) = self.notify.take() {
            tracing::trace!(task = %notify.id, "work dropped without a result");
            notify.send();
        }
    }
}

/// Posts a task id to the completion channel of its owner.
pub(crate) struct Notify {
    id: TaskId,
    sender: Sender<TaskId>,
}

impl Notify {
    pub(crate) fn new(id: TaskId, sender: Sender<TaskId>) -> Self {
        Self { id, sender }
    }

    fn send(self) {
        if self.sender.send(self.id).is_err() {
            tracing::trace!(task = %self.id, "owner context gone; completion discarded");
        }
    }
}

/// Creates a connected outcome/resolver pair.
pub(crate) fn channel<T>(notify: Notify) -> (Outcome<T>, Resolver<T>) {
    let slot = Arc::new(Mutex::new(None));

    (
        Outcome { slot: slot.clone() },
        Resolver {
            slot,
            notify: Some(notify),
        },
    )
}

/// Submits work items on behalf of one task.
pub(crate) struct Submitter {
    injector: InjectorHandle,
    notify: Notify,
}

impl Submitter {
    pub(crate) fn new(injector: InjectorHandle, notify: Notify) -> Self {
        Self { injector, notify }
    }

    /// Queues `work` on the pool and returns the outcome it will resolve.
    ///
    /// A rejected job is dropped together with its resolver, which leaves the
    /// outcome empty and still notifies the owner.
    pub(crate) fn submit<F, T>(self, work: F) -> Outcome<T>
    where
        F: FnOnce() -> T + Send + 'static,
        T: Send + 'static,
    {
        let id = self.notify.id;
        let (outcome, resolver) = channel(self.notify);

        let job = Box::new(move || resolver.resolve(work()));

        if let Err(Rejected) = self.injector.push(job) {
            tracing::warn!(task = %id, "pool is shut down; work rejected");
        }

        outcome
    }
}
