use super::leaf::Launch;
use crate::error::Result;
use crate::runtime::context;

use std::fmt;

/// Observer of a task's completion event.
pub(crate) type Observer = Box<dyn FnOnce(bool)>;

/// What a handle launches.
pub(crate) enum Kind {
    /// A single work callable.
    Leaf(Box<dyn Launch>),

    /// Children started together; succeeds if all of them succeed.
    Weave(Vec<TaskHandle>),

    /// Children started one after another; stops at the first failure.
    Queue(Vec<TaskHandle>),
}

/// A startable task.
///
/// A `TaskHandle` is obtained from [`TaskBuilder::get`](crate::TaskBuilder::get),
/// [`weave`](crate::weave) or [`queue`](crate::queue). It is consumed by
/// [`start`](Self::start) or by being passed to a combinator, so a task can be
/// started at most once.
///
/// Dropping a handle without starting it discards the task; its work never
/// runs.
pub struct TaskHandle {
    kind: Kind,
    observers: Vec<Observer>,
}

impl TaskHandle {
    pub(crate) fn new(kind: Kind, observers: Vec<Observer>) -> Self {
        Self { kind, observers }
    }

    pub(crate) fn into_parts(self) -> (Kind, Vec<Observer>) {
        (self.kind, self.observers)
    }

    /// Registers an observer of the completion event.
    ///
    /// The observer receives the task's success flag on the owner context.
    /// For a weave or queue this is the aggregated flag of its children.
    pub fn on_complete(mut self, observer: impl FnOnce(bool) + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }

    /// Starts the task on the owner context of the current thread.
    ///
    /// This never blocks: leaf work is queued on the pool and the completion
    /// event is delivered later, when the event loop is driven.
    ///
    /// # Panics
    ///
    /// Panics if called outside an owner context, i.e. not within
    /// [`EventLoop::enter`](crate::EventLoop::enter),
    /// [`Runtime::block_on`](crate::Runtime::block_on) or a callback run by an
    /// event loop.
    pub fn start(self) {
        self.try_start()
            .expect("start must be called within an owner context");
    }

    /// Starts the task, failing instead of panicking without an owner context.
    pub fn try_start(self) -> Result<()> {
        context::with_current(|owner| owner.launch(self, None))
    }
}

impl fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = match &self.kind {
            Kind::Leaf(_) => f.debug_struct("Leaf"),
            Kind::Weave(children) => {
                let mut s = f.debug_struct("Weave");
                s.field("children", children);
                s
            }
            Kind::Queue(children) => {
                let mut s = f.debug_struct("Queue");
                s.field("children", children);
                s
            }
        };

        s.field("observers", &self.observers.len()).finish()
    }
}
