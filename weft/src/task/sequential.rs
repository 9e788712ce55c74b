use super::handle::{Kind, TaskHandle};

use std::collections::VecDeque;

/// Creates a task that runs its children one after another.
///
/// Only the first child is started; each success starts the next one in
/// order, and the queue succeeds once the last child has succeeded. The first
/// failure completes the queue with failure, and no later child is ever
/// started. An empty queue completes successfully as soon as it is driven.
///
/// # Examples
///
/// ```rust,ignore
/// weft::queue([download.get(), unpack.get(), install.get()])
///     .on_complete(|ok| println!("installed: {ok}"))
///     .start();
/// ```
pub fn queue<I>(tasks: I) -> TaskHandle
where
    I: IntoIterator,
    I::Item: Into<TaskHandle>,
{
    let children = tasks.into_iter().map(Into::into).collect();
    TaskHandle::new(Kind::Queue(children), Vec::new())
}

/// What a queue does after a child has reported.
pub(crate) enum Step {
    /// Start this child next.
    Start(TaskHandle),

    /// Complete the queue with this flag.
    Finish(bool),
}

/// Children of a queue that have not been started yet.
pub(crate) struct Sequence {
    pending: VecDeque<TaskHandle>,
}

impl Sequence {
    /// Splits off the first child, which the caller starts right away.
    pub(crate) fn new(children: Vec<TaskHandle>) -> (Self, Option<TaskHandle>) {
        let mut pending = VecDeque::from(children);
        let first = pending.pop_front();

        (Self { pending }, first)
    }

    /// Decides the next step after the running child reported `success`.
    ///
    /// On failure the remaining children stay unstarted; they are dropped
    /// with the queue.
    pub(crate) fn report(&mut self, success: bool) -> Step {
        if !success {
            return Step::Finish(false);
        }

        match self.pending.pop_front() {
            Some(next) => Step::Start(next),
            None => Step::Finish(true),
        }
    }

    /// Returns the number of children not started yet.
    pub(crate) fn pending(&self) -> usize {
        self.pending.len()
    }
}
