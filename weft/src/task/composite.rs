use super::handle::{Kind, TaskHandle};

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// Creates a task that starts every child at once.
///
/// The weave completes once all children have completed, with success equal
/// to the logical AND of theirs. Children run concurrently, so no ordering
/// between them may be assumed. An empty weave completes successfully as soon
/// as it is driven.
///
/// # Examples
///
/// ```rust,ignore
/// weft::weave([
///     weft::task(|| fetch("a")).get(),
///     weft::task(|| fetch("b")).get(),
/// ])
/// .on_complete(|ok| println!("both fetched: {ok}"))
/// .start();
/// ```
pub fn weave<I>(tasks: I) -> TaskHandle
where
    I: IntoIterator,
    I::Item: Into<TaskHandle>,
{
    let children = tasks.into_iter().map(Into::into).collect();
    TaskHandle::new(Kind::Weave(children), Vec::new())
}

/// Completion bookkeeping of a weave.
///
/// Children may report from any thread. Each report decrements the counter
/// with a compare-and-swap; the report that takes it from one to zero is the
/// only one that observes the aggregate, so the weave completes exactly once.
pub(crate) struct JoinCounter {
    /// Children that have not reported yet.
    remaining: AtomicUsize,

    /// Set by any child reporting failure.
    failed: AtomicBool,
}

impl JoinCounter {
    pub(crate) fn new(children: usize) -> Self {
        Self {
            remaining: AtomicUsize::new(children),
            failed: AtomicBool::new(false),
        }
    }

    /// Folds in one child's result.
    ///
    /// Returns `Some(all_succeeded)` to the last reporter and `None` to every
    /// other one, including reports arriving after the count reached zero.
    pub(crate) fn record(&self, success: bool) -> Option<bool> {
        if !success {
            self.failed.store(true, Ordering::Release);
        }

        loop {
            let remaining = self.remaining.load(Ordering::Acquire);

            if remaining == 0 {
                return None;
            }

            if self
                .remaining
                .compare_exchange(remaining, remaining - 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                // The decrement chain orders every earlier `failed` store
                // before this load.
                return (remaining == 1).then(|| !self.failed.load(Ordering::Acquire));
            }
        }
    }

    /// Returns the number of children still expected to report.
    pub(crate) fn remaining(&self) -> usize {
        self.remaining.load(Ordering::Acquire)
    }
}
