use super::event_loop::EventLoop;
use super::executor::core::Executor;
use crate::error::Result;

/// The main runtime handle.
///
/// `Runtime` is responsible for:
/// - owning the worker pool that runs work items,
/// - creating owner contexts ([`EventLoop`]s) that submit to it,
/// - providing a synchronous entry point via [`block_on`](Self::block_on).
///
/// Dropping the runtime shuts the pool down: queued work that has not
/// started is discarded (its tasks complete with failure), running work
/// finishes, and the worker threads are joined.
pub struct Runtime {
    /// Worker pool running the submitted work.
    executor: Executor,
}

impl Runtime {
    /// Creates a new runtime instance.
    ///
    /// # Arguments
    ///
    /// * `worker_threads` - Number of worker threads used by the executor.
    /// * `thread_name` - Name prefix of the worker threads.
    pub(crate) fn new(worker_threads: usize, thread_name: &str) -> Result<Self> {
        let executor = Executor::new(worker_threads, thread_name)?;

        Ok(Self { executor })
    }

    /// Creates an owner context bound to this runtime's pool.
    ///
    /// The loop may outlive the runtime; work started after the runtime is
    /// dropped is rejected and its tasks complete with failure.
    pub fn event_loop(&self) -> EventLoop {
        EventLoop::new(self.executor.injector())
    }

    /// Runs `f` in a fresh owner context on the current thread, then drives
    /// that context until every task started in it has completed.
    ///
    /// This is the synchronous entry point of the runtime (e.g. in `main` or
    /// tests). Returns the value of `f`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// runtime.block_on(|| {
    ///     weft::task(|| 40 + 2)
    ///         .on_done(|v| assert_eq!(v, 42))
    ///         .start();
    /// })?;
    /// ```
    pub fn block_on<R>(&self, f: impl FnOnce() -> R) -> Result<R> {
        let event_loop = self.event_loop();

        let value = event_loop.enter(f);
        event_loop.run()?;

        Ok(value)
    }

    /// Returns the number of worker threads of the pool.
    pub fn worker_threads(&self) -> usize {
        self.executor.threads()
    }
}

impl Drop for Runtime {
    /// Shuts down the runtime.
    ///
    /// This performs the following steps:
    /// 1. Stops job submission and discards queued jobs
    /// 2. Wakes every worker so it can exit
    /// 3. Joins all worker threads
    fn drop(&mut self) {
        self.executor.shutdown();
        self.executor.join();
    }
}
