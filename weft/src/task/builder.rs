use super::handle::{Kind, Observer, TaskHandle};
use super::leaf::{Fallible, Plain};

/// Builder for configuring a leaf task before it is launched.
///
/// `TaskBuilder` exists so callbacks are attached before the task can be
/// started: [`get`](Self::get) consumes the builder, so nothing can be
/// registered on a task once a startable handle exists.
///
/// Callbacks run on the owner context (the thread driving the
/// [`EventLoop`](crate::EventLoop) the task was started on), never on a pool
/// thread, so they need not be `Send`.
///
/// # Examples
///
/// ```rust,ignore
/// weft::try_task(|| "42".parse::<u32>())
///     .on_done(|n| println!("parsed {n}"))
///     .on_error(|e| eprintln!("bad input: {e}"))
///     .start();
/// ```
pub struct TaskBuilder<L> {
    /// The leaf being configured.
    leaf: L,

    /// Completion observers, in registration order.
    observers: Vec<Observer>,
}

/// Creates a task from a work callable returning a plain value.
///
/// The work runs on the pool; the value is handed to the
/// [`on_done`](TaskBuilder::on_done) callback on the owner context. A plain
/// task always reports success once its work has returned. For work that can
/// fail, use [`try_task`].
pub fn task<F, T>(work: F) -> TaskBuilder<Plain<F, T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    TaskBuilder {
        leaf: Plain {
            work,
            on_done: None,
        },
        observers: Vec::new(),
    }
}

/// Creates a task from a work callable returning a `Result`.
///
/// `Ok` values go to [`on_done`](TaskBuilder::on_done) and `Err` values to
/// [`on_error`](TaskBuilder::on_error); the completion event carries `true`
/// for `Ok` and `false` for `Err`.
pub fn try_task<F, T, E>(work: F) -> TaskBuilder<Fallible<F, T, E>>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    TaskBuilder {
        leaf: Fallible {
            work,
            on_done: None,
            on_error: None,
        },
        observers: Vec::new(),
    }
}

impl<L> TaskBuilder<L> {
    /// Registers an observer of the completion event.
    ///
    /// Observers receive the success flag after the success or failure
    /// callback has run. Several observers may be registered; they run in
    /// registration order.
    pub fn on_complete(mut self, observer: impl FnOnce(bool) + 'static) -> Self {
        self.observers.push(Box::new(observer));
        self
    }
}

impl<F, T> TaskBuilder<Plain<F, T>>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    /// Sets the callback receiving the work's value.
    ///
    /// Plain tasks have no failure callback; there is no `on_error` here.
    /// Setting it again replaces the previous callback.
    pub fn on_done(mut self, callback: impl FnOnce(T) + 'static) -> Self {
        self.leaf.on_done = Some(Box::new(callback));
        self
    }

    /// Returns the startable handle.
    pub fn get(self) -> TaskHandle {
        TaskHandle::new(Kind::Leaf(Box::new(self.leaf)), self.observers)
    }

    /// Shorthand for `get().start()`.
    ///
    /// # Panics
    ///
    /// Panics if called outside an owner context.
    pub fn start(self) {
        self.get().start();
    }
}

impl<F, T, E> TaskBuilder<Fallible<F, T, E>>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    /// Sets the callback receiving the `Ok` value.
    ///
    /// Setting it again replaces the previous callback.
    pub fn on_done(mut self, callback: impl FnOnce(T) + 'static) -> Self {
        self.leaf.on_done = Some(Box::new(callback));
        self
    }

    /// Sets the callback receiving the `Err` value.
    ///
    /// Setting it again replaces the previous callback.
    pub fn on_error(mut self, callback: impl FnOnce(E) + 'static) -> Self {
        self.leaf.on_error = Some(Box::new(callback));
        self
    }

    /// Returns the startable handle.
    pub fn get(self) -> TaskHandle {
        TaskHandle::new(Kind::Leaf(Box::new(self.leaf)), self.observers)
    }

    /// Shorthand for `get().start()`.
    ///
    /// # Panics
    ///
    /// Panics if called outside an owner context.
    pub fn start(self) {
        self.get().start();
    }
}

impl<F, T> From<TaskBuilder<Plain<F, T>>> for TaskHandle
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    fn from(builder: TaskBuilder<Plain<F, T>>) -> Self {
        builder.get()
    }
}

impl<F, T, E> From<TaskBuilder<Fallible<F, T, E>>> for TaskHandle
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    fn from(builder: TaskBuilder<Fallible<F, T, E>>) -> Self {
        builder.get()
    }
}
