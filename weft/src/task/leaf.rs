use crate::runtime::outcome::Submitter;

/// Owner-side completion step of a leaf.
///
/// Runs the success or failure callback for the resolved outcome and returns
/// the success flag to report. Returns `false` without running either
/// callback when the work never produced a value.
pub(crate) type Settle = Box<dyn FnOnce() -> bool>;

/// A leaf task that can be put on the pool.
///
/// This is the one seam where the leaf kinds differ: how the work is
/// submitted and how its outcome is turned into callbacks and a flag.
pub(crate) trait Launch {
    /// Submits the work and returns the step to run once it is ready.
    fn launch(self: Box<Self>, submitter: Submitter) -> Settle;
}

/// Leaf whose work returns a plain value.
///
/// Plain leaves have no failure channel: once the work returns they always
/// report success.
pub struct Plain<F, T> {
    pub(crate) work: F,
    pub(crate) on_done: Option<Box<dyn FnOnce(T)>>,
}

impl<F, T> Launch for Plain<F, T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    fn launch(self: Box<Self>, submitter: Submitter) -> Settle {
        let Plain { work, on_done } = *self;
        let outcome = submitter.submit(work);

        Box::new(move || match outcome.take() {
            Some(value) => {
                if let Some(on_done) = on_done {
                    on_done(value);
                }
                true
            }
            None => false,
        })
    }
}

/// Leaf whose work returns a `Result`.
///
/// `Ok` goes to the success callback, `Err` to the failure callback; exactly
/// one of them runs per resolved outcome.
pub struct Fallible<F, T, E> {
    pub(crate) work: F,
    pub(crate) on_done: Option<Box<dyn FnOnce(T)>>,
    pub(crate) on_error: Option<Box<dyn FnOnce(E)>>,
}

impl<F, T, E> Launch for Fallible<F, T, E>
where
    F: FnOnce() -> Result<T, E> + Send + 'static,
    T: Send + 'static,
    E: Send + 'static,
{
    fn launch(self: Box<Self>, submitter: Submitter) -> Settle {
        let Fallible {
            work,
            on_done,
            on_error,
        } = *self;
        let outcome = submitter.submit(work);

        Box::new(move || match outcome.take() {
            Some(Ok(value)) => {
                if let Some(on_done) = on_done {
                    on_done(value);
                }
                true
            }
            Some(Err(error)) => {
                if let Some(on_error) = on_error {
                    on_error(error);
                }
                false
            }
            None => false,
        })
    }
}
