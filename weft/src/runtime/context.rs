use crate::error::{Error, Result};
use crate::runtime::event_loop::Owner;

use std::cell::RefCell;
use std::rc::Rc;

thread_local! {
    /// Owner context installed on the current thread.
    ///
    /// Set while an [`EventLoop`](crate::EventLoop) is entered or driven, so
    /// `TaskHandle::start()` can reach it without explicit parameter passing.
    pub(crate) static CURRENT_OWNER: RefCell<Option<Rc<Owner>>> =
        const { RefCell::new(None) };
}

/// Restores the previously installed owner when dropped, including on unwind.
struct Restore(Option<Rc<Owner>>);

impl Drop for Restore {
    fn drop(&mut self) {
        let prev = self.0.take();
        CURRENT_OWNER.with(|o| o.replace(prev));
    }
}

/// Enters an owner context for the current thread.
///
/// `owner` is installed for the duration of the closure `f`; the previous
/// context is restored afterwards. Contexts nest.
///
/// # Arguments
///
/// * `owner` - Owner context to install.
/// * `f` - Closure executed inside the context.
pub(crate) fn enter_context<R>(owner: Rc<Owner>, f: impl FnOnce() -> R) -> R {
    let prev = CURRENT_OWNER.with(|o| o.replace(Some(owner)));
    let _restore = Restore(prev);

    f()
}

/// Runs `f` against the owner context of the current thread.
///
/// The thread-local borrow is released before `f` runs, so `f` may start
/// tasks or enter nested contexts.
pub(crate) fn with_current<R>(f: impl FnOnce(&Owner) -> R) -> Result<R> {
    let owner = CURRENT_OWNER
        .with(|o| o.borrow().clone())
        .ok_or(Error::NoContext)?;

    Ok(f(&owner))
}
