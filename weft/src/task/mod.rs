//! Task primitives.
//!
//! This module defines the values callers compose before anything runs:
//! - leaf tasks wrapping a work callable ([`task`], [`try_task`]),
//! - the [`TaskBuilder`] used to attach callbacks before launch,
//! - the startable [`TaskHandle`],
//! - the two combinators, [`weave`] (parallel AND-join) and [`queue`]
//!   (ordered, fail-fast chain).
//!
//! Running tasks are owned by the [`EventLoop`](crate::EventLoop) they were
//! started on; this module only describes them.

mod builder;
mod composite;
mod handle;
mod leaf;
mod sequential;

pub(crate) use composite::JoinCounter;
pub(crate) use handle::{Kind, Observer};
pub(crate) use leaf::Settle;
pub(crate) use sequential::{Sequence, Step};

pub use builder::{TaskBuilder, task, try_task};
pub use composite::weave;
pub use handle::TaskHandle;
pub use leaf::{Fallible, Plain};
pub use sequential::queue;

use std::fmt;

/// Identifier of a started task, unique within its event loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct TaskId(pub(crate) u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
