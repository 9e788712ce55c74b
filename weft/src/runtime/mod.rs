//! Core runtime components.
//!
//! This module contains everything that runs tasks, as opposed to the task
//! values themselves:
//! - a worker pool executing work items off the owner thread,
//! - the hand-off carrying a work item's result back to its owner,
//! - the owner-context event loop that runs callbacks and supervises
//!   composite tasks,
//! - the thread-local context through which `start()` finds that loop.
//!
//! Most users will interact with [`RuntimeBuilder`], [`Runtime::block_on`]
//! and [`EventLoop`] rather than with these components directly.

mod core;
mod executor;
mod injector;

pub(crate) mod builder;
pub(crate) mod context;
pub(crate) mod event_loop;
pub(crate) mod outcome;

pub use self::core::Runtime;
pub use builder::RuntimeBuilder;
pub use event_loop::EventLoop;
