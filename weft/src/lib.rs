//! # Weft
//!
//! **Weft** runs units of work on a worker pool and delivers their outcome
//! back to the thread that started them, where callbacks run. On top of that
//! single primitive it offers two ways to compose tasks:
//!
//! - [`weave`]: start several tasks at once and succeed if all of them do,
//! - [`queue`]: run tasks one after another and stop at the first failure.
//!
//! Composites are tasks themselves, so they nest freely:
//! `queue([weave([a, b]), c])` runs `a` and `b` in parallel, then `c` only if
//! both succeeded.
//!
//! The thread that starts tasks is their *owner context*, represented by an
//! [`EventLoop`]. Work runs on the pool; every callback, completion observer
//! and piece of task bookkeeping runs on the owner thread while the loop is
//! driven, one message at a time, never inline with `start()`.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use weft::{queue, task, try_task, weave};
//!
//! #[weft::main]
//! fn main() {
//!     let fetch_a = try_task(|| fetch("a")).on_error(|e| eprintln!("a: {e}"));
//!     let fetch_b = try_task(|| fetch("b")).on_error(|e| eprintln!("b: {e}"));
//!     let report = task(|| summarize()).on_done(|s| println!("{s}"));
//!
//!     queue([weave([fetch_a.get(), fetch_b.get()]), report.get()])
//!         .on_complete(|ok| println!("pipeline succeeded: {ok}"))
//!         .start();
//! }
//! ```
//!
//! ## Modules
//!
//! - [`task`]: leaf tasks, their builder and handles, the combinators
//! - [`runtime`]: the worker pool and the owner-context event loop
//!
//! ## Getting Started
//!
//! Add Weft to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! weft = { git = "https://github.com/Nebula-ecosystem/weft", package = "weft" }
//! ```

mod error;

pub mod runtime;
pub mod task;

pub use error::{Error, Result};
pub use runtime::{EventLoop, Runtime, RuntimeBuilder};
pub use task::{TaskBuilder, TaskHandle, queue, task, try_task, weave};

pub use weft_macros::{main, queue, test, weave};
