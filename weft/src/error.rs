//! Error types for the engine itself.
//!
//! Failures of the work a task wraps are never represented here: those are
//! values handed to `on_error` and surface as `false` on the completion event.

use std::io;

use thiserror::Error;

/// Errors raised by the runtime and the owner-context event loop.
#[derive(Debug, Error)]
pub enum Error {
    /// A task was started on a thread that has no owner context installed.
    #[error("no owner context is active on this thread")]
    NoContext,

    /// `run_timeout` elapsed while tasks were still live.
    #[error("event loop timed out with {live} task(s) still live")]
    Timeout { live: usize },

    /// The completion channel of the event loop was closed.
    #[error("completion channel disconnected")]
    Disconnected,

    /// A worker thread could not be spawned.
    #[error("failed to spawn worker thread")]
    Spawn(#[source] io::Error),
}

/// Result alias used across the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
