//! Worker pool implementation.
//!
//! This module contains the components that run work items off the owner
//! thread:
//! - [`core`]: the executor and its lifecycle management,
//! - [`worker`]: worker threads draining the shared injector.

pub(crate) mod core;
pub(crate) mod worker;
