/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Error type for the task [`Driver`](super::Driver).
//!
//! Two failure layers exist and they are deliberately kept apart:
//!
//! * [`DriverError::NoTasks`] – a precondition violation by the caller of
//!   `start()`.  Nothing has been waited for or dispatched.
//! * [`DriverError::TaskFailed`] – the dispatch function returned an error.
//!   The loop stops immediately; actions later in the same batch and all
//!   following batches are not run.  There is no retry or isolation.

use thiserror::Error;

/// Error returned from [`Driver::start`](super::Driver::start).
///
/// `E` is the error type of the dispatch function passed to `start()`.
#[derive(Debug, Error)]
pub enum DriverError<E> {
    /// `start()` was called before anything was registered.
    #[error("cannot start driver: no tasks registered")]
    NoTasks,

    /// Dispatching an action failed; the driver has stopped.
    #[error("task at offset {offset}s failed")]
    TaskFailed {
        offset: u64,
        #[source]
        source: E,
    },
}
