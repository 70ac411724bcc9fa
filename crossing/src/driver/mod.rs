/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Single-threaded, time-ordered task driver.
//!
//! The driver holds a [`Schedule`]: actions registered at whole-second
//! offsets from the start of a cycle.  [`Driver::start`] loops forever over
//! the distinct offsets in ascending order:
//!
//! ```text
//! ┌─► wait (next − current) ─► dispatch every action at `next` ─► advance ─┐
//! │                                 (registration order)                   │
//! └──────────────── past the last offset: index 0, current = 0 ────────────┘
//! ```
//!
//! Actions are plain data (`A`).  A single dispatch function passed to
//! `start()` turns each action into its effect, so a schedule can be built,
//! inspected and replayed without touching hardware.
//!
//! # Example
//! With actions at offsets 1, 2 and 10:
//! * 1 s after start the offset-1 actions run,
//! * 1 s after they complete the offset-2 actions run,
//! * 8 s later the offset-10 actions run,
//! * 1 s later the offset-1 actions run again, and so on.
//!
//! # Wrap-around
//! When the last offset has fired the reference time is reset to `0`, so the
//! first wait of the next cycle equals the first offset itself, not
//! `period − last + first`.  Schedules produced by the intersection always
//! contain both offset `0` and offset `period`, for which the two agree.
//!
//! # Stopping
//! [`StopHandle::stop`] clears a shared flag that is checked once per
//! loop iteration, after a batch has been dispatched.  It never interrupts
//! the wait in progress or a batch already under way.  It can be called from
//! inside the dispatch function, from another thread or from a signal
//! handler.

pub mod error;

pub use error::DriverError;

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, trace};

use crate::clock::{Clock, SystemClock};

// ── Schedule ──────────────────────────────────────────────────────────────────

/// Offset → actions mapping.
///
/// `BTreeMap` so offsets iterate in ascending order.  Actions at one offset
/// keep their registration order; nothing is ever deduplicated.
#[derive(Debug, Clone)]
pub struct Schedule<A> {
    tasks: BTreeMap<u64, Vec<A>>,
    task_count: usize,
}

impl<A> Schedule<A> {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            task_count: 0,
        }
    }

    /// Append `action` to the list at `offset`, creating it if absent.
    pub fn register(&mut self, offset: u64, action: A) {
        self.tasks.entry(offset).or_default().push(action);
        self.task_count += 1;
    }

    /// Distinct offsets, ascending.
    pub fn offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.tasks.keys().copied()
    }

    /// Actions registered at `offset`, in registration order.
    pub fn actions_at(&self, offset: u64) -> &[A] {
        self.tasks.get(&offset).map(Vec::as_slice).unwrap_or(&[])
    }

    /// `(offset, actions)` batches in firing order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[A])> + '_ {
        self.tasks.iter().map(|(&t, v)| (t, v.as_slice()))
    }

    pub fn offset_count(&self) -> usize {
        self.tasks.len()
    }

    /// Total number of registered actions across all offsets.
    pub fn task_count(&self) -> usize {
        self.task_count
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<A> Default for Schedule<A> {
    fn default() -> Self {
        Self::new()
    }
}

// ── StopHandle ────────────────────────────────────────────────────────────────

/// Cloneable handle that asks a running [`Driver`] to stop.
#[derive(Debug, Clone)]
pub struct StopHandle {
    alive: Arc<AtomicBool>,
}

impl StopHandle {
    /// Prevent the driver from moving on to the next batch.
    pub fn stop(&self) {
        self.alive.store(false, Ordering::Release);
    }
}

// ── Driver ────────────────────────────────────────────────────────────────────

/// Cyclic task driver over actions of type `A`, sleeping on clock `C`.
///
/// Lifecycle: `Unstarted → Running → Stopped`.  `start()` may be called again
/// after a stop; it resets the position but keeps every registration.
#[derive(Debug)]
pub struct Driver<A, C = SystemClock> {
    schedule: Schedule<A>,
    clock: C,
    alive: Arc<AtomicBool>,

    /// Distinct offsets frozen at `start()`.
    timings: Vec<u64>,
    index: usize,
    current_time: u64,

    cycle_limit: Option<u64>,
    cycles_completed: u64,
}

impl<A> Driver<A, SystemClock> {
    /// Driver that sleeps on the wall clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<A> Default for Driver<A, SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, C: Clock> Driver<A, C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            schedule: Schedule::new(),
            clock,
            alive: Arc::new(AtomicBool::new(false)),
            timings: Vec::new(),
            index: 0,
            current_time: 0,
            cycle_limit: None,
            cycles_completed: 0,
        }
    }

    /// Also stop after `cycles` complete wrap-arounds.  A limit of `0`
    /// makes `start()` return without waiting or dispatching anything.
    pub fn with_cycle_limit(mut self, cycles: u64) -> Self {
        self.cycle_limit = Some(cycles);
        self
    }

    /// Register `action` to run at `offset` seconds into every cycle.
    ///
    /// Only supported before [`start`](Self::start).
    pub fn register(&mut self, offset: u64, action: A) {
        self.schedule.register(offset, action);
    }

    pub fn schedule(&self) -> &Schedule<A> {
        &self.schedule
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            alive: Arc::clone(&self.alive),
        }
    }

    /// Same as [`StopHandle::stop`].
    pub fn stop(&self) {
        self.alive.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Wrap-arounds completed by the current (or last) run.
    pub fn cycles_completed(&self) -> u64 {
        self.cycles_completed
    }

    /// Run the schedule on the calling thread until stopped.
    ///
    /// `dispatch` is called once per action, synchronously, in offset order
    /// and registration order within an offset.
    ///
    /// # Errors
    /// * [`DriverError::NoTasks`] – nothing registered; no wait happens.
    /// * [`DriverError::TaskFailed`] – `dispatch` failed; the loop ends at
    ///   once.
    pub fn start<F, E>(&mut self, mut dispatch: F) -> Result<(), DriverError<E>>
    where
        F: FnMut(&A) -> Result<(), E>,
    {
        if self.schedule.is_empty() {
            return Err(DriverError::NoTasks);
        }

        self.timings = self.schedule.offsets().collect();
        self.index = 0;
        self.current_time = 0;
        self.cycles_completed = 0;
        self.alive.store(true, Ordering::Release);

        info!(
            offsets = self.timings.len(),
            tasks = self.schedule.task_count(),
            cycle_limit = ?self.cycle_limit,
            "Driver starting..."
        );

        while self.is_running() && !self.cycle_limit_reached() {
            let next = self.timings[self.index];
            // timings ascend and current_time only moves to a fired offset or 0
            let wait = next - self.current_time;
            trace!(wait_secs = wait, next, "Waiting for next batch");
            self.clock.sleep(Duration::from_secs(wait));

            let batch = self.schedule.actions_at(next);
            debug!(offset = next, actions = batch.len(), "Dispatching batch");
            for action in batch {
                if let Err(source) = dispatch(action) {
                    self.alive.store(false, Ordering::Release);
                    return Err(DriverError::TaskFailed {
                        offset: next,
                        source,
                    });
                }
            }

            self.index += 1;
            self.current_time = next;
            if self.index >= self.timings.len() {
                self.index = 0;
                self.current_time = 0;
                self.cycles_completed += 1;
                trace!(cycles = self.cycles_completed, "Cycle complete");
            }
        }
        self.alive.store(false, Ordering::Release);

        info!(cycles = self.cycles_completed, "Driver stopped");
        Ok(())
    }

    fn cycle_limit_reached(&self) -> bool {
        self.cycle_limit
            .is_some_and(|limit| self.cycles_completed >= limit)
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
