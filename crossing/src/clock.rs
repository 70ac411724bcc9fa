/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Clock port: the single suspension point of the controller.
//!
//! The [`Driver`](crate::driver::Driver) asks its clock to block between
//! batches of actions.  [`SystemClock`] really sleeps; [`VirtualClock`]
//! only records the request, which makes the driver loop fully testable and
//! lets `--simulate` replay a schedule instantly.

use std::time::Duration;

/// Something that can suspend the calling thread.
pub trait Clock {
    /// Block for approximately `duration`.  A zero duration returns at once.
    fn sleep(&mut self, duration: Duration);
}

/// Wall-clock implementation backed by [`std::thread::sleep`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn sleep(&mut self, duration: Duration) {
        if !duration.is_zero() {
            std::thread::sleep(duration);
        }
    }
}

/// Simulated clock: never blocks, remembers every wait it was asked for.
#[derive(Debug, Default, Clone)]
pub struct VirtualClock {
    waits: Vec<Duration>,
    elapsed: Duration,
}

impl VirtualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every requested wait, in call order.
    pub fn waits(&self) -> &[Duration] {
        &self.waits
    }

    /// Requested waits in whole seconds, convenient for assertions.
    pub fn wait_secs(&self) -> Vec<u64> {
        self.waits.iter().map(Duration::as_secs).collect()
    }

    /// Total simulated time spent sleeping.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

impl Clock for VirtualClock {
    fn sleep(&mut self, duration: Duration) {
        self.waits.push(duration);
        self.elapsed += duration;
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
