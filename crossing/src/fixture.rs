/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Signal fixture data structures.
//!
//! A fixture is one physical signal head with a red, a yellow and a green
//! lamp.  Each lamp is bound to an output pin when the fixture is created:
//!
//! ```text
//! IntersectionBuilder ──► Fixture ──(set_indicator)──► PinDriver ──► GPIO
//!                          ↑ lamp state cache             ↑ write-only port
//! ```
//!
//! The fixture never reads the port back.  The lamp states it keeps are a
//! record of what was last written, used for logging and by tests.

use std::fmt;

use serde::Deserialize;

use crate::output::{OutputError, PinDriver};

// ── Indicator ─────────────────────────────────────────────────────────────────

/// One of the three lamps of a signal head.
///
/// The discriminant order is also the lamp index inside a [`Fixture`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Indicator {
    Red,
    Yellow,
    Green,
}

impl Indicator {
    /// All indicators in lamp-index order.
    pub const ALL: [Indicator; 3] = [Indicator::Red, Indicator::Yellow, Indicator::Green];

    /// Zero-based lamp index (`Red = 0`, `Yellow = 1`, `Green = 2`).
    pub fn index(self) -> usize {
        match self {
            Indicator::Red => 0,
            Indicator::Yellow => 1,
            Indicator::Green => 2,
        }
    }
}

impl fmt::Display for Indicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Indicator::Red => "red",
            Indicator::Yellow => "yellow",
            Indicator::Green => "green",
        };
        f.write_str(name)
    }
}

// ── FixtureId ─────────────────────────────────────────────────────────────────

/// Zero-based position of a fixture within its intersection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FixtureId(pub usize);

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fixture{}", self.0)
    }
}

// ── PinAssignment ─────────────────────────────────────────────────────────────

/// Output pin numbers for the three lamps of a fixture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PinAssignment {
    pub red: u32,
    pub yellow: u32,
    pub green: u32,
}

impl PinAssignment {
    pub fn new(red: u32, yellow: u32, green: u32) -> Self {
        Self { red, yellow, green }
    }

    /// Pin driving `indicator`.
    pub fn pin(&self, indicator: Indicator) -> u32 {
        match indicator {
            Indicator::Red => self.red,
            Indicator::Yellow => self.yellow,
            Indicator::Green => self.green,
        }
    }
}

// ── Fixture ───────────────────────────────────────────────────────────────────

/// One signal head: three pin-bound lamps plus its configured green time.
///
/// # Lifecycle
/// Created by [`IntersectionBuilder::build`], which owns it for the lifetime
/// of the intersection.  Lamp state only changes through
/// [`set_indicator`](Self::set_indicator).
///
/// [`IntersectionBuilder::build`]: crate::intersection::IntersectionBuilder::build
#[derive(Debug, Clone)]
pub struct Fixture {
    id: FixtureId,
    pins: PinAssignment,
    green_time_secs: u64,
    lamps: [bool; 3],
}

impl Fixture {
    /// Bind the fixture's pins as outputs and switch every lamp off.
    ///
    /// # Errors
    /// Any [`OutputError`] raised by the port while configuring or clearing
    /// the pins.
    pub fn new<P: PinDriver + ?Sized>(
        id: FixtureId,
        pins: PinAssignment,
        green_time_secs: u64,
        port: &mut P,
    ) -> Result<Self, OutputError> {
        let mut fixture = Self {
            id,
            pins,
            green_time_secs,
            lamps: [false; 3],
        };
        for indicator in Indicator::ALL {
            port.configure_output(pins.pin(indicator))?;
        }
        fixture.all_off(port)?;
        Ok(fixture)
    }

    pub fn id(&self) -> FixtureId {
        self.id
    }

    pub fn pins(&self) -> &PinAssignment {
        &self.pins
    }

    pub fn green_time_secs(&self) -> u64 {
        self.green_time_secs
    }

    /// Drive one lamp high (`on == true`) or low.
    pub fn set_indicator<P: PinDriver + ?Sized>(
        &mut self,
        indicator: Indicator,
        on: bool,
        port: &mut P,
    ) -> Result<(), OutputError> {
        port.write(self.pins.pin(indicator), on)?;
        self.lamps[indicator.index()] = on;
        Ok(())
    }

    /// Last state written to `indicator`.
    pub fn is_on(&self, indicator: Indicator) -> bool {
        self.lamps[indicator.index()]
    }

    /// `(red, yellow, green)` as last written.
    pub fn state(&self) -> (bool, bool, bool) {
        (self.lamps[0], self.lamps[1], self.lamps[2])
    }

    fn all_off<P: PinDriver + ?Sized>(&mut self, port: &mut P) -> Result<(), OutputError> {
        for indicator in Indicator::ALL {
            self.set_indicator(indicator, false, port)?;
        }
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
