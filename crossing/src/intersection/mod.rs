/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Intersection assembly: staggers fixtures around one shared cycle and
//! feeds their compiled patterns to the driver.
//!
//! For `N` fixtures with a shared yellow time `y` and green times `g_i`:
//!
//! ```text
//! period   = N·y + Σ g_i
//! offset_0 = 0
//! offset_i = Σ_{j<i} (g_j + y)
//! red_i    = period − (g_i + y)
//! ```
//!
//! Fixture `i` is green on `[offset_i, offset_i + g_i)` only.  Those windows
//! are disjoint by construction, so at most one fixture is green at any
//! instant.  Fixture 0 starts green and every other fixture starts red, since
//! the first scheduled action of fixture 0 is its green-off.

pub mod error;

pub use error::IntersectionError;

use std::collections::HashSet;

use tracing::{debug, info};

use crate::clock::Clock;
use crate::driver::{Driver, DriverError};
use crate::fixture::{Fixture, FixtureId, Indicator, PinAssignment};
use crate::output::PinDriver;
use crate::pattern::{compile, PhaseSequence, PhaseTimings};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Yellow time used when none is configured.
pub const DEFAULT_YELLOW_TIME_SECS: u64 = 3;

/// Green time used when none is configured.
pub const DEFAULT_GREEN_TIME_SECS: u64 = 42;

// ── SignalAction ──────────────────────────────────────────────────────────────

/// One lamp transition of one fixture, as registered with the driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalAction {
    pub fixture: FixtureId,
    pub indicator: Indicator,
    pub turn_on: bool,
}

// ── IntersectionBuilder ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct FixtureSpec {
    pins: PinAssignment,
    green_time_secs: u64,
}

/// Collects fixtures, then validates and compiles them in [`build`](Self::build).
#[derive(Debug, Clone)]
pub struct IntersectionBuilder {
    sequence: PhaseSequence,
    yellow_time_secs: u64,
    fixtures: Vec<FixtureSpec>,
}

impl IntersectionBuilder {
    pub fn new(sequence: PhaseSequence, yellow_time_secs: u64) -> Self {
        Self {
            sequence,
            yellow_time_secs,
            fixtures: Vec::new(),
        }
    }

    /// Add a fixture; fixtures get green in the order they are added.
    pub fn add_fixture(&mut self, pins: PinAssignment, green_time_secs: u64) -> FixtureId {
        self.fixtures.push(FixtureSpec {
            pins,
            green_time_secs,
        });
        FixtureId(self.fixtures.len() - 1)
    }

    pub fn fixture_count(&self) -> usize {
        self.fixtures.len()
    }

    /// Validate, compile every fixture and bind the pins.
    ///
    /// Compilation happens before any pin is touched, so a rejected
    /// configuration leaves the port as it was.  On success fixture 0 shows
    /// green and all others show red.
    ///
    /// # Errors
    /// * [`IntersectionError::NoFixtures`]
    /// * [`IntersectionError::ZeroGreenTime`]
    /// * [`IntersectionError::DuplicatePin`]
    /// * [`IntersectionError::PeriodOverflow`]
    /// * [`IntersectionError::Pattern`] – e.g. a single interlocked fixture,
    ///   whose red phase is too short for the red+yellow warning.
    /// * [`IntersectionError::Output`] – the port failed while binding pins.
    pub fn build<P: PinDriver + ?Sized>(
        self,
        port: &mut P,
    ) -> Result<Intersection, IntersectionError> {
        if self.fixtures.is_empty() {
            return Err(IntersectionError::NoFixtures);
        }
        self.check_fixtures()?;

        let period = self.period()?;
        let y = self.yellow_time_secs;

        // ── Compile every fixture ─────────────────────────────────────────────
        let mut plan = Vec::new();
        let mut offset = 0u64;
        for (i, spec) in self.fixtures.iter().enumerate() {
            let fixture = FixtureId(i);
            let g = spec.green_time_secs;
            // cannot overflow: g + y ≤ period
            let lap = g + y;
            let timings = PhaseTimings {
                offset,
                green: g,
                yellow: y,
                red: period - lap,
                period,
            };
            let events = compile(self.sequence, &timings)
                .map_err(|source| IntersectionError::Pattern { fixture, source })?;

            debug!(%fixture, offset, green = g, red = timings.red, "Fixture staggered");
            plan.extend(events.into_iter().map(|e| {
                (
                    e.offset,
                    SignalAction {
                        fixture,
                        indicator: e.indicator,
                        turn_on: e.turn_on,
                    },
                )
            }));
            offset += lap;
        }

        // ── Bind pins and set the initial state ───────────────────────────────
        let mut fixtures = Vec::with_capacity(self.fixtures.len());
        for (i, spec) in self.fixtures.iter().enumerate() {
            let mut fixture = Fixture::new(FixtureId(i), spec.pins, spec.green_time_secs, port)?;
            let initial = if i == 0 {
                Indicator::Green
            } else {
                Indicator::Red
            };
            fixture.set_indicator(initial, true, port)?;
            fixtures.push(fixture);
        }

        info!(
            sequence = ?self.sequence,
            fixtures = fixtures.len(),
            yellow_secs = y,
            period_secs = period,
            tasks = plan.len(),
            "Intersection built"
        );

        Ok(Intersection {
            sequence: self.sequence,
            yellow_time_secs: y,
            period,
            fixtures,
            plan,
        })
    }

    fn check_fixtures(&self) -> Result<(), IntersectionError> {
        let mut seen = HashSet::new();
        for (i, spec) in self.fixtures.iter().enumerate() {
            if spec.green_time_secs == 0 {
                return Err(IntersectionError::ZeroGreenTime {
                    fixture: FixtureId(i),
                });
            }
            for indicator in Indicator::ALL {
                let pin = spec.pins.pin(indicator);
                if !seen.insert(pin) {
                    return Err(IntersectionError::DuplicatePin { pin });
                }
            }
        }
        Ok(())
    }

    /// `N·yellow + Σ green`, checked.
    fn period(&self) -> Result<u64, IntersectionError> {
        let yellow_total = (self.fixtures.len() as u64)
            .checked_mul(self.yellow_time_secs)
            .ok_or(IntersectionError::PeriodOverflow)?;
        self.fixtures
            .iter()
            .try_fold(yellow_total, |acc, spec| acc.checked_add(spec.green_time_secs))
            .ok_or(IntersectionError::PeriodOverflow)
    }
}

impl Default for IntersectionBuilder {
    fn default() -> Self {
        Self::new(PhaseSequence::default(), DEFAULT_YELLOW_TIME_SECS)
    }
}

// ── Intersection ──────────────────────────────────────────────────────────────

/// A built intersection: its fixtures plus the compiled plan.
#[derive(Debug)]
pub struct Intersection {
    sequence: PhaseSequence,
    yellow_time_secs: u64,
    period: u64,
    fixtures: Vec<Fixture>,
    /// `(offset, action)` in registration order.
    plan: Vec<(u64, SignalAction)>,
}

impl Intersection {
    pub fn sequence(&self) -> PhaseSequence {
        self.sequence
    }

    pub fn yellow_time_secs(&self) -> u64 {
        self.yellow_time_secs
    }

    /// Shared cycle length in seconds.
    pub fn period(&self) -> u64 {
        self.period
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn fixture(&self, id: FixtureId) -> Option<&Fixture> {
        self.fixtures.get(id.0)
    }

    pub fn plan(&self) -> &[(u64, SignalAction)] {
        &self.plan
    }

    /// Register every planned action with `driver`, fixture by fixture.
    pub fn register<C: Clock>(&self, driver: &mut Driver<SignalAction, C>) {
        for &(offset, action) in &self.plan {
            driver.register(offset, action);
        }
    }

    /// Perform one action on its fixture.  This is the driver's dispatch
    /// function.
    pub fn apply<P: PinDriver + ?Sized>(
        &mut self,
        action: &SignalAction,
        port: &mut P,
    ) -> Result<(), IntersectionError> {
        let fixture = self
            .fixtures
            .get_mut(action.fixture.0)
            .ok_or(IntersectionError::UnknownFixture {
                fixture: action.fixture,
            })?;
        fixture.set_indicator(action.indicator, action.turn_on, port)?;
        debug!(
            fixture = %action.fixture,
            indicator = %action.indicator,
            on = action.turn_on,
            "Signal change"
        );
        Ok(())
    }

    /// Register the plan and start `driver`.  Blocks until the driver stops.
    ///
    /// The plan is only registered into an empty driver.  A driver that
    /// already holds tasks is taken to carry this plan from an earlier
    /// `run()` and is restarted as is.
    pub fn run<P: PinDriver + ?Sized, C: Clock>(
        &mut self,
        driver: &mut Driver<SignalAction, C>,
        port: &mut P,
    ) -> Result<(), DriverError<IntersectionError>> {
        if driver.schedule().is_empty() {
            self.register(driver);
        }
        driver.start(|action| self.apply(action, port))
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
