/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Pattern compiler: turns one fixture's phase timings into the lamp
//! transitions of a single lap of the cycle.
//!
//! Two phase sequences are supported:
//!
//! ```text
//! RedGreenYellow            │ G ──g──► Y ──y──► R ──r──► (off)
//! RedRedYellowGreenYellow   │ G ──g──► Y ──y──► R ──(r−y)──► R+Y ──y──► (off)
//! ```
//!
//! Every time is an absolute offset within the shared cycle, produced by
//! repeatedly advancing a cursor and folding it back with
//! [`math::limit_to_period`].  The closing "off" event of a lap lands on the
//! same offset as the fixture's own next green-on.
//!
//! The compiler is pure: no I/O, no shared state.  Everything it rejects is
//! rejected here, before a single action reaches the driver.

pub mod math;

use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::fixture::Indicator;
use math::{advance, limit_to_period};

// ── Error type ────────────────────────────────────────────────────────────────

/// Errors raised while compiling a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// The cycle period was zero.
    #[error("cycle period must be greater than zero")]
    NonPositivePeriod,

    /// Advancing the cursor overflowed `u64`.
    #[error("time overflow advancing cursor {cursor}s by {step}s")]
    Overflow { cursor: u64, step: u64 },

    /// The red phase is too short to hold the red+yellow warning phase.
    #[error("red time {red}s is shorter than yellow time {yellow}s; red+yellow phase cannot fit")]
    RedShorterThanYellow { red: u64, yellow: u64 },
}

// ── PhaseSequence ─────────────────────────────────────────────────────────────

/// Lamp sequence a fixture runs through in one lap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum PhaseSequence {
    /// Red → Green → Yellow.
    #[default]
    RedGreenYellow,
    /// Red → Red+Yellow → Green → Yellow.
    RedRedYellowGreenYellow,
}

impl PhaseSequence {
    /// Number of [`LightEvent`]s one lap of this sequence produces.
    pub fn events_per_lap(self) -> usize {
        match self {
            PhaseSequence::RedGreenYellow => 6,
            PhaseSequence::RedRedYellowGreenYellow => 8,
        }
    }
}

// ── PhaseTimings / LightEvent ─────────────────────────────────────────────────

/// Timing inputs for one fixture, all in whole seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhaseTimings {
    /// Offset of the fixture's green-on within the cycle.
    pub offset: u64,
    pub green: u64,
    pub yellow: u64,
    /// Total red time, including any red+yellow warning.
    pub red: u64,
    /// Shared cycle length.
    pub period: u64,
}

/// One lamp transition at an absolute offset within the cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightEvent {
    pub indicator: Indicator,
    pub turn_on: bool,
    pub offset: u64,
}

impl LightEvent {
    pub fn new(indicator: Indicator, turn_on: bool, offset: u64) -> Self {
        Self {
            indicator,
            turn_on,
            offset,
        }
    }
}

// ── Compiler ──────────────────────────────────────────────────────────────────

/// Compile one lap of `sequence` for a fixture with the given timings.
///
/// The returned events are in emission order, which is also the order in
/// which same-offset events must fire.
///
/// # Errors
/// * [`PatternError::NonPositivePeriod`] – `timings.period == 0`.
/// * [`PatternError::Overflow`] – cursor arithmetic exceeded `u64`.
/// * [`PatternError::RedShorterThanYellow`] – interlocked sequence with
///   `red < yellow`.
pub fn compile(
    sequence: PhaseSequence,
    timings: &PhaseTimings,
) -> Result<Vec<LightEvent>, PatternError> {
    let mut lap = Lap::begin(timings.offset, timings.period, sequence.events_per_lap())?;

    match sequence {
        PhaseSequence::RedGreenYellow => {
            lap.emit(Indicator::Green, true);
            lap.advance(timings.green)?;
            lap.emit(Indicator::Green, false);
            lap.emit(Indicator::Yellow, true);
            lap.advance(timings.yellow)?;
            lap.emit(Indicator::Yellow, false);
            lap.emit(Indicator::Red, true);
            lap.advance(timings.red)?;
            lap.emit(Indicator::Red, false);
        }
        PhaseSequence::RedRedYellowGreenYellow => {
            let plain_red = timings.red.checked_sub(timings.yellow).ok_or(
                PatternError::RedShorterThanYellow {
                    red: timings.red,
                    yellow: timings.yellow,
                },
            )?;

            lap.emit(Indicator::Green, true);
            lap.advance(timings.green)?;
            lap.emit(Indicator::Green, false);
            lap.emit(Indicator::Yellow, true);
            lap.advance(timings.yellow)?;
            lap.emit(Indicator::Yellow, false);
            lap.emit(Indicator::Red, true);
            lap.advance(plain_red)?;
            lap.emit(Indicator::Yellow, true);
            lap.advance(timings.yellow)?;
            lap.emit(Indicator::Red, false);
            lap.emit(Indicator::Yellow, false);
        }
    }

    debug!(
        ?sequence,
        offset = timings.offset,
        period = timings.period,
        events = lap.events.len(),
        "Compiled pattern"
    );
    Ok(lap.events)
}

/// Running cursor over one lap.
struct Lap {
    cursor: u64,
    period: u64,
    events: Vec<LightEvent>,
}

impl Lap {
    fn begin(offset: u64, period: u64, capacity: usize) -> Result<Self, PatternError> {
        Ok(Self {
            cursor: limit_to_period(offset, period)?,
            period,
            events: Vec::with_capacity(capacity),
        })
    }

    fn emit(&mut self, indicator: Indicator, turn_on: bool) {
        self.events
            .push(LightEvent::new(indicator, turn_on, self.cursor));
    }

    fn advance(&mut self, step: u64) -> Result<(), PatternError> {
        self.cursor = advance(self.cursor, step, self.period)?;
        Ok(())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use Indicator::{Green, Red, Yellow};

    fn timings(offset: u64, green: u64, yellow: u64, red: u64, period: u64) -> PhaseTimings {
        PhaseTimings {
            offset,
            green,
            yellow,
            red,
            period,
        }
    }

    fn ev(indicator: Indicator, turn_on: bool, offset: u64) -> LightEvent {
        LightEvent::new(indicator, turn_on, offset)
    }

    // ── RedGreenYellow ────────────────────────────────────────────────────────

    #[test]
    fn simple_sequence_from_offset_zero() {
        // g=4, y=3, r=9 → period 16
        let events = compile(PhaseSequence::RedGreenYellow, &timings(0, 4, 3, 9, 16)).unwrap();
        assert_eq!(
            events,
            vec![
                ev(Green, true, 0),
                ev(Green, false, 4),
                ev(Yellow, true, 4),
                ev(Yellow, false, 7),
                ev(Red, true, 7),
                ev(Red, false, 16),
            ]
        );
    }

    #[test]
    fn simple_sequence_wraps_closing_event_onto_own_offset() {
        // Second fixture of a 2-fixture intersection: offset 45, period 90
        let events = compile(PhaseSequence::RedGreenYellow, &timings(45, 42, 3, 45, 90)).unwrap();
        let offsets: Vec<u64> = events.iter().map(|e| e.offset).collect();
        assert_eq!(offsets, vec![45, 87, 87, 90, 90, 45]);
        assert_eq!(events.last().unwrap(), &ev(Red, false, 45));
    }

    #[test]
    fn simple_sequence_event_count() {
        let events = compile(PhaseSequence::RedGreenYellow, &timings(2, 1, 1, 3, 5)).unwrap();
        assert_eq!(events.len(), PhaseSequence::RedGreenYellow.events_per_lap());
    }

    // ── RedRedYellowGreenYellow ───────────────────────────────────────────────

    #[test]
    fn interlocked_sequence_from_offset_zero() {
        let events = compile(
            PhaseSequence::RedRedYellowGreenYellow,
            &timings(0, 1, 1, 14, 16),
        )
        .unwrap();
        assert_eq!(
            events,
            vec![
                ev(Green, true, 0),
                ev(Green, false, 1),
                ev(Yellow, true, 1),
                ev(Yellow, false, 2),
                ev(Red, true, 2),
                // yellow joins red at g + y + (r − y)
                ev(Yellow, true, 15),
                // lap closes at 16, preserved rather than folded to 0
                ev(Red, false, 16),
                ev(Yellow, false, 16),
            ]
        );
    }

    #[test]
    fn interlocked_warning_phase_wraps_past_period() {
        // Offset 2, g=2, y=1, r=2, period 5: warning yellow at 2+2+1+1 = 6 → 1
        let events = compile(
            PhaseSequence::RedRedYellowGreenYellow,
            &timings(2, 2, 1, 2, 5),
        )
        .unwrap();
        assert_eq!(events[5], ev(Yellow, true, 1));
        assert_eq!(events[6], ev(Red, false, 2));
        assert_eq!(events[7], ev(Yellow, false, 2));
    }

    #[test]
    fn interlocked_with_red_equal_to_yellow_is_accepted() {
        let events = compile(
            PhaseSequence::RedRedYellowGreenYellow,
            &timings(0, 2, 2, 2, 6),
        )
        .unwrap();
        // No plain-red phase: red and the warning yellow come on together
        assert_eq!(events[4], ev(Red, true, 4));
        assert_eq!(events[5], ev(Yellow, true, 4));
    }

    #[test]
    fn interlocked_with_red_shorter_than_yellow_is_rejected() {
        let result = compile(
            PhaseSequence::RedRedYellowGreenYellow,
            &timings(0, 4, 3, 0, 7),
        );
        assert_eq!(
            result,
            Err(PatternError::RedShorterThanYellow { red: 0, yellow: 3 })
        );
    }

    // ── Validation ────────────────────────────────────────────────────────────

    #[test]
    fn zero_period_is_rejected_for_both_sequences() {
        for seq in [
            PhaseSequence::RedGreenYellow,
            PhaseSequence::RedRedYellowGreenYellow,
        ] {
            assert_eq!(
                compile(seq, &timings(0, 1, 1, 1, 0)),
                Err(PatternError::NonPositivePeriod)
            );
        }
    }

    #[test]
    fn overflowing_durations_are_rejected() {
        let result = compile(
            PhaseSequence::RedGreenYellow,
            &timings(0, u64::MAX, 1, 1, u64::MAX),
        );
        assert!(matches!(result, Err(PatternError::Overflow { .. })));
    }

    #[test]
    fn every_offset_stays_within_period() {
        let t = timings(7, 3, 2, 6, 11);
        for seq in [
            PhaseSequence::RedGreenYellow,
            PhaseSequence::RedRedYellowGreenYellow,
        ] {
            for e in compile(seq, &t).unwrap() {
                assert!(e.offset <= t.period, "{e:?} exceeds period");
            }
        }
    }

    // ── PhaseSequence ─────────────────────────────────────────────────────────

    #[test]
    fn sequence_names_deserialize_from_snake_case() {
        let seq: PhaseSequence = serde_yaml::from_str("red_red_yellow_green_yellow").unwrap();
        assert_eq!(seq, PhaseSequence::RedRedYellowGreenYellow);
        let seq: PhaseSequence = serde_yaml::from_str("red_green_yellow").unwrap();
        assert_eq!(seq, PhaseSequence::RedGreenYellow);
    }

    #[test]
    fn unknown_sequence_name_is_rejected() {
        let result: Result<PhaseSequence, _> = serde_yaml::from_str("green_only");
        assert!(result.is_err());
    }
}
