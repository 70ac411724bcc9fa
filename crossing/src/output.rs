/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Output port: the write-only boundary between the controller and the lamp
//! pins.
//!
//! The controller only ever needs two effects from the hardware: bind a pin
//! as an output, and drive it high or low.  Board support code implements
//! [`PinDriver`] for its GPIO block.  [`TracingPins`] is the built-in
//! simulated pin bank used when no hardware backend is linked in.

use std::collections::BTreeMap;

use thiserror::Error;
use tracing::debug;

// ── Error type ────────────────────────────────────────────────────────────────

/// Failures reported by an output port.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OutputError {
    /// A write was attempted on a pin that was never configured as output.
    #[error("pin {pin} is not configured as an output")]
    Unconfigured { pin: u32 },

    /// The backend rejected the operation.
    #[error("pin {pin}: {message}")]
    Hardware { pin: u32, message: String },
}

// ── PinDriver ─────────────────────────────────────────────────────────────────

/// A bank of digital output pins.
pub trait PinDriver {
    /// Bind `pin` in output mode.
    fn configure_output(&mut self, pin: u32) -> Result<(), OutputError>;

    /// Drive `pin` high (`true`) or low (`false`).
    fn write(&mut self, pin: u32, high: bool) -> Result<(), OutputError>;
}

// ── TracingPins ───────────────────────────────────────────────────────────────

/// Simulated pin bank that logs every level change.
///
/// Pins must be configured before they are written, mirroring real GPIO
/// drivers.  Writing the level a pin already has is accepted but not logged.
#[derive(Debug, Default)]
pub struct TracingPins {
    /// pin → current level.  `BTreeMap` keeps dumps sorted by pin number.
    levels: BTreeMap<u32, bool>,
}

impl TracingPins {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_configured(&self, pin: u32) -> bool {
        self.levels.contains_key(&pin)
    }

    /// Current level of `pin`, or `None` if it was never configured.
    pub fn level(&self, pin: u32) -> Option<bool> {
        self.levels.get(&pin).copied()
    }
}

impl PinDriver for TracingPins {
    fn configure_output(&mut self, pin: u32) -> Result<(), OutputError> {
        debug!(pin, "Pin configured as output");
        self.levels.entry(pin).or_insert(false);
        Ok(())
    }

    fn write(&mut self, pin: u32, high: bool) -> Result<(), OutputError> {
        let level = self
            .levels
            .get_mut(&pin)
            .ok_or(OutputError::Unconfigured { pin })?;
        if *level != high {
            debug!(pin, high, "Pin level changed");
            *level = high;
        }
        Ok(())
    }
}

// ── Test support ──────────────────────────────────────────────────────────────


// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_pin_starts_low() {
        let mut pins = TracingPins::new();
        assert!(!pins.is_configured(7));
        pins.configure_output(7).unwrap();
        assert!(pins.is_configured(7));
        assert_eq!(pins.level(7), Some(false));
    }

    #[test]
    fn write_updates_level() {
        let mut pins = TracingPins::new();
        pins.configure_output(7).unwrap();
        pins.write(7, true).unwrap();
        assert_eq!(pins.level(7), Some(true));
        pins.write(7, false).unwrap();
        assert_eq!(pins.level(7), Some(false));
    }

    #[test]
    fn write_to_unconfigured_pin_is_rejected() {
        let mut pins = TracingPins::new();
        assert_eq!(
            pins.write(3, true),
            Err(OutputError::Unconfigured { pin: 3 })
        );
        assert_eq!(pins.level(3), None);
    }

    #[test]
    fn reconfiguring_keeps_current_level() {
        let mut pins = TracingPins::new();
        pins.configure_output(1).unwrap();
        pins.write(1, true).unwrap();
        pins.configure_output(1).unwrap();
        assert_eq!(pins.level(1), Some(true));
    }

    #[test]
    fn recording_pins_inject_faults() {
        let mut pins = testing::RecordingPins::new();
        pins.configure_output(1).unwrap();
        pins.fail_pin(1);
        assert!(matches!(
            pins.write(1, true),
            Err(OutputError::Hardware { pin: 1, .. })
        ));
        assert!(pins.writes.is_empty());
    }
}
