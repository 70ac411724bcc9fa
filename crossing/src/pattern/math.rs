/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Cycle arithmetic shared by the pattern compiler.
//!
//! Free functions rather than methods so they can be used and tested
//! independently of [`compile`](super::compile).

use super::PatternError;

/// Fold an absolute time back into the cycle.
///
/// Values up to **and including** `period` are returned unchanged; larger
/// values are reduced modulo `period`.  Keeping `value == period` intact is
/// what lets the last event of fixture 0's lap sit at the very end of the
/// cycle instead of colliding with its own green-on at offset 0.
///
/// Negative inputs are unrepresentable (`u64`); a zero period is rejected
/// with [`PatternError::NonPositivePeriod`].
pub fn limit_to_period(value: u64, period: u64) -> Result<u64, PatternError> {
    if period == 0 {
        return Err(PatternError::NonPositivePeriod);
    }
    if value <= period {
        Ok(value)
    } else {
        Ok(value % period)
    }
}

/// `cursor + step` folded into the cycle.
///
/// Returns [`PatternError::Overflow`] instead of wrapping silently.
pub fn advance(cursor: u64, step: u64, period: u64) -> Result<u64, PatternError> {
    let raw = cursor
        .checked_add(step)
        .ok_or(PatternError::Overflow { cursor, step })?;
    limit_to_period(raw, period)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
