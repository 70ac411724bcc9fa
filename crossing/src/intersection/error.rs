/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Structured error types for the intersection assembly.
//!
//! Every build-time variant is raised before any pin is touched or any
//! action reaches the driver.  [`IntersectionError::UnknownFixture`] and
//! [`IntersectionError::Output`] are the only run-time failures; either one
//! ends the driver loop.

use thiserror::Error;

use crate::fixture::FixtureId;
use crate::output::OutputError;
use crate::pattern::PatternError;

#[derive(Debug, Error)]
pub enum IntersectionError {
    /// `build()` was called without any fixture.
    #[error("intersection has no fixtures")]
    NoFixtures,

    /// A fixture was configured with a zero green time.
    #[error("{fixture} has a zero green time")]
    ZeroGreenTime { fixture: FixtureId },

    /// The same pin is bound to more than one lamp.
    #[error("pin {pin} is assigned to more than one lamp")]
    DuplicatePin { pin: u32 },

    /// Summing the phase durations overflowed `u64`.
    #[error("cycle period overflows")]
    PeriodOverflow,

    /// The pattern compiler rejected a fixture's timings.
    #[error("cannot compile pattern for {fixture}")]
    Pattern {
        fixture: FixtureId,
        #[source]
        source: PatternError,
    },

    /// An action referred to a fixture the intersection does not own.
    #[error("{fixture} does not exist")]
    UnknownFixture { fixture: FixtureId },

    /// The output port failed.
    #[error(transparent)]
    Output(#[from] OutputError),
}
