/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Crossing – cyclic traffic-signal controller
//!
//! Module layout:
//!
//! ```text
//! lib.rs
//! ├── fixture         – signal heads, lamps and pin assignments
//! ├── output          – PinDriver port + simulated pin bank
//! ├── clock           – Clock port, wall clock and virtual clock
//! ├── pattern/        – phase sequences compiled into timed lamp events
//! ├── driver/         – cyclic, time-ordered task driver
//! ├── intersection/   – staggers fixtures and wires them to the driver
//! └── config/         – YAML intersection configuration
//! ```

pub mod clock;
pub mod config;
pub mod driver;
pub mod fixture;
pub mod intersection;
pub mod output;
pub mod pattern;
