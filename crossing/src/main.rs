/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::future::Future;
use std::path::PathBuf;
use std::process;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, warn};

use crossing::clock::{Clock, VirtualClock};
use crossing::config::IntersectionConfig;
use crossing::driver::Driver;
use crossing::intersection::{Intersection, SignalAction};
use crossing::output::TracingPins;
use crossing::pattern::PhaseSequence;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Crossing traffic-signal controller.
///
/// Example:
///   crossing --config intersection.yaml --simulate --cycles 2
#[derive(Debug, Parser)]
#[command(
    name = "crossing",
    about = "Cyclic traffic-signal controller",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML intersection configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Override the phase sequence from the configuration.
    #[arg(short = 's', long = "sequence", value_enum)]
    sequence: Option<PhaseSequence>,

    /// Override the yellow time, in seconds.
    #[arg(short = 'y', long = "yellow")]
    yellow: Option<u64>,

    /// Replay the schedule on a virtual clock instead of sleeping.
    #[arg(long = "simulate", default_value_t = false, requires = "cycles")]
    simulate: bool,

    /// Stop after this many complete cycles (at least 1).
    #[arg(short = 'n', long = "cycles", value_parser = clap::value_parser!(u64).range(1..))]
    cycles: Option<u64>,

    /// Build the intersection, print its plan and exit.
    #[arg(long = "dry-run", default_value_t = false)]
    dry_run: bool,
}

/// How often a requested stop is re-applied while the driver thread is
/// still running.  Covers a stop that lands before `Driver::start`, which
/// re-arms the driver.
const STOP_REASSERT_INTERVAL: Duration = Duration::from_millis(100);

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    info!(
        config   = ?cli.config,
        sequence = ?cli.sequence,
        yellow   = ?cli.yellow,
        simulate = cli.simulate,
        cycles   = ?cli.cycles,
        dry_run  = cli.dry_run,
        "Crossing starting up..."
    );

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // ── Load configuration ────────────────────────────────────────────────────
    let mut config = match &cli.config {
        Some(path) => IntersectionConfig::load_from_file(path)
            .context("Failed to load intersection configuration")?,
        None => {
            warn!("No configuration file provided, using the built-in four-way demo");
            IntersectionConfig::default_config()
        }
    };
    if let Some(sequence) = cli.sequence {
        config.sequence = sequence;
    }
    if let Some(yellow) = cli.yellow {
        config.yellow_time_secs = yellow;
    }

    // ── Build ─────────────────────────────────────────────────────────────────
    let mut pins = TracingPins::new();
    let intersection = config
        .builder()
        .build(&mut pins)
        .context("Failed to build intersection")?;

    for (fixture, spec) in intersection.fixtures().iter().zip(&config.fixtures) {
        info!(
            "  [{name}]  {id}  pins r/y/g={r}/{y}/{g}  green={green}s",
            name = spec.name,
            id = fixture.id(),
            r = spec.pins.red,
            y = spec.pins.yellow,
            g = spec.pins.green,
            green = spec.green_time_secs,
        );
    }

    if cli.dry_run {
        info!("Plan for one {}s cycle:", intersection.period());
        let mut plan = intersection.plan().to_vec();
        // Stable: keeps registration order within an offset
        plan.sort_by_key(|(offset, _)| *offset);
        for (offset, action) in plan {
            info!(
                "  t={offset:>4}s  {}  {} {}",
                action.fixture,
                action.indicator,
                if action.turn_on { "on" } else { "off" },
            );
        }
        return Ok(());
    }

    // ── Drive ─────────────────────────────────────────────────────────────────
    if cli.simulate {
        let driver = Driver::with_clock(VirtualClock::new());
        let driver = drive(intersection, pins, driver, cli.cycles, ctrl_c()).await?;
        info!(
            simulated_secs = driver.clock().elapsed().as_secs(),
            "Simulation finished"
        );
    } else {
        drive(intersection, pins, Driver::new(), cli.cycles, ctrl_c()).await?;
    }
    Ok(())
}

/// Resolves on the first Ctrl+C.  Never resolves if the handler cannot be
/// installed.
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Ctrl+C received, stopping after the current batch");
}

/// Run the driver on a blocking thread until it stops, `shutdown` resolves
/// or a task fails.  Returns the driver for inspection.
///
/// Once `shutdown` has resolved the stop is re-applied every
/// [`STOP_REASSERT_INTERVAL`] until the driver thread returns.
async fn drive<C, S>(
    mut intersection: Intersection,
    mut pins: TracingPins,
    mut driver: Driver<SignalAction, C>,
    cycles: Option<u64>,
    shutdown: S,
) -> Result<Driver<SignalAction, C>>
where
    C: Clock + Send + 'static,
    S: Future<Output = ()>,
{
    if let Some(n) = cycles {
        driver = driver.with_cycle_limit(n);
    }
    let stop = driver.stop_handle();

    let mut worker = tokio::task::spawn_blocking(move || {
        let result = intersection.run(&mut driver, &mut pins);
        (driver, result)
    });

    tokio::pin!(shutdown);
    let mut stopping = false;
    let joined = loop {
        tokio::select! {
            joined = &mut worker => break joined,
            _ = &mut shutdown, if !stopping => {
                stopping = true;
                stop.stop();
            }
            _ = tokio::time::sleep(STOP_REASSERT_INTERVAL), if stopping => stop.stop(),
        }
    };
    let (driver, result) = joined.context("Driver thread panicked")?;
    result.context("Driver stopped on a failed task")?;

    info!(cycles = driver.cycles_completed(), "Controller stopped");
    Ok(driver)
}

// ── Tests ─────────────────────────────────────────────────────────────────────
