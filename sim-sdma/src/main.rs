// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Simulate a Shift DMA ring moving data between peripheral register files.
//!
//! See `lib.rs` for details.

use clap::Parser;
use sdma_engine::engine::Engine;
use sdma_engine::executor::Spawner;
use sdma_engine::sim_error;
use sdma_engine::time::clock::Clock;
use sdma_engine::types::SimError;
use sdma_models::ring::{RingConfig, ShiftRing};
use sdma_track::builder::{TrackerConfig, TrackersConfig, setup_trackers};
use sdma_track::{Tracker, error, info};
use sim_sdma::programs;

/// Command-line arguments.
#[derive(Parser)]
#[command(about = "Shift DMA ring relay application")]
struct Cli {
    /// Enable logging to the console.
    #[arg(long, default_value = "false")]
    stdout: bool,

    /// Level of log message to display.
    #[arg(long, default_value = "Info")]
    stdout_level: log::Level,

    /// Set a regular expression for which entities should have logging
    /// level set to `--stdout-level`. Others will have level set to
    /// `Error`.
    #[arg(long, default_value = "")]
    stdout_filter_regex: String,

    /// Write the text log to the given file as well.
    #[arg(long)]
    log_file: Option<String>,

    /// Level of log message to record in the log file.
    #[arg(long, default_value = "Debug")]
    log_file_level: log::Level,

    /// Set a regular expression for which entities should have file logging
    /// level set to `--log-file-level`. Others will have level set to
    /// `Error`.
    #[arg(long, default_value = "")]
    log_file_filter_regex: String,

    /// Configure a clock tick on which to terminate the simulation. Use 0
    /// to run until the program completes.
    #[arg(long, default_value = "0")]
    finish_tick: u64,

    /// The number of nodes in the ring.
    #[arg(long, default_value = "4")]
    node_count: usize,

    /// The depth of each node's register file in 32-bit words.
    #[arg(long, default_value = "4096")]
    regfile_depth: usize,

    /// Aim the first transfer at a node that is not in the ring to
    /// demonstrate the documented lockup hazard.
    #[arg(long, default_value = "false")]
    missing_node: bool,

    /// Arm the controller watchdog: fail with a diagnosable error if a
    /// transfer stays incomplete for this many ticks.
    #[arg(long)]
    watchdog_ticks: Option<u64>,
}

/// Install an event to terminate the simulation at the clock tick defined.
fn finish_at(spawner: &Spawner, clock: Clock, run_ticks: u64) {
    spawner.spawn(async move {
        clock.wait_ticks(run_ticks).await;
        sim_error!("Finish")
    });
}

fn setup_all_trackers(args: &Cli) -> Tracker {
    let config = TrackersConfig {
        stdout: TrackerConfig {
            enable: args.stdout,
            level: args.stdout_level,
            filter_regex: &args.stdout_filter_regex,
            file: None,
        },
        file: TrackerConfig {
            enable: args.log_file.is_some(),
            level: args.log_file_level,
            filter_regex: &args.log_file_filter_regex,
            file: args.log_file.as_deref(),
        },
    };
    setup_trackers(&config).unwrap()
}

fn main() -> Result<(), SimError> {
    let args = Cli::parse();

    let tracker = setup_all_trackers(&args);

    let mut engine = Engine::new(&tracker);
    let spawner = engine.spawner();
    let clock = engine.default_clock();

    if args.node_count < programs::RELAY_MIN_NODES {
        return sim_error!(format!(
            "the relay needs at least {} nodes",
            programs::RELAY_MIN_NODES
        ));
    }

    let config = RingConfig {
        node_count: args.node_count,
        regfile_depth: args.regfile_depth,
        watchdog_ticks: args.watchdog_ticks,
        ..RingConfig::default()
    };

    let ring = ShiftRing::new(&mut engine, &config);
    ring.spawn_all(&spawner);

    let top = engine.top().clone();
    info!(top ; "Ring of {} nodes built and connected", args.node_count);

    let program = if args.missing_node {
        programs::relay_with_missing_node(args.node_count)
    } else {
        programs::relay()
    };
    ring.data_memory().write(programs::RELAY_SEED_ADDR, 1);
    ring.load_program(&program);

    if args.finish_tick != 0 {
        finish_at(&spawner, clock.clone(), args.finish_tick);
    }

    ring.controller().start();
    let result = engine.run_until(Box::new(ring.controller().done_event()));

    if let Err(e) = result {
        if ring.controller().busy() {
            error!(top ;
                "Lockup: busy never cleared, program held at instruction {} ({} ticks)",
                ring.controller().pc(),
                clock.tick_now().tick()
            );
        }
        tracker.shutdown();
        return Err(e);
    }

    for (address, offset) in programs::relay_trail() {
        let word = ring.regfile(address).read(offset);
        info!(top ; "node{address}[{offset}] = {word:#010x}");
        if word != 1 {
            error!(top ; "Relay failed at node{address}[{offset}]");
            tracker.shutdown();
            return sim_error!("Relay failed");
        }
    }

    if ring.data_memory().read(programs::RELAY_RESULT_ADDR) != 1 {
        error!(top ; "Relay failed to land in the data memory");
        tracker.shutdown();
        return sim_error!("Relay failed");
    }

    info!(top ;
        "Pass ({} ticks, {:.2}ns)",
        clock.tick_now().tick(),
        clock.time_now_ns()
    );
    tracker.shutdown();
    Ok(())
}
