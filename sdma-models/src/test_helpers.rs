// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Helpers shared by the ring tests.

use sdma_engine::engine::Engine;
use sdma_engine::executor::Spawner;
use sdma_engine::sim_error;
use sdma_engine::test_helpers::start_test;
use sdma_engine::time::clock::Clock;

use crate::ring::{RingConfig, ShiftRing};

/// Create an engine, build a ring with the given config and spawn every
/// stage.
#[must_use]
pub fn start_ring_test(full_filepath: &str, config: &RingConfig) -> (Engine, ShiftRing) {
    let mut engine = start_test(full_filepath);
    let ring = ShiftRing::new(&mut engine, config);
    ring.spawn_all(&engine.spawner());
    (engine, ring)
}

/// Install an event to terminate the simulation at the clock tick defined.
///
/// The ring stages run forever, so bounded-run tests use this to end the
/// simulation with a recognizable error.
pub fn finish_at(spawner: &Spawner, clock: Clock, run_ticks: u64) {
    spawner.spawn(async move {
        clock.wait_ticks(run_ticks).await;
        sim_error!("Finish")
    });
}
