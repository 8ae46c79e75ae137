// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use sdma_engine::events::repeated::Repeated;
use sdma_engine::test_helpers::start_test;

#[test]
fn run_until_event_fires() {
    let mut engine = start_test(file!());
    let clock = engine.default_clock();

    let done: Repeated<()> = Repeated::default();

    let event = done.clone();
    let clk = clock.clone();
    engine.spawn(async move {
        clk.wait_ticks(5).await;
        event.notify()
    });

    // A task that would run forever if the simulation was not stopped.
    let clk = clock.clone();
    engine.spawn(async move {
        loop {
            clk.wait_ticks(1).await;
        }
    });

    engine.run_until(Box::new(done.clone())).unwrap();
    assert_eq!(clock.tick_now().tick(), 5);
}
