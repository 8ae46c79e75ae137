// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use sdma_engine::events::repeated::Repeated;
use sdma_engine::test_helpers::start_test;
use sdma_engine::traits::Event;

#[test]
fn listeners_see_each_result() {
    let mut engine = start_test(file!());
    let clock = engine.default_clock();

    let event: Repeated<usize> = Repeated::new(0);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let listener = event.clone();
    let seen_inner = seen.clone();
    engine.spawn(async move {
        for _ in 0..3 {
            seen_inner.borrow_mut().push(listener.listen().await);
        }
        Ok(())
    });

    let notifier = event.clone();
    let clk = clock.clone();
    engine.spawn(async move {
        for round in 1..4 {
            clk.wait_ticks(1).await;
            notifier.notify_result(round * 10)?;
        }
        Ok(())
    });

    engine.run().unwrap();
    assert_eq!(*seen.borrow(), vec![10, 20, 30]);
}

#[test]
fn notify_without_result_keeps_last_value() {
    let mut engine = start_test(file!());

    let event: Repeated<usize> = Repeated::new(42);
    let seen = Rc::new(RefCell::new(Vec::new()));

    let listener = event.clone();
    let seen_inner = seen.clone();
    engine.spawn(async move {
        seen_inner.borrow_mut().push(listener.listen().await);
        Ok(())
    });

    let notifier = event.clone();
    engine.spawn(async move { notifier.notify() });

    engine.run().unwrap();
    assert_eq!(*seen.borrow(), vec![42]);
}
