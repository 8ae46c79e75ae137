// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use sdma_engine::events::once::Once;
use sdma_engine::test_helpers::start_test;
use sdma_engine::traits::Event;

#[test]
fn all_listeners_woken() {
    let mut engine = start_test(file!());

    let event = Once::new(7_i32);
    let woken = Rc::new(RefCell::new(Vec::new()));

    for listener in 0..3 {
        let event = event.clone();
        let woken = woken.clone();
        engine.spawn(async move {
            let value = event.listen().await;
            woken.borrow_mut().push((listener, value));
            Ok(())
        });
    }

    let notifier = event.clone();
    engine.spawn(async move { notifier.notify() });

    engine.run().unwrap();
    assert_eq!(*woken.borrow(), vec![(0, 7), (1, 7), (2, 7)]);
}

#[test]
fn listen_after_trigger_completes_immediately() {
    let mut engine = start_test(file!());

    let event: Once<()> = Once::default();
    event.notify().unwrap();

    let listener = event.clone();
    engine.spawn(async move {
        listener.listen().await;
        Ok(())
    });

    engine.run().unwrap();
}

#[test]
fn second_notify_is_an_error() {
    let event: Once<()> = Once::default();
    event.notify().unwrap();
    assert!(event.notify().is_err());
}
