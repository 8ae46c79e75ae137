// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::cell::RefCell;
use std::rc::Rc;

use sdma_engine::port::{InPort, OutPort};
use sdma_engine::test_helpers::start_test;

#[test]
fn put_completes_only_after_get() {
    let mut engine = start_test(file!());
    let top = engine.top().clone();

    let rx: InPort<i32> = InPort::new(top.clone());
    let mut tx = OutPort::new(top.clone(), "tx");
    tx.connect(rx.state());

    let log = Rc::new(RefCell::new(Vec::new()));

    let events = log.clone();
    engine.spawn(async move {
        events.borrow_mut().push("put-start");
        tx.put(17).await?;
        events.borrow_mut().push("put-done");
        Ok(())
    });

    let events = log.clone();
    engine.spawn(async move {
        let value = rx.get().await;
        assert_eq!(value, 17);
        events.borrow_mut().push("got");
        Ok(())
    });

    engine.run().unwrap();
    assert_eq!(*log.borrow(), vec!["put-start", "got", "put-done"]);
}

#[test]
fn values_arrive_in_order() {
    let mut engine = start_test(file!());
    let top = engine.top().clone();

    let rx: InPort<usize> = InPort::new(top.clone());
    let mut tx = OutPort::new(top.clone(), "tx");
    tx.connect(rx.state());

    engine.spawn(async move {
        for value in 0..100 {
            tx.put(value).await?;
        }
        Ok(())
    });

    let received = Rc::new(RefCell::new(Vec::new()));
    let received_inner = received.clone();
    engine.spawn(async move {
        for _ in 0..100 {
            received_inner.borrow_mut().push(rx.get().await);
        }
        Ok(())
    });

    engine.run().unwrap();
    assert_eq!(*received.borrow(), (0..100).collect::<Vec<usize>>());
}

#[test]
fn get_before_put_parks_the_receiver() {
    let mut engine = start_test(file!());
    let top = engine.top().clone();
    let clock = engine.default_clock();

    let rx: InPort<i32> = InPort::new(top.clone());
    let mut tx = OutPort::new(top.clone(), "tx");
    tx.connect(rx.state());

    let got_at = Rc::new(RefCell::new(0_u64));

    let got_at_inner = got_at.clone();
    let clk = clock.clone();
    engine.spawn(async move {
        let value = rx.get().await;
        assert_eq!(value, 3);
        *got_at_inner.borrow_mut() = clk.tick_now().tick();
        Ok(())
    });

    let clk = clock.clone();
    engine.spawn(async move {
        clk.wait_ticks(4).await;
        tx.put(3).await?;
        Ok(())
    });

    engine.run().unwrap();
    assert_eq!(*got_at.borrow(), 4);
}

#[test]
#[should_panic(expected = "not connected")]
fn put_on_unconnected_port_panics() {
    let engine = start_test(file!());
    let top = engine.top().clone();

    let tx: OutPort<i32> = OutPort::new(top.clone(), "tx");
    let _ = tx.put(1);
}

#[test]
#[should_panic(expected = "already connected")]
fn double_connect_panics() {
    let engine = start_test(file!());
    let top = engine.top().clone();

    let rx_a: InPort<i32> = InPort::new(top.clone());
    let rx_b: InPort<i32> = InPort::new(top.clone());
    let mut tx = OutPort::new(top.clone(), "tx");
    tx.connect(rx_a.state());
    tx.connect(rx_b.state());
}
