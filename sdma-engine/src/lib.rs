// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

#![doc(test(attr(warn(unused))))]

//! `SDMA Engine` - the simulation engine for the Shift DMA interconnect
//! models
//!
//! This library provides the core of the [engine](crate::engine) which
//! executes event driven asynchronous simulation components such as the
//! [models](../sdma_models/index.html) of the Shift DMA ring.
//!
//! # Simple Application
//!
//! A very simple application would look like:
//!
//! ```rust
//! use sdma_engine::engine::Engine;
//! use sdma_engine::port::{InPort, OutPort};
//! use sdma_engine::run_simulation;
//!
//! let mut engine = Engine::default();
//! let rx: InPort<i32> = InPort::new(engine.top().clone());
//! let mut tx = OutPort::new(engine.top().clone(), "tx");
//! tx.connect(rx.state());
//!
//! engine.spawn(async move {
//!     for value in 0..10 {
//!         tx.put(value).await?;
//!     }
//!     Ok(())
//! });
//! engine.spawn(async move {
//!     for value in 0..10 {
//!         assert_eq!(rx.get().await, value);
//!     }
//!     Ok(())
//! });
//! run_simulation!(engine);
//! ```
//!
//! Simulations can be run as purely event driven (where one event triggers
//! one or more others) or the use of clocks can be introduced to model time.
//! The combination of both is the most common.
//!
//! The [engine](crate::engine::Engine) manages the
//! [clocks](crate::time::clock). Components call
//! [`wait_ticks`](crate::time::clock::Clock::wait_ticks) to advance through
//! simulated time in lock-step with each other.

pub mod engine;
pub mod events;
pub mod executor;
pub mod port;
pub mod test_helpers;
pub mod time;
pub mod traits;
pub mod types;

#[macro_export]
/// Run the simulation, optionally asserting the error it must finish with.
macro_rules! run_simulation {
    ($engine:ident) => {
        $engine.run().unwrap();
    };
    ($engine:ident, $expect:expr) => {
        match $engine.run() {
            Ok(()) => panic!("Expected an error!"),
            Err(e) => assert_eq!(format!("{e}").as_str(), $expect),
        }
    };
}
