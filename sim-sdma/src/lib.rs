// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Simulate a Shift DMA ring moving data between peripheral register files.
//!
//! The model is built with as many ring nodes as specified by the user.
//! The controller executes a relay program that walks a single word out of
//! the data memory, forward through the ring, backwards again, and finally
//! back into the data memory, exercising every kind of transfer the
//! interconnect supports: forward copy, self copy, reverse copy and a copy
//! into the controller's own memory.
//!
//! # Examples
//!
//! Running the relay with the per-entity log output on the console:
//! ```txt
//! cargo run --bin sim-sdma --release -- --stdout --stdout-level Debug
//! ```
//!
//! Demonstrating the documented lockup hazard (a transfer naming a node
//! that is not present) with a bounded run:
//! ```txt
//! cargo run --bin sim-sdma --release -- --missing-node --finish-tick 1000
//! ```
//!
//! And the same hazard turned into a diagnosable error by the opt-in
//! watchdog:
//! ```txt
//! cargo run --bin sim-sdma --release -- --missing-node --watchdog-ticks 500
//! ```
//!
//! # Diagram
//!
//! ```text
//!  /-------------------------------------------------------------\
//!  |  +------------+    +-------+    +-------+        +-------+  |
//!  \->| controller |--->| node1 |--->| node2 |- ... -->| nodeN |--/
//!     +------------+    +-------+    +-------+        +-------+
//!       |        |          |            |                |
//!       v        v          v            v                v
//!     instr    data     registers    registers        registers
//!     memory   memory
//! ```

pub mod programs;
