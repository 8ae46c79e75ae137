// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Cycle-level models of the Shift DMA ring interconnect.
//!
//! The Shift DMA moves 32-bit words between the register files of many
//! peripherals without a central crossbar. An addressed [token](token::Token)
//! circulates a ring of [nodes](node::ShiftNode); each node compares the
//! token's read/write node addresses against its own and taps the token to
//! perform at most one read and one write against its local
//! [register file](register_file::RegisterFile). The
//! [controller](controller::ShiftController) sequences a small stored
//! [program](program) of `COPY` instructions into ring transactions under a
//! single-token-in-flight discipline.
//!
//! # Diagram
//!
//! ```text
//!    +------------+     +-------+     +-------+     +-------+
//! /->| controller |---->| node1 |---->| node2 |---->| node3 |--\
//! |  +------------+     +-------+     +-------+     +-------+  |
//! |   |         |           |             |             |      |
//! |   v         v           v             v             v      |
//! | instr     data      registers     registers     registers  |
//! | memory   memory                                            |
//! \------------------------------------------------------------/
//! ```
//!
//! Use [`ring::ShiftRing`] to build a connected ring, load a program and
//! spawn every stage on the engine.

pub mod connect;
pub mod controller;
pub mod node;
pub mod program;
pub mod register_file;
pub mod ring;
pub mod test_helpers;
pub mod token;
