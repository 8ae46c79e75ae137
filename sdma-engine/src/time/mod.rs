// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Simulated time.

pub mod clock;
pub mod simtime;
