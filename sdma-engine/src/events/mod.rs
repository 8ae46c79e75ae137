// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Events that tasks can listen on through the
//! [`Event`](crate::traits::Event) trait.

pub mod once;
pub mod repeated;
