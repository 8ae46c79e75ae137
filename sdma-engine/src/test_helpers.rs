// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Helpers shared by the engine tests.

use sdma_track::test_helpers::create_tracker;

use crate::engine::Engine;

/// Create an [`Engine`] with a quiet tracker for a test.
#[must_use]
pub fn start_test(full_filepath: &str) -> Engine {
    Engine::new(&create_tracker(full_filepath))
}
