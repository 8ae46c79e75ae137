// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use sdma_track::entity::{Entity, toplevel};
use sdma_track::tag::Tagged;
use sdma_track::test_helpers::check_and_clear;
use sdma_track::{Tag, create, debug, enter, error, exit, info, test_init, trace};
use std::sync::Arc;

#[test]
fn entity_hierarchy_names() {
    let (test_tracker, tracker) = test_init!(10);
    let top = toplevel(&tracker, "top");
    let ring = Arc::new(Entity::new(&top, "ring"));
    let node = Entity::new(&ring, "node1");

    assert_eq!(node.full_name(), "top::ring::node1");
    assert_eq!(format!("{node}"), "top::ring::node1");

    check_and_clear(
        &test_tracker,
        &[
            "0: created 10, top, 0 bytes",
            "10: created 11, top::ring, 0 bytes",
            "11: created 12, top::ring::node1, 0 bytes",
        ],
    );
}

#[test]
fn log_macros_at_each_level() {
    let (test_tracker, tracker) = test_init!(20);
    let top = toplevel(&tracker, "top");

    trace!(top ; "trace {}", 1);
    debug!(top ; "debug {}", 2);
    info!(top ; "info {}", 3);
    error!(top ; "error {}", 4);

    check_and_clear(
        &test_tracker,
        &[
            "0: created 20, top",
            "20:TRACE: trace 1",
            "20:DEBUG: debug 2",
            "20:INFO: info 3",
            "20:ERROR: error 4",
        ],
    );
}

#[test]
fn enter_exit_objects() {
    let (test_tracker, tracker) = test_init!(30);
    let top = toplevel(&tracker, "top");

    let obj = Tag(99);
    create!(top ; obj, 4);
    enter!(top ; obj.tag());
    exit!(top ; obj.tag());

    check_and_clear(
        &test_tracker,
        &[
            "0: created 30, top",
            "30: created 99, 99, 4 bytes",
            "30: 99 entered",
            "30: 99 exited",
        ],
    );
}

#[test]
fn destroyed_on_drop() {
    let (test_tracker, tracker) = test_init!(40);
    {
        let top = toplevel(&tracker, "top");
        let _child = Entity::new(&top, "child");
        check_and_clear(
            &test_tracker,
            &["0: created 40, top", "40: created 41, top::child"],
        );
    }
    check_and_clear(&test_tracker, &["41: destroyed 40", "40: destroyed 0"]);
}
