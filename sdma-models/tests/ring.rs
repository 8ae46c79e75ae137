// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Data-movement properties of the ring.

use sdma_models::program::Instruction;
use sdma_models::ring::RingConfig;
use sdma_models::test_helpers::start_ring_test;

fn small_ring() -> RingConfig {
    RingConfig {
        node_count: 4,
        regfile_depth: 16,
        instruction_depth: 64,
        data_depth: 16,
        watchdog_ticks: None,
    }
}

#[test]
fn round_trip_copy() {
    let (mut engine, ring) = start_ring_test(file!(), &small_ring());
    let clock = engine.default_clock();

    ring.regfile(1).write(5, 0xdead_beef);
    ring.load_program(&[Instruction::copy(1, 5, 3, 9), Instruction::end()]);

    ring.controller().start();
    engine
        .run_until(Box::new(ring.controller().done_event()))
        .unwrap();

    assert!(!ring.controller().busy());

    // Exactly one read and one write, each attributable to the transfer.
    assert_eq!(ring.regfile(1).num_reads(), 1);
    assert_eq!(ring.regfile(1).num_writes(), 1); // The seed write only.
    assert_eq!(ring.regfile(3).num_writes(), 1);
    assert_eq!(ring.regfile(3).num_reads(), 0);
    assert_eq!(ring.regfile(3).read(9), 0xdead_beef);

    // One full revolution: two cycles per stage, controller included.
    assert_eq!(clock.tick_now().tick(), 10);
}

#[test]
fn self_copy() {
    let (mut engine, ring) = start_ring_test(file!(), &small_ring());
    let clock = engine.default_clock();

    ring.regfile(2).write(1, 7);
    ring.load_program(&[Instruction::copy(2, 1, 2, 2), Instruction::end()]);

    ring.controller().start();
    engine
        .run_until(Box::new(ring.controller().done_event()))
        .unwrap();

    assert_eq!(ring.regfile(2).read(2), 7);

    // The node services its own read on the first pass and the write when
    // the ring brings the token around again.
    assert_eq!(clock.tick_now().tick(), 20);
}

/// The §relay sequence: a word leaves the data memory, hops forward through
/// the ring, is duplicated within a node, travels backwards, and lands back
/// in the data memory.
#[test]
fn chained_relay() {
    let (mut engine, ring) = start_ring_test(file!(), &small_ring());

    ring.data_memory().write(1, 1);
    ring.load_program(&[
        Instruction::copy(0, 1, 2, 1),
        Instruction::copy(2, 1, 4, 1),
        Instruction::copy(4, 1, 4, 2),
        Instruction::copy(4, 2, 3, 2),
        Instruction::copy(3, 2, 0, 2),
        Instruction::end(),
    ]);

    ring.controller().start();
    engine
        .run_until(Box::new(ring.controller().done_event()))
        .unwrap();

    assert!(!ring.controller().busy());
    assert_eq!(ring.regfile(2).read(1), 1);
    assert_eq!(ring.regfile(4).read(1), 1);
    assert_eq!(ring.regfile(4).read(2), 1);
    assert_eq!(ring.regfile(3).read(2), 1);
    assert_eq!(ring.data_memory().read(2), 1);
}

#[test]
fn nop_transparency() {
    let relay = [
        Instruction::copy(0, 1, 2, 1),
        Instruction::copy(2, 1, 4, 1),
        Instruction::copy(4, 1, 4, 2),
    ];

    // Reference run.
    let (mut engine, ring) = start_ring_test(file!(), &small_ring());
    let clock = engine.default_clock();
    ring.data_memory().write(1, 1);
    let mut program = relay.to_vec();
    program.push(Instruction::end());
    ring.load_program(&program);
    ring.controller().start();
    engine
        .run_until(Box::new(ring.controller().done_event()))
        .unwrap();
    let reference_ticks = clock.tick_now().tick();

    // The same transfers with NOPs scattered between them.
    let (mut engine, ring_nops) = start_ring_test(file!(), &small_ring());
    let clock = engine.default_clock();
    ring_nops.data_memory().write(1, 1);
    let mut program = Vec::new();
    for instruction in relay {
        program.push(instruction);
        for _ in 0..3 {
            program.push(Instruction::nop());
        }
    }
    program.push(Instruction::end());
    ring_nops.load_program(&program);
    ring_nops.controller().start();
    engine
        .run_until(Box::new(ring_nops.controller().done_event()))
        .unwrap();
    let nop_ticks = clock.tick_now().tick();

    // Same final register-file contents, only the cycle count may move.
    for address in [2, 4] {
        for offset in 0..16 {
            assert_eq!(
                ring.regfile(address).read(offset),
                ring_nops.regfile(address).read(offset)
            );
        }
    }
    assert!(nop_ticks >= reference_ticks);
}

#[test]
fn at_most_one_incomplete_token_in_flight() {
    let (mut engine, ring) = start_ring_test(file!(), &small_ring());
    let clock = engine.default_clock();

    ring.data_memory().write(1, 1);
    ring.load_program(&[
        Instruction::copy(0, 1, 2, 1),
        Instruction::copy(2, 1, 4, 1),
        Instruction::copy(4, 1, 4, 2),
        Instruction::copy(4, 2, 3, 2),
        Instruction::copy(3, 2, 0, 2),
        Instruction::end(),
    ]);

    let observed = ring.clone();
    engine.spawn(async move {
        loop {
            clock.wait_ticks(1).await;
            let incomplete = observed
                .forwarded_tokens()
                .iter()
                .filter(|token| !token.read_complete || !token.write_complete)
                .count();
            assert!(incomplete <= 1, "{incomplete} live tokens on the ring");
        }
    });

    ring.controller().start();
    engine
        .run_until(Box::new(ring.controller().done_event()))
        .unwrap();

    assert_eq!(ring.data_memory().read(2), 1);
}

#[test]
fn restart_runs_the_program_again() {
    let (mut engine, ring) = start_ring_test(file!(), &small_ring());

    ring.data_memory().write(1, 5);
    ring.load_program(&[Instruction::copy(0, 1, 1, 1), Instruction::end()]);

    ring.controller().start();
    engine
        .run_until(Box::new(ring.controller().done_event()))
        .unwrap();
    assert_eq!(ring.regfile(1).read(1), 5);

    // A second start pulse rewinds the program counter and re-runs the same
    // program against the updated data memory.
    ring.data_memory().write(1, 9);
    ring.controller().start();
    engine
        .run_until(Box::new(ring.controller().done_event()))
        .unwrap();
    assert_eq!(ring.regfile(1).read(1), 9);
}

#[test]
fn data_memory_transfers_work_without_any_nodes() {
    let config = RingConfig {
        node_count: 0,
        ..small_ring()
    };
    let (mut engine, ring) = start_ring_test(file!(), &config);

    ring.data_memory().write(1, 3);
    ring.load_program(&[Instruction::copy(0, 1, 0, 2), Instruction::end()]);

    ring.controller().start();
    engine
        .run_until(Box::new(ring.controller().done_event()))
        .unwrap();

    assert_eq!(ring.data_memory().read(2), 3);
}

#[test]
fn nothing_moves_before_start() {
    let (mut engine, ring) = start_ring_test(file!(), &small_ring());
    let clock = engine.default_clock();

    ring.data_memory().write(1, 1);
    ring.load_program(&[Instruction::copy(0, 1, 2, 1), Instruction::end()]);

    sdma_models::test_helpers::finish_at(&engine.spawner(), clock, 100);
    sdma_engine::run_simulation!(engine, "Error: Finish");

    assert!(!ring.controller().busy());
    assert_eq!(ring.controller().pc(), 0);
    assert_eq!(ring.regfile(2).read(1), 0);
}
