// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Throughput of a block-copy program over rings of a few sizes.

use criterion::{Criterion, criterion_group, criterion_main};
use sdma_engine::engine::Engine;
use sdma_models::program::Instruction;
use sdma_models::ring::{RingConfig, ShiftRing};
use sdma_track::tracker::dev_null_tracker;

const BLOCK_WORDS: u16 = 16;

fn run_block_copy(node_count: usize) {
    let mut engine = Engine::new(&dev_null_tracker());
    let config = RingConfig {
        node_count,
        regfile_depth: 64,
        instruction_depth: 64,
        data_depth: 64,
        watchdog_ticks: None,
    };
    let ring = ShiftRing::new(&mut engine, &config);
    ring.spawn_all(&engine.spawner());

    let mut program = Vec::new();
    for offset in 0..BLOCK_WORDS {
        ring.data_memory().write(offset, offset as u32 + 1);
        program.push(Instruction::copy(0, offset, 1, offset));
    }
    program.push(Instruction::end());
    ring.load_program(&program);

    ring.controller().start();
    engine
        .run_until(Box::new(ring.controller().done_event()))
        .unwrap();

    assert_eq!(ring.regfile(1).read(BLOCK_WORDS - 1), BLOCK_WORDS as u32);
}

fn bench_block_copy(c: &mut Criterion) {
    let mut group = c.benchmark_group("block_copy");
    for node_count in [2, 8, 32] {
        group.bench_function(format!("ring{node_count}"), |b| {
            b.iter(|| run_block_copy(node_count));
        });
    }
    group.finish();
}

criterion_group!(benches, bench_block_copy);
criterion_main!(benches);
