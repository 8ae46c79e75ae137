// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Demonstration programs for the ring.

use sdma_models::program::Instruction;

/// The smallest node count [`relay`] can run against.
pub const RELAY_MIN_NODES: usize = 4;

/// The seed word's offset in the data memory.
pub const RELAY_SEED_ADDR: u16 = 1;

/// Where [`relay`] finally lands the word back in the data memory.
pub const RELAY_RESULT_ADDR: u16 = 2;

/// Walk one word out of the data memory, forward through the ring,
/// backwards again, and home: forward copies, a self copy, a reverse copy
/// and a copy into the controller's own memory.
///
/// After completion every visited register holds the seed word:
/// `node2[1]`, `node4[1]`, `node4[2]`, `node3[2]` and `data_memory[2]`.
#[must_use]
pub fn relay() -> Vec<Instruction> {
    vec![
        Instruction::copy(0, RELAY_SEED_ADDR, 2, 1),
        Instruction::copy(2, 1, 4, 1),
        Instruction::copy(4, 1, 4, 2),
        Instruction::copy(4, 2, 3, 2),
        Instruction::copy(3, 2, 0, RELAY_RESULT_ADDR),
        Instruction::end(),
    ]
}

/// Registers [`relay`] writes on its way around, as `(address, offset)`
/// pairs in program order.
#[must_use]
pub fn relay_trail() -> Vec<(u8, u16)> {
    vec![(2, 1), (4, 1), (4, 2), (3, 2)]
}

/// The same relay with its first hop aimed at a node that is not in the
/// ring: the documented lockup hazard. `busy` will never clear unless the
/// watchdog is armed.
#[must_use]
pub fn relay_with_missing_node(node_count: usize) -> Vec<Instruction> {
    let absent = (node_count + 1) as u8;
    vec![
        Instruction::copy(0, RELAY_SEED_ADDR, absent, 1),
        Instruction::copy(2, 1, 4, 1),
        Instruction::end(),
    ]
}

#[cfg(test)]
mod tests {
    use sdma_models::program::Opcode;

    use super::*;

    #[test]
    fn relay_ends_and_stays_in_reach() {
        let program = relay();
        assert_eq!(program.last().unwrap().opcode, Opcode::End);
        for instruction in &program {
            assert!((instruction.source_node as usize) <= RELAY_MIN_NODES);
            assert!((instruction.dest_node as usize) <= RELAY_MIN_NODES);
        }
    }
}
