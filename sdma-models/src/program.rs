// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The stored program that drives the ring.
//!
//! Instructions are 64-bit words held in a dedicated memory, written once by
//! an external loader before `start` and read-only during execution:
//!
//! | bits  | field                      |
//! |-------|----------------------------|
//! | 0-7   | source node address        |
//! | 8-15  | destination node address   |
//! | 16-31 | source register offset     |
//! | 32-47 | destination register offset|
//! | 48-51 | opcode                     |
//! | 52-63 | unused                     |

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use sdma_track::entity::Entity;

/// Default instruction memory depth - enough program for an entire update
/// period at 50% ring utilization.
pub const DEFAULT_INSTRUCTION_DEPTH: usize = 4096;

const DEST_NODE_SHIFT: u64 = 8;
const SOURCE_ADDR_SHIFT: u64 = 16;
const DEST_ADDR_SHIFT: u64 = 32;
const OPCODE_SHIFT: u64 = 48;
const OPCODE_BITS: u64 = 0xf;

/// Operation selected by bits 48-51 of an instruction word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Opcode {
    /// End of program.
    End,
    /// No operation.
    Nop,
    /// Copy one word from source to destination.
    Copy,
}

impl Opcode {
    fn to_bits(self) -> u64 {
        match self {
            Opcode::End => 0,
            Opcode::Nop => 1,
            Opcode::Copy => 2,
        }
    }

    /// Unrecognized opcode fields decode to [`Opcode::Nop`]: the controller
    /// must not hang on a malformed program, so anything it does not know
    /// behaves as a no-operation.
    fn from_bits(bits: u64) -> Self {
        match bits {
            0 => Opcode::End,
            2 => Opcode::Copy,
            _ => Opcode::Nop,
        }
    }
}

/// A decoded instruction word.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub source_node: u8,
    pub dest_node: u8,
    pub source_addr: u16,
    pub dest_addr: u16,
}

impl Instruction {
    /// Copy `source_node[source_addr]` to `dest_node[dest_addr]`.
    #[must_use]
    pub fn copy(source_node: u8, source_addr: u16, dest_node: u8, dest_addr: u16) -> Self {
        Self {
            opcode: Opcode::Copy,
            source_node,
            dest_node,
            source_addr,
            dest_addr,
        }
    }

    /// An instruction that only consumes a program slot.
    #[must_use]
    pub fn nop() -> Self {
        Self {
            opcode: Opcode::Nop,
            source_node: 0,
            dest_node: 0,
            source_addr: 0,
            dest_addr: 0,
        }
    }

    /// Terminate the program.
    #[must_use]
    pub fn end() -> Self {
        Self {
            opcode: Opcode::End,
            source_node: 0,
            dest_node: 0,
            source_addr: 0,
            dest_addr: 0,
        }
    }

    /// Pack into the 64-bit memory word format.
    #[must_use]
    pub fn encode(&self) -> u64 {
        self.source_node as u64
            | (self.dest_node as u64) << DEST_NODE_SHIFT
            | (self.source_addr as u64) << SOURCE_ADDR_SHIFT
            | (self.dest_addr as u64) << DEST_ADDR_SHIFT
            | self.opcode.to_bits() << OPCODE_SHIFT
    }

    /// Unpack a 64-bit memory word. Bits 52-63 are ignored.
    #[must_use]
    pub fn decode(word: u64) -> Self {
        Self {
            opcode: Opcode::from_bits((word >> OPCODE_SHIFT) & OPCODE_BITS),
            source_node: word as u8,
            dest_node: (word >> DEST_NODE_SHIFT) as u8,
            source_addr: (word >> SOURCE_ADDR_SHIFT) as u16,
            dest_addr: (word >> DEST_ADDR_SHIFT) as u16,
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.opcode {
            Opcode::End => write!(f, "END"),
            Opcode::Nop => write!(f, "NOP"),
            Opcode::Copy => write!(
                f,
                "COPY {}[{}] -> {}[{}]",
                self.source_node, self.source_addr, self.dest_node, self.dest_addr
            ),
        }
    }
}

/// The program memory.
///
/// Loaded through the host bus bridge before `start` is asserted; the
/// controller only ever reads it.
pub struct InstructionMemory {
    pub entity: Arc<Entity>,
    words: RefCell<Vec<u64>>,
}

impl InstructionMemory {
    #[must_use]
    pub fn new(parent: &Arc<Entity>, name: &str, depth: usize) -> Self {
        Self {
            entity: Arc::new(Entity::new(parent, name)),
            words: RefCell::new(vec![0; depth]),
        }
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        self.words.borrow().len()
    }

    /// Load raw 64-bit words from slot 0.
    pub fn load_words(&self, words: &[u64]) {
        let mut memory = self.words.borrow_mut();
        assert!(
            words.len() <= memory.len(),
            "{}: program of {} words exceeds instruction memory depth {}",
            self.entity,
            words.len(),
            memory.len()
        );
        memory[..words.len()].copy_from_slice(words);
    }

    /// Encode and load a program from slot 0.
    pub fn load(&self, program: &[Instruction]) {
        let words: Vec<u64> = program.iter().map(Instruction::encode).collect();
        self.load_words(&words);
    }

    /// Fetch and decode the word at the program counter.
    #[must_use]
    pub fn fetch(&self, pc: u16) -> Instruction {
        Instruction::decode(self.words.borrow()[pc as usize])
    }
}

#[cfg(test)]
mod tests {
    use sdma_track::entity::toplevel;
    use sdma_track::test_helpers::create_tracker;

    use super::*;

    #[test]
    fn encode_matches_the_word_format() {
        // source_node | dest_node << 8 | source_addr << 16
        //   | dest_addr << 32 | opcode << 48
        let word = Instruction::copy(0, 1, 2, 1).encode();
        assert_eq!(word, 0x0002_0001_0001_0200);

        assert_eq!(Instruction::end().encode(), 0);
        assert_eq!(Instruction::nop().encode(), 0x0001_0000_0000_0000);
    }

    #[test]
    fn decode_round_trip() {
        let instruction = Instruction::copy(3, 0x1234, 200, 0xffff);
        assert_eq!(Instruction::decode(instruction.encode()), instruction);
    }

    #[test]
    fn unknown_opcodes_decode_as_nop() {
        for opcode_bits in 3..16_u64 {
            let decoded = Instruction::decode(opcode_bits << OPCODE_SHIFT);
            assert_eq!(decoded.opcode, Opcode::Nop);
        }
    }

    #[test]
    fn unused_bits_are_ignored() {
        let word = Instruction::copy(1, 2, 3, 4).encode() | 0xfff0_0000_0000_0000;
        assert_eq!(Instruction::decode(word), Instruction::copy(1, 2, 3, 4));
    }

    #[test]
    fn memory_loads_and_fetches() {
        let tracker = create_tracker(file!());
        let top = toplevel(&tracker, "top");
        let memory = InstructionMemory::new(&top, "imem", 16);

        memory.load(&[Instruction::copy(0, 1, 2, 1), Instruction::end()]);
        assert_eq!(memory.fetch(0), Instruction::copy(0, 1, 2, 1));
        assert_eq!(memory.fetch(1), Instruction::end());
        // Untouched slots hold END words.
        assert_eq!(memory.fetch(2).opcode, Opcode::End);
        assert_eq!(memory.depth(), 16);
    }

    #[test]
    #[should_panic(expected = "exceeds instruction memory depth")]
    fn oversized_program_rejected() {
        let tracker = create_tracker(file!());
        let top = toplevel(&tracker, "top");
        let memory = InstructionMemory::new(&top, "imem", 2);
        memory.load(&[Instruction::nop(), Instruction::nop(), Instruction::end()]);
    }
}
