// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The unit of work circulating the ring.
//!
//! A token is forwarded between ring stages on every clock edge. The four
//! address fields are pure pass-through: no stage ever rewrites them, which
//! is what lets every node compare against its own static address without
//! any global coordination. The two completion flags are monotonic within a
//! token's lifetime; they are only reset by the controller injecting a new
//! token into the opening.

use std::fmt;

use sdma_engine::traits::SimObject;
use sdma_track::tag::{Tag, Tagged};

/// Number of payload bytes moved by one token.
pub const TOKEN_PAYLOAD_BYTES: usize = 4;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Token {
    /// Node that must service the read side.
    pub read_node: u8,
    /// Node that must service the write side.
    pub write_node: u8,
    /// Offset into the read node's register file.
    pub read_addr: u16,
    /// Offset into the write node's register file.
    pub write_addr: u16,
    /// Payload, valid once `read_complete` is set.
    pub data: u32,
    /// The read side has been serviced.
    pub read_complete: bool,
    /// The write side has been serviced. Never set before `read_complete`.
    pub write_complete: bool,

    tag: Tag,
}

impl Token {
    /// A token that no node will capture and that leaves an opening at the
    /// controller. This is what the controller injects whenever it has no
    /// transfer to dispatch, and what every pipeline register holds at
    /// reset.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            read_complete: true,
            write_complete: true,
            ..Self::default()
        }
    }

    /// A new transfer: read `read_node[read_addr]`, then write the captured
    /// data to `write_node[write_addr]`.
    #[must_use]
    pub fn copy(read_node: u8, read_addr: u16, write_node: u8, write_addr: u16, tag: Tag) -> Self {
        Self {
            read_node,
            write_node,
            read_addr,
            write_addr,
            data: 0,
            read_complete: false,
            write_complete: false,
            tag,
        }
    }

    /// The flow-control opening test: the ring can accept a new token when
    /// the one most recently returned is either fully finished or was never
    /// a real transfer.
    #[must_use]
    pub fn is_opening(&self) -> bool {
        self.write_complete || !self.read_complete
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{}] -> {}[{}] data {:#010x} {}{}",
            self.read_node,
            self.read_addr,
            self.write_node,
            self.write_addr,
            self.data,
            if self.read_complete { "R" } else { "-" },
            if self.write_complete { "W" } else { "-" },
        )
    }
}

impl Tagged for Token {
    fn tag(&self) -> Tag {
        self.tag
    }
}

impl SimObject for Token {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_token_leaves_an_opening() {
        assert!(Token::idle().is_opening());
    }

    #[test]
    fn fresh_copy_occupies_the_ring() {
        let token = Token::copy(1, 2, 3, 4, Tag(9));
        assert!(!token.is_opening());
        assert_eq!(token.tag(), Tag(9));
    }

    #[test]
    fn read_complete_alone_is_not_an_opening() {
        let mut token = Token::copy(1, 2, 3, 4, Tag(9));
        token.read_complete = true;
        assert!(!token.is_opening());

        token.write_complete = true;
        assert!(token.is_opening());
    }

    #[test]
    fn display_shows_addresses_and_flags() {
        let mut token = Token::copy(2, 1, 4, 3, Tag(9));
        token.data = 0x1234;
        token.read_complete = true;
        assert_eq!(format!("{token}"), "2[1] -> 4[3] data 0x00001234 R-");
    }
}
