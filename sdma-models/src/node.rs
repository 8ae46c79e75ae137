// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! An addressable pipeline stage of the ring.
//!
//! Every clock edge the node decides whether the incoming token's read or
//! write side belongs to its own address and, if so, performs the matching
//! access against its local register file; otherwise the token passes
//! through unchanged. Pass-through fields always cross the node with a
//! fixed two-cycle latency: the register file needs one edge between the
//! address being presented and the data being driven onto the ring.
//!
//! # Ports
//!
//! This component has two ports:
//!  - One [input port](sdma_engine::port::InPort): `rx`
//!  - One [output port](sdma_engine::port::OutPort): `tx`
//!
//! # Diagram
//!
//! ```text
//!        +------------------------------------+
//!  rx -> | input -> buffer -> output register | -> tx
//!        |   |                   ^            |
//!        |   v                   |            |
//!        | match ---------> register file    |
//!        +------------------------------------+
//! ```

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use sdma_engine::executor::Spawner;
use sdma_engine::port::{InPort, OutPort, PortState};
use sdma_engine::time::clock::Clock;
use sdma_engine::types::SimResult;
use sdma_model_builder::EntityDisplay;
use sdma_track::entity::Entity;
use sdma_track::tag::Tagged;
use sdma_track::{enter, exit, trace};

use crate::register_file::RegisterFile;
use crate::token::Token;
use crate::{connect_tx, port_rx, take_option};

/// Clock phase on which every stage drives its output register onto the
/// ring.
pub const DRIVE_PHASE: u32 = 0;

/// Clock phase on which every stage samples its input wire and updates its
/// registers. Running strictly after [`DRIVE_PHASE`] keeps the lock-step
/// pipeline deterministic however the executor interleaves the stages.
pub const SAMPLE_PHASE: u32 = 1;

/// The two-stage pipeline a token crosses inside a node.
///
/// This is the synchronous transfer function of the node, kept free of any
/// engine state so it can be stepped directly: one call is one clock edge.
/// The same pipeline serves the controller's internal node at address 0.
#[derive(Clone, Debug)]
pub struct NodePipe {
    address: u8,

    /// Mid-pipeline register holding the previous edge's input.
    buf: Token,

    /// A read matched on the previous edge; forward its data this edge.
    read_pending: bool,
    read_data: u32,
}

impl NodePipe {
    #[must_use]
    pub fn new(address: u8) -> Self {
        Self {
            address,
            buf: Token::idle(),
            read_pending: false,
            read_data: 0,
        }
    }

    #[must_use]
    pub fn address(&self) -> u8 {
        self.address
    }

    /// The incoming token's read side belongs to this node.
    #[must_use]
    pub fn read_matches(&self, input: &Token) -> bool {
        input.read_node == self.address && !input.read_complete
    }

    /// The incoming token's write side belongs to this node. A write can
    /// only be serviced once the read side has completed, which also keeps
    /// the two capture conditions exclusive on any one edge.
    #[must_use]
    pub fn write_matches(&self, input: &Token) -> bool {
        input.write_node == self.address && input.read_complete && !input.write_complete
    }

    /// Advance the pipeline by one clock edge.
    ///
    /// Accepts the token on the input wire, performs any matching register
    /// file access, and returns the token the output register drives to the
    /// next stage on the following edge.
    pub fn step(&mut self, regfile: &RegisterFile, input: Token) -> Token {
        // Drive the output register from the mid-pipeline stage. A read
        // matched on the previous edge overrides the buffered data with the
        // word the register file returned.
        let mut output = self.buf;
        if self.read_pending {
            output.data = self.read_data;
            output.read_complete = true;
        }

        // Read capture: present the address this edge, forward the data on
        // the next.
        self.read_pending = self.read_matches(&input);
        if self.read_pending {
            self.read_data = regfile.read(input.read_addr);
        }

        // Write capture happens as the token enters the pipeline.
        let mut buf = input;
        if self.write_matches(&input) {
            regfile.write(input.write_addr, input.data);
            buf.write_complete = true;
        }
        self.buf = buf;

        output
    }
}

struct NodeState {
    entity: Arc<Entity>,
    clock: Clock,
    spawner: Spawner,
    regfile: Rc<RegisterFile>,
    pipe: RefCell<NodePipe>,

    /// The output register: driven onto the ring each [`DRIVE_PHASE`],
    /// updated from the pipeline each [`SAMPLE_PHASE`].
    out_reg: Cell<Token>,

    rx: RefCell<Option<InPort<Token>>>,
    tx: RefCell<Option<OutPort<Token>>>,
}

#[derive(Clone, EntityDisplay)]
pub struct ShiftNode {
    pub entity: Arc<Entity>,
    state: Rc<NodeState>,
}

impl ShiftNode {
    /// Create a node bound to `address` with its own register file.
    ///
    /// Address 0 is reserved for the controller's internal node.
    #[must_use]
    pub fn new(
        parent: &Arc<Entity>,
        name: &str,
        clock: Clock,
        spawner: Spawner,
        address: u8,
        regfile_depth: usize,
    ) -> Self {
        assert!(address != 0, "address 0 is reserved for the controller");
        let entity = Arc::new(Entity::new(parent, name));
        let regfile = Rc::new(RegisterFile::new(&entity, "regs", regfile_depth));
        let state = NodeState {
            entity: entity.clone(),
            clock,
            spawner,
            regfile,
            pipe: RefCell::new(NodePipe::new(address)),
            out_reg: Cell::new(Token::idle()),
            rx: RefCell::new(Some(InPort::new(entity.clone()))),
            tx: RefCell::new(Some(OutPort::new(entity.clone(), "tx"))),
        };
        Self {
            entity,
            state: Rc::new(state),
        }
    }

    #[must_use]
    pub fn address(&self) -> u8 {
        self.state.pipe.borrow().address()
    }

    /// The register file behind this node. The excluded peripheral logic
    /// owns the other side of this memory.
    #[must_use]
    pub fn regfile(&self) -> Rc<RegisterFile> {
        self.state.regfile.clone()
    }

    /// The token in the output register: what the node drives to the next
    /// stage on the current clock edge.
    #[must_use]
    pub fn forwarded(&self) -> Token {
        self.state.out_reg.get()
    }

    pub fn connect_port_tx(&self, port_state: Rc<PortState<Token>>) {
        connect_tx!(self.state.tx, connect ; port_state);
    }

    #[must_use]
    pub fn port_rx(&self) -> Rc<PortState<Token>> {
        port_rx!(self.state.rx, state)
    }

    pub async fn run(&self) -> SimResult {
        // Spawn the drive end of the node
        let tx = take_option!(self.state.tx);
        let state = self.state.clone();
        self.state.spawner.spawn(async move { run_tx(tx, state).await });

        let rx = take_option!(self.state.rx);
        self.state.clock.wait_phase(SAMPLE_PHASE).await;
        loop {
            let input = rx.get().await;

            let output = {
                let mut pipe = self.state.pipe.borrow_mut();
                if pipe.read_matches(&input) {
                    enter!(self.state.entity ; input.tag());
                    trace!(self.state.entity ; "read capture {input}");
                }
                if pipe.write_matches(&input) {
                    exit!(self.state.entity ; input.tag());
                    trace!(self.state.entity ; "write capture {input}");
                }
                pipe.step(&self.state.regfile, input)
            };
            self.state.out_reg.set(output);

            self.state.clock.next_tick_and_phase(SAMPLE_PHASE).await;
        }
    }
}

/// Drive the output register onto the ring once per tick.
async fn run_tx(tx: OutPort<Token>, state: Rc<NodeState>) -> SimResult {
    loop {
        tx.put(state.out_reg.get()).await?;
        state.clock.next_tick_and_phase(DRIVE_PHASE).await;
    }
}

#[cfg(test)]
mod tests {
    use sdma_track::Tag;
    use sdma_track::entity::toplevel;
    use sdma_track::test_helpers::create_tracker;

    use super::*;

    fn test_regfile(depth: usize) -> RegisterFile {
        let tracker = create_tracker(file!());
        let top = toplevel(&tracker, "top");
        RegisterFile::new(&top, "regs", depth)
    }

    #[test]
    fn tokens_pass_through_with_two_stage_delay() {
        let regs = test_regfile(8);
        let mut pipe = NodePipe::new(1);

        let mut token = Token::copy(2, 3, 4, 5, Tag(7));
        token.read_complete = true;
        token.data = 0x55;

        // The token goes in on one edge and comes back out, unchanged, two
        // register stages later.
        assert_eq!(pipe.step(&regs, token), Token::idle());
        assert_eq!(pipe.step(&regs, Token::idle()), token);
        assert_eq!(pipe.step(&regs, Token::idle()), Token::idle());
        assert_eq!(regs.num_reads() + regs.num_writes(), 0);
    }

    #[test]
    fn read_capture_fills_data_and_sets_the_flag() {
        let regs = test_regfile(8);
        regs.write(3, 0xcafe_f00d);
        let mut pipe = NodePipe::new(1);

        let token = Token::copy(1, 3, 2, 0, Tag(7));
        assert_eq!(pipe.step(&regs, token), Token::idle());

        let forwarded = pipe.step(&regs, Token::idle());
        assert_eq!(forwarded.data, 0xcafe_f00d);
        assert!(forwarded.read_complete);
        assert!(!forwarded.write_complete);
        // Addresses are pure pass-through.
        assert_eq!(forwarded.read_node, 1);
        assert_eq!(forwarded.write_node, 2);
        assert_eq!(forwarded.read_addr, 3);
        assert_eq!(forwarded.write_addr, 0);
    }

    #[test]
    fn write_capture_requires_a_completed_read() {
        let regs = test_regfile(8);
        let mut pipe = NodePipe::new(2);

        // Write side matches but the read has not completed: no access.
        let token = Token::copy(1, 3, 2, 5, Tag(7));
        pipe.step(&regs, token);
        assert_eq!(regs.num_writes(), 0);

        // With the read complete the word is committed and the flag set.
        let mut token = Token::copy(1, 3, 2, 5, Tag(7));
        token.read_complete = true;
        token.data = 0x77;
        pipe.step(&regs, token);
        assert_eq!(regs.read(5), 0x77);

        let forwarded = pipe.step(&regs, Token::idle());
        assert!(forwarded.write_complete);
    }

    #[test]
    fn completed_tokens_are_not_captured_again() {
        let regs = test_regfile(8);
        let mut pipe = NodePipe::new(1);

        let mut token = Token::copy(1, 3, 1, 5, Tag(7));
        token.read_complete = true;
        token.write_complete = true;
        token.data = 0x99;

        pipe.step(&regs, token);
        pipe.step(&regs, Token::idle());
        assert_eq!(regs.num_reads(), 0);
        assert_eq!(regs.num_writes(), 0);
    }

    #[test]
    fn mismatched_addresses_leave_the_register_file_alone() {
        let regs = test_regfile(8);
        let mut pipe = NodePipe::new(3);

        let token = Token::copy(1, 0, 2, 0, Tag(7));
        pipe.step(&regs, token);
        pipe.step(&regs, Token::idle());
        assert_eq!(regs.num_reads() + regs.num_writes(), 0);
    }

    #[test]
    fn self_copy_reads_first_then_writes_on_the_next_pass() {
        let regs = test_regfile(8);
        regs.write(1, 0x11);
        let mut pipe = NodePipe::new(4);

        // First pass: only the read side matches (the write side requires
        // read_complete, which the same token cannot yet carry).
        let token = Token::copy(4, 1, 4, 2, Tag(7));
        pipe.step(&regs, token);
        let after_first_pass = pipe.step(&regs, Token::idle());
        assert!(after_first_pass.read_complete);
        assert!(!after_first_pass.write_complete);
        assert_eq!(regs.num_writes(), 1); // The seed write only.

        // Second pass, as the ring brings the token around again: the write
        // side is serviced.
        pipe.step(&regs, after_first_pass);
        let after_second_pass = pipe.step(&regs, Token::idle());
        assert!(after_second_pass.write_complete);
        assert_eq!(regs.read(2), 0x11);
    }
}
