// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! The program sequencer that injects and retires ring transactions.
//!
//! The controller fetches instructions from its program memory and turns
//! `COPY` instructions into [tokens](crate::token::Token), injecting a new
//! one only when the ring reports an opening: the token most recently
//! returned is either fully finished or was never a real transfer. This
//! keeps at most one live transaction anywhere in the ring, so transfers
//! are strictly serialized and never reorder.
//!
//! The controller owns an internal node at address 0 bound to a shared data
//! memory; that is where host-visible scratch data enters and leaves the
//! ring.
//!
//! A transfer naming a node address with no node in the ring never
//! completes, the opening never re-appears, and the controller stalls with
//! `busy` held high - silently, exactly as the hardware does. The optional
//! watchdog (see [`ControllerConfig::watchdog_ticks`]) is a clearly
//! separated liveness extension for simulations that would rather see a
//! diagnosable error than a hung run.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;

use sdma_engine::events::repeated::Repeated;
use sdma_engine::executor::Spawner;
use sdma_engine::port::{InPort, OutPort, PortState};
use sdma_engine::sim_error;
use sdma_engine::time::clock::Clock;
use sdma_engine::types::{SimError, SimResult};
use sdma_model_builder::EntityDisplay;
use sdma_track::Tag;
use sdma_track::entity::Entity;
use sdma_track::tag::Tagged;
use sdma_track::{create, create_tag, debug, error, info};

use crate::node::{DRIVE_PHASE, NodePipe, SAMPLE_PHASE};
use crate::program::{DEFAULT_INSTRUCTION_DEPTH, Instruction, InstructionMemory, Opcode};
use crate::register_file::{DEFAULT_DATA_DEPTH, RegisterFile};
use crate::token::{TOKEN_PAYLOAD_BYTES, Token};
use crate::{connect_tx, port_rx, take_option};

/// Controller sizing and the optional liveness check.
#[derive(Clone)]
pub struct ControllerConfig {
    /// Depth of the instruction memory in 64-bit words.
    pub instruction_depth: usize,

    /// Depth of the data memory behind the internal node in 32-bit words.
    pub data_depth: usize,

    /// When set, fail the simulation if an injected transfer stays
    /// incomplete for this many consecutive ticks. `None` preserves the
    /// hardware behavior: a transfer to a missing node hangs the
    /// controller forever with no error reported.
    pub watchdog_ticks: Option<u64>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            instruction_depth: DEFAULT_INSTRUCTION_DEPTH,
            data_depth: DEFAULT_DATA_DEPTH,
            watchdog_ticks: None,
        }
    }
}

struct ControllerState {
    entity: Arc<Entity>,
    clock: Clock,
    spawner: Spawner,
    imem: Rc<InstructionMemory>,
    dmem: Rc<RegisterFile>,

    /// The internal node making the data memory reachable from the ring.
    pipe: RefCell<NodePipe>,

    pc: Cell<u16>,
    busy: Cell<bool>,
    start_req: Cell<bool>,
    done: Repeated<()>,

    /// Tag of the transfer currently on the ring, if any. A new transfer is
    /// only injected once this one has retired, so the ring never carries
    /// more than one live transaction.
    inflight: Cell<Option<Tag>>,

    watchdog_ticks: Option<u64>,
    blocked_ticks: Cell<u64>,

    /// The output register: driven into the ring each
    /// [`DRIVE_PHASE`](crate::node::DRIVE_PHASE), updated from the internal
    /// node each [`SAMPLE_PHASE`](crate::node::SAMPLE_PHASE).
    out_reg: Cell<Token>,

    rx: RefCell<Option<InPort<Token>>>,
    tx: RefCell<Option<OutPort<Token>>>,
}

#[derive(Clone, EntityDisplay)]
pub struct ShiftController {
    pub entity: Arc<Entity>,
    state: Rc<ControllerState>,
}

impl ShiftController {
    #[must_use]
    pub fn new(
        parent: &Arc<Entity>,
        name: &str,
        clock: Clock,
        spawner: Spawner,
        config: &ControllerConfig,
    ) -> Self {
        let entity = Arc::new(Entity::new(parent, name));
        let imem = Rc::new(InstructionMemory::new(
            &entity,
            "imem",
            config.instruction_depth,
        ));
        let dmem = Rc::new(RegisterFile::new(&entity, "dmem", config.data_depth));
        let state = ControllerState {
            entity: entity.clone(),
            clock,
            spawner,
            imem,
            dmem,
            pipe: RefCell::new(NodePipe::new(0)),
            pc: Cell::new(0),
            busy: Cell::new(false),
            start_req: Cell::new(false),
            done: Repeated::default(),
            inflight: Cell::new(None),
            watchdog_ticks: config.watchdog_ticks,
            blocked_ticks: Cell::new(0),
            out_reg: Cell::new(Token::idle()),
            rx: RefCell::new(Some(InPort::new(entity.clone()))),
            tx: RefCell::new(Some(OutPort::new(entity.clone(), "tx"))),
        };
        Self {
            entity,
            state: Rc::new(state),
        }
    }

    /// The program memory, loaded by the host before `start`.
    #[must_use]
    pub fn instruction_memory(&self) -> Rc<InstructionMemory> {
        self.state.imem.clone()
    }

    /// The data memory behind the internal node (address 0).
    #[must_use]
    pub fn data_memory(&self) -> Rc<RegisterFile> {
        self.state.dmem.clone()
    }

    /// Request execution from instruction 0.
    ///
    /// The request is latched until the first instruction is processed, at
    /// which point `busy` rises.
    pub fn start(&self) {
        debug!(self.state.entity ; "start requested");
        self.state.start_req.set(true);
    }

    /// High while a program is executing or a transfer is still in flight.
    #[must_use]
    pub fn busy(&self) -> bool {
        self.state.busy.get()
    }

    /// The current program counter.
    #[must_use]
    pub fn pc(&self) -> u16 {
        self.state.pc.get()
    }

    /// Event notified each time `busy` falls.
    #[must_use]
    pub fn done_event(&self) -> Repeated<()> {
        self.state.done.clone()
    }

    /// The token in the output register: what the controller drives into
    /// the ring on the current clock edge.
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
        // Spawn the drive end of the controller
        let tx = take_option!(self.state.tx);
        let state = self.state.clone();
        self.state.spawner.spawn(async move { run_tx(tx, state).await });

        let rx = take_option!(self.state.rx);
        self.state.clock.wait_phase(SAMPLE_PHASE).await;
        loop {
            let returned = rx.get().await;

            let injected = self.dispatch(returned)?;
            let output = self
                .state
                .pipe
                .borrow_mut()
                .step(&self.state.dmem, injected);
            self.state.out_reg.set(output);

            self.state.clock.next_tick_and_phase(SAMPLE_PHASE).await;
        }
    }

    /// One edge of the fetch/dispatch sequencer: decide what enters the
    /// internal node this edge - a fresh transfer, an idle token, or the
    /// returning token circulating for another revolution.
    fn dispatch(&self, returned: Token) -> Result<Token, SimError> {
        let state = &self.state;

        // The opening test. While a transfer is on the ring the stale,
        // already-completed tokens circulating behind it all report
        // `write_complete`, so the test is applied to the owned transfer
        // only: its return either retires it (complete, or never claimed by
        // any read node) or sends it around for another revolution.
        let opening = match state.inflight.get() {
            None => returned.is_opening(),
            Some(tag) => returned.tag() == tag && returned.is_opening(),
        };
        if opening && state.inflight.get().is_some() {
            state.inflight.set(None);
            debug!(state.entity ; "retire {returned}");
        }

        let pc = state.pc.get();
        let instruction = state.imem.fetch(pc);

        // The program logically terminates at the first END or at the last
        // addressable slot, whichever comes first.
        let at_boundary =
            instruction.opcode == Opcode::End || pc as usize == state.imem.depth() - 1;
        let running = !at_boundary && (state.start_req.get() || state.busy.get());

        if running {
            if !state.busy.get() {
                info!(state.entity ; "busy: executing from instruction {pc}");
            }
            state.busy.set(true);
            state.start_req.set(false);

            if instruction.opcode == Opcode::Copy {
                if opening {
                    state.blocked_ticks.set(0);
                    state.pc.set(pc + 1);

                    let tag = create_tag!(state.entity);
                    let token = Token::copy(
                        instruction.source_node,
                        instruction.source_addr,
                        instruction.dest_node,
                        instruction.dest_addr,
                        tag,
                    );
                    create!(state.entity ; token, TOKEN_PAYLOAD_BYTES);
                    debug!(state.entity ; "inject {token} for instruction {pc}");
                    state.inflight.set(Some(tag));
                    Ok(token)
                } else {
                    // The instruction is delayed, never dropped: hold the
                    // program counter and keep the in-flight token
                    // circulating.
                    self.watchdog_check(pc, &instruction)?;
                    Ok(returned)
                }
            } else {
                // NOP, and anything an unrecognized opcode decayed to,
                // consumes its slot unconditionally.
                state.pc.set(pc + 1);
                if opening {
                    state.blocked_ticks.set(0);
                    Ok(Token::idle())
                } else {
                    self.watchdog_check(pc, &instruction)?;
                    Ok(returned)
                }
            }
        } else {
            // Halted: END, the last program slot, or no start request.
            if opening {
                state.blocked_ticks.set(0);
                if state.busy.get() {
                    state.busy.set(false);
                    info!(state.entity ; "program complete at instruction {pc}");
                    state.done.notify()?;
                }
                if state.start_req.get() {
                    state.pc.set(0);
                }
                // Hold the ring idle so nothing is left half-completed.
                Ok(Token::idle())
            } else {
                // The final transfer is still in flight; busy holds until
                // it retires.
                self.watchdog_check(pc, &instruction)?;
                Ok(returned)
            }
        }
    }

    fn watchdog_check(&self, pc: u16, instruction: &Instruction) -> SimResult {
        let state = &self.state;
        let blocked = state.blocked_ticks.get() + 1;
        state.blocked_ticks.set(blocked);
        if let Some(limit) = state.watchdog_ticks {
            if blocked > limit {
                error!(state.entity ;
                    "watchdog: no opening for {limit} ticks, program held at instruction {pc}: {instruction}");
                return sim_error!(format!(
                    "transfer stalled for {limit} ticks at instruction {pc}: {instruction}"
                ));
            }
        }
        Ok(())
    }
}

/// Drive the output register into the ring once per tick.
async fn run_tx(tx: OutPort<Token>, state: Rc<ControllerState>) -> SimResult {
    loop {
        tx.put(state.out_reg.get()).await?;
        state.clock.next_tick_and_phase(DRIVE_PHASE).await;
    }
}

