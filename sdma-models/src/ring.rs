// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Build a connected ring.
//!
//! The ring is an ordered chain of [nodes](crate::node::ShiftNode), the
//! output of each wired to the input of the next, closed back through the
//! [controller](crate::controller::ShiftController). Node addresses are
//! plain integers assigned once here: 1..=N for the peripheral nodes, 0
//! reserved for the controller's internal node. There is no runtime
//! discovery or negotiation.

use std::rc::Rc;
use std::sync::Arc;

use sdma_engine::engine::Engine;
use sdma_engine::executor::Spawner;
use sdma_model_builder::EntityDisplay;
use sdma_track::entity::Entity;

use crate::connect_port;
use crate::controller::{ControllerConfig, ShiftController};
use crate::node::ShiftNode;
use crate::program::{DEFAULT_INSTRUCTION_DEPTH, Instruction};
use crate::register_file::{DEFAULT_DATA_DEPTH, RegisterFile};
use crate::token::Token;

/// Ring sizing.
#[derive(Clone)]
pub struct RingConfig {
    /// Number of peripheral nodes, addressed 1..=node_count.
    pub node_count: usize,

    /// Depth of each node's register file in 32-bit words.
    pub regfile_depth: usize,

    /// Depth of the controller's instruction memory in 64-bit words.
    pub instruction_depth: usize,

    /// Depth of the controller's data memory in 32-bit words.
    pub data_depth: usize,

    /// Optional controller liveness check, see
    /// [`ControllerConfig::watchdog_ticks`].
    pub watchdog_ticks: Option<u64>,
}

impl Default for RingConfig {
    fn default() -> Self {
        Self {
            node_count: 4,
            regfile_depth: 4096,
            instruction_depth: DEFAULT_INSTRUCTION_DEPTH,
            data_depth: DEFAULT_DATA_DEPTH,
            watchdog_ticks: None,
        }
    }
}

#[derive(Clone, EntityDisplay)]
pub struct ShiftRing {
    pub entity: Arc<Entity>,
    controller: ShiftController,
    nodes: Vec<ShiftNode>,
}

impl ShiftRing {
    /// Build the controller and nodes and wire them into a loop.
    #[must_use]
    pub fn new(engine: &mut Engine, config: &RingConfig) -> Self {
        let clock = engine.default_clock();
        let spawner = engine.spawner();
        let entity = Arc::new(Entity::new(engine.top(), "ring"));

        let controller = ShiftController::new(
            &entity,
            "controller",
            clock.clone(),
            spawner.clone(),
            &ControllerConfig {
                instruction_depth: config.instruction_depth,
                data_depth: config.data_depth,
                watchdog_ticks: config.watchdog_ticks,
            },
        );

        let nodes: Vec<ShiftNode> = (1..=config.node_count)
            .map(|address| {
                ShiftNode::new(
                    &entity,
                    format!("node{address}").as_str(),
                    clock.clone(),
                    spawner.clone(),
                    address as u8,
                    config.regfile_depth,
                )
            })
            .collect();

        match nodes.first() {
            Some(first) => {
                connect_port!(controller, tx => first, rx);
                for pair in nodes.windows(2) {
                    connect_port!(pair[0], tx => pair[1], rx);
                }
                let last = nodes.last().unwrap();
                connect_port!(last, tx => controller, rx);
            }
            None => {
                // A ring of no peripherals still loops the controller back
                // to itself; data memory transfers keep working.
                connect_port!(controller, tx => controller, rx);
            }
        }

        Self {
            entity,
            controller,
            nodes,
        }
    }

    #[must_use]
    pub fn controller(&self) -> &ShiftController {
        &self.controller
    }

    /// The node bound to `address` (1..=N).
    #[must_use]
    pub fn node(&self, address: u8) -> &ShiftNode {
        assert!(address != 0, "address 0 is the controller's internal node");
        &self.nodes[address as usize - 1]
    }

    /// The register file behind `address`: a node's registers, or the
    /// controller's data memory for address 0.
    #[must_use]
    pub fn regfile(&self, address: u8) -> Rc<RegisterFile> {
        if address == 0 {
            self.controller.data_memory()
        } else {
            self.node(address).regfile()
        }
    }

    #[must_use]
    pub fn data_memory(&self) -> Rc<RegisterFile> {
        self.controller.data_memory()
    }

    /// Load a program into the controller's instruction memory.
    pub fn load_program(&self, program: &[Instruction]) {
        self.controller.instruction_memory().load(program);
    }

    /// Tokens driven onto each ring segment on the most recent clock edge:
    /// the controller's output followed by every node's, in ring order. At
    /// most one of these can ever be incomplete.
    #[must_use]
    pub fn forwarded_tokens(&self) -> Vec<Token> {
        let mut tokens = vec![self.controller.forwarded()];
        tokens.extend(self.nodes.iter().map(ShiftNode::forwarded));
        tokens
    }

    /// Spawn the controller and every node on the engine.
    pub fn spawn_all(&self, spawner: &Spawner) {
        let controller = self.controller.clone();
        spawner.spawn(async move { controller.run().await });
        for node in &self.nodes {
            let node = node.clone();
            spawner.spawn(async move { node.run().await });
        }
    }
}
