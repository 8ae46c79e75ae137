// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::io::Write;
use std::sync::{Arc, Mutex};

use crate::tracker::{EntityManager, Track};
use crate::{SharedWriter, Tag, Writer};

/// A simple text logger to output messages to a Writer.
pub struct TextTracker {
    entity_manager: EntityManager,

    /// Writer to which all _track_ events will be written.
    writer: SharedWriter,
}

impl TextTracker {
    /// Create a new [`TextTracker`] with an [`EntityManager`].
    pub fn new(entity_manager: EntityManager, writer: Writer) -> Self {
        Self {
            entity_manager,
            writer: Arc::new(Mutex::new(writer)),
        }
    }
}

/// Implementation for each [`Track`] event
impl Track for TextTracker {
    fn unique_tag(&self) -> Tag {
        self.entity_manager.unique_tag()
    }

    fn is_entity_enabled(&self, tag: Tag, level: log::Level) -> bool {
        self.entity_manager.is_enabled(tag, level)
    }

    fn add_entity(&self, tag: Tag, entity_name: &str) {
        self.entity_manager.add_entity(tag, entity_name);
    }

    fn enter(&self, enter_into: Tag, enter_obj: Tag) {
        self.writer
            .lock()
            .unwrap()
            .write_all(format!("{enter_into}: enter {enter_obj}\n").as_bytes())
            .unwrap();
    }

    fn exit(&self, exit_from: Tag, exit_obj: Tag) {
        self.writer
            .lock()
            .unwrap()
            .write_all(format!("{exit_from}: exit {exit_obj}\n").as_bytes())
            .unwrap();
    }

    fn create(&self, created_by: Tag, created_obj: Tag, num_bytes: usize, name: &str) {
        self.writer
            .lock()
            .unwrap()
            .write_all(
                format!("{created_by}: created {created_obj}, {name}, {num_bytes} bytes\n")
                    .as_bytes(),
            )
            .unwrap();
    }

    fn destroy(&self, destroyed_by: Tag, destroyed_obj: Tag) {
        self.writer
            .lock()
            .unwrap()
            .write_all(format!("{destroyed_by}: destroyed {destroyed_obj}\n").as_bytes())
            .unwrap();
    }

    fn log(&self, msg_by: Tag, level: log::Level, msg: std::fmt::Arguments) {
        self.writer
            .lock()
            .unwrap()
            .write_all(format!("{msg_by}:{level}: {msg}\n").as_bytes())
            .unwrap();
    }

    fn time(&self, set_by: Tag, time_ns: f64) {
        self.writer
            .lock()
            .unwrap()
            .write_all(format!("{set_by}: set time to {time_ns:.1}ns\n").as_bytes())
            .unwrap();
    }

    fn shutdown(&self) {
        self.writer.lock().unwrap().flush().unwrap();
    }
}
