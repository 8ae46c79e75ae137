// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use crate::tracker::{Track, Tracker};
use crate::Tag;

/// A tracker that forwards every event to a set of trackers.
///
/// Unique tags are allocated by the first tracker so that they remain
/// globally unique however many outputs are enabled.
pub struct MultiTracker {
    trackers: Vec<Tracker>,
}

impl MultiTracker {
    /// Create a new [`MultiTracker`] from the given trackers.
    ///
    /// # Panics
    ///
    /// Panics if the list of trackers is empty.
    #[must_use]
    pub fn new(trackers: Vec<Tracker>) -> Self {
        assert!(!trackers.is_empty(), "MultiTracker requires a tracker");
        Self { trackers }
    }
}

impl Track for MultiTracker {
    fn unique_tag(&self) -> Tag {
        self.trackers[0].unique_tag()
    }

    fn is_entity_enabled(&self, tag: Tag, level: log::Level) -> bool {
        self.trackers
            .iter()
            .any(|t| t.is_entity_enabled(tag, level))
    }

    fn add_entity(&self, tag: Tag, entity_name: &str) {
        for tracker in &self.trackers {
            tracker.add_entity(tag, entity_name);
        }
    }

    fn enter(&self, enter_into: Tag, enter_obj: Tag) {
        for tracker in &self.trackers {
            if tracker.is_entity_enabled(enter_into, log::Level::Trace) {
                tracker.enter(enter_into, enter_obj);
            }
        }
    }

    fn exit(&self, exit_from: Tag, exit_obj: Tag) {
        for tracker in &self.trackers {
            if tracker.is_entity_enabled(exit_from, log::Level::Trace) {
                tracker.exit(exit_from, exit_obj);
            }
        }
    }

    fn create(&self, created_by: Tag, created_obj: Tag, num_bytes: usize, name: &str) {
        for tracker in &self.trackers {
            if tracker.is_entity_enabled(created_by, log::Level::Trace) {
                tracker.create(created_by, created_obj, num_bytes, name);
            }
        }
    }

    fn destroy(&self, destroyed_by: Tag, destroyed_obj: Tag) {
        for tracker in &self.trackers {
            if tracker.is_entity_enabled(destroyed_by, log::Level::Trace) {
                tracker.destroy(destroyed_by, destroyed_obj);
            }
        }
    }

    fn log(&self, msg_by: Tag, level: log::Level, msg: std::fmt::Arguments) {
        for tracker in &self.trackers {
            if tracker.is_entity_enabled(msg_by, level) {
                tracker.log(msg_by, level, msg);
            }
        }
    }

    fn time(&self, set_by: Tag, time_ns: f64) {
        for tracker in &self.trackers {
            tracker.time(set_by, time_ns);
        }
    }

    fn shutdown(&self) {
        for tracker in &self.trackers {
            tracker.shutdown();
        }
    }
}
