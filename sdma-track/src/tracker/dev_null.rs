// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

use std::sync::atomic::{AtomicU64, Ordering};

use crate::tracker::Track;
use crate::{ROOT, Tag};

/// A tracker that does nothing.
///
/// This can be useful for benchmarks that want to have minimum overheads.
#[derive(Default)]
pub struct DevNullTracker {
    unique_tag: AtomicU64,
}

impl Track for DevNullTracker {
    fn unique_tag(&self) -> Tag {
        let tag = self.unique_tag.fetch_add(1, Ordering::SeqCst);
        Tag(ROOT.0 + 1 + tag)
    }

    fn is_entity_enabled(&self, _tag: Tag, _level: log::Level) -> bool {
        false
    }
    fn add_entity(&self, _tag: Tag, _entity_name: &str) {}
    fn enter(&self, _enter_into: Tag, _enter_obj: Tag) {}
    fn exit(&self, _exit_from: Tag, _exit_obj: Tag) {}
    fn create(&self, _created_by: Tag, _created_obj: Tag, _num_bytes: usize, _name: &str) {}
    fn destroy(&self, _destroyed_by: Tag, _destroyed_obj: Tag) {}
    fn log(&self, _msg_by: Tag, _level: log::Level, _msg: std::fmt::Arguments) {}
    fn time(&self, _set_by: Tag, _time_ns: f64) {}
    fn shutdown(&self) {}
}
