// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Define the [`Track`] trait and a number of [`Tracker`]s.

/// Include the /dev/null tracker.
pub mod dev_null;
/// Include the text-based tracker.
pub mod text;

/// Include the multi-tracker.
pub mod multi_tracker;

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

pub use dev_null::DevNullTracker;
pub use multi_tracker::MultiTracker;
use regex::Regex;
pub use text::TextTracker;

use crate::{ROOT, Tag};

/// Error used to return configuration errors
#[derive(Debug)]
pub struct TrackConfigError(pub String);

impl std::fmt::Display for TrackConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Track configuration error: {}", self.0)
    }
}

impl std::error::Error for TrackConfigError {}

/// This is the interface that is supported by all [`Tracker`]s.
pub trait Track {
    /// Allocate a new global tag
    fn unique_tag(&self) -> Tag;

    /// Determine whether tracking is enabled, and at what level, for the
    /// entity with the given tag.
    fn is_entity_enabled(&self, tag: Tag, level: log::Level) -> bool;

    /// Record an entity being created.
    fn add_entity(&self, tag: Tag, entity_name: &str);

    /// Track when an object with the given tag arrives.
    fn enter(&self, enter_into: Tag, enter_obj: Tag);

    /// Track when an object with the given tag leaves.
    fn exit(&self, exit_from: Tag, exit_obj: Tag);

    /// Track when an object with the given tag is created.
    fn create(&self, created_by: Tag, created_obj: Tag, num_bytes: usize, name: &str);

    /// Track when an object with the given tag is destroyed.
    fn destroy(&self, destroyed_by: Tag, destroyed_obj: Tag);

    /// Track a log message of the given level.
    fn log(&self, msg_by: Tag, level: log::Level, msg: std::fmt::Arguments);

    /// Advance the time to the time specified in `ns`.
    fn time(&self, set_by: Tag, time_ns: f64);

    /// Perform any pre-exit shutdown/cleanup
    fn shutdown(&self);
}

/// The type of a [`Tracker`] that is shared across entities.
pub type Tracker = Arc<dyn Track + Send + Sync>;

/// Create a [`Tracker`] that prints all track events to `stdout`.
#[must_use]
pub fn stdout_tracker(level: log::Level) -> Tracker {
    let entity_manager = EntityManager::new(level);
    let stdout_writer = Box::new(io::BufWriter::new(io::stdout()));
    let tracker: Tracker = Arc::new(TextTracker::new(entity_manager, stdout_writer));
    tracker
}

/// Create a [`Tracker`] that suppresses all track events.
#[must_use]
pub fn dev_null_tracker() -> Tracker {
    let tracker: Tracker = Arc::new(DevNullTracker::default());
    tracker
}

/// The [`EntityManager`] is responsible for determining entity log / trace
/// enable states.
///
/// This manager is also used to allocate unique [`Tag`] values.
pub struct EntityManager {
    /// Level of _log_ events to output when no filter matches.
    default_log_level: log::Level,

    /// List of regular expressions mapping entity names to log levels.
    regex_to_log_level: Vec<(Regex, log::Level)>,

    /// Names of the registered entities, indexed by tag.
    entities: Mutex<HashMap<Tag, String>>,

    /// Used to assign unique tags.
    unique_tag: AtomicU64,
}

impl EntityManager {
    /// Constructor with the default [`log::Level`]
    #[must_use]
    pub fn new(default_log_level: log::Level) -> Self {
        Self {
            default_log_level,
            regex_to_log_level: Vec::new(),
            entities: Mutex::new(HashMap::new()),
            unique_tag: AtomicU64::new(ROOT.0 + 1),
        }
    }

    pub(crate) fn unique_tag(&self) -> Tag {
        let tag = self.unique_tag.fetch_add(1, Ordering::SeqCst);
        Tag(tag)
    }

    pub(crate) fn add_entity(&self, tag: Tag, entity_name: &str) {
        self.entities
            .lock()
            .unwrap()
            .insert(tag, String::from(entity_name));
    }

    pub(crate) fn is_enabled(&self, tag: Tag, level: log::Level) -> bool {
        level <= self.level_for_tag(tag)
    }

    fn level_for_tag(&self, tag: Tag) -> log::Level {
        let entities = self.entities.lock().unwrap();
        match entities.get(&tag) {
            Some(name) => self.log_level_for(name),
            None => self.default_log_level,
        }
    }

    fn log_level_for(&self, entity_name: &str) -> log::Level {
        for (regex, level) in &self.regex_to_log_level {
            if regex.is_match(entity_name) {
                return *level;
            }
        }
        self.default_log_level
    }

    /// Add a log filter regular expression.
    ///
    /// Entities whose full name matches the expression will log at the given
    /// level instead of the default.
    ///
    /// # Example
    ///
    /// ```rust
    /// use sdma_track::tracker::EntityManager;
    /// let mut manager = EntityManager::new(log::Level::Warn);
    /// manager.add_log_filter(".*node.*", log::Level::Trace).unwrap();
    /// ```
    pub fn add_log_filter(
        &mut self,
        regex_str: &str,
        level: log::Level,
    ) -> Result<(), TrackConfigError> {
        match Regex::new(regex_str) {
            Ok(regex) => {
                self.regex_to_log_level.push((regex, level));
                Ok(())
            }
            Err(e) => Err(TrackConfigError(format!(
                "failed to parse regex {regex_str}: {e}"
            ))),
        }
    }
}
