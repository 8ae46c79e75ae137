// Copyright (c) 2026 Graphcore Ltd. All rights reserved.

//! Library functions to build trackers as defined by the user.

use std::fs;
use std::io::{self, BufWriter};
use std::sync::Arc;

use crate::tracker::{EntityManager, MultiTracker, TextTracker, TrackConfigError, dev_null_tracker};
use crate::{Tracker, Writer};

/// Configuration options for an individual tracker.
pub struct TrackerConfig<'a> {
    /// Enable this tracker.
    pub enable: bool,

    /// Set the level at which this tracker should be enabled.
    pub level: log::Level,

    /// A regular expression to match which entities should have this level
    /// applied.
    pub filter_regex: &'a str,

    /// If required, the name of the file to which the tracker will write.
    pub file: Option<&'a str>,
}

impl Default for TrackerConfig<'_> {
    fn default() -> Self {
        Self {
            enable: true,
            level: log::Level::Warn,
            filter_regex: "",
            file: None,
        }
    }
}

/// Configuration options for all tracking.
pub struct TrackersConfig<'a> {
    /// Configuration for stdout.
    pub stdout: TrackerConfig<'a>,

    /// Configuration for a text log file.
    pub file: TrackerConfig<'a>,
}

/// Build the [`EntityManager`] for a tracker configuration.
///
/// The user can pass a filter regular expression which will set the level
/// only for matching entities and set all other entities to only emit
/// errors.
fn build_entity_manager(config: &TrackerConfig) -> Result<EntityManager, TrackConfigError> {
    let default_level = if config.filter_regex.is_empty() {
        config.level
    } else {
        log::Level::Error
    };

    let mut entity_manager = EntityManager::new(default_level);
    if !config.filter_regex.is_empty() {
        entity_manager.add_log_filter(config.filter_regex, config.level)?;
    }
    Ok(entity_manager)
}

/// Create a tracker that prints to stdout.
fn build_stdout_tracker(config: &TrackerConfig) -> Result<Tracker, TrackConfigError> {
    let entity_manager = build_entity_manager(config)?;
    let stdout_writer = Box::new(BufWriter::new(io::stdout()));
    Ok(Arc::new(TextTracker::new(entity_manager, stdout_writer)))
}

/// Same as the stdout tracker (see [`build_stdout_tracker`]) except it
/// writes to the configured file.
fn build_file_tracker(config: &TrackerConfig) -> Result<Tracker, TrackConfigError> {
    let entity_manager = build_entity_manager(config)?;
    let filename = config
        .file
        .ok_or_else(|| TrackConfigError("file tracker enabled without a filename".to_string()))?;
    let file = fs::File::create(filename)
        .map_err(|e| TrackConfigError(format!("failed to create {filename}: {e}")))?;
    let file_writer: Writer = Box::new(BufWriter::new(file));
    Ok(Arc::new(TextTracker::new(entity_manager, file_writer)))
}

/// Create the [`Tracker`] requested by the user configuration.
///
/// With no outputs enabled all track events are suppressed. With more than
/// one output enabled the events are forwarded to each of them.
pub fn setup_trackers(config: &TrackersConfig) -> Result<Tracker, TrackConfigError> {
    let mut trackers: Vec<Tracker> = Vec::new();

    if config.stdout.enable {
        trackers.push(build_stdout_tracker(&config.stdout)?);
    }
    if config.file.enable {
        trackers.push(build_file_tracker(&config.file)?);
    }

    match trackers.len() {
        0 => Ok(dev_null_tracker()),
        1 => Ok(trackers.pop().unwrap()),
        _ => Ok(Arc::new(MultiTracker::new(trackers))),
    }
}
