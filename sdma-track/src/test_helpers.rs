// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! This module provides helper functions for testing logging output
//!
//! The aim of this module is to provide commonly-used functions that enable
//! the testing of the output that should appear from logging macros.

use core::sync::atomic::Ordering;
use std::sync::Mutex;
use std::sync::atomic::AtomicU64;

use regex::Regex;

use crate::{Tag, Track, Tracker, tracker};

/// A tracker that keeps track events.
pub struct TestTracker {
    events: Mutex<Vec<String>>,

    unique_tag: AtomicU64,
}

impl TestTracker {
    /// Create a new [`Tracker`](crate::Tracker) for the tests.
    ///
    /// This keeps the track events in memory for checking later.
    #[must_use]
    pub fn new(initial_tag: u64) -> Self {
        Self {
            events: Mutex::new(Vec::new()),
            unique_tag: AtomicU64::new(initial_tag),
        }
    }

    fn add_event(&self, event: String) {
        println!("{event}");
        let mut events = self.events.lock().unwrap();
        events.push(event);
    }
}

impl Track for TestTracker {
    fn unique_tag(&self) -> Tag {
        let tag = self.unique_tag.fetch_add(1, Ordering::SeqCst);
        Tag(tag)
    }

    fn is_entity_enabled(&self, _tag: Tag, _level: log::Level) -> bool {
        true
    }

    fn add_entity(&self, _tag: Tag, _entity_name: &str) {
        // Do nothing
    }

    fn enter(&self, enter_into: Tag, enter_obj: Tag) {
        self.add_event(format!("{enter_into}: {enter_obj} entered"));
    }

    fn exit(&self, exit_from: Tag, exit_obj: Tag) {
        self.add_event(format!("{exit_from}: {exit_obj} exited"));
    }

    fn create(&self, created_by: Tag, created_obj: Tag, num_bytes: usize, name: &str) {
        self.add_event(format!(
            "{created_by}: created {created_obj}, {name}, {num_bytes} bytes"
        ));
    }

    fn destroy(&self, destroyed_by: Tag, destroyed_obj: Tag) {
        self.add_event(format!("{destroyed_by}: destroyed {destroyed_obj}"));
    }

    fn log(&self, msg_by: Tag, level: log::Level, msg: std::fmt::Arguments) {
        self.add_event(format!("{msg_by}:{level}: {msg}"));
    }

    fn time(&self, set_by: Tag, time_ns: f64) {
        self.add_event(format!("{set_by}: set time {time_ns:.1}ns"));
    }

    fn shutdown(&self) {
        // Do nothing
    }
}

/// Create a [`TestTracker`] for a test along with its [`Tracker`] handle
///
/// # Arguments
///
/// * `start_tag` - The tag value to be set as the starting value
///
/// # Examples
///
/// ```
/// use sdma_track::test_helpers;
///
/// # /* Need to comment this out so that it is actually built/tested
/// #[test]
/// # */
/// fn smoke() {
///     let (test_tracker, tracker) = sdma_track::test_init!(10);
///     let top = sdma_track::entity::toplevel(&tracker, "top");
///     test_helpers::check_and_clear(&test_tracker, &["0: created 10, top, 0 bytes"]);
/// }
/// ```
#[macro_export]
macro_rules! test_init {
    ($start_tag:expr) => {{
        let test_tracker = std::sync::Arc::new($crate::test_helpers::TestTracker::new($start_tag));
        let tracker: $crate::Tracker = test_tracker.clone();
        (test_tracker, tracker)
    }};
}

/// Create a quiet [`Tracker`] suitable for tests of other crates.
///
/// The level can be raised for debugging a test run by setting the
/// `SDMA_TEST_LOG` environment variable to a [`log::Level`] name.
#[must_use]
pub fn create_tracker(_full_filepath: &str) -> Tracker {
    let level = match std::env::var("SDMA_TEST_LOG") {
        Ok(lvl) => lvl.parse().unwrap_or(log::Level::Warn),
        Err(_) => log::Level::Warn,
    };
    tracker::stdout_tracker(level)
}

/// Check and clear the _trace_ and _log_ output
///
/// This function asserts that the logging output lines seen since the start
/// or the last time this function was called are expected. The
/// [test_init](crate::test_init) must have been called before this function
/// can be used.
///
/// It then also clears both the _trace_ and _log_ output recorded so far.
///
/// # Arguments
///
/// * `tracker`  - A reference to the [`TestTracker`] being used in the test.
///   This will have been keeping track of the trace and log events seen
///   since it was created or last cleared.
/// * `expected` - An array of expected regular expressions that the logging
///   output will be matched against.
pub fn check_and_clear(tracker: &TestTracker, expected: &[&str]) {
    let mut log_contents_ref = tracker.events.lock().unwrap();

    println!("Checking {:?} matches {:?}", expected, *log_contents_ref);

    // Check that there are the same number of strings produced as expected
    let num_strings = expected.len();
    assert_eq!(num_strings, log_contents_ref.len());

    for i in 0..num_strings {
        let log_expect = expected[i];
        let re = Regex::new(log_expect).unwrap();
        let actual = &(*log_contents_ref[i]);
        println!("Checking {i}: {log_expect:?} matches {actual:?}");
        assert!(re.is_match(actual));
    }

    log_contents_ref.clear();
}
