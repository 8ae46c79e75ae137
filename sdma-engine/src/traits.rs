// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! A set of common traits used across the SDMA Engine.

use std::fmt::{Debug, Display};
use std::future::Future;
use std::pin::Pin;

use sdma_track::tag::Tagged;

/// A super-trait that objects that are passed around the simulation have to
/// implement
///
///  - Clone:       It would be nice to use `Copy` instead, but given that
///    things like `Vec` are not `Copy` we have to use `Clone` instead to
///    allow the application to keep copies of objects sent around.
///  - Debug:       In order to print "{:?}" objects have to at least
///    implement Debug. We could require Display, but that requires explicit
///    implementation.
///  - Tagged:      Allows for simple logging.
///  - 'static:     Due to the way that futures are implemented, the
///    lifetimes need to be `static. This means that objects may have to be
///    placed in `Box` to make them static.
pub trait SimObject: Clone + Debug + Display + Tagged + 'static {}

// Implementations for basic types that can be sent around the simulation for
// testing

impl SimObject for i32 {}

impl SimObject for usize {}

/// The `Event` trait defines an object that can be used as an Event
///
/// This is a trait that defines the `listen` function that returns a future
/// so that it can be used in `async` code.
pub trait Event<T> {
    /// Return a future that completes when the event is next notified.
    #[must_use = "Futures do nothing unless you `.await` or otherwise use them"]
    fn listen(&self) -> BoxFuture<'static, T>;

    /// Allow cloning of Boxed events.
    fn clone_dyn(&self) -> Box<dyn Event<T>>;
}

/// Provide Clone implementation for boxed Event
impl<T> Clone for Box<dyn Event<T>> {
    fn clone(self: &Box<dyn Event<T>>) -> Box<dyn Event<T>> {
        self.clone_dyn()
    }
}

/// An owned dynamically typed future, as used by [`Event::listen`].
pub type BoxFuture<'a, T> = Pin<std::boxed::Box<dyn Future<Output = T> + 'a>>;
