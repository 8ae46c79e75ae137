// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Single-slot rendezvous ports.
//!
//! An [`OutPort`] is connected to the [`PortState`] of exactly one
//! [`InPort`]. The slot between them holds at most one value: a
//! [`put`](OutPort::put) parks the sender until the receiver has consumed
//! the value, and a [`get`](InPort::get) parks the receiver until a value
//! arrives. This gives components a wire-like discipline where exactly one
//! value crosses a connection per exchange and two components never alias
//! the same value mutably.

use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::sync::Arc;
use std::task::{Context, Poll, Waker};

use sdma_track::entity::Entity;

use crate::traits::SimObject;
use crate::types::SimResult;

pub struct PortState<T>
where
    T: SimObject,
{
    value: RefCell<Option<T>>,
    waiting_get: RefCell<Option<Waker>>,
    waiting_put: RefCell<Option<Waker>>,
}

impl<T> PortState<T>
where
    T: SimObject,
{
    pub fn new() -> Self {
        Self {
            value: RefCell::new(None),
            waiting_get: RefCell::new(None),
            waiting_put: RefCell::new(None),
        }
    }
}

impl<T> Default for PortState<T>
where
    T: SimObject,
{
    fn default() -> Self {
        Self::new()
    }
}

pub struct InPort<T>
where
    T: SimObject,
{
    pub entity: Arc<Entity>,
    state: Rc<PortState<T>>,
}

impl<T> fmt::Display for InPort<T>
where
    T: SimObject,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.entity, f)
    }
}

impl<T> InPort<T>
where
    T: SimObject,
{
    pub fn new(entity: Arc<Entity>) -> Self {
        Self {
            entity,
            state: Rc::new(PortState::new()),
        }
    }

    pub fn state(&self) -> Rc<PortState<T>> {
        self.state.clone()
    }

    pub fn get(&self) -> PortGet<T> {
        PortGet {
            state: self.state.clone(),
        }
    }
}

pub struct OutPort<T>
where
    T: SimObject,
{
    entity: Arc<Entity>,
    name: String,
    state: Option<Rc<PortState<T>>>,
}

impl<T> fmt::Display for OutPort<T>
where
    T: SimObject,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.entity, f)
    }
}

impl<T> OutPort<T>
where
    T: SimObject,
{
    pub fn new(entity: Arc<Entity>, name: &str) -> Self {
        Self {
            entity,
            name: name.to_owned(),
            state: None,
        }
    }

    pub fn connect(&mut self, port_state: Rc<PortState<T>>) {
        match self.state {
            Some(_) => panic!("{}: {} already connected", self.entity, self.name),
            None => {
                self.state = Some(port_state);
            }
        }
    }

    pub fn put(&self, value: T) -> PortPut<T> {
        let state = self
            .state
            .as_ref()
            .unwrap_or_else(|| panic!("{}: {} not connected", self.entity, self.name))
            .clone();
        PortPut {
            state,
            value: RefCell::new(Some(value)),
        }
    }
}

pub struct PortPut<T>
where
    T: SimObject,
{
    state: Rc<PortState<T>>,
    value: RefCell<Option<T>>,
}

impl<T> Future for PortPut<T>
where
    T: SimObject,
{
    type Output = SimResult;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if self.state.value.borrow().is_none() {
            match self.value.take() {
                Some(value) => {
                    // Space in port buffer, send the value and wake the
                    // receiver
                    *self.state.value.borrow_mut() = Some(value);
                    if let Some(waker) = self.state.waiting_get.borrow_mut().take() {
                        waker.wake();
                    }
                    *self.state.waiting_put.borrow_mut() = Some(cx.waker().clone());
                    Poll::Pending
                }
                None => {
                    // Value already sent, woken because it has been consumed
                    Poll::Ready(Ok(()))
                }
            }
        } else {
            // Port already full - wait for it to be consumed
            *self.state.waiting_put.borrow_mut() = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}

pub struct PortGet<T>
where
    T: SimObject,
{
    state: Rc<PortState<T>>,
}

impl<T> Future for PortGet<T>
where
    T: SimObject,
{
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let value = self.state.value.borrow_mut().take();
        if let Some(value) = value {
            if let Some(waker) = self.state.waiting_put.borrow_mut().take() {
                waker.wake();
            }
            Poll::Ready(value)
        } else {
            if let Some(waker) = self.state.waiting_put.borrow_mut().take() {
                waker.wake();
            }

            *self.state.waiting_get.borrow_mut() = Some(cx.waker().clone());
            Poll::Pending
        }
    }
}
