//! Bounded FIFO of idle connections for one address.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of handing a connection back to its queue.
#[derive(Debug)]
pub enum Push<C> {
    Queued,
    /// Queue full or closed; the caller must close the connection.
    Rejected(C),
}

#[derive(Debug)]
struct Inner<C> {
    idle: VecDeque<C>,
    closed: bool,
}

/// Idle connections for a single address.
///
/// All operations take the queue's own lock briefly, so a connection popped
/// here is owned by exactly one caller.
#[derive(Debug)]
pub struct IdleQueue<C> {
    inner: Mutex<Inner<C>>,
    capacity: usize,
}

impl<C> IdleQueue<C> {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                idle: VecDeque::with_capacity(capacity),
                closed: false,
            }),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner<C>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the oldest idle connection, `None` when empty or closed.
    pub fn pop(&self) -> Option<C> {
        let mut inner = self.lock();
        if inner.closed {
            return None;
        }
        inner.idle.pop_front()
    }

    /// Queue a connection if there is room and the queue is open.
    pub fn push(&self, conn: C) -> Push<C> {
        let mut inner = self.lock();
        if inner.closed || inner.idle.len() >= self.capacity {
            return Push::Rejected(conn);
        }
        inner.idle.push_back(conn);
        Push::Queued
    }

    /// Close the queue and hand back everything still idle.
    pub fn close(&self) -> Vec<C> {
        let mut inner = self.lock();
        inner.closed = true;
        inner.idle.drain(..).collect()
    }

    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    pub fn len(&self) -> usize {
        self.lock().idle.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
