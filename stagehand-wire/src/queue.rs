//! Thread-safe FIFO channels for routed engine messages.
//!
//! One [`MessageQueue`] backs each logical channel (acks, inputs,
//! locations) plus the GUI snapshot feed. Cloned handles share the same
//! underlying queue. The router pushes, consumers pop: blocking for the
//! ack waiter, non-blocking polls for the event handlers. `close` is the
//! terminal signal; consumers drain what was already queued, then see
//! [`WireError::ChannelClosed`].

use parking_lot::{Condvar, Mutex};
use std::collections::VecDeque;
use std::sync::Arc;

use crate::error::{Result, WireError};

struct State<T> {
    items: VecDeque<T>,
    closed: bool,
}

struct Inner<T> {
    state: Mutex<State<T>>,
    available: Condvar,
}

/// An unbounded FIFO queue with blocking and non-blocking consumers.
pub struct MessageQueue<T> {
    inner: Arc<Inner<T>>,
}

impl<T> Clone for MessageQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for MessageQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MessageQueue<T> {
    /// Create an empty, open queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                state: Mutex::new(State {
                    items: VecDeque::new(),
                    closed: false,
                }),
                available: Condvar::new(),
            }),
        }
    }

    /// Append an item. Returns `false` (dropping the item) when the queue
    /// is closed.
    pub fn push(&self, item: T) -> bool {
        let mut state = self.inner.state.lock();
        if state.closed {
            return false;
        }
        state.items.push_back(item);
        self.inner.available.notify_one();
        true
    }

    /// Block until an item is available and remove it.
    ///
    /// # Errors
    /// [`WireError::ChannelClosed`] once the queue is closed and drained.
    pub fn pop(&self) -> Result<T> {
        let mut state = self.inner.state.lock();
        loop {
            if let Some(item) = state.items.pop_front() {
                return Ok(item);
            }
            if state.closed {
                return Err(WireError::ChannelClosed);
            }
            self.inner.available.wait(&mut state);
        }
    }

    /// Remove the front item if one is queued. An empty open queue is
    /// `Ok(None)`: a no-op for the caller, not an error.
    ///
    /// # Errors
    /// [`WireError::ChannelClosed`] once the queue is closed and drained.
    pub fn try_pop(&self) -> Result<Option<T>> {
        let mut state = self.inner.state.lock();
        match state.items.pop_front() {
            Some(item) => Ok(Some(item)),
            None if state.closed => Err(WireError::ChannelClosed),
            None => Ok(None),
        }
    }

    /// Close the queue and wake every blocked consumer. Already-queued
    /// items remain consumable.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        self.inner.available.notify_all();
    }

    /// Whether `close` has been called.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }

    /// Current queue depth.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.lock().items.len()
    }

    /// Whether the queue is currently empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.state.lock().items.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
