//! Fire-and-forget delivery: a worker thread drains the notification
//! queue so the protocol path never blocks on the network. Failed sends
//! are logged and dropped, not retried; the platform contract is
//! best-effort.

use std::thread::{self, JoinHandle};

use tracing::{debug, warn};

use stagehand_wire::MessageQueue;

use crate::client::PlatformClient;
use crate::error::Result;

/// One outbound platform notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// A free-text message.
    Message(String),
    /// An error report with a type tag.
    Error {
        /// Error description.
        text: String,
        /// Error category tag.
        error_type: String,
    },
}

/// Owns the platform client and the worker thread delivering to it.
pub struct Outbox {
    queue: MessageQueue<Notification>,
    worker: Option<JoinHandle<()>>,
}

impl Outbox {
    /// Start the outbox worker around an owned client.
    ///
    /// # Errors
    /// [`crate::PlatformError::Io`] when the OS refuses the thread.
    pub fn start(client: PlatformClient) -> Result<Self> {
        let queue: MessageQueue<Notification> = MessageQueue::new();
        let drain = queue.clone();
        let worker = thread::Builder::new()
            .name("stagehand-platform".to_string())
            .spawn(move || {
                while let Ok(notification) = drain.pop() {
                    let outcome = match &notification {
                        Notification::Message(text) => client.send_message(text),
                        Notification::Error { text, error_type } => {
                            client.send_error_message(text, error_type)
                        }
                    };
                    match outcome {
                        Ok(()) => debug!(?notification, "notification delivered"),
                        Err(err) => warn!(%err, ?notification, "notification dropped"),
                    }
                }
            })?;
        Ok(Self {
            queue,
            worker: Some(worker),
        })
    }

    /// Enqueue a message. Never blocks, never fails.
    pub fn send(&self, text: impl Into<String>) {
        self.queue.push(Notification::Message(text.into()));
    }

    /// Enqueue an error report. Never blocks, never fails.
    pub fn send_error(&self, text: impl Into<String>, error_type: impl Into<String>) {
        self.queue.push(Notification::Error {
            text: text.into(),
            error_type: error_type.into(),
        });
    }

    /// Drain what is queued and stop the worker.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.queue.close();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                warn!("platform worker panicked");
            }
        }
    }
}

impl Drop for Outbox {
    fn drop(&mut self) {
        self.stop();
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
