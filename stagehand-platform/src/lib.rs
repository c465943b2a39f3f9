//! # stagehand-platform
//!
//! Best-effort outbound messaging to the remote evaluation platform.
//!
//! The platform is an optional collaborator: when it is unreachable the
//! session runs exactly as before, and no call here ever blocks the
//! protocol path. [`client::PlatformClient`] probes the platform once at
//! construction and latches the result; [`outbox::Outbox`] moves the
//! actual HTTP requests onto a worker thread so senders only enqueue.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod error;
pub mod outbox;

pub use client::PlatformClient;
pub use error::PlatformError;
pub use outbox::{Notification, Outbox};
