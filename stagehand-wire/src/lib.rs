//! # stagehand-wire
//!
//! The engine-facing half of the stagehand bridge: line transports, the
//! single-reader inbound router that fans engine lines out to three
//! independent channels (acks, input events, location events), and the
//! dispatcher that encodes actions and correlates acknowledgments.
//!
//! ## Data flow
//!
//! ```text
//!  caller ──▶ Dispatcher ──▶ LineWriter ──▶ engine
//!  engine ──▶ LineReader ──▶ InboundRouter ──┬──▶ acks      ──▶ Dispatcher wait loop
//!                                            ├──▶ inputs    ──▶ input handler
//!                                            └──▶ locations ──▶ reconciler
//! ```
//!
//! Each channel preserves the order lines were observed on the transport;
//! interleaving between channels is unconstrained.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod classify;
pub mod dispatch;
pub mod error;
pub mod queue;
pub mod router;
pub mod transport;

pub use classify::{classify, Channel};
pub use dispatch::{correlate, AckResult, Dispatcher};
pub use error::{Result, WireError};
pub use queue::MessageQueue;
pub use router::{InboundRouter, RouterChannels};
pub use transport::{loopback, LineReader, LineWriter, LoopbackPeer, ProcessTransport, ReadHalf, WriteHalf};
