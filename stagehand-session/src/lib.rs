//! # stagehand-session
//!
//! The layer that ties the stagehand crates into a running session:
//!
//! - `logging` — timestamped log-file bootstrap;
//! - `resources` — the static JSON resources (places, casting, items);
//! - `env` — replays the initial planning state into the engine and
//!   integrates room components into the world model;
//! - `bindings` — the declarative input-token to dispatch-steps table;
//! - `controller` — menu flow, the main input/location loop, and the GUI
//!   snapshot feed.
//!
//! The session owns every collaborator it uses (dispatcher, router
//! channels, world handle, platform outbox); nothing here is process-wide.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod bindings;
pub mod controller;
pub mod env;
pub mod error;
pub mod logging;
pub mod resources;

pub use bindings::{ArgBinding, BindingTable, DispatchStep, PlannedDispatch};
pub use controller::{launch, Session, SessionController};
pub use env::{find_player, EnvironmentBuilder, EnvironmentResources};
pub use error::{Result, SessionError};
