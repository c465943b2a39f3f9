//! # stagehand-core
//!
//! Engine-agnostic half of the stagehand bridge: the typed planning
//! vocabulary (entities, predicates, relations), the per-session
//! [`world::WorldModel`], the reconciliation algorithm that keeps the model
//! in step with engine location events, the read-only [`catalog::ActionCatalog`],
//! and the pure command formatter.
//!
//! Nothing in this crate performs I/O on the engine channel; the wire
//! protocol lives in `stagehand-wire` and consumes these types.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod command;
pub mod config;
pub mod error;
pub mod reconcile;
pub mod types;
pub mod world;

pub use catalog::ActionCatalog;
pub use command::{ArgValue, Command, format_command};
pub use config::StagehandConfig;
pub use error::{Result, StagehandError};
pub use reconcile::{LocationEvent, Transition};
pub use types::{Entity, EntityKind, Predicate, Relation, RelationValue, SpotName};
pub use world::{InitialState, RelationChange, SharedWorld, WorldModel, WorldSnapshot};
