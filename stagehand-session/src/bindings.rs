//! The declarative input-binding table.
//!
//! The engine announces player input as `input <token> …` lines. What to
//! do in response is data, not code: each bound token maps to an ordered
//! list of [`DispatchStep`]s whose arguments are resolved against the
//! binding's adjacency context by a small fixed interpreter. The table is
//! built once from the `adjacent` facts of the initial state, alongside
//! the declaration dispatches that make the engine show the exit
//! affordances in the first place.

use std::collections::HashMap;

use tracing::debug;

use stagehand_core::command::ArgValue;
use stagehand_core::types::{Predicate, SpotName};
use stagehand_core::world::WorldModel;
use stagehand_wire::transport::LineWriter;
use stagehand_wire::Dispatcher;

use crate::error::Result;

// ---------------------------------------------------------------------------
// Steps & Bindings
// ---------------------------------------------------------------------------

/// An argument slot of a dispatch step, resolved at execution time.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgBinding {
    /// A fixed value.
    Literal(ArgValue),
    /// The spot the player exits from.
    FromSpot,
    /// The spot the player re-enters at.
    ToSpot,
    /// The player entity.
    Player,
}

/// One action dispatch in a binding's response.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchStep {
    /// Catalog action name.
    pub action: String,
    /// Argument slots.
    pub args: Vec<ArgBinding>,
    /// Whether to wait for the engine's acknowledgment.
    pub wait: bool,
}

/// The adjacency a binding was built from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdjacencyContext {
    /// Exit spot (`room.spot`).
    pub from: String,
    /// Entry spot on the other side.
    pub to: String,
    /// The player entity name.
    pub player: String,
}

impl DispatchStep {
    fn resolve(&self, context: &AdjacencyContext) -> Vec<ArgValue> {
        self.args
            .iter()
            .map(|binding| match binding {
                ArgBinding::Literal(value) => value.clone(),
                ArgBinding::FromSpot => ArgValue::str(context.from.clone()),
                ArgBinding::ToSpot => ArgValue::str(context.to.clone()),
                ArgBinding::Player => ArgValue::str(context.player.clone()),
            })
            .collect()
    }
}

/// A resolved dispatch, ready to issue (used for the setup declarations).
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedDispatch {
    /// Catalog action name.
    pub action: String,
    /// Resolved arguments.
    pub args: Vec<ArgValue>,
    /// Whether to wait for the engine's acknowledgment.
    pub wait: bool,
}

struct Binding {
    context: AdjacencyContext,
    steps: Vec<DispatchStep>,
}

// ---------------------------------------------------------------------------
// Table
// ---------------------------------------------------------------------------

/// Input-token to response mapping, interpreted by [`BindingTable::respond`].
#[derive(Default)]
pub struct BindingTable {
    bindings: HashMap<String, Binding>,
}

impl BindingTable {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the exit bindings for every `adjacent(from, to)` fact whose
    /// `from` side parses as a `room.spot` name.
    ///
    /// Returns the declaration dispatches (the engine-side exit
    /// affordances to create during setup) and the populated table. Exit
    /// spots whose name marks a world endpoint (`end` in the spot part)
    /// get an affordance but an empty response: walking off the edge of
    /// the scenario leads nowhere.
    #[must_use]
    pub fn from_adjacency(
        world: &WorldModel,
        player: &str,
        wait: bool,
    ) -> (Vec<PlannedDispatch>, Self) {
        let mut declarations = Vec::new();
        let mut table = Self::new();

        for relation in world.relations() {
            if relation.predicate != Predicate::Adjacent || !relation.value.is_true() {
                continue;
            }
            let [from, to] = relation.entities.as_slice() else {
                continue;
            };
            let Some(from_spot) = SpotName::parse(from) else {
                continue;
            };

            let context = AdjacencyContext {
                from: from.clone(),
                to: to.clone(),
                player: player.to_string(),
            };

            declarations.push(PlannedDispatch {
                action: "EnableIcon".to_string(),
                args: vec![
                    ArgValue::str("exit"),
                    ArgValue::str(from.clone()),
                    ArgValue::str("Exit"),
                ],
                wait,
            });

            let steps = if from_spot.spot.to_ascii_lowercase().contains("end") {
                Vec::new()
            } else {
                vec![
                    DispatchStep {
                        action: "WalkTo".to_string(),
                        args: vec![ArgBinding::Player, ArgBinding::FromSpot],
                        wait,
                    },
                    DispatchStep {
                        action: "SetPosition".to_string(),
                        args: vec![ArgBinding::Player, ArgBinding::ToSpot],
                        wait,
                    },
                    DispatchStep {
                        action: "SetCameraFocus".to_string(),
                        args: vec![ArgBinding::Player],
                        wait,
                    },
                ]
            };

            table.bind(format!("input Exit {from}"), context, steps);
        }

        (declarations, table)
    }

    /// Bind a token. A later binding for the same token replaces the
    /// earlier one.
    pub fn bind(&mut self, token: String, context: AdjacencyContext, steps: Vec<DispatchStep>) {
        self.bindings.insert(token, Binding { context, steps });
    }

    /// Whether a token is bound.
    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.bindings.contains_key(token)
    }

    /// Number of bound tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Execute the response bound to `token`, in order. Returns `false`
    /// when the token is unbound (the caller logs and moves on).
    ///
    /// # Errors
    /// Dispatch errors from the wire path.
    pub fn respond<W: LineWriter>(
        &self,
        token: &str,
        dispatcher: &mut Dispatcher<W>,
    ) -> Result<bool> {
        let Some(binding) = self.bindings.get(token) else {
            return Ok(false);
        };
        debug!(token, steps = binding.steps.len(), "input binding matched");
        for step in &binding.steps {
            let args = step.resolve(&binding.context);
            dispatcher.dispatch(&step.action, &args, step.wait)?;
        }
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
