//! The action catalog: the static table of engine actions.
//!
//! Loaded once from a JSON resource of the shape
//! `[{ "name": …, "param": [{ "name": …, "type": …, "default": … }] }]`
//! and read-only thereafter. A parameter whose `default` is the literal
//! `REQUIRED` must be supplied by every caller; parameter order is
//! significant and fixed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

use crate::error::{Result, StagehandError};

// ---------------------------------------------------------------------------
// Parameter Specs
// ---------------------------------------------------------------------------

/// The wire type of an action parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParamKind {
    /// Quoted on the wire.
    String,
    /// Rendered lowercase `true`/`false`.
    Bool,
    /// Rendered in its natural form.
    Number,
    /// An entity name, rendered bare.
    Entity,
}

/// One positional parameter of an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParamSpec {
    /// Parameter name (documentation only; arguments are positional).
    pub name: String,
    /// Wire type.
    #[serde(rename = "type")]
    pub kind: ParamKind,
    /// Default value, or the literal `REQUIRED`.
    #[serde(default)]
    pub default: Option<String>,
}

impl ParamSpec {
    /// Whether a caller must supply this parameter.
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.as_deref() == Some("REQUIRED")
    }
}

// ---------------------------------------------------------------------------
// Action Specs
// ---------------------------------------------------------------------------

/// One engine action: a name plus its ordered parameter list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Unique, case-sensitive action name.
    pub name: String,
    /// Ordered parameters.
    #[serde(rename = "param", default)]
    pub params: Vec<ParamSpec>,
    /// Pipe-separated names of the planning predicates this action
    /// realises when the initial state is replayed into the engine.
    #[serde(default)]
    pub from_predicate: Option<String>,
}

impl ActionSpec {
    /// Number of parameters marked required.
    #[must_use]
    pub fn required_count(&self) -> usize {
        self.params.iter().filter(|p| p.is_required()).count()
    }

    /// Whether this action realises the given predicate. Alternatives are
    /// separated by `|` and matched case-insensitively.
    #[must_use]
    pub fn handles_predicate(&self, predicate: &str) -> bool {
        self.from_predicate
            .as_deref()
            .is_some_and(|field| {
                field
                    .split('|')
                    .any(|alt| alt.trim().eq_ignore_ascii_case(predicate))
            })
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// The loaded, read-only action table.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: Vec<ActionSpec>,
    index: HashMap<String, usize>,
}

impl ActionCatalog {
    /// Build a catalog from parsed specs.
    ///
    /// # Errors
    /// [`StagehandError::DuplicateAction`] when two specs share a name.
    pub fn from_specs(specs: Vec<ActionSpec>) -> Result<Self> {
        let mut index = HashMap::with_capacity(specs.len());
        for (i, spec) in specs.iter().enumerate() {
            if index.insert(spec.name.clone(), i).is_some() {
                return Err(StagehandError::DuplicateAction {
                    name: spec.name.clone(),
                });
            }
        }
        Ok(Self {
            actions: specs,
            index,
        })
    }

    /// Parse a catalog from its JSON resource text.
    ///
    /// # Errors
    /// JSON errors, plus [`StagehandError::DuplicateAction`].
    pub fn from_json(json: &str) -> Result<Self> {
        let specs: Vec<ActionSpec> = serde_json::from_str(json)?;
        Self::from_specs(specs)
    }

    /// Load a catalog from a JSON file.
    ///
    /// # Errors
    /// I/O and parse errors as in [`ActionCatalog::from_json`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Exact, case-sensitive name lookup.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ActionSpec> {
        self.index.get(name).map(|&i| &self.actions[i])
    }

    /// The action (if any) that realises the given planning predicate.
    #[must_use]
    pub fn action_for_predicate(&self, predicate: &str) -> Option<&ActionSpec> {
        self.actions.iter().find(|a| a.handles_predicate(predicate))
    }

    /// All actions in resource order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionSpec> {
        self.actions.iter()
    }

    /// Number of actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
