//! The per-session world model: entity set plus asserted relation set.
//!
//! The model is created once from the initial planning state, lives for the
//! session, and is mutated only by the reconciler (on the caller's thread)
//! in response to engine events. Concurrent readers take a [`WorldSnapshot`]
//! through [`SharedWorld`]; they never observe a mutation in progress.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::error::Result;
use crate::reconcile::{self, LocationEvent};
use crate::types::{Entity, EntityKind, Predicate, Relation};

// ---------------------------------------------------------------------------
// Initial State
// ---------------------------------------------------------------------------

/// The typed entity/relation graph produced by the external domain/problem
/// parser. Consumed once to build a [`WorldModel`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InitialState {
    /// All declared objects.
    pub objects: Vec<Entity>,
    /// All initially-asserted relations.
    pub relations: Vec<Relation>,
}

// ---------------------------------------------------------------------------
// World Model
// ---------------------------------------------------------------------------

/// The live set of entities and relations for one session.
#[derive(Debug, Clone, Default)]
pub struct WorldModel {
    entities: BTreeMap<String, Entity>,
    relations: Vec<Relation>,
}

impl WorldModel {
    /// Create an empty world model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a world model from the initial planning state.
    ///
    /// Duplicate objects and relations in the input are collapsed; the
    /// model holds sets.
    #[must_use]
    pub fn from_initial_state(state: &InitialState) -> Self {
        let mut world = Self::new();
        for entity in &state.objects {
            world.add_entity(entity.clone());
        }
        for relation in &state.relations {
            world.assert_relation(relation.clone());
        }
        world
    }

    /// Insert an entity. Returns `false` (and leaves the existing entry
    /// untouched) when the name is already taken.
    pub fn add_entity(&mut self, entity: Entity) -> bool {
        if self.entities.contains_key(&entity.name) {
            return false;
        }
        self.entities.insert(entity.name.clone(), entity);
        true
    }

    /// Look up an entity by name.
    #[must_use]
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.entities.get(name)
    }

    /// Whether an entity with this name exists.
    #[must_use]
    pub fn contains_entity(&self, name: &str) -> bool {
        self.entities.contains_key(name)
    }

    /// All entities of a given kind, in name order.
    pub fn entities_of_kind(&self, kind: EntityKind) -> impl Iterator<Item = &Entity> {
        self.entities.values().filter(move |e| e.kind == kind)
    }

    /// All entities, in name order.
    pub fn entities(&self) -> impl Iterator<Item = &Entity> {
        self.entities.values()
    }

    /// Assert a relation. Set semantics: returns `false` when the exact
    /// fact is already asserted.
    pub fn assert_relation(&mut self, relation: Relation) -> bool {
        if self.relations.contains(&relation) {
            return false;
        }
        self.relations.push(relation);
        true
    }

    /// Retract a relation. Returns `false` when the fact was not asserted.
    pub fn retract_relation(&mut self, relation: &Relation) -> bool {
        match self.relations.iter().position(|r| r == relation) {
            Some(idx) => {
                self.relations.remove(idx);
                true
            }
            None => false,
        }
    }

    /// All asserted relations, in assertion order.
    #[must_use]
    pub fn relations(&self) -> &[Relation] {
        &self.relations
    }

    /// Relations with the given predicate whose subject (first entity) is
    /// `name`.
    pub fn relations_about<'a>(
        &'a self,
        name: &'a str,
        predicate: Predicate,
    ) -> impl Iterator<Item = &'a Relation> {
        self.relations
            .iter()
            .filter(move |r| r.predicate == predicate && r.subject() == Some(name))
    }

    /// An owned copy of the current state for concurrent readers.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            entities: self.entities.values().cloned().collect(),
            relations: self.relations.clone(),
        }
    }
}

/// An immutable copy of the world state at one point in time.
///
/// Handed to the GUI and platform collaborators; safe to read while the
/// live model keeps changing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Entities at snapshot time, in name order.
    pub entities: Vec<Entity>,
    /// Relations at snapshot time, in assertion order.
    pub relations: Vec<Relation>,
}

// ---------------------------------------------------------------------------
// Relation Changes
// ---------------------------------------------------------------------------

/// A single mutation the reconciler performed on the world model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationChange {
    /// The relation was newly asserted.
    Asserted(Relation),
    /// The relation was retracted.
    Retracted(Relation),
}

// ---------------------------------------------------------------------------
// Shared Handle
// ---------------------------------------------------------------------------

/// Cloneable handle to the session's world model.
///
/// Mutation happens under a brief write lock on the calling thread;
/// [`SharedWorld::snapshot`] takes a read lock and copies out. Cloned
/// handles share the same underlying model.
#[derive(Debug, Clone, Default)]
pub struct SharedWorld {
    inner: Arc<RwLock<WorldModel>>,
}

impl SharedWorld {
    /// Wrap a world model in a shared handle.
    #[must_use]
    pub fn new(model: WorldModel) -> Self {
        Self {
            inner: Arc::new(RwLock::new(model)),
        }
    }

    /// Run a closure with exclusive access to the model.
    pub fn with_mut<R>(&self, f: impl FnOnce(&mut WorldModel) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Run a closure with shared read access to the model.
    pub fn with<R>(&self, f: impl FnOnce(&WorldModel) -> R) -> R {
        f(&self.inner.read())
    }

    /// Apply a location event under the write lock.
    ///
    /// # Errors
    /// Propagates [`crate::StagehandError::UnknownEntity`] from the
    /// reconciler; the model is left unmodified in that case.
    pub fn apply(&self, event: &LocationEvent) -> Result<Vec<RelationChange>> {
        reconcile::apply(&mut self.inner.write(), event)
    }

    /// Copy out the current state.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        self.inner.read().snapshot()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
