//! Reconciliation of engine location events against the world model.
//!
//! The engine reports movement as lines of the form
//! `input arrived <entity> position <room>.<spot>` (and the matching
//! `exited` form). [`apply`] parses nothing itself; it takes a typed
//! [`LocationEvent`] and updates the `at` facts for the subject so that the
//! model converges on at most one `at` per character in steady state.

use tracing::debug;

use crate::error::{Result, StagehandError};
use crate::types::{Predicate, Relation, RelationValue, SpotName};
use crate::world::{RelationChange, WorldModel};

// ---------------------------------------------------------------------------
// Event Grammar
// ---------------------------------------------------------------------------

/// Direction of a location event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The subject reached the named spot.
    Arrived,
    /// The subject left the named spot. Accepted by the grammar; performs
    /// no model mutation.
    Exited,
}

/// A parsed location event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationEvent {
    /// Name of the moving entity.
    pub subject: String,
    /// Arrived or exited.
    pub transition: Transition,
    /// The spot the event refers to.
    pub position: SpotName,
}

impl LocationEvent {
    /// Parse a location event line.
    ///
    /// Grammar: `input (arrived|exited) <entity> position <room>.<spot>`.
    ///
    /// # Errors
    /// [`StagehandError::MalformedEvent`] when the line does not match.
    pub fn parse(line: &str) -> Result<Self> {
        let malformed = |reason: &str| StagehandError::MalformedEvent {
            line: line.to_string(),
            reason: reason.to_string(),
        };

        let mut parts = line.split_whitespace();
        if parts.next() != Some("input") {
            return Err(malformed("missing `input` token"));
        }
        let transition = match parts.next() {
            Some("arrived") => Transition::Arrived,
            Some("exited") => Transition::Exited,
            _ => return Err(malformed("expected `arrived` or `exited`")),
        };
        let subject = parts
            .next()
            .ok_or_else(|| malformed("missing entity name"))?
            .to_string();
        if parts.next() != Some("position") {
            return Err(malformed("missing `position` token"));
        }
        let spot = parts.next().ok_or_else(|| malformed("missing spot name"))?;
        let position =
            SpotName::parse(spot).ok_or_else(|| malformed("spot name is not `room.spot`"))?;
        if parts.next().is_some() {
            return Err(malformed("trailing tokens"));
        }

        Ok(Self {
            subject,
            transition,
            position,
        })
    }
}

// ---------------------------------------------------------------------------
// Reconciliation
// ---------------------------------------------------------------------------

/// Apply a location event to the world model and return exactly the set of
/// relations inserted or removed.
///
/// For an arrival, stale `at` facts binding the subject to a different room
/// are retracted and a single new `at` against the named spot is asserted.
/// An arrival at the spot already recorded is a no-op (idempotence). An
/// arrival at a different spot of the *same* room deliberately mutates
/// nothing. `Exited` events never mutate.
///
/// # Errors
/// [`StagehandError::UnknownEntity`] when the subject, or the spot entity
/// itself, is absent from the model. The model is unmodified on error;
/// callers must treat this as a fatal engine/model desynchronization.
pub fn apply(world: &mut WorldModel, event: &LocationEvent) -> Result<Vec<RelationChange>> {
    if event.transition == Transition::Exited {
        debug!(subject = %event.subject, position = %event.position, "exited event ignored");
        return Ok(Vec::new());
    }

    if !world.contains_entity(&event.subject) {
        return Err(StagehandError::UnknownEntity {
            name: event.subject.clone(),
        });
    }
    let target_name = event.position.to_string();
    if !world.contains_entity(&target_name) {
        return Err(StagehandError::UnknownEntity { name: target_name });
    }

    // Walk the subject's asserted `at` facts against position-kind targets.
    let mut stale: Vec<Relation> = Vec::new();
    let mut already_there = false;
    let mut same_room = false;
    for relation in world.relations_about(&event.subject, Predicate::At) {
        if !relation.value.is_true() {
            continue;
        }
        let Some(target) = relation.entities.iter().skip(1).find(|name| {
            world
                .entity(name)
                .is_some_and(|entity| entity.kind.is_position())
        }) else {
            continue;
        };
        if *target == target_name {
            already_there = true;
            continue;
        }
        match SpotName::parse(target) {
            // A different spot of the same room: this transition is left
            // untouched (finer-grained in-place movement).
            Some(spot) if spot.room == event.position.room => {
                same_room = true;
                continue;
            }
            _ => stale.push(relation.clone()),
        }
    }

    let mut changes = Vec::new();
    for relation in stale {
        if world.retract_relation(&relation) {
            debug!(%relation, "retracted stale position");
            changes.push(RelationChange::Retracted(relation));
        }
    }
    if !already_there && !same_room {
        let relation = Relation::new(
            Predicate::At,
            [event.subject.as_str(), target_name.as_str()],
            RelationValue::True,
        );
        if world.assert_relation(relation.clone()) {
            debug!(%relation, "asserted new position");
            changes.push(RelationChange::Asserted(relation));
        }
    }
    Ok(changes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Entity, EntityKind};

    fn world_with_rooms() -> WorldModel {
        let mut world = WorldModel::new();
        world.add_entity(Entity::new("bob", EntityKind::Character));
        world.add_entity(Entity::new("kitchen", EntityKind::Location));
        world.add_entity(Entity::new("tavern", EntityKind::Location));
        world.add_entity(Entity::new("kitchen.Door", EntityKind::Furniture));
        world.add_entity(Entity::new("kitchen.Stove", EntityKind::Furniture));
        world.add_entity(Entity::new("tavern.Door", EntityKind::Furniture));
        world
    }

    fn arrived(subject: &str, spot: &str) -> LocationEvent {
        LocationEvent {
            subject: subject.to_string(),
            transition: Transition::Arrived,
            position: SpotName::parse(spot).expect("spot"),
        }
    }

    #[test]
    fn parse_arrived_line() {
        let event = LocationEvent::parse("input arrived bob position kitchen.Door").expect("parse");
        assert_eq!(event.subject, "bob");
        assert_eq!(event.transition, Transition::Arrived);
        assert_eq!(event.position.to_string(), "kitchen.Door");
    }

    #[test]
    fn parse_exited_line_with_dotted_spot() {
        let event =
            LocationEvent::parse("input exited bob position alchemyshop.Door.In").expect("parse");
        assert_eq!(event.transition, Transition::Exited);
        assert_eq!(event.position.spot, "Door.In");
    }

    #[test]
    fn parse_rejects_bad_lines() {
        for line in [
            "",
            "input",
            "input arrived",
            "input arrived bob",
            "input arrived bob position",
            "input arrived bob position kitchen",
            "input arrived bob location kitchen.Door",
            "output arrived bob position kitchen.Door",
            "input arrived bob position kitchen.Door trailing",
        ] {
            assert!(
                matches!(
                    LocationEvent::parse(line),
                    Err(StagehandError::MalformedEvent { .. })
                ),
                "line {line:?} should be malformed"
            );
        }
    }

    #[test]
    fn first_arrival_asserts_once() {
        let mut world = world_with_rooms();
        let changes = apply(&mut world, &arrived("bob", "kitchen.Door")).expect("apply");
        assert_eq!(changes.len(), 1);
        assert!(matches!(changes[0], RelationChange::Asserted(_)));
        assert_eq!(world.relations_about("bob", Predicate::At).count(), 1);
    }

    #[test]
    fn repeat_arrival_is_a_no_op() {
        let mut world = world_with_rooms();
        apply(&mut world, &arrived("bob", "kitchen.Door")).expect("first");
        let changes = apply(&mut world, &arrived("bob", "kitchen.Door")).expect("second");
        assert!(changes.is_empty(), "second identical arrival changes nothing");
    }

    #[test]
    fn cross_room_move_retracts_then_asserts() {
        let mut world = world_with_rooms();
        apply(&mut world, &arrived("bob", "kitchen.Door")).expect("first");
        let changes = apply(&mut world, &arrived("bob", "tavern.Door")).expect("second");

        assert_eq!(changes.len(), 2);
        assert!(matches!(
            &changes[0],
            RelationChange::Retracted(r) if r.entities[1] == "kitchen.Door"
        ));
        assert!(matches!(
            &changes[1],
            RelationChange::Asserted(r) if r.entities[1] == "tavern.Door"
        ));

        let at: Vec<_> = world.relations_about("bob", Predicate::At).collect();
        assert_eq!(at.len(), 1, "steady state keeps a single at fact");
        assert_eq!(at[0].entities[1], "tavern.Door");
    }

    #[test]
    fn same_room_different_spot_mutates_nothing() {
        let mut world = world_with_rooms();
        apply(&mut world, &arrived("bob", "kitchen.Door")).expect("first");
        let changes = apply(&mut world, &arrived("bob", "kitchen.Stove")).expect("second");

        assert!(changes.is_empty());
        let at: Vec<_> = world.relations_about("bob", Predicate::At).collect();
        assert_eq!(at.len(), 1);
        assert_eq!(at[0].entities[1], "kitchen.Door", "old spot is kept");
    }

    #[test]
    fn unknown_subject_is_fatal_and_leaves_world_unmodified() {
        let mut world = world_with_rooms();
        let before = world.relations().len();
        let err = apply(&mut world, &arrived("ghost", "kitchen.Door"))
            .expect_err("unknown entity must fail");
        assert!(matches!(err, StagehandError::UnknownEntity { ref name } if name == "ghost"));
        assert_eq!(world.relations().len(), before);
    }

    #[test]
    fn unknown_spot_is_fatal_too() {
        let mut world = world_with_rooms();
        let err = apply(&mut world, &arrived("bob", "cellar.Door"))
            .expect_err("unknown spot must fail");
        assert!(matches!(err, StagehandError::UnknownEntity { ref name } if name == "cellar.Door"));
    }

    #[test]
    fn exited_never_mutates() {
        let mut world = world_with_rooms();
        apply(&mut world, &arrived("bob", "kitchen.Door")).expect("arrive");
        let event = LocationEvent {
            subject: "bob".to_string(),
            transition: Transition::Exited,
            position: SpotName::parse("kitchen.Door").expect("spot"),
        };
        let changes = apply(&mut world, &event).expect("exited");
        assert!(changes.is_empty());
        assert_eq!(world.relations_about("bob", Predicate::At).count(), 1);
    }

    #[test]
    fn non_position_targets_are_ignored() {
        let mut world = world_with_rooms();
        // A room-level `at` (target kind Location) is not a position fact
        // and must survive reconciliation untouched.
        world.assert_relation(Relation::new(
            Predicate::At,
            ["bob", "kitchen"],
            RelationValue::True,
        ));
        let changes = apply(&mut world, &arrived("bob", "tavern.Door")).expect("apply");
        assert_eq!(changes.len(), 1, "only the new assertion");
        assert!(
            world
                .relations_about("bob", Predicate::At)
                .any(|r| r.entities[1] == "kitchen"),
            "room-level fact kept"
        );
    }
}
