//! Core type definitions for the planning vocabulary.
//!
//! The vocabulary is closed: the entity taxonomy and the predicate set are
//! enums owned by the model, not a process-wide registry. The external
//! domain parser produces these types directly.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Entity Taxonomy
// ---------------------------------------------------------------------------

/// The fixed taxonomy of entity kinds understood by the planning model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A named spot a character can stand at (`room.spot`).
    Position,
    /// A room.
    Location,
    /// A spot through which a room is entered or exited.
    #[serde(rename = "entrypoint")]
    EntryPoint,
    /// A non-player character.
    Character,
    /// A carryable object.
    Item,
    /// The player character. Exactly one per session.
    Player,
    /// A room component (door, table, shelf). Also usable as a standing spot.
    Furniture,
}

impl EntityKind {
    /// Kinds a character can be `at`: the reconciler's target filter.
    #[must_use]
    pub fn is_position(self) -> bool {
        matches!(self, Self::Position | Self::EntryPoint | Self::Furniture)
    }

    /// Kinds that move around and emit location events.
    #[must_use]
    pub fn is_character(self) -> bool {
        matches!(self, Self::Character | Self::Player)
    }

    /// Lowercase name as used by the domain definition.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Position => "position",
            Self::Location => "location",
            Self::EntryPoint => "entrypoint",
            Self::Character => "character",
            Self::Item => "item",
            Self::Player => "player",
            Self::Furniture => "furniture",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, typed object in the world model.
///
/// Names are unique within a world; the world model enforces this on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// Unique name within the session's world.
    pub name: String,
    /// Taxonomy kind.
    pub kind: EntityKind,
}

impl Entity {
    /// Create an entity.
    #[must_use]
    pub fn new(name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.kind)
    }
}

// ---------------------------------------------------------------------------
// Predicates & Relations
// ---------------------------------------------------------------------------

/// The predicates the core understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Predicate {
    /// `at(character|furniture, position)` — where something stands.
    At,
    /// `in(character, location)` — which room something is in.
    In,
    /// `stored(item, furniture)` — an item put away inside furniture.
    Stored,
    /// `can_open(furniture)` — the component can be opened.
    CanOpen,
    /// `is_open(furniture)` — current open/closed state.
    IsOpen,
    /// `has_surface(furniture)` — items can be placed on it.
    HasSurface,
    /// `adjacent(position, position)` — a traversable exit between spots.
    Adjacent,
}

impl Predicate {
    /// Snake-case name as used by the domain definition.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::At => "at",
            Self::In => "in",
            Self::Stored => "stored",
            Self::CanOpen => "can_open",
            Self::IsOpen => "is_open",
            Self::HasSurface => "has_surface",
            Self::Adjacent => "adjacent",
        }
    }

    /// Resolve a domain predicate name, `None` if unsupported.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "at" => Some(Self::At),
            "in" => Some(Self::In),
            "stored" => Some(Self::Stored),
            "can_open" => Some(Self::CanOpen),
            "is_open" => Some(Self::IsOpen),
            "has_surface" => Some(Self::HasSurface),
            "adjacent" => Some(Self::Adjacent),
            _ => None,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Truth value carried by an asserted relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RelationValue {
    /// The fact holds.
    True,
    /// The fact is asserted not to hold (e.g. `is_open = FALSE`).
    False,
}

impl RelationValue {
    /// Whether this is the `TRUE` value.
    #[must_use]
    pub fn is_true(self) -> bool {
        matches!(self, Self::True)
    }
}

impl fmt::Display for RelationValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::True => "TRUE",
            Self::False => "FALSE",
        })
    }
}

/// A typed fact over entities: `predicate(e1, e2, …) = value`.
///
/// Relations are structural: two relations are the same fact iff predicate,
/// entity list (in order) and value all match. The world model stores the
/// set of currently-asserted relations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    /// The predicate.
    pub predicate: Predicate,
    /// Ordered entity names the predicate ranges over.
    pub entities: Vec<String>,
    /// Truth value.
    pub value: RelationValue,
}

impl Relation {
    /// Create a relation over the given entity names.
    #[must_use]
    pub fn new<S: Into<String>>(
        predicate: Predicate,
        entities: impl IntoIterator<Item = S>,
        value: RelationValue,
    ) -> Self {
        Self {
            predicate,
            entities: entities.into_iter().map(Into::into).collect(),
            value,
        }
    }

    /// The first entity: the subject of the fact.
    #[must_use]
    pub fn subject(&self) -> Option<&str> {
        self.entities.first().map(String::as_str)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}({}) = {}",
            self.predicate,
            self.entities.join(", "),
            self.value
        )
    }
}

// ---------------------------------------------------------------------------
// Spot Names
// ---------------------------------------------------------------------------

/// A parsed `room.spot` position name, e.g. `kitchen.Door`.
///
/// The first dot splits room from spot; the spot part may itself contain
/// dots (the engine emits names like `alchemyshop.Door.In`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SpotName {
    /// The room the spot belongs to.
    pub room: String,
    /// The spot within the room.
    pub spot: String,
}

impl SpotName {
    /// Parse a `room.spot` name. `None` when there is no dot or either
    /// side is empty.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        let (room, spot) = name.split_once('.')?;
        if room.is_empty() || spot.is_empty() {
            return None;
        }
        Some(Self {
            room: room.to_string(),
            spot: spot.to_string(),
        })
    }

    /// Whether two spots lie in the same room.
    #[must_use]
    pub fn same_room(&self, other: &Self) -> bool {
        self.room == other.room
    }
}

impl fmt::Display for SpotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.room, self.spot)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spot_name_parse_and_display() {
        let spot = SpotName::parse("kitchen.Door").expect("parse");
        assert_eq!(spot.room, "kitchen");
        assert_eq!(spot.spot, "Door");
        assert_eq!(spot.to_string(), "kitchen.Door");
    }

    #[test]
    fn spot_name_keeps_extra_dots_in_spot() {
        let spot = SpotName::parse("alchemyshop.Door.In").expect("parse");
        assert_eq!(spot.room, "alchemyshop");
        assert_eq!(spot.spot, "Door.In");
    }

    #[test]
    fn spot_name_rejects_undotted_and_empty() {
        assert!(SpotName::parse("kitchen").is_none());
        assert!(SpotName::parse(".Door").is_none());
        assert!(SpotName::parse("kitchen.").is_none());
    }

    #[test]
    fn same_room_compares_room_only() {
        let a = SpotName::parse("kitchen.Door").expect("parse");
        let b = SpotName::parse("kitchen.Stove").expect("parse");
        let c = SpotName::parse("tavern.Door").expect("parse");
        assert!(a.same_room(&b));
        assert!(!a.same_room(&c));
    }

    #[test]
    fn position_kinds() {
        assert!(EntityKind::Position.is_position());
        assert!(EntityKind::EntryPoint.is_position());
        assert!(EntityKind::Furniture.is_position());
        assert!(!EntityKind::Location.is_position());
        assert!(!EntityKind::Character.is_position());
    }

    #[test]
    fn character_kinds() {
        assert!(EntityKind::Character.is_character());
        assert!(EntityKind::Player.is_character());
        assert!(!EntityKind::Item.is_character());
    }

    #[test]
    fn predicate_round_trip() {
        for p in [
            Predicate::At,
            Predicate::In,
            Predicate::Stored,
            Predicate::CanOpen,
            Predicate::IsOpen,
            Predicate::HasSurface,
            Predicate::Adjacent,
        ] {
            assert_eq!(Predicate::parse(p.as_str()), Some(p));
        }
        assert_eq!(Predicate::parse("holding"), None);
    }

    #[test]
    fn relation_display() {
        let rel = Relation::new(
            Predicate::At,
            ["bob", "kitchen.Door"],
            RelationValue::True,
        );
        assert_eq!(rel.to_string(), "at(bob, kitchen.Door) = TRUE");
        assert_eq!(rel.subject(), Some("bob"));
    }

    #[test]
    fn relation_equality_is_structural() {
        let a = Relation::new(Predicate::At, ["bob", "kitchen.Door"], RelationValue::True);
        let b = Relation::new(Predicate::At, ["bob", "kitchen.Door"], RelationValue::True);
        let c = Relation::new(Predicate::At, ["kitchen.Door", "bob"], RelationValue::True);
        assert_eq!(a, b);
        assert_ne!(a, c, "entity order is significant");
    }
}
