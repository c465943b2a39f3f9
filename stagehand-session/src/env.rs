//! Environment setup: replay the initial planning state into the engine.
//!
//! The engine starts empty; the planning problem says what exists. The
//! builder creates every place, item and character through the normal
//! dispatch path, integrates the place models' room components into the
//! world model (they become `Furniture` entities and `at`/`can_open`/
//! `is_open`/`has_surface` facts), and finally replays the initial
//! relations that map to catalog actions. `at` facts of furniture are not
//! replayed: the engine places its own room components.

use rand::rngs::ThreadRng;
use rand::Rng;
use tracing::{debug, info};

use stagehand_core::command::ArgValue;
use stagehand_core::error::StagehandError;
use stagehand_core::types::{Entity, EntityKind, Predicate, Relation, RelationValue};
use stagehand_core::world::WorldModel;
use stagehand_wire::transport::LineWriter;
use stagehand_wire::Dispatcher;

use crate::error::Result;
use crate::resources::{CastingList, ItemList, PlaceList};

/// The static resources the builder reads.
#[derive(Debug, Clone, Default)]
pub struct EnvironmentResources {
    /// Place models.
    pub places: PlaceList,
    /// Bodies and outfits.
    pub casting: CastingList,
    /// Item models.
    pub items: ItemList,
}

/// Replays an initial state into the engine and the world model.
pub struct EnvironmentBuilder<'r, R: Rng> {
    resources: &'r EnvironmentResources,
    wait: bool,
    rng: R,
}

impl<'r> EnvironmentBuilder<'r, ThreadRng> {
    /// A builder drawing casting choices from the thread RNG.
    #[must_use]
    pub fn new(resources: &'r EnvironmentResources, wait: bool) -> Self {
        Self::with_rng(resources, wait, rand::thread_rng())
    }
}

impl<'r, R: Rng> EnvironmentBuilder<'r, R> {
    /// A builder with an explicit RNG (deterministic runs).
    #[must_use]
    pub fn with_rng(resources: &'r EnvironmentResources, wait: bool, rng: R) -> Self {
        Self {
            resources,
            wait,
            rng,
        }
    }

    /// Build the whole environment: places, items, characters, room
    /// component integration, initial-relation replay.
    ///
    /// # Errors
    /// Resource lookups that fail (unknown place or item model, casting
    /// without a fit) and any dispatch error.
    pub fn build<W: LineWriter>(
        &mut self,
        world: &mut WorldModel,
        dispatcher: &mut Dispatcher<W>,
    ) -> Result<()> {
        self.create_places(world, dispatcher)?;
        self.create_items(world, dispatcher)?;
        self.create_characters(world, dispatcher)?;
        self.integrate_room_components(world);
        self.replay_relations(world, dispatcher)?;
        info!("engine environment built");
        Ok(())
    }

    fn create_places<W: LineWriter>(
        &mut self,
        world: &WorldModel,
        dispatcher: &mut Dispatcher<W>,
    ) -> Result<()> {
        let rooms: Vec<String> = world
            .entities_of_kind(EntityKind::Location)
            .map(|e| e.name.clone())
            .collect();
        for room in rooms {
            let place = self.resources.places.find(&room).ok_or_else(|| {
                StagehandError::Resource(format!("place {room:?} not in the place library"))
            })?;
            dispatcher.dispatch(
                "CreatePlace",
                &[ArgValue::str(room.clone()), ArgValue::str(place.name.clone())],
                self.wait,
            )?;
        }
        Ok(())
    }

    fn create_items<W: LineWriter>(
        &mut self,
        world: &WorldModel,
        dispatcher: &mut Dispatcher<W>,
    ) -> Result<()> {
        let items: Vec<String> = world
            .entities_of_kind(EntityKind::Item)
            .map(|e| e.name.clone())
            .collect();
        for item in items {
            let model = self.resources.items.resolve(&item).ok_or_else(|| {
                StagehandError::Resource(format!("item {item:?} not in the item library"))
            })?;
            dispatcher.dispatch(
                "CreateItem",
                &[ArgValue::str(item.clone()), ArgValue::str(model)],
                self.wait,
            )?;
        }
        Ok(())
    }

    fn create_characters<W: LineWriter>(
        &mut self,
        world: &WorldModel,
        dispatcher: &mut Dispatcher<W>,
    ) -> Result<()> {
        let characters: Vec<String> = world
            .entities()
            .filter(|e| e.kind.is_character())
            .map(|e| e.name.clone())
            .collect();
        for character in characters {
            let (body, outfit) = self.resources.casting.cast(&mut self.rng)?;
            debug!(%character, %body, %outfit, "cast");
            dispatcher.dispatch(
                "CreateCharacter",
                &[ArgValue::str(character.clone()), ArgValue::str(body)],
                self.wait,
            )?;
            dispatcher.dispatch(
                "SetClothing",
                &[ArgValue::str(character), ArgValue::str(outfit)],
                self.wait,
            )?;
        }
        Ok(())
    }

    /// Add each place model's room components to the world model: a
    /// `Furniture` entity `<room>.<component>` with its `at` fact and the
    /// attribute facts. Components already present are left alone.
    fn integrate_room_components(&self, world: &mut WorldModel) {
        let rooms: Vec<String> = world
            .entities_of_kind(EntityKind::Location)
            .map(|e| e.name.clone())
            .collect();
        for room in rooms {
            let Some(place) = self.resources.places.find(&room) else {
                continue;
            };
            for component in &place.room_components {
                let full = format!("{room}.{}", component.name);
                world.add_entity(Entity::new(full.clone(), EntityKind::Furniture));
                world.assert_relation(Relation::new(
                    Predicate::At,
                    [full.as_str(), room.as_str()],
                    RelationValue::True,
                ));
                for attribute in &component.attribute {
                    let fact = match attribute.as_str() {
                        "Open" => Some((Predicate::CanOpen, RelationValue::True)),
                        "Close" => Some((Predicate::IsOpen, RelationValue::False)),
                        "Surface" => Some((Predicate::HasSurface, RelationValue::True)),
                        // Accepted markers with no relational counterpart.
                        "" | "Furniture" | "Seat" | "EntryPoint" => None,
                        other => {
                            debug!(attribute = other, component = %full, "unknown attribute ignored");
                            None
                        }
                    };
                    if let Some((predicate, value)) = fact {
                        world.assert_relation(Relation::new(
                            predicate,
                            [full.as_str()],
                            value,
                        ));
                    }
                }
            }
        }
    }

    /// Dispatch every initial relation whose predicate maps to a catalog
    /// action. Furniture `at` facts are skipped.
    fn replay_relations<W: LineWriter>(
        &self,
        world: &WorldModel,
        dispatcher: &mut Dispatcher<W>,
    ) -> Result<()> {
        let mut planned: Vec<(String, Vec<ArgValue>)> = Vec::new();
        for relation in world.relations() {
            if relation.predicate == Predicate::At {
                let is_furniture = relation.subject().is_some_and(|name| {
                    world
                        .entity(name)
                        .is_some_and(|e| e.kind == EntityKind::Furniture)
                });
                if is_furniture {
                    continue;
                }
            }
            let Some(action) = dispatcher
                .catalog()
                .action_for_predicate(relation.predicate.as_str())
            else {
                debug!(relation = %relation, "no engine action for relation, skipped");
                continue;
            };
            let args = relation
                .entities
                .iter()
                .map(|name| ArgValue::str(name.clone()))
                .collect();
            planned.push((action.name.clone(), args));
        }
        for (action, args) in planned {
            dispatcher.dispatch(&action, &args, self.wait)?;
        }
        Ok(())
    }
}

/// The single player entity's name.
///
/// # Errors
/// [`StagehandError::AmbiguousPlayer`] when zero or several `player`
/// entities exist.
pub fn find_player(world: &WorldModel) -> std::result::Result<String, StagehandError> {
    let players: Vec<&Entity> = world.entities_of_kind(EntityKind::Player).collect();
    match players.as_slice() {
        [player] => Ok(player.name.clone()),
        other => Err(StagehandError::AmbiguousPlayer { count: other.len() }),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
