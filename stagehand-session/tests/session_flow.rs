//! Integration tests: a whole session against a scripted engine.
//!
//! The engine side is a thread on the loopback peer: it acknowledges
//! every command it receives and injects the menu input, an exit input
//! and a location event at the right moments. The test then checks the
//! command stream, the reconciled world and the snapshot feed.

use std::sync::{Arc, Mutex};
use std::thread;

use stagehand_core::catalog::{ActionCatalog, ActionSpec, ParamKind, ParamSpec};
use stagehand_core::types::{Entity, EntityKind, Predicate, Relation, RelationValue};
use stagehand_core::world::{InitialState, SharedWorld, WorldModel};
use stagehand_platform::{Outbox, PlatformClient};
use stagehand_session::resources::{CastingList, ItemList, PlaceList};
use stagehand_session::{EnvironmentResources, SessionController};
use stagehand_wire::transport::{loopback, LoopbackPeer};
use stagehand_wire::{Dispatcher, InboundRouter};

fn entity_param(name: &str) -> ParamSpec {
    ParamSpec {
        name: name.to_string(),
        kind: ParamKind::Entity,
        default: Some("REQUIRED".to_string()),
    }
}

fn string_param(name: &str) -> ParamSpec {
    ParamSpec {
        name: name.to_string(),
        kind: ParamKind::String,
        default: Some("REQUIRED".to_string()),
    }
}

fn catalog() -> Arc<ActionCatalog> {
    let no_params = |name: &str| ActionSpec {
        name: name.to_string(),
        params: vec![],
        from_predicate: None,
    };
    let specs = vec![
        ActionSpec {
            name: "CreatePlace".to_string(),
            params: vec![string_param("place"), string_param("model")],
            from_predicate: None,
        },
        ActionSpec {
            name: "CreateCharacter".to_string(),
            params: vec![string_param("character"), string_param("body")],
            from_predicate: None,
        },
        ActionSpec {
            name: "SetClothing".to_string(),
            params: vec![string_param("character"), string_param("outfit")],
            from_predicate: None,
        },
        ActionSpec {
            name: "WalkTo".to_string(),
            params: vec![entity_param("character"), entity_param("place")],
            from_predicate: Some("at".to_string()),
        },
        ActionSpec {
            name: "SetPosition".to_string(),
            params: vec![entity_param("character"), entity_param("place")],
            from_predicate: None,
        },
        ActionSpec {
            name: "SetCameraFocus".to_string(),
            params: vec![entity_param("character")],
            from_predicate: None,
        },
        ActionSpec {
            name: "EnableIcon".to_string(),
            params: vec![
                string_param("icon"),
                entity_param("object"),
                string_param("caption"),
            ],
            from_predicate: None,
        },
        no_params("ShowMenu"),
        no_params("HideMenu"),
        no_params("EnableInput"),
    ];
    Arc::new(ActionCatalog::from_specs(specs).expect("catalog"))
}

fn resources() -> EnvironmentResources {
    EnvironmentResources {
        places: PlaceList::from_json(
            r#"[
                { "name": "Kitchen", "room_components": [
                    { "name": "Door", "attribute": ["Open", "EntryPoint"] }
                ]},
                { "name": "Tavern", "room_components": [
                    { "name": "Entry", "attribute": ["EntryPoint"] }
                ]}
            ]"#,
        )
        .expect("places"),
        casting: CastingList::from_json(
            r#"{
                "body_type": [ { "name": "peasant" } ],
                "outfit": [ { "name": "apron", "Compatibility": "all" } ]
            }"#,
        )
        .expect("casting"),
        items: ItemList::from_json(r#"{ "items": [] }"#).expect("items"),
    }
}

fn initial_state() -> InitialState {
    InitialState {
        objects: vec![
            Entity::new("luca", EntityKind::Player),
            Entity::new("kitchen", EntityKind::Location),
            Entity::new("tavern", EntityKind::Location),
        ],
        relations: vec![
            Relation::new(Predicate::At, ["luca", "kitchen.Door"], RelationValue::True),
            Relation::new(
                Predicate::Adjacent,
                ["kitchen.Door", "tavern.Entry"],
                RelationValue::True,
            ),
        ],
    }
}

/// Ack every received command; inject scripted inputs at milestones.
fn scripted_engine(peer: LoopbackPeer, log: Arc<Mutex<Vec<String>>>) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let mut camera_focus_seen = 0;
        while let Ok(line) = peer.next_written() {
            let command = line.strip_prefix("start ").unwrap_or(&line).to_string();
            log.lock().expect("log lock").push(command.clone());
            peer.feed(&format!("succeeded {command}"));

            if command.starts_with("ShowMenu") {
                peer.feed("input Selected Start");
            }
            if command.starts_with("SetCameraFocus") {
                camera_focus_seen += 1;
                if camera_focus_seen == 1 {
                    // Camera is on the player: the player uses the door.
                    peer.feed("input Exit kitchen.Door");
                } else {
                    // The walk response finished; the engine reports the
                    // arrival and then shuts down.
                    peer.feed("input arrived luca position tavern.Entry");
                    peer.close();
                    break;
                }
            }
        }
    })
}

#[test]
fn full_session_against_a_scripted_engine() {
    let (writer, reader, peer) = loopback();
    let (router, channels) = InboundRouter::spawn(reader).expect("router");
    let dispatcher = Dispatcher::new(catalog(), writer, channels.acks.clone());

    let world = SharedWorld::new(WorldModel::from_initial_state(&initial_state()));
    let outbox = Outbox::start(PlatformClient::disabled().expect("client")).expect("outbox");

    let mut controller =
        SessionController::new(dispatcher, channels, world.clone(), outbox, true);
    let snapshots = controller.snapshot_feed();

    let log = Arc::new(Mutex::new(Vec::new()));
    let engine = scripted_engine(peer, Arc::clone(&log));

    controller.start(&resources()).expect("start");
    assert_eq!(controller.player(), Some("luca"));
    controller.run().expect("run");

    engine.join().expect("engine thread");
    router.join();

    // The command stream hits every waypoint, in order.
    let log = log.lock().expect("log lock");
    let position = |needle: &str| {
        log.iter()
            .position(|c| c.starts_with(needle))
            .unwrap_or_else(|| panic!("command {needle:?} missing from {log:?}"))
    };
    let create_place = position("CreatePlace");
    let create_character = position("CreateCharacter(\"luca\"");
    let show_menu = position("ShowMenu");
    let hide_menu = position("HideMenu");
    let enable_input = position("EnableInput");
    let walk_response = position("WalkTo(luca, kitchen.Door)");
    let set_position = position("SetPosition(luca, tavern.Entry)");
    assert!(create_place < create_character);
    assert!(create_character < show_menu);
    assert!(show_menu < hide_menu);
    assert!(hide_menu < enable_input);
    assert!(enable_input < set_position);
    assert!(walk_response < set_position);

    // Reconciliation moved the player and published exactly one snapshot.
    let snapshot = snapshots
        .try_pop()
        .expect("feed open")
        .expect("one snapshot");
    assert!(snapshot.relations.iter().any(|r| {
        r.predicate == Predicate::At && r.entities == ["luca", "tavern.Entry"]
    }));
    assert!(snapshots.try_pop().expect("feed open").is_none());

    // The live world agrees with the snapshot.
    world.with(|model| {
        let at: Vec<_> = model.relations_about("luca", Predicate::At).collect();
        assert_eq!(at.len(), 1);
        assert_eq!(at[0].entities[1], "tavern.Entry");
    });
}

#[test]
fn fire_and_forget_session_runs_without_acks() {
    let (writer, reader, peer) = loopback();
    let (router, channels) = InboundRouter::spawn(reader).expect("router");
    let dispatcher = Dispatcher::new(catalog(), writer, channels.acks.clone());

    let world = SharedWorld::new(WorldModel::from_initial_state(&initial_state()));
    let outbox = Outbox::start(PlatformClient::disabled().expect("client")).expect("outbox");

    // wait_for_acks = false: the engine never acknowledges anything.
    let mut controller =
        SessionController::new(dispatcher, channels, world.clone(), outbox, false);

    peer.feed("input Selected Start");
    peer.feed("input arrived luca position kitchen.Door");
    peer.close();

    controller.start(&resources()).expect("start");
    controller.run().expect("run");
    router.join();

    // The arrival was reconciled: the initial at fact was already there,
    // so the world still holds exactly one position for the player.
    world.with(|model| {
        assert_eq!(model.relations_about("luca", Predicate::At).count(), 1);
    });
}
