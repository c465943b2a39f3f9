//! The session controller: menu flow, the main event loop, and the GUI
//! snapshot feed.
//!
//! One controller owns one session end to end. Startup replays the
//! initial state into the engine, installs the exit bindings and shows
//! the menu; the main loop then polls the input and location channels
//! without blocking, responds to bound input tokens, reconciles location
//! events, and publishes a world snapshot whenever reconciliation changed
//! anything. The loop ends when the engine stream ends. An unknown entity
//! in a location event is a desynchronization: the session reports it to
//! the platform and aborts.

use std::process::ChildStdin;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use stagehand_core::catalog::ActionCatalog;
use stagehand_core::command::ArgValue;
use stagehand_core::config::StagehandConfig;
use stagehand_core::reconcile::LocationEvent;
use stagehand_core::world::{InitialState, SharedWorld, WorldModel, WorldSnapshot};
use stagehand_core::StagehandError;
use stagehand_platform::{Outbox, PlatformClient};
use stagehand_wire::transport::{LineWriter, ProcessTransport, WriteHalf};
use stagehand_wire::{Dispatcher, InboundRouter, MessageQueue, RouterChannels, WireError};

use crate::bindings::BindingTable;
use crate::env::{find_player, EnvironmentBuilder, EnvironmentResources};
use crate::error::{Result, SessionError};

const IDLE_POLL: Duration = Duration::from_millis(10);

/// The token the engine sends when the player picks Start in the menu.
const START_TOKEN: &str = "input Selected Start";

enum Poll {
    Busy,
    Idle,
    Closed,
}

/// Owns one session's collaborators and drives the protocol.
pub struct SessionController<W: LineWriter> {
    dispatcher: Dispatcher<W>,
    channels: RouterChannels,
    world: SharedWorld,
    bindings: BindingTable,
    outbox: Outbox,
    snapshots: MessageQueue<WorldSnapshot>,
    wait_for_acks: bool,
    player: Option<String>,
}

impl<W: LineWriter> SessionController<W> {
    /// Assemble a controller from its owned collaborators.
    pub fn new(
        dispatcher: Dispatcher<W>,
        channels: RouterChannels,
        world: SharedWorld,
        outbox: Outbox,
        wait_for_acks: bool,
    ) -> Self {
        Self {
            dispatcher,
            channels,
            world,
            bindings: BindingTable::new(),
            outbox,
            snapshots: MessageQueue::new(),
            wait_for_acks,
            player: None,
        }
    }

    /// The queue world snapshots are published on; hand a clone to the
    /// GUI renderer.
    #[must_use]
    pub fn snapshot_feed(&self) -> MessageQueue<WorldSnapshot> {
        self.snapshots.clone()
    }

    /// The discovered player entity, once `start` has run.
    #[must_use]
    pub fn player(&self) -> Option<&str> {
        self.player.as_deref()
    }

    /// Build the engine environment, install the exit bindings and show
    /// the menu.
    ///
    /// # Errors
    /// Environment/resource errors and dispatch failures.
    pub fn start(&mut self, resources: &EnvironmentResources) -> Result<()> {
        let mut builder = EnvironmentBuilder::new(resources, self.wait_for_acks);
        let world = &self.world;
        let dispatcher = &mut self.dispatcher;
        world.with_mut(|model| builder.build(model, dispatcher))?;

        let player = self.world.with(find_player)?;
        info!(%player, "player discovered");

        let (declarations, table) = self.world.with(|model| {
            BindingTable::from_adjacency(model, &player, self.wait_for_acks)
        });
        for declaration in declarations {
            self.dispatcher
                .dispatch(&declaration.action, &declaration.args, declaration.wait)?;
        }
        self.bindings = table;
        self.player = Some(player);

        self.dispatcher
            .dispatch("ShowMenu", &[], self.wait_for_acks)?;
        Ok(())
    }

    /// Run the session to completion.
    ///
    /// Blocks until the player starts the game, then loops over the input
    /// and location channels. Returns `Ok(())` when the engine stream
    /// ends; fatal errors are reported to the platform and returned.
    ///
    /// # Errors
    /// [`StagehandError::UnknownEntity`] desynchronization and any
    /// dispatch failure.
    pub fn run(&mut self) -> Result<()> {
        match self.run_inner() {
            Ok(()) => Ok(()),
            Err(SessionError::Wire(WireError::ChannelClosed)) => {
                info!("engine channel closed, session over");
                Ok(())
            }
            Err(err) => {
                let tag = match &err {
                    SessionError::Core(StagehandError::UnknownEntity { .. }) => "desync",
                    _ => "session",
                };
                self.outbox.send_error(err.to_string(), tag);
                Err(err)
            }
        }
    }

    fn run_inner(&mut self) -> Result<()> {
        self.wait_for_start()?;

        self.dispatcher
            .dispatch("HideMenu", &[], self.wait_for_acks)?;
        self.dispatcher
            .dispatch("EnableInput", &[], self.wait_for_acks)?;
        if let Some(player) = self.player.clone() {
            self.dispatcher.dispatch(
                "SetCameraFocus",
                &[ArgValue::str(player)],
                self.wait_for_acks,
            )?;
        }

        loop {
            let input = self.handle_input()?;
            let location = self.handle_location()?;
            match (&input, &location) {
                (Poll::Closed, Poll::Closed) => break,
                (Poll::Busy, _) | (_, Poll::Busy) => {}
                _ => thread::sleep(IDLE_POLL),
            }
        }
        Ok(())
    }

    /// Block until the menu's start token arrives. Other input tokens
    /// before it are ignored.
    fn wait_for_start(&mut self) -> Result<()> {
        loop {
            let line = self.channels.inputs.pop()?;
            if line == START_TOKEN {
                info!("player started the session");
                return Ok(());
            }
            debug!(%line, "pre-start input ignored");
        }
    }

    /// Poll the input channel once and respond through the binding table.
    fn handle_input(&mut self) -> Result<Poll> {
        let line = match self.channels.inputs.try_pop() {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(Poll::Idle),
            Err(WireError::ChannelClosed) => return Ok(Poll::Closed),
            Err(err) => return Err(err.into()),
        };
        debug!(%line, "input event");
        if !self.bindings.respond(&line, &mut self.dispatcher)? {
            debug!(%line, "unbound input token ignored");
        }
        Ok(Poll::Busy)
    }

    /// Poll the location channel once, reconcile, and publish on change.
    fn handle_location(&mut self) -> Result<Poll> {
        let line = match self.channels.locations.try_pop() {
            Ok(Some(line)) => line,
            Ok(None) => return Ok(Poll::Idle),
            Err(WireError::ChannelClosed) => return Ok(Poll::Closed),
            Err(err) => return Err(err.into()),
        };
        let event = match LocationEvent::parse(&line) {
            Ok(event) => event,
            Err(err) => {
                warn!(%err, "malformed location event skipped");
                return Ok(Poll::Busy);
            }
        };

        let changes = self.world.apply(&event)?;
        if changes.is_empty() {
            debug!(%line, "location event changed nothing");
        } else {
            info!(
                subject = %event.subject,
                position = %event.position,
                changed = changes.len(),
                "world state updated"
            );
            self.snapshots.push(self.world.snapshot());
            self.outbox
                .send(format!("{} is now at {}", event.subject, event.position));
        }
        Ok(Poll::Busy)
    }
}

// ---------------------------------------------------------------------------
// Bootstrap
// ---------------------------------------------------------------------------

/// A fully wired session over an engine child process.
pub struct Session {
    /// The controller driving the protocol.
    pub controller: SessionController<WriteHalf<ChildStdin>>,
    /// Keeps the engine process alive; the child is killed on drop.
    pub engine: ProcessTransport,
    /// The router thread handle, joinable after the stream ends.
    pub router: InboundRouter,
}

/// Wire a session from configuration: spawn the engine process, start the
/// router and the platform outbox, build the world from the initial state
/// and assemble the controller.
///
/// # Errors
/// [`StagehandError::Config`] when `engine.command` is not set; spawn,
/// thread and platform construction failures.
pub fn launch(
    config: &StagehandConfig,
    catalog: Arc<ActionCatalog>,
    state: &InitialState,
) -> Result<Session> {
    let command = config.engine.command.as_deref().ok_or_else(|| {
        StagehandError::Config("engine.command is required to launch a session".to_string())
    })?;
    let mut engine = ProcessTransport::spawn(command, &config.engine.args)?;
    let (writer, reader) = engine.split()?;
    let (router, channels) = InboundRouter::spawn(reader)?;
    let dispatcher = Dispatcher::new(catalog, writer, channels.acks.clone());

    let client = if config.platform.enabled {
        PlatformClient::connect(config.platform.base_url.clone())?
    } else {
        PlatformClient::disabled()?
    };
    let outbox = Outbox::start(client)?;

    let world = SharedWorld::new(WorldModel::from_initial_state(state));
    let controller = SessionController::new(
        dispatcher,
        channels,
        world,
        outbox,
        config.session.wait_for_acks,
    );
    Ok(Session {
        controller,
        engine,
        router,
    })
}
