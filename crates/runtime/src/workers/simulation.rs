//! Simulation worker that owns the authoritative [`GameServer`].
//!
//! Receives commands from [`crate::RuntimeHandle`] one at a time, flushes
//! each tick's sync message through the [`Transport`] and publishes events to
//! the [`EventBus`].

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use game_core::{ClientId, Event as GameEvent, GameState};

use crate::api::Result;
use crate::events::{Event, EventBus, SyncEvent, TurnEvent};
use crate::server::{GameServer, TickReport};
use crate::sync::SyncMessage;
use crate::transport::Transport;

/// Commands that can be sent to the simulation worker
pub enum Command {
    /// Register a new client inbox.
    Connect { reply: oneshot::Sender<ClientId> },
    /// Queue an event in a client's inbox.
    Submit {
        client: ClientId,
        event: GameEvent,
        reply: oneshot::Sender<Result<()>>,
    },
    /// Run one tick and flush its sync message.
    Tick {
        reply: oneshot::Sender<Result<TickReport>>,
    },
    /// Query the current game state (read-only).
    QueryState { reply: oneshot::Sender<GameState> },
}

/// Background task that processes commands strictly in arrival order.
pub struct SimulationWorker {
    server: GameServer,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    transport: Option<Arc<dyn Transport>>,
}

impl SimulationWorker {
    pub fn new(
        server: GameServer,
        command_rx: mpsc::Receiver<Command>,
        event_bus: EventBus,
        transport: Option<Arc<dyn Transport>>,
    ) -> Self {
        tracing::info!(
            level = server.state().level_index,
            entities = server.state().entities.len(),
            "SimulationWorker initialized"
        );

        Self {
            server,
            command_rx,
            event_bus,
            transport,
        }
    }

    /// Main worker loop; ends once every handle is dropped.
    pub async fn run(mut self) {
        while let Some(cmd) = self.command_rx.recv().await {
            self.handle_command(cmd).await;
        }
        debug!("SimulationWorker command channel closed, stopping");
    }

    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect { reply } => {
                let client = self.server.connect();
                if reply.send(client).is_err() {
                    debug!("Connect reply channel closed (caller dropped)");
                }
            }
            Command::Submit {
                client,
                event,
                reply,
            } => {
                let result = self.server.submit(client, event);
                if reply.send(result).is_err() {
                    debug!("Submit reply channel closed (caller dropped)");
                }
            }
            Command::Tick { reply } => {
                let result = self.handle_tick().await;
                if reply.send(result).is_err() {
                    debug!("Tick reply channel closed (caller dropped)");
                }
            }
            Command::QueryState { reply } => {
                if reply.send(self.server.state().clone()).is_err() {
                    debug!("QueryState reply channel closed (caller dropped)");
                }
            }
        }
    }

    async fn handle_tick(&mut self) -> Result<TickReport> {
        let report = self.server.tick()?;

        for event in &report.events {
            self.event_bus.publish(Event::GameState(event.clone()));
        }
        if let Some(entity) = report.turn_passed_to {
            self.event_bus.publish(Event::Turn(TurnEvent {
                entity,
                tick: report.tick,
            }));
        }
        if let Some(message) = &report.sync {
            if let Some(transport) = self.transport.clone() {
                let clients: Vec<ClientId> = self.server.clients().collect();
                flush(transport.as_ref(), &clients, message).await;
            }
            self.event_bus.publish(Event::Sync(SyncEvent::from(message)));
        }

        Ok(report)
    }
}

/// Transport failures are logged and never stop the simulation.
async fn flush(transport: &dyn Transport, clients: &[ClientId], message: &SyncMessage) {
    match message {
        SyncMessage::Snapshot(snapshot) => {
            for &client in clients {
                if let Err(error) = transport.send_full_state(client, snapshot).await {
                    warn!(%client, %error, "failed to send snapshot");
                }
            }
        }
        SyncMessage::Delta(delta) => {
            if let Err(error) = transport.send_delta(delta).await {
                warn!(%error, tick = delta.tick, "failed to send delta");
            }
        }
    }
}
