//! High-level runtime orchestrator.
//!
//! The runtime owns the simulation worker, wires up command/event channels,
//! and exposes a builder-based API for embedding the server.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use game_core::{GameConfig, GameState, LevelCatalog};

use crate::api::{Result, RuntimeError, RuntimeHandle};
use crate::events::{Event, EventBus, Topic};
use crate::providers::NpcBehavior;
use crate::server::GameServer;
use crate::transport::Transport;
use crate::workers::{Command, SimulationWorker};

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub game_config: GameConfig,
    /// Wall-clock time between ticks when driven by [`Runtime::run`].
    pub tick_interval: Duration,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
    /// Session seed for every deterministic roll.
    pub seed: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            game_config: GameConfig::default(),
            tick_interval: Duration::from_millis(50),
            event_buffer_size: 100,
            command_buffer_size: 32,
            seed: 0,
        }
    }
}

/// Main runtime that orchestrates the server tick loop
///
/// Runtime owns the worker task; [`RuntimeHandle`] provides a cloneable
/// façade for clients.
pub struct Runtime {
    handle: RuntimeHandle,
    config: RuntimeConfig,
    sim_worker_handle: JoinHandle<()>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Get a cloneable handle to this runtime
    ///
    /// The handle can be shared across clients and async tasks.
    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Subscribe to runtime events of one topic
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.handle.subscribe(topic)
    }

    /// Tick at the configured interval, `max_ticks` times or until an error.
    ///
    /// Returns the number of ticks run.
    pub async fn run(&self, max_ticks: Option<u64>) -> Result<u64> {
        let mut interval = tokio::time::interval(self.config.tick_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut ticks = 0;
        while max_ticks.is_none_or(|max| ticks < max) {
            interval.tick().await;
            self.handle.tick().await?;
            ticks += 1;
        }
        Ok(ticks)
    }

    /// Shutdown the runtime gracefully
    ///
    /// Outstanding clones of the handle keep the worker alive until dropped.
    pub async fn shutdown(self) -> Result<()> {
        drop(self.handle);

        self.sim_worker_handle
            .await
            .map_err(RuntimeError::WorkerJoin)?;

        Ok(())
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    levels: Option<LevelCatalog>,
    state: Option<GameState>,
    behavior: Option<NpcBehavior>,
    transport: Option<Arc<dyn Transport>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            levels: None,
            state: None,
            behavior: None,
            transport: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Level catalog; the first level is loaded unless an initial state is set
    pub fn levels(mut self, levels: LevelCatalog) -> Self {
        self.levels = Some(levels);
        self
    }

    /// Start from an already built state instead of the catalog's first level
    pub fn initial_state(mut self, state: GameState) -> Self {
        self.state = Some(state);
        self
    }

    /// Replace the default enemy behavior
    pub fn npc_behavior(mut self, behavior: NpcBehavior) -> Self {
        self.behavior = Some(behavior);
        self
    }

    /// Where sync messages go after each tick. Without one, they are only
    /// published on the event bus.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Build the runtime and spawn its worker
    pub async fn build(self) -> Result<Runtime> {
        let game_config = self.config.game_config.clone();
        let server = match (self.state, self.levels) {
            (Some(state), levels) => {
                let server = GameServer::new(state, game_config);
                match levels {
                    Some(levels) => server.with_levels(levels),
                    None => server,
                }
            }
            (None, Some(levels)) => {
                GameServer::from_catalog(levels, game_config, self.config.seed)?
            }
            (None, None) => return Err(RuntimeError::MissingLevel),
        };
        let server = match self.behavior {
            Some(behavior) => server.with_behavior(behavior),
            None => server,
        };

        let (command_tx, command_rx) = mpsc::channel::<Command>(self.config.command_buffer_size);
        let event_bus = EventBus::with_capacity(self.config.event_buffer_size);

        let worker = SimulationWorker::new(server, command_rx, event_bus.clone(), self.transport);
        let sim_worker_handle = tokio::spawn(worker.run());

        tracing::info!(
            seed = self.config.seed,
            tick_interval_ms = self.config.tick_interval.as_millis() as u64,
            "runtime started"
        );

        Ok(Runtime {
            handle: RuntimeHandle::new(command_tx, event_bus),
            config: self.config,
            sim_worker_handle,
        })
    }
}
