//! The authoritative server: owns the level and advances it one tick at a time.
//!
//! Client events arrive asynchronously into per-client inboxes and are only
//! drained inside [`GameServer::tick`], which is the single place the level
//! state is mutated. One tick runs these steps in order:
//!
//! 1. recompute every tile's seen-by set
//! 2. offer every queued non-action event of every client to the engine;
//!    executed ones leave the inbox, failing ones stay for the next tick
//! 3. let the turn holder act once: a player's oldest queued action is taken
//!    out and attempted exactly once, an enemy runs its behavior
//! 4. pass the turn on if the holder ran out of action points
//! 5. drain the change set into a snapshot or delta for clients

mod inbox;

pub use inbox::ClientInbox;

use std::collections::BTreeMap;

use tracing::{debug, info, trace, warn};

use game_core::{
    ClientId, EntityId, Event, GameConfig, GameEngine, GameEnv, GameError, GameState,
    LevelCatalog, PcgRng, Role, refresh_visibility,
};

use crate::api::{Result, RuntimeError};
use crate::events::GameStateEvent;
use crate::providers::{NpcBehavior, NpcDecision};
use crate::sync::{LevelChanged, LevelSnapshot, SyncMessage};

/// Everything one tick produced.
#[derive(Clone, Debug, Default)]
pub struct TickReport {
    pub tick: u64,
    pub events: Vec<GameStateEvent>,
    /// Entity that received the turn during this tick, if it changed hands.
    pub turn_passed_to: Option<EntityId>,
    /// Outbound message for every connected client, if anything changed.
    pub sync: Option<SyncMessage>,
}

/// Server-side owner of the level, the inboxes and the NPC behavior.
pub struct GameServer {
    state: GameState,
    config: GameConfig,
    levels: Option<LevelCatalog>,
    rng: PcgRng,
    behavior: NpcBehavior,
    inboxes: BTreeMap<ClientId, ClientInbox>,
    next_client: u32,
    tick: u64,
}

impl GameServer {
    pub fn new(state: GameState, config: GameConfig) -> Self {
        Self {
            state,
            config,
            levels: None,
            rng: PcgRng,
            behavior: NpcBehavior::new(),
            inboxes: BTreeMap::new(),
            next_client: 1,
            tick: 0,
        }
    }

    /// Enables level transitions through `NextLevel` events.
    pub fn with_levels(mut self, levels: LevelCatalog) -> Self {
        self.levels = Some(levels);
        self
    }

    pub fn with_behavior(mut self, behavior: NpcBehavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Starts on the first level of `levels`.
    pub fn from_catalog(levels: LevelCatalog, config: GameConfig, seed: u64) -> Result<Self> {
        let first = levels.first().ok_or(RuntimeError::MissingLevel)?;
        let state = GameState::from_level(&config, first, seed, &PcgRng)?;
        Ok(Self::new(state, config).with_levels(levels))
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Number of ticks run so far.
    pub fn current_tick(&self) -> u64 {
        self.tick
    }

    /// Registers a new client with an empty inbox.
    pub fn connect(&mut self) -> ClientId {
        let client = ClientId(self.next_client);
        self.next_client += 1;
        self.inboxes.insert(client, ClientInbox::new());
        info!(%client, "client connected");
        client
    }

    pub fn clients(&self) -> impl Iterator<Item = ClientId> + '_ {
        self.inboxes.keys().copied()
    }

    pub fn inbox(&self, client: ClientId) -> Option<&ClientInbox> {
        self.inboxes.get(&client)
    }

    /// Queues `event` for processing on a later tick.
    ///
    /// Non-action events must name the submitting client. Actions are checked
    /// against the client's entity when they are attempted, since the entity
    /// may not exist yet when a join and its first moves arrive together.
    pub fn submit(&mut self, client: ClientId, event: Event) -> Result<()> {
        let claimed = match &event {
            Event::Join(join) => Some(join.client),
            Event::NextLevel(next) => Some(next.client),
            Event::Action(_) => None,
        };
        if let Some(claimed) = claimed.filter(|claimed| *claimed != client) {
            return Err(RuntimeError::ClientMismatch { client, claimed });
        }

        let inbox = self
            .inboxes
            .get_mut(&client)
            .ok_or(RuntimeError::UnknownClient(client))?;
        trace!(%client, event = event.as_snake_case(), "event queued");
        inbox.push(event);
        Ok(())
    }

    /// Advances the level by one tick.
    pub fn tick(&mut self) -> Result<TickReport> {
        self.tick += 1;
        let tick = self.tick;
        let mut report = TickReport {
            tick,
            ..TickReport::default()
        };

        let Self {
            state,
            config,
            levels,
            rng,
            behavior,
            inboxes,
            ..
        } = self;
        let mut env = GameEnv::new(&*config, &*rng);
        if let Some(levels) = levels.as_ref() {
            env = env.with_levels(levels);
        }

        refresh_visibility(state);

        let mut full_sync = false;
        for (client, inbox) in inboxes.iter_mut() {
            let client = *client;
            inbox.retain_non_actions(|event| {
                match GameEngine::new(state).execute(&env, event) {
                    Ok(outcome) => {
                        info!(%client, event = event.as_snake_case(), ?outcome, "event executed");
                        full_sync |= outcome.requires_full_sync();
                        report.events.push(GameStateEvent::Executed {
                            tick,
                            client: Some(client),
                            event: event.clone(),
                            outcome,
                        });
                        false
                    }
                    Err(error) if error.is_validation_failure() => {
                        debug!(%client, event = event.as_snake_case(), %error, "event deferred");
                        true
                    }
                    Err(error) => {
                        warn!(
                            %client,
                            event = event.as_snake_case(),
                            %error,
                            code = error.error_code(),
                            "event failed while applying"
                        );
                        report.events.push(GameStateEvent::Dropped {
                            tick,
                            client: Some(client),
                            event: event.clone(),
                            error: error.to_string(),
                        });
                        false
                    }
                }
            });
        }

        let holder = match GameEngine::new(state).current_actor() {
            Ok(entity) => Some((entity.id, entity.role)),
            Err(error) if error.severity().is_internal() => {
                warn!(%error, code = error.error_code(), tick, "turn holder unavailable");
                None
            }
            Err(error) => {
                trace!(%error, tick, "nobody to act");
                None
            }
        };
        if let Some((holder, role)) = holder {
            match role {
                Role::Player { client } => {
                    if let Some(event) = inboxes
                        .get_mut(&client)
                        .and_then(ClientInbox::take_oldest_action)
                    {
                        Self::attempt_action(
                            state,
                            &env,
                            tick,
                            client,
                            holder,
                            event,
                            &mut report,
                        );
                    }
                }
                Role::Enemy { .. } => {
                    Self::run_npc(state, &env, behavior, tick, holder, &mut report);
                }
            }
        }

        if let Some(next) = GameEngine::new(state).advance_turn() {
            info!(entity = %next, tick, "turn passed");
            report.turn_passed_to = Some(next);
        }

        let changes = state.changes.take();
        report.sync = if full_sync {
            Some(SyncMessage::Snapshot(LevelSnapshot::capture(state, tick)?))
        } else if !changes.is_empty() {
            Some(SyncMessage::Delta(LevelChanged::from_changes(
                state, &changes, tick,
            )?))
        } else {
            None
        };

        Ok(report)
    }

    /// One attempt at the holder's queued action; the event is gone afterwards
    /// whatever the result.
    fn attempt_action(
        state: &mut GameState,
        env: &GameEnv<'_>,
        tick: u64,
        client: ClientId,
        holder: EntityId,
        event: Event,
        report: &mut TickReport,
    ) {
        let actor = event.as_action().map(|action| action.actor());
        if actor != Some(holder) {
            debug!(%client, %holder, ?actor, "action issued for another entity discarded");
            report.events.push(GameStateEvent::Dropped {
                tick,
                client: Some(client),
                event,
                error: format!("action is not for {holder}"),
            });
            return;
        }

        match GameEngine::new(state).execute(env, &event) {
            Ok(outcome) => {
                debug!(%client, event = event.as_snake_case(), ?outcome, "action executed");
                report.events.push(GameStateEvent::Executed {
                    tick,
                    client: Some(client),
                    event,
                    outcome,
                });
            }
            Err(error) => {
                debug!(%client, event = event.as_snake_case(), %error, "action discarded");
                report.events.push(GameStateEvent::Dropped {
                    tick,
                    client: Some(client),
                    event,
                    error: error.to_string(),
                });
            }
        }
    }

    /// Lets an enemy act. A decision that fails to execute turns into a
    /// forfeit so a stuck enemy cannot hold the turn forever.
    fn run_npc(
        state: &mut GameState,
        env: &GameEnv<'_>,
        behavior: &NpcBehavior,
        tick: u64,
        npc: EntityId,
        report: &mut TickReport,
    ) {
        let decision = behavior.decide(state, env, npc);
        let mut event = decision.into_event(npc);
        let mut result = GameEngine::new(state).execute(env, &event);

        if let Err(error) = &result {
            if decision != NpcDecision::Forfeit {
                debug!(%npc, ?decision, %error, "enemy decision failed, forfeiting");
                event = NpcDecision::Forfeit.into_event(npc);
                result = GameEngine::new(state).execute(env, &event);
            }
        }

        match result {
            Ok(outcome) => {
                trace!(%npc, ?decision, "enemy acted");
                report.events.push(GameStateEvent::Executed {
                    tick,
                    client: None,
                    event,
                    outcome,
                });
            }
            Err(error) => {
                warn!(%npc, %error, "enemy could not act");
            }
        }
    }
}
