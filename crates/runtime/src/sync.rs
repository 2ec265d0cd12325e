//! Outbound state sync messages and the client-side mirror that applies them.
//!
//! After every tick the server turns its drained [`ChangeSet`] into either a
//! [`LevelChanged`] delta or, when a join or level change happened, a full
//! [`LevelSnapshot`]. Both carry a digest of the synced view so a
//! [`ClientMirror`] can tell when its copy has drifted.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use game_core::{
    ChangeSet, EntityFields, EntityId, GameState, LivingEntity, Position, Tile, TileFields,
    TurnScheduler,
};

use crate::api::{Result, RuntimeError};
use crate::utils::hash::state_digest;

/// Message pushed to clients through a [`crate::Transport`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SyncMessage {
    Snapshot(LevelSnapshot),
    Delta(LevelChanged),
}

impl SyncMessage {
    pub fn tick(&self) -> u64 {
        match self {
            SyncMessage::Snapshot(snapshot) => snapshot.tick,
            SyncMessage::Delta(delta) => delta.tick,
        }
    }

    pub fn digest(&self) -> &str {
        match self {
            SyncMessage::Snapshot(snapshot) => &snapshot.digest,
            SyncMessage::Delta(delta) => &delta.digest,
        }
    }
}

/// Whole level state, sent on join and level change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelSnapshot {
    pub tick: u64,
    pub digest: String,
    pub state: GameState,
}

impl LevelSnapshot {
    pub fn capture(state: &GameState, tick: u64) -> Result<Self> {
        Ok(Self {
            tick,
            digest: state_digest(state)?,
            state: state.clone(),
        })
    }
}

/// Objects that changed during one tick.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LevelChanged {
    pub tick: u64,
    pub digest: String,
    pub nonce: u64,
    pub turn: TurnScheduler,
    pub entities: Vec<EntityUpdate>,
    pub tiles: Vec<TileUpdate>,
}

/// Current value of a changed entity; `entity` is `None` once it is gone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EntityUpdate {
    pub id: EntityId,
    pub fields: EntityFields,
    pub entity: Option<LivingEntity>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileUpdate {
    pub position: Position,
    pub fields: TileFields,
    pub tile: Tile,
}

impl LevelChanged {
    /// Reads the current value of every object named in `changes`.
    pub fn from_changes(state: &GameState, changes: &ChangeSet, tick: u64) -> Result<Self> {
        let entities = changes
            .entities()
            .map(|(id, fields)| EntityUpdate {
                id,
                fields,
                entity: state.entities.get(id).cloned(),
            })
            .collect();

        let tiles = changes
            .tiles()
            .filter_map(|(position, fields)| {
                state.grid.tile_at(position).map(|tile| TileUpdate {
                    position,
                    fields,
                    tile: tile.clone(),
                })
            })
            .collect();

        Ok(Self {
            tick,
            digest: state_digest(state)?,
            nonce: state.nonce,
            turn: state.turn.clone(),
            entities,
            tiles,
        })
    }
}

#[derive(Debug, Error)]
pub enum MirrorError {
    #[error("delta for tick {tick} arrived before any snapshot")]
    NoSnapshot { tick: u64 },

    #[error("mirror diverged at tick {tick}: expected digest {expected}, computed {actual}")]
    Desync {
        tick: u64,
        expected: String,
        actual: String,
    },

    #[error(transparent)]
    Digest(#[from] RuntimeError),
}

/// Client-side render copy of the level.
///
/// The mirror only ever consumes sync messages; nothing it holds flows back
/// into the authoritative state.
#[derive(Clone, Debug, Default)]
pub struct ClientMirror {
    state: Option<GameState>,
    tick: u64,
}

impl ClientMirror {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    /// Tick of the last applied message.
    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Applies `message` and checks the result against its digest.
    ///
    /// On a desync the mirror keeps the diverged copy; the next snapshot
    /// replaces it.
    pub fn apply(&mut self, message: &SyncMessage) -> std::result::Result<(), MirrorError> {
        let state = match message {
            SyncMessage::Snapshot(snapshot) => self.state.insert(snapshot.state.clone()),
            SyncMessage::Delta(delta) => {
                let state = self
                    .state
                    .as_mut()
                    .ok_or(MirrorError::NoSnapshot { tick: delta.tick })?;
                Self::apply_delta(state, delta);
                state
            }
        };
        self.tick = message.tick();

        let actual = state_digest(state)?;
        if actual != message.digest() {
            return Err(MirrorError::Desync {
                tick: message.tick(),
                expected: message.digest().to_owned(),
                actual,
            });
        }
        Ok(())
    }

    fn apply_delta(state: &mut GameState, delta: &LevelChanged) {
        for update in &delta.entities {
            match &update.entity {
                Some(entity) => state.entities.insert(entity.clone()),
                None => {
                    state.entities.remove(update.id);
                }
            }
        }
        for update in &delta.tiles {
            if let Some(tile) = state.grid.tile_at_mut(update.position) {
                *tile = update.tile.clone();
            }
        }
        state.nonce = delta.nonce;
        state.turn = delta.turn.clone();
    }
}
