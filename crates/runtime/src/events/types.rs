//! Event types for different topics.

use game_core::{ClientId, EntityId, EventOutcome};
use serde::{Deserialize, Serialize};

use crate::sync::SyncMessage;

/// Events emitted while the server works through client inboxes and NPC turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameStateEvent {
    /// An event passed validation and was applied.
    Executed {
        tick: u64,
        /// `None` for events issued by NPC behavior.
        client: Option<ClientId>,
        event: game_core::Event,
        outcome: EventOutcome,
    },

    /// An action was taken out of an inbox and discarded after failing.
    Dropped {
        tick: u64,
        client: Option<ClientId>,
        event: game_core::Event,
        error: String,
    },
}

/// The turn passed to a new entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnEvent {
    pub entity: EntityId,
    pub tick: u64,
}

/// A sync message left the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncEvent {
    Snapshot {
        tick: u64,
        digest: String,
    },
    Delta {
        tick: u64,
        digest: String,
        entities: usize,
        tiles: usize,
    },
}

impl From<&SyncMessage> for SyncEvent {
    fn from(message: &SyncMessage) -> Self {
        match message {
            SyncMessage::Snapshot(snapshot) => SyncEvent::Snapshot {
                tick: snapshot.tick,
                digest: snapshot.digest.clone(),
            },
            SyncMessage::Delta(delta) => SyncEvent::Delta {
                tick: delta.tick,
                digest: delta.digest.clone(),
                entities: delta.entities.len(),
                tiles: delta.tiles.len(),
            },
        }
    }
}
