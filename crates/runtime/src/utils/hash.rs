//! State digests shared by the server and client mirrors.
//!
//! The digest covers exactly what sync messages carry: entities, turn order,
//! nonce, level index and each tile's terrain and occupants. Per-tick
//! visibility sets are left out since they are recomputed server-side and
//! never sent in deltas.

use serde::Serialize;
use sha2::{Digest, Sha256};

use game_core::{EntityId, EntityRegistry, GameState, Position, TerrainKind, TurnScheduler};

use crate::api::{Result, RuntimeError};

#[derive(Serialize)]
struct DigestView<'a> {
    level_index: u32,
    nonce: u64,
    entities: &'a EntityRegistry,
    turn: &'a TurnScheduler,
    tiles: Vec<(Position, TerrainKind, Vec<EntityId>)>,
}

/// SHA-256 of the bincode-encoded synced view of `state`, hex-encoded.
pub fn state_digest(state: &GameState) -> Result<String> {
    let view = DigestView {
        level_index: state.level_index,
        nonce: state.nonce,
        entities: &state.entities,
        turn: &state.turn,
        tiles: state
            .grid
            .tiles()
            .map(|tile| (tile.position(), tile.terrain(), tile.occupants().collect()))
            .collect(),
    };
    let bytes = bincode::serialize(&view).map_err(RuntimeError::Encode)?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::TileField;

    #[test]
    fn digest_is_stable_and_hex() {
        let state = GameState::new(TileField::new(3, 3), 7);
        let first = state_digest(&state).unwrap();
        assert_eq!(first, state_digest(&state).unwrap());
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn digest_ignores_visibility() {
        let mut state = GameState::new(TileField::new(3, 3), 7);
        let before = state_digest(&state).unwrap();
        state.grid.mark_seen(Position::new(1, 1), EntityId(4));
        assert_eq!(before, state_digest(&state).unwrap());

        state.nonce += 1;
        assert_ne!(before, state_digest(&state).unwrap());
    }
}
