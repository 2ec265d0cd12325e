use crate::action::ActionTransition;
use crate::env::GameEnv;
use crate::error::{ErrorSeverity, GameError};
use crate::geometry::reveal_for;
use crate::state::{
    ActorStats, ClientId, EntityFields, EntityId, GameState, LivingEntity, Position, Role,
};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JoinError {
    #[error("player name is empty")]
    EmptyName,

    #[error("{client} already controls {entity}")]
    AlreadyJoined { client: ClientId, entity: EntityId },

    #[error("no free start tile")]
    NoFreeStartTile,

    #[error("start tile {0} refused the new player")]
    SpawnFailed(Position),
}

impl GameError for JoinError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoFreeStartTile => ErrorSeverity::Recoverable,
            Self::EmptyName | Self::AlreadyJoined { .. } => ErrorSeverity::Validation,
            Self::SpawnFailed(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyName => "JOIN_EMPTY_NAME",
            Self::AlreadyJoined { .. } => "JOIN_ALREADY_JOINED",
            Self::NoFreeStartTile => "JOIN_NO_FREE_START_TILE",
            Self::SpawnFailed(_) => "JOIN_SPAWN_FAILED",
        }
    }
}

/// A client asks for a player entity in the current level.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JoinEvent {
    pub client: ClientId,
    pub name: String,
}

impl JoinEvent {
    pub fn new(client: ClientId, name: impl Into<String>) -> Self {
        Self {
            client,
            name: name.into(),
        }
    }
}

impl ActionTransition for JoinEvent {
    type Error = JoinError;
    type Result = EntityId;

    fn validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        if self.name.trim().is_empty() {
            return Err(JoinError::EmptyName);
        }
        if let Some(existing) = state.entities.player_of(self.client) {
            return Err(JoinError::AlreadyJoined {
                client: self.client,
                entity: existing.id,
            });
        }
        state
            .free_start_tile()
            .map(|_| ())
            .ok_or(JoinError::NoFreeStartTile)
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<EntityId, Self::Error> {
        let position = state.free_start_tile().ok_or(JoinError::NoFreeStartTile)?;
        let config = env.config();

        let id = state.allocate_entity_id();
        let player = LivingEntity::new(
            id,
            self.name.trim(),
            Role::Player {
                client: self.client,
            },
            position,
            ActorStats::from(&config.player),
            config.max_action_points,
        );
        if !state.spawn(player) {
            return Err(JoinError::SpawnFailed(position));
        }

        state.turn.insert(id, &mut state.entities);
        state.changes.record_entity(id, EntityFields::ACTION_POINTS);
        reveal_for(state, id);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::rng::PcgRng;
    use crate::state::TileField;

    fn lobby(start_tiles: &[Position]) -> GameState {
        let mut state = GameState::new(TileField::new(4, 4), 0);
        state.start_tiles = start_tiles.to_vec();
        state
    }

    #[test]
    fn join_takes_first_free_start_tile() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let mut state = lobby(&[Position::new(0, 0), Position::new(1, 0)]);

        let first = JoinEvent::new(ClientId(1), "ada");
        first.validate(&state, &env).unwrap();
        let a = first.apply(&mut state, &env).unwrap();

        let second = JoinEvent::new(ClientId(2), "bo");
        second.validate(&state, &env).unwrap();
        let b = second.apply(&mut state, &env).unwrap();

        assert_eq!(state.entities.get(a).unwrap().position, Position::new(0, 0));
        assert_eq!(state.entities.get(b).unwrap().position, Position::new(1, 0));
        assert_eq!(state.turn.active(), Some(a), "first joiner keeps the turn");
        assert!(
            state
                .grid
                .tile_at(Position::new(1, 1))
                .unwrap()
                .is_seen_by(b)
        );
    }

    #[test]
    fn join_rejects_empty_names_and_repeat_clients() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let mut state = lobby(&[Position::new(0, 0), Position::new(1, 0)]);

        assert_eq!(
            JoinEvent::new(ClientId(1), "  ").validate(&state, &env),
            Err(JoinError::EmptyName)
        );

        let id = JoinEvent::new(ClientId(1), "ada")
            .apply(&mut state, &env)
            .unwrap();
        assert_eq!(
            JoinEvent::new(ClientId(1), "ada").validate(&state, &env),
            Err(JoinError::AlreadyJoined {
                client: ClientId(1),
                entity: id,
            })
        );
    }

    #[test]
    fn full_start_area_is_recoverable() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let mut state = lobby(&[Position::new(0, 0)]);
        JoinEvent::new(ClientId(1), "ada")
            .apply(&mut state, &env)
            .unwrap();

        let error = JoinEvent::new(ClientId(2), "bo")
            .validate(&state, &env)
            .unwrap_err();
        assert_eq!(error, JoinError::NoFreeStartTile);
        assert!(error.severity().is_recoverable());
    }
}
