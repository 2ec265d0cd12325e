use crate::action::ActionTransition;
use crate::env::GameEnv;
use crate::error::{ErrorSeverity, GameError};
use crate::geometry::refresh_visibility;
use crate::level::LevelError;
use crate::state::{ClientId, GameState};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum NextLevelError {
    #[error("no level catalog is attached")]
    CatalogUnavailable,

    #[error("{0} has not joined")]
    NotJoined(ClientId),

    #[error("level {current} is the last level")]
    NoNextLevel { current: u32 },

    #[error("level {index} has {available} start tiles for {needed} players")]
    NotEnoughStartTiles {
        index: u32,
        needed: usize,
        available: usize,
    },

    #[error(transparent)]
    Level(#[from] LevelError),
}

impl GameError for NextLevelError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotJoined(_) => ErrorSeverity::Recoverable,
            Self::NoNextLevel { .. } => ErrorSeverity::Validation,
            Self::CatalogUnavailable => ErrorSeverity::Internal,
            Self::NotEnoughStartTiles { .. } => ErrorSeverity::Fatal,
            Self::Level(error) => error.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::CatalogUnavailable => "NEXT_LEVEL_CATALOG_UNAVAILABLE",
            Self::NotJoined(_) => "NEXT_LEVEL_NOT_JOINED",
            Self::NoNextLevel { .. } => "NEXT_LEVEL_NONE",
            Self::NotEnoughStartTiles { .. } => "NEXT_LEVEL_NOT_ENOUGH_START_TILES",
            Self::Level(error) => error.error_code(),
        }
    }
}

/// A joined client asks to descend to the next level of the catalog.
///
/// Every living player is carried over onto the new level's start tiles, in
/// join order, with its health intact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NextLevelEvent {
    pub client: ClientId,
}

impl NextLevelEvent {
    pub fn new(client: ClientId) -> Self {
        Self { client }
    }
}

impl ActionTransition for NextLevelEvent {
    type Error = NextLevelError;
    type Result = u32;

    fn validate(&self, state: &GameState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        let levels = env.levels().ok_or(NextLevelError::CatalogUnavailable)?;
        if state.entities.player_of(self.client).is_none() {
            return Err(NextLevelError::NotJoined(self.client));
        }

        let index = state.level_index + 1;
        let next = levels.get(index).ok_or(NextLevelError::NoNextLevel {
            current: state.level_index,
        })?;

        let needed = state.entities.players().filter(|p| p.is_alive()).count();
        let successor = state.build_successor(env.config(), next, env.rng())?;
        let available = successor
            .start_tiles
            .iter()
            .filter(|position| successor.is_free(**position))
            .count();
        if available < needed {
            return Err(NextLevelError::NotEnoughStartTiles {
                index,
                needed,
                available,
            });
        }
        Ok(())
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<u32, Self::Error> {
        let levels = env.levels().ok_or(NextLevelError::CatalogUnavailable)?;
        let index = state.level_index + 1;
        let next = levels.get(index).ok_or(NextLevelError::NoNextLevel {
            current: state.level_index,
        })?;

        let mut successor = state.build_successor(env.config(), next, env.rng())?;

        // Registry iteration is by id, which is join order.
        let survivors = state.entities.players().filter(|player| player.is_alive());
        for player in survivors {
            let mut player = player.clone();
            let placed = successor.free_start_tile().is_some_and(|start| {
                player.position = start;
                successor.spawn(player)
            });
            if !placed {
                return Err(NextLevelError::NotEnoughStartTiles {
                    index,
                    needed: 1,
                    available: 0,
                });
            }
        }

        successor.reset_turn_order();
        refresh_visibility(&mut successor);
        // The old level stays in place unless every survivor found a tile.
        *state = successor;
        Ok(index)
    }
}
