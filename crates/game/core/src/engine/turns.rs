use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityFields, EntityId, LivingEntity};

use super::GameEngine;

/// Errors that can occur during turn operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TurnError {
    #[error("no entity holds the turn")]
    NoActiveEntity,

    #[error("turn holder {0} is not registered")]
    HolderMissing(EntityId),
}

impl GameError for TurnError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NoActiveEntity => ErrorSeverity::Recoverable,
            Self::HolderMissing(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::NoActiveEntity => "TURN_NO_ACTIVE_ENTITY",
            Self::HolderMissing(_) => "TURN_HOLDER_MISSING",
        }
    }
}

/// Turn scheduling methods for GameEngine.
impl GameEngine<'_> {
    /// The entity whose turn it is.
    pub fn current_actor(&self) -> Result<&LivingEntity, TurnError> {
        let id = self.state.turn.active().ok_or(TurnError::NoActiveEntity)?;
        self.state
            .entities
            .get(id)
            .ok_or(TurnError::HolderMissing(id))
    }

    /// Passes the turn on once the holder is out of action points.
    ///
    /// Returns the entity that received the turn, if it changed hands.
    pub fn advance_turn(&mut self) -> Option<EntityId> {
        let next = self.state.turn.advance(&mut self.state.entities)?;
        self.state
            .changes
            .record_entity(next, EntityFields::ACTION_POINTS);
        tracing::debug!(entity = %next, "turn passed");
        Some(next)
    }
}
