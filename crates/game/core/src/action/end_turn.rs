use crate::action::ActionTransition;
use crate::env::GameEnv;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityFields, EntityId, GameState};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EndTurnError {
    #[error("actor {0} not found")]
    ActorNotFound(EntityId),
}

impl GameError for EndTurnError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Internal
    }

    fn error_code(&self) -> &'static str {
        "END_TURN_ACTOR_NOT_FOUND"
    }
}

/// Voluntarily gives up the rest of the turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EndTurnAction {
    pub actor: EntityId,
}

impl EndTurnAction {
    pub fn new(actor: EntityId) -> Self {
        Self { actor }
    }
}

impl ActionTransition for EndTurnAction {
    type Error = EndTurnError;
    type Result = ();

    fn validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        state
            .entities
            .get(self.actor)
            .map(|_| ())
            .ok_or(EndTurnError::ActorNotFound(self.actor))
    }

    fn apply(&self, state: &mut GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        state
            .entities
            .get_mut(self.actor)
            .ok_or(EndTurnError::ActorNotFound(self.actor))?
            .exhaust();
        state
            .changes
            .record_entity(self.actor, EntityFields::ACTION_POINTS);
        Ok(())
    }
}
