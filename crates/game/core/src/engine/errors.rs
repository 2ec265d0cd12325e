//! Error types for the event execution pipeline.

use crate::action::{AttackError, EndTurnError, JoinError, MoveError, NextLevelError};
use crate::error::{ErrorSeverity, GameError};
use crate::state::EntityId;

/// Identifies which stage of the transition pipeline produced an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TransitionPhase {
    Validate,
    Apply,
    PostValidate,
}

impl TransitionPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransitionPhase::Validate => "validate",
            TransitionPhase::Apply => "apply",
            TransitionPhase::PostValidate => "post_validate",
        }
    }
}

/// Associates a transition phase with the underlying error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionPhaseError<E> {
    pub phase: TransitionPhase,
    pub error: E,
}

impl<E> TransitionPhaseError<E> {
    pub fn new(phase: TransitionPhase, error: E) -> Self {
        Self { phase, error }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TransitionPhaseError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} failed: {}", self.phase.as_str(), self.error)
    }
}

impl<E: std::fmt::Display + std::fmt::Debug> std::error::Error for TransitionPhaseError<E> {}

impl<E: GameError> GameError for TransitionPhaseError<E> {
    /// Anything that fails after validation passed is a broken invariant.
    fn severity(&self) -> ErrorSeverity {
        match self.phase {
            TransitionPhase::Validate => self.error.severity(),
            TransitionPhase::Apply | TransitionPhase::PostValidate => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        self.error.error_code()
    }
}

/// Errors surfaced while validating or executing an event.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExecuteError {
    #[error("move action failed: {0}")]
    Move(TransitionPhaseError<MoveError>),

    #[error("attack action failed: {0}")]
    Attack(TransitionPhaseError<AttackError>),

    #[error("end turn action failed: {0}")]
    EndTurn(TransitionPhaseError<EndTurnError>),

    #[error("join failed: {0}")]
    Join(TransitionPhaseError<JoinError>),

    #[error("next level failed: {0}")]
    NextLevel(TransitionPhaseError<NextLevelError>),

    #[error("invalid actor: {actor} does not hold the turn (active: {active:?})")]
    ActorNotCurrent {
        actor: EntityId,
        active: Option<EntityId>,
    },
}

impl ExecuteError {
    /// True if the event was rejected before any state was touched.
    pub fn is_validation_failure(&self) -> bool {
        match self {
            Self::Move(error) => error.phase == TransitionPhase::Validate,
            Self::Attack(error) => error.phase == TransitionPhase::Validate,
            Self::EndTurn(error) => error.phase == TransitionPhase::Validate,
            Self::Join(error) => error.phase == TransitionPhase::Validate,
            Self::NextLevel(error) => error.phase == TransitionPhase::Validate,
            Self::ActorNotCurrent { .. } => true,
        }
    }
}

impl GameError for ExecuteError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Move(error) => error.severity(),
            Self::Attack(error) => error.severity(),
            Self::EndTurn(error) => error.severity(),
            Self::Join(error) => error.severity(),
            Self::NextLevel(error) => error.severity(),
            Self::ActorNotCurrent { .. } => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Move(error) => error.error_code(),
            Self::Attack(error) => error.error_code(),
            Self::EndTurn(error) => error.error_code(),
            Self::Join(error) => error.error_code(),
            Self::NextLevel(error) => error.error_code(),
            Self::ActorNotCurrent { .. } => "EXECUTE_ACTOR_NOT_CURRENT",
        }
    }
}
