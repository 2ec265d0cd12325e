//! Event validation and execution pipeline.
//!
//! The [`GameEngine`] is the authoritative reducer for [`GameState`]. Every
//! state change, whether it comes from a connected client or from NPC
//! behavior, passes through the same validate/execute contract here.

mod errors;
mod transition;
mod turns;

pub use errors::{ExecuteError, TransitionPhase, TransitionPhaseError};
pub use turns::TurnError;

use crate::action::{Event, EventOutcome};
use crate::env::GameEnv;
use crate::state::{EntityFields, GameState};

/// Game engine that validates and executes events against a level.
pub struct GameEngine<'a> {
    state: &'a mut GameState,
}

impl<'a> GameEngine<'a> {
    pub fn new(state: &'a mut GameState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &GameState {
        self.state
    }

    /// Checks whether `event` is currently legal without mutating anything.
    ///
    /// Action events must come from the entity holding the turn.
    pub fn validate(&self, env: &GameEnv<'_>, event: &Event) -> Result<(), ExecuteError> {
        self.validate_actor(event)?;
        transition::validate_event(event, self.state, env)
    }

    /// Validates and executes `event`.
    ///
    /// Action events are charged their action-point cost after a successful
    /// apply. The nonce advances once per executed event.
    pub fn execute(
        &mut self,
        env: &GameEnv<'_>,
        event: &Event,
    ) -> Result<EventOutcome, ExecuteError> {
        self.validate_actor(event)?;

        let charge = event
            .as_action()
            .map(|action| (action.actor(), transition::action_cost(action, self.state, env)));

        let outcome = transition::execute_transition(event, self.state, env)?;

        if let Some((actor, cost)) = charge {
            if let Some(entity) = self.state.entities.get_mut(actor) {
                entity.spend(cost);
            }
            self.state
                .changes
                .record_entity(actor, EntityFields::ACTION_POINTS);
        }

        self.state.nonce += 1;
        tracing::trace!(event = event.as_snake_case(), nonce = self.state.nonce, "executed");
        Ok(outcome)
    }

    fn validate_actor(&self, event: &Event) -> Result<(), ExecuteError> {
        let Some(action) = event.as_action() else {
            return Ok(());
        };
        let actor = action.actor();
        if self.state.turn.is_active(actor) {
            Ok(())
        } else {
            Err(ExecuteError::ActorNotCurrent {
                actor,
                active: self.state.turn.active(),
            })
        }
    }
}
