//! Transition dispatch for every event variant.

use crate::action::{Action, ActionTransition, Event, EventOutcome};
use crate::env::GameEnv;
use crate::state::GameState;

use super::errors::{ExecuteError, TransitionPhase, TransitionPhaseError};

/// Runs validate, apply and post_validate in order.
#[inline]
fn drive_transition<T>(
    transition: &T,
    state: &mut GameState,
    env: &GameEnv<'_>,
) -> Result<T::Result, TransitionPhaseError<T::Error>>
where
    T: ActionTransition,
{
    transition
        .validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Validate, error))?;

    let result = transition
        .apply(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Apply, error))?;

    transition
        .post_validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::PostValidate, error))?;

    Ok(result)
}

#[inline]
fn validate_only<T>(
    transition: &T,
    state: &GameState,
    env: &GameEnv<'_>,
) -> Result<(), TransitionPhaseError<T::Error>>
where
    T: ActionTransition,
{
    transition
        .validate(state, env)
        .map_err(|error| TransitionPhaseError::new(TransitionPhase::Validate, error))
}

pub(super) fn validate_event(
    event: &Event,
    state: &GameState,
    env: &GameEnv<'_>,
) -> Result<(), ExecuteError> {
    match event {
        Event::Action(Action::Move(t)) => validate_only(t, state, env).map_err(ExecuteError::Move),
        Event::Action(Action::Attack(t)) => {
            validate_only(t, state, env).map_err(ExecuteError::Attack)
        }
        Event::Action(Action::EndTurn(t)) => {
            validate_only(t, state, env).map_err(ExecuteError::EndTurn)
        }
        Event::Join(t) => validate_only(t, state, env).map_err(ExecuteError::Join),
        Event::NextLevel(t) => validate_only(t, state, env).map_err(ExecuteError::NextLevel),
    }
}

pub(super) fn action_cost(action: &Action, state: &GameState, env: &GameEnv<'_>) -> u32 {
    match action {
        Action::Move(t) => t.cost(state, env),
        Action::Attack(t) => t.cost(state, env),
        Action::EndTurn(t) => t.cost(state, env),
    }
}

pub(super) fn execute_transition(
    event: &Event,
    state: &mut GameState,
    env: &GameEnv<'_>,
) -> Result<EventOutcome, ExecuteError> {
    match event {
        Event::Action(Action::Move(t)) => {
            let from = drive_transition(t, state, env).map_err(ExecuteError::Move)?;
            Ok(EventOutcome::Moved {
                actor: t.actor,
                from,
                to: t.target,
            })
        }
        Event::Action(Action::Attack(t)) => {
            let outcome = drive_transition(t, state, env).map_err(ExecuteError::Attack)?;
            Ok(EventOutcome::Attacked(outcome))
        }
        Event::Action(Action::EndTurn(t)) => {
            drive_transition(t, state, env).map_err(ExecuteError::EndTurn)?;
            Ok(EventOutcome::TurnEnded { actor: t.actor })
        }
        Event::Join(t) => {
            let entity = drive_transition(t, state, env).map_err(ExecuteError::Join)?;
            Ok(EventOutcome::Joined {
                client: t.client,
                entity,
            })
        }
        Event::NextLevel(t) => {
            let index = drive_transition(t, state, env).map_err(ExecuteError::NextLevel)?;
            Ok(EventOutcome::LevelLoaded { index })
        }
    }
}
