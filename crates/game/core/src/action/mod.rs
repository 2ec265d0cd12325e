//! Event and action domain.
//!
//! Every request that can change the level is an [`Event`]. Events split into
//! two families with different processing policies:
//!
//! - [`Action`]s spend action points and are only evaluated for the entity
//!   holding the turn (`Move`, `Attack`, `EndTurn`).
//! - Non-action events are evaluated every tick regardless of the turn
//!   (`Join`, `NextLevel`).
//!
//! Each concrete variant implements [`ActionTransition`], the
//! cost/validate/apply contract the engine drives.

mod combat;
mod end_turn;
mod join;
mod movement;
mod next_level;

pub use combat::{AttackAction, AttackError, AttackOutcome};
pub use end_turn::{EndTurnAction, EndTurnError};
pub use join::{JoinError, JoinEvent};
pub use movement::{MoveAction, MoveError};
pub use next_level::{NextLevelError, NextLevelEvent};

use crate::env::GameEnv;
use crate::state::{ClientId, EntityId, GameState, Position};

/// Defines how a concrete event variant checks and mutates game state.
///
/// `validate` and `post_validate` must stay side-effect free. `apply` may
/// assume `validate` succeeded against the same state.
pub trait ActionTransition {
    type Error;
    type Result;

    /// Action points charged to the issuing entity. Non-action events cost 0.
    fn cost(&self, _state: &GameState, _env: &GameEnv<'_>) -> u32 {
        0
    }

    /// Validates pre-conditions using the state **before** mutation.
    fn validate(&self, state: &GameState, env: &GameEnv<'_>) -> Result<(), Self::Error>;

    /// Applies the event by mutating the game state directly.
    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<Self::Result, Self::Error>;

    /// Validates post-conditions using the state **after** mutation.
    fn post_validate(&self, _state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Turn-gated request issued by a living entity.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Move(MoveAction),
    Attack(AttackAction),
    EndTurn(EndTurnAction),
}

impl Action {
    /// The entity issuing this action.
    pub fn actor(&self) -> EntityId {
        match self {
            Action::Move(action) => action.actor,
            Action::Attack(action) => action.actor,
            Action::EndTurn(action) => action.actor,
        }
    }

    pub fn as_snake_case(&self) -> &'static str {
        match self {
            Action::Move(_) => "move",
            Action::Attack(_) => "attack",
            Action::EndTurn(_) => "end_turn",
        }
    }
}

/// Any request queued in a client inbox.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Event {
    Action(Action),
    Join(JoinEvent),
    NextLevel(NextLevelEvent),
}

impl Event {
    pub fn is_action(&self) -> bool {
        matches!(self, Event::Action(_))
    }

    pub fn as_action(&self) -> Option<&Action> {
        match self {
            Event::Action(action) => Some(action),
            _ => None,
        }
    }

    pub fn as_snake_case(&self) -> &'static str {
        match self {
            Event::Action(action) => action.as_snake_case(),
            Event::Join(_) => "join",
            Event::NextLevel(_) => "next_level",
        }
    }

    pub fn move_to(actor: EntityId, target: Position) -> Self {
        Event::Action(Action::Move(MoveAction::new(actor, target)))
    }

    pub fn attack(actor: EntityId, target: EntityId) -> Self {
        Event::Action(Action::Attack(AttackAction::new(actor, target)))
    }

    pub fn end_turn(actor: EntityId) -> Self {
        Event::Action(Action::EndTurn(EndTurnAction::new(actor)))
    }

    pub fn join(client: ClientId, name: impl Into<String>) -> Self {
        Event::Join(JoinEvent::new(client, name))
    }

    pub fn next_level(client: ClientId) -> Self {
        Event::NextLevel(NextLevelEvent::new(client))
    }
}

impl From<Action> for Event {
    fn from(action: Action) -> Self {
        Event::Action(action)
    }
}

/// What an executed event did, for logging and for choosing between a full
/// snapshot and a delta when syncing clients.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum EventOutcome {
    Moved {
        actor: EntityId,
        from: Position,
        to: Position,
    },
    Attacked(AttackOutcome),
    TurnEnded {
        actor: EntityId,
    },
    Joined {
        client: ClientId,
        entity: EntityId,
    },
    LevelLoaded {
        index: u32,
    },
}

impl EventOutcome {
    /// Joins and level changes replace the client's whole view.
    pub fn requires_full_sync(&self) -> bool {
        matches!(
            self,
            EventOutcome::Joined { .. } | EventOutcome::LevelLoaded { .. }
        )
    }
}
