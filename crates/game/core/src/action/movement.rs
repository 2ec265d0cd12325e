use crate::action::ActionTransition;
use crate::env::GameEnv;
use crate::error::{ErrorSeverity, GameError};
use crate::state::{EntityId, GameState, Position};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoveError {
    #[error("actor {0} not found")]
    ActorNotFound(EntityId),

    #[error("actor {actor} is not on its recorded tile {position}")]
    NotOnTile { actor: EntityId, position: Position },

    #[error("destination {destination} is the current tile")]
    SameTile { destination: Position },

    #[error("destination {destination} is not adjacent to {origin}")]
    NotAdjacent {
        origin: Position,
        destination: Position,
    },

    #[error("destination {destination} is out of bounds")]
    OutOfBounds { destination: Position },

    #[error("destination {destination} is blocked")]
    Blocked { destination: Position },

    #[error("destination {destination} is occupied by {occupant}")]
    Occupied {
        destination: Position,
        occupant: EntityId,
    },

    #[error("occupancy desync for actor {actor} at {position}")]
    OccupancyDesync { actor: EntityId, position: Position },
}

impl GameError for MoveError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Occupied { .. } => ErrorSeverity::Recoverable,
            Self::SameTile { .. }
            | Self::NotAdjacent { .. }
            | Self::OutOfBounds { .. }
            | Self::Blocked { .. } => ErrorSeverity::Validation,
            Self::ActorNotFound(_) | Self::NotOnTile { .. } | Self::OccupancyDesync { .. } => {
                ErrorSeverity::Internal
            }
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorNotFound(_) => "MOVE_ACTOR_NOT_FOUND",
            Self::NotOnTile { .. } => "MOVE_NOT_ON_TILE",
            Self::SameTile { .. } => "MOVE_SAME_TILE",
            Self::NotAdjacent { .. } => "MOVE_NOT_ADJACENT",
            Self::OutOfBounds { .. } => "MOVE_OUT_OF_BOUNDS",
            Self::Blocked { .. } => "MOVE_BLOCKED",
            Self::Occupied { .. } => "MOVE_OCCUPIED",
            Self::OccupancyDesync { .. } => "MOVE_OCCUPANCY_DESYNC",
        }
    }
}

/// Step onto one of the eight surrounding tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveAction {
    pub actor: EntityId,
    pub target: Position,
}

impl MoveAction {
    pub fn new(actor: EntityId, target: Position) -> Self {
        Self { actor, target }
    }
}

impl ActionTransition for MoveAction {
    type Error = MoveError;
    type Result = Position;

    /// Base step cost scaled by the body armor's walk multiplier, rounded up.
    fn cost(&self, state: &GameState, env: &GameEnv<'_>) -> u32 {
        let base = env.config().base_action_cost;
        let multiplier = state
            .entities
            .get(self.actor)
            .map_or(1.0, |entity| entity.equipment.walk_cost_multiplier());
        (base as f32 * multiplier).ceil().max(0.0) as u32
    }

    fn validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        let actor = state
            .entities
            .get(self.actor)
            .ok_or(MoveError::ActorNotFound(self.actor))?;
        let origin = actor.position;

        let on_tile = state
            .grid
            .tile_at(origin)
            .is_some_and(|tile| tile.contains(self.actor));
        if !on_tile {
            return Err(MoveError::NotOnTile {
                actor: self.actor,
                position: origin,
            });
        }

        let destination = self.target;
        if destination == origin {
            return Err(MoveError::SameTile { destination });
        }
        if !origin.is_adjacent(destination) {
            return Err(MoveError::NotAdjacent {
                origin,
                destination,
            });
        }

        let tile = state
            .grid
            .tile_at(destination)
            .ok_or(MoveError::OutOfBounds { destination })?;
        if !tile.is_passable() {
            return Err(MoveError::Blocked { destination });
        }
        if let Some(occupant) = state.blocker_at(destination) {
            return Err(MoveError::Occupied {
                destination,
                occupant: occupant.id,
            });
        }

        Ok(())
    }

    fn apply(&self, state: &mut GameState, _env: &GameEnv<'_>) -> Result<Position, Self::Error> {
        let origin = state
            .entities
            .get(self.actor)
            .ok_or(MoveError::ActorNotFound(self.actor))?
            .position;

        if !state.grid.move_occupant(self.actor, origin, self.target) {
            return Err(MoveError::OccupancyDesync {
                actor: self.actor,
                position: self.target,
            });
        }

        let actor = state
            .entities
            .get_mut(self.actor)
            .ok_or(MoveError::ActorNotFound(self.actor))?;
        actor.position = self.target;
        state.changes.record_move(self.actor, origin, self.target);

        Ok(origin)
    }

    fn post_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        let present = state
            .grid
            .tile_at(self.target)
            .is_some_and(|tile| tile.contains(self.actor));
        if present {
            Ok(())
        } else {
            Err(MoveError::OccupancyDesync {
                actor: self.actor,
                position: self.target,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::rng::PcgRng;
    use crate::state::{
        BodyArmor, ClientId, EnemyKind, Equipment, LivingEntity, Role, TerrainKind, TileField,
    };

    fn state_with_player(at: Position) -> (GameState, EntityId) {
        let mut state = GameState::new(TileField::new(5, 5), 0);
        let id = state.allocate_entity_id();
        let player = LivingEntity::new(
            id,
            "hero",
            Role::Player {
                client: ClientId(1),
            },
            at,
            (&GameConfig::default().player).into(),
            4,
        );
        assert!(state.spawn(player));
        (state, id)
    }

    #[test]
    fn adjacent_step_validates_and_moves() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let (mut state, id) = state_with_player(Position::new(2, 2));
        let action = MoveAction::new(id, Position::new(3, 1));

        assert_eq!(action.validate(&state, &env), Ok(()));
        assert_eq!(action.apply(&mut state, &env), Ok(Position::new(2, 2)));
        assert_eq!(action.post_validate(&state, &env), Ok(()));
        assert_eq!(state.entities.get(id).unwrap().position, Position::new(3, 1));
        assert_eq!(state.grid.occupants(Position::new(2, 2)).count(), 0);
    }

    #[test]
    fn same_tile_and_far_targets_are_rejected() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let (state, id) = state_with_player(Position::new(2, 2));

        assert!(matches!(
            MoveAction::new(id, Position::new(2, 2)).validate(&state, &env),
            Err(MoveError::SameTile { .. })
        ));
        assert!(matches!(
            MoveAction::new(id, Position::new(4, 2)).validate(&state, &env),
            Err(MoveError::NotAdjacent { .. })
        ));
        assert!(matches!(
            MoveAction::new(id, Position::new(3, 4)).validate(&state, &env),
            Err(MoveError::NotAdjacent { .. })
        ));
    }

    #[test]
    fn walls_edges_and_living_blockers_are_rejected() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let (mut state, id) = state_with_player(Position::new(0, 0));
        state.grid.set_terrain(Position::new(1, 0), TerrainKind::Wall);

        let blocker_id = state.allocate_entity_id();
        let blocker = LivingEntity::new(
            blocker_id,
            "warrior",
            Role::Enemy {
                kind: EnemyKind::Warrior,
            },
            Position::new(1, 1),
            EnemyKind::Warrior.stats(1).unwrap(),
            4,
        );
        assert!(state.spawn(blocker));

        let error = MoveAction::new(id, Position::new(-1, 0))
            .validate(&state, &env)
            .unwrap_err();
        assert_eq!(error.severity(), ErrorSeverity::Validation);
        assert!(matches!(
            MoveAction::new(id, Position::new(1, 0)).validate(&state, &env),
            Err(MoveError::Blocked { .. })
        ));
        assert_eq!(
            MoveAction::new(id, Position::new(1, 1)).validate(&state, &env),
            Err(MoveError::Occupied {
                destination: Position::new(1, 1),
                occupant: blocker_id,
            })
        );
    }

    #[test]
    fn heavy_armor_rounds_cost_up() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let (mut state, id) = state_with_player(Position::new(2, 2));
        let action = MoveAction::new(id, Position::new(2, 3));
        assert_eq!(action.cost(&state, &env), 1);

        let entity = state.entities.get_mut(id).unwrap();
        entity.equipment = Equipment {
            body: Some(BodyArmor {
                walk_cost_multiplier: 1.5,
                physical: 2,
                magic: 0,
            }),
            weapon: None,
        };
        assert_eq!(action.cost(&state, &env), 2);
    }
}
