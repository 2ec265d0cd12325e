use crate::action::ActionTransition;
use crate::env::GameEnv;
use crate::error::{ErrorSeverity, GameError};
use crate::geometry::{is_blocked, pixel_distance, within_reach};
use crate::rng::compute_seed;
use crate::state::{EntityFields, EntityId, GameState, Position, TileFields};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AttackError {
    #[error("attacker {0} not found")]
    AttackerNotFound(EntityId),

    #[error("target {0} not found")]
    TargetNotFound(EntityId),

    #[error("entity {0} cannot attack itself")]
    SelfTarget(EntityId),

    #[error("target {0} is already defeated")]
    TargetDefeated(EntityId),

    #[error("target at {target} is beyond reach {reach} from {origin}")]
    OutOfReach {
        origin: Position,
        target: Position,
        reach: u32,
    },

    #[error("line from {origin} to {target} is blocked")]
    LineBlocked { origin: Position, target: Position },
}

impl GameError for AttackError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::OutOfReach { .. } | Self::LineBlocked { .. } => ErrorSeverity::Recoverable,
            Self::SelfTarget(_) | Self::TargetDefeated(_) => ErrorSeverity::Validation,
            Self::AttackerNotFound(_) | Self::TargetNotFound(_) => ErrorSeverity::Internal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::AttackerNotFound(_) => "ATTACK_ATTACKER_NOT_FOUND",
            Self::TargetNotFound(_) => "ATTACK_TARGET_NOT_FOUND",
            Self::SelfTarget(_) => "ATTACK_SELF_TARGET",
            Self::TargetDefeated(_) => "ATTACK_TARGET_DEFEATED",
            Self::OutOfReach { .. } => "ATTACK_OUT_OF_REACH",
            Self::LineBlocked { .. } => "ATTACK_LINE_BLOCKED",
        }
    }
}

/// Strike another living entity within reach.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackAction {
    pub actor: EntityId,
    pub target: EntityId,
}

impl AttackAction {
    pub fn new(actor: EntityId, target: EntityId) -> Self {
        Self { actor, target }
    }
}

/// Result of a resolved attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackOutcome {
    pub attacker: EntityId,
    pub target: EntityId,
    /// d100 roll compared against the attacker's accuracy.
    pub roll: u32,
    pub hit: bool,
    pub damage: u32,
    pub defeated: bool,
}

impl ActionTransition for AttackAction {
    type Error = AttackError;
    type Result = AttackOutcome;

    fn cost(&self, _state: &GameState, env: &GameEnv<'_>) -> u32 {
        env.config().attack_cost
    }

    fn validate(&self, state: &GameState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        let attacker = state
            .entities
            .get(self.actor)
            .ok_or(AttackError::AttackerNotFound(self.actor))?;
        if self.target == self.actor {
            return Err(AttackError::SelfTarget(self.actor));
        }
        let defender = state
            .entities
            .get(self.target)
            .ok_or(AttackError::TargetNotFound(self.target))?;
        if !defender.is_alive() {
            return Err(AttackError::TargetDefeated(self.target));
        }

        let origin = attacker.position;
        let target = defender.position;
        let distance = pixel_distance(env.config(), origin, target);
        if !within_reach(env.config(), attacker.stats.reach, distance) {
            return Err(AttackError::OutOfReach {
                origin,
                target,
                reach: attacker.stats.reach,
            });
        }
        if is_blocked(&state.grid, origin, target) {
            return Err(AttackError::LineBlocked { origin, target });
        }

        Ok(())
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<AttackOutcome, Self::Error> {
        let attacker = state
            .entities
            .get(self.actor)
            .ok_or(AttackError::AttackerNotFound(self.actor))?;
        let accuracy = attacker.equipment.accuracy();
        let power = attacker.stats.attack_power + attacker.equipment.damage_bonus();

        let seed = compute_seed(state.seed, state.nonce, self.actor.0, 0);
        let roll = env.rng().roll_d100(seed);
        let hit = roll <= accuracy;

        let defender = state
            .entities
            .get_mut(self.target)
            .ok_or(AttackError::TargetNotFound(self.target))?;
        let damage = if hit {
            let raw = power.saturating_sub(defender.equipment.physical_armor()).max(1);
            defender.health.drain(raw)
        } else {
            0
        };
        let defeated = !defender.is_alive();
        let position = defender.position;

        state.changes.record_entity(self.target, EntityFields::HEALTH);

        if defeated {
            state.turn.remove(self.target, &mut state.entities);
            state.grid.remove(position, self.target);
            state.entities.remove(self.target);
            state.changes.record_entity(self.target, EntityFields::DEFEATED);
            state.changes.record_tile(position, TileFields::OCCUPANTS);
        }

        Ok(AttackOutcome {
            attacker: self.actor,
            target: self.target,
            roll,
            hit,
            damage,
            defeated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::rng::{PcgRng, RngOracle};
    use crate::state::{
        ActorStats, BodyArmor, ClientId, Equipment, LivingEntity, Role, TerrainKind, TileField,
        Weapon,
    };

    fn fighter(state: &mut GameState, at: Position, reach: u32, health: u32) -> EntityId {
        let id = state.allocate_entity_id();
        let stats = ActorStats {
            max_health: health,
            dexterity: id.0 as i32,
            reach,
            attack_power: 5,
            view_distance: 6.0,
        };
        let entity = LivingEntity::new(
            id,
            format!("fighter-{}", id.0),
            Role::Player {
                client: ClientId(id.0),
            },
            at,
            stats,
            4,
        );
        assert!(state.spawn(entity));
        id
    }

    #[test]
    fn diagonal_attack_blocked_by_both_corners() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let mut state = GameState::new(TileField::new(3, 3), 1);
        let attacker = fighter(&mut state, Position::new(0, 0), 1, 10);
        let defender = fighter(&mut state, Position::new(1, 1), 1, 10);
        let action = AttackAction::new(attacker, defender);

        assert_eq!(action.validate(&state, &env), Ok(()));

        state.grid.set_terrain(Position::new(1, 0), TerrainKind::Wall);
        assert_eq!(action.validate(&state, &env), Ok(()));

        state.grid.set_terrain(Position::new(0, 1), TerrainKind::Wall);
        assert!(matches!(
            action.validate(&state, &env),
            Err(AttackError::LineBlocked { .. })
        ));
    }

    #[test]
    fn reach_bounds_the_attack() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let mut state = GameState::new(TileField::new(6, 1), 1);
        let archer = fighter(&mut state, Position::new(0, 0), 3, 10);
        let near = fighter(&mut state, Position::new(3, 0), 1, 10);
        let far = fighter(&mut state, Position::new(5, 0), 1, 10);

        assert_eq!(AttackAction::new(archer, near).validate(&state, &env), Ok(()));
        assert!(matches!(
            AttackAction::new(archer, far).validate(&state, &env),
            Err(AttackError::OutOfReach { reach: 3, .. })
        ));
        assert_eq!(
            AttackAction::new(archer, archer).validate(&state, &env),
            Err(AttackError::SelfTarget(archer))
        );
    }

    #[test]
    fn armor_reduces_damage_to_at_least_one() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let mut state = GameState::new(TileField::new(2, 1), 1);
        let attacker = fighter(&mut state, Position::new(0, 0), 1, 10);
        let defender = fighter(&mut state, Position::new(1, 0), 1, 10);
        state.entities.get_mut(defender).unwrap().equipment = Equipment {
            body: Some(BodyArmor {
                walk_cost_multiplier: 1.0,
                physical: 50,
                magic: 0,
            }),
            weapon: None,
        };

        let outcome = AttackAction::new(attacker, defender)
            .apply(&mut state, &env)
            .unwrap();

        assert!(outcome.hit, "unarmed attacks always land");
        assert_eq!(outcome.damage, 1);
        assert_eq!(state.entities.get(defender).unwrap().health.current, 9);
        assert!(
            state
                .changes
                .entity_fields(defender)
                .contains(EntityFields::HEALTH)
        );
    }

    #[test]
    fn miss_leaves_health_untouched() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let mut state = GameState::new(TileField::new(2, 1), 1);
        let attacker = fighter(&mut state, Position::new(0, 0), 1, 10);
        let defender = fighter(&mut state, Position::new(1, 0), 1, 10);
        state.entities.get_mut(attacker).unwrap().equipment = Equipment {
            body: None,
            weapon: Some(Weapon {
                accuracy: 0,
                damage_bonus: 3,
            }),
        };

        let outcome = AttackAction::new(attacker, defender)
            .apply(&mut state, &env)
            .unwrap();

        let expected_roll = PcgRng.roll_d100(compute_seed(1, 0, attacker.0, 0));
        assert_eq!(outcome.roll, expected_roll);
        assert!(!outcome.hit);
        assert_eq!(outcome.damage, 0);
        assert_eq!(state.entities.get(defender).unwrap().health.current, 10);
    }

    #[test]
    fn defeat_clears_tile_and_turn_order() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let mut state = GameState::new(TileField::new(2, 1), 1);
        let attacker = fighter(&mut state, Position::new(0, 0), 1, 10);
        let defender = fighter(&mut state, Position::new(1, 0), 1, 3);
        state.reset_turn_order();

        let outcome = AttackAction::new(attacker, defender)
            .apply(&mut state, &env)
            .unwrap();

        assert!(outcome.defeated);
        assert!(state.entities.get(defender).is_none());
        assert!(!state.turn.contains(defender));
        assert_eq!(state.grid.occupants(Position::new(1, 0)).count(), 0);
        assert!(
            state
                .changes
                .entity_fields(defender)
                .contains(EntityFields::DEFEATED)
        );
    }
}
