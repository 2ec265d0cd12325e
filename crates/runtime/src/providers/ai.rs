//! Enemy behavior: strike when possible, otherwise close in, otherwise give up
//! the turn.
//!
//! Decisions are pure reads of the state; the server executes the resulting
//! event through the engine like any client request.

use game_core::{
    ActionTransition, AttackAction, EntityId, Event, GameEnv, GameState, LivingEntity,
    Pathfinder, Position,
};

/// What an enemy does with one tick of its turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NpcDecision {
    Attack { target: EntityId },
    Step { to: Position },
    /// Drop the remaining action points so the turn passes on.
    Forfeit,
}

impl NpcDecision {
    pub fn into_event(self, npc: EntityId) -> Event {
        match self {
            NpcDecision::Attack { target } => Event::attack(npc, target),
            NpcDecision::Step { to } => Event::move_to(npc, to),
            NpcDecision::Forfeit => Event::end_turn(npc),
        }
    }
}

/// Chases and attacks the nearest player the enemy can currently see.
#[derive(Debug, Default)]
pub struct NpcBehavior {
    pathfinder: Pathfinder,
}

impl NpcBehavior {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_pathfinder(pathfinder: Pathfinder) -> Self {
        Self { pathfinder }
    }

    /// Picks one event for `npc`, which must hold the turn.
    ///
    /// Relies on the tiles' seen-by sets being current for this tick.
    pub fn decide(&self, state: &GameState, env: &GameEnv<'_>, npc: EntityId) -> NpcDecision {
        let Some(origin) = state.entities.get(npc).map(|entity| entity.position) else {
            return NpcDecision::Forfeit;
        };
        let Some((target, goal)) = nearest_visible_player(state, npc, origin) else {
            return NpcDecision::Forfeit;
        };

        if AttackAction::new(npc, target).validate(state, env).is_ok() {
            return NpcDecision::Attack { target };
        }

        match self.next_step(state, origin, goal) {
            Some(step) => NpcDecision::Step { to: step },
            None => NpcDecision::Forfeit,
        }
    }

    /// First tile of a route to `goal` that avoids standing entities.
    ///
    /// `None` when there is no route or the only step left is the goal itself.
    fn next_step(&self, state: &GameState, origin: Position, goal: Position) -> Option<Position> {
        let entities = &state.entities;
        let path = self
            .pathfinder
            .shortest_path(&state.grid, origin, goal, |tile| {
                tile.is_passable()
                    && tile
                        .occupants()
                        .all(|id| !entities.get(id).is_some_and(LivingEntity::blocks_tile))
            });

        match path {
            Ok(path) => path.first().copied().filter(|step| *step != goal),
            Err(error) => {
                tracing::warn!(%origin, %goal, %error, "path search rejected its endpoints");
                None
            }
        }
    }
}

fn nearest_visible_player(
    state: &GameState,
    npc: EntityId,
    origin: Position,
) -> Option<(EntityId, Position)> {
    state
        .entities
        .living()
        .filter(|entity| entity.is_player())
        .filter(|entity| {
            state
                .grid
                .tile_at(entity.position)
                .is_some_and(|tile| tile.is_seen_by(npc))
        })
        .map(|entity| (origin.euclidean_distance(entity.position), entity.id, entity.position))
        .min_by(|a, b| a.0.total_cmp(&b.0).then_with(|| a.1.cmp(&b.1)))
        .map(|(_, id, position)| (id, position))
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_core::{
        ClientId, EnemySpawn, GameConfig, GameEngine, LevelConfig, PcgRng, refresh_visibility,
    };

    fn level(walls: Vec<Position>, start: Position, enemy: Position) -> GameState {
        let level = LevelConfig {
            index: 0,
            width: 5,
            height: 5,
            walls,
            start_tiles: vec![start],
            enemies: vec![EnemySpawn {
                position: enemy,
                kind: "warrior".into(),
                floor: 1,
            }],
        };
        let config = GameConfig::default();
        let mut state = GameState::from_level(&config, &level, 3, &PcgRng).unwrap();
        GameEngine::new(&mut state)
            .execute(
                &GameEnv::new(&config, &PcgRng),
                &Event::join(ClientId(1), "ada"),
            )
            .unwrap();
        refresh_visibility(&mut state);
        state
    }

    fn player_of(state: &GameState) -> EntityId {
        state.entities.player_of(ClientId(1)).unwrap().id
    }

    #[test]
    fn adjacent_player_is_attacked() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let state = level(Vec::new(), Position::new(0, 0), Position::new(1, 1));
        let npc = state.turn.active().unwrap();
        let player = player_of(&state);

        let decision = NpcBehavior::new().decide(&state, &env, npc);
        assert_eq!(decision, NpcDecision::Attack { target: player });
        assert_eq!(decision.into_event(npc), Event::attack(npc, player));
    }

    #[test]
    fn distant_player_is_approached() {
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let state = level(Vec::new(), Position::new(0, 0), Position::new(4, 4));
        let npc = state.turn.active().unwrap();

        let decision = NpcBehavior::new().decide(&state, &env, npc);
        assert_eq!(
            decision,
            NpcDecision::Step {
                to: Position::new(3, 3)
            }
        );
    }

    #[test]
    fn hidden_player_forfeits_the_turn() {
        let wall = (0..5).map(|y| Position::new(2, y)).collect();
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let state = level(wall, Position::new(0, 0), Position::new(4, 4));
        let npc = state.turn.active().unwrap();

        assert_eq!(
            NpcBehavior::new().decide(&state, &env, npc),
            NpcDecision::Forfeit
        );
    }

    #[test]
    fn walled_corners_hide_diagonal_player() {
        let walls = vec![Position::new(1, 0), Position::new(0, 1)];
        let config = GameConfig::default();
        let env = GameEnv::new(&config, &PcgRng);
        let state = level(walls, Position::new(0, 0), Position::new(1, 1));
        let npc = state.turn.active().unwrap();

        // both corner tiles are walls, so the player is out of sight
        assert_eq!(
            NpcBehavior::new().decide(&state, &env, npc),
            NpcDecision::Forfeit
        );
    }
}
