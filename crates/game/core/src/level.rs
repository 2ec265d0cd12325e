//! Level construction from plain configuration data.
//!
//! Content crates deserialize a [`LevelCatalog`]; the core turns one entry into
//! a ready-to-play [`GameState`] with enemies placed and the turn order set.

use crate::config::GameConfig;
use crate::error::{ErrorSeverity, GameError};
use crate::rng::{RngOracle, compute_seed};
use crate::state::{EnemyKind, GameState, LivingEntity, Position, Role, TerrainKind, TileField};

/// Errors raised while building a level. All of them point at broken content.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error("level {index} has no tiles ({width}x{height})")]
    EmptyLevel { index: u32, width: u32, height: u32 },

    #[error("wall {position} lies outside level {index}")]
    WallOutOfBounds { index: u32, position: Position },

    #[error("start tile {position} lies outside level {index} or is not passable")]
    InvalidStartTile { index: u32, position: Position },

    #[error("enemy spawn {position} in level {index} is not a free floor tile")]
    InvalidSpawn { index: u32, position: Position },

    #[error("unknown enemy kind '{name}'")]
    UnknownEnemyKind { name: String },

    #[error("level {0} is not in the catalog")]
    UnknownLevel(u32),
}

impl GameError for LevelError {
    fn severity(&self) -> ErrorSeverity {
        ErrorSeverity::Fatal
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::EmptyLevel { .. } => "LEVEL_EMPTY",
            Self::WallOutOfBounds { .. } => "LEVEL_WALL_OUT_OF_BOUNDS",
            Self::InvalidStartTile { .. } => "LEVEL_INVALID_START_TILE",
            Self::InvalidSpawn { .. } => "LEVEL_INVALID_SPAWN",
            Self::UnknownEnemyKind { .. } => "LEVEL_UNKNOWN_ENEMY_KIND",
            Self::UnknownLevel(_) => "LEVEL_UNKNOWN",
        }
    }
}

/// Enemy placed when the level is built.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnemySpawn {
    pub position: Position,
    /// Enemy kind name, e.g. `"warrior"` or `"random"`.
    pub kind: String,
    /// Experience level used to scale stats.
    #[cfg_attr(feature = "serde", serde(default = "default_floor"))]
    pub floor: u32,
}

#[cfg(feature = "serde")]
fn default_floor() -> u32 {
    1
}

/// Layout of a single level.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelConfig {
    pub index: u32,
    pub width: u32,
    pub height: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub walls: Vec<Position>,
    /// Tiles where joining players appear, in order of preference.
    pub start_tiles: Vec<Position>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub enemies: Vec<EnemySpawn>,
}

/// Ordered list of levels; level `n + 1` follows level `n`.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LevelCatalog {
    pub levels: Vec<LevelConfig>,
}

impl LevelCatalog {
    pub fn new(levels: Vec<LevelConfig>) -> Self {
        Self { levels }
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Looks a level up by its `index` field.
    pub fn get(&self, index: u32) -> Option<&LevelConfig> {
        self.levels.iter().find(|level| level.index == index)
    }

    /// The level with the lowest index.
    pub fn first(&self) -> Option<&LevelConfig> {
        self.levels.iter().min_by_key(|level| level.index)
    }
}

impl GameState {
    /// Builds the tile field, places the level's enemies and initializes the
    /// turn order.
    pub fn from_level(
        config: &GameConfig,
        level: &LevelConfig,
        seed: u64,
        rng: &dyn RngOracle,
    ) -> Result<Self, LevelError> {
        let mut state = GameState::new(build_field(level)?, seed);
        state.level_index = level.index;
        state.start_tiles = level.start_tiles.clone();
        state.populate(config, level, rng)?;
        state.reset_turn_order();
        Ok(state)
    }

    /// Builds the state for `level` as the continuation of this session,
    /// keeping the seed, nonce and id allocator. Entities are not carried
    /// over; `self` is left untouched.
    pub fn build_successor(
        &self,
        config: &GameConfig,
        level: &LevelConfig,
        rng: &dyn RngOracle,
    ) -> Result<GameState, LevelError> {
        let grid = build_field(level)?;
        let mut next = GameState::new(grid, self.seed);
        next.nonce = self.nonce;
        next.next_entity_id = self.next_entity_id;
        next.level_index = level.index;
        next.start_tiles = level.start_tiles.clone();
        next.populate(config, level, rng)?;
        Ok(next)
    }

    fn populate(
        &mut self,
        config: &GameConfig,
        level: &LevelConfig,
        rng: &dyn RngOracle,
    ) -> Result<(), LevelError> {
        for (slot, spawn) in level.enemies.iter().enumerate() {
            let kind = resolve_kind(&spawn.kind, self.seed, level.index, slot, rng)?;
            let stats = kind.stats(spawn.floor).ok_or_else(|| LevelError::UnknownEnemyKind {
                name: spawn.kind.clone(),
            })?;

            if !self.is_free(spawn.position) {
                return Err(LevelError::InvalidSpawn {
                    index: level.index,
                    position: spawn.position,
                });
            }

            let id = self.allocate_entity_id();
            let entity = LivingEntity::new(
                id,
                kind.to_string(),
                Role::Enemy { kind },
                spawn.position,
                stats,
                config.max_action_points,
            );
            if !self.spawn(entity) {
                return Err(LevelError::InvalidSpawn {
                    index: level.index,
                    position: spawn.position,
                });
            }
        }
        Ok(())
    }
}

fn build_field(level: &LevelConfig) -> Result<TileField, LevelError> {
    if level.width == 0 || level.height == 0 {
        return Err(LevelError::EmptyLevel {
            index: level.index,
            width: level.width,
            height: level.height,
        });
    }

    let mut grid = TileField::new(level.width, level.height);
    for &wall in &level.walls {
        if !grid.set_terrain(wall, TerrainKind::Wall) {
            return Err(LevelError::WallOutOfBounds {
                index: level.index,
                position: wall,
            });
        }
    }
    for &start in &level.start_tiles {
        if !grid.passable(start) {
            return Err(LevelError::InvalidStartTile {
                index: level.index,
                position: start,
            });
        }
    }
    Ok(grid)
}

fn resolve_kind(
    name: &str,
    seed: u64,
    level: u32,
    slot: usize,
    rng: &dyn RngOracle,
) -> Result<EnemyKind, LevelError> {
    let kind: EnemyKind = name.parse().map_err(|_| LevelError::UnknownEnemyKind {
        name: name.to_owned(),
    })?;
    if kind != EnemyKind::Random {
        return Ok(kind);
    }
    let roll_seed = compute_seed(seed, u64::from(level), slot as u32, 0);
    Ok(EnemyKind::CONCRETE[rng.pick(roll_seed, EnemyKind::CONCRETE.len())])
}
