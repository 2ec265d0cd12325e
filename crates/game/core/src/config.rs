/// Game configuration constants and tunable parameters.
///
/// Every field has a default so partially specified TOML files load cleanly.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    /// Fixed pixel width of a tile.
    pub tile_width: u32,
    /// Fixed pixel height of a tile.
    pub tile_height: u32,
    /// Action points granted at the start of every turn.
    pub max_action_points: u32,
    /// Cost of a single step before equipment modifiers.
    pub base_action_cost: u32,
    /// Cost of a single attack.
    pub attack_cost: u32,
    /// Stats given to freshly joined players.
    pub player: PlayerTemplate,
}

impl GameConfig {
    // ===== compile-time constants used as type parameters =====
    pub const MAX_OCCUPANTS_PER_TILE: usize = 4;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_TILE_SIZE: u32 = 64;
    pub const DEFAULT_MAX_ACTION_POINTS: u32 = 4;
    pub const DEFAULT_BASE_ACTION_COST: u32 = 1;
    pub const DEFAULT_ATTACK_COST: u32 = 1;
    pub const DEFAULT_VIEW_DISTANCE: f32 = 8.5;

    pub fn new() -> Self {
        Self {
            tile_width: Self::DEFAULT_TILE_SIZE,
            tile_height: Self::DEFAULT_TILE_SIZE,
            max_action_points: Self::DEFAULT_MAX_ACTION_POINTS,
            base_action_cost: Self::DEFAULT_BASE_ACTION_COST,
            attack_cost: Self::DEFAULT_ATTACK_COST,
            player: PlayerTemplate::default(),
        }
    }

    pub fn with_tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = width;
        self.tile_height = height;
        self
    }

    pub fn with_max_action_points(mut self, max_action_points: u32) -> Self {
        self.max_action_points = max_action_points;
        self
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Starting stats for player-controlled entities.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlayerTemplate {
    pub max_health: u32,
    pub dexterity: i32,
    pub reach: u32,
    pub attack_power: u32,
    pub view_distance: f32,
}

impl Default for PlayerTemplate {
    fn default() -> Self {
        Self {
            max_health: 40,
            dexterity: 3,
            reach: 1,
            attack_power: 4,
            view_distance: GameConfig::DEFAULT_VIEW_DISTANCE,
        }
    }
}
