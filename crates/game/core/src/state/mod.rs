//! Authoritative game state representation.
//!
//! This module owns the data structures that describe the tile grid, living
//! entities, turn bookkeeping and pending change records. Runtime layers clone
//! or query this state but mutate it exclusively through the engine.
pub mod changes;
pub mod common;
pub mod entities;
pub mod grid;
pub mod turn;

pub use changes::{ChangeSet, EntityFields, TileFields};
pub use common::{ClientId, EntityId, Position, ResourceMeter};
pub use entities::{
    ActorStats, BodyArmor, EnemyKind, EntityRegistry, Equipment, LivingEntity, Role, Weapon,
};
pub use grid::{TerrainKind, Tile, TileField};
pub use turn::TurnScheduler;

/// Canonical snapshot of one level's simulation state.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameState {
    /// RNG seed for deterministic random generation.
    ///
    /// Set once per session. Combined with `nonce` to derive a unique seed
    /// for each random roll.
    pub seed: u64,

    /// Number of events executed so far; increments once per execution.
    pub nonce: u64,

    /// Index of the level currently loaded.
    pub level_index: u32,

    /// Sequential entity ID allocator (monotonically increasing, never reused).
    pub(crate) next_entity_id: u32,

    /// Tiles where joining players appear, in order of preference.
    pub start_tiles: Vec<Position>,

    pub grid: TileField,
    pub entities: EntityRegistry,
    pub turn: TurnScheduler,

    /// Objects changed since the runtime last drained this set.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub changes: ChangeSet,
}

impl GameState {
    /// Creates a state around an existing grid with no entities.
    pub fn new(grid: TileField, seed: u64) -> Self {
        Self {
            seed,
            nonce: 0,
            level_index: 0,
            next_entity_id: 1,
            start_tiles: Vec::new(),
            grid,
            entities: EntityRegistry::new(),
            turn: TurnScheduler::default(),
            changes: ChangeSet::new(),
        }
    }

    /// Allocates a new unique EntityId.
    pub fn allocate_entity_id(&mut self) -> EntityId {
        let id = EntityId(self.next_entity_id);
        self.next_entity_id = self.next_entity_id.wrapping_add(1);
        id
    }

    /// Registers `entity` and puts it on its tile.
    ///
    /// Returns false if the tile does not exist or cannot hold another
    /// occupant; the entity is not registered in that case. The turn order is
    /// left untouched.
    pub fn spawn(&mut self, entity: LivingEntity) -> bool {
        let id = entity.id;
        let position = entity.position;
        if !self.grid.place(position, id) {
            return false;
        }
        self.entities.insert(entity);
        self.changes.record_entity(id, EntityFields::SPAWNED);
        self.changes.record_tile(position, TileFields::OCCUPANTS);
        true
    }

    /// Living entity standing on `position`, if any.
    pub fn blocker_at(&self, position: Position) -> Option<&LivingEntity> {
        self.grid
            .occupants(position)
            .filter_map(|id| self.entities.get(id))
            .find(|entity| entity.blocks_tile())
    }

    /// True if the tile exists, is passable and holds no blocking entity.
    pub fn is_free(&self, position: Position) -> bool {
        self.grid.passable(position) && self.blocker_at(position).is_none()
    }

    /// First start tile that can take a new player.
    pub fn free_start_tile(&self) -> Option<Position> {
        self.start_tiles
            .iter()
            .copied()
            .find(|position| self.is_free(*position))
    }

    /// Rebuilds the turn order from every living entity.
    pub fn reset_turn_order(&mut self) {
        self.turn = TurnScheduler::initialize(&mut self.entities);
        let ids: Vec<EntityId> = self.entities.iter().map(|entity| entity.id).collect();
        for id in ids {
            self.changes.record_entity(id, EntityFields::ACTION_POINTS);
        }
    }
}
