//! Tile grid: passability, occupancy and per-tick visibility.
//!
//! The grid performs no validation; callers in the action pipeline decide
//! whether a mutation is legal before asking the grid to perform it.

use std::collections::BTreeSet;

use arrayvec::ArrayVec;

use crate::config::GameConfig;

use super::{EntityId, Position};

type OccupantSlots = ArrayVec<EntityId, { GameConfig::MAX_OCCUPANTS_PER_TILE }>;

/// Canonical terrain classes for tiles.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TerrainKind {
    #[default]
    Floor,
    Wall,
}

impl TerrainKind {
    pub fn is_passable(self) -> bool {
        matches!(self, TerrainKind::Floor)
    }
}

/// One cell of the level.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tile {
    position: Position,
    terrain: TerrainKind,
    occupants: OccupantSlots,
    /// Living entities able to see this tile during the current tick.
    seen_by: BTreeSet<EntityId>,
}

impl Tile {
    pub fn new(position: Position, terrain: TerrainKind) -> Self {
        Self {
            position,
            terrain,
            occupants: OccupantSlots::new(),
            seen_by: BTreeSet::new(),
        }
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn terrain(&self) -> TerrainKind {
        self.terrain
    }

    pub fn is_passable(&self) -> bool {
        self.terrain.is_passable()
    }

    pub fn set_terrain(&mut self, terrain: TerrainKind) {
        self.terrain = terrain;
    }

    pub fn occupants(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.occupants.iter().copied()
    }

    pub fn is_occupied(&self) -> bool {
        !self.occupants.is_empty()
    }

    pub fn contains(&self, entity: EntityId) -> bool {
        self.occupants.contains(&entity)
    }

    pub fn seen_by(&self) -> &BTreeSet<EntityId> {
        &self.seen_by
    }

    pub fn is_seen_by(&self, entity: EntityId) -> bool {
        self.seen_by.contains(&entity)
    }

    fn add_occupant(&mut self, entity: EntityId) -> bool {
        if self.occupants.contains(&entity) {
            return true;
        }
        self.occupants.try_push(entity).is_ok()
    }

    fn remove_occupant(&mut self, entity: EntityId) -> bool {
        match self.occupants.iter().position(|occupant| *occupant == entity) {
            Some(index) => {
                self.occupants.remove(index);
                true
            }
            None => false,
        }
    }
}

/// Row-major 2-D collection owning every tile of a level.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TileField {
    width: u32,
    height: u32,
    tiles: Vec<Tile>,
}

impl TileField {
    /// Creates a field of the given size filled with floor tiles.
    pub fn new(width: u32, height: u32) -> Self {
        let tiles = (0..height as i32)
            .flat_map(|y| (0..width as i32).map(move |x| Position::new(x, y)))
            .map(|position| Tile::new(position, TerrainKind::Floor))
            .collect();

        Self {
            width,
            height,
            tiles,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0
            && position.y >= 0
            && position.x < self.width as i32
            && position.y < self.height as i32
    }

    fn index(&self, position: Position) -> Option<usize> {
        self.contains(position)
            .then(|| position.y as usize * self.width as usize + position.x as usize)
    }

    /// Bounds-checked lookup; `None` outside the field.
    pub fn tile_at(&self, position: Position) -> Option<&Tile> {
        self.index(position).map(|index| &self.tiles[index])
    }

    pub fn tile_at_mut(&mut self, position: Position) -> Option<&mut Tile> {
        self.index(position).map(|index| &mut self.tiles[index])
    }

    /// Out-of-bounds positions are never passable.
    pub fn passable(&self, position: Position) -> bool {
        self.tile_at(position).is_some_and(Tile::is_passable)
    }

    pub fn occupants(&self, position: Position) -> impl Iterator<Item = EntityId> + '_ {
        self.tile_at(position)
            .into_iter()
            .flat_map(|tile| tile.occupants())
    }

    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.iter()
    }

    pub fn set_terrain(&mut self, position: Position, terrain: TerrainKind) -> bool {
        match self.tile_at_mut(position) {
            Some(tile) => {
                tile.set_terrain(terrain);
                true
            }
            None => false,
        }
    }

    pub fn place(&mut self, position: Position, entity: EntityId) -> bool {
        self.tile_at_mut(position)
            .is_some_and(|tile| tile.add_occupant(entity))
    }

    pub fn remove(&mut self, position: Position, entity: EntityId) -> bool {
        self.tile_at_mut(position)
            .is_some_and(|tile| tile.remove_occupant(entity))
    }

    /// Moves an occupant between tiles, updating both occupancy sets.
    ///
    /// Returns false and leaves the field untouched when the entity is not on
    /// `from` or `to` cannot hold another occupant.
    pub fn move_occupant(&mut self, entity: EntityId, from: Position, to: Position) -> bool {
        if !self.remove(from, entity) {
            return false;
        }
        if !self.place(to, entity) {
            self.place(from, entity);
            return false;
        }
        true
    }

    /// Empties every tile's seen-by set at the start of a tick.
    pub fn clear_visibility(&mut self) {
        for tile in &mut self.tiles {
            tile.seen_by.clear();
        }
    }

    pub fn mark_seen(&mut self, position: Position, viewer: EntityId) {
        if let Some(tile) = self.tile_at_mut(position) {
            tile.seen_by.insert(viewer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_outside_bounds_is_none() {
        let field = TileField::new(3, 2);
        assert!(field.tile_at(Position::new(2, 1)).is_some());
        assert!(field.tile_at(Position::new(3, 0)).is_none());
        assert!(field.tile_at(Position::new(0, -1)).is_none());
        assert!(!field.passable(Position::new(-1, 0)));
    }

    #[test]
    fn move_updates_both_tiles() {
        let mut field = TileField::new(3, 3);
        let id = EntityId(7);
        assert!(field.place(Position::new(0, 0), id));

        assert!(field.move_occupant(id, Position::new(0, 0), Position::new(1, 1)));
        assert_eq!(field.occupants(Position::new(0, 0)).count(), 0);
        assert_eq!(
            field.occupants(Position::new(1, 1)).collect::<Vec<_>>(),
            vec![id]
        );
    }

    #[test]
    fn move_from_wrong_tile_is_rejected() {
        let mut field = TileField::new(3, 3);
        let id = EntityId(1);
        field.place(Position::new(2, 2), id);
        assert!(!field.move_occupant(id, Position::new(0, 0), Position::new(1, 0)));
        assert!(field.tile_at(Position::new(2, 2)).unwrap().contains(id));
    }

    #[test]
    fn visibility_is_cleared() {
        let mut field = TileField::new(2, 2);
        field.mark_seen(Position::new(1, 1), EntityId(3));
        assert!(field.tile_at(Position::new(1, 1)).unwrap().is_seen_by(EntityId(3)));
        field.clear_visibility();
        assert!(field.tiles().all(|tile| tile.seen_by().is_empty()));
    }
}
