//! Bookkeeping of which grid objects changed since the last sync.
//!
//! The engine records every mutation here; the runtime drains the set once
//! per tick and turns it into a delta for connected clients.

use std::collections::BTreeMap;

use bitflags::bitflags;

use super::{EntityId, Position};

bitflags! {
    /// Tracks which fields of a [`super::LivingEntity`] changed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct EntityFields: u8 {
        const POSITION      = 1 << 0;
        const HEALTH        = 1 << 1;
        const ACTION_POINTS = 1 << 2;
        const SPAWNED       = 1 << 3;
        const DEFEATED      = 1 << 4;
    }
}

bitflags! {
    /// Tracks which fields of a [`super::Tile`] changed.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct TileFields: u8 {
        const OCCUPANTS = 1 << 0;
        const TERRAIN   = 1 << 1;
    }
}

/// Accumulated change masks keyed by object.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChangeSet {
    entities: BTreeMap<EntityId, EntityFields>,
    tiles: BTreeMap<Position, TileFields>,
}

impl ChangeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_entity(&mut self, id: EntityId, fields: EntityFields) {
        *self.entities.entry(id).or_default() |= fields;
    }

    pub fn record_tile(&mut self, position: Position, fields: TileFields) {
        *self.tiles.entry(position).or_default() |= fields;
    }

    /// Records a step from `from` to `to` for `id`.
    pub fn record_move(&mut self, id: EntityId, from: Position, to: Position) {
        self.record_entity(id, EntityFields::POSITION);
        self.record_tile(from, TileFields::OCCUPANTS);
        self.record_tile(to, TileFields::OCCUPANTS);
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityId, EntityFields)> + '_ {
        self.entities.iter().map(|(id, fields)| (*id, *fields))
    }

    pub fn tiles(&self) -> impl Iterator<Item = (Position, TileFields)> + '_ {
        self.tiles.iter().map(|(position, fields)| (*position, *fields))
    }

    pub fn entity_fields(&self, id: EntityId) -> EntityFields {
        self.entities.get(&id).copied().unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.tiles.is_empty()
    }

    /// Moves the accumulated changes out, leaving an empty set behind.
    pub fn take(&mut self) -> ChangeSet {
        std::mem::take(self)
    }
}
