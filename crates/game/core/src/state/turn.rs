use super::{EntityId, EntityRegistry};

/// Round-robin turn order over living entities.
///
/// Entities are sorted ascending by dexterity and the active index starts at
/// the last (highest-dexterity) slot, then walks forward and wraps. After the
/// first wrap the order is therefore lowest-first again; this mirrors the
/// established turn policy and is kept as-is.
///
/// # Invariants
///
/// - `active < order.len()` whenever `order` is non-empty
/// - only the active entity holds action points, except right after a refill
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TurnScheduler {
    order: Vec<EntityId>,
    active: usize,
}

impl TurnScheduler {
    /// Builds the order from every living entity and grants the first turn.
    pub fn initialize(entities: &mut EntityRegistry) -> Self {
        let mut order: Vec<_> = entities
            .living()
            .map(|entity| (entity.stats.dexterity, entity.id))
            .collect();
        // Stable sort keeps id order among equal dexterity.
        order.sort_by_key(|(dexterity, _)| *dexterity);

        let order: Vec<EntityId> = order.into_iter().map(|(_, id)| id).collect();
        let active = order.len().saturating_sub(1);

        for entity in entities.iter_mut() {
            entity.exhaust();
        }
        let scheduler = Self { order, active };
        if let Some(entity) = scheduler.active().and_then(|id| entities.get_mut(id)) {
            entity.refill();
        }
        scheduler
    }

    pub fn order(&self) -> &[EntityId] {
        &self.order
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.order.contains(&id)
    }

    /// Entity currently holding the turn.
    pub fn active(&self) -> Option<EntityId> {
        self.order.get(self.active).copied()
    }

    pub fn is_active(&self, id: EntityId) -> bool {
        self.active() == Some(id)
    }

    /// Passes the turn on once the active entity has no action points left.
    ///
    /// Returns the entity that received the turn, or `None` if the current
    /// holder still has points to spend.
    pub fn advance(&mut self, entities: &mut EntityRegistry) -> Option<EntityId> {
        let current = self.active()?;
        let exhausted = entities
            .get(current)
            .is_none_or(|entity| entity.action_points == 0);
        if !exhausted {
            return None;
        }

        self.active = (self.active + 1) % self.order.len();
        let next = self.order[self.active];
        if let Some(entity) = entities.get_mut(next) {
            entity.refill();
        }
        Some(next)
    }

    /// Inserts a newcomer at its dexterity slot without changing the turn holder.
    ///
    /// A newcomer joining an empty order takes the turn immediately.
    pub fn insert(&mut self, id: EntityId, entities: &mut EntityRegistry) {
        if self.contains(id) {
            return;
        }
        let Some(dexterity) = entities.get(id).map(|entity| entity.stats.dexterity) else {
            return;
        };

        let slot = self
            .order
            .iter()
            .position(|other| {
                entities
                    .get(*other)
                    .is_some_and(|entity| entity.stats.dexterity > dexterity)
            })
            .unwrap_or(self.order.len());

        let was_empty = self.order.is_empty();
        self.order.insert(slot, id);

        if let Some(entity) = entities.get_mut(id) {
            if was_empty {
                entity.refill();
            } else {
                entity.exhaust();
            }
        }
        if !was_empty && slot <= self.active {
            self.active += 1;
        }
    }

    /// Drops a defeated entity from the order.
    ///
    /// If it held the turn, the next entity in line takes over with a fresh
    /// set of action points; that entity is returned.
    pub fn remove(&mut self, id: EntityId, entities: &mut EntityRegistry) -> Option<EntityId> {
        let index = self.order.iter().position(|other| *other == id)?;
        self.order.remove(index);

        if self.order.is_empty() {
            self.active = 0;
            return None;
        }

        if index < self.active {
            self.active -= 1;
            None
        } else if index == self.active {
            self.active %= self.order.len();
            let next = self.order[self.active];
            if let Some(entity) = entities.get_mut(next) {
                entity.refill();
            }
            Some(next)
        } else {
            None
        }
    }
}
