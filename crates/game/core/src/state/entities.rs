use std::collections::BTreeMap;

use crate::config::PlayerTemplate;

use super::{ClientId, EntityId, Position, ResourceMeter};

/// Registry of every living entity in the level, keyed by id.
///
/// Tiles and the turn order refer to entities by [`EntityId`] only; this map
/// is the single owner.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EntityRegistry {
    entities: BTreeMap<EntityId, LivingEntity>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: LivingEntity) {
        self.entities.insert(entity.id, entity);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<LivingEntity> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&LivingEntity> {
        self.entities.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut LivingEntity> {
        self.entities.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &LivingEntity> {
        self.entities.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut LivingEntity> {
        self.entities.values_mut()
    }

    /// Entities with health remaining.
    pub fn living(&self) -> impl Iterator<Item = &LivingEntity> {
        self.iter().filter(|entity| entity.is_alive())
    }

    pub fn players(&self) -> impl Iterator<Item = &LivingEntity> {
        self.iter().filter(|entity| entity.is_player())
    }

    /// The entity controlled by `client`, if it has joined.
    pub fn player_of(&self, client: ClientId) -> Option<&LivingEntity> {
        self.players()
            .find(|entity| entity.controlling_client() == Some(client))
    }
}

/// Actor participating in the turn order.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LivingEntity {
    pub id: EntityId,
    pub name: String,
    pub role: Role,
    pub position: Position,
    pub health: ResourceMeter,
    pub action_points: u32,
    pub max_action_points: u32,
    pub stats: ActorStats,
    pub equipment: Equipment,
}

impl LivingEntity {
    pub fn new(
        id: EntityId,
        name: impl Into<String>,
        role: Role,
        position: Position,
        stats: ActorStats,
        max_action_points: u32,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            position,
            health: ResourceMeter::full(stats.max_health),
            action_points: 0,
            max_action_points,
            stats,
            equipment: Equipment::default(),
        }
    }

    pub fn with_equipment(mut self, equipment: Equipment) -> Self {
        self.equipment = equipment;
        self
    }

    pub fn is_alive(&self) -> bool {
        !self.health.is_depleted()
    }

    /// A living entity blocks its tile while it has health left.
    pub fn blocks_tile(&self) -> bool {
        self.is_alive()
    }

    pub fn is_player(&self) -> bool {
        matches!(self.role, Role::Player { .. })
    }

    pub fn controlling_client(&self) -> Option<ClientId> {
        match self.role {
            Role::Player { client } => Some(client),
            Role::Enemy { .. } => None,
        }
    }

    /// Deducts `cost`, never dropping below zero.
    pub fn spend(&mut self, cost: u32) {
        self.action_points = self.action_points.saturating_sub(cost);
    }

    pub fn refill(&mut self) {
        self.action_points = self.max_action_points;
    }

    pub fn exhaust(&mut self) {
        self.action_points = 0;
    }
}

/// Who drives an entity's decisions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Role {
    Player { client: ClientId },
    Enemy { kind: EnemyKind },
}

/// Numeric attributes consumed by turn ordering, combat and visibility.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActorStats {
    pub max_health: u32,
    /// Used only for turn ordering.
    pub dexterity: i32,
    /// Attack range in tile-width units.
    pub reach: u32,
    pub attack_power: u32,
    /// Field of view radius in tiles.
    pub view_distance: f32,
}

impl From<&PlayerTemplate> for ActorStats {
    fn from(template: &PlayerTemplate) -> Self {
        Self {
            max_health: template.max_health,
            dexterity: template.dexterity,
            reach: template.reach,
            attack_power: template.attack_power,
            view_distance: template.view_distance,
        }
    }
}

/// Enemy archetypes. `Random` is resolved to a concrete kind at spawn time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EnemyKind {
    Warrior,
    Archer,
    Mage,
    Random,
}

impl EnemyKind {
    pub const CONCRETE: [EnemyKind; 3] = [EnemyKind::Warrior, EnemyKind::Archer, EnemyKind::Mage];

    /// Stats for an enemy of this kind at the given experience level.
    ///
    /// Returns `None` for [`EnemyKind::Random`], which has no stats of its own.
    pub fn stats(self, level: u32) -> Option<ActorStats> {
        let level = level.max(1);
        let half = level / 2;
        let max_health = 20 + level * 3;
        let stats = match self {
            EnemyKind::Warrior => ActorStats {
                max_health,
                dexterity: (2 + half) as i32,
                reach: 1,
                attack_power: 3 + level,
                view_distance: 8.5,
            },
            EnemyKind::Archer => ActorStats {
                max_health,
                dexterity: (3 + level) as i32,
                reach: 3,
                attack_power: 2 + half,
                view_distance: 8.5,
            },
            EnemyKind::Mage => ActorStats {
                max_health,
                dexterity: (1 + half) as i32,
                reach: 2,
                attack_power: 3 + level,
                view_distance: 8.5,
            },
            EnemyKind::Random => return None,
        };
        Some(stats)
    }
}

/// Equipment-derived modifiers, read-only to the simulation.
#[derive(Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Equipment {
    pub body: Option<BodyArmor>,
    pub weapon: Option<Weapon>,
}

impl Equipment {
    pub fn walk_cost_multiplier(&self) -> f32 {
        self.body
            .as_ref()
            .map_or(1.0, |armor| armor.walk_cost_multiplier)
    }

    pub fn physical_armor(&self) -> u32 {
        self.body.as_ref().map_or(0, |armor| armor.physical)
    }

    /// Hit chance in percent; unarmed attacks always land.
    pub fn accuracy(&self) -> u32 {
        self.weapon.as_ref().map_or(100, |weapon| weapon.accuracy)
    }

    pub fn damage_bonus(&self) -> u32 {
        self.weapon.as_ref().map_or(0, |weapon| weapon.damage_bonus)
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BodyArmor {
    pub walk_cost_multiplier: f32,
    pub physical: u32,
    pub magic: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Weapon {
    /// Percent chance to hit, 0..=100.
    pub accuracy: u32,
    pub damage_bonus: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn warrior() -> LivingEntity {
        let stats = EnemyKind::Warrior.stats(1).unwrap();
        LivingEntity::new(
            EntityId(1),
            "warrior",
            Role::Enemy {
                kind: EnemyKind::Warrior,
            },
            Position::ORIGIN,
            stats,
            4,
        )
    }

    #[test]
    fn spending_never_goes_negative() {
        let mut entity = warrior();
        entity.refill();
        entity.spend(3);
        entity.spend(3);
        assert_eq!(entity.action_points, 0);
    }

    #[test]
    fn random_kind_has_no_stats() {
        assert!(EnemyKind::Random.stats(3).is_none());
        assert!(EnemyKind::CONCRETE.iter().all(|kind| kind.stats(3).is_some()));
    }

    #[test]
    fn kind_parses_from_content_names() {
        assert_eq!("archer".parse::<EnemyKind>().unwrap(), EnemyKind::Archer);
        assert!("dragon".parse::<EnemyKind>().is_err());
    }

    #[test]
    fn unarmored_walks_at_base_cost() {
        let entity = warrior();
        assert_eq!(entity.equipment.walk_cost_multiplier(), 1.0);
        assert_eq!(entity.equipment.accuracy(), 100);
    }
}
