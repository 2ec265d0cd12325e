//! Deterministic dungeon-crawl rules shared by the server and its tools.
//!
//! `game-core` defines the tile grid, line of sight, pathfinding, the event
//! pipeline and turn scheduling as pure synchronous APIs. All state mutation
//! flows through [`engine::GameEngine`]; the runtime crate owns the loop that
//! drives it.
pub mod action;
pub mod config;
pub mod engine;
pub mod env;
pub mod error;
pub mod geometry;
pub mod level;
pub mod pathfinding;
pub mod rng;
pub mod state;

pub use action::{
    Action, ActionTransition, AttackAction, AttackError, AttackOutcome, EndTurnAction,
    EndTurnError, Event, EventOutcome, JoinError, JoinEvent, MoveAction, MoveError,
    NextLevelError, NextLevelEvent,
};
pub use config::{GameConfig, PlayerTemplate};
pub use engine::{ExecuteError, GameEngine, TransitionPhase, TransitionPhaseError, TurnError};
pub use env::GameEnv;
pub use error::{ErrorSeverity, GameError};
pub use geometry::{is_blocked, pixel_distance, refresh_visibility, within_reach};
pub use level::{EnemySpawn, LevelCatalog, LevelConfig, LevelError};
pub use pathfinding::{PathError, Pathfinder, SearchNode};
pub use rng::{PcgRng, RngOracle, compute_seed};
pub use state::{
    ActorStats, ChangeSet, ClientId, EnemyKind, EntityFields, EntityId, EntityRegistry,
    GameState, LivingEntity, Position, ResourceMeter, Role, TerrainKind, Tile, TileField,
    TileFields, TurnScheduler,
};
