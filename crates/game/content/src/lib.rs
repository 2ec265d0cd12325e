//! Data-driven content definitions and loaders.
//!
//! This crate reads the files that describe a dungeon run:
//! - Level catalogs (RON, ASCII layouts plus enemy spawns)
//! - Game configuration (TOML)
//!
//! Content is turned into plain `game-core` configuration types; the core
//! itself never touches the filesystem.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{ConfigLoader, ContentFactory, LevelLoader, LoadResult};
