//! Read-only context threaded into validation and execution.
//!
//! Nothing in the core reaches for ambient globals: configuration, the random
//! source and the level catalog are bundled into a [`GameEnv`] by the caller
//! and passed down explicitly.

use crate::config::GameConfig;
use crate::level::LevelCatalog;
use crate::rng::RngOracle;

/// Aggregates the read-only collaborators required by the action pipeline.
#[derive(Clone, Copy)]
pub struct GameEnv<'a> {
    config: &'a GameConfig,
    rng: &'a dyn RngOracle,
    levels: Option<&'a LevelCatalog>,
}

impl<'a> GameEnv<'a> {
    pub fn new(config: &'a GameConfig, rng: &'a dyn RngOracle) -> Self {
        Self {
            config,
            rng,
            levels: None,
        }
    }

    /// Attaches the level catalog consulted by level transitions.
    pub fn with_levels(mut self, levels: &'a LevelCatalog) -> Self {
        self.levels = Some(levels);
        self
    }

    pub fn config(&self) -> &'a GameConfig {
        self.config
    }

    pub fn rng(&self) -> &'a dyn RngOracle {
        self.rng
    }

    /// Returns the level catalog, if one was attached.
    pub fn levels(&self) -> Option<&'a LevelCatalog> {
        self.levels
    }
}

impl core::fmt::Debug for GameEnv<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("GameEnv")
            .field("config", self.config)
            .field("levels", &self.levels.map(LevelCatalog::len))
            .finish_non_exhaustive()
    }
}
