//! Content factory for loading a whole data directory.

use std::path::{Path, PathBuf};

use game_core::{GameConfig, LevelCatalog};

use crate::loaders::{ConfigLoader, LevelLoader, LoadResult};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml   (optional)
/// └── levels.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Load game configuration from `config.toml`, falling back to defaults
    /// when the file does not exist.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join("config.toml");
        if !path.exists() {
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the level catalog from `levels.ron`.
    pub fn load_levels(&self) -> LoadResult<LevelCatalog> {
        let path = self.data_dir.join("levels.ron");
        let catalog = LevelLoader::load(&path)?;
        if catalog.is_empty() {
            anyhow::bail!("Level catalog {} is empty", path.display());
        }
        Ok(catalog)
    }
}
