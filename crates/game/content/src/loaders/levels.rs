//! Level catalog loader.
//!
//! Levels are drawn as ASCII rows in RON files:
//!
//! ```text
//! (
//!     levels: [
//!         (
//!             index: 0,
//!             layout: [
//!                 "#######",
//!                 "#1.2..#",
//!                 "#..#..#",
//!                 "#######",
//!             ],
//!             enemies: [(position: (x: 5, y: 2), kind: "warrior", floor: 1)],
//!         ),
//!     ],
//! )
//! ```
//!
//! `#` is a wall, `.` is floor and the digits `1`-`9` are floor tiles that
//! double as player start tiles, taken in numeric order. Rows shorter than the
//! widest row are padded with walls.

use std::path::Path;

use anyhow::{Context, bail};
use game_core::{EnemySpawn, LevelCatalog, LevelConfig, Position};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

#[derive(Debug, Clone, Serialize, Deserialize)]
struct CatalogRon {
    levels: Vec<LevelRon>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LevelRon {
    index: u32,
    layout: Vec<String>,
    #[serde(default)]
    enemies: Vec<EnemySpawn>,
}

/// Loader for level catalogs from RON files.
pub struct LevelLoader;

impl LevelLoader {
    pub fn load(path: &Path) -> LoadResult<LevelCatalog> {
        let content = read_file(path)?;
        Self::parse(&content).with_context(|| format!("Invalid level catalog {}", path.display()))
    }

    pub fn parse(content: &str) -> LoadResult<LevelCatalog> {
        let data: CatalogRon = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse level RON: {}", e))?;

        let mut levels = data
            .levels
            .into_iter()
            .map(Self::build)
            .collect::<LoadResult<Vec<_>>>()?;
        levels.sort_by_key(|level| level.index);

        if let Some(pair) = levels.windows(2).find(|pair| pair[0].index == pair[1].index) {
            bail!("Level index {} is defined twice", pair[0].index);
        }

        Ok(LevelCatalog::new(levels))
    }

    fn build(level: LevelRon) -> LoadResult<LevelConfig> {
        let height = level.layout.len() as u32;
        let width = level
            .layout
            .iter()
            .map(|row| row.chars().count())
            .max()
            .unwrap_or(0) as u32;

        let mut walls = Vec::new();
        let mut starts: Vec<(u32, Position)> = Vec::new();

        for (y, row) in level.layout.iter().enumerate() {
            let glyphs: Vec<char> = row.chars().collect();
            for x in 0..width as usize {
                let position = Position::new(x as i32, y as i32);
                match glyphs.get(x).copied().unwrap_or('#') {
                    '#' => walls.push(position),
                    '.' => {}
                    digit @ '1'..='9' => {
                        let order = digit.to_digit(10).unwrap_or_default();
                        if starts.iter().any(|(existing, _)| *existing == order) {
                            bail!("Level {}: start tile {} appears twice", level.index, digit);
                        }
                        starts.push((order, position));
                    }
                    other => bail!(
                        "Level {}: unknown layout glyph '{}' at {}",
                        level.index,
                        other,
                        position
                    ),
                }
            }
        }

        if starts.is_empty() {
            bail!("Level {} has no start tiles", level.index);
        }
        starts.sort_by_key(|(order, _)| *order);

        Ok(LevelConfig {
            index: level.index,
            width,
            height,
            walls,
            start_tiles: starts.into_iter().map(|(_, position)| position).collect(),
            enemies: level.enemies,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &str = r########"
    (
        levels: [
            (
                index: 1,
                layout: [
                    "#####",
                    "#2.1#",
                    "###",
                ],
            ),
            (
                index: 0,
                layout: [
                    "######",
                    "#1..W#",
                    "######",
                ],
                enemies: [],
            ),
        ],
    )
    "########;

    #[test]
    fn unknown_glyph_is_reported() {
        let error = LevelLoader::parse(CATALOG).unwrap_err();
        assert!(error.to_string().contains("unknown layout glyph 'W'"));
    }

    #[test]
    fn layout_becomes_walls_and_ordered_starts() {
        let catalog = LevelLoader::parse(
            r########"(levels: [(
                index: 1,
                layout: ["#####", "#2.1#", "###"],
                enemies: [(position: (x: 2, y: 1), kind: "archer", floor: 2)],
            )])"########,
        )
        .unwrap();

        let level = catalog.get(1).unwrap();
        assert_eq!((level.width, level.height), (5, 3));
        assert_eq!(
            level.start_tiles,
            vec![Position::new(3, 1), Position::new(1, 1)]
        );
        // short last row is padded with walls
        assert!(level.walls.contains(&Position::new(4, 2)));
        assert!(!level.walls.contains(&Position::new(2, 1)));
        assert_eq!(level.enemies[0].kind, "archer");
    }

    #[test]
    fn levels_are_sorted_and_unique() {
        let catalog = LevelLoader::parse(
            r########"(levels: [
                (index: 1, layout: ["1"]),
                (index: 0, layout: ["1."]),
            ])"########,
        )
        .unwrap();
        assert_eq!(catalog.first().map(|level| level.index), Some(0));

        let duplicate = LevelLoader::parse(
            r########"(levels: [(index: 0, layout: ["1"]), (index: 0, layout: ["1"])])"########,
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn walled_rows_parse_inside_fixtures() {
        let catalog = LevelLoader::parse(
            r########"(levels: [(
                index: 0,
                layout: [
                    "#######",
                    "#1.2..#",
                    "#..#..#",
                    "#######",
                ],
                enemies: [(position: (x: 5, y: 2), kind: "warrior", floor: 1)],
            )])"########,
        )
        .unwrap();

        let level = catalog.first().unwrap();
        assert_eq!((level.width, level.height), (7, 4));
        assert_eq!(
            level.start_tiles,
            vec![Position::new(1, 1), Position::new(3, 1)]
        );
        assert!(level.walls.contains(&Position::new(3, 2)));
    }

    #[test]
    fn level_without_start_is_rejected() {
        let error = LevelLoader::parse(r########"(levels: [(index: 0, layout: ["..."])])"########).unwrap_err();
        assert!(error.to_string().contains("no start tiles"));
    }

    #[test]
    fn load_reads_catalog_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("levels.ron");
        std::fs::write(&path, r########"(levels: [(index: 0, layout: ["1.#"])])"########).unwrap();

        let catalog = LevelLoader::load(&path).unwrap();
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.levels[0].walls, vec![Position::new(2, 0)]);
    }
}
