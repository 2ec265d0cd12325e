//! Server configuration read from the process environment.
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use game_core::Pathfinder;
use runtime::NpcBehavior;

/// Everything the binary needs before the runtime starts.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Directory holding `config.toml` and `levels.ron`.
    pub data_dir: PathBuf,
    /// Overrides `<data_dir>/config.toml`.
    pub game_config: Option<PathBuf>,
    /// Overrides `<data_dir>/levels.ron`.
    pub levels: Option<PathBuf>,
    pub tick_interval: Duration,
    /// Stop after this many ticks; run until interrupted when unset.
    pub max_ticks: Option<u64>,
    /// Random when unset.
    pub seed: Option<u64>,
    pub session_id: Option<String>,
    pub log_dir: Option<PathBuf>,
    /// Name of the local loop-back player.
    pub player_name: String,
    /// Enemies prefer straight corridors over zig-zag diagonals.
    pub npc_straight_lines: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            game_config: None,
            levels: None,
            tick_interval: Duration::from_millis(50),
            max_ticks: None,
            seed: None,
            session_id: None,
            log_dir: None,
            player_name: "adventurer".to_owned(),
            npc_straight_lines: false,
        }
    }
}

impl ServerConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `DATA_DIR` - Content directory (default: `data`)
    /// - `GAME_CONFIG` - Path to a TOML game configuration
    /// - `LEVELS` - Path to a RON level catalog
    /// - `TICK_INTERVAL_MS` - Milliseconds between ticks (default: 50)
    /// - `MAX_TICKS` - Stop after this many ticks (default: run until Ctrl-C)
    /// - `GAME_SEED` - Session seed (default: random)
    /// - `SESSION_ID` - Session identifier for log files (default: timestamp)
    /// - `LOG_DIR` - Log directory (default: platform cache dir)
    /// - `PLAYER_NAME` - Loop-back player name (default: adventurer)
    /// - `NPC_STRAIGHT_LINES` - `true` to penalize diagonal zig-zags in enemy paths
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(dir) = env::var("DATA_DIR") {
            config.data_dir = PathBuf::from(dir);
        }
        config.game_config = env::var("GAME_CONFIG").ok().map(PathBuf::from);
        config.levels = env::var("LEVELS").ok().map(PathBuf::from);

        if let Some(millis) = read_env::<u64>("TICK_INTERVAL_MS") {
            config.tick_interval = Duration::from_millis(millis.max(1));
        }
        config.max_ticks = read_env::<u64>("MAX_TICKS");
        config.seed = read_env::<u64>("GAME_SEED");
        config.session_id = env::var("SESSION_ID").ok();
        config.log_dir = env::var("LOG_DIR").ok().map(PathBuf::from);

        if let Some(name) = env::var("PLAYER_NAME").ok().filter(|name| !name.trim().is_empty()) {
            config.player_name = name;
        }
        if let Some(straight) = read_env::<bool>("NPC_STRAIGHT_LINES") {
            config.npc_straight_lines = straight;
        }

        config
    }

    pub fn game_config_path(&self) -> PathBuf {
        self.game_config
            .clone()
            .unwrap_or_else(|| self.data_dir.join("config.toml"))
    }

    /// Enemy behavior matching `npc_straight_lines`.
    pub fn npc_behavior(&self) -> NpcBehavior {
        if self.npc_straight_lines {
            NpcBehavior::with_pathfinder(Pathfinder::default().with_straight_lines())
        } else {
            NpcBehavior::default()
        }
    }

    pub fn levels_path(&self) -> PathBuf {
        self.levels
            .clone()
            .unwrap_or_else(|| self.data_dir.join("levels.ron"))
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_default_into_the_data_dir() {
        let config = ServerConfig {
            data_dir: PathBuf::from("content"),
            ..ServerConfig::default()
        };
        assert_eq!(config.levels_path(), PathBuf::from("content/levels.ron"));
        assert_eq!(
            config.game_config_path(),
            PathBuf::from("content/config.toml")
        );

        let config = ServerConfig {
            levels: Some(PathBuf::from("/tmp/alt.ron")),
            ..config
        };
        assert_eq!(config.levels_path(), PathBuf::from("/tmp/alt.ron"));
    }

    #[test]
    fn straight_lines_switch_the_enemy_pathfinder() {
        let config = ServerConfig {
            npc_straight_lines: true,
            ..ServerConfig::default()
        };
        assert_eq!(
            format!("{:?}", config.npc_behavior()),
            format!(
                "{:?}",
                NpcBehavior::with_pathfinder(Pathfinder::default().with_straight_lines())
            )
        );
        assert_eq!(
            format!("{:?}", ServerConfig::default().npc_behavior()),
            format!("{:?}", NpcBehavior::default())
        );
    }
}
