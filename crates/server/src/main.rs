//! Headless dungeon server.
//!
//! Loads content, starts the runtime, attaches one loop-back player and ticks
//! until `MAX_TICKS` is reached or the process is interrupted.
mod config;
mod local;
mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use game_content::{ConfigLoader, ContentFactory, LevelLoader};
use runtime::{ChannelTransport, Runtime, RuntimeConfig};

use crate::config::ServerConfig;
use crate::local::LocalClient;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = ServerConfig::from_env();
    let _log_guard = logging::setup_logging(config.session_id.as_deref(), config.log_dir.clone())?;

    let factory = ContentFactory::new(&config.data_dir);
    let game_config = match &config.game_config {
        Some(path) => ConfigLoader::load(path)?,
        None => factory.load_config()?,
    };
    let levels = match &config.levels {
        Some(path) => LevelLoader::load(path)?,
        None => factory.load_levels()?,
    };
    tracing::info!(
        levels = levels.len(),
        path = %config.levels_path().display(),
        "content loaded"
    );

    let seed = config.seed.unwrap_or_else(rand::random);
    let transport = Arc::new(ChannelTransport::new());
    let runtime = Runtime::builder()
        .config(RuntimeConfig {
            game_config,
            tick_interval: config.tick_interval,
            seed,
            ..RuntimeConfig::default()
        })
        .levels(levels)
        .npc_behavior(config.npc_behavior())
        .transport(transport.clone())
        .build()
        .await
        .context("Failed to start runtime")?;

    let local = LocalClient::join(runtime.handle(), &transport, &config.player_name).await?;
    let local_task = tokio::spawn(local.run());

    tokio::select! {
        result = runtime.run(config.max_ticks) => {
            let ticks = result.context("Tick loop failed")?;
            tracing::info!(ticks, "tick limit reached");
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted, shutting down");
        }
    }

    local_task.abort();
    // the task holds a handle clone that must drop before the worker can stop
    let _ = local_task.await;
    runtime.shutdown().await.context("Runtime shutdown failed")?;
    Ok(())
}
