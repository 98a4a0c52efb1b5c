use std::env;

use anyhow::{Context, Result};
use checkered_core::Settings;
use tracing::info;

use crate::game::RaceServer;
use crate::map::Track;

mod bots;
mod game;
mod map;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config_path = env::args().nth(1).unwrap_or_else(|| "config.yaml".to_string());
    let settings = Settings::load(&config_path)
        .with_context(|| format!("failed to read config file {}", config_path))?;

    let track = if settings.track_file.is_empty() {
        Track::oval("oval", 150.0, 90.0, 16)?
    } else {
        Track::load(&settings.track_file)?
    };

    // kick off the race loop
    info!(racers = settings.racer_count, laps = settings.lap_target, "starting race");
    let mut server = RaceServer::new(settings, track)?;
    let results = server.start_loop()?;

    println!("{}", serde_json::to_string_pretty(&results)?);
    Ok(())
}
