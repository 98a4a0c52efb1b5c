use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::lap_info::LapNumber;

#[derive(Deserialize, Clone, Debug, PartialEq)]
pub struct Settings {
    pub server_tick_ms: u64,
    pub realtime: bool,
    pub max_ticks: u64,
    pub countdown_ms: u64,

    pub lap_target: LapNumber,
    pub racer_count: usize,
    pub seed: u64,
    pub racer_base_speed: f64,
    pub racer_speed_variance: f64,

    pub track_file: String,
    pub checkpoint_interpolation: usize,
    pub checkpoint_height_offset: f64,
    pub checkpoint_auto_forward: bool,

    pub grid_row_spacing: f64,
    pub grid_lateral_offset: f64,
    pub grid_height_offset: f64,

    pub standings_log_interval: u64,
    pub focused_racer: usize,
}

/// The part of the settings the ranking engine itself cares about.
#[derive(Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RaceSettings {
    pub lap_target: LapNumber,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self { lap_target: 1 }
    }
}

impl Settings {
    /// Defaults, overridden by `path` (if it exists), overridden by `CHECKERED__*`
    /// environment variables.
    pub fn load(path: &str) -> Result<Settings, ConfigError> {
        let config = Config::builder()
            .set_default("server_tick_ms", 20)?
            .set_default("realtime", false)?
            .set_default("max_ticks", 20000)?
            .set_default("countdown_ms", 3000)?
            .set_default("lap_target", 3)?
            .set_default("racer_count", 6)?
            .set_default("seed", 7)?
            .set_default("racer_base_speed", 40.0)?
            .set_default("racer_speed_variance", 0.15)?
            .set_default("track_file", "")?
            .set_default("checkpoint_interpolation", 2)?
            .set_default("checkpoint_height_offset", 10.0)?
            .set_default("checkpoint_auto_forward", true)?
            .set_default("grid_row_spacing", 8.0)?
            .set_default("grid_lateral_offset", 4.0)?
            .set_default("grid_height_offset", 2.0)?
            .set_default("standings_log_interval", 250)?
            .set_default("focused_racer", 0)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("CHECKERED").separator("__"))
            .build()?;

        config.try_deserialize()
    }

    pub fn race_settings(&self) -> RaceSettings {
        RaceSettings {
            lap_target: self.lap_target,
        }
    }

    pub fn tick_seconds(&self) -> f64 {
        self.server_tick_ms as f64 / 1000.0
    }
}
