use std::thread;
use std::time::{Duration, Instant};

use anyhow::{ensure, Result};
use checkered_core::hud::{HudLine, RacerField};
use checkered_core::lap_info::{EntityHandle, FinishRecord, RacerStanding};
use checkered_core::track::{generate_gate_specs, CheckpointLayout};
use checkered_core::{RaceEvent, RaceState, Ring, Settings};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::bots::{spawn_bots, Bot};
use crate::map::Track;

use self::phase::*;

mod phase;

pub struct RaceServer {
    settings: Settings,
    track: Track,
    ring: Ring,
    race: RaceState,
    bots: Vec<Bot>,
    phase: RacePhase,
    ticks: u64,
}

#[derive(Serialize)]
pub struct RaceResults {
    pub track: String,
    pub ticks: u64,
    pub clock: f64,
    pub complete: bool,
    pub standings: Vec<RacerStanding>,
    pub finishers: Vec<FinishRecord>,
}

impl RaceServer {
    pub fn new(settings: Settings, track: Track) -> Result<RaceServer> {
        ensure!(settings.server_tick_ms > 0, "server_tick_ms must be positive");
        ensure!(
            settings.focused_racer < settings.racer_count,
            "focused_racer {} is out of range for {} racers",
            settings.focused_racer,
            settings.racer_count
        );

        // the ring has to be fully linked before any racer is ranked against it
        let layout = CheckpointLayout {
            interpolation: settings.checkpoint_interpolation,
            height_offset: settings.checkpoint_height_offset,
            auto_forward: settings.checkpoint_auto_forward,
        };
        let ring = Ring::build(generate_gate_specs(&track.shape_points, layout)?)?;
        info!(gates = ring.count(), "checkpoint ring built");

        let mut race = RaceState::new(settings.race_settings())?;
        let spawned = spawn_bots(&settings, &track);
        race.spawn_racers(spawned.iter().map(|(bot, position)| (bot.handle, *position)))?;
        let bots = spawned.into_iter().map(|(bot, _)| bot).collect();

        let phase = RacePhase::starting(settings.countdown_ms, settings.server_tick_ms);
        Ok(RaceServer {
            settings,
            track,
            ring,
            race,
            bots,
            phase,
            ticks: 0,
        })
    }

    /// Runs fixed ticks until everyone has finished or `max_ticks` runs out.
    pub fn start_loop(&mut self) -> Result<RaceResults> {
        let max_tick_duration = Duration::from_millis(self.settings.server_tick_ms);
        let dt = self.settings.tick_seconds();

        while self.ticks < self.settings.max_ticks {
            let start_time = Instant::now();

            self.simulate_race(dt)?;
            self.ticks += 1;

            if let RacePhase::AllRacersDone = self.phase {
                break;
            }

            if self.settings.realtime {
                match max_tick_duration.checked_sub(start_time.elapsed()) {
                    Some(remaining) => thread::sleep(remaining),
                    None => warn!(tick = self.ticks, "tick took longer than configured length"),
                }
            }
        }

        if !self.race.is_complete() {
            warn!(ticks = self.ticks, "stopped before every racer finished");
        }
        Ok(self.results())
    }

    fn simulate_race(&mut self, dt: f64) -> Result<()> {
        match self.phase {
            RacePhase::CountingDown { ticks_left } => {
                if ticks_left <= 1 {
                    info!("go!");
                    self.phase = RacePhase::Racing;
                } else {
                    self.phase = RacePhase::CountingDown {
                        ticks_left: ticks_left - 1,
                    };
                }
            }
            RacePhase::Racing => {
                for bot in &mut self.bots {
                    bot.drive(&self.track, dt);
                }
                for bot in &self.bots {
                    self.race.set_position(bot.handle, bot.position(&self.track))?;
                }

                for event in self.race.tick(&self.ring, dt) {
                    if let RaceEvent::RaceComplete { finishers } = event {
                        info!(finishers = finishers.len(), clock = self.race.clock(), "all racers done");
                        self.phase = RacePhase::AllRacersDone;
                    }
                }

                let interval = self.settings.standings_log_interval.max(1);
                if self.ticks % interval == 0 {
                    self.log_standings()?;
                }
            }
            RacePhase::AllRacersDone => {}
        }
        Ok(())
    }

    fn log_standings(&self) -> Result<()> {
        let order: Vec<String> = self
            .race
            .standings()
            .iter()
            .map(|s| format!("{}:{}", s.race_position, s.handle))
            .collect();
        info!(clock = self.race.clock(), standings = %order.join(" "), "standings");

        let focused = self
            .race
            .racer(EntityHandle(self.settings.focused_racer as u64))?;
        for line in HudLine::for_racer(focused, self.race.racer_count(), self.race.lap_target()) {
            info!(racer = %focused.handle, "{}", line);
        }
        for field in RacerField::ALL {
            debug!(racer = %focused.handle, "{}", field.display(focused));
        }
        Ok(())
    }

    pub fn results(&self) -> RaceResults {
        RaceResults {
            track: self.track.name.clone(),
            ticks: self.ticks,
            clock: self.race.clock(),
            complete: self.race.is_complete(),
            standings: self.race.standings(),
            finishers: self.race.finishers(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        let mut settings = Settings::load("no-config-here.yaml").unwrap();
        settings.countdown_ms = 100;
        settings.racer_count = 3;
        settings.lap_target = 1;
        settings
    }

    #[test]
    fn test_countdown_then_race_to_the_end() {
        let track = Track::oval("oval", 150.0, 90.0, 16).unwrap();
        let mut server = RaceServer::new(settings(), track).unwrap();
        let results = server.start_loop().unwrap();

        assert!(results.complete);
        assert!(results.ticks < 20000);
        assert_eq!(results.finishers.len(), 3);
        for pair in results.finishers.windows(2) {
            assert!(pair[0].finish_time <= pair[1].finish_time);
            assert_eq!(pair[0].placement + 1, pair[1].placement);
        }

        let positions: Vec<usize> = results.standings.iter().map(|s| s.race_position).collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert!(results.standings.iter().all(|s| s.lap_count == 1));
        assert!(results.standings.iter().all(|s| s.finish_time.is_some()));
    }

    #[test]
    fn test_max_ticks_stops_an_unfinished_race() {
        let mut settings = settings();
        settings.max_ticks = 10;
        let track = Track::oval("oval", 150.0, 90.0, 16).unwrap();
        let mut server = RaceServer::new(settings, track).unwrap();
        let results = server.start_loop().unwrap();

        assert!(!results.complete);
        assert_eq!(results.ticks, 10);
        assert!(results.finishers.is_empty());
    }

    #[test]
    fn test_bad_focus_is_rejected() {
        let mut settings = settings();
        settings.focused_racer = 3;
        let track = Track::oval("oval", 150.0, 90.0, 16).unwrap();
        assert!(RaceServer::new(settings, track).is_err());
    }
}
