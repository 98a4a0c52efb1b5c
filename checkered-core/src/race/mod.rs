//! Race state: every racer record, the finish order and the race clock.
//!
//! The host game owns one `RaceState` per race and calls [`RaceState::tick`] once per
//! fixed step after pushing fresh positions in with [`RaceState::set_position`]. The
//! ring is only borrowed for the duration of a tick.

use std::collections::HashMap;

use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::checkpoints::Ring;
use crate::error::RaceError;
use crate::lap_info::{
    EntityHandle, FinishRecord, GateIndex, LapNumber, Placement, RacerID, RacerStanding,
};
use crate::progress::{rank_racers, Advance, Racer};
use crate::settings::RaceSettings;

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub enum RaceEvent {
    GateAdvanced {
        handle: EntityHandle,
        gate: GateIndex,
    },
    LapCompleted {
        handle: EntityHandle,
        lap: LapNumber,
    },
    Finished {
        handle: EntityHandle,
        finish_time: f64,
        placement: Placement,
    },
    // emitted once, on the tick the last racer finishes
    RaceComplete {
        finishers: Vec<FinishRecord>,
    },
}

pub struct RaceState {
    settings: RaceSettings,
    racers: Vec<Racer>,
    by_handle: HashMap<EntityHandle, RacerID>,
    finishers: Vec<RacerID>,
    clock: f64,
    complete: bool,
}

impl RaceState {
    pub fn new(settings: RaceSettings) -> Result<RaceState, RaceError> {
        if settings.lap_target == 0 {
            return Err(RaceError::InvalidLapTarget);
        }

        Ok(RaceState {
            settings,
            racers: Vec::new(),
            by_handle: HashMap::new(),
            finishers: Vec::new(),
            clock: 0.0,
            complete: false,
        })
    }

    /// Adds a racer sitting on gate 0 with no laps done.
    pub fn register(
        &mut self,
        handle: EntityHandle,
        position: DVec3,
    ) -> Result<RacerID, RaceError> {
        if self.by_handle.contains_key(&handle) {
            return Err(RaceError::DuplicateRacer { handle });
        }

        let id = self.racers.len();
        self.racers.push(Racer::new(id, handle, position));
        self.by_handle.insert(handle, id);
        debug!(%handle, id, "registered racer");
        Ok(id)
    }

    pub fn spawn_racers<I>(&mut self, racers: I) -> Result<Vec<RacerID>, RaceError>
    where
        I: IntoIterator<Item = (EntityHandle, DVec3)>,
    {
        racers
            .into_iter()
            .map(|(handle, position)| self.register(handle, position))
            .collect()
    }

    /// Drops every racer record and restarts the clock, keeping the settings.
    pub fn reset(&mut self) {
        self.racers.clear();
        self.by_handle.clear();
        self.finishers.clear();
        self.clock = 0.0;
        self.complete = false;
    }

    pub fn set_position(
        &mut self,
        handle: EntityHandle,
        position: DVec3,
    ) -> Result<(), RaceError> {
        let id = self.lookup(handle)?;
        self.racers[id].position = position;
        Ok(())
    }

    /// Runs one step: advances the clock by `dt`, moves each racer on by at most one
    /// gate (in registration order), then ranks everyone.
    pub fn tick(&mut self, ring: &Ring, dt: f64) -> Vec<RaceEvent> {
        self.clock += dt;
        let mut events = Vec::new();

        for id in 0..self.racers.len() {
            let racer = &mut self.racers[id];
            let advance = racer.advance(ring);
            if advance == Advance::Stayed {
                continue;
            }

            let handle = racer.handle;
            let gate = racer.lap_info.gate;
            let lap = racer.lap_info.lap;
            debug!(%handle, gate, "racer advanced a gate");
            events.push(RaceEvent::GateAdvanced { handle, gate });

            if advance == Advance::Lap {
                info!(%handle, lap, "racer completed a lap");
                events.push(RaceEvent::LapCompleted { handle, lap });

                if racer.finish_time.is_none() && lap <= self.settings.lap_target {
                    racer.finish_time = Some(self.clock);
                    self.finishers.push(id);

                    let placement = self.finishers.len();
                    info!(%handle, finish_time = self.clock, placement, "racer finished");
                    events.push(RaceEvent::Finished {
                        handle,
                        finish_time: self.clock,
                        placement,
                    });

                    if !self.complete && self.finishers.len() == self.racers.len() {
                        self.complete = true;
                        info!(racers = self.racers.len(), "race complete");
                        events.push(RaceEvent::RaceComplete {
                            finishers: self.finishers(),
                        });
                    }
                }
            }
        }

        rank_racers(&mut self.racers);
        events
    }

    fn lookup(&self, handle: EntityHandle) -> Result<RacerID, RaceError> {
        self.by_handle
            .get(&handle)
            .copied()
            .ok_or(RaceError::RacerNotFound { handle })
    }

    pub fn racer(&self, handle: EntityHandle) -> Result<&Racer, RaceError> {
        Ok(&self.racers[self.lookup(handle)?])
    }

    /// Racers in registration order.
    pub fn racers(&self) -> &[Racer] {
        &self.racers
    }

    /// Everyone's output for the last tick, best-placed first.
    pub fn standings(&self) -> Vec<RacerStanding> {
        let mut standings: Vec<RacerStanding> =
            self.racers.iter().map(Racer::standing).collect();
        standings.sort_by_key(|standing| standing.race_position);
        standings
    }

    pub fn finishers(&self) -> Vec<FinishRecord> {
        self.finishers
            .iter()
            .enumerate()
            .filter_map(|(place, &id)| {
                let racer = &self.racers[id];
                racer.finish_time.map(|finish_time| FinishRecord {
                    handle: racer.handle,
                    finish_time,
                    placement: place + 1,
                })
            })
            .collect()
    }

    /// Anchor of the last gate the racer passed, where a stuck racer gets put back.
    pub fn respawn_point(&self, ring: &Ring, handle: EntityHandle) -> Result<DVec3, RaceError> {
        let racer = self.racer(handle)?;
        Ok(ring.gate(racer.lap_info.gate).anchor)
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn lap_target(&self) -> LapNumber {
        self.settings.lap_target
    }

    pub fn racer_count(&self) -> usize {
        self.racers.len()
    }
}

#[cfg(test)]
mod tests;
