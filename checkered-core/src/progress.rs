use std::cmp::Ordering;

use glam::DVec3;

use crate::checkpoints::Ring;
use crate::lap_info::{EntityHandle, LapInformation, Placement, RacerID, RacerStanding};

#[derive(Clone, Debug, PartialEq)]
pub struct Racer {
    pub id: RacerID,
    pub handle: EntityHandle,
    pub position: DVec3,
    pub lap_info: LapInformation,
    pub finish_time: Option<f64>,
    // 1-based, rewritten by every ranking pass
    pub race_position: Placement,
}

/// What happened to one racer during its transition step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Advance {
    Stayed,
    Gate,
    Lap,
}

impl Racer {
    pub fn new(id: RacerID, handle: EntityHandle, position: DVec3) -> Self {
        Self {
            id,
            handle,
            position,
            lap_info: LapInformation::new(),
            finish_time: None,
            race_position: id + 1,
        }
    }

    pub fn has_finished(&self) -> bool {
        self.finish_time.is_some()
    }

    /// The gate this racer is driving towards.
    pub fn target_gate(&self, ring: &Ring) -> usize {
        ring.index_mod(self.lap_info.gate as isize + 1)
    }

    // At most one gate per call. A racer that covers two gates in one tick only
    // gets credit for the first and picks up the second next tick if it is still
    // on the far side of it.
    pub fn advance(&mut self, ring: &Ring) -> Advance {
        let target = ring.gate(self.target_gate(ring));
        let mut advance = Advance::Stayed;

        if ring.has_passed(target.index, self.position) {
            advance = Advance::Gate;
            if target.is_lap_flag {
                self.lap_info.lap += 1;
                advance = Advance::Lap;
            }
            self.lap_info.gate = target.index;
        }

        // always measured against the target after any advance above
        self.lap_info.progress = ring.progress_along(self.target_gate(ring), self.position);
        advance
    }

    /// Orders racers best-first: more laps, then a later gate, then less distance left
    /// to the next gate plane.
    pub fn cmp(&self, other: &Self) -> Ordering {
        let (this, that) = (&self.lap_info, &other.lap_info);
        if this.lap != that.lap {
            this.lap.cmp(&that.lap).reverse()
        } else if this.gate != that.gate {
            this.gate.cmp(&that.gate).reverse()
        } else {
            this.progress.total_cmp(&that.progress)
        }
    }

    pub fn standing(&self) -> RacerStanding {
        RacerStanding {
            handle: self.handle,
            race_position: self.race_position,
            lap_count: self.lap_info.lap,
            current_gate_index: self.lap_info.gate,
            progress: self.lap_info.progress,
            finish_time: self.finish_time,
        }
    }
}

/// Sorts a copy of the racer order and writes `race_position` back into every record.
/// Returns racer slots best-first. The sort is stable, so racers that tie on every key
/// keep the order they have in `racers`.
pub fn rank_racers(racers: &mut [Racer]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..racers.len()).collect();
    order.sort_by(|&a, &b| racers[a].cmp(&racers[b]));

    for (rank, &slot) in order.iter().enumerate() {
        racers[slot].race_position = rank + 1;
    }
    order
}
