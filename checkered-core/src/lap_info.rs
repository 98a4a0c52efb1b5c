use std::fmt;

use serde::{Deserialize, Serialize};

pub type LapNumber = u32;
pub type GateIndex = usize;
pub type Placement = usize;
pub type RacerID = usize;

/// Opaque handle to whatever entity the host game is driving (a car, a bot...).
/// The engine never looks inside it; it only uses it to find the racer record.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityHandle(pub u64);

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct LapInformation {
    pub lap: LapNumber,
    // the last gate already passed, not the one being driven towards
    pub gate: GateIndex,
    pub progress: f64,
}

impl LapInformation {
    pub fn new() -> Self {
        LapInformation {
            lap: 0,
            gate: 0,
            progress: 0.0,
        }
    }
}

impl Default for LapInformation {
    fn default() -> Self {
        Self::new()
    }
}

/// One entry of the finish order, as handed out with the race-complete signal.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct FinishRecord {
    pub handle: EntityHandle,
    pub finish_time: f64,
    pub placement: Placement,
}

/// Per-racer output of a tick.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct RacerStanding {
    pub handle: EntityHandle,
    pub race_position: Placement,
    pub lap_count: LapNumber,
    pub current_gate_index: GateIndex,
    pub progress: f64,
    pub finish_time: Option<f64>,
}
