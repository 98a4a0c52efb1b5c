use thiserror::Error;

use crate::lap_info::{EntityHandle, GateIndex};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RingError {
    #[error("a checkpoint ring needs at least 2 gates, got {count}")]
    Degenerate { count: usize },

    #[error("gates {first} and {second} are both flagged as the lap gate")]
    MultipleLapFlags { first: GateIndex, second: GateIndex },

    #[error("gate {index} has no usable forward direction")]
    InvalidOrientation { index: GateIndex },
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RaceError {
    #[error("no racer registered for entity {handle}")]
    RacerNotFound { handle: EntityHandle },

    #[error("entity {handle} is already registered as a racer")]
    DuplicateRacer { handle: EntityHandle },

    #[error("lap target must be at least 1")]
    InvalidLapTarget,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SplineError {
    #[error("a spline needs at least 2 points, got {count}")]
    TooFewPoints { count: usize },

    #[error("distances must be one shorter than objects: {objects} objects, {distances} distances")]
    LengthMismatch { objects: usize, distances: usize },
}
