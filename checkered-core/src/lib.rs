pub mod checkpoints;
pub mod error;
pub mod hud;
pub mod lap_info;
pub mod progress;
pub mod race;
pub mod settings;
pub mod spline;
pub mod track;

pub use checkpoints::{Gate, GatePlane, GateSpec, Ring};
pub use error::{RaceError, RingError, SplineError};
pub use race::{RaceEvent, RaceState};
pub use settings::{RaceSettings, Settings};
