use std::fmt;

use crate::lap_info::LapNumber;
use crate::progress::Racer;

/// The two counters the player HUD shows for the focused racer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HudLine {
    Position { position: usize, racers: usize },
    Lap { lap: LapNumber, lap_target: LapNumber },
}

impl HudLine {
    pub fn for_racer(racer: &Racer, racers: usize, lap_target: LapNumber) -> [HudLine; 2] {
        [
            HudLine::Position {
                position: racer.race_position,
                racers,
            },
            HudLine::Lap {
                lap: racer.lap_info.lap,
                lap_target,
            },
        ]
    }
}

impl fmt::Display for HudLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HudLine::Position { position, racers } => write!(f, "Position {} / {}", position, racers),
            HudLine::Lap { lap, lap_target } => write!(f, "Lap {} / {}", lap, lap_target),
        }
    }
}

/// Racer fields a debug overlay can pick from. Each one knows its own label and how to
/// read itself off a racer, so the overlay never has to go looking for fields by name.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RacerField {
    RacePosition,
    Lap,
    Gate,
    Progress,
    FinishTime,
}

impl RacerField {
    pub const ALL: [RacerField; 5] = [
        RacerField::RacePosition,
        RacerField::Lap,
        RacerField::Gate,
        RacerField::Progress,
        RacerField::FinishTime,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RacerField::RacePosition => "position",
            RacerField::Lap => "lap",
            RacerField::Gate => "gate",
            RacerField::Progress => "progress",
            RacerField::FinishTime => "finish time",
        }
    }

    pub fn read(&self, racer: &Racer) -> String {
        match self {
            RacerField::RacePosition => racer.race_position.to_string(),
            RacerField::Lap => racer.lap_info.lap.to_string(),
            RacerField::Gate => racer.lap_info.gate.to_string(),
            RacerField::Progress => format!("{:.2}", racer.lap_info.progress),
            RacerField::FinishTime => match racer.finish_time {
                Some(time) => format!("{:.3}s", time),
                None => "-".to_string(),
            },
        }
    }

    pub fn display(&self, racer: &Racer) -> String {
        format!("{}: {}", self.label(), self.read(racer))
    }
}
