use checkered_core::lap_info::EntityHandle;
use checkered_core::track::{starting_grid, GridLayout};
use checkered_core::Settings;
use glam::DVec3;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::map::Track;

// Kinematic stand-in for a car: holds a lane and rolls along the centerline at a
// fixed speed. Enough to feed the engine believable positions.
pub struct Bot {
    pub handle: EntityHandle,
    pub distance: f64,
    pub lane: f64,
    pub height: f64,
    pub speed: f64,
}

impl Bot {
    pub fn drive(&mut self, track: &Track, dt: f64) {
        self.distance = (self.distance + self.speed * dt).rem_euclid(track.length());
    }

    pub fn position(&self, track: &Track) -> DVec3 {
        let heading = track.centerline.tangent_at_distance(self.distance);
        let right = DVec3::Y.cross(heading).normalize_or_zero();
        track.centerline.point_at_distance(self.distance)
            + right * self.lane
            + DVec3::Y * self.height
    }
}

pub fn grid_layout(settings: &Settings) -> GridLayout {
    GridLayout {
        row_spacing: settings.grid_row_spacing,
        lateral_offset: settings.grid_lateral_offset,
        height_offset: settings.grid_height_offset,
        front_row_setback: 0.0,
    }
}

/// Lines up `settings.racer_count` bots on the starting grid. Returns each bot with the
/// exact position the grid gave it.
pub fn spawn_bots(settings: &Settings, track: &Track) -> Vec<(Bot, DVec3)> {
    let layout = grid_layout(settings);
    let mut rng = StdRng::seed_from_u64(settings.seed);
    let variance = settings.racer_speed_variance.abs();

    starting_grid(&track.centerline, settings.racer_count, layout)
        .into_iter()
        .enumerate()
        .map(|(slot, grid_slot)| {
            let side = if slot % 2 == 0 { 1.0 } else { -1.0 };
            let spread = if variance > 0.0 {
                rng.gen_range(-variance..=variance)
            } else {
                0.0
            };

            let bot = Bot {
                handle: EntityHandle(slot as u64),
                distance: layout.slot_distance(track.length(), slot),
                lane: layout.lateral_offset * side,
                height: layout.height_offset,
                speed: settings.racer_base_speed * (1.0 + spread),
            };
            (bot, grid_slot.position)
        })
        .collect()
}
