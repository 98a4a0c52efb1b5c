use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::checkpoints::GateSpec;
use crate::error::SplineError;
use crate::spline::{Interpolation, Spline};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct CheckpointLayout {
    // gates laid per shape point
    pub interpolation: usize,
    pub height_offset: f64,
    pub auto_forward: bool,
}

impl Default for CheckpointLayout {
    fn default() -> Self {
        Self {
            interpolation: 2,
            height_offset: 10.0,
            auto_forward: true,
        }
    }
}

/// Lays gates along a Catmull-Rom curve through `shape_points`: `interpolation` gates
/// per shape point, raised by the layout's height offset, with the first one as the lap
/// flag. Authored forwards follow the curve tangent, so the gates stay usable even with
/// auto orientation switched off.
pub fn generate_gate_specs(
    shape_points: &[DVec3],
    layout: CheckpointLayout,
) -> Result<Vec<GateSpec>, SplineError> {
    let spline = Spline::new(shape_points.to_vec(), Interpolation::CatmullRom)?;
    let per_point = layout.interpolation.max(1);
    let raise = DVec3::Y * layout.height_offset;

    let mut specs = Vec::with_capacity(shape_points.len() * per_point);
    for i in 0..shape_points.len() {
        for j in 0..per_point {
            let index = i as f64 + j as f64 / per_point as f64;
            let mut forward = spline.tangent_at_index(index);
            if forward == DVec3::ZERO {
                forward = DVec3::Z;
            }

            specs.push(GateSpec {
                anchor: spline.point_at_index(index) + raise,
                forward,
                auto_forward: layout.auto_forward,
                is_lap_flag: specs.is_empty(),
            });
        }
    }

    Ok(specs)
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GridLayout {
    pub row_spacing: f64,
    pub lateral_offset: f64,
    pub height_offset: f64,
    // how far back from the end of the centerline the front row sits
    pub front_row_setback: f64,
}

impl Default for GridLayout {
    fn default() -> Self {
        Self {
            row_spacing: 8.0,
            lateral_offset: 4.0,
            height_offset: 2.0,
            front_row_setback: 0.0,
        }
    }
}

impl GridLayout {
    /// Distance along a centerline of `total_length` where grid slot `slot` sits. Rows
    /// that would land behind the start wrap round to the far end of the loop.
    pub fn slot_distance(&self, total_length: f64, slot: usize) -> f64 {
        let row = (slot / 2) as f64;
        let distance = total_length - self.front_row_setback - row * self.row_spacing;
        if distance < 0.0 && total_length > 0.0 {
            distance.rem_euclid(total_length)
        } else {
            distance
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct GridSlot {
    pub position: DVec3,
    pub heading: DVec3,
}

/// Starting positions for `count` racers, two abreast. The front row sits at the end of
/// the centerline (right behind the start of a closed loop) and each following row is
/// `row_spacing` further back, wrapping round past the start on a long grid. Even slots
/// go to the right of the direction of travel, odd slots to the left.
pub fn starting_grid(centerline: &Spline, count: usize, layout: GridLayout) -> Vec<GridSlot> {
    let total = centerline.total_length();

    (0..count)
        .map(|slot| {
            let distance = layout.slot_distance(total, slot);

            let heading = centerline.tangent_at_distance(distance);
            let right = DVec3::Y.cross(heading).normalize_or_zero();
            let side = if slot % 2 == 0 { 1.0 } else { -1.0 };

            GridSlot {
                position: centerline.point_at_distance(distance)
                    + right * layout.lateral_offset * side
                    + DVec3::Y * layout.height_offset,
                heading,
            }
        })
        .collect()
}
