//! Curves through a sparse list of track-shape points.
//!
//! The curve never wraps: the first and last segments reuse their endpoint as the
//! missing outer control point, even when the points describe a closed loop.

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::SplineError;

mod distance_map;

pub use distance_map::DistanceMap;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    // one Bernstein polynomial over every control point
    Bezier,
    CatmullRom,
}

#[derive(Clone, Debug)]
pub struct Spline {
    map: DistanceMap<DVec3>,
    interpolation: Interpolation,
}

impl Spline {
    pub fn new(points: Vec<DVec3>, interpolation: Interpolation) -> Result<Spline, SplineError> {
        if points.len() < 2 {
            return Err(SplineError::TooFewPoints {
                count: points.len(),
            });
        }

        let distances: Vec<f64> = points
            .windows(2)
            .map(|pair| pair[0].distance(pair[1]))
            .collect();
        let map = DistanceMap::new(points, &distances)?;

        Ok(Spline { map, interpolation })
    }

    pub fn points(&self) -> &[DVec3] {
        self.map.objects()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    pub fn distance_map(&self) -> &DistanceMap<DVec3> {
        &self.map
    }

    /// Length of the control polygon, not the curve.
    pub fn total_length(&self) -> f64 {
        self.map.total_length()
    }

    fn point(&self, index: isize) -> DVec3 {
        let last = self.len() as isize - 1;
        self.points()[index.clamp(0, last) as usize]
    }

    // (segment, local t) for a curve parameter t
    fn segment(&self, t: f64) -> (isize, f64) {
        let segments = self.len() as isize - 1;
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let scaled = t * segments as f64;
        let i = scaled.floor() as isize;
        if i >= segments {
            (segments - 1, 1.0)
        } else {
            (i, scaled - i as f64)
        }
    }

    /// Curve position for `t` in [0, 1]; anything outside is clamped.
    pub fn evaluate(&self, t: f64) -> DVec3 {
        match self.interpolation {
            Interpolation::Linear => {
                let (i, local) = self.segment(t);
                self.point(i).lerp(self.point(i + 1), local)
            }
            Interpolation::CatmullRom => {
                let (i, local) = self.segment(t);
                catmull_rom(
                    self.point(i - 1),
                    self.point(i),
                    self.point(i + 1),
                    self.point(i + 2),
                    local,
                )
            }
            Interpolation::Bezier => bezier(self.points(), clamp_unit(t)),
        }
    }

    /// Unit direction of travel at `t`, or zero where the curve stalls.
    pub fn tangent(&self, t: f64) -> DVec3 {
        let derivative = match self.interpolation {
            Interpolation::Linear => {
                let (i, _) = self.segment(t);
                self.point(i + 1) - self.point(i)
            }
            Interpolation::CatmullRom => {
                let (i, local) = self.segment(t);
                catmull_rom_derivative(
                    self.point(i - 1),
                    self.point(i),
                    self.point(i + 1),
                    self.point(i + 2),
                    local,
                )
            }
            Interpolation::Bezier => bezier_derivative(self.points(), clamp_unit(t)),
        };
        derivative.normalize_or_zero()
    }

    // Distance as a share of the control polygon length. Uneven point spacing means
    // this is not arc length on the curve.
    fn parameter_at_distance(&self, distance: f64) -> f64 {
        let total = self.total_length();
        if total > 0.0 {
            distance / total
        } else {
            0.0
        }
    }

    pub fn point_at_distance(&self, distance: f64) -> DVec3 {
        self.evaluate(self.parameter_at_distance(distance))
    }

    pub fn tangent_at_distance(&self, distance: f64) -> DVec3 {
        self.tangent(self.parameter_at_distance(distance))
    }

    /// Fractional point index to curve position. Index `i` maps to `t = i / len`, which
    /// is the spacing checkpoint generation lays gates out with.
    pub fn point_at_index(&self, index: f64) -> DVec3 {
        self.evaluate(index / self.len() as f64)
    }

    pub fn tangent_at_index(&self, index: f64) -> DVec3 {
        self.tangent(index / self.len() as f64)
    }
}

fn clamp_unit(t: f64) -> f64 {
    if t.is_nan() {
        0.0
    } else {
        t.clamp(0.0, 1.0)
    }
}

fn catmull_rom(p0: DVec3, p1: DVec3, p2: DVec3, p3: DVec3, t: f64) -> DVec3 {
    let t2 = t * t;
    let t3 = t2 * t;

    0.5 * ((2.0 * p1)
        + (-p0 + p2) * t
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * t2
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * t3)
}

fn catmull_rom_derivative(p0: DVec3, p1: DVec3, p2: DVec3, p3: DVec3, t: f64) -> DVec3 {
    0.5 * ((-p0 + p2)
        + (2.0 * p0 - 5.0 * p1 + 4.0 * p2 - p3) * (2.0 * t)
        + (-p0 + 3.0 * p1 - 3.0 * p2 + p3) * (3.0 * t * t))
}

// Bernstein basis, binomial coefficients built up incrementally in f64 so long point
// lists don't overflow an integer.
fn bezier(points: &[DVec3], t: f64) -> DVec3 {
    let n = points.len() - 1;
    let mut binomial = 1.0;
    let mut sum = DVec3::ZERO;

    for (i, point) in points.iter().enumerate() {
        let weight = binomial * (1.0 - t).powi((n - i) as i32) * t.powi(i as i32);
        sum += *point * weight;
        binomial = binomial * (n - i) as f64 / (i + 1) as f64;
    }
    sum
}

fn bezier_derivative(points: &[DVec3], t: f64) -> DVec3 {
    let differences: Vec<DVec3> = points.windows(2).map(|pair| pair[1] - pair[0]).collect();
    bezier(&differences, t) * differences.len() as f64
}
