use std::f64::consts::TAU;
use std::fs;

use anyhow::{ensure, Context, Result};
use checkered_core::spline::{Interpolation, Spline};
use glam::DVec3;
use serde::{Deserialize, Serialize};
use tracing::info;

/// On-disk track description: just the sparse shape of the centerline, in driving order.
/// The loop closes back from the last point to the first.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TrackFile {
    pub name: String,
    pub shape_points: Vec<DVec3>,
}

pub struct Track {
    pub name: String,
    pub shape_points: Vec<DVec3>,
    // closed centerline the simulated racers drive along
    pub centerline: Spline,
}

impl Track {
    pub fn load(filename: &str) -> Result<Track> {
        info!(filename, "loading track");
        let raw = fs::read_to_string(filename)
            .with_context(|| format!("could not read track file {}", filename))?;
        let file: TrackFile = serde_json::from_str(&raw)
            .with_context(|| format!("invalid track file {}", filename))?;

        Track::new(file.name, file.shape_points)
    }

    pub fn oval(name: &str, radius_x: f64, radius_z: f64, points: usize) -> Result<Track> {
        let shape_points = (0..points)
            .map(|i| {
                let angle = i as f64 / points as f64 * TAU;
                DVec3::new(radius_x * angle.cos(), 0.0, radius_z * angle.sin())
            })
            .collect();

        Track::new(name.to_string(), shape_points)
    }

    pub fn new(name: String, shape_points: Vec<DVec3>) -> Result<Track> {
        ensure!(
            shape_points.len() >= 3,
            "track {} needs at least 3 shape points, got {}",
            name,
            shape_points.len()
        );

        let mut closed = shape_points.clone();
        closed.push(shape_points[0]);
        let centerline = Spline::new(closed, Interpolation::CatmullRom)?;

        info!(
            track = %name,
            shape_points = shape_points.len(),
            length = centerline.total_length(),
            "track ready"
        );
        Ok(Track {
            name,
            shape_points,
            centerline,
        })
    }

    pub fn length(&self) -> f64 {
        self.centerline.total_length()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oval_closes_the_loop() {
        let track = Track::oval("oval", 100.0, 50.0, 12).unwrap();
        assert_eq!(track.shape_points.len(), 12);
        assert_eq!(track.centerline.len(), 13);

        let start = track.centerline.point_at_distance(0.0);
        let end = track.centerline.point_at_distance(track.length());
        assert!(start.abs_diff_eq(end, 1e-9));
    }

    #[test]
    fn test_track_file_parses() {
        let json = r#"{ "name": "tri", "shape_points": [[0,0,0],[50,0,0],[25,0,40]] }"#;
        let file: TrackFile = serde_json::from_str(json).unwrap();
        let track = Track::new(file.name, file.shape_points).unwrap();
        assert_eq!(track.name, "tri");
        assert!(track.length() > 140.0);
    }

    #[test]
    fn test_too_small_track() {
        assert!(Track::new("line".to_string(), vec![DVec3::ZERO, DVec3::X]).is_err());
        assert!(Track::load("no/such/track.json").is_err());
    }
}
