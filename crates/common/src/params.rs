//! Live scene parameters edited from the control panel.
//!
//! Stored on disk as pretty-printed JSON. Missing fields fall back to
//! [`SceneParams::default`], so older files keep loading as fields are added.

use crate::PointLight;
use glam::{Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Errors from loading or saving [`SceneParams`].
#[derive(Debug, thiserror::Error)]
pub enum ParamsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneParams {
    pub sphere_position: Vec3,
    pub sphere_radius: f32,
    /// Upper bound on ray-march steps per pixel.
    pub max_iterations: i32,
    /// Distance below which a ray counts as a surface hit.
    pub threshold: f32,
    /// Movement speed in panel units; one unit is 1e-6 world units per microsecond.
    pub speed: f32,
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub clear_color: Vec4,
    pub lights: Vec<PointLight>,
}

impl SceneParams {
    pub const SPHERE_POSITION_RANGE: (f32, f32) = (-1.0, 3.0);
    pub const SPHERE_RADIUS_RANGE: (f32, f32) = (0.0, 2.0);
    pub const MAX_ITERATIONS_RANGE: (i32, i32) = (1, 5000);
    pub const THRESHOLD_RANGE: (f32, f32) = (0.00001, 0.01);
    pub const SPEED_RANGE: (f32, f32) = (1.0, 100.0);
    pub const FOV_RANGE: (f32, f32) = (20.0, 120.0);

    /// Camera base speed in world units per microsecond.
    pub fn base_speed(&self) -> f32 {
        self.speed / 1_000_000.0
    }

    /// Pull every field back into the range the panel allows.
    pub fn clamp(&mut self) {
        let (lo, hi) = Self::SPHERE_POSITION_RANGE;
        self.sphere_position = self.sphere_position.clamp(Vec3::splat(lo), Vec3::splat(hi));
        self.sphere_radius = self
            .sphere_radius
            .clamp(Self::SPHERE_RADIUS_RANGE.0, Self::SPHERE_RADIUS_RANGE.1);
        self.max_iterations = self
            .max_iterations
            .clamp(Self::MAX_ITERATIONS_RANGE.0, Self::MAX_ITERATIONS_RANGE.1);
        self.threshold = self
            .threshold
            .clamp(Self::THRESHOLD_RANGE.0, Self::THRESHOLD_RANGE.1);
        self.speed = self.speed.clamp(Self::SPEED_RANGE.0, Self::SPEED_RANGE.1);
        self.fov = self.fov.clamp(Self::FOV_RANGE.0, Self::FOV_RANGE.1);
    }

    /// Load parameters from a JSON file, clamping out-of-range values.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ParamsError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let mut params: Self = serde_json::from_str(&text)?;
        params.clamp();
        tracing::debug!("loaded scene params from {}", path.display());
        Ok(params)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ParamsError> {
        let path = path.as_ref();
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        tracing::info!("saved scene params to {}", path.display());
        Ok(())
    }
}

impl Default for SceneParams {
    fn default() -> Self {
        Self {
            sphere_position: Vec3::new(0.0, 0.0, 3.0),
            sphere_radius: 0.5,
            max_iterations: 500,
            threshold: 0.001,
            speed: 1.0,
            fov: 75.0,
            clear_color: Vec4::new(0.5, 0.1, 0.1, 1.0),
            lights: vec![
                PointLight::new(Vec3::new(2.0, 3.0, 0.0), Vec3::new(1.0, 0.9, 0.8)),
                PointLight::new(Vec3::new(-2.0, 1.0, 5.0), Vec3::new(0.3, 0.4, 0.9)),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_panel_start() {
        let p = SceneParams::default();
        assert_eq!(p.sphere_position, Vec3::new(0.0, 0.0, 3.0));
        assert_eq!(p.sphere_radius, 0.5);
        assert_eq!(p.max_iterations, 500);
        assert_eq!(p.threshold, 0.001);
        assert_eq!(p.fov, 75.0);
        assert!((p.base_speed() - 1e-6).abs() < 1e-12);
    }

    #[test]
    fn save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.json");

        let mut p = SceneParams::default();
        p.sphere_radius = 1.25;
        p.max_iterations = 42;
        p.save(&path).unwrap();

        let loaded = SceneParams::load(&path).unwrap();
        assert_eq!(loaded, p);
    }

    #[test]
    fn load_fills_missing_fields_and_clamps() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("partial.json");
        std::fs::write(&path, r#"{ "sphere_radius": 9.0, "speed": 0.0 }"#).unwrap();

        let p = SceneParams::load(&path).unwrap();
        assert_eq!(p.sphere_radius, 2.0);
        assert_eq!(p.speed, 1.0);
        assert_eq!(p.max_iterations, 500);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = SceneParams::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ParamsError::Io(_)));
    }

    #[test]
    fn load_garbage_is_json_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "not json").unwrap();
        let err = SceneParams::load(&path).unwrap_err();
        assert!(matches!(err, ParamsError::Json(_)));
    }
}
