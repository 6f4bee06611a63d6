use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Point light with distance attenuation `1 / (constant + linear*d + quadratic*d^2)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PointLight {
    pub position: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl PointLight {
    pub fn new(position: Vec3, diffuse: Vec3) -> Self {
        Self {
            position,
            diffuse,
            ..Self::default()
        }
    }

    /// Attenuation factor at distance `d`.
    pub fn attenuation(&self, d: f32) -> f32 {
        1.0 / (self.constant + self.linear * d + self.quadratic * d * d)
    }
}

impl Default for PointLight {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            diffuse: Vec3::ONE,
            specular: Vec3::ONE,
            constant: 0.8,
            linear: 0.02,
            quadratic: 0.032,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_attenuation_terms() {
        let l = PointLight::default();
        assert_eq!(l.constant, 0.8);
        assert_eq!(l.linear, 0.02);
        assert_eq!(l.quadratic, 0.032);
        assert!((l.attenuation(0.0) - 1.25).abs() < 1e-6);
    }

    #[test]
    fn attenuation_falls_off_with_distance() {
        let l = PointLight::new(Vec3::ZERO, Vec3::X);
        assert!(l.attenuation(10.0) < l.attenuation(1.0));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let l: PointLight = serde_json::from_str(r#"{"position":[1.0,2.0,3.0]}"#).unwrap();
        assert_eq!(l.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(l.quadratic, 0.032);
    }
}
