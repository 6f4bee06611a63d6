//! Shared plain types used across the marchlight crates.
//!
//! Nothing in here touches the GPU. Types are `Copy` where practical and
//! serde-serializable where they form part of the scene configuration.

mod light;
mod params;
mod types;

pub use light::PointLight;
pub use params::{ParamsError, SceneParams};
pub use types::{Vertex2, Viewport};
