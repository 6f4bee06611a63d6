//! Camera: pure kinematic state for the single scene viewer.
//!
//! # Invariants
//! - Orientation is unit length after every mutation.
//! - The camera never clamps pitch; the movement controller owns that.
//!
//! Camera and viewport travel together in a [`SceneView`] that callers pass
//! explicitly to whatever needs them.

mod camera;
mod view;

pub use camera::{Camera, Movement};
pub use view::SceneView;
