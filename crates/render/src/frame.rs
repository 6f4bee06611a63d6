//! Per-frame device state.

use crate::{Capability, ClearFlags, Face, GlDevice, Winding};
use glam::Vec4;
use marchlight_common::Viewport;

/// Size the device viewport to `viewport` and clear color and depth to `clear_color`.
pub fn begin_frame<D: GlDevice + ?Sized>(device: &D, viewport: Viewport, clear_color: Vec4) {
    device.viewport(0, 0, viewport.width as i32, viewport.height as i32);
    device.clear_color(clear_color);
    device.clear(ClearFlags::COLOR_AND_DEPTH);
}

/// Cull `face` polygons, treating `front` winding as front-facing.
pub fn enable_culling<D: GlDevice + ?Sized>(device: &D, face: Face, front: Winding) {
    device.enable(Capability::CullFace);
    device.cull_face(face);
    device.front_face(front);
}

pub fn disable_culling<D: GlDevice + ?Sized>(device: &D) {
    device.disable(Capability::CullFace);
}
