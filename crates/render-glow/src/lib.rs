//! OpenGL backend for `marchlight-render`.
//!
//! [`GlowDevice`] forwards every [`GlDevice`](marchlight_render::GlDevice)
//! call to a `glow` context. The context must be current on the calling
//! thread for the lifetime of the device and of every resource created
//! through it.

mod device;

pub use device::GlowDevice;
