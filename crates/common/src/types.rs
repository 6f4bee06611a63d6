use bytemuck::{Pod, Zeroable};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Framebuffer dimensions in physical pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Width over height. A zero height is treated as one pixel.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 800,
            height: 480,
        }
    }
}

/// Vertex layout for flat 2D shapes: position then texture coordinate.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex2 {
    pub position: [f32; 2],
    pub tex_coord: [f32; 2],
}

impl Vertex2 {
    pub const fn new(position: [f32; 2], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            tex_coord,
        }
    }

    /// Size of one vertex in bytes.
    pub const STRIDE: usize = std::mem::size_of::<Self>();

    /// Byte offset of `tex_coord` within the vertex.
    pub const TEX_COORD_OFFSET: usize = std::mem::size_of::<[f32; 2]>();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_aspect_ratio() {
        let v = Viewport::new(800, 400);
        assert_eq!(v.aspect_ratio(), 2.0);
        assert_eq!(v.center(), Vec2::new(400.0, 200.0));
    }

    #[test]
    fn viewport_zero_height_does_not_divide_by_zero() {
        let v = Viewport::new(640, 0);
        assert!(v.aspect_ratio().is_finite());
        assert!(v.is_empty());
    }

    #[test]
    fn vertex_layout() {
        assert_eq!(Vertex2::STRIDE, 16);
        assert_eq!(Vertex2::TEX_COORD_OFFSET, 8);
        let verts = [Vertex2::new([1.0, 2.0], [3.0, 4.0])];
        let bytes: &[u8] = bytemuck::cast_slice(&verts);
        assert_eq!(bytes.len(), 16);
    }
}
