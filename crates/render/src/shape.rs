//! Flat shapes drawn in screen space by a shared shader program.

use crate::{
    GlDevice, GpuError, IndexBuffer, IndexType, Primitive, SharedProgram, Texture2d, VertexArray,
    VertexAttrib, VertexBuffer,
};
use glam::{Mat4, Vec2, Vec3};
use marchlight_camera::Camera;
use marchlight_common::Vertex2;
use std::rc::Rc;

pub const ROTATION_UNIFORM: &str = "u_rotation";
pub const POSITION_UNIFORM: &str = "u_position";
pub const ASPECT_RATIO_UNIFORM: &str = "u_aspect_ratio";
pub const SCALE_UNIFORM: &str = "u_scale";
pub const TEXTURE_UNIFORM: &str = "u_texture";

const QUAD_VERTICES: [Vertex2; 4] = [
    Vertex2::new([-0.5, -0.5], [0.0, 0.0]),
    Vertex2::new([0.5, -0.5], [1.0, 0.0]),
    Vertex2::new([0.5, 0.5], [1.0, 1.0]),
    Vertex2::new([-0.5, 0.5], [0.0, 1.0]),
];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 2, 3, 0];

const TRIANGLE_VERTICES: [Vertex2; 3] = [
    Vertex2::new([-0.5, -0.5], [0.0, 0.0]),
    Vertex2::new([0.5, -0.5], [1.0, 0.0]),
    Vertex2::new([0.0, 0.5], [0.5, 1.0]),
];
const TRIANGLE_INDICES: [u32; 3] = [0, 1, 2];

/// Fixed geometry a [`Shape`] can be built from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    /// Unit square centred on the origin.
    Quad,
    Triangle,
}

impl ShapeKind {
    pub fn vertices(self) -> &'static [Vertex2] {
        match self {
            ShapeKind::Quad => &QUAD_VERTICES,
            ShapeKind::Triangle => &TRIANGLE_VERTICES,
        }
    }

    pub fn indices(self) -> &'static [u32] {
        match self {
            ShapeKind::Quad => &QUAD_INDICES,
            ShapeKind::Triangle => &TRIANGLE_INDICES,
        }
    }
}

/// Placement of a shape. Not validated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform2d {
    pub position: Vec2,
    /// Width and height scale.
    pub proportions: Vec2,
    pub rotation: Mat4,
}

impl Default for Transform2d {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            proportions: Vec2::ONE,
            rotation: Mat4::IDENTITY,
        }
    }
}

/// Anything that can be placed and drawn once per frame.
pub trait Drawable {
    /// Issue the draw with `camera` supplying the aspect ratio.
    fn draw(&self, camera: &Camera);
    fn transform(&self) -> Transform2d;
    fn set_transform(&mut self, transform: Transform2d);
}

/// A [`ShapeKind`] with its own device geometry and a shared program.
pub struct Shape<D: GlDevice + ?Sized> {
    device: Rc<D>,
    kind: ShapeKind,
    transform: Transform2d,
    shader: SharedProgram<D>,
    texture: Option<Texture2d<D>>,
    vao: VertexArray<D>,
    vbo: VertexBuffer<D>,
    ebo: IndexBuffer<D>,
}

impl<D: GlDevice + ?Sized> Shape<D> {
    pub fn new(
        device: &Rc<D>,
        kind: ShapeKind,
        shader: SharedProgram<D>,
        transform: Transform2d,
    ) -> Result<Self, GpuError> {
        let mut vao = VertexArray::new(device)?;
        let vbo = VertexBuffer::with_data(device, kind.vertices())?;
        let ebo = IndexBuffer::with_data(device, kind.indices())?;
        vao.link_attrib(VertexAttrib {
            location: 0,
            components: 2,
            stride: Vertex2::STRIDE as i32,
            offset: 0,
        });
        vao.link_attrib(VertexAttrib {
            location: 1,
            components: 2,
            stride: Vertex2::STRIDE as i32,
            offset: Vertex2::TEX_COORD_OFFSET as i32,
        });
        vao.unbind();
        vbo.unbind();
        ebo.unbind();

        tracing::debug!("built {kind:?} shape");
        Ok(Self {
            device: Rc::clone(device),
            kind,
            transform,
            shader,
            texture: None,
            vao,
            vbo,
            ebo,
        })
    }

    /// Unit quad at the origin with no rotation.
    pub fn quad(device: &Rc<D>, shader: SharedProgram<D>) -> Result<Self, GpuError> {
        Self::new(device, ShapeKind::Quad, shader, Transform2d::default())
    }

    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    pub fn shader(&self) -> &SharedProgram<D> {
        &self.shader
    }

    pub fn index_count(&self) -> usize {
        self.ebo.len()
    }

    /// Texture bound to its unit and assigned to `u_texture` on each draw.
    pub fn set_texture(&mut self, texture: Option<Texture2d<D>>) {
        self.texture = texture;
    }

    pub fn texture(&self) -> Option<&Texture2d<D>> {
        self.texture.as_ref()
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.transform.position = position;
    }

    pub fn set_proportions(&mut self, proportions: Vec2) {
        self.transform.proportions = proportions;
    }

    pub fn set_width(&mut self, width: f32) {
        self.transform.proportions.x = width;
    }

    pub fn set_height(&mut self, height: f32) {
        self.transform.proportions.y = height;
    }

    /// Replace the rotation with `angle` radians about the view axis.
    pub fn rotate(&mut self, angle: f32) {
        self.rotate_about(angle, Vec3::Z);
    }

    /// Replace the rotation with `angle` radians about `axis`.
    pub fn rotate_about(&mut self, angle: f32, axis: Vec3) {
        self.transform.rotation = Mat4::from_axis_angle(axis.normalize_or_zero(), angle);
    }

    pub fn release(&mut self) {
        self.vao.release();
        self.vbo.release();
        self.ebo.release();
        if let Some(texture) = self.texture.as_mut() {
            texture.release();
        }
    }
}

impl<D: GlDevice + ?Sized> Drawable for Shape<D> {
    fn draw(&self, camera: &Camera) {
        let shader = self.shader.borrow();
        shader.activate();
        self.vao.bind();

        shader.set_uniform(ROTATION_UNIFORM, self.transform.rotation);
        shader.set_uniform(POSITION_UNIFORM, self.transform.position);
        shader.set_uniform(ASPECT_RATIO_UNIFORM, camera.aspect_ratio());
        shader.set_uniform(SCALE_UNIFORM, self.transform.proportions);
        if let Some(texture) = &self.texture {
            texture.bind();
            texture.assign(&shader, TEXTURE_UNIFORM);
        }

        self.device.draw_elements(
            Primitive::Triangles,
            self.ebo.len() as i32,
            IndexType::U32,
            0,
        );
    }

    fn transform(&self) -> Transform2d {
        self.transform
    }

    fn set_transform(&mut self, transform: Transform2d) {
        self.transform = transform;
    }
}
