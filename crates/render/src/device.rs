//! The device seam: a small, safe, OpenGL-shaped command surface.
//!
//! Methods take `&self`; implementations hold the context and any interior
//! state they need. Everything runs on the thread that owns the context.

use crate::{GpuError, UniformValue};
use glam::Vec4;
use std::fmt;
use std::num::NonZeroU32;

/// Device-side object name. Zero is never a valid name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RawHandle(pub NonZeroU32);

impl RawHandle {
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for RawHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Location of a uniform within one linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub u32);

/// Kinds of bindable device allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    VertexBuffer,
    IndexBuffer,
    VertexArray,
    Texture2d,
    TextureCube,
}

impl ResourceKind {
    pub fn target(self) -> BindTarget {
        match self {
            ResourceKind::VertexBuffer => BindTarget::ArrayBuffer,
            ResourceKind::IndexBuffer => BindTarget::ElementArrayBuffer,
            ResourceKind::VertexArray => BindTarget::VertexArray,
            ResourceKind::Texture2d => BindTarget::Texture2d,
            ResourceKind::TextureCube => BindTarget::TextureCubeMap,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ResourceKind::VertexBuffer => "vertex buffer",
            ResourceKind::IndexBuffer => "index buffer",
            ResourceKind::VertexArray => "vertex array",
            ResourceKind::Texture2d => "2D texture",
            ResourceKind::TextureCube => "cube texture",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Binding point; at most one object is bound per target at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BindTarget {
    ArrayBuffer,
    ElementArrayBuffer,
    VertexArray,
    Texture2d,
    TextureCubeMap,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferUsage {
    StaticDraw,
    DynamicDraw,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Float vertex attribute read from the bound vertex buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexAttrib {
    pub location: u32,
    /// Float components per vertex, 1 to 4.
    pub components: i32,
    /// Bytes between consecutive vertices.
    pub stride: i32,
    /// Byte offset of the first component.
    pub offset: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    Repeat,
    MirroredRepeat,
    ClampToEdge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureParam {
    MinFilter(Filter),
    MagFilter(Filter),
    WrapS(Wrap),
    WrapT(Wrap),
    WrapR(Wrap),
}

/// Cube map faces in upload order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CubeFace {
    PositiveX,
    NegativeX,
    PositiveY,
    NegativeY,
    PositiveZ,
    NegativeZ,
}

impl CubeFace {
    pub const ALL: [CubeFace; 6] = [
        CubeFace::PositiveX,
        CubeFace::NegativeX,
        CubeFace::PositiveY,
        CubeFace::NegativeY,
        CubeFace::PositiveZ,
        CubeFace::NegativeZ,
    ];
}

impl fmt::Display for CubeFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CubeFace::PositiveX => "+X",
            CubeFace::NegativeX => "-X",
            CubeFace::PositiveY => "+Y",
            CubeFace::NegativeY => "-Y",
            CubeFace::PositiveZ => "+Z",
            CubeFace::NegativeZ => "-Z",
        };
        f.write_str(name)
    }
}

/// Image upload destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TexImageTarget {
    Texture2d,
    CubeFace(CubeFace),
}

/// Layout of the source pixels. Storage on the device is always RGBA.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Red,
    Rgb,
    Rgba,
}

impl PixelFormat {
    /// Format for an 8-bit image with `channels` interleaved channels.
    pub fn from_channels(channels: u8) -> Option<Self> {
        match channels {
            1 => Some(PixelFormat::Red),
            3 => Some(PixelFormat::Rgb),
            4 => Some(PixelFormat::Rgba),
            _ => None,
        }
    }

    pub fn channels(self) -> u8 {
        match self {
            PixelFormat::Red => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    Triangles,
    Lines,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexType {
    U16,
    U32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    DepthTest,
    CullFace,
    Blend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Face {
    Front,
    Back,
    FrontAndBack,
}

/// Vertex order that counts as front-facing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Winding {
    Clockwise,
    CounterClockwise,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearFlags {
    pub color: bool,
    pub depth: bool,
}

impl ClearFlags {
    pub const COLOR: Self = Self {
        color: true,
        depth: false,
    };
    pub const COLOR_AND_DEPTH: Self = Self {
        color: true,
        depth: true,
    };
}

/// Graphics device operations used by the rendering layer.
pub trait GlDevice {
    fn create_object(&self, kind: ResourceKind) -> Result<RawHandle, GpuError>;
    fn delete_object(&self, kind: ResourceKind, handle: RawHandle);
    /// Bind `handle` to `target`, or clear the binding with `None`.
    fn bind_object(&self, target: BindTarget, handle: Option<RawHandle>);

    /// Replace the whole store of the buffer bound to `target`.
    fn buffer_data(&self, target: BindTarget, data: &[u8], usage: BufferUsage);
    /// Describe and enable one attribute of the bound vertex array.
    fn vertex_attrib(&self, attrib: VertexAttrib);

    fn active_texture(&self, unit: u32);
    fn texture_parameter(&self, target: BindTarget, param: TextureParam);
    fn tex_image_2d(
        &self,
        target: TexImageTarget,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    );
    fn generate_mipmap(&self, target: BindTarget);

    fn create_shader(&self, stage: ShaderStage) -> Result<RawHandle, GpuError>;
    fn shader_source(&self, shader: RawHandle, source: &str);
    fn compile_shader(&self, shader: RawHandle);
    fn shader_compile_status(&self, shader: RawHandle) -> bool;
    fn shader_info_log(&self, shader: RawHandle) -> String;
    fn delete_shader(&self, shader: RawHandle);

    fn create_program(&self) -> Result<RawHandle, GpuError>;
    fn attach_shader(&self, program: RawHandle, shader: RawHandle);
    fn link_program(&self, program: RawHandle);
    fn program_link_status(&self, program: RawHandle) -> bool;
    fn program_info_log(&self, program: RawHandle) -> String;
    fn delete_program(&self, program: RawHandle);
    fn use_program(&self, program: Option<RawHandle>);

    fn uniform_location(&self, program: RawHandle, name: &str) -> Option<UniformLocation>;
    /// Write to the active program. A `None` location is silently ignored.
    fn set_uniform(&self, location: Option<&UniformLocation>, value: UniformValue);

    fn draw_elements(&self, primitive: Primitive, count: i32, index_type: IndexType, offset: i32);

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    fn clear_color(&self, color: Vec4);
    fn clear(&self, flags: ClearFlags);
    fn enable(&self, capability: Capability);
    fn disable(&self, capability: Capability);
    fn cull_face(&self, face: Face);
    fn front_face(&self, winding: Winding);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_distinct_targets() {
        let kinds = [
            ResourceKind::VertexBuffer,
            ResourceKind::IndexBuffer,
            ResourceKind::VertexArray,
            ResourceKind::Texture2d,
            ResourceKind::TextureCube,
        ];
        let mut targets: Vec<_> = kinds.iter().map(|k| k.target()).collect();
        targets.dedup();
        assert_eq!(targets.len(), kinds.len());
    }

    #[test]
    fn channel_counts() {
        assert_eq!(PixelFormat::from_channels(1), Some(PixelFormat::Red));
        assert_eq!(PixelFormat::from_channels(3), Some(PixelFormat::Rgb));
        assert_eq!(PixelFormat::from_channels(4), Some(PixelFormat::Rgba));
        assert_eq!(PixelFormat::from_channels(2), None);
        assert_eq!(PixelFormat::from_channels(0), None);
        assert_eq!(PixelFormat::Rgb.channels(), 3);
    }

    #[test]
    fn display_names() {
        assert_eq!(ShaderStage::Fragment.to_string(), "fragment");
        assert_eq!(ResourceKind::TextureCube.to_string(), "cube texture");
        assert_eq!(CubeFace::NegativeY.to_string(), "-Y");
    }
}
