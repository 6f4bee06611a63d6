//! Rendering layer: GPU resource ownership, live-reloading shader programs, shapes.
//!
//! # Invariants
//! - Every device allocation has exactly one owner and is freed exactly once.
//! - A shader program that compiled once stays usable until a newer build succeeds.
//! - Bind state is global to the device; callers sequence bind, use and unbind.
//!
//! All device access goes through the [`GlDevice`] trait. The OpenGL backend
//! lives in `marchlight-render-glow`; [`RecordingDevice`] is an in-memory
//! backend that needs no GPU and records every call for inspection.

mod buffer;
mod device;
mod error;
pub mod frame;
pub mod light;
mod recording;
mod resource;
mod shader;
mod shape;
mod texture;
pub mod uniform;

pub use buffer::{IndexBuffer, VertexArray, VertexBuffer};
pub use device::{
    BindTarget, BufferUsage, Capability, ClearFlags, CubeFace, Face, Filter, GlDevice, IndexType,
    PixelFormat, Primitive, RawHandle, ResourceKind, ShaderStage, TexImageTarget, TextureParam,
    UniformLocation, VertexAttrib, Winding, Wrap,
};
pub use error::GpuError;
pub use recording::{GlCall, RecordingDevice};
pub use resource::GpuResource;
pub use shader::{
    CompileOutcome, Diagnostics, ProgramState, ReloadOutcome, ShaderError, ShaderProgram,
    SharedProgram, StageLog, compile_program,
};
pub use shape::{Drawable, Shape, ShapeKind, Transform2d};
pub use texture::{CubeTexture, DecodedImage, Texture2d, TextureError, TextureRole};
pub use uniform::UniformValue;
