use glam::Vec4;
use glow::HasContext;
use marchlight_render::{
    BindTarget, BufferUsage, Capability, ClearFlags, CubeFace, Face, Filter, GlDevice, GpuError,
    IndexType, PixelFormat, Primitive, RawHandle, ResourceKind, ShaderStage, TexImageTarget,
    TextureParam, UniformLocation, UniformValue, VertexAttrib, Winding, Wrap,
};
use std::cell::Cell;
use std::sync::Arc;

/// [`GlDevice`] over a shared `glow` context.
pub struct GlowDevice {
    gl: Arc<glow::Context>,
    f64_narrowed: Cell<bool>,
}

impl GlowDevice {
    /// # Safety
    ///
    /// `gl` must have been loaded for an OpenGL 4.3 core context that is
    /// current on this thread, and must stay current for as long as this
    /// device or any resource created from it is alive.
    pub unsafe fn new(gl: Arc<glow::Context>) -> Self {
        let device = Self {
            gl,
            f64_narrowed: Cell::new(false),
        };
        // SAFETY: the caller guarantees a current context.
        unsafe {
            let version = device.gl.get_parameter_string(glow::VERSION);
            let renderer = device.gl.get_parameter_string(glow::RENDERER);
            tracing::info!("OpenGL {version} on {renderer}");
        }
        device
    }

    /// The wrapped context, for sharing with other GL users such as the UI painter.
    pub fn context(&self) -> &Arc<glow::Context> {
        &self.gl
    }
}

impl GlDevice for GlowDevice {
    fn create_object(&self, kind: ResourceKind) -> Result<RawHandle, GpuError> {
        // SAFETY (all methods below): `new` requires a current context.
        let created = unsafe {
            match kind {
                ResourceKind::VertexBuffer | ResourceKind::IndexBuffer => {
                    self.gl.create_buffer().map(|b| b.0)
                }
                ResourceKind::VertexArray => self.gl.create_vertex_array().map(|a| a.0),
                ResourceKind::Texture2d | ResourceKind::TextureCube => {
                    self.gl.create_texture().map(|t| t.0)
                }
            }
        };
        created
            .map(RawHandle)
            .map_err(|message| GpuError::create(kind.name(), message))
    }

    fn delete_object(&self, kind: ResourceKind, handle: RawHandle) {
        unsafe {
            match kind {
                ResourceKind::VertexBuffer | ResourceKind::IndexBuffer => {
                    self.gl.delete_buffer(glow::NativeBuffer(handle.0))
                }
                ResourceKind::VertexArray => {
                    self.gl.delete_vertex_array(glow::NativeVertexArray(handle.0))
                }
                ResourceKind::Texture2d | ResourceKind::TextureCube => {
                    self.gl.delete_texture(glow::NativeTexture(handle.0))
                }
            }
        }
    }

    fn bind_object(&self, target: BindTarget, handle: Option<RawHandle>) {
        unsafe {
            match target {
                BindTarget::ArrayBuffer | BindTarget::ElementArrayBuffer => self
                    .gl
                    .bind_buffer(bind_target(target), handle.map(|h| glow::NativeBuffer(h.0))),
                BindTarget::VertexArray => self
                    .gl
                    .bind_vertex_array(handle.map(|h| glow::NativeVertexArray(h.0))),
                BindTarget::Texture2d | BindTarget::TextureCubeMap => self
                    .gl
                    .bind_texture(bind_target(target), handle.map(|h| glow::NativeTexture(h.0))),
            }
        }
    }

    fn buffer_data(&self, target: BindTarget, data: &[u8], usage: BufferUsage) {
        unsafe {
            self.gl
                .buffer_data_u8_slice(bind_target(target), data, buffer_usage(usage))
        }
    }

    fn vertex_attrib(&self, attrib: VertexAttrib) {
        unsafe {
            self.gl.vertex_attrib_pointer_f32(
                attrib.location,
                attrib.components,
                glow::FLOAT,
                false,
                attrib.stride,
                attrib.offset,
            );
            self.gl.enable_vertex_attrib_array(attrib.location);
        }
    }

    fn active_texture(&self, unit: u32) {
        unsafe { self.gl.active_texture(glow::TEXTURE0 + unit) }
    }

    fn texture_parameter(&self, target: BindTarget, param: TextureParam) {
        let (name, value) = match param {
            TextureParam::MinFilter(f) => (glow::TEXTURE_MIN_FILTER, filter(f)),
            TextureParam::MagFilter(f) => (glow::TEXTURE_MAG_FILTER, filter(f)),
            TextureParam::WrapS(w) => (glow::TEXTURE_WRAP_S, wrap(w)),
            TextureParam::WrapT(w) => (glow::TEXTURE_WRAP_T, wrap(w)),
            TextureParam::WrapR(w) => (glow::TEXTURE_WRAP_R, wrap(w)),
        };
        unsafe {
            self.gl
                .tex_parameter_i32(bind_target(target), name, value as i32)
        }
    }

    fn tex_image_2d(
        &self,
        target: TexImageTarget,
        width: u32,
        height: u32,
        format: PixelFormat,
        pixels: &[u8],
    ) {
        unsafe {
            // Rows of 1- and 3-channel images are not 4-byte aligned.
            self.gl.pixel_store_i32(glow::UNPACK_ALIGNMENT, 1);
            self.gl.tex_image_2d(
                tex_image_target(target),
                0,
                glow::RGBA as i32,
                width as i32,
                height as i32,
                0,
                pixel_format(format),
                glow::UNSIGNED_BYTE,
                glow::PixelUnpackData::Slice(Some(pixels)),
            );
        }
    }

    fn generate_mipmap(&self, target: BindTarget) {
        unsafe { self.gl.generate_mipmap(bind_target(target)) }
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<RawHandle, GpuError> {
        unsafe { self.gl.create_shader(shader_stage(stage)) }
            .map(|s| RawHandle(s.0))
            .map_err(|message| GpuError::create("shader", message))
    }

    fn shader_source(&self, shader: RawHandle, source: &str) {
        unsafe { self.gl.shader_source(glow::NativeShader(shader.0), source) }
    }

    fn compile_shader(&self, shader: RawHandle) {
        unsafe { self.gl.compile_shader(glow::NativeShader(shader.0)) }
    }

    fn shader_compile_status(&self, shader: RawHandle) -> bool {
        unsafe { self.gl.get_shader_compile_status(glow::NativeShader(shader.0)) }
    }

    fn shader_info_log(&self, shader: RawHandle) -> String {
        unsafe { self.gl.get_shader_info_log(glow::NativeShader(shader.0)) }
    }

    fn delete_shader(&self, shader: RawHandle) {
        unsafe { self.gl.delete_shader(glow::NativeShader(shader.0)) }
    }

    fn create_program(&self) -> Result<RawHandle, GpuError> {
        unsafe { self.gl.create_program() }
            .map(|p| RawHandle(p.0))
            .map_err(|message| GpuError::create("program", message))
    }

    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        unsafe {
            self.gl
                .attach_shader(glow::NativeProgram(program.0), glow::NativeShader(shader.0))
        }
    }

    fn link_program(&self, program: RawHandle) {
        unsafe { self.gl.link_program(glow::NativeProgram(program.0)) }
    }

    fn program_link_status(&self, program: RawHandle) -> bool {
        unsafe { self.gl.get_program_link_status(glow::NativeProgram(program.0)) }
    }

    fn program_info_log(&self, program: RawHandle) -> String {
        unsafe { self.gl.get_program_info_log(glow::NativeProgram(program.0)) }
    }

    fn delete_program(&self, program: RawHandle) {
        unsafe { self.gl.delete_program(glow::NativeProgram(program.0)) }
    }

    fn use_program(&self, program: Option<RawHandle>) {
        unsafe { self.gl.use_program(program.map(|p| glow::NativeProgram(p.0))) }
    }

    fn uniform_location(&self, program: RawHandle, name: &str) -> Option<UniformLocation> {
        unsafe {
            self.gl
                .get_uniform_location(glow::NativeProgram(program.0), name)
        }
        .map(|l| UniformLocation(l.0))
    }

    fn set_uniform(&self, location: Option<&UniformLocation>, value: UniformValue) {
        let location = location.map(|l| glow::NativeUniformLocation(l.0));
        let loc = location.as_ref();
        unsafe {
            match value {
                UniformValue::F32(x) => self.gl.uniform_1_f32(loc, x),
                UniformValue::I32(x) => self.gl.uniform_1_i32(loc, x),
                UniformValue::U32(x) => self.gl.uniform_1_u32(loc, x),
                UniformValue::F64(x) => {
                    if first_narrowing(&self.f64_narrowed) {
                        tracing::warn!(
                            "f64 uniforms are written as float; GLSL double uniforms will not receive them"
                        );
                    }
                    self.gl.uniform_1_f32(loc, x as f32)
                }
                UniformValue::Vec2(v) => self.gl.uniform_2_f32(loc, v.x, v.y),
                UniformValue::Vec3(v) => self.gl.uniform_3_f32(loc, v.x, v.y, v.z),
                UniformValue::Vec4(v) => self.gl.uniform_4_f32(loc, v.x, v.y, v.z, v.w),
                UniformValue::Mat2(m) => {
                    self.gl
                        .uniform_matrix_2_f32_slice(loc, false, &m.to_cols_array())
                }
                UniformValue::Mat3(m) => {
                    self.gl
                        .uniform_matrix_3_f32_slice(loc, false, &m.to_cols_array())
                }
                UniformValue::Mat4(m) => {
                    self.gl
                        .uniform_matrix_4_f32_slice(loc, false, &m.to_cols_array())
                }
            }
        }
    }

    fn draw_elements(&self, primitive: Primitive, count: i32, index_type: IndexType, offset: i32) {
        unsafe {
            self.gl
                .draw_elements(primitive_mode(primitive), count, index_kind(index_type), offset)
        }
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        unsafe { self.gl.viewport(x, y, width, height) }
    }

    fn clear_color(&self, color: Vec4) {
        unsafe { self.gl.clear_color(color.x, color.y, color.z, color.w) }
    }

    fn clear(&self, flags: ClearFlags) {
        let mut mask = 0;
        if flags.color {
            mask |= glow::COLOR_BUFFER_BIT;
        }
        if flags.depth {
            mask |= glow::DEPTH_BUFFER_BIT;
        }
        unsafe { self.gl.clear(mask) }
    }

    fn enable(&self, capability: Capability) {
        unsafe { self.gl.enable(capability_flag(capability)) }
    }

    fn disable(&self, capability: Capability) {
        unsafe { self.gl.disable(capability_flag(capability)) }
    }

    fn cull_face(&self, face: Face) {
        unsafe { self.gl.cull_face(face_flag(face)) }
    }

    fn front_face(&self, winding: Winding) {
        let mode = match winding {
            Winding::Clockwise => glow::CW,
            Winding::CounterClockwise => glow::CCW,
        };
        unsafe { self.gl.front_face(mode) }
    }
}

fn bind_target(target: BindTarget) -> u32 {
    match target {
        BindTarget::ArrayBuffer => glow::ARRAY_BUFFER,
        BindTarget::ElementArrayBuffer => glow::ELEMENT_ARRAY_BUFFER,
        BindTarget::VertexArray => glow::VERTEX_ARRAY,
        BindTarget::Texture2d => glow::TEXTURE_2D,
        BindTarget::TextureCubeMap => glow::TEXTURE_CUBE_MAP,
    }
}

fn buffer_usage(usage: BufferUsage) -> u32 {
    match usage {
        BufferUsage::StaticDraw => glow::STATIC_DRAW,
        BufferUsage::DynamicDraw => glow::DYNAMIC_DRAW,
    }
}

fn filter(filter: Filter) -> u32 {
    match filter {
        Filter::Nearest => glow::NEAREST,
        Filter::Linear => glow::LINEAR,
    }
}

fn wrap(wrap: Wrap) -> u32 {
    match wrap {
        Wrap::Repeat => glow::REPEAT,
        Wrap::MirroredRepeat => glow::MIRRORED_REPEAT,
        Wrap::ClampToEdge => glow::CLAMP_TO_EDGE,
    }
}

fn tex_image_target(target: TexImageTarget) -> u32 {
    match target {
        TexImageTarget::Texture2d => glow::TEXTURE_2D,
        TexImageTarget::CubeFace(face) => match face {
            CubeFace::PositiveX => glow::TEXTURE_CUBE_MAP_POSITIVE_X,
            CubeFace::NegativeX => glow::TEXTURE_CUBE_MAP_NEGATIVE_X,
            CubeFace::PositiveY => glow::TEXTURE_CUBE_MAP_POSITIVE_Y,
            CubeFace::NegativeY => glow::TEXTURE_CUBE_MAP_NEGATIVE_Y,
            CubeFace::PositiveZ => glow::TEXTURE_CUBE_MAP_POSITIVE_Z,
            CubeFace::NegativeZ => glow::TEXTURE_CUBE_MAP_NEGATIVE_Z,
        },
    }
}

fn pixel_format(format: PixelFormat) -> u32 {
    match format {
        PixelFormat::Red => glow::RED,
        PixelFormat::Rgb => glow::RGB,
        PixelFormat::Rgba => glow::RGBA,
    }
}

fn shader_stage(stage: ShaderStage) -> u32 {
    match stage {
        ShaderStage::Vertex => glow::VERTEX_SHADER,
        ShaderStage::Fragment => glow::FRAGMENT_SHADER,
    }
}

fn primitive_mode(primitive: Primitive) -> u32 {
    match primitive {
        Primitive::Triangles => glow::TRIANGLES,
        Primitive::Lines => glow::LINES,
    }
}

fn index_kind(index_type: IndexType) -> u32 {
    match index_type {
        IndexType::U16 => glow::UNSIGNED_SHORT,
        IndexType::U32 => glow::UNSIGNED_INT,
    }
}

fn capability_flag(capability: Capability) -> u32 {
    match capability {
        Capability::DepthTest => glow::DEPTH_TEST,
        Capability::CullFace => glow::CULL_FACE,
        Capability::Blend => glow::BLEND,
    }
}

fn face_flag(face: Face) -> u32 {
    match face {
        Face::Front => glow::FRONT,
        Face::Back => glow::BACK,
        Face::FrontAndBack => glow::FRONT_AND_BACK,
    }
}

/// True the first time it is called for `flag`.
fn first_narrowing(flag: &Cell<bool>) -> bool {
    !flag.replace(true)
}
