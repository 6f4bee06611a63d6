//! In-memory [`GlDevice`] that records every call.
//!
//! Stands in for a GPU wherever one is not available: unit tests, headless
//! runs, and debugging call sequences. It tracks object lifetimes, per-target
//! bindings, the active program and the last value written to each uniform,
//! and it simulates compilation: a stage whose source contains `#error` fails
//! to compile, and a program with a failed stage fails to link.

use crate::{
    BindTarget, BufferUsage, Capability, ClearFlags, Face, GlDevice, GpuError, IndexType,
    PixelFormat, Primitive, RawHandle, ResourceKind, ShaderStage, TexImageTarget, TextureParam,
    UniformLocation, UniformValue, VertexAttrib, Winding,
};
use glam::Vec4;
use std::cell::RefCell;
use std::collections::HashMap;
use std::num::NonZeroU32;

/// One recorded device call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateObject {
        kind: ResourceKind,
        handle: RawHandle,
    },
    DeleteObject {
        kind: ResourceKind,
        handle: RawHandle,
    },
    BindObject {
        target: BindTarget,
        handle: Option<RawHandle>,
    },
    BufferData {
        target: BindTarget,
        len: usize,
        usage: BufferUsage,
    },
    VertexAttrib(VertexAttrib),
    ActiveTexture(u32),
    TextureParameter {
        target: BindTarget,
        param: TextureParam,
    },
    TexImage2d {
        target: TexImageTarget,
        width: u32,
        height: u32,
        format: PixelFormat,
    },
    GenerateMipmap(BindTarget),
    CreateShader {
        stage: ShaderStage,
        handle: RawHandle,
    },
    CompileShader {
        shader: RawHandle,
        ok: bool,
    },
    DeleteShader(RawHandle),
    CreateProgram(RawHandle),
    AttachShader {
        program: RawHandle,
        shader: RawHandle,
    },
    LinkProgram {
        program: RawHandle,
        ok: bool,
    },
    DeleteProgram(RawHandle),
    UseProgram(Option<RawHandle>),
    SetUniform {
        name: Option<String>,
        value: UniformValue,
    },
    DrawElements {
        primitive: Primitive,
        count: i32,
        index_type: IndexType,
        offset: i32,
    },
    Viewport {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    ClearColor(Vec4),
    Clear(ClearFlags),
    Enable(Capability),
    Disable(Capability),
    CullFace(Face),
    FrontFace(Winding),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tracked {
    Object(ResourceKind),
    Shader,
    Program,
}

#[derive(Debug, Default)]
struct ShaderRecord {
    source: String,
    compiled: Option<bool>,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramRecord {
    attached: Vec<RawHandle>,
    linked: Option<bool>,
    log: String,
}

#[derive(Debug, Default)]
struct State {
    last_name: u32,
    calls: Vec<GlCall>,
    live: HashMap<RawHandle, Tracked>,
    invalid_deletes: usize,
    bound: HashMap<BindTarget, RawHandle>,
    active_program: Option<RawHandle>,
    shaders: HashMap<RawHandle, ShaderRecord>,
    programs: HashMap<RawHandle, ProgramRecord>,
    locations: Vec<(RawHandle, String)>,
    location_lookups: usize,
    uniforms: HashMap<(RawHandle, String), UniformValue>,
    fail_allocations: bool,
    fail_links: bool,
}

impl State {
    fn allocate(&mut self, what: &'static str, tracked: Tracked) -> Result<RawHandle, GpuError> {
        if self.fail_allocations {
            return Err(GpuError::create(what, "allocation failure requested"));
        }
        let name = self
            .last_name
            .checked_add(1)
            .and_then(NonZeroU32::new)
            .ok_or_else(|| GpuError::create(what, "object names exhausted"))?;
        self.last_name = name.get();
        let handle = RawHandle(name);
        self.live.insert(handle, tracked);
        Ok(handle)
    }

    fn free(&mut self, handle: RawHandle, expected: Tracked) -> bool {
        match self.live.get(&handle) {
            Some(t) if *t == expected => {
                self.live.remove(&handle);
                true
            }
            _ => {
                self.invalid_deletes += 1;
                false
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct RecordingDevice {
    state: RefCell<State>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent create call fail.
    pub fn set_allocation_failure(&self, fail: bool) {
        self.state.borrow_mut().fail_allocations = fail;
    }

    /// Make every subsequent link fail regardless of the attached stages.
    pub fn set_link_failure(&self, fail: bool) {
        self.state.borrow_mut().fail_links = fail;
    }

    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, pred: impl Fn(&GlCall) -> bool) -> usize {
        self.state.borrow().calls.iter().filter(|c| pred(c)).count()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    pub fn draw_calls(&self) -> Vec<GlCall> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, GlCall::DrawElements { .. }))
            .cloned()
            .collect()
    }

    /// Live buffers, vertex arrays and textures.
    pub fn live_objects(&self) -> usize {
        self.count_live(|t| matches!(t, Tracked::Object(_)))
    }

    pub fn live_shaders(&self) -> usize {
        self.count_live(|t| t == Tracked::Shader)
    }

    pub fn live_programs(&self) -> usize {
        self.count_live(|t| t == Tracked::Program)
    }

    pub fn is_live(&self, handle: RawHandle) -> bool {
        self.state.borrow().live.contains_key(&handle)
    }

    /// Deletes of names that were never created or already freed.
    pub fn invalid_deletes(&self) -> usize {
        self.state.borrow().invalid_deletes
    }

    pub fn bound(&self, target: BindTarget) -> Option<RawHandle> {
        self.state.borrow().bound.get(&target).copied()
    }

    pub fn active_program(&self) -> Option<RawHandle> {
        self.state.borrow().active_program
    }

    /// Number of `uniform_location` queries made so far.
    pub fn location_lookups(&self) -> usize {
        self.state.borrow().location_lookups
    }

    /// Last value written to `name` in `program`.
    pub fn uniform(&self, program: RawHandle, name: &str) -> Option<UniformValue> {
        self.state
            .borrow()
            .uniforms
            .get(&(program, name.to_string()))
            .copied()
    }

    /// Last value written to `name` in the currently active program.
    pub fn active_uniform(&self, name: &str) -> Option<UniformValue> {
        let program = self.active_program()?;
        self.uniform(program, name)
    }

    fn count_live(&self, pred: impl Fn(Tracked) -> bool) -> usize {
        self.state.borrow().live.values().filter(|t| pred(**t)).count()
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

impl GlDevice for RecordingDevice {
    fn create_object(&self, kind: ResourceKind) -> Result<RawHandle, GpuError> {
        let handle = self
            .state
            .borrow_mut()
            .allocate(kind.name(), Tracked::Object(kind))?;
        self.record(GlCall::CreateObject { kind, handle });
        Ok(handle)
    }

    fn delete_object(&self, kind: ResourceKind, handle: RawHandle) {
        let mut state = self.state.borrow_mut();
        if state.free(handle, Tracked::Object(kind)) {
            let target = kind.target();
            if state.bound.get(&target) == Some(&handle) {
                state.bound.remove(&target);
            }
        }
        state.calls.push(GlCall::DeleteObject { kind, handle });
    }

    fn bind_object(&self, target: BindTarget, handle: Option<RawHandle>) {
        let mut state = self.state.borrow_mut();
        match handle {
            Some(h) => state.bound.insert(target, h),
            None => state.bound.remove(&target),
        };
        state.calls.push(GlCall::BindObject { target, handle });
    }

    fn buffer_data(&self, target: BindTarget, data: &[u8], usage: BufferUsage) {
        self.record(GlCall::BufferData {
            target,
            len: data.len(),
            usage,
        });
    }

    fn vertex_attrib(&self, attrib: VertexAttrib) {
        self.record(GlCall::VertexAttrib(attrib));
    }

    fn active_texture(&self, unit: u32) {
        self.record(GlCall::ActiveTexture(unit));
    }

    fn texture_parameter(&self, target: BindTarget, param: TextureParam) {
        self.record(GlCall::TextureParameter { target, param });
    }

    fn tex_image_2d(
        &self,
        target: TexImageTarget,
        width: u32,
        height: u32,
        format: PixelFormat,
        _pixels: &[u8],
    ) {
        self.record(GlCall::TexImage2d {
            target,
            width,
            height,
            format,
        });
    }

    fn generate_mipmap(&self, target: BindTarget) {
        self.record(GlCall::GenerateMipmap(target));
    }

    fn create_shader(&self, stage: ShaderStage) -> Result<RawHandle, GpuError> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate("shader", Tracked::Shader)?;
        state.shaders.insert(handle, ShaderRecord::default());
        state.calls.push(GlCall::CreateShader { stage, handle });
        Ok(handle)
    }

    fn shader_source(&self, shader: RawHandle, source: &str) {
        if let Some(record) = self.state.borrow_mut().shaders.get_mut(&shader) {
            record.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: RawHandle) {
        let mut state = self.state.borrow_mut();
        let ok = match state.shaders.get_mut(&shader) {
            Some(record) => {
                let ok = !record.source.contains("#error");
                record.compiled = Some(ok);
                record.log = if ok {
                    String::new()
                } else {
                    "ERROR: 0:1: '#error' : user error directive".to_string()
                };
                ok
            }
            None => false,
        };
        state.calls.push(GlCall::CompileShader { shader, ok });
    }

    fn shader_compile_status(&self, shader: RawHandle) -> bool {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .and_then(|r| r.compiled)
            .unwrap_or(false)
    }

    fn shader_info_log(&self, shader: RawHandle) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|r| r.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: RawHandle) {
        let mut state = self.state.borrow_mut();
        if state.free(shader, Tracked::Shader) {
            state.shaders.remove(&shader);
        }
        state.calls.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<RawHandle, GpuError> {
        let mut state = self.state.borrow_mut();
        let handle = state.allocate("program", Tracked::Program)?;
        state.programs.insert(handle, ProgramRecord::default());
        state.calls.push(GlCall::CreateProgram(handle));
        Ok(handle)
    }

    fn attach_shader(&self, program: RawHandle, shader: RawHandle) {
        let mut state = self.state.borrow_mut();
        if let Some(record) = state.programs.get_mut(&program) {
            record.attached.push(shader);
        }
        state.calls.push(GlCall::AttachShader { program, shader });
    }

    fn link_program(&self, program: RawHandle) {
        let mut state = self.state.borrow_mut();
        let forced = state.fail_links;
        let stages_ok = state.programs.get(&program).is_some_and(|record| {
            !record.attached.is_empty()
                && record
                    .attached
                    .iter()
                    .all(|s| state.shaders.get(s).and_then(|r| r.compiled) == Some(true))
        });
        let ok = stages_ok && !forced;
        if let Some(record) = state.programs.get_mut(&program) {
            record.linked = Some(ok);
            record.log = match (ok, forced) {
                (true, _) => String::new(),
                (false, true) => "error: linking failed".to_string(),
                (false, false) => "error: attached shader failed to compile".to_string(),
            };
        }
        state.calls.push(GlCall::LinkProgram { program, ok });
    }

    fn program_link_status(&self, program: RawHandle) -> bool {
        self.state
            .borrow()
            .programs
            .get(&program)
            .and_then(|r| r.linked)
            .unwrap_or(false)
    }

    fn program_info_log(&self, program: RawHandle) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|r| r.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: RawHandle) {
        let mut state = self.state.borrow_mut();
        if state.free(program, Tracked::Program) {
            state.programs.remove(&program);
            if state.active_program == Some(program) {
                state.active_program = None;
            }
        }
        state.calls.push(GlCall::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<RawHandle>) {
        let mut state = self.state.borrow_mut();
        state.active_program = program;
        state.calls.push(GlCall::UseProgram(program));
    }

    fn uniform_location(&self, program: RawHandle, name: &str) -> Option<UniformLocation> {
        let mut state = self.state.borrow_mut();
        state.location_lookups += 1;
        let linked = state.programs.get(&program).and_then(|r| r.linked) == Some(true);
        if !linked {
            return None;
        }
        let index = match state
            .locations
            .iter()
            .position(|(p, n)| *p == program && n == name)
        {
            Some(index) => index,
            None => {
                state.locations.push((program, name.to_string()));
                state.locations.len() - 1
            }
        };
        Some(UniformLocation(index as u32))
    }

    fn set_uniform(&self, location: Option<&UniformLocation>, value: UniformValue) {
        let mut state = self.state.borrow_mut();
        let target = location.and_then(|l| state.locations.get(l.0 as usize).cloned());
        let name = target.as_ref().map(|(_, n)| n.clone());
        if let Some(key) = target {
            state.uniforms.insert(key, value);
        }
        state.calls.push(GlCall::SetUniform { name, value });
    }

    fn draw_elements(&self, primitive: Primitive, count: i32, index_type: IndexType, offset: i32) {
        self.record(GlCall::DrawElements {
            primitive,
            count,
            index_type,
            offset,
        });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear_color(&self, color: Vec4) {
        self.record(GlCall::ClearColor(color));
    }

    fn clear(&self, flags: ClearFlags) {
        self.record(GlCall::Clear(flags));
    }

    fn enable(&self, capability: Capability) {
        self.record(GlCall::Enable(capability));
    }

    fn disable(&self, capability: Capability) {
        self.record(GlCall::Disable(capability));
    }

    fn cull_face(&self, face: Face) {
        self.record(GlCall::CullFace(face));
    }

    fn front_face(&self, winding: Winding) {
        self.record(GlCall::FrontFace(winding));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compiled(device: &RecordingDevice, stage: ShaderStage, source: &str) -> RawHandle {
        let s = device.create_shader(stage).unwrap();
        device.shader_source(s, source);
        device.compile_shader(s);
        s
    }

    #[test]
    fn names_are_unique_and_nonzero() {
        let device = RecordingDevice::new();
        let a = device.create_object(ResourceKind::VertexBuffer).unwrap();
        let b = device.create_program().unwrap();
        assert_ne!(a, b);
        assert!(a.get() > 0);
    }

    #[test]
    fn double_delete_is_counted() {
        let device = RecordingDevice::new();
        let a = device.create_object(ResourceKind::VertexBuffer).unwrap();
        device.delete_object(ResourceKind::VertexBuffer, a);
        device.delete_object(ResourceKind::VertexBuffer, a);
        assert_eq!(device.invalid_deletes(), 1);
    }

    #[test]
    fn simulated_compile_and_link() {
        let device = RecordingDevice::new();
        let good = compiled(&device, ShaderStage::Vertex, "void main() {}");
        let bad = compiled(&device, ShaderStage::Fragment, "#error nope");
        assert!(device.shader_compile_status(good));
        assert!(!device.shader_compile_status(bad));
        assert!(device.shader_info_log(bad).contains("#error"));

        let p = device.create_program().unwrap();
        device.attach_shader(p, good);
        device.attach_shader(p, bad);
        device.link_program(p);
        assert!(!device.program_link_status(p));
        assert!(device.uniform_location(p, "x").is_none());
    }

    #[test]
    fn uniforms_are_tracked_per_program() {
        let device = RecordingDevice::new();
        let vs = compiled(&device, ShaderStage::Vertex, "void main() {}");
        let p = device.create_program().unwrap();
        device.attach_shader(p, vs);
        device.link_program(p);
        device.use_program(Some(p));

        let loc = device.uniform_location(p, "time");
        assert_eq!(loc, device.uniform_location(p, "time"));
        device.set_uniform(loc.as_ref(), UniformValue::F32(2.0));
        assert_eq!(device.uniform(p, "time"), Some(UniformValue::F32(2.0)));
        assert_eq!(device.active_uniform("time"), Some(UniformValue::F32(2.0)));

        device.set_uniform(None, UniformValue::F32(9.0));
        assert_eq!(device.uniform(p, "time"), Some(UniformValue::F32(2.0)));
    }

    #[test]
    fn forced_link_failure() {
        let device = RecordingDevice::new();
        device.set_link_failure(true);
        let vs = compiled(&device, ShaderStage::Vertex, "void main() {}");
        let p = device.create_program().unwrap();
        device.attach_shader(p, vs);
        device.link_program(p);
        assert!(!device.program_link_status(p));
        assert!(device.program_info_log(p).contains("linking failed"));
    }
}
