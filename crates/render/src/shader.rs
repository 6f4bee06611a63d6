//! Shader programs built from a vertex and a fragment source file.
//!
//! The fragment file's modification time is polled once per frame. A changed
//! timestamp triggers a full rebuild from both files. The rebuilt program
//! replaces the live one only when it links; otherwise the previous program
//! keeps drawing and the diagnostics are logged and kept for display.

use crate::{GlDevice, GpuError, RawHandle, ShaderStage, UniformLocation, UniformValue};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::SystemTime;

/// Shader program shared by every shape that draws with it.
pub type SharedProgram<D> = Rc<RefCell<ShaderProgram<D>>>;

#[derive(Debug, thiserror::Error)]
pub enum ShaderError {
    #[error("failed to read shader source {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Device(#[from] GpuError),
}

/// Compiler or linker output for one step of a build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageLog {
    /// `None` for the link step.
    pub stage: Option<ShaderStage>,
    pub log: String,
}

/// Everything the device reported about a failed build.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnostics {
    pub logs: Vec<StageLog>,
}

impl Diagnostics {
    pub fn is_empty(&self) -> bool {
        self.logs.is_empty()
    }

    fn push(&mut self, stage: Option<ShaderStage>, log: String) {
        self.logs.push(StageLog { stage, log });
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.logs {
            match entry.stage {
                Some(stage) => writeln!(f, "{stage} shader: {}", entry.log.trim_end())?,
                None => writeln!(f, "link: {}", entry.log.trim_end())?,
            }
        }
        Ok(())
    }
}

/// Result of one compile-and-link attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompileOutcome {
    Linked(RawHandle),
    Failed(Diagnostics),
}

/// Result of the last build attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramState {
    Compiled,
    Failed,
}

/// What a hot-reload poll did.
#[derive(Debug)]
pub enum ReloadOutcome {
    /// Timestamp unchanged, or the file could not be stat'ed.
    Unchanged,
    /// A new program is live; the previous one was freed.
    Reloaded,
    /// The new sources did not build; the previous program is still live.
    Rejected(Diagnostics),
    /// Sources could not be read or the device refused; the previous program is still live.
    Error(ShaderError),
}

impl ReloadOutcome {
    pub fn is_reloaded(&self) -> bool {
        matches!(self, ReloadOutcome::Reloaded)
    }

    pub fn is_unchanged(&self) -> bool {
        matches!(self, ReloadOutcome::Unchanged)
    }
}

pub struct ShaderProgram<D: GlDevice + ?Sized> {
    device: Rc<D>,
    vertex_path: PathBuf,
    fragment_path: PathBuf,
    program: Option<RawHandle>,
    state: ProgramState,
    diagnostics: Option<Diagnostics>,
    fragment_modified: Option<SystemTime>,
    // Looked-up locations of the live program, dropped whenever it changes.
    locations: RefCell<HashMap<String, Option<UniformLocation>>>,
}

impl<D: GlDevice + ?Sized> ShaderProgram<D> {
    /// Read both sources and build the program.
    ///
    /// Unreadable sources fail construction. A program that does not compile
    /// or link is still returned, without a usable program; check
    /// [`is_usable`](Self::is_usable) and [`diagnostics`](Self::diagnostics).
    pub fn from_files(
        device: &Rc<D>,
        vertex_path: impl Into<PathBuf>,
        fragment_path: impl Into<PathBuf>,
    ) -> Result<Self, ShaderError> {
        let vertex_path = vertex_path.into();
        let fragment_path = fragment_path.into();
        let vertex_src = read_source(&vertex_path)?;
        let fragment_src = read_source(&fragment_path)?;

        let mut program = Self {
            device: Rc::clone(device),
            fragment_modified: modified_time(&fragment_path),
            vertex_path,
            fragment_path,
            program: None,
            state: ProgramState::Failed,
            diagnostics: None,
            locations: RefCell::default(),
        };

        match compile_program(&**device, &vertex_src, &fragment_src)? {
            CompileOutcome::Linked(handle) => {
                program.program = Some(handle);
                program.state = ProgramState::Compiled;
                tracing::info!(
                    "compiled shader program {handle} from {}",
                    program.fragment_path.display()
                );
            }
            CompileOutcome::Failed(diagnostics) => {
                tracing::error!(
                    "shader program {} failed to build:\n{diagnostics}",
                    program.fragment_path.display()
                );
                program.diagnostics = Some(diagnostics);
            }
        }
        Ok(program)
    }

    /// Wrap in the shared handle shapes hold.
    pub fn shared(self) -> SharedProgram<D> {
        Rc::new(RefCell::new(self))
    }

    pub fn vertex_path(&self) -> &Path {
        &self.vertex_path
    }

    pub fn fragment_path(&self) -> &Path {
        &self.fragment_path
    }

    pub fn program_id(&self) -> Option<RawHandle> {
        self.program
    }

    pub fn state(&self) -> ProgramState {
        self.state
    }

    /// Whether a linked program is available for drawing.
    pub fn is_usable(&self) -> bool {
        self.program.is_some()
    }

    /// Output of the most recent failed build, cleared by the next success.
    pub fn diagnostics(&self) -> Option<&Diagnostics> {
        self.diagnostics.as_ref()
    }

    pub fn activate(&self) {
        if let Some(handle) = self.program {
            self.device.use_program(Some(handle));
        }
    }

    /// Write a uniform of the live program. The program must be active.
    pub fn set_uniform(&self, name: &str, value: impl Into<UniformValue>) {
        if let Some(handle) = self.program {
            let location = *self
                .locations
                .borrow_mut()
                .entry(name.to_string())
                .or_insert_with(|| self.device.uniform_location(handle, name));
            self.device.set_uniform(location.as_ref(), value.into());
        }
    }

    /// Poll the fragment file and rebuild when its modification time changed.
    pub fn check_and_hotplug(&mut self) -> ReloadOutcome {
        let Some(modified) = modified_time(&self.fragment_path) else {
            return ReloadOutcome::Unchanged;
        };
        if self.fragment_modified == Some(modified) {
            return ReloadOutcome::Unchanged;
        }
        self.fragment_modified = Some(modified);
        self.recompile()
    }

    /// Rebuild from both files now, keeping the live program unless the build links.
    pub fn recompile(&mut self) -> ReloadOutcome {
        let sources = read_source(&self.vertex_path)
            .and_then(|v| read_source(&self.fragment_path).map(|f| (v, f)));
        let (vertex_src, fragment_src) = match sources {
            Ok(sources) => sources,
            Err(err) => {
                tracing::warn!("shader reload skipped: {err}");
                return ReloadOutcome::Error(err);
            }
        };

        match compile_program(&*self.device, &vertex_src, &fragment_src) {
            Ok(CompileOutcome::Linked(handle)) => {
                if let Some(previous) = self.program.replace(handle) {
                    self.device.delete_program(previous);
                }
                self.locations.get_mut().clear();
                self.state = ProgramState::Compiled;
                self.diagnostics = None;
                tracing::info!(
                    "reloaded shader program {handle} from {}",
                    self.fragment_path.display()
                );
                ReloadOutcome::Reloaded
            }
            Ok(CompileOutcome::Failed(diagnostics)) => {
                tracing::warn!(
                    "shader reload of {} rejected, keeping previous program:\n{diagnostics}",
                    self.fragment_path.display()
                );
                self.state = ProgramState::Failed;
                self.diagnostics = Some(diagnostics.clone());
                ReloadOutcome::Rejected(diagnostics)
            }
            Err(err) => {
                tracing::error!("shader reload failed: {err}");
                ReloadOutcome::Error(ShaderError::Device(err))
            }
        }
    }

    pub fn release(&mut self) {
        self.locations.get_mut().clear();
        if let Some(handle) = self.program.take() {
            self.device.delete_program(handle);
            tracing::debug!("released shader program {handle}");
        }
    }
}

impl<D: GlDevice + ?Sized> Drop for ShaderProgram<D> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<D: GlDevice + ?Sized> fmt::Debug for ShaderProgram<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("vertex_path", &self.vertex_path)
            .field("fragment_path", &self.fragment_path)
            .field("program", &self.program)
            .field("state", &self.state)
            .finish()
    }
}

/// Compile both stages and link them into a fresh program.
///
/// Shader objects are always freed. A failed build frees the new program
/// and leaves nothing else on the device.
pub fn compile_program<D: GlDevice + ?Sized>(
    device: &D,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<CompileOutcome, GpuError> {
    let mut diagnostics = Diagnostics::default();

    let vertex = compile_stage(device, ShaderStage::Vertex, vertex_src, &mut diagnostics)?;
    let fragment = match compile_stage(device, ShaderStage::Fragment, fragment_src, &mut diagnostics)
    {
        Ok(fragment) => fragment,
        Err(err) => {
            device.delete_shader(vertex);
            return Err(err);
        }
    };

    let result = if diagnostics.is_empty() {
        link(device, vertex, fragment, &mut diagnostics)
    } else {
        Ok(None)
    };
    device.delete_shader(vertex);
    device.delete_shader(fragment);

    Ok(match result? {
        Some(program) => CompileOutcome::Linked(program),
        None => CompileOutcome::Failed(diagnostics),
    })
}

fn compile_stage<D: GlDevice + ?Sized>(
    device: &D,
    stage: ShaderStage,
    source: &str,
    diagnostics: &mut Diagnostics,
) -> Result<RawHandle, GpuError> {
    let shader = device.create_shader(stage)?;
    device.shader_source(shader, source);
    device.compile_shader(shader);
    if !device.shader_compile_status(shader) {
        diagnostics.push(Some(stage), device.shader_info_log(shader));
    }
    Ok(shader)
}

fn link<D: GlDevice + ?Sized>(
    device: &D,
    vertex: RawHandle,
    fragment: RawHandle,
    diagnostics: &mut Diagnostics,
) -> Result<Option<RawHandle>, GpuError> {
    let program = device.create_program()?;
    device.attach_shader(program, vertex);
    device.attach_shader(program, fragment);
    device.link_program(program);
    if device.program_link_status(program) {
        Ok(Some(program))
    } else {
        diagnostics.push(None, device.program_info_log(program));
        device.delete_program(program);
        Ok(None)
    }
}

fn read_source(path: &Path) -> Result<String, ShaderError> {
    std::fs::read_to_string(path).map_err(|source| ShaderError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
