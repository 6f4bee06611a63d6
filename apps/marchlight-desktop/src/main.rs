mod gl;
mod keys;
mod panel;
mod scene;

use anyhow::Result;
use clap::Parser;
use glam::{Vec2, Vec3};
use marchlight_camera::{Camera, SceneView};
use marchlight_common::{SceneParams, Viewport};
use marchlight_input::{
    Clock, ControllerConfig, CursorMode, InputSource, Key, MovementController, PolledInput,
    SystemClock,
};
use marchlight_render::{
    Drawable, Face, ReloadOutcome, ShaderProgram, Shape, SharedProgram, Winding, frame,
};
use marchlight_render_glow::GlowDevice;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalPosition;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::PhysicalKey;
use winit::window::{CursorGrabMode, Window, WindowId};

const SHADER_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/shaders");

#[derive(Parser)]
#[command(name = "marchlight", about = "Real-time ray-marched scene with live shader reload")]
struct Cli {
    /// Vertex shader source
    #[arg(long, default_value_t = format!("{SHADER_DIR}/scene.vert"))]
    vertex: String,

    /// Fragment shader source, watched for changes
    #[arg(long, default_value_t = format!("{SHADER_DIR}/scene.frag"))]
    fragment: String,

    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 480)]
    height: u32,

    /// Scene parameters JSON, loaded at startup and written by the panel's Save button
    #[arg(long, default_value = "scene.json")]
    params: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Everything that needs a live GL context.
///
/// Field order is drop order: GL objects go before the device and context.
struct Gfx {
    quad: Shape<GlowDevice>,
    shader: SharedProgram<GlowDevice>,
    egui: egui_glow::EguiGlow,
    device: Rc<GlowDevice>,
    target: gl::GlWindowContext,
}

impl Gfx {
    fn create(event_loop: &ActiveEventLoop, cli: &Cli) -> Result<Self> {
        let target = gl::GlWindowContext::create(event_loop, "Marchlight", cli.width, cli.height)?;
        // SAFETY: `target` made its context current on this thread and is dropped last.
        let device = Rc::new(unsafe { GlowDevice::new(Arc::clone(&target.gl)) });

        let shader = ShaderProgram::from_files(&device, &cli.vertex, &cli.fragment)?.shared();
        let mut quad = Shape::quad(&device, Rc::clone(&shader))?;
        // Two units wide covers clip space.
        quad.set_proportions(Vec2::splat(2.0));

        let egui = egui_glow::EguiGlow::new(event_loop, Arc::clone(&target.gl), None, None, true);

        Ok(Self {
            quad,
            shader,
            egui,
            device,
            target,
        })
    }

    fn window(&self) -> &Window {
        &self.target.window
    }
}

struct App {
    cli: Cli,
    params: SceneParams,
    view: SceneView,
    input: PolledInput,
    controller: MovementController,
    clock: SystemClock,
    captured: bool,
    reload_error: Option<String>,
    gfx: Option<Gfx>,
    startup_error: Option<anyhow::Error>,
}

impl App {
    fn new(cli: Cli) -> Self {
        let params = load_params(&cli.params);
        let viewport = Viewport::new(cli.width, cli.height);
        let mut camera = Camera::with_aspect_ratio(viewport.aspect_ratio());
        camera.fov = params.fov;

        let mut controller = MovementController::new(ControllerConfig::default());
        controller.set_base_speed(Vec3::splat(params.base_speed()));

        Self {
            cli,
            params,
            view: SceneView::new(camera, viewport),
            input: PolledInput::new(),
            controller,
            clock: SystemClock::new(),
            captured: true,
            reload_error: None,
            gfx: None,
            startup_error: None,
        }
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: Key, pressed: bool) {
        if !pressed {
            self.input.release(key);
            return;
        }
        if !self.input.press(key) {
            return;
        }
        match key {
            Key::Escape => event_loop.exit(),
            Key::F => self.toggle_capture(),
            _ => {}
        }
    }

    fn toggle_capture(&mut self) {
        self.captured = !self.captured;
        if self.captured {
            // The next update re-disables the cursor and takes a fresh baseline.
            self.controller.reset();
        } else {
            self.input.set_cursor_mode(CursorMode::Normal);
        }
        tracing::debug!("cursor captured: {}", self.captured);
    }

    fn save_params(&self) {
        if let Err(e) = self.params.save(&self.cli.params) {
            tracing::error!("failed to save scene params: {e}");
        }
    }

    fn redraw(&mut self) {
        let Some(gfx) = self.gfx.as_mut() else {
            return;
        };

        match gfx.shader.borrow_mut().check_and_hotplug() {
            ReloadOutcome::Unchanged | ReloadOutcome::Rejected(_) => {}
            ReloadOutcome::Reloaded => self.reload_error = None,
            ReloadOutcome::Error(e) => self.reload_error = Some(e.to_string()),
        }

        let viewport = self.view.viewport();
        frame::begin_frame(&*gfx.device, viewport, self.params.clear_color);
        frame::enable_culling(&*gfx.device, Face::Back, Winding::CounterClockwise);

        let status = {
            let shader = gfx.shader.borrow();
            panel::PanelStatus {
                shader_state: shader.state(),
                shader_usable: shader.is_usable(),
                diagnostics: shader.diagnostics().map(|d| d.to_string()),
                reload_error: self.reload_error.clone(),
                camera_position: self.view.camera.position(),
                frame_micros: self.controller.last_step().delta_micros,
                captured: self.captured,
                params_path: self.cli.params.display().to_string(),
            }
        };
        let mut actions = panel::PanelActions::default();
        let params = &mut self.params;
        gfx.egui.run(&gfx.target.window, |ctx| {
            actions = panel::show(ctx, params, &status);
        });

        let time_ms = self.clock.now_micros() as f32 / 1000.0;
        scene::upload(&*gfx.shader.borrow(), &self.params, &self.view, time_ms);
        gfx.quad.draw(&self.view.camera);
        gfx.egui.paint(&gfx.target.window);

        self.view.camera.fov = self.params.fov;
        self.controller
            .set_base_speed(Vec3::splat(self.params.base_speed()));
        if self.captured {
            self.controller
                .update(&mut self.view, &mut self.input, &self.clock);
        }
        apply_cursor_requests(&gfx.target.window, &mut self.input);

        if let Err(e) = gfx.target.swap_buffers() {
            tracing::error!("{e:#}");
        }

        if actions.reload {
            let outcome = gfx.shader.borrow_mut().recompile();
            if let ReloadOutcome::Error(e) = outcome {
                self.reload_error = Some(e.to_string());
            }
        }
        if actions.save {
            self.save_params();
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gfx.is_some() {
            return;
        }
        match Gfx::create(event_loop, &self.cli) {
            Ok(gfx) => {
                let size = gfx.window().inner_size();
                self.view.set_viewport(size.width, size.height);
                self.gfx = Some(gfx);
                tracing::info!("renderer ready");
            }
            Err(e) => {
                tracing::error!("startup failed: {e:#}");
                self.startup_error = Some(e);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if let Some(gfx) = &mut self.gfx {
            let response = gfx.egui.on_window_event(&gfx.target.window, &event);
            if response.consumed && !self.captured {
                return;
            }
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::Resized(size) => {
                if self.view.set_viewport(size.width, size.height) {
                    if let Some(gfx) = &self.gfx {
                        gfx.target.resize(size.width, size.height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = keys::map_key(code) {
                    self.handle_key(event_loop, key, state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.input
                    .cursor_moved(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::Focused(false) => self.input.clear(),
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(&mut self, _event_loop: &ActiveEventLoop, _device_id: DeviceId, event: DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.input
                .mouse_motion(Vec2::new(delta.0 as f32, delta.1 as f32));
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gfx) = &self.gfx {
            gfx.window().request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut gfx) = self.gfx.take() {
            gfx.egui.destroy();
        }
    }
}

/// Forward the input layer's queued cursor mode and warp to the window.
fn apply_cursor_requests(window: &Window, input: &mut PolledInput) {
    if let Some(mode) = input.take_mode_request() {
        match mode {
            CursorMode::Normal => {
                if let Err(e) = window.set_cursor_grab(CursorGrabMode::None) {
                    tracing::debug!("cursor release failed: {e}");
                }
                window.set_cursor_visible(true);
            }
            CursorMode::Hidden => window.set_cursor_visible(false),
            CursorMode::Disabled => {
                window.set_cursor_visible(false);
                let grabbed = window
                    .set_cursor_grab(CursorGrabMode::Locked)
                    .or_else(|_| window.set_cursor_grab(CursorGrabMode::Confined));
                if let Err(e) = grabbed {
                    tracing::warn!("cursor grab unavailable: {e}");
                }
            }
        }
    }
    if let Some(position) = input.take_warp_request() {
        let target = PhysicalPosition::new(position.x as f64, position.y as f64);
        if let Err(e) = window.set_cursor_position(target) {
            tracing::debug!("cursor warp failed: {e}");
        }
    }
}

fn load_params(path: &std::path::Path) -> SceneParams {
    if !path.exists() {
        return SceneParams::default();
    }
    match SceneParams::load(path) {
        Ok(params) => params,
        Err(e) => {
            tracing::warn!("ignoring {}: {e}", path.display());
            SceneParams::default()
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("marchlight starting");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(cli);
    event_loop.run_app(&mut app)?;

    match app.startup_error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}
