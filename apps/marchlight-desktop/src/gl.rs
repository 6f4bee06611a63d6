//! Window plus OpenGL 4.3 core context.

use anyhow::{Context as _, Result, anyhow};
use glutin::config::{ConfigTemplateBuilder, GlConfig};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, NotCurrentGlContext, PossiblyCurrentContext,
    Version,
};
use glutin::display::{GetGlDisplay, GlDisplay};
use glutin::surface::{GlSurface, Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use raw_window_handle::HasWindowHandle;
use std::num::NonZeroU32;
use std::sync::Arc;
use winit::dpi::PhysicalSize;
use winit::event_loop::ActiveEventLoop;
use winit::window::Window;

pub struct GlWindowContext {
    // Surface and context must go before the window they draw into.
    pub surface: Surface<WindowSurface>,
    pub context: PossiblyCurrentContext,
    pub gl: Arc<glow::Context>,
    pub window: Window,
}

impl GlWindowContext {
    pub fn create(event_loop: &ActiveEventLoop, title: &str, width: u32, height: u32) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title(title)
            .with_inner_size(PhysicalSize::new(width, height));
        let template = ConfigTemplateBuilder::new().with_alpha_size(8);

        let (window, config) = DisplayBuilder::new()
            .with_window_attributes(Some(attrs))
            .build(event_loop, template, |configs| {
                configs
                    .max_by_key(|c| c.num_samples())
                    .expect("platform offered no GL configs")
            })
            .map_err(|e| anyhow!("failed to create window: {e}"))?;
        let window = window.ok_or_else(|| anyhow!("display builder returned no window"))?;

        let raw_handle = window.window_handle().ok().map(|h| h.as_raw());
        let display = config.display();
        let context_attrs = ContextAttributesBuilder::new()
            .with_profile(GlProfile::Core)
            .with_context_api(ContextApi::OpenGl(Some(Version::new(4, 3))))
            .build(raw_handle);

        // SAFETY: the config and raw handle both come from `window`, which outlives the context.
        let not_current = unsafe { display.create_context(&config, &context_attrs) }
            .context("failed to create OpenGL 4.3 core context")?;
        let surface_attrs = window
            .build_surface_attributes(Default::default())
            .context("failed to describe window surface")?;
        let surface = unsafe { display.create_window_surface(&config, &surface_attrs) }
            .context("failed to create window surface")?;
        let context = not_current
            .make_current(&surface)
            .context("failed to make context current")?;

        if let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN)) {
            tracing::warn!("vsync unavailable: {e}");
        }

        // SAFETY: the context was made current on this thread above.
        let gl = unsafe { glow::Context::from_loader_function_cstr(|s| display.get_proc_address(s)) };

        Ok(Self {
            surface,
            context,
            gl: Arc::new(gl),
            window,
        })
    }

    /// Resize the default framebuffer. Zero sizes (minimised windows) are skipped.
    pub fn resize(&self, width: u32, height: u32) {
        if let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) {
            self.surface.resize(&self.context, w, h);
        }
    }

    pub fn swap_buffers(&self) -> Result<()> {
        self.surface
            .swap_buffers(&self.context)
            .context("failed to swap buffers")
    }
}
