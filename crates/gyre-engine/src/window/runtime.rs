use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::{Context, Result, anyhow};
use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{
    ContextApi, ContextAttributesBuilder, GlProfile, PossiblyCurrentContext, Version,
};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{Surface, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow as _};
use raw_window_handle::HasWindowHandle;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::{ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

use crate::coords::ViewportSize;
use crate::device::{GlApi, GlowApi};
use crate::render::{RenderConfig, RendererKind, ShaderDialect};
use crate::session::{RenderSession, SessionConfig};
use crate::time::FpsCounter;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub renderer: RendererKind,
    /// Wait for vertical blank on swap.
    pub vsync: bool,
    /// Log frames per second once a second.
    pub log_fps: bool,
    pub session: SessionConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "gyre".to_string(),
            initial_size: LogicalSize::new(800.0, 600.0),
            renderer: RendererKind::default(),
            vsync: true,
            log_fps: true,
            session: SessionConfig::default(),
        }
    }
}

/// Entry point for the desktop loop.
pub struct Runtime;

impl Runtime {
    /// Opens one window with a GL context and renders into it until the
    /// window is closed or Escape is pressed.
    pub fn run(config: RuntimeConfig) -> Result<()> {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

/// Everything tied to the window's GL context.
///
/// Field order is drop order: the session deletes its GPU objects while the
/// context is still alive.
struct GlWindow {
    session: RenderSession<GlowApi>,
    surface: Surface<WindowSurface>,
    context: PossiblyCurrentContext,
    window: Window,
    fps: FpsCounter,
}

struct AppState {
    config: RuntimeConfig,
    window: Option<GlWindow>,
    exit_requested: bool,
    failure: Option<anyhow::Error>,
}

impl AppState {
    fn new(config: RuntimeConfig) -> Self {
        Self {
            config,
            window: None,
            exit_requested: false,
            failure: None,
        }
    }

    /// Releases renderer resources on the GL thread, then stops the loop.
    fn request_exit(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut gw) = self.window.take() {
            gw.session.cleanup();
        }
        self.exit_requested = true;
        event_loop.exit();
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        log::error!("{error:#}");
        self.failure = Some(error);
        self.request_exit(event_loop);
    }

    fn redraw(&mut self) {
        let log_fps = self.config.log_fps;
        let Some(gw) = self.window.as_mut() else {
            return;
        };

        // Errors were already logged and reported by the renderer.
        if let Ok(true) = gw.session.render_frame() {
            if let Err(e) = gw.surface.swap_buffers(&gw.context) {
                log::error!("swap_buffers failed: {e}");
            }
            if let Some(fps) = gw.fps.frame()
                && log_fps
            {
                log::info!("{} fps ({})", fps.round(), gw.session.renderer_name());
            }
        }
    }

    fn resize(&mut self, size: ViewportSize) {
        let Some(gw) = self.window.as_mut() else {
            return;
        };
        let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height))
        else {
            log::debug!(
                "ignoring zero-sized framebuffer {}x{}",
                size.width,
                size.height
            );
            return;
        };
        gw.surface.resize(&gw.context, w, h);
        let _ = gw.session.resize(size.width, size.height);
        gw.window.request_redraw();
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.exit_requested {
            return;
        }

        match create_gl_window(event_loop, &self.config) {
            Ok(gw) => {
                gw.window.request_redraw();
                self.window = Some(gw);
            }
            Err(e) => self.fail(event_loop, e.context("failed to create initial window")),
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(gw) = &self.window {
            gw.window.request_redraw();
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.window.as_ref().is_none_or(|gw| gw.window.id() != window_id) {
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.request_exit(event_loop),

            WindowEvent::KeyboardInput { event, .. }
                if is_exit_key(event.physical_key, event.state) =>
            {
                self.request_exit(event_loop)
            }

            WindowEvent::Resized(size) => self.resize(size.into()),

            WindowEvent::ScaleFactorChanged { .. } => {
                if let Some(size) = self.window.as_ref().map(|gw| gw.window.inner_size()) {
                    self.resize(size.into());
                }
            }

            WindowEvent::RedrawRequested => self.redraw(),

            _ => {}
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut gw) = self.window.take() {
            gw.session.cleanup();
        }
    }
}

fn is_exit_key(key: PhysicalKey, state: ElementState) -> bool {
    state == ElementState::Pressed && key == PhysicalKey::Code(KeyCode::Escape)
}

/// Config with the most multisample samples.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    configs
        .reduce(|best, c| if c.num_samples() > best.num_samples() { c } else { best })
        // glutin only calls the picker with a non-empty set.
        .expect("glutin offered no GL configs")
}

fn create_gl_window(event_loop: &ActiveEventLoop, config: &RuntimeConfig) -> Result<GlWindow> {
    let attrs = Window::default_attributes()
        .with_title(config.title.clone())
        .with_inner_size(config.initial_size);

    let template = ConfigTemplateBuilder::new()
        .with_alpha_size(8)
        .with_depth_size(24);

    let (window, gl_config) = DisplayBuilder::new()
        .with_window_attributes(Some(attrs.clone()))
        .build(event_loop, template, pick_config)
        .map_err(|e| anyhow!("failed to create GL display: {e}"))?;

    let window = match window {
        Some(window) => window,
        None => glutin_winit::finalize_window(event_loop, attrs, &gl_config)
            .context("failed to create window")?,
    };

    let raw_handle = window
        .window_handle()
        .context("window has no native handle")?
        .as_raw();

    let gl_display = gl_config.display();

    let core = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(Some(raw_handle));
    let gles = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::Gles(Some(Version::new(3, 0))))
        .build(Some(raw_handle));

    // SAFETY: `raw_handle` belongs to `window`, which outlives the context
    // (it is dropped after it in `GlWindow`).
    let not_current = unsafe {
        gl_display.create_context(&gl_config, &core).or_else(|e| {
            log::warn!("OpenGL 3.3 core unavailable ({e}), trying GLES 3.0");
            gl_display.create_context(&gl_config, &gles)
        })
    }
    .context("failed to create an OpenGL 3.3 core or GLES 3.0 context")?;

    let surface_attrs = window
        .build_surface_attributes(Default::default())
        .context("failed to describe window surface")?;
    // SAFETY: as above, the window outlives the surface.
    let surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attrs) }
        .context("failed to create window surface")?;

    let context = not_current
        .make_current(&surface)
        .context("failed to make GL context current")?;

    if config.vsync
        && let Err(e) = surface.set_swap_interval(&context, SwapInterval::Wait(NonZeroU32::MIN))
    {
        log::warn!("vsync unavailable: {e}");
    }

    let dialect = match context.context_api() {
        ContextApi::Gles(_) => ShaderDialect::Es,
        ContextApi::OpenGl(_) => ShaderDialect::Core,
    };

    // SAFETY: the context was just made current on this thread and stays
    // current for the lifetime of the loop.
    let gl = unsafe {
        let raw =
            glow::Context::from_loader_function_cstr(|name| gl_display.get_proc_address(name));
        Rc::new(GlowApi::new(raw))
    };

    let info = gl.info();
    log::info!("GL vendor: {}", info.vendor);
    log::info!("GL renderer: {}", info.renderer);
    log::info!("GL version: {}", info.version);
    log::info!("GLSL version: {}", info.shading_language);

    gl.enable_depth_test();

    let mut session = RenderSession::new(gl, config.session);
    let size = ViewportSize::from(window.inner_size());
    session.resize(size.width, size.height).map_err(|e| anyhow!(e))?;
    session
        .init(config.renderer, &RenderConfig::for_kind(config.renderer, dialect))
        .map_err(|e| anyhow!(e))
        .with_context(|| format!("failed to initialize `{}` renderer", config.renderer))?;

    log::info!(
        "window {}x{} ready, rendering `{}` with {dialect:?} shaders",
        size.width,
        size.height,
        session.renderer_name()
    );

    Ok(GlWindow {
        session,
        surface,
        context,
        window,
        fps: FpsCounter::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::keyboard::NativeKeyCode;

    #[test]
    fn default_config() {
        let c = RuntimeConfig::default();
        assert_eq!(c.title, "gyre");
        assert_eq!(c.initial_size, LogicalSize::new(800.0, 600.0));
        assert_eq!(c.renderer, RendererKind::Triangle);
        assert!(c.vsync);
        assert!(c.log_fps);
    }

    #[test]
    fn escape_press_exits() {
        assert!(is_exit_key(PhysicalKey::Code(KeyCode::Escape), ElementState::Pressed));
        assert!(!is_exit_key(PhysicalKey::Code(KeyCode::Escape), ElementState::Released));
        assert!(!is_exit_key(PhysicalKey::Code(KeyCode::Space), ElementState::Pressed));
        assert!(!is_exit_key(
            PhysicalKey::Unidentified(NativeKeyCode::Unidentified),
            ElementState::Pressed
        ));
    }
}
