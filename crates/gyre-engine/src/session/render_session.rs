use std::rc::Rc;

use glam::Mat4;

use crate::coords::ViewportSize;
use crate::device::GlApi;
use crate::render::{
    RenderConfig, RenderContext, RenderError, RenderErrorKind, Renderer, RendererFactory,
    RendererKind, perspective, projection_for,
};
use crate::time::FrameClock;

use super::config::{DeltaTime, SessionConfig};

/// Name reported while no renderer is active.
pub const NO_RENDERER: &str = "No Renderer";

/// The active renderer plus the per-frame state a host feeds it.
///
/// Owns at most one renderer. Builds a [`RenderContext`] for every frame
/// from the last viewport, its projection, the configured delta time and a
/// frame counter that restarts at 0 on each successful `init`.
pub struct RenderSession<G: GlApi + 'static> {
    gl: Rc<G>,
    renderer: Option<Box<dyn Renderer>>,
    viewport: ViewportSize,
    projection: Mat4,
    frame_number: u64,
    config: SessionConfig,
    clock: FrameClock,
}

impl<G: GlApi + 'static> RenderSession<G> {
    pub fn new(gl: Rc<G>, config: SessionConfig) -> Self {
        Self {
            gl,
            renderer: None,
            viewport: ViewportSize::default(),
            projection: perspective(1.0),
            frame_number: 0,
            config,
            clock: FrameClock::new(),
        }
    }

    /// Replaces the active renderer with a fresh `kind` built from `config`.
    ///
    /// The previous renderer is cleaned up first. On failure no renderer is
    /// active afterwards.
    pub fn init(&mut self, kind: RendererKind, config: &RenderConfig) -> Result<(), RenderError> {
        self.cleanup();

        let mut renderer = RendererFactory::create_kind(Rc::clone(&self.gl), kind);
        let name = renderer.name();
        renderer.set_error_callback(Box::new(move |error_kind: RenderErrorKind, message: &str| {
            log::debug!("[session] {name} reported {error_kind}: {message}");
        }));
        renderer.initialize(config)?;

        if !self.viewport.is_empty() {
            renderer.resize(self.viewport.width, self.viewport.height)?;
        }

        log::info!("[session] renderer `{name}` active");
        self.renderer = Some(renderer);
        self.frame_number = 0;
        self.clock.reset();
        Ok(())
    }

    /// Renders one frame. Returns `Ok(false)` without doing anything when
    /// no renderer is active.
    pub fn render_frame(&mut self) -> Result<bool, RenderError> {
        let Some(renderer) = self.renderer.as_mut() else {
            return Ok(false);
        };
        let delta_time = match self.config.delta_time {
            DeltaTime::Fixed(step) => step,
            DeltaTime::Measured => self.clock.tick().dt,
        };
        let context = RenderContext::new(self.viewport, self.projection, delta_time)
            .with_frame_number(self.frame_number);
        renderer.render(&context)?;
        self.frame_number += 1;
        Ok(true)
    }

    /// Records the new viewport and forwards it to the active renderer.
    ///
    /// A zero height keeps the previous projection.
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.viewport = ViewportSize::new(width, height);
        if let Some(projection) = projection_for(self.viewport) {
            self.projection = projection;
        }
        match self.renderer.as_mut() {
            Some(renderer) => renderer.resize(width, height),
            None => Ok(()),
        }
    }

    /// Cleans up and drops the active renderer, if any.
    pub fn cleanup(&mut self) {
        if let Some(mut renderer) = self.renderer.take() {
            renderer.cleanup();
            log::info!("[session] renderer `{}` cleaned up", renderer.name());
        }
    }

    pub fn renderer_name(&self) -> &'static str {
        self.renderer.as_ref().map_or(NO_RENDERER, |r| r.name())
    }

    pub fn is_initialized(&self) -> bool {
        self.renderer.as_ref().is_some_and(|r| r.is_initialized())
    }

    /// Number of the next frame to be rendered.
    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    pub fn projection(&self) -> Mat4 {
        self.projection
    }
}

impl<G: GlApi + 'static> Drop for RenderSession<G> {
    fn drop(&mut self) {
        self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::headless::GlCall;
    use crate::device::HeadlessGl;
    use crate::render::ShaderDialect;

    fn session() -> (Rc<HeadlessGl>, RenderSession<HeadlessGl>) {
        let gl = Rc::new(HeadlessGl::new());
        let s = RenderSession::new(Rc::clone(&gl), SessionConfig::default());
        (gl, s)
    }

    fn triangle() -> RenderConfig {
        RenderConfig::triangle_for(ShaderDialect::Core)
    }

    // ── lifecycle ─────────────────────────────────────────────────────────

    #[test]
    fn starts_without_renderer() {
        let (gl, mut s) = session();
        assert_eq!(s.renderer_name(), NO_RENDERER);
        assert!(!s.is_initialized());
        assert_eq!(s.render_frame(), Ok(false));
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn init_activates_named_renderer() {
        let (_gl, mut s) = session();
        s.init(RendererKind::Cube, &RenderConfig::cube_for(ShaderDialect::Core)).unwrap();
        assert_eq!(s.renderer_name(), "cube");
        assert!(s.is_initialized());
    }

    #[test]
    fn reinit_cleans_up_previous_renderer() {
        let (gl, mut s) = session();
        s.init(RendererKind::Triangle, &triangle()).unwrap();
        s.init(RendererKind::Cube, &RenderConfig::cube_for(ShaderDialect::Core)).unwrap();
        let live = gl.live_objects();
        assert_eq!((live.programs, live.buffers, live.vertex_arrays), (1, 1, 1));
        assert_eq!(s.renderer_name(), "cube");
    }

    #[test]
    fn failed_init_leaves_no_renderer() {
        let (gl, mut s) = session();
        s.init(RendererKind::Triangle, &triangle()).unwrap();
        let err = s
            .init(RendererKind::Triangle, &triangle().with_vertex_shader(""))
            .unwrap_err();
        assert_eq!(err.kind, RenderErrorKind::ShaderCompilationFailed);
        assert_eq!(s.renderer_name(), NO_RENDERER);
        assert!(gl.live_objects().is_empty());
    }

    #[test]
    fn cleanup_releases_and_forgets_renderer() {
        let (gl, mut s) = session();
        s.init(RendererKind::Triangle, &triangle()).unwrap();
        s.cleanup();
        s.cleanup();
        assert_eq!(s.renderer_name(), NO_RENDERER);
        assert!(gl.live_objects().is_empty());
    }

    #[test]
    fn drop_releases_gpu_objects() {
        let (gl, mut s) = session();
        s.init(RendererKind::Triangle, &triangle()).unwrap();
        drop(s);
        assert!(gl.live_objects().is_empty());
    }

    // ── frames ────────────────────────────────────────────────────────────

    #[test]
    fn frame_counter_counts_rendered_frames() {
        let (gl, mut s) = session();
        s.init(RendererKind::Triangle, &triangle()).unwrap();
        assert_eq!(s.frame_number(), 0);
        for _ in 0..3 {
            assert_eq!(s.render_frame(), Ok(true));
        }
        assert_eq!(s.frame_number(), 3);
        assert_eq!(gl.draws().len(), 3);

        s.init(RendererKind::Triangle, &triangle()).unwrap();
        assert_eq!(s.frame_number(), 0);
    }

    #[test]
    fn viewport_before_init_is_applied_on_init() {
        let (gl, mut s) = session();
        s.resize(800, 600).unwrap();
        assert!(gl.calls().is_empty());
        s.init(RendererKind::Triangle, &triangle()).unwrap();
        assert!(gl.calls().contains(&GlCall::Viewport {
            x: 0,
            y: 0,
            width: 800,
            height: 600,
        }));
    }

    #[test]
    fn zero_height_keeps_projection() {
        let (_gl, mut s) = session();
        s.resize(800, 600).unwrap();
        let before = s.projection();
        s.resize(800, 0).unwrap();
        assert_eq!(s.projection(), before);
        assert_eq!(s.viewport(), ViewportSize::new(800, 0));
    }

    #[test]
    fn measured_delta_time_renders() {
        let gl = Rc::new(HeadlessGl::new());
        let mut s = RenderSession::new(Rc::clone(&gl), SessionConfig::measured());
        s.init(RendererKind::Triangle, &triangle()).unwrap();
        assert_eq!(s.render_frame(), Ok(true));
    }
}
