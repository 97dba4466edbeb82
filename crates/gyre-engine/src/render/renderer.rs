use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use crate::device::GlApi;

use super::config::RenderConfig;
use super::context::RenderContext;
use super::cube::CubeRenderer;
use super::error::{ErrorCallback, RenderError};
use super::triangle::TriangleRenderer;

/// A draw strategy with an explicit GPU lifecycle.
///
/// ```text
/// new ──> initialize ──> render / resize ... ──> cleanup ──> (initialize again | drop)
/// ```
///
/// Every method must run on the thread where the GPU context is current.
/// Failing calls log at `error`, invoke the error callback, and return the
/// same error.
pub trait Renderer {
    /// Compiles the config's shaders and uploads its vertices.
    ///
    /// Releases resources from an earlier successful call first. After a
    /// failure nothing stays allocated and the call may be retried.
    fn initialize(&mut self, config: &RenderConfig) -> Result<(), RenderError>;

    /// Draws one frame: clear, advance rotation, one triangle-list draw.
    fn render(&mut self, context: &RenderContext) -> Result<(), RenderError>;

    /// Sets the viewport and recomputes the internal projection.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError>;

    /// Releases all GPU resources. Idempotent.
    fn cleanup(&mut self);

    /// Replaces the error callback.
    fn set_error_callback(&mut self, callback: ErrorCallback);

    fn name(&self) -> &'static str;

    fn is_initialized(&self) -> bool;
}

/// The available draw strategies.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum RendererKind {
    #[default]
    Triangle,
    Cube,
}

impl RendererKind {
    pub const ALL: [RendererKind; 2] = [RendererKind::Triangle, RendererKind::Cube];

    /// Factory key.
    pub fn key(self) -> &'static str {
        match self {
            RendererKind::Triangle => "triangle",
            RendererKind::Cube => "cube",
        }
    }
}

impl fmt::Display for RendererKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Returned when a string names no [`RendererKind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRenderer(pub String);

impl fmt::Display for UnknownRenderer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown renderer `{}` (expected one of: triangle, cube)", self.0)
    }
}

impl std::error::Error for UnknownRenderer {}

impl FromStr for RendererKind {
    type Err = UnknownRenderer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RendererKind::ALL
            .into_iter()
            .find(|k| k.key() == s)
            .ok_or_else(|| UnknownRenderer(s.to_string()))
    }
}

/// Builds uninitialized renderers by key.
pub struct RendererFactory;

impl RendererFactory {
    /// Returns a fresh renderer for `"triangle"` or `"cube"`, `None` otherwise.
    pub fn create<G: GlApi + 'static>(gl: Rc<G>, key: &str) -> Option<Box<dyn Renderer>> {
        let kind = key.parse().ok()?;
        Some(Self::create_kind(gl, kind))
    }

    pub fn create_kind<G: GlApi + 'static>(gl: Rc<G>, kind: RendererKind) -> Box<dyn Renderer> {
        match kind {
            RendererKind::Triangle => Box::new(TriangleRenderer::new(gl)),
            RendererKind::Cube => Box::new(CubeRenderer::new(gl)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::HeadlessGl;

    #[test]
    fn kinds_round_trip_through_keys() {
        for kind in RendererKind::ALL {
            assert_eq!(kind.to_string().parse::<RendererKind>(), Ok(kind));
        }
    }

    #[test]
    fn parsing_is_exact() {
        assert!("Triangle".parse::<RendererKind>().is_err());
        assert!(" cube".parse::<RendererKind>().is_err());
    }

    #[test]
    fn factory_builds_named_uninitialized_renderers() {
        let gl = Rc::new(HeadlessGl::new());
        let tri = RendererFactory::create(Rc::clone(&gl), "triangle").unwrap();
        let cube = RendererFactory::create(Rc::clone(&gl), "cube").unwrap();
        assert_eq!(tri.name(), "TriangleRender");
        assert_eq!(cube.name(), "cube");
        assert!(!tri.is_initialized());
        assert!(!cube.is_initialized());
        assert!(gl.calls().is_empty());
    }

    #[test]
    fn factory_rejects_unknown_key() {
        let gl = Rc::new(HeadlessGl::new());
        assert!(RendererFactory::create(gl, "unknown-key").is_none());
    }

    #[test]
    fn factory_instances_are_independent() {
        let gl = Rc::new(HeadlessGl::new());
        let mut a = RendererFactory::create_kind(Rc::clone(&gl), RendererKind::Triangle);
        let b = RendererFactory::create_kind(Rc::clone(&gl), RendererKind::Triangle);
        a.initialize(&RenderConfig::triangle()).unwrap();
        assert!(a.is_initialized());
        assert!(!b.is_initialized());
    }
}
