use std::rc::Rc;

use glam::Mat4;

use crate::device::GlApi;

use super::config::{RenderConfig, VertexData};
use super::context::RenderContext;
use super::error::{ErrorCallback, RenderError, RenderErrorKind};
use super::mesh::SpinningMesh;
use super::renderer::Renderer;
use super::vertex::ColoredVertex;

/// Draws a per-vertex colored triangle spinning about the view axis.
///
/// Expects [`VertexData::Colored`] records.
pub struct TriangleRenderer<G: GlApi> {
    mesh: SpinningMesh<G, ColoredVertex>,
}

impl<G: GlApi> TriangleRenderer<G> {
    pub const NAME: &'static str = "TriangleRender";

    /// Creates an uninitialized renderer. No GPU calls.
    pub fn new(gl: Rc<G>) -> Self {
        Self {
            mesh: SpinningMesh::new(gl, Self::NAME),
        }
    }

    /// Current rotation in degrees, in `0.0..360.0`.
    pub fn angle(&self) -> f32 {
        self.mesh.angle()
    }

    /// Projection computed by the last non-degenerate `resize`.
    pub fn projection(&self) -> Mat4 {
        self.mesh.projection()
    }

    pub fn vertex_count(&self) -> i32 {
        self.mesh.vertex_count()
    }
}

impl<G: GlApi> Renderer for TriangleRenderer<G> {
    fn initialize(&mut self, config: &RenderConfig) -> Result<(), RenderError> {
        let VertexData::Colored(vertices) = &config.vertices else {
            self.mesh.cleanup();
            return Err(self.mesh.report(
                RenderErrorKind::InitializationFailed,
                format!(
                    "expected position+color vertices, got {}",
                    config.vertices.shape_name()
                ),
            ));
        };
        self.mesh.initialize(
            &config.vertex_shader,
            &config.fragment_shader,
            vertices,
            config.clear_color,
            config.rotation_speed,
        )
    }

    fn render(&mut self, context: &RenderContext) -> Result<(), RenderError> {
        self.mesh.render(context)
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.mesh.resize(width, height)
    }

    fn cleanup(&mut self) {
        self.mesh.cleanup();
    }

    fn set_error_callback(&mut self, callback: ErrorCallback) {
        self.mesh.set_error_callback(callback);
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn is_initialized(&self) -> bool {
        self.mesh.is_initialized()
    }
}
