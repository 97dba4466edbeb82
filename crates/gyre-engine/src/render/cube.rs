use std::rc::Rc;

use glam::Mat4;

use crate::device::GlApi;

use super::config::{RenderConfig, VertexData};
use super::context::RenderContext;
use super::error::{ErrorCallback, RenderError, RenderErrorKind};
use super::mesh::SpinningMesh;
use super::renderer::Renderer;
use super::vertex::TexturedVertex;

/// Draws a flat quad colored by its texture coordinates, spinning about the
/// view axis.
///
/// Despite the name there is no depth and no texture: the default geometry
/// is a single face made of two triangles. Expects [`VertexData::Textured`]
/// records.
pub struct CubeRenderer<G: GlApi> {
    mesh: SpinningMesh<G, TexturedVertex>,
}

impl<G: GlApi> CubeRenderer<G> {
    pub const NAME: &'static str = "cube";

    /// Creates an uninitialized renderer. No GPU calls.
    pub fn new(gl: Rc<G>) -> Self {
        Self {
            mesh: SpinningMesh::new(gl, Self::NAME),
        }
    }

    pub fn angle(&self) -> f32 {
        self.mesh.angle()
    }

    pub fn projection(&self) -> Mat4 {
        self.mesh.projection()
    }

    pub fn vertex_count(&self) -> i32 {
        self.mesh.vertex_count()
    }
}

impl<G: GlApi> Renderer for CubeRenderer<G> {
    fn initialize(&mut self, config: &RenderConfig) -> Result<(), RenderError> {
        let VertexData::Textured(vertices) = &config.vertices else {
            self.mesh.cleanup();
            return Err(self.mesh.report(
                RenderErrorKind::InitializationFailed,
                format!(
                    "expected position+texcoord vertices, got {}",
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coords::{ColorRgba, ViewportSize};
    use crate::device::HeadlessGl;
    use crate::device::headless::GlCall;
    use crate::render::config::ShaderDialect;
    use crate::render::context::projection_for;
    use crate::render::vertex::Vertex;

    fn renderer() -> (Rc<HeadlessGl>, CubeRenderer<HeadlessGl>) {
        let gl = Rc::new(HeadlessGl::new());
        let r = CubeRenderer::new(Rc::clone(&gl));
        (gl, r)
    }

    fn frame() -> RenderContext {
        let viewport = ViewportSize::new(640, 480);
        RenderContext::new(viewport, projection_for(viewport).unwrap(), 0.016)
    }

    #[test]
    fn draws_six_vertex_quad_on_grey() {
        for dialect in [ShaderDialect::Core, ShaderDialect::Es] {
            let (gl, mut r) = renderer();
            r.initialize(&RenderConfig::cube_for(dialect)).unwrap();
            assert_eq!(r.vertex_count(), 6);
            gl.clear_calls();

            r.render(&frame()).unwrap();

            assert_eq!(gl.draws(), vec![(0, 6)]);
            assert_eq!(gl.clears(), vec![ColorRgba::new(0.1, 0.1, 0.1, 1.0)]);
        }
    }

    #[test]
    fn uploads_position_and_texcoord_layout() {
        let (gl, mut r) = renderer();
        r.initialize(&RenderConfig::cube()).unwrap();
        let attributes: Vec<_> = gl
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                GlCall::VertexAttribute { attribute, stride } => Some((attribute, stride)),
                _ => None,
            })
            .collect();
        assert_eq!(attributes.len(), 2);
        assert_eq!(attributes[1].0.components, 2);
        assert!(attributes.iter().all(|(_, stride)| *stride == TexturedVertex::stride()));
        assert!(gl.calls().contains(&GlCall::ArrayBufferData { bytes: 6 * 20 }));
    }

    #[test]
    fn cleanup_deletes_vertex_array_and_buffer() {
        let (gl, mut r) = renderer();
        r.initialize(&RenderConfig::cube()).unwrap();
        r.cleanup();
        r.cleanup();
        assert!(gl.live_objects().is_empty());
        let vao_deletes = gl
            .calls()
            .iter()
            .filter(|c| matches!(c, GlCall::DeleteVertexArray(_)))
            .count();
        assert_eq!(vao_deletes, 1);
    }

    #[test]
    fn colored_vertices_are_rejected() {
        let (_gl, mut r) = renderer();
        let cfg = RenderConfig::cube().with_vertices(RenderConfig::triangle().vertices);
        let err = r.initialize(&cfg).unwrap_err();
        assert_eq!(err.kind, RenderErrorKind::InitializationFailed);
        assert!(!r.is_initialized());
    }

    #[test]
    fn rejected_config_releases_previous_resources() {
        let (gl, mut r) = renderer();
        r.initialize(&RenderConfig::cube()).unwrap();
        let cfg = RenderConfig::cube().with_vertices(VertexData::Colored(Vec::new()));
        assert!(r.initialize(&cfg).is_err());
        assert!(gl.live_objects().is_empty());
    }

    #[test]
    fn empty_quad_fails_buffer_creation_without_leaks() {
        let (gl, mut r) = renderer();
        r.initialize(&RenderConfig::cube()).unwrap();
        let cfg = RenderConfig::cube().with_vertices(VertexData::Textured(Vec::new()));
        let err = r.initialize(&cfg).unwrap_err();
        assert_eq!(err.kind, RenderErrorKind::BufferCreationFailed);
        assert!(!r.is_initialized());
        assert!(gl.live_objects().is_empty());
    }

    #[test]
    fn bad_shader_fails_then_good_shader_succeeds() {
        let (gl, mut r) = renderer();
        let bad = RenderConfig::cube().with_vertex_shader("#version 330 core\nvoid main() {");
        let err = r.initialize(&bad).unwrap_err();
        assert_eq!(err.kind, RenderErrorKind::ShaderCompilationFailed);
        assert!(err.message.contains("vertex"));
        assert!(gl.live_objects().is_empty());

        r.initialize(&RenderConfig::cube()).unwrap();
        assert!(r.is_initialized());
        assert_eq!(r.vertex_count(), 6);
    }

    #[test]
    fn render_before_init_fails() {
        let (_gl, mut r) = renderer();
        assert_eq!(
            r.render(&frame()).unwrap_err().kind,
            RenderErrorKind::InitializationFailed
        );
    }

    #[test]
    fn spins_at_configured_speed() {
        let (_gl, mut r) = renderer();
        r.initialize(&RenderConfig::cube().with_rotation_speed(2.5)).unwrap();
        for _ in 0..4 {
            r.render(&frame()).unwrap();
        }
        assert!((r.angle() - 10.0).abs() < 1e-4);
    }
}
