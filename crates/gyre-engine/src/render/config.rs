use std::borrow::Cow;
use std::fs;
use std::path::PathBuf;

use crate::coords::ColorRgba;

use super::renderer::RendererKind;
use super::shader::ShaderError;
use super::vertex::{ColoredVertex, TexturedVertex};

/// GLSL flavour of the embedded shaders.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderDialect {
    /// Desktop OpenGL 3.3 core profile (`#version 330 core`).
    Core,
    /// OpenGL ES 3.0 (`#version 300 es`).
    Es,
}

impl ShaderDialect {
    /// ES on Android, core everywhere else.
    pub const fn platform_default() -> Self {
        if cfg!(target_os = "android") {
            ShaderDialect::Es
        } else {
            ShaderDialect::Core
        }
    }
}

/// Where a shader stage's text comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderSource {
    Inline(String),
    File(PathBuf),
}

impl ShaderSource {
    /// Returns the GLSL text, reading it from disk for [`ShaderSource::File`].
    pub fn resolve(&self) -> Result<Cow<'_, str>, ShaderError> {
        match self {
            ShaderSource::Inline(text) => Ok(Cow::Borrowed(text)),
            ShaderSource::File(path) => fs::read_to_string(path)
                .map(Cow::Owned)
                .map_err(|e| ShaderError::FileUnreadable {
                    path: path.clone(),
                    reason: e.to_string(),
                }),
        }
    }
}

impl From<&str> for ShaderSource {
    fn from(text: &str) -> Self {
        ShaderSource::Inline(text.to_string())
    }
}

impl From<String> for ShaderSource {
    fn from(text: String) -> Self {
        ShaderSource::Inline(text)
    }
}

impl From<PathBuf> for ShaderSource {
    fn from(path: PathBuf) -> Self {
        ShaderSource::File(path)
    }
}

/// Vertex records, tagged by shape. Each renderer accepts exactly one shape.
#[derive(Debug, Clone, PartialEq)]
pub enum VertexData {
    /// Position + color records (triangle renderer).
    Colored(Vec<ColoredVertex>),
    /// Position + texture-coordinate records (quad renderer).
    Textured(Vec<TexturedVertex>),
}

impl VertexData {
    pub fn len(&self) -> usize {
        match self {
            VertexData::Colored(v) => v.len(),
            VertexData::Textured(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn shape_name(&self) -> &'static str {
        match self {
            VertexData::Colored(_) => "position+color",
            VertexData::Textured(_) => "position+texcoord",
        }
    }
}

/// What a renderer draws: shaders, geometry, clear color and spin rate.
///
/// Built once and handed to [`Renderer::initialize`](super::Renderer::initialize),
/// which copies what it needs.
///
/// ```rust,ignore
/// let config = RenderConfig::triangle()
///     .with_clear_color(0.0, 0.0, 0.0, 1.0)
///     .with_rotation_speed(2.5);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RenderConfig {
    pub vertex_shader: ShaderSource,
    pub fragment_shader: ShaderSource,
    pub vertices: VertexData,
    pub clear_color: ColorRgba,
    /// Degrees added to the rotation angle per rendered frame.
    pub rotation_speed: f32,
}

impl RenderConfig {
    /// Creates a config with a black clear color and a 1°/frame spin.
    pub fn new(
        vertex_shader: impl Into<ShaderSource>,
        fragment_shader: impl Into<ShaderSource>,
        vertices: VertexData,
    ) -> Self {
        Self {
            vertex_shader: vertex_shader.into(),
            fragment_shader: fragment_shader.into(),
            vertices,
            clear_color: ColorRgba::black(),
            rotation_speed: 1.0,
        }
    }

    /// Default triangle scene using the platform's shader dialect.
    pub fn triangle() -> Self {
        Self::triangle_for(ShaderDialect::platform_default())
    }

    /// Red/green/blue triangle around the origin on a dark blue background.
    pub fn triangle_for(dialect: ShaderDialect) -> Self {
        let (vs, fs) = embedded::triangle(dialect);
        Self::new(
            vs,
            fs,
            VertexData::Colored(vec![
                ColoredVertex::new([-0.5, -0.5, 0.0], [1.0, 0.0, 0.0]),
                ColoredVertex::new([0.0, 0.5, 0.0], [0.0, 1.0, 0.0]),
                ColoredVertex::new([0.5, -0.5, 0.0], [0.0, 0.0, 1.0]),
            ]),
        )
        .with_clear_color(0.0, 0.0, 0.5, 1.0)
    }

    /// Default quad scene using the platform's shader dialect.
    pub fn cube() -> Self {
        Self::cube_for(ShaderDialect::platform_default())
    }

    /// Unit quad spanning (-1,-1)..(1,1) as two explicit triangles.
    pub fn cube_for(dialect: ShaderDialect) -> Self {
        let (vs, fs) = embedded::cube(dialect);
        Self::new(
            vs,
            fs,
            VertexData::Textured(vec![
                TexturedVertex::new([-1.0, -1.0, 0.0], [0.0, 0.0]),
                TexturedVertex::new([1.0, -1.0, 0.0], [1.0, 0.0]),
                TexturedVertex::new([1.0, 1.0, 0.0], [1.0, 1.0]),
                TexturedVertex::new([1.0, 1.0, 0.0], [1.0, 1.0]),
                TexturedVertex::new([-1.0, 1.0, 0.0], [0.0, 1.0]),
                TexturedVertex::new([-1.0, -1.0, 0.0], [0.0, 0.0]),
            ]),
        )
        .with_clear_color(0.1, 0.1, 0.1, 1.0)
    }

    /// Default scene for `kind`.
    pub fn for_kind(kind: RendererKind, dialect: ShaderDialect) -> Self {
        match kind {
            RendererKind::Triangle => Self::triangle_for(dialect),
            RendererKind::Cube => Self::cube_for(dialect),
        }
    }

    pub fn with_vertex_shader(mut self, source: impl Into<ShaderSource>) -> Self {
        self.vertex_shader = source.into();
        self
    }

    pub fn with_fragment_shader(mut self, source: impl Into<ShaderSource>) -> Self {
        self.fragment_shader = source.into();
        self
    }

    pub fn with_vertices(mut self, vertices: VertexData) -> Self {
        self.vertices = vertices;
        self
    }

    /// Sets the clear color. Components are clamped into `0.0..=1.0`.
    pub fn with_clear_color(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.clear_color = ColorRgba::new(r, g, b, a).clamped();
        self
    }

    pub fn with_rotation_speed(mut self, degrees_per_frame: f32) -> Self {
        self.rotation_speed = degrees_per_frame;
        self
    }
}

/// Shader text compiled into the binary.
pub mod embedded {
    use super::ShaderDialect;

    pub const TRIANGLE_VERTEX_CORE: &str = include_str!("shaders/triangle.core.vert");
    pub const TRIANGLE_FRAGMENT_CORE: &str = include_str!("shaders/triangle.core.frag");
    pub const TRIANGLE_VERTEX_ES: &str = include_str!("shaders/triangle.es.vert");
    pub const TRIANGLE_FRAGMENT_ES: &str = include_str!("shaders/triangle.es.frag");

    pub const CUBE_VERTEX_CORE: &str = include_str!("shaders/cube.core.vert");
    pub const CUBE_FRAGMENT_CORE: &str = include_str!("shaders/cube.core.frag");
    pub const CUBE_VERTEX_ES: &str = include_str!("shaders/cube.es.vert");
    pub const CUBE_FRAGMENT_ES: &str = include_str!("shaders/cube.es.frag");

    /// `(vertex, fragment)` text of the triangle shaders.
    pub fn triangle(dialect: ShaderDialect) -> (&'static str, &'static str) {
        match dialect {
            ShaderDialect::Core => (TRIANGLE_VERTEX_CORE, TRIANGLE_FRAGMENT_CORE),
            ShaderDialect::Es => (TRIANGLE_VERTEX_ES, TRIANGLE_FRAGMENT_ES),
        }
    }

    /// `(vertex, fragment)` text of the quad shaders.
    pub fn cube(dialect: ShaderDialect) -> (&'static str, &'static str) {
        match dialect {
            ShaderDialect::Core => (CUBE_VERTEX_CORE, CUBE_FRAGMENT_CORE),
            ShaderDialect::Es => (CUBE_VERTEX_ES, CUBE_FRAGMENT_ES),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── named factories ───────────────────────────────────────────────────

    #[test]
    fn triangle_defaults() {
        let c = RenderConfig::triangle_for(ShaderDialect::Core);
        let VertexData::Colored(v) = &c.vertices else { panic!("expected colored vertices") };
        assert_eq!(v.len(), 3);
        assert_eq!(v[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(v[1].color, [0.0, 1.0, 0.0]);
        assert_eq!(v[2].color, [0.0, 0.0, 1.0]);
        assert_eq!(v[1].position, [0.0, 0.5, 0.0]);
        assert_eq!(c.clear_color, ColorRgba::new(0.0, 0.0, 0.5, 1.0));
        assert_eq!(c.rotation_speed, 1.0);
    }

    #[test]
    fn cube_defaults_are_six_vertex_quad() {
        let c = RenderConfig::cube_for(ShaderDialect::Core);
        let VertexData::Textured(v) = &c.vertices else { panic!("expected textured vertices") };
        assert_eq!(v.len(), 6);
        assert_eq!(v[0], v[5]);
        assert_eq!(v[2], v[3]);
        assert_eq!(c.clear_color, ColorRgba::new(0.1, 0.1, 0.1, 1.0));
        assert_eq!(c.rotation_speed, 1.0);
    }

    #[test]
    fn dialect_selects_version_line() {
        let core = RenderConfig::triangle_for(ShaderDialect::Core);
        let es = RenderConfig::cube_for(ShaderDialect::Es);
        let ShaderSource::Inline(core_vs) = &core.vertex_shader else { panic!() };
        let ShaderSource::Inline(es_fs) = &es.fragment_shader else { panic!() };
        assert!(core_vs.starts_with("#version 330 core"));
        assert!(es_fs.starts_with("#version 300 es"));
    }

    #[test]
    fn quad_fragment_shader_samples_no_texture() {
        for dialect in [ShaderDialect::Core, ShaderDialect::Es] {
            let (_, fs) = embedded::cube(dialect);
            assert!(!fs.contains("sampler2D"));
            assert!(fs.contains("vec4(v_tex_coord.x, v_tex_coord.y, 0.5, 1.0)"));
        }
    }

    // ── overrides ─────────────────────────────────────────────────────────

    #[test]
    fn with_methods_chain() {
        let c = RenderConfig::triangle()
            .with_clear_color(1.0, 1.0, 1.0, 1.0)
            .with_rotation_speed(3.0)
            .with_vertices(VertexData::Colored(Vec::new()));
        assert_eq!(c.clear_color, ColorRgba::new(1.0, 1.0, 1.0, 1.0));
        assert_eq!(c.rotation_speed, 3.0);
        assert!(c.vertices.is_empty());
    }

    #[test]
    fn out_of_range_clear_color_is_clamped() {
        let c = RenderConfig::triangle().with_clear_color(2.0, -1.0, 0.5, 1.0);
        assert_eq!(c.clear_color, ColorRgba::new(1.0, 0.0, 0.5, 1.0));
    }

    // ── sources ───────────────────────────────────────────────────────────

    #[test]
    fn missing_file_is_unreadable() {
        let src = ShaderSource::File(PathBuf::from("/definitely/not/here.vert"));
        assert!(matches!(src.resolve(), Err(ShaderError::FileUnreadable { .. })));
    }

    #[test]
    fn file_source_reads_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.vert");
        fs::write(&path, "void main() {}").unwrap();
        let src = ShaderSource::from(path);
        assert_eq!(src.resolve().unwrap(), "void main() {}");
    }
}
