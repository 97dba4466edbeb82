use std::fmt;

use crate::coords::ColorRgba;

/// Programmable pipeline stage of a shader object.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    pub fn label(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Typed value for a single uniform upload.
///
/// Matrices are column-major, matching what `glam` produces with
/// `to_cols_array`.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum UniformValue {
    Bool(bool),
    Int(i32),
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Vec4([f32; 4]),
    Mat2([f32; 4]),
    Mat3([f32; 9]),
    Mat4([f32; 16]),
}

/// One `f32` vertex attribute inside an interleaved vertex record.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    /// Shader input location (`layout(location = N)`).
    pub location: u32,
    /// Number of `f32` components (1..=4).
    pub components: i32,
    /// Byte offset of the first component within the record.
    pub offset: i32,
}

/// Driver identification strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlInfo {
    pub vendor: String,
    pub renderer: String,
    pub version: String,
    pub shading_language: String,
}

/// The OpenGL-family call surface used by shader programs and renderers.
///
/// Implementations are bound to one GPU context, and that context must be
/// current on the calling thread for every method. Types holding a `GlApi`
/// keep it behind `Rc`, so they cannot migrate to another thread.
///
/// Object creation reports driver refusal as `Err(message)`; everything else
/// mirrors the underlying call one-to-one.
pub trait GlApi {
    type Shader: Copy + fmt::Debug;
    type Program: Copy + PartialEq + fmt::Debug;
    type Buffer: Copy + fmt::Debug;
    type VertexArray: Copy + fmt::Debug;
    type UniformLocation: Clone + fmt::Debug;

    // ── shaders ───────────────────────────────────────────────────────────

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String>;
    fn shader_source(&self, shader: Self::Shader, source: &str);
    fn compile_shader(&self, shader: Self::Shader);
    fn shader_compile_status(&self, shader: Self::Shader) -> bool;
    fn shader_info_log(&self, shader: Self::Shader) -> String;
    fn delete_shader(&self, shader: Self::Shader);

    // ── programs ──────────────────────────────────────────────────────────

    fn create_program(&self) -> Result<Self::Program, String>;
    fn attach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn detach_shader(&self, program: Self::Program, shader: Self::Shader);
    fn link_program(&self, program: Self::Program);
    fn program_link_status(&self, program: Self::Program) -> bool;
    fn program_info_log(&self, program: Self::Program) -> String;
    fn delete_program(&self, program: Self::Program);
    fn use_program(&self, program: Option<Self::Program>);

    /// Returns `None` when the uniform does not exist or was optimized out.
    fn uniform_location(&self, program: Self::Program, name: &str)
    -> Option<Self::UniformLocation>;
    fn set_uniform(&self, location: &Self::UniformLocation, value: &UniformValue);

    // ── vertex arrays / buffers ───────────────────────────────────────────

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String>;
    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>);
    fn delete_vertex_array(&self, vertex_array: Self::VertexArray);

    fn create_buffer(&self) -> Result<Self::Buffer, String>;
    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>);
    /// Uploads `data` into the bound array buffer with static-draw usage.
    fn array_buffer_data(&self, data: &[u8]);
    fn delete_buffer(&self, buffer: Self::Buffer);

    /// Enables `attribute` and points it into the bound array buffer.
    fn vertex_attribute_f32(&self, attribute: VertexAttribute, stride: i32);

    // ── frame ─────────────────────────────────────────────────────────────

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32);
    /// Clears the color and depth buffers, color to `color`.
    fn clear(&self, color: ColorRgba);
    fn draw_triangles(&self, first: i32, count: i32);
    fn enable_depth_test(&self);

    fn info(&self) -> GlInfo;
}
