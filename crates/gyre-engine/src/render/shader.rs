use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

use crate::device::{GlApi, ShaderStage, UniformValue};

use super::config::ShaderSource;

/// Why a shader program could not be built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShaderError {
    /// A shader file could not be read.
    FileUnreadable { path: PathBuf, reason: String },
    /// A stage's source was empty or whitespace.
    EmptySource(ShaderStage),
    /// The driver refused to create a shader or program object.
    ObjectCreation(String),
    /// A stage failed to compile; `log` is the compiler output.
    Compile { stage: ShaderStage, log: String },
    /// The program failed to link; `log` is the linker output.
    Link { log: String },
}

impl fmt::Display for ShaderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShaderError::FileUnreadable { path, reason } => {
                write!(f, "cannot read shader file {}: {reason}", path.display())
            }
            ShaderError::EmptySource(stage) => write!(f, "{stage} shader source is empty"),
            ShaderError::ObjectCreation(msg) => write!(f, "cannot create shader object: {msg}"),
            ShaderError::Compile { stage, log } => {
                write!(f, "{stage} shader failed to compile: {}", log.trim_end())
            }
            ShaderError::Link { log } => write!(f, "program failed to link: {}", log.trim_end()),
        }
    }
}

impl std::error::Error for ShaderError {}

/// A linked vertex + fragment program with a typed uniform API.
///
/// Uniform locations are looked up lazily and cached per name, misses
/// included, so each name costs one driver query per load. The cache is
/// dropped whenever the program is reloaded or released.
///
/// Holds its GPU API through `Rc`, which pins it to the context's thread.
pub struct ShaderProgram<G: GlApi> {
    gl: Rc<G>,
    program: Option<G::Program>,
    uniforms: HashMap<String, Option<G::UniformLocation>>,
    last_error: Option<ShaderError>,
}

impl<G: GlApi> ShaderProgram<G> {
    /// Creates an unloaded program. No GPU calls.
    pub fn new(gl: Rc<G>) -> Self {
        Self {
            gl,
            program: None,
            uniforms: HashMap::new(),
            last_error: None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.program.is_some()
    }

    /// Raw program handle, `None` while unloaded.
    pub fn program(&self) -> Option<G::Program> {
        self.program
    }

    /// Error of the most recent failed load, cleared by a successful one.
    pub fn last_error(&self) -> Option<&ShaderError> {
        self.last_error.as_ref()
    }

    /// Compiles and links `vertex` + `fragment`, replacing any loaded program.
    ///
    /// Intermediate shader objects are deleted whatever the outcome. On
    /// failure the program is left unloaded and the error is also kept in
    /// [`last_error`](Self::last_error).
    pub fn load_from_source(&mut self, vertex: &str, fragment: &str) -> Result<(), ShaderError> {
        self.release();
        let result = self.build(vertex, fragment);
        self.finish_load(result)
    }

    /// Reads both stages from disk, then behaves like
    /// [`load_from_source`](Self::load_from_source).
    pub fn load_from_file(
        &mut self,
        vertex_path: impl AsRef<Path>,
        fragment_path: impl AsRef<Path>,
    ) -> Result<(), ShaderError> {
        self.load(
            &ShaderSource::File(vertex_path.as_ref().to_path_buf()),
            &ShaderSource::File(fragment_path.as_ref().to_path_buf()),
        )
    }

    /// Resolves both sources (inline or file) and loads them.
    pub fn load(
        &mut self,
        vertex: &ShaderSource,
        fragment: &ShaderSource,
    ) -> Result<(), ShaderError> {
        let texts = vertex.resolve().and_then(|vs| Ok((vs, fragment.resolve()?)));
        match texts {
            Ok((vs, fs)) => self.load_from_source(&vs, &fs),
            Err(e) => {
                self.release();
                self.finish_load(Err(e))
            }
        }
    }

    /// Makes this program current. No-op while unloaded.
    pub fn bind(&self) {
        if let Some(program) = self.program {
            self.gl.use_program(Some(program));
        }
    }

    /// Clears the current program. No-op while unloaded.
    pub fn unbind(&self) {
        if self.program.is_some() {
            self.gl.use_program(None);
        }
    }

    /// Deletes the GPU program and forgets cached uniform locations.
    pub fn release(&mut self) {
        if let Some(program) = self.program.take() {
            self.gl.delete_program(program);
            log::debug!("shader program {program:?} released");
        }
        self.uniforms.clear();
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    /// Uploads `value` to the uniform `name` of the bound program.
    ///
    /// Unknown names are warned about once and otherwise ignored.
    pub fn set_uniform(&mut self, name: &str, value: UniformValue) {
        if let Some(location) = self.location(name) {
            self.gl.set_uniform(&location, &value);
        }
    }

    pub fn set_bool(&mut self, name: &str, value: bool) {
        self.set_uniform(name, UniformValue::Bool(value));
    }

    pub fn set_int(&mut self, name: &str, value: i32) {
        self.set_uniform(name, UniformValue::Int(value));
    }

    pub fn set_float(&mut self, name: &str, value: f32) {
        self.set_uniform(name, UniformValue::Float(value));
    }

    pub fn set_vec2(&mut self, name: &str, value: Vec2) {
        self.set_uniform(name, UniformValue::Vec2(value.to_array()));
    }

    pub fn set_vec3(&mut self, name: &str, value: Vec3) {
        self.set_uniform(name, UniformValue::Vec3(value.to_array()));
    }

    pub fn set_vec4(&mut self, name: &str, value: Vec4) {
        self.set_uniform(name, UniformValue::Vec4(value.to_array()));
    }

    pub fn set_mat2(&mut self, name: &str, value: Mat2) {
        self.set_uniform(name, UniformValue::Mat2(value.to_cols_array()));
    }

    pub fn set_mat3(&mut self, name: &str, value: Mat3) {
        self.set_uniform(name, UniformValue::Mat3(value.to_cols_array()));
    }

    pub fn set_mat4(&mut self, name: &str, value: Mat4) {
        self.set_uniform(name, UniformValue::Mat4(value.to_cols_array()));
    }

    fn location(&mut self, name: &str) -> Option<G::UniformLocation> {
        let program = self.program?;
        if let Some(cached) = self.uniforms.get(name) {
            return cached.clone();
        }
        let location = self.gl.uniform_location(program, name);
        if location.is_none() {
            log::warn!("uniform `{name}` not found in shader program {program:?}");
        }
        self.uniforms.insert(name.to_string(), location.clone());
        location
    }

    // ── building ──────────────────────────────────────────────────────────

    fn finish_load(&mut self, result: Result<G::Program, ShaderError>) -> Result<(), ShaderError> {
        match result {
            Ok(program) => {
                log::debug!("shader program {program:?} linked");
                self.program = Some(program);
                self.last_error = None;
                Ok(())
            }
            Err(e) => {
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn build(&self, vertex: &str, fragment: &str) -> Result<G::Program, ShaderError> {
        if vertex.trim().is_empty() {
            return Err(ShaderError::EmptySource(ShaderStage::Vertex));
        }
        if fragment.trim().is_empty() {
            return Err(ShaderError::EmptySource(ShaderStage::Fragment));
        }

        let vs = self.compile(ShaderStage::Vertex, vertex)?;
        let fs = match self.compile(ShaderStage::Fragment, fragment) {
            Ok(fs) => fs,
            Err(e) => {
                self.gl.delete_shader(vs);
                return Err(e);
            }
        };

        let linked = self.link(vs, fs);
        self.gl.delete_shader(vs);
        self.gl.delete_shader(fs);
        linked
    }

    fn compile(&self, stage: ShaderStage, source: &str) -> Result<G::Shader, ShaderError> {
        let shader = self.gl.create_shader(stage).map_err(ShaderError::ObjectCreation)?;
        self.gl.shader_source(shader, source);
        self.gl.compile_shader(shader);
        if self.gl.shader_compile_status(shader) {
            return Ok(shader);
        }
        let log = self.gl.shader_info_log(shader);
        self.gl.delete_shader(shader);
        Err(ShaderError::Compile { stage, log })
    }

    fn link(&self, vs: G::Shader, fs: G::Shader) -> Result<G::Program, ShaderError> {
        let program = self.gl.create_program().map_err(ShaderError::ObjectCreation)?;
        self.gl.attach_shader(program, vs);
        self.gl.attach_shader(program, fs);
        self.gl.link_program(program);
        self.gl.detach_shader(program, vs);
        self.gl.detach_shader(program, fs);

        if self.gl.program_link_status(program) {
            return Ok(program);
        }
        let log = self.gl.program_info_log(program);
        self.gl.delete_program(program);
        Err(ShaderError::Link { log })
    }
}

impl<G: GlApi> Drop for ShaderProgram<G> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<G: GlApi> fmt::Debug for ShaderProgram<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShaderProgram")
            .field("program", &self.program)
            .field("cached_uniforms", &self.uniforms.len())
            .field("last_error", &self.last_error)
            .finish()
    }
}
