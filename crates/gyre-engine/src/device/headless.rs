//! Driverless [`GlApi`] implementation.
//!
//! `HeadlessGl` keeps a model of GPU object lifetimes and records every call,
//! so renderer lifecycles can be exercised (and asserted on) without a window
//! or a GPU. Compilation is simulated: a stage compiles when its source is
//! non-blank, declares `main` and has balanced braces. Linking discovers
//! `uniform` declarations in the attached sources and hands out locations
//! for them.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};

use crate::coords::ColorRgba;

use super::api::{GlApi, GlInfo, ShaderStage, UniformValue, VertexAttribute};

/// Object name handed out by [`HeadlessGl`]. Never zero.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct ObjectId(pub u32);

/// Uniform location inside one headless program.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct HeadlessUniform {
    pub program: ObjectId,
    pub location: i32,
}

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub enum GlCall {
    CreateShader(ShaderStage, ObjectId),
    CompileShader(ObjectId),
    DeleteShader(ObjectId),
    CreateProgram(ObjectId),
    LinkProgram(ObjectId),
    DeleteProgram(ObjectId),
    UseProgram(Option<ObjectId>),
    UniformLookup { program: ObjectId, name: String },
    SetUniform {
        location: HeadlessUniform,
        value: UniformValue,
    },
    CreateVertexArray(ObjectId),
    BindVertexArray(Option<ObjectId>),
    DeleteVertexArray(ObjectId),
    CreateBuffer(ObjectId),
    BindArrayBuffer(Option<ObjectId>),
    ArrayBufferData { bytes: usize },
    DeleteBuffer(ObjectId),
    VertexAttribute {
        attribute: VertexAttribute,
        stride: i32,
    },
    Viewport {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    Clear(ColorRgba),
    DrawTriangles { first: i32, count: i32 },
    EnableDepthTest,
}

/// Counts of GPU objects that were created and not yet deleted.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct LiveObjects {
    pub shaders: usize,
    pub programs: usize,
    pub buffers: usize,
    pub vertex_arrays: usize,
}

impl LiveObjects {
    pub fn is_empty(self) -> bool {
        self == Self::default()
    }
}

#[derive(Debug)]
struct ShaderObject {
    stage: ShaderStage,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Debug, Default)]
struct ProgramObject {
    attached: Vec<ObjectId>,
    linked: bool,
    log: String,
    uniforms: BTreeMap<String, i32>,
}

#[derive(Debug, Default)]
struct State {
    next_id: u32,
    shaders: BTreeMap<ObjectId, ShaderObject>,
    programs: BTreeMap<ObjectId, ProgramObject>,
    buffers: BTreeSet<ObjectId>,
    vertex_arrays: BTreeSet<ObjectId>,
    calls: Vec<GlCall>,
    fail_link: bool,
    fail_buffers: bool,
}

impl State {
    fn alloc(&mut self) -> ObjectId {
        self.next_id += 1;
        ObjectId(self.next_id)
    }
}

/// Recording, driverless GPU API.
#[derive(Debug, Default)]
pub struct HeadlessGl {
    state: RefCell<State>,
}

impl HeadlessGl {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent link fail with a synthetic linker log.
    pub fn set_fail_link(&self, fail: bool) {
        self.state.borrow_mut().fail_link = fail;
    }

    /// Makes vertex array and buffer creation fail.
    pub fn set_fail_buffers(&self, fail: bool) {
        self.state.borrow_mut().fail_buffers = fail;
    }

    /// All calls recorded so far, oldest first.
    pub fn calls(&self) -> Vec<GlCall> {
        self.state.borrow().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.borrow_mut().calls.clear();
    }

    /// `(first, count)` of every recorded triangle draw.
    pub fn draws(&self) -> Vec<(i32, i32)> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                GlCall::DrawTriangles { first, count } => Some((*first, *count)),
                _ => None,
            })
            .collect()
    }

    /// Colors of every recorded clear.
    pub fn clears(&self) -> Vec<ColorRgba> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                GlCall::Clear(color) => Some(*color),
                _ => None,
            })
            .collect()
    }

    /// Number of location lookups issued for `name`, across all programs.
    pub fn uniform_lookups(&self, name: &str) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| matches!(c, GlCall::UniformLookup { name: n, .. } if n == name))
            .count()
    }

    /// Values uploaded to uniforms, oldest first.
    pub fn uniform_uploads(&self) -> Vec<UniformValue> {
        self.state
            .borrow()
            .calls
            .iter()
            .filter_map(|c| match c {
                GlCall::SetUniform { value, .. } => Some(*value),
                _ => None,
            })
            .collect()
    }

    pub fn live_objects(&self) -> LiveObjects {
        let s = self.state.borrow();
        LiveObjects {
            shaders: s.shaders.len(),
            programs: s.programs.len(),
            buffers: s.buffers.len(),
            vertex_arrays: s.vertex_arrays.len(),
        }
    }

    fn record(&self, call: GlCall) {
        self.state.borrow_mut().calls.push(call);
    }
}

fn simulate_compile(source: &str) -> Result<(), String> {
    if source.trim().is_empty() {
        return Err("0:1(1): error: empty shader source".to_string());
    }
    let mut depth = 0i32;
    for (line_no, line) in source.lines().enumerate() {
        for ch in line.chars() {
            match ch {
                '{' => depth += 1,
                '}' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(format!("0:{}(1): error: syntax error, unexpected '}}'", line_no + 1));
            }
        }
    }
    if depth != 0 {
        return Err("0:0(0): error: syntax error, unexpected end of file".to_string());
    }
    if !source.contains("void main") {
        return Err("0:0(0): error: function `main' is not defined".to_string());
    }
    Ok(())
}

/// Names declared with `uniform` in `source`, in declaration order.
fn declared_uniforms(source: &str) -> Vec<String> {
    source
        .split(';')
        .filter_map(|stmt| {
            let mut tokens = stmt.split_whitespace();
            tokens.find(|t| *t == "uniform")?;
            let name = tokens.last()?;
            let name = name.split('[').next().unwrap_or(name);
            Some(name.to_string())
        })
        .collect()
}

impl GlApi for HeadlessGl {
    type Shader = ObjectId;
    type Program = ObjectId;
    type Buffer = ObjectId;
    type VertexArray = ObjectId;
    type UniformLocation = HeadlessUniform;

    fn create_shader(&self, stage: ShaderStage) -> Result<Self::Shader, String> {
        let mut s = self.state.borrow_mut();
        let id = s.alloc();
        s.shaders.insert(
            id,
            ShaderObject {
                stage,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        s.calls.push(GlCall::CreateShader(stage, id));
        Ok(id)
    }

    fn shader_source(&self, shader: Self::Shader, source: &str) {
        if let Some(obj) = self.state.borrow_mut().shaders.get_mut(&shader) {
            obj.source = source.to_string();
        }
    }

    fn compile_shader(&self, shader: Self::Shader) {
        let mut s = self.state.borrow_mut();
        if let Some(obj) = s.shaders.get_mut(&shader) {
            match simulate_compile(&obj.source) {
                Ok(()) => {
                    obj.compiled = true;
                    obj.log.clear();
                }
                Err(log) => {
                    obj.compiled = false;
                    obj.log = log;
                }
            }
        }
        s.calls.push(GlCall::CompileShader(shader));
    }

    fn shader_compile_status(&self, shader: Self::Shader) -> bool {
        self.state.borrow().shaders.get(&shader).is_some_and(|o| o.compiled)
    }

    fn shader_info_log(&self, shader: Self::Shader) -> String {
        self.state
            .borrow()
            .shaders
            .get(&shader)
            .map(|o| o.log.clone())
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: Self::Shader) {
        let mut s = self.state.borrow_mut();
        s.shaders.remove(&shader);
        s.calls.push(GlCall::DeleteShader(shader));
    }

    fn create_program(&self) -> Result<Self::Program, String> {
        let mut s = self.state.borrow_mut();
        let id = s.alloc();
        s.programs.insert(id, ProgramObject::default());
        s.calls.push(GlCall::CreateProgram(id));
        Ok(id)
    }

    fn attach_shader(&self, program: Self::Program, shader: Self::Shader) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.push(shader);
        }
    }

    fn detach_shader(&self, program: Self::Program, shader: Self::Shader) {
        if let Some(p) = self.state.borrow_mut().programs.get_mut(&program) {
            p.attached.retain(|s| *s != shader);
        }
    }

    fn link_program(&self, program: Self::Program) {
        let mut s = self.state.borrow_mut();
        s.calls.push(GlCall::LinkProgram(program));

        let Some(attached) = s.programs.get(&program).map(|p| p.attached.clone()) else {
            return;
        };

        let mut stages = BTreeSet::new();
        let mut uniforms = BTreeMap::new();
        let mut error = s.fail_link.then(|| "error: link rejected by driver".to_string());

        for id in &attached {
            match s.shaders.get(id) {
                Some(obj) if obj.compiled => {
                    stages.insert(obj.stage.label());
                    for name in declared_uniforms(&obj.source) {
                        let next = uniforms.len() as i32;
                        uniforms.entry(name).or_insert(next);
                    }
                }
                _ => error = Some("error: linking with uncompiled shader".to_string()),
            }
        }
        if error.is_none() && stages.len() != 2 {
            error = Some("error: program lacks a vertex or fragment stage".to_string());
        }

        if let Some(p) = s.programs.get_mut(&program) {
            match error {
                Some(log) => {
                    p.linked = false;
                    p.log = log;
                    p.uniforms.clear();
                }
                None => {
                    p.linked = true;
                    p.log.clear();
                    p.uniforms = uniforms;
                }
            }
        }
    }

    fn program_link_status(&self, program: Self::Program) -> bool {
        self.state.borrow().programs.get(&program).is_some_and(|p| p.linked)
    }

    fn program_info_log(&self, program: Self::Program) -> String {
        self.state
            .borrow()
            .programs
            .get(&program)
            .map(|p| p.log.clone())
            .unwrap_or_default()
    }

    fn delete_program(&self, program: Self::Program) {
        let mut s = self.state.borrow_mut();
        s.programs.remove(&program);
        s.calls.push(GlCall::DeleteProgram(program));
    }

    fn use_program(&self, program: Option<Self::Program>) {
        self.record(GlCall::UseProgram(program));
    }

    fn uniform_location(
        &self,
        program: Self::Program,
        name: &str,
    ) -> Option<Self::UniformLocation> {
        let mut s = self.state.borrow_mut();
        s.calls.push(GlCall::UniformLookup {
            program,
            name: name.to_string(),
        });
        let p = s.programs.get(&program).filter(|p| p.linked)?;
        let location = *p.uniforms.get(name)?;
        Some(HeadlessUniform { program, location })
    }

    fn set_uniform(&self, location: &Self::UniformLocation, value: &UniformValue) {
        self.record(GlCall::SetUniform {
            location: *location,
            value: *value,
        });
    }

    fn create_vertex_array(&self) -> Result<Self::VertexArray, String> {
        let mut s = self.state.borrow_mut();
        if s.fail_buffers {
            return Err("out of memory".to_string());
        }
        let id = s.alloc();
        s.vertex_arrays.insert(id);
        s.calls.push(GlCall::CreateVertexArray(id));
        Ok(id)
    }

    fn bind_vertex_array(&self, vertex_array: Option<Self::VertexArray>) {
        self.record(GlCall::BindVertexArray(vertex_array));
    }

    fn delete_vertex_array(&self, vertex_array: Self::VertexArray) {
        let mut s = self.state.borrow_mut();
        s.vertex_arrays.remove(&vertex_array);
        s.calls.push(GlCall::DeleteVertexArray(vertex_array));
    }

    fn create_buffer(&self) -> Result<Self::Buffer, String> {
        let mut s = self.state.borrow_mut();
        if s.fail_buffers {
            return Err("out of memory".to_string());
        }
        let id = s.alloc();
        s.buffers.insert(id);
        s.calls.push(GlCall::CreateBuffer(id));
        Ok(id)
    }

    fn bind_array_buffer(&self, buffer: Option<Self::Buffer>) {
        self.record(GlCall::BindArrayBuffer(buffer));
    }

    fn array_buffer_data(&self, data: &[u8]) {
        self.record(GlCall::ArrayBufferData { bytes: data.len() });
    }

    fn delete_buffer(&self, buffer: Self::Buffer) {
        let mut s = self.state.borrow_mut();
        s.buffers.remove(&buffer);
        s.calls.push(GlCall::DeleteBuffer(buffer));
    }

    fn vertex_attribute_f32(&self, attribute: VertexAttribute, stride: i32) {
        self.record(GlCall::VertexAttribute { attribute, stride });
    }

    fn viewport(&self, x: i32, y: i32, width: i32, height: i32) {
        self.record(GlCall::Viewport {
            x,
            y,
            width,
            height,
        });
    }

    fn clear(&self, color: ColorRgba) {
        self.record(GlCall::Clear(color));
    }

    fn draw_triangles(&self, first: i32, count: i32) {
        self.record(GlCall::DrawTriangles { first, count });
    }

    fn enable_depth_test(&self) {
        self.record(GlCall::EnableDepthTest);
    }

    fn info(&self) -> GlInfo {
        GlInfo {
            vendor: "gyre".to_string(),
            renderer: "headless".to_string(),
            version: "3.3 (headless)".to_string(),
            shading_language: "3.30".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VS: &str = "#version 330 core\nuniform mat4 mvp;\nvoid main() { gl_Position = mvp * vec4(0.0); }";
    const FS: &str = "#version 330 core\nuniform vec4 tint;\nout vec4 c;\nvoid main() { c = tint; }";

    fn build(gl: &HeadlessGl, vs: &str, fs: &str) -> ObjectId {
        let v = gl.create_shader(ShaderStage::Vertex).unwrap();
        gl.shader_source(v, vs);
        gl.compile_shader(v);
        let f = gl.create_shader(ShaderStage::Fragment).unwrap();
        gl.shader_source(f, fs);
        gl.compile_shader(f);
        let p = gl.create_program().unwrap();
        gl.attach_shader(p, v);
        gl.attach_shader(p, f);
        gl.link_program(p);
        p
    }

    #[test]
    fn compile_rejects_unbalanced_braces() {
        assert!(simulate_compile("void main() {").is_err());
        assert!(simulate_compile("void main() }").is_err());
        assert!(simulate_compile("void main() {}").is_ok());
    }

    #[test]
    fn compile_rejects_missing_main() {
        assert!(simulate_compile("float f() { return 1.0; }").is_err());
    }

    #[test]
    fn declared_uniforms_strips_arrays() {
        let names = declared_uniforms("uniform mat4 mvp; uniform float w[4]; in vec3 p;");
        assert_eq!(names, vec!["mvp".to_string(), "w".to_string()]);
    }

    #[test]
    fn link_discovers_uniforms_from_both_stages() {
        let gl = HeadlessGl::new();
        let p = build(&gl, VS, FS);
        assert!(gl.program_link_status(p));
        assert!(gl.uniform_location(p, "mvp").is_some());
        assert!(gl.uniform_location(p, "tint").is_some());
        assert!(gl.uniform_location(p, "missing").is_none());
    }

    #[test]
    fn forced_link_failure_sets_log() {
        let gl = HeadlessGl::new();
        gl.set_fail_link(true);
        let p = build(&gl, VS, FS);
        assert!(!gl.program_link_status(p));
        assert!(!gl.program_info_log(p).is_empty());
    }

    #[test]
    fn live_objects_track_deletion() {
        let gl = HeadlessGl::new();
        let b = gl.create_buffer().unwrap();
        let v = gl.create_vertex_array().unwrap();
        assert_eq!(gl.live_objects().buffers, 1);
        gl.delete_buffer(b);
        gl.delete_vertex_array(v);
        assert!(gl.live_objects().is_empty());
    }
}
