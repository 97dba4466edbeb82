//! Shared core of the spinning-primitive renderers.
//!
//! `SpinningMesh` owns one shader program, one vertex array and one vertex
//! buffer, and draws them every frame rotated about Z by an angle that grows
//! by a fixed step per frame. The concrete renderers only differ in their
//! vertex record `V` and their name.

use std::marker::PhantomData;
use std::rc::Rc;

use glam::{Mat4, Vec3};

use crate::coords::{ColorRgba, ViewportSize};
use crate::device::GlApi;

use super::config::ShaderSource;
use super::context::{RenderContext, perspective, projection_for};
use super::error::{ErrorCallback, RenderError, RenderErrorKind};
use super::shader::ShaderProgram;
use super::vertex::Vertex;

/// Distance the primitive is pushed away from the camera.
const MODEL_DEPTH: f32 = -5.0;

pub(crate) struct SpinningMesh<G: GlApi, V: Vertex> {
    gl: Rc<G>,
    label: &'static str,
    shader: ShaderProgram<G>,
    vao: Option<G::VertexArray>,
    vbo: Option<G::Buffer>,
    vertex_count: i32,
    clear_color: ColorRgba,
    rotation_speed: f32,
    /// Degrees, always in `0.0..360.0`.
    angle: f32,
    projection: Mat4,
    initialized: bool,
    error_callback: Option<ErrorCallback>,
    _vertex: PhantomData<V>,
}

impl<G: GlApi, V: Vertex> SpinningMesh<G, V> {
    pub(crate) fn new(gl: Rc<G>, label: &'static str) -> Self {
        Self {
            shader: ShaderProgram::new(Rc::clone(&gl)),
            gl,
            label,
            vao: None,
            vbo: None,
            vertex_count: 0,
            clear_color: ColorRgba::black(),
            rotation_speed: 0.0,
            angle: 0.0,
            projection: perspective(1.0),
            initialized: false,
            error_callback: None,
            _vertex: PhantomData,
        }
    }

    pub(crate) fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub(crate) fn angle(&self) -> f32 {
        self.angle
    }

    pub(crate) fn projection(&self) -> Mat4 {
        self.projection
    }

    pub(crate) fn vertex_count(&self) -> i32 {
        self.vertex_count
    }

    pub(crate) fn set_error_callback(&mut self, callback: ErrorCallback) {
        self.error_callback = Some(callback);
    }

    /// Logs the failure, forwards it to the callback and returns it.
    pub(crate) fn report(
        &mut self,
        kind: RenderErrorKind,
        message: impl Into<String>,
    ) -> RenderError {
        let message = message.into();
        log::error!("[{}] {kind}: {message}", self.label);
        if let Some(callback) = self.error_callback.as_mut() {
            callback(kind, &message);
        }
        RenderError::new(kind, message)
    }

    /// Builds the program and geometry, replacing anything built before.
    ///
    /// On failure every object allocated here is released again.
    pub(crate) fn initialize(
        &mut self,
        vertex_shader: &ShaderSource,
        fragment_shader: &ShaderSource,
        vertices: &[V],
        clear_color: ColorRgba,
        rotation_speed: f32,
    ) -> Result<(), RenderError> {
        self.cleanup();

        if let Err(e) = self.shader.load(vertex_shader, fragment_shader) {
            return Err(self.report(RenderErrorKind::ShaderCompilationFailed, e.to_string()));
        }

        if let Err(message) = self.upload(vertices) {
            self.shader.release();
            return Err(self.report(RenderErrorKind::BufferCreationFailed, message));
        }

        self.clear_color = clear_color.clamped();
        self.rotation_speed = rotation_speed;
        self.angle = 0.0;
        self.initialized = true;
        log::info!("[{}] initialized with {} vertices", self.label, self.vertex_count);
        Ok(())
    }

    fn upload(&mut self, vertices: &[V]) -> Result<(), String> {
        if vertices.is_empty() {
            return Err("vertex data is empty".to_string());
        }
        let count = i32::try_from(vertices.len())
            .map_err(|_| format!("{} vertices exceed the draw range", vertices.len()))?;

        let vao = self
            .gl
            .create_vertex_array()
            .map_err(|e| format!("cannot create vertex array: {e}"))?;
        let vbo = match self.gl.create_buffer() {
            Ok(vbo) => vbo,
            Err(e) => {
                self.gl.delete_vertex_array(vao);
                return Err(format!("cannot create vertex buffer: {e}"));
            }
        };

        self.gl.bind_vertex_array(Some(vao));
        self.gl.bind_array_buffer(Some(vbo));
        self.gl.array_buffer_data(bytemuck::cast_slice(vertices));
        for attribute in V::ATTRIBUTES {
            self.gl.vertex_attribute_f32(*attribute, V::stride());
        }
        self.gl.bind_array_buffer(None);
        self.gl.bind_vertex_array(None);

        log::debug!("[{}] uploaded {count} vertices into {vbo:?} / {vao:?}", self.label);
        self.vao = Some(vao);
        self.vbo = Some(vbo);
        self.vertex_count = count;
        Ok(())
    }

    pub(crate) fn render(&mut self, context: &RenderContext) -> Result<(), RenderError> {
        let Some(vao) = self.vao.filter(|_| self.initialized) else {
            return Err(self.report(
                RenderErrorKind::InitializationFailed,
                "render called on an uninitialized renderer",
            ));
        };

        self.gl.clear(self.clear_color);

        self.angle = (self.angle + self.rotation_speed).rem_euclid(360.0);
        let model = Mat4::from_translation(Vec3::new(0.0, 0.0, MODEL_DEPTH))
            * Mat4::from_rotation_z(self.angle.to_radians());
        let mvp = context.projection() * model;

        self.shader.bind();
        self.shader.set_mat4("mvp", mvp);
        self.gl.bind_vertex_array(Some(vao));
        self.gl.draw_triangles(0, self.vertex_count);
        self.gl.bind_vertex_array(None);
        self.shader.unbind();
        Ok(())
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if !self.initialized {
            return Err(self.report(
                RenderErrorKind::InitializationFailed,
                "resize called on an uninitialized renderer",
            ));
        }
        let w = i32::try_from(width).unwrap_or(i32::MAX);
        let h = i32::try_from(height).unwrap_or(i32::MAX);
        self.gl.viewport(0, 0, w, h);
        if let Some(projection) = projection_for(ViewportSize::new(width, height)) {
            self.projection = projection;
        }
        Ok(())
    }

    /// Releases every GPU object. Safe to call any number of times.
    pub(crate) fn cleanup(&mut self) {
        let had_resources = self.vao.is_some() || self.vbo.is_some() || self.shader.is_loaded();
        if let Some(vao) = self.vao.take() {
            self.gl.delete_vertex_array(vao);
        }
        if let Some(vbo) = self.vbo.take() {
            self.gl.delete_buffer(vbo);
        }
        self.shader.release();
        self.vertex_count = 0;
        self.initialized = false;
        if had_resources {
            log::debug!("[{}] GPU resources released", self.label);
        }
    }
}

impl<G: GlApi, V: Vertex> Drop for SpinningMesh<G, V> {
    fn drop(&mut self) {
        self.cleanup();
    }
}
