//! Renderer abstraction.
//!
//! A [`Renderer`] owns the GPU objects for one primitive and obeys a fixed
//! lifecycle (uninitialized → initialized → rendering → cleaned up). Hosts
//! pick a renderer through [`RendererFactory`], describe what it draws with a
//! [`RenderConfig`], and hand it a fresh [`RenderContext`] every frame.
//!
//! Convention:
//! - Geometry is in normalized model space, placed at z = -5 and spun about Z.
//! - Matrices are column-major (`glam`), uploaded as the `mvp` uniform.

mod config;
mod context;
mod cube;
mod error;
mod mesh;
mod renderer;
mod shader;
mod triangle;
mod vertex;

pub use config::{RenderConfig, ShaderDialect, ShaderSource, VertexData, embedded};
pub use context::{FAR_PLANE, FOV_Y_DEGREES, NEAR_PLANE, RenderContext, perspective, projection_for};
pub use cube::CubeRenderer;
pub use error::{ErrorCallback, RenderError, RenderErrorKind};
pub use renderer::{Renderer, RendererFactory, RendererKind, UnknownRenderer};
pub use shader::{ShaderError, ShaderProgram};
pub use triangle::TriangleRenderer;
pub use vertex::{ColoredVertex, TexturedVertex, Vertex};
