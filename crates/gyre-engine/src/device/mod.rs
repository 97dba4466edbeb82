//! GPU API seam.
//!
//! Renderers and shader programs talk to the GPU exclusively through
//! [`GlApi`]. Two implementations exist:
//! - [`GlowApi`] wraps a real `glow` context (desktop GL or GLES)
//! - `HeadlessGl` records calls without a driver (tests, or the `headless`
//!   feature)

mod api;
mod glow_api;
#[cfg(any(test, feature = "headless"))]
pub mod headless;

pub use api::{GlApi, GlInfo, ShaderStage, UniformValue, VertexAttribute};
pub use glow_api::GlowApi;
#[cfg(any(test, feature = "headless"))]
pub use headless::HeadlessGl;
