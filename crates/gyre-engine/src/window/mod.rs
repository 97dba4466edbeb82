//! Desktop window + runtime loop.
//!
//! Owns the `winit` event loop and window, creates the GL context through
//! `glutin`, and drives a [`RenderSession`](crate::session::RenderSession).

mod runtime;

pub use runtime::{Runtime, RuntimeConfig};
