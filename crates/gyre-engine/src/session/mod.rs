//! Host-facing render session.
//!
//! [`RenderSession`] is what a host loop talks to: it owns the active
//! renderer and turns "draw a frame" into a [`RenderContext`](crate::render::RenderContext).
//! [`RenderThread`] runs a session on its own thread for hosts that hand
//! over a surface instead of running a loop (the Android bridge shape).

mod config;
mod render_session;
mod thread;

pub use config::{DeltaTime, SessionConfig};
pub use render_session::{NO_RENDERER, RenderSession};
pub use thread::{PresentSurface, RenderThread};
