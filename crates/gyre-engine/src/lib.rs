//! Gyre engine crate.
//!
//! A small OpenGL renderer abstraction: pluggable renderers with an explicit
//! GPU lifecycle, the GL call seam they draw through, and the two hosts that
//! drive them (a desktop window loop and a dedicated render thread).

pub mod coords;
pub mod device;
pub mod logging;
pub mod render;
pub mod session;
pub mod time;
pub mod window;
