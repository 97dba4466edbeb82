//! Small value types shared by the renderers and the host loops.
//!
//! Sizes are physical pixels; colors are linear RGBA in `0.0..=1.0`.

mod color;
mod viewport;

pub use color::ColorRgba;
pub use viewport::ViewportSize;
