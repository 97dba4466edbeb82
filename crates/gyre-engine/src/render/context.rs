use glam::Mat4;

use crate::coords::ViewportSize;

/// Vertical field of view of the default projection, in degrees.
pub const FOV_Y_DEGREES: f32 = 30.0;
pub const NEAR_PLANE: f32 = 3.0;
pub const FAR_PLANE: f32 = 10.0;

/// Default perspective projection for a viewport with the given aspect ratio.
pub fn perspective(aspect: f32) -> Mat4 {
    Mat4::perspective_rh_gl(FOV_Y_DEGREES.to_radians(), aspect, NEAR_PLANE, FAR_PLANE)
}

/// Default projection for `viewport`, or `None` when its height is zero.
pub fn projection_for(viewport: ViewportSize) -> Option<Mat4> {
    viewport.aspect().map(perspective)
}

/// Per-frame snapshot handed to [`Renderer::render`](super::Renderer::render).
///
/// Rebuilt by the host for every frame; renderers read it and never keep it.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RenderContext {
    viewport: ViewportSize,
    projection: Mat4,
    delta_time: f32,
    frame_number: u64,
}

impl RenderContext {
    /// Creates a context for frame 0.
    pub fn new(viewport: ViewportSize, projection: Mat4, delta_time: f32) -> Self {
        Self {
            viewport,
            projection,
            delta_time,
            frame_number: 0,
        }
    }

    pub fn viewport(&self) -> ViewportSize {
        self.viewport
    }

    /// Column-major projection matrix.
    pub fn projection(&self) -> Mat4 {
        self.projection
    }

    /// Seconds since the previous frame.
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    pub fn frame_number(&self) -> u64 {
        self.frame_number
    }

    pub fn with_frame_number(mut self, frame_number: u64) -> Self {
        self.frame_number = frame_number;
        self
    }

    pub fn with_delta_time(mut self, delta_time: f32) -> Self {
        self.delta_time = delta_time;
        self
    }
}
