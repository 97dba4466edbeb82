/// Linear RGBA color with components in `0.0..=1.0`.
///
/// Used for framebuffer clear colors. No color-space conversion is applied;
/// values are handed to the GPU as-is.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct ColorRgba {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl ColorRgba {
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[inline]
    pub const fn black() -> Self {
        Self::new(0.0, 0.0, 0.0, 1.0)
    }

    /// Returns a copy with every component clamped into `0.0..=1.0`.
    #[inline]
    pub fn clamped(self) -> Self {
        Self::new(
            self.r.clamp(0.0, 1.0),
            self.g.clamp(0.0, 1.0),
            self.b.clamp(0.0, 1.0),
            self.a.clamp(0.0, 1.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamped_limits_each_channel() {
        let c = ColorRgba::new(-0.5, 0.25, 1.5, 2.0).clamped();
        assert_eq!(c, ColorRgba::new(0.0, 0.25, 1.0, 1.0));
    }
}
