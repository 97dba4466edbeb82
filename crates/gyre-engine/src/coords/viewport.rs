/// Framebuffer size in physical pixels.
///
/// Either dimension may be zero (minimized window, surface not yet sized).
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct ViewportSize {
    pub width: u32,
    pub height: u32,
}

impl ViewportSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width divided by height, or `None` when the height is zero.
    #[inline]
    pub fn aspect(self) -> Option<f32> {
        if self.height == 0 {
            None
        } else {
            Some(self.width as f32 / self.height as f32)
        }
    }
}

impl From<winit::dpi::PhysicalSize<u32>> for ViewportSize {
    fn from(size: winit::dpi::PhysicalSize<u32>) -> Self {
        Self::new(size.width, size.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aspect_of_landscape_viewport() {
        let aspect = ViewportSize::new(800, 600).aspect().unwrap();
        assert!((aspect - 4.0 / 3.0).abs() < 1e-6);
    }

    #[test]
    fn aspect_undefined_for_zero_height() {
        assert_eq!(ViewportSize::new(800, 0).aspect(), None);
        assert!(ViewportSize::new(800, 0).is_empty());
    }
}
