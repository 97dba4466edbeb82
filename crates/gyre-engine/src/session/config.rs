/// How the per-frame delta time is produced.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum DeltaTime {
    /// Constant step in seconds, independent of wall time.
    Fixed(f32),
    /// Measured by a [`FrameClock`](crate::time::FrameClock) between frames.
    Measured,
}

impl DeltaTime {
    /// Nominal 60 Hz step.
    pub const NOMINAL: DeltaTime = DeltaTime::Fixed(0.016);
}

impl Default for DeltaTime {
    fn default() -> Self {
        Self::NOMINAL
    }
}

/// Settings of a [`RenderSession`](super::RenderSession).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct SessionConfig {
    pub delta_time: DeltaTime,
}

impl SessionConfig {
    pub fn measured() -> Self {
        Self {
            delta_time: DeltaTime::Measured,
        }
    }
}
