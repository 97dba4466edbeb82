use std::time::{Duration, Instant};

/// Counts presented frames and reports a rate once per window.
#[derive(Debug, Clone)]
pub struct FpsCounter {
    window: Duration,
    window_start: Instant,
    frames: u32,
}

impl FpsCounter {
    /// Counter reporting once per second.
    pub fn new() -> Self {
        Self::with_window(Duration::from_secs(1))
    }

    pub fn with_window(window: Duration) -> Self {
        Self {
            window,
            window_start: Instant::now(),
            frames: 0,
        }
    }

    pub fn frame(&mut self) -> Option<f64> {
        self.frame_at(Instant::now())
    }

    /// Counts one frame at `now`; returns frames per second when a full
    /// window has elapsed, then starts a new window.
    pub fn frame_at(&mut self, now: Instant) -> Option<f64> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }
        let fps = f64::from(self.frames) / elapsed.as_secs_f64();
        self.frames = 0;
        self.window_start = now;
        Some(fps)
    }
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}
