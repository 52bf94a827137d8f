use std::time::{Duration, Instant};

/// Measures the time between frames
///
/// The delta is handed back from [`FrameTimer::tick`] so callers pass it down explicitly.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    start: Instant,
    prev: Instant,
    delta: Duration,
}

impl Default for FrameTimer {
    fn default() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            prev: now,
            delta: Duration::ZERO,
        }
    }
}

impl FrameTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the start of a new frame and returns the time since the previous one
    pub fn tick(&mut self) -> Duration {
        let now = Instant::now();
        self.delta = now.saturating_duration_since(self.prev);
        self.prev = now;
        self.delta
    }

    pub fn delta(&self) -> Duration {
        self.delta
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Time since the timer was created
    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }
}
