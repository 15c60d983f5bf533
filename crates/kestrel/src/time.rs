use std::time::{Duration, Instant};

/// Timing of the current tick.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct FrameTime {
    /// Time since the previous tick (or since `start` on the first tick).
    pub delta: Duration,
    /// Time since the host was started.
    pub elapsed: Duration,
    /// Ticks since start, counting the current one.
    pub frame_count: u64,
}

impl FrameTime {
    #[inline]
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    #[inline]
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }
}

/// Monotonic clock behind [`FrameTime`].
#[derive(Debug)]
pub(crate) struct TimeTracker {
    start: Instant,
    last: Instant,
    frame_count: u64,
}

impl TimeTracker {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            frame_count: 0,
        }
    }

    /// Restarts the clock, used when the host (re)starts running.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    fn tick_at(&mut self, now: Instant) -> FrameTime {
        // Instant is monotonic, saturate anyway for clocks that stall.
        let delta = now.saturating_duration_since(self.last);
        self.last = now;
        self.frame_count += 1;
        FrameTime {
            delta,
            elapsed: now.saturating_duration_since(self.start),
            frame_count: self.frame_count,
        }
    }
}
