//! Frame timing for the per-frame kernel parameters

use std::time::{Duration, Instant};

/// Longest time step a single frame may advance. A stall (window drag,
/// debugger) would otherwise launch every particle out of the area at once.
pub const MAX_TIME_STEP: f32 = 1.0 / 3.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTime {
    pub time_step: f32,
    pub elapsed: f32,
}

#[derive(Debug, Clone)]
pub struct FrameClock {
    start: Instant,
    last: Instant,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(start: Instant) -> Self {
        Self { start, last: start }
    }

    pub fn tick(&mut self) -> FrameTime {
        self.tick_at(Instant::now())
    }

    pub fn tick_at(&mut self, now: Instant) -> FrameTime {
        let delta = now.saturating_duration_since(self.last);
        self.last = now;
        FrameTime {
            time_step: delta.as_secs_f32().min(MAX_TIME_STEP),
            elapsed: now.saturating_duration_since(self.start).as_secs_f32(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.last.saturating_duration_since(self.start)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
