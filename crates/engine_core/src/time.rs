//! Time management for the game loop.

use std::time::{Duration, Instant};

/// Longest frame delta fed into the simulation. A stalled window (drag, breakpoint)
/// would otherwise dump seconds of time into a single tick.
const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

/// Manages frame timing and delta time calculation.
#[derive(Debug)]
pub struct Time {
    /// Time when the engine started.
    start_time: Instant,
    /// Time of the last frame.
    last_frame: Instant,
    /// Duration of the last frame (clamped).
    delta: Duration,
    /// Total elapsed time since start.
    elapsed: Duration,
    /// Frame count since start.
    frame_count: u64,
    /// Fixed timestep for simulation ticks (default 20 Hz).
    fixed_timestep: Duration,
    /// Accumulated time for fixed updates.
    accumulator: Duration,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    /// Create a new time manager.
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_frame: now,
            delta: Duration::ZERO,
            elapsed: Duration::ZERO,
            frame_count: 0,
            fixed_timestep: Duration::from_secs_f64(1.0 / 20.0),
            accumulator: Duration::ZERO,
        }
    }

    /// Update timing at the start of a new frame.
    pub fn update(&mut self) {
        let now = Instant::now();
        let raw = now - self.last_frame;
        self.last_frame = now;
        self.elapsed = now - self.start_time;
        self.advance(raw);
    }

    /// Feed an explicit frame delta. Used by `update` and by headless drivers.
    pub fn advance(&mut self, raw: Duration) {
        if raw > MAX_FRAME_DELTA {
            log::debug!("Frame delta {:?} clamped to {:?}", raw, MAX_FRAME_DELTA);
        }
        self.delta = raw.min(MAX_FRAME_DELTA);
        self.frame_count += 1;
        self.accumulator += self.delta;
    }

    /// Get the delta time in seconds.
    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Get total elapsed time in seconds.
    pub fn elapsed_seconds(&self) -> f32 {
        self.elapsed.as_secs_f32()
    }

    /// Get the current frame count.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get the fixed timestep in seconds.
    pub fn fixed_timestep_seconds(&self) -> f32 {
        self.fixed_timestep.as_secs_f32()
    }

    /// Check if a fixed update should run and consume the time.
    pub fn should_fixed_update(&mut self) -> bool {
        if self.accumulator >= self.fixed_timestep {
            self.accumulator -= self.fixed_timestep;
            true
        } else {
            false
        }
    }

    /// Set the fixed timestep rate in Hz. Non-positive rates fall back to 1 Hz.
    pub fn set_fixed_rate(&mut self, hz: f64) {
        let hz = if hz > 0.0 { hz } else { 1.0 };
        self.fixed_timestep = Duration::from_secs_f64(1.0 / hz);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_update_consumes_accumulated_steps() {
        let mut time = Time::new();
        time.set_fixed_rate(20.0);
        time.advance(Duration::from_millis(120));
        let mut steps = 0;
        while time.should_fixed_update() {
            steps += 1;
        }
        assert_eq!(steps, 2);
    }

    #[test]
    fn huge_frame_delta_is_clamped() {
        let mut time = Time::new();
        time.advance(Duration::from_secs(5));
        assert!((time.delta_seconds() - 0.25).abs() < 1e-6);
        assert_eq!(time.frame_count(), 1);
    }

    #[test]
    fn invalid_rate_falls_back() {
        let mut time = Time::new();
        time.set_fixed_rate(0.0);
        assert!((time.fixed_timestep_seconds() - 1.0).abs() < 1e-6);
    }
}
