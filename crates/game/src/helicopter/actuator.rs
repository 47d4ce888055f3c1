//! Target-seeking animation used for the bucket winch and the bucket door.

/// A 0–1 progress value that moves toward a target at a fixed rate.
///
/// `engaged` only flips once the progress actually reaches its end, so a
/// half-lowered bucket still reads as retracted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Actuator {
    progress: f32,
    rate: f32,
    engaged: bool,
    target: Option<bool>,
}

impl Actuator {
    /// `rate` is progress per time unit.
    pub fn new(rate: f32) -> Self {
        Self {
            progress: 0.0,
            rate: rate.max(f32::EPSILON),
            engaged: false,
            target: None,
        }
    }

    /// Start moving toward fully engaged (1.0).
    pub fn engage(&mut self) {
        self.target = Some(true);
    }

    /// Start moving toward fully released (0.0).
    pub fn release(&mut self) {
        self.target = Some(false);
    }

    /// Reverse direction relative to the current resting state or motion.
    pub fn toggle(&mut self) {
        match self.target {
            Some(t) => self.target = Some(!t),
            None => self.target = Some(!self.engaged),
        }
    }

    pub fn is_engaged(&self) -> bool {
        self.engaged
    }

    pub fn in_motion(&self) -> bool {
        self.target.is_some()
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// Snap back to released and idle.
    pub fn reset(&mut self) {
        self.progress = 0.0;
        self.engaged = false;
        self.target = None;
    }

    /// Advance by `dt` time units. Returns the new resting state when the
    /// motion finishes this step.
    pub fn step(&mut self, dt: f32) -> Option<bool> {
        let target = self.target?;
        let delta = self.rate * dt.max(0.0);
        if target {
            self.progress = (self.progress + delta).min(1.0);
            if self.progress >= 1.0 {
                return Some(self.finish(true));
            }
        } else {
            self.progress = (self.progress - delta).max(0.0);
            if self.progress <= 0.0 {
                return Some(self.finish(false));
            }
        }
        None
    }

    fn finish(&mut self, engaged: bool) -> bool {
        self.engaged = engaged;
        self.target = None;
        engaged
    }
}
