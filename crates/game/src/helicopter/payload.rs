//! Water carried in the bucket and the timed drop sequence.

use glam::Vec3;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payload {
    amount: f32,
    capacity: f32,
    filled: bool,
}

impl Payload {
    pub fn new(capacity: f32) -> Self {
        Self {
            amount: 0.0,
            capacity,
            filled: false,
        }
    }

    pub fn amount(&self) -> f32 {
        self.amount
    }

    pub fn capacity(&self) -> f32 {
        self.capacity
    }

    /// Reached capacity since the bucket was last emptied.
    pub fn is_filled(&self) -> bool {
        self.filled
    }

    pub fn is_full(&self) -> bool {
        self.amount >= self.capacity
    }

    /// 0–1.
    pub fn fraction(&self) -> f32 {
        if self.capacity > 0.0 {
            (self.amount / self.capacity).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    pub fn percentage(&self) -> u32 {
        (self.fraction() * 100.0).round() as u32
    }

    /// Add `rate * dt`, capped at capacity. Returns true on the step that fills it.
    pub fn fill(&mut self, rate: f32, dt: f32) -> bool {
        if self.is_full() {
            return false;
        }
        self.amount += rate * dt.max(0.0);
        if self.amount >= self.capacity {
            self.amount = self.capacity;
            self.filled = true;
            return true;
        }
        false
    }

    /// Drain toward `remaining`; the amount never grows here.
    pub fn drain_to(&mut self, remaining: f32) {
        self.amount = remaining.clamp(0.0, self.amount);
    }

    pub fn clear_filled(&mut self) {
        self.filled = false;
    }

    pub fn empty(&mut self) {
        self.amount = 0.0;
        self.filled = false;
    }

    #[cfg(test)]
    pub(crate) fn set_amount(&mut self, amount: f32) {
        self.amount = amount.clamp(0.0, self.capacity);
    }
}

/// What a drop step crossed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DropEvents {
    /// Water reached the ground this step (once per drop).
    pub impact: bool,
    /// Time to swing the bucket door shut (once per drop).
    pub close_door: bool,
    pub finished: bool,
}

/// Which half of the drop is playing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DropVisual {
    /// Water column from the bucket toward the ground.
    Stream {
        origin: Vec3,
        length: f32,
        width: f32,
    },
    /// Ground splash spreading at the target.
    Splash { center: Vec3, size: f32, alpha: f32 },
}

/// One water drop in flight. At most one exists at a time.
#[derive(Debug, Clone)]
pub struct WaterDrop {
    progress: f32,
    duration: f32,
    speed: f32,
    initial_amount: f32,
    /// Indices of the fire patches under the bucket when the drop began.
    /// Dropped together with the drop once it finishes.
    targets: Vec<usize>,
    target_position: Vec3,
    hit_ground: bool,
    door_closing: bool,
}

impl WaterDrop {
    pub fn new(
        initial_amount: f32,
        targets: Vec<usize>,
        target_position: Vec3,
        duration: f32,
        speed: f32,
    ) -> Self {
        Self {
            progress: 0.0,
            duration: duration.max(f32::EPSILON),
            speed,
            initial_amount,
            targets,
            target_position,
            hit_ground: false,
            door_closing: false,
        }
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    /// 0–1 over the whole drop.
    pub fn fraction(&self) -> f32 {
        (self.progress / self.duration).clamp(0.0, 1.0)
    }

    pub fn initial_amount(&self) -> f32 {
        self.initial_amount
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn target_position(&self) -> Vec3 {
        self.target_position
    }

    /// Water left in the bucket: cubic ease-out from the initial amount.
    pub fn remaining(&self) -> f32 {
        (self.initial_amount * (1.0 - self.fraction().powi(3))).max(0.0)
    }

    pub fn advance(&mut self, dt: f32) -> DropEvents {
        let mut events = DropEvents::default();
        self.progress = (self.progress + self.speed * dt.max(0.0)).min(self.duration);

        let half = self.duration / 2.0;
        if self.progress >= half && !self.hit_ground {
            self.hit_ground = true;
            events.impact = true;
        }
        if self.progress >= half && !self.door_closing && self.splash_fraction() > 0.6 {
            self.door_closing = true;
            events.close_door = true;
        }
        if self.progress >= self.duration {
            events.finished = true;
        }
        events
    }

    /// 0–1 through the second half, 0 before it.
    fn splash_fraction(&self) -> f32 {
        ((self.fraction() - 0.5) * 2.0).clamp(0.0, 1.0)
    }

    /// What a renderer should draw this frame. `extinguish_radius` sizes the
    /// splash, `capacity` scales the stream width.
    pub fn visual(&self, bucket: Vec3, extinguish_radius: f32, capacity: f32) -> DropVisual {
        let f = self.fraction();
        if f < 0.5 {
            let length = bucket.y.max(0.0) * f * 2.0;
            let width = 0.3 + 0.2 * self.initial_amount / capacity.max(f32::EPSILON);
            DropVisual::Stream {
                origin: bucket,
                length,
                width,
            }
        } else {
            let s = self.splash_fraction();
            DropVisual::Splash {
                center: Vec3::new(self.target_position.x, 0.1, self.target_position.z),
                size: extinguish_radius * s,
                alpha: 0.8 * (1.0 - s * s),
            }
        }
    }
}

/// Playback bookkeeping for the fill sound so a paused fill resumes where it
/// left off.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FillCue {
    pub playing: bool,
    /// Seconds into the cue when it was last paused.
    pub paused_at: f64,
}
