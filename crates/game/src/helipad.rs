//! Helipad lights on the main building roof.
//!
//! The pad flashes an alternate texture and pulses its corner lights while
//! the helicopter lifts off the pad or settles back onto it.

use crate::helicopter::{FlightState, LandingPhase};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HelipadMode {
    #[default]
    Idle,
    TakeOff,
    Landing,
}

#[derive(Debug, Clone)]
pub struct HelipadSignal {
    mode: HelipadMode,
    flash_time: f32,
    pulse_time: f32,
    /// Seconds per texture swap.
    flash_duration: f32,
    /// Corner light pulses per second.
    pulse_frequency: f32,
}

impl Default for HelipadSignal {
    fn default() -> Self {
        Self {
            mode: HelipadMode::Idle,
            flash_time: 0.0,
            pulse_time: 0.0,
            flash_duration: 0.2,
            pulse_frequency: 1.5,
        }
    }
}

impl HelipadSignal {
    /// Advance by `dt` seconds given the helicopter's current state.
    pub fn update(&mut self, dt: f32, state: FlightState) {
        self.flash_time += dt;
        self.pulse_time += dt;
        self.mode = match state {
            FlightState::TakingOff { from_pad: true } => HelipadMode::TakeOff,
            FlightState::LandingBase(LandingPhase::Descending) => HelipadMode::Landing,
            _ => HelipadMode::Idle,
        };
        if self.mode == HelipadMode::Idle {
            self.flash_time = 0.0;
        }
    }

    pub fn mode(&self) -> HelipadMode {
        self.mode
    }

    pub fn is_active(&self) -> bool {
        self.mode != HelipadMode::Idle
    }

    /// Whether the alternate helipad texture shows this frame.
    pub fn show_alternate(&self) -> bool {
        self.is_active() && (self.flash_time / self.flash_duration).floor() as u64 % 2 == 1
    }

    /// Red emission of the corner lights (0–1), 0 while idle.
    pub fn light_intensity(&self) -> f32 {
        if !self.is_active() {
            return 0.0;
        }
        0.5 + 0.5 * (self.pulse_time * self.pulse_frequency * std::f32::consts::TAU).sin()
    }
}
