//! Helicopter tunables. All rates are per time unit (100 ms).

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HeliParams {
    pub max_velocity: f32,
    pub acceleration: f32,
    pub backward_acceleration: f32,
    pub turn_acceleration: f32,
    pub friction: f32,

    pub max_pitch: f32,
    /// Pitch rate while leaning into a throttle input.
    pub pitch_speed: f32,
    /// Pitch rate while levelling out.
    pub pitch_recovery_speed: f32,

    pub climb_rate: f32,
    pub descent_rate: f32,
    /// Cruise altitude above the helipad.
    pub takeoff_height: f32,
    /// Multiplier on horizontal displacement.
    pub speed_factor: f32,

    pub bucket_rate: f32,
    pub bucket_door_rate: f32,
    pub main_rotor_speed: f32,
    pub tail_rotor_speed: f32,

    pub water_capacity: f32,
    pub fill_rate: f32,
    pub base_extinguish_radius: f32,
    pub radius_per_water_unit: f32,
    pub drop_duration: f32,
    pub drop_speed: f32,

    /// Per-axis distance counted as "on the helipad".
    pub home_tolerance: f32,
    pub heading_tolerance: f32,
    /// Yaw per tick while lining up for landing.
    pub landing_turn_step: f32,
    /// Fraction of the remaining distance closed per tick on approach.
    pub approach_factor: f32,
    pub approach_tolerance: f32,
}

impl Default for HeliParams {
    fn default() -> Self {
        Self {
            max_velocity: 5.0,
            acceleration: 0.05,
            backward_acceleration: 0.03,
            turn_acceleration: 1.0,
            friction: 0.02,
            max_pitch: 0.25,
            pitch_speed: 0.2,
            pitch_recovery_speed: 0.1,
            climb_rate: 1.0,
            descent_rate: 1.0,
            takeoff_height: 8.0,
            speed_factor: 1.0,
            bucket_rate: 0.4,
            bucket_door_rate: 1.0,
            main_rotor_speed: 100.0,
            tail_rotor_speed: 150.0,
            water_capacity: 50.0,
            fill_rate: 1.0,
            base_extinguish_radius: 5.0,
            radius_per_water_unit: 0.8,
            drop_duration: 4.0,
            drop_speed: 0.6,
            home_tolerance: 0.1,
            heading_tolerance: 0.03,
            landing_turn_step: 0.05,
            approach_factor: 0.02,
            approach_tolerance: 0.8,
        }
    }
}

impl HeliParams {
    /// Apply the speed slider: scales forward, backward and turn response.
    pub fn set_speed_factor(&mut self, factor: f32) {
        let factor = factor.max(0.0);
        self.acceleration = 0.03 * factor;
        self.backward_acceleration = 0.02 * factor;
        self.turn_acceleration = factor;
    }

    /// Splash radius of a drop that started with `water` units.
    pub fn extinguish_radius(&self, water: f32) -> f32 {
        self.base_extinguish_radius + water * self.radius_per_water_unit
    }

    /// Clamp values that would otherwise stall or explode the simulation.
    pub fn sanitized(mut self) -> Self {
        let fallback = Self::default();
        if self.max_velocity <= 0.0 {
            log::warn!("max_velocity must be positive, using {}", fallback.max_velocity);
            self.max_velocity = fallback.max_velocity;
        }
        if self.water_capacity <= 0.0 {
            log::warn!("water_capacity must be positive, using {}", fallback.water_capacity);
            self.water_capacity = fallback.water_capacity;
        }
        if self.drop_duration <= 0.0 {
            self.drop_duration = fallback.drop_duration;
        }
        self.takeoff_height = self.takeoff_height.max(0.0);
        self.friction = self.friction.max(0.0);
        self.approach_factor = self.approach_factor.clamp(0.001, 1.0);
        self
    }
}
