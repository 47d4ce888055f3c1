//! Helicopter flight controller.
//!
//! One `update` per tick: animations advance, the water drop progresses,
//! edge commands fire transitions, then the current [`FlightState`] runs its
//! per-tick behaviour. Time is in controller units (100 ms).

mod actuator;
mod params;
mod payload;
mod rig;
mod state;

pub use actuator::Actuator;
pub use params::HeliParams;
pub use payload::{DropEvents, DropVisual, FillCue, Payload, WaterDrop};
pub use rig::{body_transform, HeliPart, RigLayout, RigPose, BUCKET_DROP_TRAVEL};
pub use state::{FlightState, LandingPhase};

use audio::{SoundCue, SoundCues};
use engine_core::Transform;
use glam::{Mat4, Vec3};
use input::{Command, CommandSet};
use std::f32::consts::{PI, TAU};
use world::{FirePatch, LakeSurface};

const BLADE_IDLE_VOLUME: f32 = 0.05;
const BLADE_SPEED_VOLUME: f32 = 0.02;
const BLADE_VOLUME_RATE: f32 = 0.1;
const BLADE_FADE_RATE: f32 = 0.01;
const BLADE_VOLUME_DEADBAND: f32 = 0.01;

/// Pitch differences below this snap to the target.
const PITCH_SNAP: f32 = 0.01;
/// Velocity components below this are zeroed by friction.
const VELOCITY_EPSILON: f32 = 0.001;
const THROTTLE_INPUT_SCALE: f32 = 20.0;
const YAW_INPUT_SCALE: f32 = 0.2;

/// Cues silenced by a reset.
const RESET_STOPS: [SoundCue; 7] = [
    SoundCue::RotorBlades,
    SoundCue::EngineStart,
    SoundCue::ReturningToBase,
    SoundCue::WaterRelease,
    SoundCue::WaterFilling,
    SoundCue::WaterFull,
    SoundCue::WaterImpact,
];

/// What the controller may look at and touch during a tick.
pub struct FlightContext<'a> {
    pub lake: &'a LakeSurface,
    pub fires: &'a mut [FirePatch],
    pub audio: &'a mut dyn SoundCues,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct BladeSound {
    volume: f32,
    fading_out: bool,
}

impl Default for BladeSound {
    fn default() -> Self {
        Self {
            volume: BLADE_IDLE_VOLUME,
            fading_out: false,
        }
    }
}

/// Wrap into [-π, π].
fn normalize_angle(angle: f32) -> f32 {
    (angle + PI).rem_euclid(TAU) - PI
}

#[derive(Debug, Clone)]
pub struct Helicopter {
    params: HeliParams,
    rig: RigLayout,
    home: Vec3,

    position: Vec3,
    /// Yaw in radians; 0 faces +Z.
    orientation: f32,
    /// Horizontal only; `y` stays 0.
    velocity: Vec3,
    pitch: f32,
    state: FlightState,

    motor_on: bool,
    main_rotor_angle: f32,
    tail_rotor_angle: f32,

    bucket: Actuator,
    door: Actuator,
    water: Payload,
    drop: Option<WaterDrop>,

    fill_cue: FillCue,
    blade: BladeSound,
}

impl Helicopter {
    /// Park a helicopter on the helipad at `home`.
    pub fn new(home: Vec3, params: HeliParams) -> Self {
        let params = params.sanitized();
        Self {
            rig: RigLayout::default(),
            home,
            position: home,
            orientation: 0.0,
            velocity: Vec3::ZERO,
            pitch: 0.0,
            state: FlightState::Stationary,
            motor_on: false,
            main_rotor_angle: 0.0,
            tail_rotor_angle: 0.0,
            bucket: Actuator::new(params.bucket_rate),
            door: Actuator::new(params.bucket_door_rate),
            water: Payload::new(params.water_capacity),
            drop: None,
            fill_cue: FillCue::default(),
            blade: BladeSound::default(),
            params,
        }
    }

    // ── Tick ────────────────────────────────────────────────────────────

    /// Advance one tick of `dt` time units.
    pub fn update(&mut self, dt: f32, commands: &CommandSet, ctx: &mut FlightContext<'_>) {
        if commands.just_pressed(Command::Reset) {
            self.reset(ctx.audio);
            return;
        }
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };

        self.step_actuators(dt);
        self.step_rotors(dt);
        self.update_blade_sound(dt, ctx.audio);
        self.update_water_drop(dt, ctx);

        if commands.just_pressed(Command::TakeOff) {
            self.take_off(ctx.audio);
        }
        if commands.just_pressed(Command::Land) {
            self.land(ctx.lake, ctx.audio);
        }
        if commands.just_pressed(Command::DropWater) {
            self.drop_water(ctx.fires, ctx.audio);
        }
        if commands.just_pressed(Command::ToggleBucket) {
            self.toggle_bucket();
        }

        match self.state {
            FlightState::Stationary => {}
            FlightState::TakingOff { .. } => self.update_taking_off(dt),
            FlightState::Flying => self.update_flying(dt, commands),
            FlightState::LandingBase(phase) => self.update_landing_base(phase, dt),
            FlightState::LandingWater => self.update_landing_water(dt, ctx.lake),
            FlightState::WaterLanded => self.update_water_landed(dt, ctx.audio),
        }
    }

    fn set_state(&mut self, state: FlightState) {
        if self.state == state {
            return;
        }
        match (self.state, state) {
            (FlightState::LandingBase(from), FlightState::LandingBase(to)) => {
                log::debug!("Landing phase {} -> {}", from, to);
            }
            _ => log::info!("Helicopter {} -> {}", self.state.name(), state.name()),
        }
        self.state = state;
    }

    fn step_actuators(&mut self, dt: f32) {
        if let Some(extended) = self.bucket.step(dt) {
            log::debug!("Bucket {}", if extended { "extended" } else { "retracted" });
        }
        if let Some(open) = self.door.step(dt) {
            log::debug!("Bucket door {}", if open { "open" } else { "closed" });
        }
    }

    fn step_rotors(&mut self, dt: f32) {
        if self.motor_on {
            let main = self.main_rotor_angle + self.params.main_rotor_speed * dt;
            let tail = self.tail_rotor_angle + self.params.tail_rotor_speed * dt;
            self.main_rotor_angle = main % TAU;
            self.tail_rotor_angle = tail % TAU;
        }
    }

    fn update_blade_sound(&mut self, dt: f32, audio: &mut dyn SoundCues) {
        if self.motor_on && !self.blade.fading_out {
            audio.play(SoundCue::RotorBlades);
            let speed_ratio = (self.speed() / self.params.max_velocity).min(1.0);
            let target = BLADE_IDLE_VOLUME + speed_ratio * BLADE_SPEED_VOLUME;
            let diff = target - self.blade.volume;
            if diff.abs() > BLADE_VOLUME_DEADBAND {
                self.blade.volume += diff.signum() * (BLADE_VOLUME_RATE * dt).min(diff.abs());
                audio.set_volume(SoundCue::RotorBlades, self.blade.volume as f64);
            }
        }

        // Stays latched at zero until the next take-off or reset.
        if self.blade.fading_out && self.blade.volume > 0.0 {
            self.blade.volume = (self.blade.volume - BLADE_FADE_RATE * dt).max(0.0);
            audio.set_volume(SoundCue::RotorBlades, self.blade.volume as f64);
            if self.blade.volume <= 0.0 {
                audio.stop(SoundCue::RotorBlades);
            }
        }
    }

    fn update_water_drop(&mut self, dt: f32, ctx: &mut FlightContext<'_>) {
        let Some(drop) = self.drop.as_mut() else {
            return;
        };
        let events = drop.advance(dt);
        self.water.drain_to(drop.remaining());

        if events.impact && !drop.targets().is_empty() {
            let radius = self.params.extinguish_radius(drop.initial_amount());
            let at = drop.target_position();
            for &index in drop.targets() {
                let Some(fire) = ctx.fires.get_mut(index) else {
                    continue;
                };
                let hit = fire.extinguish_with_water(at.x, at.z, radius);
                log::debug!("Water hit fire {}: {} flames out", index, hit.flames);
                if hit.fire_out {
                    ctx.audio.play(SoundCue::FireExtinguished);
                }
            }
            ctx.audio.play(SoundCue::WaterImpact);
        }
        if events.close_door {
            self.door.release();
        }
        if events.finished {
            log::debug!("Water drop finished");
            self.water.drain_to(0.0);
            self.drop = None;
        }
    }

    // ── Commands ────────────────────────────────────────────────────────

    fn take_off(&mut self, audio: &mut dyn SoundCues) -> bool {
        match self.state {
            FlightState::Stationary if self.is_at_home() => {
                self.set_state(FlightState::TakingOff { from_pad: true });
                self.motor_on = true;
                self.blade.fading_out = false;
                audio.play(SoundCue::EngineStart);
                true
            }
            FlightState::WaterLanded => {
                self.pause_fill_cue(audio);
                self.set_state(FlightState::TakingOff { from_pad: false });
                self.motor_on = true;
                true
            }
            _ => false,
        }
    }

    fn land(&mut self, lake: &LakeSurface, audio: &mut dyn SoundCues) -> bool {
        if self.state != FlightState::Flying {
            return false;
        }
        self.velocity = Vec3::ZERO;
        self.pitch = 0.0;
        if lake.is_in_lake(self.position.x, self.position.z) {
            self.set_state(FlightState::LandingWater);
        } else {
            self.set_state(FlightState::LandingBase(LandingPhase::Rotating));
            audio.play(SoundCue::ReturningToBase);
        }
        true
    }

    /// Indices of burning patches whose bounds contain the bucket footprint.
    fn fires_below(&self, fires: &[FirePatch]) -> Vec<usize> {
        let bucket = self.bucket_world_position();
        fires
            .iter()
            .enumerate()
            .filter(|(_, fire)| fire.is_active())
            .filter(|(_, fire)| fire.bounds().is_some_and(|b| b.contains_xz(bucket)))
            .map(|(i, _)| i)
            .collect()
    }

    fn drop_water(&mut self, fires: &[FirePatch], audio: &mut dyn SoundCues) -> bool {
        let ready = self.state == FlightState::Flying
            && self.bucket.is_engaged()
            && self.water.amount() > 0.0
            && self.drop.is_none()
            && !self.door.in_motion();
        if !ready {
            return false;
        }
        let targets = self.fires_below(fires);
        if targets.is_empty() {
            return false;
        }

        log::debug!("Dropping {:.1} water on {} fire(s)", self.water.amount(), targets.len());
        self.door.engage();
        self.drop = Some(WaterDrop::new(
            self.water.amount(),
            targets,
            self.bucket_world_position(),
            self.params.drop_duration,
            self.params.drop_speed,
        ));
        self.water.clear_filled();
        audio.play(SoundCue::WaterRelease);
        true
    }

    fn toggle_bucket(&mut self) -> bool {
        let allowed = match self.state {
            FlightState::Flying => self.drop.is_none() && !self.door.in_motion(),
            FlightState::WaterLanded => true,
            _ => false,
        };
        if allowed {
            self.bucket.toggle();
        }
        allowed
    }

    /// Return to the parked configuration from any state and silence every cue.
    pub fn reset(&mut self, audio: &mut dyn SoundCues) {
        self.position = self.home;
        self.orientation = 0.0;
        self.velocity = Vec3::ZERO;
        self.pitch = 0.0;
        self.motor_on = false;
        self.main_rotor_angle = 0.0;
        self.tail_rotor_angle = 0.0;
        self.bucket.reset();
        self.door.reset();
        self.water.empty();
        self.drop = None;
        self.fill_cue = FillCue::default();
        self.blade = BladeSound::default();
        self.set_state(FlightState::Stationary);

        for cue in RESET_STOPS {
            audio.stop(cue);
        }
    }

    // ── States ──────────────────────────────────────────────────────────

    fn update_taking_off(&mut self, dt: f32) {
        let cruise = self.home.y + self.params.takeoff_height;
        self.position.y += self.params.climb_rate * dt;
        if self.position.y < cruise {
            return;
        }
        self.position.y = cruise;
        if self.bucket.is_engaged() && !self.bucket.in_motion() {
            self.set_state(FlightState::Flying);
        } else if !self.bucket.in_motion() {
            self.bucket.engage();
        }
    }

    fn update_flying(&mut self, dt: f32, commands: &CommandSet) {
        let forward = commands.held(Command::ThrottleForward);
        let back = commands.held(Command::ThrottleBack);

        self.update_pitch(dt, forward, back);

        if forward {
            self.accelerate(self.params.acceleration * dt * THROTTLE_INPUT_SCALE);
        }
        if back {
            self.accelerate(-self.params.backward_acceleration * dt * THROTTLE_INPUT_SCALE);
        }
        if commands.held(Command::YawLeft) {
            self.turn(self.params.turn_acceleration * dt * YAW_INPUT_SCALE);
        }
        if commands.held(Command::YawRight) {
            self.turn(-self.params.turn_acceleration * dt * YAW_INPUT_SCALE);
        }

        if !forward && !back {
            self.apply_friction(dt);
        }
        self.limit_velocity();

        self.position += self.velocity * dt * self.params.speed_factor;
    }

    fn update_pitch(&mut self, dt: f32, forward: bool, back: bool) {
        let target = if forward {
            self.params.max_pitch
        } else if back {
            -self.params.max_pitch
        } else {
            0.0
        };

        if (self.pitch - target).abs() > PITCH_SNAP {
            let rate = if target == 0.0 {
                self.params.pitch_recovery_speed
            } else {
                self.params.pitch_speed
            };
            let change = rate * dt;
            self.pitch = if self.pitch < target {
                (self.pitch + change).min(target)
            } else {
                (self.pitch - change).max(target)
            };
        } else {
            self.pitch = target;
        }
    }

    fn update_landing_base(&mut self, phase: LandingPhase, dt: f32) {
        match phase {
            LandingPhase::Rotating => {
                let bearing = (self.home.x - self.position.x).atan2(self.home.z - self.position.z);
                if self.turn_toward(bearing) {
                    self.set_state(FlightState::LandingBase(LandingPhase::Positioning));
                }
            }
            LandingPhase::Positioning => {
                let dx = self.home.x - self.position.x;
                let dz = self.home.z - self.position.z;
                let tolerance = self.params.approach_tolerance;
                if dx.abs() > tolerance || dz.abs() > tolerance {
                    self.position.x += dx * self.params.approach_factor;
                    self.position.z += dz * self.params.approach_factor;
                    self.pitch = self.params.max_pitch;
                } else {
                    self.pitch = 0.0;
                    self.position.x = self.home.x;
                    self.position.z = self.home.z;
                    if self.turn_toward(0.0) {
                        self.set_state(FlightState::LandingBase(LandingPhase::Retracting));
                    }
                }
            }
            LandingPhase::Retracting => {
                if self.bucket.in_motion() {
                    return;
                }
                if self.bucket.is_engaged() {
                    self.bucket.release();
                } else {
                    self.set_state(FlightState::LandingBase(LandingPhase::Descending));
                }
            }
            LandingPhase::Descending => {
                self.blade.fading_out = true;
                self.position.y -= self.params.descent_rate * dt;
                if self.position.y <= self.home.y {
                    self.position.y = self.home.y;
                    self.velocity = Vec3::ZERO;
                    self.motor_on = false;
                    self.water.empty();
                    self.set_state(FlightState::Stationary);
                }
            }
        }
    }

    /// Yaw one landing step toward `heading`. Returns true once aligned (and snapped).
    fn turn_toward(&mut self, heading: f32) -> bool {
        let diff = normalize_angle(heading - self.orientation);
        if diff.abs() > self.params.heading_tolerance {
            self.turn(diff.signum() * self.params.landing_turn_step);
            false
        } else {
            self.orientation = heading;
            true
        }
    }

    fn update_landing_water(&mut self, dt: f32, lake: &LakeSurface) {
        if self.bucket_world_position().y > lake.height() {
            self.position.y -= self.params.descent_rate * dt;
        } else {
            self.velocity = Vec3::ZERO;
            self.set_state(FlightState::WaterLanded);
        }
    }

    fn update_water_landed(&mut self, dt: f32, audio: &mut dyn SoundCues) {
        if !self.bucket.is_engaged() {
            self.pause_fill_cue(audio);
            return;
        }

        if !self.water.is_full() && !self.fill_cue.playing {
            audio.play(SoundCue::WaterFilling);
            if self.water.amount() > 0.0 && self.fill_cue.paused_at > 0.0 {
                audio.seek(SoundCue::WaterFilling, self.fill_cue.paused_at);
            }
            self.fill_cue.playing = true;
        }

        if self.water.fill(self.params.fill_rate, dt) {
            log::info!("Bucket full ({:.0} units)", self.water.amount());
            self.fill_cue = FillCue::default();
            audio.stop(SoundCue::WaterFilling);
            audio.play(SoundCue::WaterFull);
        }
    }

    fn pause_fill_cue(&mut self, audio: &mut dyn SoundCues) {
        if self.fill_cue.playing {
            self.fill_cue.paused_at = audio.current_time(SoundCue::WaterFilling);
            self.fill_cue.playing = false;
            audio.pause(SoundCue::WaterFilling);
        }
    }

    // ── Motion helpers ──────────────────────────────────────────────────

    /// Yaw by `angle`, carrying the velocity vector with the heading.
    fn turn(&mut self, angle: f32) {
        self.orientation = (self.orientation + angle) % TAU;
        let (sin, cos) = angle.sin_cos();
        let (vx, vz) = (self.velocity.x, self.velocity.z);
        self.velocity.x = vx * cos + vz * sin;
        self.velocity.z = -vx * sin + vz * cos;
    }

    /// Push along the heading.
    fn accelerate(&mut self, amount: f32) {
        self.velocity += self.forward() * amount;
        self.limit_velocity();
    }

    fn apply_friction(&mut self, dt: f32) {
        if self.speed() <= VELOCITY_EPSILON {
            return;
        }
        let factor = (1.0 - self.params.friction * dt).max(0.0);
        self.velocity.x *= factor;
        self.velocity.z *= factor;
        if self.velocity.x.abs() < VELOCITY_EPSILON {
            self.velocity.x = 0.0;
        }
        if self.velocity.z.abs() < VELOCITY_EPSILON {
            self.velocity.z = 0.0;
        }
    }

    fn limit_velocity(&mut self) {
        let speed = self.speed();
        if speed > self.params.max_velocity {
            let scale = self.params.max_velocity / speed;
            self.velocity.x *= scale;
            self.velocity.z *= scale;
        }
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn state(&self) -> FlightState {
        self.state
    }

    pub fn landing_phase(&self) -> Option<LandingPhase> {
        self.state.landing_phase()
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn home(&self) -> Vec3 {
        self.home
    }

    pub fn orientation(&self) -> f32 {
        self.orientation
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Horizontal speed.
    pub fn speed(&self) -> f32 {
        (self.velocity.x * self.velocity.x + self.velocity.z * self.velocity.z).sqrt()
    }

    pub fn forward(&self) -> Vec3 {
        let (sin, cos) = self.orientation.sin_cos();
        Vec3::new(sin, 0.0, cos)
    }

    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    pub fn motor_on(&self) -> bool {
        self.motor_on
    }

    pub fn params(&self) -> &HeliParams {
        &self.params
    }

    /// Within the per-axis tolerance of the helipad.
    pub fn is_at_home(&self) -> bool {
        let d = (self.position - self.home).abs();
        let tol = self.params.home_tolerance;
        d.x < tol && d.y < tol && d.z < tol
    }

    pub fn bucket(&self) -> &Actuator {
        &self.bucket
    }

    pub fn bucket_door(&self) -> &Actuator {
        &self.door
    }

    pub fn water(&self) -> &Payload {
        &self.water
    }

    pub fn water_percentage(&self) -> u32 {
        self.water.percentage()
    }

    pub fn water_drop(&self) -> Option<&WaterDrop> {
        self.drop.as_ref()
    }

    pub fn is_dropping(&self) -> bool {
        self.drop.is_some()
    }

    pub fn fill_cue(&self) -> FillCue {
        self.fill_cue
    }

    pub fn blade_volume(&self) -> f32 {
        self.blade.volume
    }

    /// Bottom of the bucket in world space.
    pub fn bucket_world_position(&self) -> Vec3 {
        self.rig
            .bucket_bottom_world(self.position, self.orientation, self.bucket.progress())
    }

    // ── Presentation ────────────────────────────────────────────────────

    pub fn rig_pose(&self) -> RigPose {
        RigPose {
            main_rotor_angle: self.main_rotor_angle,
            tail_rotor_angle: self.tail_rotor_angle,
            bucket_progress: self.bucket.progress(),
            door_progress: self.door.progress(),
        }
    }

    pub fn body_transform(&self) -> Transform {
        body_transform(self.position, self.orientation, self.pitch)
    }

    /// World transforms of every visible part.
    pub fn part_transforms(&self) -> Vec<(HeliPart, Mat4)> {
        let body = self.body_transform().to_matrix();
        let pose = self.rig_pose();
        HeliPart::ALL
            .iter()
            .filter_map(|&part| self.rig.part_transform(part, &pose).map(|m| (part, body * m)))
            .collect()
    }

    pub fn drop_visual(&self) -> Option<DropVisual> {
        let drop = self.drop.as_ref()?;
        let radius = self.params.extinguish_radius(drop.initial_amount());
        Some(drop.visual(self.bucket_world_position(), radius, self.water.capacity()))
    }

    // ── Settings ────────────────────────────────────────────────────────

    pub fn set_speed_factor(&mut self, factor: f32) {
        self.params.set_speed_factor(factor);
    }

    pub fn set_takeoff_height(&mut self, height: f32) {
        self.params.takeoff_height = height.max(0.0);
    }

    #[cfg(test)]
    pub(crate) fn teleport_for_test(&mut self, position: Vec3) {
        self.position = position;
    }

    /// Move the helipad vertically (the building changed height). A parked
    /// helicopter moves with it.
    pub fn set_home_altitude(&mut self, y: f32) {
        self.home.y = y;
        if self.state == FlightState::Stationary {
            self.position.y = y;
        }
    }
}
