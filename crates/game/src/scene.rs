//! Scene coordinator: owns the helicopter, lake, fires and audio, and drives
//! them once per tick.

use crate::camera::{CameraRig, CameraUniform};
use crate::config::GameConfig;
use crate::helicopter::{DropVisual, FlightContext, FlightState, HeliPart, Helicopter, LandingPhase};
use crate::helipad::{HelipadMode, HelipadSignal};
use audio::SoundCues;
use engine_core::{TransformRaw, Vec3};
use glam::Mat4;
use input::{Command, CommandSet};
use rand::{rngs::StdRng, SeedableRng};
use serde::{Deserialize, Serialize};
use world::{BatchKey, FirePatch, LakeSurface, LakeTile};

/// What gets drawn. Toggled from the keyboard at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayToggles {
    pub helicopter: bool,
    pub lake: bool,
    pub fire: bool,
    pub building: bool,
}

impl Default for DisplayToggles {
    fn default() -> Self {
        Self {
            helicopter: true,
            lake: true,
            fire: true,
            building: true,
        }
    }
}

/// Per-frame flags passed into the scene instead of living on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneContext {
    pub display: DisplayToggles,
    pub sound_enabled: bool,
}

impl Default for SceneContext {
    fn default() -> Self {
        Self {
            display: DisplayToggles::default(),
            sound_enabled: true,
        }
    }
}

/// One-line status for the window title / HUD.
#[derive(Debug, Clone, PartialEq)]
pub struct HudStatus {
    pub state: FlightState,
    pub landing_phase: Option<LandingPhase>,
    pub water_percentage: u32,
    pub fires_burning: usize,
    pub following: bool,
}

impl HudStatus {
    pub fn title(&self) -> String {
        format!(
            "HeliFire | {} | water {}% | fires {} | cam {}",
            self.state,
            self.water_percentage,
            self.fires_burning,
            if self.following { "chase" } else { "free" }
        )
    }
}

/// Everything a renderer needs for one frame.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub camera: CameraUniform,
    pub helicopter: Vec<(HeliPart, TransformRaw)>,
    pub water_drop: Option<DropVisual>,
    /// Bucket water level (0–1), drawn only while the bucket is lowered.
    pub bucket_water: Option<f32>,
    pub flames: Vec<(BatchKey, Vec<TransformRaw>)>,
    /// Seconds driving the flame shader flicker.
    pub flame_time: f32,
    pub lake_tiles: Vec<LakeTile>,
    pub lake_height: f32,
    pub helipad: HelipadMode,
    pub helipad_alternate: bool,
    pub helipad_light: f32,
    pub status: HudStatus,
}

impl FrameSnapshot {
    /// Flame instance data ready for a vertex buffer upload.
    pub fn flame_instance_bytes(&self) -> Vec<u8> {
        self.flames
            .iter()
            .flat_map(|(_, instances)| bytemuck::cast_slice::<TransformRaw, u8>(instances))
            .copied()
            .collect()
    }
}

pub struct Scene {
    helicopter: Helicopter,
    lake: LakeSurface,
    fires: Vec<FirePatch>,
    audio: Box<dyn SoundCues>,
    camera: CameraRig,
    helipad: HelipadSignal,
    time_scale: f32,
    flame_time: f32,
    sound_enabled: bool,
}

impl Scene {
    /// Build the scene from config. Fires are placed now; the lake raster
    /// starts decoding in the background.
    pub fn new(config: &GameConfig, audio: Box<dyn SoundCues>) -> Self {
        let mut scene = Self::with_lake(config, LakeSurface::new(&config.lake), audio);
        scene.lake.load_async(&config.lake.mask_path);
        scene
    }

    /// Build around an already prepared lake (no background load).
    pub fn with_lake(
        config: &GameConfig,
        lake: LakeSurface,
        mut audio: Box<dyn SoundCues>,
    ) -> Self {
        if !config.sound.enabled {
            audio.set_muted(true);
        }
        let fires: Vec<FirePatch> = match config.fire_seed {
            Some(seed) => {
                let mut rng = StdRng::seed_from_u64(seed);
                config.fires.iter().map(|f| FirePatch::generate(f, &mut rng)).collect()
            }
            None => config.fires.iter().map(FirePatch::new).collect(),
        };
        let flames: usize = fires.iter().map(FirePatch::active_flame_count).sum();
        log::info!("Lit {} fire patches ({} flames)", fires.len(), flames);

        let home = Vec3::new(0.0, config.building.helipad_altitude(), 0.0);
        Self {
            helicopter: Helicopter::new(home, config.helicopter.clone()),
            lake,
            fires,
            audio,
            camera: CameraRig::new(config.camera.clone()),
            helipad: HelipadSignal::default(),
            time_scale: config.time_scale,
            flame_time: 0.0,
            sound_enabled: config.sound.enabled,
        }
    }

    /// Advance the scene by `dt` seconds of wall time.
    pub fn tick(&mut self, dt: f32, commands: &CommandSet, ctx: &SceneContext) {
        self.lake.poll();

        if ctx.sound_enabled != self.sound_enabled {
            self.sound_enabled = ctx.sound_enabled;
            self.audio.set_muted(!ctx.sound_enabled);
            log::info!("Sound {}", if ctx.sound_enabled { "on" } else { "off" });
        }

        let mut flight = FlightContext {
            lake: &self.lake,
            fires: &mut self.fires,
            audio: self.audio.as_mut(),
        };
        self.helicopter.update(dt * self.time_scale, commands, &mut flight);

        self.flame_time += dt;
        self.helipad.update(dt, self.helicopter.state());

        if commands.just_pressed(Command::ToggleFollowCamera) {
            self.camera.toggle_follow();
        }
        self.camera
            .update(self.helicopter.position(), self.helicopter.orientation());
    }

    pub fn helicopter(&self) -> &Helicopter {
        &self.helicopter
    }

    pub fn helicopter_mut(&mut self) -> &mut Helicopter {
        &mut self.helicopter
    }

    pub fn lake(&self) -> &LakeSurface {
        &self.lake
    }

    pub fn fires(&self) -> &[FirePatch] {
        &self.fires
    }

    pub fn camera(&self) -> &CameraRig {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut CameraRig {
        &mut self.camera
    }

    pub fn helipad(&self) -> &HelipadSignal {
        &self.helipad
    }

    pub fn fires_burning(&self) -> usize {
        self.fires.iter().filter(|f| f.is_active()).count()
    }

    pub fn status(&self) -> HudStatus {
        HudStatus {
            state: self.helicopter.state(),
            landing_phase: self.helicopter.landing_phase(),
            water_percentage: self.helicopter.water_percentage(),
            fires_burning: self.fires_burning(),
            following: self.camera.is_following(),
        }
    }

    /// Move the helipad with the centre tower.
    pub fn set_center_floors(&mut self, floors: u32) {
        let building = crate::config::BuildingConfig {
            center_floors: floors,
            ..Default::default()
        }
        .sanitized();
        self.helicopter.set_home_altitude(building.helipad_altitude());
    }

    /// Speed slider: scales throttle and yaw response.
    pub fn set_speed_factor(&mut self, factor: f32) {
        self.helicopter.set_speed_factor(factor);
    }

    /// Climb above the helipad before flight starts.
    pub fn set_takeoff_height(&mut self, height: f32) {
        self.helicopter.set_takeoff_height(height);
    }

    /// Gather draw data, honouring the display toggles.
    pub fn snapshot(&mut self, ctx: &SceneContext) -> FrameSnapshot {
        let camera = self.camera.camera();
        let eye = camera.eye;
        let camera = CameraUniform::from_camera(camera);

        let (helicopter, water_drop, bucket_water) = if ctx.display.helicopter {
            let parts = self
                .helicopter
                .part_transforms()
                .into_iter()
                .map(|(part, m): (HeliPart, Mat4)| (part, TransformRaw::from(m)))
                .collect();
            let water = self.helicopter.water();
            let bucket = self.helicopter.bucket();
            let bucket_water =
                (bucket.is_engaged() && water.amount() > 0.0).then(|| water.fraction());
            (parts, self.helicopter.drop_visual(), bucket_water)
        } else {
            (Vec::new(), None, None)
        };

        let flames = if ctx.display.fire {
            self.fires.iter_mut().flat_map(|f| f.flame_instances(eye)).collect()
        } else {
            Vec::new()
        };

        let lake_tiles = if ctx.display.lake { self.lake.lake_tiles() } else { Vec::new() };

        FrameSnapshot {
            camera,
            helicopter,
            water_drop,
            bucket_water,
            flames,
            flame_time: self.flame_time,
            lake_tiles,
            lake_height: self.lake.height(),
            helipad: if ctx.display.building { self.helipad.mode() } else { HelipadMode::Idle },
            helipad_alternate: ctx.display.building && self.helipad.show_alternate(),
            helipad_light: if ctx.display.building { self.helipad.light_intensity() } else { 0.0 },
            status: self.status(),
        }
    }
}
