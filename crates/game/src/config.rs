//! Game configuration (window, timing, helicopter, scene layout, sound).
//! Loaded from config.ron at startup.

use crate::camera::FollowCameraConfig;
use crate::helicopter::HeliParams;
use crate::scene::DisplayToggles;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use world::{FirePatchConfig, LakeConfig};

/// Rooftop clearance between the top floor and the helipad.
const HELIPAD_CLEARANCE: f32 = 3.6;

/// Persistent settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Simulation ticks per second.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: f32,
    /// Controller time units per second of wall time.
    #[serde(default = "default_time_scale")]
    pub time_scale: f32,
    #[serde(default)]
    pub helicopter: HeliParams,
    #[serde(default)]
    pub building: BuildingConfig,
    #[serde(default = "FirePatchConfig::defaults")]
    pub fires: Vec<FirePatchConfig>,
    /// Fixed seed for fire placement; random when absent.
    #[serde(default)]
    pub fire_seed: Option<u64>,
    #[serde(default)]
    pub lake: LakeConfig,
    #[serde(default)]
    pub sound: SoundConfig,
    #[serde(default)]
    pub camera: FollowCameraConfig,
    #[serde(default)]
    pub display: DisplayToggles,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_tick_hz() -> f32 {
    20.0
}
fn default_time_scale() -> f32 {
    10.0
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            tick_hz: default_tick_hz(),
            time_scale: default_time_scale(),
            helicopter: HeliParams::default(),
            building: BuildingConfig::default(),
            fires: FirePatchConfig::defaults(),
            fire_seed: None,
            lake: LakeConfig::default(),
            sound: SoundConfig::default(),
            camera: FollowCameraConfig::default(),
            display: DisplayToggles::default(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        let path = config_path();
        if let Ok(data) = std::fs::read_to_string(&path) {
            match Self::parse(&data) {
                Ok(c) => {
                    log::info!("Loaded config from {:?}", path);
                    return c;
                }
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Parse RON text and clamp out-of-range values.
    pub fn parse(data: &str) -> Result<Self, ron::error::SpannedError> {
        let config: Self = ron::from_str(data)?;
        Ok(config.sanitized())
    }

    fn sanitized(mut self) -> Self {
        if !(self.tick_hz > 0.0) {
            log::warn!("tick_hz must be positive, using {}", default_tick_hz());
            self.tick_hz = default_tick_hz();
        }
        if !(self.time_scale > 0.0) {
            log::warn!("time_scale must be positive, using {}", default_time_scale());
            self.time_scale = default_time_scale();
        }
        self.helicopter = self.helicopter.sanitized();
        self.building = self.building.sanitized();
        self
    }
}

fn config_path() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
}

/// The building complex. Only the centre tower height matters to the
/// simulation (it carries the helipad); the rest feeds the mesh generator.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildingConfig {
    pub center_floors: u32,
    pub side_floors: u32,
    pub windows_per_floor: u32,
    /// Total width of the complex.
    pub width: f32,
}

impl Default for BuildingConfig {
    fn default() -> Self {
        Self {
            center_floors: 20,
            side_floors: 15,
            windows_per_floor: 3,
            width: 30.0,
        }
    }
}

impl BuildingConfig {
    /// Zero floors or windows and non-positive widths become the smallest usable building.
    pub fn sanitized(mut self) -> Self {
        if self.center_floors == 0 || self.side_floors == 0 || self.windows_per_floor == 0 {
            log::warn!("Building needs at least one floor and one window per floor, clamping");
        }
        self.center_floors = self.center_floors.max(1);
        self.side_floors = self.side_floors.max(1);
        self.windows_per_floor = self.windows_per_floor.max(1);
        if !(self.width > 0.0) {
            log::warn!("Building width must be positive, using {}", Self::default().width);
            self.width = Self::default().width;
        }
        self
    }

    /// World Y of the helipad on the centre tower.
    pub fn helipad_altitude(&self) -> f32 {
        self.center_floors as f32 + HELIPAD_CLEARANCE
    }

    /// Horizontal spacing between window centres on one floor.
    pub fn window_spacing(&self) -> f32 {
        self.width / 3.0 / self.windows_per_floor.max(1) as f32
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    /// Directory holding the cue files.
    pub dir: PathBuf,
    pub enabled: bool,
    /// Main track volume (0.0 to 1.0).
    pub master_volume: f64,
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("sounds"),
            enabled: true,
            master_volume: 1.0,
        }
    }
}
