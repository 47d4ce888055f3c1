//! HeliFire - rooftop helicopter firefighting simulation

mod camera;
mod config;
mod events;
mod helicopter;
mod helipad;
mod scene;
#[cfg(test)]
mod test_support;

use anyhow::Result;
use audio::{AudioSystem, Silent, SoundCues};
use config::GameConfig;
use engine_core::Time;
use input::{InputState, KeyBindings};
use scene::{Scene, SceneContext};
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowId},
};

/// Main game state: window, timing, input and the simulated scene.
pub struct GameState {
    window: Arc<Window>,
    time: Time,
    input: InputState,
    bindings: KeyBindings,
    scene: Scene,
    ctx: SceneContext,
    center_floors: u32,
    /// Last speed slider value; the config's raw accelerations apply until it moves.
    speed_factor: f32,
    takeoff_height: f32,
    title: String,
    running: bool,
}

impl GameState {
    fn new(window: Arc<Window>, config: GameConfig) -> Result<Self> {
        let size = window.inner_size();

        let mut time = Time::new();
        time.set_fixed_rate(config.tick_hz as f64);

        let mut scene = Scene::new(&config, open_audio(&config));
        scene.camera_mut().camera_mut().set_aspect(size.width, size.height);

        Ok(Self {
            window,
            time,
            input: InputState::new(),
            bindings: KeyBindings::default(),
            scene,
            ctx: SceneContext {
                display: config.display,
                sound_enabled: config.sound.enabled,
            },
            center_floors: config.building.center_floors,
            speed_factor: 1.0,
            takeoff_height: config.helicopter.takeoff_height,
            title: String::new(),
            running: true,
        })
    }

    /// Run every fixed tick that is due, then refresh the title.
    pub(crate) fn update(&mut self) {
        self.time.update();
        let dt = self.time.fixed_timestep_seconds();

        while self.time.should_fixed_update() {
            let commands = self.input.commands(&self.bindings);
            self.scene.tick(dt, &commands, &self.ctx);
            self.input.begin_frame();
        }

        let frame = self.scene.snapshot(&self.ctx);
        log::trace!(
            "frame: {} parts, {} flame batches, {} lake tiles",
            frame.helicopter.len(),
            frame.flames.len(),
            frame.lake_tiles.len()
        );

        let title = frame.status.title();
        if title != self.title {
            self.window.set_title(&title);
            self.title = title;
        }
    }
}

/// kira output when a device is available, silence otherwise.
fn open_audio(config: &GameConfig) -> Box<dyn SoundCues> {
    match AudioSystem::new() {
        Ok(mut audio) => {
            let loaded = audio.load_directory(&config.sound.dir);
            audio.set_master_volume(config.sound.master_volume);
            log::info!("Loaded {} sound cues from {}", loaded, config.sound.dir.display());
            Box::new(audio)
        }
        Err(e) => {
            log::warn!("Audio unavailable, running silent: {}", e);
            Box::new(Silent)
        }
    }
}

struct App {
    state: Option<GameState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = GameConfig::load();
            let window_attrs = Window::default_attributes()
                .with_title("HeliFire")
                .with_inner_size(winit::dpi::LogicalSize::new(
                    config.window_width,
                    config.window_height,
                ));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            match GameState::new(window.clone(), config) {
                Ok(s) => {
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize game: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔══════════════════════════════════════════════════════════════════╗");
    println!("║                            HeliFire                              ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║  FLIGHT:                                                         ║");
    println!("║    P - Take off              │  L - Land on the helipad / lake   ║");
    println!("║    W/S - Throttle fwd/back   │  A/D - Yaw left/right             ║");
    println!("║    G - Raise/lower bucket    │  O - Drop water                   ║");
    println!("║    R - Reset to helipad      │  C - Chase/free camera            ║");
    println!("╠══════════════════════════════════════════════════════════════════╣");
    println!("║  DISPLAY:                                                        ║");
    println!("║    1 - Helicopter │ 2 - Lake │ 3 - Fire │ 4 - Building            ║");
    println!("║    M - Sound on/off │ PgUp/PgDn - Tower floors │ Esc - Quit       ║");
    println!("║    [ / ] - Speed factor │ - / = - Take-off height                 ║");
    println!("╚══════════════════════════════════════════════════════════════════╝");

    log::info!("Starting HeliFire");

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
