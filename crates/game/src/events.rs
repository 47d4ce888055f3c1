//! Window event handling for GameState.

use winit::event::WindowEvent;
use winit::keyboard::{KeyCode, PhysicalKey};

const SPEED_STEP: f32 = 0.25;
const MAX_SPEED_FACTOR: f32 = 4.0;

impl crate::GameState {
    /// Handle a window event. Returns true if the app should exit.
    pub(crate) fn handle_window_event(&mut self, event: WindowEvent) -> bool {
        match event {
            WindowEvent::CloseRequested => {
                self.running = false;
                true
            }
            WindowEvent::Resized(size) => {
                self.scene.camera_mut().camera_mut().set_aspect(size.width, size.height);
                false
            }
            WindowEvent::Focused(false) => {
                self.input.release_all();
                false
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    let fresh = event.state.is_pressed() && !self.input.is_key_held(key);
                    self.input.process_keyboard(key, event.state);
                    if fresh {
                        self.handle_display_key(key);
                    }
                }
                !self.running
            }
            WindowEvent::RedrawRequested => {
                self.update();
                self.window.request_redraw();
                false
            }
            _ => false,
        }
    }

    /// Keys that act on the app rather than the helicopter.
    fn handle_display_key(&mut self, key: KeyCode) {
        match key {
            KeyCode::Escape => self.running = false,
            KeyCode::KeyM => self.ctx.sound_enabled ^= true,
            KeyCode::Digit1 => self.ctx.display.helicopter ^= true,
            KeyCode::Digit2 => self.ctx.display.lake ^= true,
            KeyCode::Digit3 => self.ctx.display.fire ^= true,
            KeyCode::Digit4 => self.ctx.display.building ^= true,
            KeyCode::PageUp => self.set_center_floors(self.center_floors + 1),
            KeyCode::PageDown => self.set_center_floors(self.center_floors.saturating_sub(1)),
            KeyCode::BracketRight => self.set_speed_factor(self.speed_factor + SPEED_STEP),
            KeyCode::BracketLeft => self.set_speed_factor(self.speed_factor - SPEED_STEP),
            KeyCode::Equal => self.set_takeoff_height(self.takeoff_height + 1.0),
            KeyCode::Minus => self.set_takeoff_height(self.takeoff_height - 1.0),
            _ => {}
        }
    }

    fn set_center_floors(&mut self, floors: u32) {
        self.center_floors = floors.max(1);
        self.scene.set_center_floors(self.center_floors);
        log::info!("Centre tower: {} floors", self.center_floors);
    }

    fn set_speed_factor(&mut self, factor: f32) {
        self.speed_factor = factor.clamp(SPEED_STEP, MAX_SPEED_FACTOR);
        self.scene.set_speed_factor(self.speed_factor);
        log::info!("Speed factor {:.2}", self.speed_factor);
    }

    fn set_takeoff_height(&mut self, height: f32) {
        self.takeoff_height = height.max(1.0);
        self.scene.set_takeoff_height(self.takeoff_height);
        log::info!("Take-off height {:.0}", self.takeoff_height);
    }
}
