//! Keyboard input: raw key tracking plus the per-tick command sets the
//! simulation consumes.

use std::collections::HashSet;

/// Abstract controls. The simulation never sees raw key codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    TakeOff,
    Land,
    Reset,
    DropWater,
    ThrottleForward,
    ThrottleBack,
    YawLeft,
    YawRight,
    /// Extend or retract the water bucket.
    ToggleBucket,
    /// Switch between the free camera and the chase camera.
    ToggleFollowCamera,
}

/// Commands for a single tick: edge-triggered and level-triggered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommandSet {
    just_pressed: HashSet<Command>,
    held: HashSet<Command>,
}

impl CommandSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a command as pressed this tick. A pressed command is also held.
    pub fn press(&mut self, command: Command) -> &mut Self {
        self.just_pressed.insert(command);
        self.held.insert(command);
        self
    }

    /// Mark a command as held without a new press edge.
    pub fn hold(&mut self, command: Command) -> &mut Self {
        self.held.insert(command);
        self
    }

    /// Fired once per physical press.
    pub fn just_pressed(&self, command: Command) -> bool {
        self.just_pressed.contains(&command)
    }

    pub fn held(&self, command: Command) -> bool {
        self.held.contains(&command)
    }

    pub fn is_empty(&self) -> bool {
        self.just_pressed.is_empty() && self.held.is_empty()
    }
}

/// Key → command table.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    bindings: Vec<(KeyCode, Command)>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            bindings: vec![
                (KeyCode::KeyP, Command::TakeOff),
                (KeyCode::KeyL, Command::Land),
                (KeyCode::KeyR, Command::Reset),
                (KeyCode::KeyO, Command::DropWater),
                (KeyCode::KeyW, Command::ThrottleForward),
                (KeyCode::KeyS, Command::ThrottleBack),
                (KeyCode::KeyA, Command::YawLeft),
                (KeyCode::KeyD, Command::YawRight),
                (KeyCode::KeyG, Command::ToggleBucket),
                (KeyCode::KeyC, Command::ToggleFollowCamera),
            ],
        }
    }
}

impl KeyBindings {
    /// Rebind a command. Any previous key for that command is dropped.
    pub fn bind(&mut self, key: KeyCode, command: Command) {
        self.bindings.retain(|(_, c)| *c != command);
        self.bindings.push((key, command));
        log::debug!("Bound {:?} to {:?}", command, key);
    }

    pub fn iter(&self) -> impl Iterator<Item = &(KeyCode, Command)> {
        self.bindings.iter()
    }
}

/// Manages keyboard state for the current tick.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed since the last `begin_frame`.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released since the last `begin_frame`.
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-tick state. Call after the tick consumed the commands.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a keyboard event. OS key repeat does not produce new press edges.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Drop all held keys (window lost focus).
    pub fn release_all(&mut self) {
        self.keys_released.extend(self.keys_held.drain());
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this tick.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this tick.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Build the command set for this tick. A key pressed and released between
    /// two ticks still yields its press edge.
    pub fn commands(&self, bindings: &KeyBindings) -> CommandSet {
        let mut commands = CommandSet::new();
        for &(key, command) in bindings.iter() {
            if self.is_key_pressed(key) {
                commands.press(command);
            } else if self.is_key_held(key) {
                commands.hold(command);
            }
        }
        commands
    }
}

// Re-export for convenience
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn press_edge_fires_once() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyP, ElementState::Pressed);
        let first = input.commands(&bindings);
        assert!(first.just_pressed(Command::TakeOff));
        assert!(first.held(Command::TakeOff));

        input.begin_frame();
        // OS key repeat
        input.process_keyboard(KeyCode::KeyP, ElementState::Pressed);
        let second = input.commands(&bindings);
        assert!(!second.just_pressed(Command::TakeOff));
        assert!(second.held(Command::TakeOff));
    }

    #[test]
    fn tap_between_ticks_still_registers() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyO, ElementState::Pressed);
        input.process_keyboard(KeyCode::KeyO, ElementState::Released);
        let commands = input.commands(&bindings);
        assert!(commands.just_pressed(Command::DropWater));
        assert!(input.is_key_released(KeyCode::KeyO));
    }

    #[test]
    fn unbound_keys_are_ignored() {
        let bindings = KeyBindings::default();
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyZ, ElementState::Pressed);
        assert!(input.commands(&bindings).is_empty());
    }

    #[test]
    fn rebinding_replaces_previous_key() {
        let mut bindings = KeyBindings::default();
        bindings.bind(KeyCode::ArrowUp, Command::ThrottleForward);
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        assert!(!input.commands(&bindings).held(Command::ThrottleForward));
        input.process_keyboard(KeyCode::ArrowUp, ElementState::Pressed);
        assert!(input.commands(&bindings).held(Command::ThrottleForward));
    }

    #[test]
    fn release_all_clears_held() {
        let mut input = InputState::new();
        input.process_keyboard(KeyCode::KeyW, ElementState::Pressed);
        input.release_all();
        assert!(!input.is_key_held(KeyCode::KeyW));
        assert!(input.is_key_released(KeyCode::KeyW));
    }
}
