use std::collections::HashSet;

use glam::Vec2;
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks input state for keyboard and mouse.
#[derive(Debug, Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: HashSet<KeyCode>,
    keys_released: HashSet<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_buttons_pressed: HashSet<MouseButton>,
    mouse_buttons_released: HashSet<MouseButton>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
    /// Raw device motion, reported even while the cursor is locked.
    look_delta: Vec2,
    scroll_delta: Vec2,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the end of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_buttons_pressed.clear();
        self.mouse_buttons_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.look_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    self.set_key(key, event.state == ElementState::Pressed);
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                self.set_button(*button, *state == ElementState::Pressed);
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.set_mouse_position(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.scroll_delta += match delta {
                    MouseScrollDelta::LineDelta(x, y) => Vec2::new(*x, *y),
                    MouseScrollDelta::PixelDelta(pos) => {
                        Vec2::new(pos.x as f32, pos.y as f32) / 120.0
                    }
                };
            }
            WindowEvent::Focused(false) => self.release_all(),
            _ => {}
        }
    }

    /// Process a raw device event. Only pointer motion is used.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if let DeviceEvent::MouseMotion { delta } = event {
            self.look_delta += Vec2::new(delta.0 as f32, delta.1 as f32);
        }
    }

    /// Records a key edge. Repeats of a held key are not new presses.
    pub fn set_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.keys_pressed.insert(key);
            }
        } else if self.keys_down.remove(&key) {
            self.keys_released.insert(key);
        }
    }

    pub fn set_button(&mut self, button: MouseButton, pressed: bool) {
        if pressed {
            if self.mouse_buttons_down.insert(button) {
                self.mouse_buttons_pressed.insert(button);
            }
        } else if self.mouse_buttons_down.remove(&button) {
            self.mouse_buttons_released.insert(button);
        }
    }

    pub fn set_mouse_position(&mut self, position: Vec2) {
        self.mouse_delta += position - self.mouse_position;
        self.mouse_position = position;
    }

    /// Drops every held key and button, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        for key in self.keys_down.drain() {
            self.keys_released.insert(key);
        }
        for button in self.mouse_buttons_down.drain() {
            self.mouse_buttons_released.insert(button);
        }
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Returns true if the key was pressed this frame.
    pub fn key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Returns true if the key was released this frame.
    pub fn key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// Returns true if the mouse button is currently held down.
    pub fn mouse_down(&self, button: MouseButton) -> bool {
        self.mouse_buttons_down.contains(&button)
    }

    /// Returns true if the mouse button was pressed this frame.
    pub fn mouse_pressed(&self, button: MouseButton) -> bool {
        self.mouse_buttons_pressed.contains(&button)
    }

    /// Returns true if the mouse button was released this frame.
    pub fn mouse_released(&self, button: MouseButton) -> bool {
        self.mouse_buttons_released.contains(&button)
    }

    /// Current mouse position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Cursor movement this frame, in window pixels.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Raw pointer motion this frame. Keeps reporting while the cursor is grabbed.
    pub fn look_delta(&self) -> Vec2 {
        self.look_delta
    }

    /// Scroll wheel delta this frame (in "lines").
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn held_key_is_pressed_once() {
        let mut input = Input::new();
        input.set_key(KeyCode::KeyW, true);
        assert!(input.key_pressed(KeyCode::KeyW));
        input.begin_frame();
        input.set_key(KeyCode::KeyW, true);
        assert!(input.key_down(KeyCode::KeyW));
        assert!(!input.key_pressed(KeyCode::KeyW));
    }

    #[test]
    fn release_all_clears_held_state() {
        let mut input = Input::new();
        input.set_key(KeyCode::KeyA, true);
        input.set_button(MouseButton::Left, true);
        input.release_all();
        assert!(!input.key_down(KeyCode::KeyA));
        assert!(input.key_released(KeyCode::KeyA));
        assert!(!input.mouse_down(MouseButton::Left));
    }

    #[test]
    fn deltas_reset_each_frame() {
        let mut input = Input::new();
        input.set_mouse_position(Vec2::new(10.0, 5.0));
        input.handle_device_event(&DeviceEvent::MouseMotion { delta: (3.0, -2.0) });
        assert_eq!(input.mouse_delta(), Vec2::new(10.0, 5.0));
        assert_eq!(input.look_delta(), Vec2::new(3.0, -2.0));
        input.begin_frame();
        assert_eq!(input.look_delta(), Vec2::ZERO);
        assert_eq!(input.mouse_position(), Vec2::new(10.0, 5.0));
    }
}
