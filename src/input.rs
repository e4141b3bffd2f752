use std::collections::HashSet;

use glam::Vec2;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

/// Tracks keyboard and mouse state across window events.
///
/// Edge events (pressed/released this frame) accumulate until
/// [`Input::begin_frame`] clears them, so the game sees each transition
/// exactly once regardless of how events and redraws interleave.
#[derive(Default)]
pub struct Input {
    keys_down: HashSet<KeyCode>,
    keys_pressed: Vec<KeyCode>,
    keys_released: Vec<KeyCode>,
    mouse_buttons_down: HashSet<MouseButton>,
    mouse_position: Vec2,
    mouse_delta: Vec2,
    scroll_delta: f32,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    /// Call at the start of each frame to reset per-frame state.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = 0.0;
    }

    /// Process a window event and update input state.
    pub fn handle_event(&mut self, event: &WindowEvent) {
        match event {
            WindowEvent::KeyboardInput { event, .. } => {
                if let PhysicalKey::Code(key) = event.physical_key {
                    match event.state {
                        ElementState::Pressed => self.press_key(key),
                        ElementState::Released => self.release_key(key),
                    }
                }
            }
            WindowEvent::MouseInput { state, button, .. } => match state {
                ElementState::Pressed => {
                    self.mouse_buttons_down.insert(*button);
                }
                ElementState::Released => {
                    self.mouse_buttons_down.remove(button);
                }
            },
            WindowEvent::CursorMoved { position, .. } => {
                self.move_cursor(Vec2::new(position.x as f32, position.y as f32));
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let lines = match delta {
                    winit::event::MouseScrollDelta::LineDelta(_, y) => *y,
                    winit::event::MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 120.0,
                };
                self.scroll_delta += lines;
            }
            _ => {}
        }
    }

    fn press_key(&mut self, key: KeyCode) {
        // Key repeat shows up as repeated Pressed events; only the first
        // one counts as an edge.
        if self.keys_down.insert(key) {
            self.keys_pressed.push(key);
        }
    }

    fn release_key(&mut self, key: KeyCode) {
        self.keys_down.remove(&key);
        self.keys_released.push(key);
    }

    fn move_cursor(&mut self, position: Vec2) {
        self.mouse_delta += position - self.mouse_position;
        self.mouse_position = position;
    }

    /// Returns true if the key is currently held down.
    pub fn key_down(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    /// Keys pressed since the last `begin_frame`, in arrival order.
    pub fn pressed_keys(&self) -> &[KeyCode] {
        &self.keys_pressed
    }

    /// Keys released since the last `begin_frame`, in arrival order.
    pub fn released_keys(&self) -> &[KeyCode] {
        &self.keys_released
    }

    /// Current mouse position in window coordinates.
    pub fn mouse_position(&self) -> Vec2 {
        self.mouse_position
    }

    /// Cursor movement this frame while the left button is held, for
    /// look and inspect dragging. Zero when not dragging.
    pub fn drag_delta(&self) -> Vec2 {
        if self.mouse_buttons_down.contains(&MouseButton::Left) {
            self.mouse_delta
        } else {
            Vec2::ZERO
        }
    }

    /// Scroll wheel movement this frame, in lines.
    pub fn scroll_delta(&self) -> f32 {
        self.scroll_delta
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_presses_are_one_edge() {
        let mut input = Input::new();
        input.press_key(KeyCode::KeyW);
        input.press_key(KeyCode::KeyW);
        assert_eq!(input.pressed_keys(), &[KeyCode::KeyW]);
        assert!(input.key_down(KeyCode::KeyW));

        input.begin_frame();
        assert!(input.pressed_keys().is_empty());
        assert!(input.key_down(KeyCode::KeyW));

        input.release_key(KeyCode::KeyW);
        assert_eq!(input.released_keys(), &[KeyCode::KeyW]);
        assert!(!input.key_down(KeyCode::KeyW));
    }

    #[test]
    fn drag_delta_requires_the_left_button() {
        let mut input = Input::new();
        input.move_cursor(Vec2::new(10.0, 10.0));
        input.begin_frame();

        input.move_cursor(Vec2::new(15.0, 7.0));
        assert_eq!(input.drag_delta(), Vec2::ZERO);

        input.mouse_buttons_down.insert(MouseButton::Left);
        assert_eq!(input.drag_delta(), Vec2::new(5.0, -3.0));
    }
}
