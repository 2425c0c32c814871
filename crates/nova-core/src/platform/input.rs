// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Backend-agnostic input events and the per-frame input state built from them.

use std::collections::HashSet;
use std::sync::LazyLock;

use crate::math::Vec2;

/// A user input event, already translated from the windowing backend.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key went down. Auto-repeat is filtered out by the backend.
    KeyPressed {
        /// Physical key name, e.g. `"KeyW"` or `"Space"`.
        key_code: String,
    },
    /// A key went up.
    KeyReleased {
        /// Physical key name.
        key_code: String,
    },
    /// A mouse button went down.
    MouseButtonPressed {
        /// Which button.
        button: MouseButton,
    },
    /// A mouse button went up.
    MouseButtonReleased {
        /// Which button.
        button: MouseButton,
    },
    /// The cursor moved, in physical pixels.
    MouseMoved {
        /// Cursor x.
        x: f32,
        /// Cursor y.
        y: f32,
    },
    /// Wheel or touchpad scroll.
    MouseWheelScrolled {
        /// Horizontal delta.
        delta_x: f32,
        /// Vertical delta.
        delta_y: f32,
    },
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary.
    Left,
    /// Secondary.
    Right,
    /// Wheel click.
    Middle,
    /// Side button, back.
    Back,
    /// Side button, forward.
    Forward,
    /// Any other button by numeric id.
    Other(u16),
}

/// Queryable keyboard and mouse state.
///
/// Feed it events with [`InputState::apply`] during a frame and call
/// [`InputState::begin_frame`] once per frame to clear the edge-triggered
/// sets and deltas. Held keys and buttons persist across frames.
#[derive(Debug, Default, Clone)]
pub struct InputState {
    keys_down: HashSet<String>,
    keys_pressed: HashSet<String>,
    keys_released: HashSet<String>,
    buttons_down: HashSet<MouseButton>,
    buttons_pressed: HashSet<MouseButton>,
    buttons_released: HashSet<MouseButton>,
    mouse_position: Option<Vec2>,
    mouse_delta: Vec2,
    scroll_delta: Vec2,
}

static NO_INPUT: LazyLock<InputState> = LazyLock::new(InputState::new);

impl InputState {
    /// Empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// A shared state with nothing held, for code running outside a frame.
    pub fn none() -> &'static InputState {
        &NO_INPUT
    }

    /// Clears per-frame edges and deltas.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
        self.buttons_pressed.clear();
        self.buttons_released.clear();
        self.mouse_delta = Vec2::ZERO;
        self.scroll_delta = Vec2::ZERO;
    }

    /// Folds one event into the state.
    pub fn apply(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyPressed { key_code } => {
                if self.keys_down.insert(key_code.clone()) {
                    self.keys_pressed.insert(key_code.clone());
                }
            }
            InputEvent::KeyReleased { key_code } => {
                if self.keys_down.remove(key_code) {
                    self.keys_released.insert(key_code.clone());
                }
            }
            InputEvent::MouseButtonPressed { button } => {
                if self.buttons_down.insert(*button) {
                    self.buttons_pressed.insert(*button);
                }
            }
            InputEvent::MouseButtonReleased { button } => {
                if self.buttons_down.remove(button) {
                    self.buttons_released.insert(*button);
                }
            }
            InputEvent::MouseMoved { x, y } => {
                let position = Vec2::new(*x, *y);
                if let Some(previous) = self.mouse_position {
                    self.mouse_delta += position - previous;
                }
                self.mouse_position = Some(position);
            }
            InputEvent::MouseWheelScrolled { delta_x, delta_y } => {
                self.scroll_delta += Vec2::new(*delta_x, *delta_y);
            }
        }
    }

    /// Key currently held.
    pub fn is_key_down(&self, key: &str) -> bool {
        self.keys_down.contains(key)
    }

    /// Key went down this frame.
    pub fn was_key_pressed(&self, key: &str) -> bool {
        self.keys_pressed.contains(key)
    }

    /// Key went up this frame.
    pub fn was_key_released(&self, key: &str) -> bool {
        self.keys_released.contains(key)
    }

    /// Button currently held.
    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.buttons_down.contains(&button)
    }

    /// Button went down this frame.
    pub fn was_button_pressed(&self, button: MouseButton) -> bool {
        self.buttons_pressed.contains(&button)
    }

    /// Button went up this frame.
    pub fn was_button_released(&self, button: MouseButton) -> bool {
        self.buttons_released.contains(&button)
    }

    /// Last known cursor position, `None` until the cursor moved once.
    pub fn mouse_position(&self) -> Option<Vec2> {
        self.mouse_position
    }

    /// Cursor movement accumulated this frame.
    pub fn mouse_delta(&self) -> Vec2 {
        self.mouse_delta
    }

    /// Scroll accumulated this frame.
    pub fn scroll_delta(&self) -> Vec2 {
        self.scroll_delta
    }

    /// -1, 0 or 1 depending on which of the two keys is held.
    pub fn axis(&self, negative: &str, positive: &str) -> f32 {
        let mut value = 0.0;
        if self.is_key_down(negative) {
            value -= 1.0;
        }
        if self.is_key_down(positive) {
            value += 1.0;
        }
        value
    }
}
