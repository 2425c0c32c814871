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

//! `winit` → engine input translation.

use nova_core::platform::{InputEvent, MouseButton};
use winit::event::{
    ElementState, KeyEvent, MouseButton as WinitMouseButton, MouseScrollDelta, WindowEvent,
};
use winit::keyboard::PhysicalKey;

/// Converts a window event into an [`InputEvent`].
///
/// Returns `None` for non-input events (resize, focus, close...), for key
/// auto-repeat, for keys without a physical code and for zero scrolls.
pub fn translate_winit_input(event: &WindowEvent) -> Option<InputEvent> {
    match event {
        WindowEvent::KeyboardInput { event, .. } => translate_key(event),
        WindowEvent::CursorMoved { position, .. } => Some(InputEvent::MouseMoved {
            x: position.x as f32,
            y: position.y as f32,
        }),
        WindowEvent::MouseInput { state, button, .. } => {
            let button = map_mouse_button(*button);
            Some(match state {
                ElementState::Pressed => InputEvent::MouseButtonPressed { button },
                ElementState::Released => InputEvent::MouseButtonReleased { button },
            })
        }
        WindowEvent::MouseWheel { delta, .. } => scroll_event(*delta),
        _ => None,
    }
}

fn translate_key(event: &KeyEvent) -> Option<InputEvent> {
    let key_code = key_name(event.physical_key)?;
    match event.state {
        ElementState::Pressed if event.repeat => None,
        ElementState::Pressed => Some(InputEvent::KeyPressed { key_code }),
        ElementState::Released => Some(InputEvent::KeyReleased { key_code }),
    }
}

/// Name of a physical key as the engine stores it (`"KeyW"`, `"Space"`, ...).
pub fn key_name(key: PhysicalKey) -> Option<String> {
    match key {
        PhysicalKey::Code(code) => Some(format!("{code:?}")),
        PhysicalKey::Unidentified(_) => None,
    }
}

fn scroll_event(delta: MouseScrollDelta) -> Option<InputEvent> {
    let (delta_x, delta_y) = match delta {
        MouseScrollDelta::LineDelta(x, y) => (x, y),
        MouseScrollDelta::PixelDelta(pos) => (pos.x as f32, pos.y as f32),
    };
    (delta_x != 0.0 || delta_y != 0.0).then_some(InputEvent::MouseWheelScrolled { delta_x, delta_y })
}

fn map_mouse_button(button: WinitMouseButton) -> MouseButton {
    match button {
        WinitMouseButton::Left => MouseButton::Left,
        WinitMouseButton::Right => MouseButton::Right,
        WinitMouseButton::Middle => MouseButton::Middle,
        WinitMouseButton::Back => MouseButton::Back,
        WinitMouseButton::Forward => MouseButton::Forward,
        WinitMouseButton::Other(id) => MouseButton::Other(id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::{PhysicalPosition, PhysicalSize};
    use winit::event::{DeviceId, TouchPhase};
    use winit::keyboard::{KeyCode, NativeKeyCode};

    fn device() -> DeviceId {
        // SAFETY: the id is only compared, never handed to winit.
        unsafe { DeviceId::dummy() }
    }

    #[test]
    fn test_key_names_follow_physical_codes() {
        assert_eq!(key_name(PhysicalKey::Code(KeyCode::KeyW)).as_deref(), Some("KeyW"));
        assert_eq!(key_name(PhysicalKey::Code(KeyCode::Space)).as_deref(), Some("Space"));
        assert_eq!(key_name(PhysicalKey::Unidentified(NativeKeyCode::Unidentified)), None);
    }

    #[test]
    fn test_mouse_buttons() {
        for (winit_button, button) in [
            (WinitMouseButton::Left, MouseButton::Left),
            (WinitMouseButton::Right, MouseButton::Right),
            (WinitMouseButton::Middle, MouseButton::Middle),
            (WinitMouseButton::Back, MouseButton::Back),
            (WinitMouseButton::Forward, MouseButton::Forward),
            (WinitMouseButton::Other(9), MouseButton::Other(9)),
        ] {
            let pressed = WindowEvent::MouseInput {
                device_id: device(),
                state: ElementState::Pressed,
                button: winit_button,
            };
            assert_eq!(
                translate_winit_input(&pressed),
                Some(InputEvent::MouseButtonPressed { button })
            );
        }

        let released = WindowEvent::MouseInput {
            device_id: device(),
            state: ElementState::Released,
            button: WinitMouseButton::Right,
        };
        assert_eq!(
            translate_winit_input(&released),
            Some(InputEvent::MouseButtonReleased {
                button: MouseButton::Right
            })
        );
    }

    #[test]
    fn test_cursor_position() {
        let event = WindowEvent::CursorMoved {
            device_id: device(),
            position: PhysicalPosition::new(12.5, 40.0),
        };
        assert_eq!(
            translate_winit_input(&event),
            Some(InputEvent::MouseMoved { x: 12.5, y: 40.0 })
        );
    }

    #[test]
    fn test_scroll_lines_pixels_and_zero() {
        let lines = WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, -3.0),
            phase: TouchPhase::Moved,
        };
        assert_eq!(
            translate_winit_input(&lines),
            Some(InputEvent::MouseWheelScrolled {
                delta_x: 0.0,
                delta_y: -3.0
            })
        );

        let pixels = WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::PixelDelta(PhysicalPosition::new(4.0, 8.0)),
            phase: TouchPhase::Moved,
        };
        assert_eq!(
            translate_winit_input(&pixels),
            Some(InputEvent::MouseWheelScrolled {
                delta_x: 4.0,
                delta_y: 8.0
            })
        );

        let zero = WindowEvent::MouseWheel {
            device_id: device(),
            delta: MouseScrollDelta::LineDelta(0.0, 0.0),
            phase: TouchPhase::Ended,
        };
        assert_eq!(translate_winit_input(&zero), None);
    }

    #[test]
    fn test_window_events_are_not_input() {
        assert_eq!(translate_winit_input(&WindowEvent::CloseRequested), None);
        assert_eq!(translate_winit_input(&WindowEvent::Focused(false)), None);
        assert_eq!(
            translate_winit_input(&WindowEvent::Resized(PhysicalSize::new(10, 10))),
            None
        );
    }
}
