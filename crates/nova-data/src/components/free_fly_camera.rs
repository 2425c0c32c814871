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

use crate::component::{Component, ComponentContext, ComponentFlags};
use nova_core::math::{Quaternion, Vec3};
use nova_core::platform::{InputState, MouseButton};

/// Pitch stays inside this range, in degrees, so the view never flips.
const PITCH_LIMIT: f32 = 89.0;

/// Mouse-look and WASD movement for the owner, usually a [`Camera`](super::Camera) entity.
///
/// While `look_button` is held (always when it is `None`), moving the mouse
/// turns the owner: yaw around world up, pitch around its own right axis.
/// `KeyW`/`KeyS` move along the view direction, `KeyA`/`KeyD` strafe, and
/// `KeyE`/`KeyQ` rise and sink. Holding `ShiftLeft` multiplies the speed by
/// `boost`. Velocity eases toward the requested one at `smoothing` per
/// second; a smoothing of zero reacts instantly.
#[derive(Debug, Clone, PartialEq)]
pub struct FreeFlyCamera {
    /// Units per second.
    pub speed: f32,
    /// Speed multiplier while the boost key is held.
    pub boost: f32,
    /// Degrees of rotation per pixel of mouse movement.
    pub sensitivity: f32,
    /// Velocity response per second, `0` disables smoothing.
    pub smoothing: f32,
    /// Button that must be held to look and move.
    pub look_button: Option<MouseButton>,
    velocity: Vec3,
    pitch_degrees: f32,
}

impl Default for FreeFlyCamera {
    fn default() -> Self {
        Self {
            speed: 5.0,
            boost: 4.0,
            sensitivity: 0.1,
            smoothing: 10.0,
            look_button: Some(MouseButton::Right),
            velocity: Vec3::ZERO,
            pitch_degrees: 0.0,
        }
    }
}

impl FreeFlyCamera {
    /// Controller with the given speed and mouse sensitivity.
    pub fn new(speed: f32, sensitivity: f32) -> Self {
        Self {
            speed,
            sensitivity,
            ..Self::default()
        }
    }

    /// Current velocity in parent space.
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn is_active(&self, input: &InputState) -> bool {
        match self.look_button {
            Some(button) => input.is_button_down(button),
            None => true,
        }
    }

    fn look(&mut self, ctx: &mut ComponentContext) {
        let delta = ctx.input.mouse_delta();
        if delta.x == 0.0 && delta.y == 0.0 {
            return;
        }
        let yaw = -delta.x * self.sensitivity;
        let target_pitch =
            (self.pitch_degrees - delta.y * self.sensitivity).clamp(-PITCH_LIMIT, PITCH_LIMIT);
        let pitch = target_pitch - self.pitch_degrees;
        self.pitch_degrees = target_pitch;

        let yaw = Quaternion::from_axis_angle(Vec3::UP, yaw.to_radians());
        let pitch = Quaternion::from_axis_angle(Vec3::RIGHT, pitch.to_radians());
        let rotation = (yaw * ctx.transform.rotation() * pitch).normalize();
        ctx.transform.set_rotation(rotation);
    }

    fn requested_velocity(&self, ctx: &ComponentContext) -> Vec3 {
        let input = ctx.input;
        let transform = &*ctx.transform;
        let direction = transform.forward() * input.axis("KeyS", "KeyW")
            + transform.right() * input.axis("KeyA", "KeyD")
            + Vec3::UP * input.axis("KeyQ", "KeyE");
        let mut speed = self.speed;
        if input.is_key_down("ShiftLeft") {
            speed *= self.boost;
        }
        direction.normalize() * speed
    }
}

impl Component for FreeFlyCamera {
    fn name(&self) -> &str {
        "FreeFlyCamera"
    }

    fn flags(&self) -> ComponentFlags {
        ComponentFlags::DISALLOW_MULTIPLE_IN_ENTITY
    }

    fn on_start(&mut self, ctx: &mut ComponentContext) {
        let forward = ctx.transform.forward();
        self.pitch_degrees = forward.y.clamp(-1.0, 1.0).asin().to_degrees();
    }

    fn on_update(&mut self, ctx: &mut ComponentContext, delta_time: f32) {
        let target = if self.is_active(ctx.input) {
            self.look(ctx);
            self.requested_velocity(ctx)
        } else {
            Vec3::ZERO
        };

        self.velocity = if self.smoothing > 0.0 {
            let blend = (self.smoothing * delta_time).clamp(0.0, 1.0);
            self.velocity + (target - self.velocity) * blend
        } else {
            target
        };
        if self.velocity != Vec3::ZERO {
            ctx.transform.translate(self.velocity * delta_time);
        }
    }

    fn on_disable(&mut self, _ctx: &mut ComponentContext) {
        self.velocity = Vec3::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Scene;
    use approx::assert_relative_eq;
    use nova_core::platform::InputEvent;

    fn press(input: &mut InputState, key: &str) {
        input.apply(&InputEvent::KeyPressed {
            key_code: key.to_string(),
        });
    }

    fn hold_look(input: &mut InputState) {
        input.apply(&InputEvent::MouseButtonPressed {
            button: MouseButton::Right,
        });
    }

    fn flyer(controller: FreeFlyCamera) -> (Scene, crate::EntityHandle) {
        let mut scene = Scene::new("fly");
        let cam = scene.create_entity("cam");
        scene.add_component(cam, controller).unwrap();
        (scene, cam)
    }

    fn instant() -> FreeFlyCamera {
        FreeFlyCamera {
            smoothing: 0.0,
            ..FreeFlyCamera::new(2.0, 0.1)
        }
    }

    #[test]
    fn test_moves_forward_while_look_button_held() {
        let (mut scene, cam) = flyer(instant());
        let mut input = InputState::new();
        press(&mut input, "KeyW");

        scene.update_with_input(0.5, &input);
        assert_eq!(scene.entity(cam).unwrap().transform().position(), Vec3::ZERO);

        hold_look(&mut input);
        scene.update_with_input(0.5, &input);
        let p = scene.entity(cam).unwrap().transform().position();
        assert!(p.approx_eq(Vec3::new(0.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_diagonal_is_normalized_and_boosted() {
        let (mut scene, cam) = flyer(FreeFlyCamera {
            look_button: None,
            ..instant()
        });
        let mut input = InputState::new();
        press(&mut input, "KeyW");
        press(&mut input, "KeyD");
        press(&mut input, "ShiftLeft");

        scene.update_with_input(1.0, &input);
        let p = scene.entity(cam).unwrap().transform().position();
        assert_relative_eq!(p.length(), 8.0, epsilon = 1e-4);
        assert!(p.x > 0.0 && p.z < 0.0);
    }

    #[test]
    fn test_mouse_turns_right_and_pitch_is_limited() {
        let (mut scene, cam) = flyer(FreeFlyCamera {
            look_button: None,
            ..instant()
        });
        let mut input = InputState::new();
        input.apply(&InputEvent::MouseMoved { x: 0.0, y: 0.0 });
        input.apply(&InputEvent::MouseMoved { x: 900.0, y: 0.0 });
        scene.update_with_input(0.016, &input);
        let forward = scene.entity(cam).unwrap().transform().forward();
        assert!(forward.approx_eq(Vec3::RIGHT, 1e-4));

        input.begin_frame();
        input.apply(&InputEvent::MouseMoved { x: 900.0, y: -5000.0 });
        scene.update_with_input(0.016, &input);
        let forward = scene.entity(cam).unwrap().transform().forward();
        assert_relative_eq!(forward.y, PITCH_LIMIT.to_radians().sin(), epsilon = 1e-4);
    }

    #[test]
    fn test_smoothing_eases_velocity() {
        let (mut scene, cam) = flyer(FreeFlyCamera {
            look_button: None,
            smoothing: 5.0,
            ..FreeFlyCamera::new(2.0, 0.1)
        });
        let mut input = InputState::new();
        press(&mut input, "KeyE");
        scene.update_with_input(0.1, &input);
        let controller = scene
            .entity(cam)
            .unwrap()
            .get_component::<FreeFlyCamera>()
            .unwrap();
        assert_relative_eq!(controller.velocity().y, 1.0, epsilon = 1e-5);

        let released = InputState::new();
        for _ in 0..60 {
            scene.update_with_input(0.1, &released);
        }
        let controller = scene
            .entity(cam)
            .unwrap()
            .get_component::<FreeFlyCamera>()
            .unwrap();
        assert!(controller.velocity().length() < 1e-4);
    }
}
