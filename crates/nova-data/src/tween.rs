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

//! Time-based interpolation of entity properties.
//!
//! A [`Tween`] describes where a property should end up, how long it takes
//! and the easing curve. [`Scene::start_tween`](crate::Scene::start_tween)
//! captures the start value and hands it to the scene's [`TweenManager`],
//! which advances it on every scene update after the component hooks.
//! [`ValueTween`] is the same machinery for a plain value the caller owns,
//! such as a clear color.

use crate::components::Camera;
use crate::entity::Entity;
use crate::handle::EntityHandle;
use nova_core::math::{Color, Quaternion, Vec2, Vec3, Vec4};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Easing curves, mapping linear progress in `[0, 1]` to eased progress.
///
/// Back curves overshoot below 0 or above 1 on purpose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TweenEase {
    /// Constant speed.
    #[default]
    Linear,
    /// `t²`.
    QuadraticIn,
    /// Mirror of `QuadraticIn`.
    QuadraticOut,
    /// `QuadraticIn` then `QuadraticOut`.
    QuadraticInOut,
    /// `t³`.
    CubicIn,
    /// Mirror of `CubicIn`.
    CubicOut,
    /// `CubicIn` then `CubicOut`.
    CubicInOut,
    /// `2^(10t - 10)`.
    ExponentialIn,
    /// Mirror of `ExponentialIn`.
    ExponentialOut,
    /// `ExponentialIn` then `ExponentialOut`.
    ExponentialInOut,
    /// Pulls back below 0 before leaving.
    BackIn,
    /// Overshoots past 1 before settling.
    BackOut,
    /// `BackIn` then `BackOut`.
    BackInOut,
}

const BACK_C1: f32 = 1.70158;
const BACK_C2: f32 = BACK_C1 * 1.525;
const BACK_C3: f32 = BACK_C1 + 1.0;

impl TweenEase {
    /// Eased progress for `t`, which is clamped to `[0, 1]` first.
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            TweenEase::Linear => t,
            TweenEase::QuadraticIn => t * t,
            TweenEase::QuadraticOut => 1.0 - (1.0 - t) * (1.0 - t),
            TweenEase::QuadraticInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            TweenEase::CubicIn => t * t * t,
            TweenEase::CubicOut => 1.0 - (1.0 - t).powi(3),
            TweenEase::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            TweenEase::ExponentialIn => {
                if t == 0.0 {
                    0.0
                } else {
                    2f32.powf(10.0 * t - 10.0)
                }
            }
            TweenEase::ExponentialOut => {
                if t == 1.0 {
                    1.0
                } else {
                    1.0 - 2f32.powf(-10.0 * t)
                }
            }
            TweenEase::ExponentialInOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else if t < 0.5 {
                    2f32.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f32.powf(-20.0 * t + 10.0)) / 2.0
                }
            }
            TweenEase::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
            TweenEase::BackOut => {
                1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
            }
            TweenEase::BackInOut => {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2) + 2.0)
                        / 2.0
                }
            }
        }
    }
}

/// A value that can be interpolated by a tween.
///
/// `t` is eased progress and may leave `[0, 1]` for overshooting curves.
pub trait Tweenable: Copy {
    /// Value at progress `t` between `start` and `end`.
    fn interpolate(start: Self, end: Self, t: f32) -> Self;
}

impl Tweenable for f32 {
    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        start + (end - start) * t
    }
}

macro_rules! impl_tweenable_vector {
    ($($ty:ty),+) => {
        $(impl Tweenable for $ty {
            fn interpolate(start: Self, end: Self, t: f32) -> Self {
                start + (end - start) * t
            }
        })+
    };
}

impl_tweenable_vector!(Vec2, Vec3, Vec4);

impl Tweenable for Color {
    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        Color::from_vec4(Vec4::interpolate(start.to_vec4(), end.to_vec4(), t))
    }
}

impl Tweenable for Quaternion {
    /// Shortest-arc slerp. Overshoot is clamped away.
    fn interpolate(start: Self, end: Self, t: f32) -> Self {
        Quaternion::slerp(start, end, t)
    }
}

/// Progress bookkeeping shared by every tween.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Timeline {
    elapsed: f32,
    duration: f32,
    ease: TweenEase,
}

impl Timeline {
    fn new(duration: f32, ease: TweenEase) -> Self {
        let duration = if duration.is_finite() { duration.max(0.0) } else { 0.0 };
        Self {
            elapsed: 0.0,
            duration,
            ease,
        }
    }

    /// Advances and returns the eased progress plus whether the end was reached.
    fn advance(&mut self, delta_time: f32) -> (f32, bool) {
        let delta_time = if delta_time.is_finite() { delta_time.max(0.0) } else { 0.0 };
        self.elapsed = (self.elapsed + delta_time).min(self.duration);
        if self.elapsed >= self.duration {
            return (1.0, true);
        }
        (self.ease.apply(self.elapsed / self.duration), false)
    }

    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            self.elapsed / self.duration
        }
    }
}

/// Interpolates a value the caller owns.
///
/// Call [`advance`](Self::advance) once per frame and read the value back.
/// The last step lands exactly on the end value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueTween<T: Tweenable> {
    start: T,
    end: T,
    current: T,
    timeline: Timeline,
    finished: bool,
}

impl<T: Tweenable> ValueTween<T> {
    /// Tween from `start` to `end` over `duration` seconds, linear.
    ///
    /// Negative, NaN or infinite durations count as zero: the first
    /// advance jumps to `end`.
    pub fn new(start: T, end: T, duration: f32) -> Self {
        Self {
            start,
            end,
            current: start,
            timeline: Timeline::new(duration, TweenEase::Linear),
            finished: false,
        }
    }

    /// Same tween with another easing curve.
    pub fn with_ease(mut self, ease: TweenEase) -> Self {
        self.timeline.ease = ease;
        self
    }

    /// Moves time forward and returns the new value.
    pub fn advance(&mut self, delta_time: f32) -> T {
        if self.finished {
            return self.current;
        }
        let (t, done) = self.timeline.advance(delta_time);
        self.current = if done {
            self.finished = true;
            self.end
        } else {
            T::interpolate(self.start, self.end, t)
        };
        self.current
    }

    /// Current value.
    pub fn value(&self) -> T {
        self.current
    }

    /// Target value.
    pub fn end(&self) -> T {
        self.end
    }

    /// Linear progress in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        if self.finished {
            1.0
        } else {
            self.timeline.progress()
        }
    }

    /// Whether the end value was reached.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

/// The entity property a [`Tween`] drives, with its end value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TweenTarget {
    /// Local position.
    Position(Vec3),
    /// Local rotation, slerped.
    Rotation(Quaternion),
    /// Local scale.
    Scale(Vec3),
    /// Clear color of the entity's [`Camera`].
    CameraClearColor(Color),
}

/// Description of a property animation, started with
/// [`Scene::start_tween`](crate::Scene::start_tween).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    /// Animated entity.
    pub entity: EntityHandle,
    /// Property and end value.
    pub target: TweenTarget,
    /// Length in seconds.
    pub duration: f32,
    /// Easing curve.
    pub ease: TweenEase,
}

impl Tween {
    /// Moves `entity` to `position`.
    pub fn position(entity: EntityHandle, position: Vec3, duration: f32) -> Self {
        Self::new(entity, TweenTarget::Position(position), duration)
    }

    /// Turns `entity` to `rotation`.
    pub fn rotation(entity: EntityHandle, rotation: Quaternion, duration: f32) -> Self {
        Self::new(entity, TweenTarget::Rotation(rotation), duration)
    }

    /// Turns `entity` to the given Euler angles in degrees.
    pub fn rotation_degrees(entity: EntityHandle, euler: Vec3, duration: f32) -> Self {
        Self::rotation(entity, Quaternion::from_euler_degrees(euler), duration)
    }

    /// Scales `entity` to `scale`.
    pub fn scale(entity: EntityHandle, scale: Vec3, duration: f32) -> Self {
        Self::new(entity, TweenTarget::Scale(scale), duration)
    }

    /// Fades the clear color of the camera on `entity` to `color`.
    pub fn clear_color(entity: EntityHandle, color: Color, duration: f32) -> Self {
        Self::new(entity, TweenTarget::CameraClearColor(color), duration)
    }

    fn new(entity: EntityHandle, target: TweenTarget, duration: f32) -> Self {
        Self {
            entity,
            target,
            duration,
            ease: TweenEase::Linear,
        }
    }

    /// Same tween with another easing curve.
    pub fn with_ease(mut self, ease: TweenEase) -> Self {
        self.ease = ease;
        self
    }
}

/// Identifies a running tween.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TweenId(pub u64);

#[derive(Debug, Clone, Copy)]
enum ActiveValue {
    Position(ValueTween<Vec3>),
    Rotation(ValueTween<Quaternion>),
    Scale(ValueTween<Vec3>),
    CameraClearColor(ValueTween<Color>),
}

#[derive(Debug, Clone, Copy)]
struct ActiveTween {
    id: TweenId,
    entity: EntityHandle,
    value: ActiveValue,
}

/// Running property tweens of a scene.
#[derive(Debug, Default)]
pub struct TweenManager {
    active: Vec<ActiveTween>,
    finished: Vec<TweenId>,
    next_id: u64,
}

impl TweenManager {
    /// No tweens.
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the start value from `entity` and schedules the tween.
    ///
    /// Returns `None` when the target is a camera clear color and the entity
    /// has no [`Camera`].
    pub(crate) fn start(&mut self, tween: Tween, entity: &Entity) -> Option<TweenId> {
        let transform = entity.transform();
        let value = match tween.target {
            TweenTarget::Position(end) => ActiveValue::Position(
                ValueTween::new(transform.position(), end, tween.duration).with_ease(tween.ease),
            ),
            TweenTarget::Rotation(end) => ActiveValue::Rotation(
                ValueTween::new(transform.rotation(), end, tween.duration).with_ease(tween.ease),
            ),
            TweenTarget::Scale(end) => ActiveValue::Scale(
                ValueTween::new(transform.scale(), end, tween.duration).with_ease(tween.ease),
            ),
            TweenTarget::CameraClearColor(end) => {
                let start = entity.get_component::<Camera>()?.clear_color;
                ActiveValue::CameraClearColor(
                    ValueTween::new(start, end, tween.duration).with_ease(tween.ease),
                )
            }
        };
        self.next_id += 1;
        let id = TweenId(self.next_id);
        self.active.push(ActiveTween {
            id,
            entity: tween.entity,
            value,
        });
        log::trace!("TweenManager: started {id:?} on {}", tween.entity);
        Some(id)
    }

    /// Advances every tween in start order and writes the values back.
    ///
    /// Tweens whose entity or camera is gone are dropped without being
    /// reported as finished.
    pub(crate) fn update(&mut self, delta_time: f32, entities: &mut HashMap<EntityHandle, Entity>) {
        let finished = &mut self.finished;
        self.active.retain_mut(|tween| {
            let Some(entity) = entities.get_mut(&tween.entity) else {
                log::debug!("TweenManager: entity {} is gone, dropping {:?}", tween.entity, tween.id);
                return false;
            };
            let done = match &mut tween.value {
                ActiveValue::Position(v) => {
                    let p = v.advance(delta_time);
                    entity.transform_mut().set_position(p);
                    v.is_finished()
                }
                ActiveValue::Rotation(v) => {
                    let r = v.advance(delta_time);
                    entity.transform_mut().set_rotation(r);
                    v.is_finished()
                }
                ActiveValue::Scale(v) => {
                    let s = v.advance(delta_time);
                    entity.transform_mut().set_scale(s);
                    v.is_finished()
                }
                ActiveValue::CameraClearColor(v) => {
                    let Some(camera) = entity.get_component_mut::<Camera>() else {
                        return false;
                    };
                    camera.clear_color = v.advance(delta_time);
                    v.is_finished()
                }
            };
            if done {
                finished.push(tween.id);
            }
            !done
        });
    }

    /// Stops a tween where it is. Returns whether it was running.
    pub fn cancel(&mut self, id: TweenId) -> bool {
        let before = self.active.len();
        self.active.retain(|t| t.id != id);
        before != self.active.len()
    }

    /// Stops every tween driving `entity`. Returns how many were stopped.
    pub fn cancel_entity(&mut self, entity: EntityHandle) -> usize {
        let before = self.active.len();
        self.active.retain(|t| t.entity != entity);
        before - self.active.len()
    }

    /// Whether the tween is still running.
    pub fn is_active(&self, id: TweenId) -> bool {
        self.active.iter().any(|t| t.id == id)
    }

    /// Number of running tweens.
    pub fn len(&self) -> usize {
        self.active.len()
    }

    /// `true` when nothing is running.
    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    /// Tweens that reached their end since the last call, in completion order.
    pub fn take_finished(&mut self) -> Vec<TweenId> {
        std::mem::take(&mut self.finished)
    }

    /// Drops every tween.
    pub fn clear(&mut self) {
        self.active.clear();
        self.finished.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const ALL: [TweenEase; 13] = [
        TweenEase::Linear,
        TweenEase::QuadraticIn,
        TweenEase::QuadraticOut,
        TweenEase::QuadraticInOut,
        TweenEase::CubicIn,
        TweenEase::CubicOut,
        TweenEase::CubicInOut,
        TweenEase::ExponentialIn,
        TweenEase::ExponentialOut,
        TweenEase::ExponentialInOut,
        TweenEase::BackIn,
        TweenEase::BackOut,
        TweenEase::BackInOut,
    ];

    #[test]
    fn test_every_ease_starts_at_zero_and_ends_at_one() {
        for ease in ALL {
            assert_relative_eq!(ease.apply(0.0), 0.0, epsilon = 1e-3);
            assert_relative_eq!(ease.apply(1.0), 1.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn test_ease_midpoints() {
        assert_relative_eq!(TweenEase::Linear.apply(0.25), 0.25);
        assert_relative_eq!(TweenEase::QuadraticIn.apply(0.5), 0.25);
        assert_relative_eq!(TweenEase::QuadraticOut.apply(0.5), 0.75);
        assert_relative_eq!(TweenEase::CubicInOut.apply(0.5), 0.5);
        assert!(TweenEase::BackIn.apply(0.2) < 0.0);
        assert!(TweenEase::BackOut.apply(0.8) > 1.0);
    }

    #[test]
    fn test_ease_input_is_clamped() {
        assert_eq!(TweenEase::QuadraticIn.apply(-1.0), 0.0);
        assert_eq!(TweenEase::QuadraticIn.apply(3.0), 1.0);
        assert_eq!(TweenEase::Linear.apply(f32::NAN), 0.0);
    }

    #[test]
    fn test_value_tween_lands_on_end() {
        let mut tween = ValueTween::new(0.0f32, 10.0, 1.0);
        assert_relative_eq!(tween.advance(0.25), 2.5);
        assert!(!tween.is_finished());
        assert_relative_eq!(tween.progress(), 0.25);
        assert_eq!(tween.advance(5.0), 10.0);
        assert!(tween.is_finished());
        assert_eq!(tween.advance(1.0), 10.0);
    }

    #[test]
    fn test_eased_color_tween() {
        let mut tween =
            ValueTween::new(Color::BLACK, Color::WHITE, 2.0).with_ease(TweenEase::QuadraticIn);
        let half = tween.advance(1.0);
        assert_relative_eq!(half.r, 0.25, epsilon = 1e-6);
        assert_relative_eq!(half.a, 1.0, epsilon = 1e-6);
        assert_eq!(tween.advance(1.0), Color::WHITE);
    }

    #[test]
    fn test_back_ease_overshoots_vectors() {
        let mut tween =
            ValueTween::new(Vec3::ZERO, Vec3::ONE, 1.0).with_ease(TweenEase::BackOut);
        let value = tween.advance(0.8);
        assert!(value.x > 1.0);
    }

    #[test]
    fn test_degenerate_durations_finish_immediately() {
        for duration in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            let mut tween = ValueTween::new(1.0f32, 2.0, duration);
            assert_eq!(tween.advance(0.0), 2.0);
            assert!(tween.is_finished());
        }
    }

    #[test]
    fn test_manager_moves_and_reports_finished() {
        let mut entities = HashMap::new();
        let entity = Entity::new("mover");
        let handle = entity.handle();
        entities.insert(handle, entity);

        let mut manager = TweenManager::new();
        let id = manager
            .start(
                Tween::position(handle, Vec3::new(4.0, 0.0, 0.0), 2.0),
                &entities[&handle],
            )
            .unwrap();
        manager.update(1.0, &mut entities);
        assert_relative_eq!(entities[&handle].transform().position().x, 2.0);
        assert!(manager.is_active(id));
        assert!(manager.take_finished().is_empty());

        manager.update(1.0, &mut entities);
        assert_eq!(entities[&handle].transform().position(), Vec3::new(4.0, 0.0, 0.0));
        assert!(!manager.is_active(id));
        assert_eq!(manager.take_finished(), vec![id]);
    }

    #[test]
    fn test_clear_color_needs_a_camera() {
        let mut entity = Entity::new("cam");
        let handle = entity.handle();
        let mut manager = TweenManager::new();
        assert!(manager
            .start(Tween::clear_color(handle, Color::WHITE, 1.0), &entity)
            .is_none());

        entity.add_component(Camera::default()).unwrap();
        let mut entities = HashMap::from([(handle, entity)]);
        manager
            .start(Tween::clear_color(handle, Color::WHITE, 1.0), &entities[&handle])
            .unwrap();
        manager.update(1.0, &mut entities);
        assert_eq!(
            entities[&handle].get_component::<Camera>().unwrap().clear_color,
            Color::WHITE
        );
    }

    #[test]
    fn test_missing_entity_drops_tween_silently() {
        let entity = Entity::new("gone");
        let handle = entity.handle();
        let mut manager = TweenManager::new();
        let id = manager
            .start(Tween::scale(handle, Vec3::ONE * 2.0, 1.0), &entity)
            .unwrap();
        let mut entities = HashMap::new();
        manager.update(0.5, &mut entities);
        assert!(!manager.is_active(id));
        assert!(manager.take_finished().is_empty());
    }

    #[test]
    fn test_cancel() {
        let entity = Entity::new("e");
        let handle = entity.handle();
        let mut manager = TweenManager::new();
        let a = manager.start(Tween::scale(handle, Vec3::ONE, 1.0), &entity).unwrap();
        manager.start(Tween::position(handle, Vec3::ONE, 1.0), &entity).unwrap();
        assert!(manager.cancel(a));
        assert!(!manager.cancel(a));
        assert_eq!(manager.cancel_entity(handle), 1);
        assert!(manager.is_empty());
    }
}
