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

//! Math primitives for 2D and 3D work.
//!
//! Angles are in **radians** unless a function name says otherwise. The
//! coordinate system is right-handed with `+Y` up and `-Z` forward, and clip
//! space depth runs from 0 to 1.

/// Tolerance used by approximate comparisons.
pub const EPSILON: f32 = 1e-5;

pub use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, PI, TAU};

/// Degrees to radians factor.
pub const DEG_TO_RAD: f32 = PI / 180.0;
/// Radians to degrees factor.
pub const RAD_TO_DEG: f32 = 180.0 / PI;

pub mod color;
pub mod matrix;
pub mod quaternion;
pub mod rect;
pub mod vector;

pub use self::color::Color;
pub use self::matrix::{Mat3, Mat4};
pub use self::quaternion::Quaternion;
pub use self::rect::Rect;
pub use self::vector::{Vec2, Vec3, Vec4};

/// Converts degrees to radians.
#[inline]
pub fn radians(degrees: f32) -> f32 {
    degrees * DEG_TO_RAD
}

/// Converts radians to degrees.
#[inline]
pub fn degrees(radians: f32) -> f32 {
    radians * RAD_TO_DEG
}

/// Clamps `value` to `[min, max]`.
///
/// ```
/// use nova_core::math::clamp;
/// assert_eq!(clamp(3, 0, 2), 2);
/// assert_eq!(clamp(-0.5, 0.0, 1.0), 0.0);
/// ```
#[inline]
pub fn clamp<T: PartialOrd>(value: T, min: T, max: T) -> T {
    if value < min {
        min
    } else if value > max {
        max
    } else {
        value
    }
}

/// Clamps to `[0, 1]`.
#[inline]
pub fn saturate(value: f32) -> f32 {
    clamp(value, 0.0, 1.0)
}

/// Unclamped linear interpolation.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Remaps `value` from `[from_min, from_max]` to `[to_min, to_max]`.
///
/// ```
/// use nova_core::math::map_range;
/// assert_eq!(map_range(5.0, 0.0, 10.0, 100.0, 200.0), 150.0);
/// ```
#[inline]
pub fn map_range(value: f32, from_min: f32, from_max: f32, to_min: f32, to_max: f32) -> f32 {
    to_min + (to_max - to_min) * ((value - from_min) / (from_max - from_min))
}

/// Hermite interpolation of `value` between `min` and `max`.
#[inline]
pub fn smoothstep(value: f32, min: f32, max: f32) -> f32 {
    let t = saturate((value - min) / (max - min));
    t * t * (3.0 - 2.0 * t)
}

/// `sin(angle)` remapped from `[-1, 1]` to `[min, max]`.
#[inline]
pub fn mapped_sin(angle: f32, min: f32, max: f32) -> f32 {
    map_range(angle.sin(), -1.0, 1.0, min, max)
}

/// `cos(angle)` remapped from `[-1, 1]` to `[min, max]`.
#[inline]
pub fn mapped_cos(angle: f32, min: f32, max: f32) -> f32 {
    map_range(angle.cos(), -1.0, 1.0, min, max)
}

/// `-1`, `0` or `1`. Unlike [`f32::signum`], zero maps to zero.
#[inline]
pub fn sign(value: f32) -> f32 {
    if value > 0.0 {
        1.0
    } else if value < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Moves `current` toward `target` by at most `max_delta`.
#[inline]
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + sign(target - current) * max_delta
    }
}

/// Critically damped spring toward `target`.
///
/// `velocity` carries state between calls. The result never overshoots
/// `target`, and the step is limited by `max_speed`.
pub fn smooth_damp(
    current: f32,
    target: f32,
    velocity: &mut f32,
    smooth_time: f32,
    delta: f32,
    max_speed: f32,
) -> f32 {
    let smooth_time = smooth_time.max(1e-4);
    let omega = 2.0 / smooth_time;
    let x = omega * delta;
    let exp = 1.0 / (1.0 + x + 0.48 * x * x + 0.235 * x * x * x);

    let max_change = max_speed * smooth_time;
    let change = clamp(current - target, -max_change, max_change);
    let clamped_target = current - change;

    let temp = (*velocity + omega * change) * delta;
    *velocity = (*velocity - omega * temp) * exp;
    let mut output = clamped_target + (change + temp) * exp;

    if (target - current > 0.0) == (output > target) {
        output = target;
        *velocity = if delta > 0.0 { (output - target) / delta } else { 0.0 };
    }
    output
}

/// Folds a value that left `[min, max]` back in from the opposite side.
#[inline]
pub fn wrap(value: f32, min: f32, max: f32) -> f32 {
    if value < min {
        max - (min - value).abs()
    } else if value > max {
        min + (value - max).abs()
    } else {
        value
    }
}

/// `true` when `value` lies in `[min, max]`.
#[inline]
pub fn is_between(value: f32, min: f32, max: f32) -> bool {
    value >= min && value <= max
}

/// Approximate equality with a caller-chosen tolerance.
#[inline]
pub fn approx_eq_eps(a: f32, b: f32, epsilon: f32) -> bool {
    (a - b).abs() < epsilon
}

/// Approximate equality using [`EPSILON`].
#[inline]
pub fn approx_eq(a: f32, b: f32) -> bool {
    approx_eq_eps(a, b, EPSILON)
}

/// Smallest power of two greater than or equal to `value` (1 for 0).
#[inline]
pub fn nearest_power_of_two(value: u32) -> u32 {
    value.max(1).next_power_of_two()
}
