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

//! Unit quaternions for 3D rotation.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::ops::{Mul, MulAssign};

use super::{Vec3, DEG_TO_RAD, EPSILON};

/// A rotation stored as `(x, y, z, w)` with `w` the scalar part.
///
/// Quaternions produced by the constructors are normalized. Composition
/// follows the matrix convention: `a * b` applies `b` first, then `a`.
#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[repr(C)]
pub struct Quaternion {
    /// Vector part, x.
    pub x: f32,
    /// Vector part, y.
    pub y: f32,
    /// Vector part, z.
    pub z: f32,
    /// Scalar part.
    pub w: f32,
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Quaternion {
    /// No rotation.
    pub const IDENTITY: Self = Self::new(0.0, 0.0, 0.0, 1.0);

    /// Raw constructor. The result is not normalized.
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Rotation of `angle` radians around `axis`.
    pub fn from_axis_angle(axis: Vec3, angle: f32) -> Self {
        let axis = axis.normalize();
        let (s, c) = (angle * 0.5).sin_cos();
        Self::new(axis.x * s, axis.y * s, axis.z * s, c)
    }

    /// Rotation from Euler angles in radians.
    ///
    /// `euler.x` turns around X, `euler.y` around Y and `euler.z` around Z.
    /// The rotations are applied X first, then Y, then Z.
    pub fn from_euler(euler: Vec3) -> Self {
        let (sx, cx) = (euler.x * 0.5).sin_cos();
        let (sy, cy) = (euler.y * 0.5).sin_cos();
        let (sz, cz) = (euler.z * 0.5).sin_cos();
        Self::new(
            sx * cy * cz - cx * sy * sz,
            cx * sy * cz + sx * cy * sz,
            cx * cy * sz - sx * sy * cz,
            cx * cy * cz + sx * sy * sz,
        )
    }

    /// Same as [`Quaternion::from_euler`] with angles in degrees.
    pub fn from_euler_degrees(euler: Vec3) -> Self {
        Self::from_euler(euler * DEG_TO_RAD)
    }

    /// Converts back to Euler angles in radians, inverse of [`Quaternion::from_euler`].
    pub fn to_euler(self) -> Vec3 {
        let q = self.normalize();
        let sin_x_cos_y = 2.0 * (q.w * q.x + q.y * q.z);
        let cos_x_cos_y = 1.0 - 2.0 * (q.x * q.x + q.y * q.y);
        let x = sin_x_cos_y.atan2(cos_x_cos_y);

        let sin_y = 2.0 * (q.w * q.y - q.z * q.x);
        let y = if sin_y.abs() >= 1.0 {
            super::FRAC_PI_2.copysign(sin_y)
        } else {
            sin_y.asin()
        };

        let sin_z_cos_y = 2.0 * (q.w * q.z + q.x * q.y);
        let cos_z_cos_y = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
        let z = sin_z_cos_y.atan2(cos_z_cos_y);
        Vec3::new(x, y, z)
    }

    /// Four-dimensional dot product.
    #[inline]
    pub fn dot(self, rhs: Self) -> f32 {
        self.x * rhs.x + self.y * rhs.y + self.z * rhs.z + self.w * rhs.w
    }

    /// Squared norm.
    #[inline]
    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    /// Unit-length copy; a degenerate quaternion becomes the identity.
    pub fn normalize(self) -> Self {
        let len_sq = self.length_squared();
        if len_sq > EPSILON * EPSILON {
            let inv = 1.0 / len_sq.sqrt();
            Self::new(self.x * inv, self.y * inv, self.z * inv, self.w * inv)
        } else {
            Self::IDENTITY
        }
    }

    /// Negated vector part.
    #[inline]
    pub fn conjugate(self) -> Self {
        Self::new(-self.x, -self.y, -self.z, self.w)
    }

    /// Multiplicative inverse.
    pub fn inverse(self) -> Self {
        let len_sq = self.length_squared();
        if len_sq <= EPSILON * EPSILON {
            return Self::IDENTITY;
        }
        let c = self.conjugate();
        let inv = 1.0 / len_sq;
        Self::new(c.x * inv, c.y * inv, c.z * inv, c.w * inv)
    }

    /// Rotates a vector.
    pub fn rotate_vec3(self, v: Vec3) -> Vec3 {
        let u = Vec3::new(self.x, self.y, self.z);
        let t = u.cross(v) * 2.0;
        v + t * self.w + u.cross(t)
    }

    /// Spherical interpolation along the shortest arc.
    pub fn slerp(start: Self, end: Self, t: f32) -> Self {
        let t = t.clamp(0.0, 1.0);
        let mut end = end;
        let mut cos_theta = start.dot(end);
        if cos_theta < 0.0 {
            end = Self::new(-end.x, -end.y, -end.z, -end.w);
            cos_theta = -cos_theta;
        }

        if cos_theta > 1.0 - EPSILON {
            // Nearly parallel: fall back to normalized lerp.
            return Self::new(
                start.x + (end.x - start.x) * t,
                start.y + (end.y - start.y) * t,
                start.z + (end.z - start.z) * t,
                start.w + (end.w - start.w) * t,
            )
            .normalize();
        }

        let theta = cos_theta.acos();
        let sin_theta = theta.sin();
        let a = ((1.0 - t) * theta).sin() / sin_theta;
        let b = (t * theta).sin() / sin_theta;
        Self::new(
            start.x * a + end.x * b,
            start.y * a + end.y * b,
            start.z * a + end.z * b,
            start.w * a + end.w * b,
        )
    }

    /// Local forward axis (`-Z`) after rotation.
    #[inline]
    pub fn forward(self) -> Vec3 {
        self.rotate_vec3(Vec3::FORWARD)
    }

    /// Local right axis (`+X`) after rotation.
    #[inline]
    pub fn right(self) -> Vec3 {
        self.rotate_vec3(Vec3::RIGHT)
    }

    /// Local up axis (`+Y`) after rotation.
    #[inline]
    pub fn up(self) -> Vec3 {
        self.rotate_vec3(Vec3::UP)
    }

    /// Component-wise comparison within `epsilon`, treating `q` and `-q` as equal.
    pub fn approx_eq(self, other: Self, epsilon: f32) -> bool {
        (self.dot(other).abs() - 1.0).abs() <= epsilon
    }
}

impl Mul for Quaternion {
    type Output = Self;

    /// Hamilton product.
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.w * rhs.x + self.x * rhs.w + self.y * rhs.z - self.z * rhs.y,
            self.w * rhs.y - self.x * rhs.z + self.y * rhs.w + self.z * rhs.x,
            self.w * rhs.z + self.x * rhs.y - self.y * rhs.x + self.z * rhs.w,
            self.w * rhs.w - self.x * rhs.x - self.y * rhs.y - self.z * rhs.z,
        )
    }
}

impl MulAssign for Quaternion {
    fn mul_assign(&mut self, rhs: Self) {
        *self = *self * rhs;
    }
}

impl Mul<Vec3> for Quaternion {
    type Output = Vec3;

    fn mul(self, rhs: Vec3) -> Vec3 {
        self.rotate_vec3(rhs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{FRAC_PI_2, PI};
    use approx::assert_relative_eq;

    fn assert_vec3_eq(a: Vec3, b: Vec3) {
        assert!(a.approx_eq(b, 1e-5), "{a:?} != {b:?}");
    }

    #[test]
    fn test_axis_angle_rotates_vectors() {
        let q = Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2);
        assert_vec3_eq(q * Vec3::X, Vec3::new(0.0, 0.0, -1.0));
        assert_vec3_eq(q * Vec3::FORWARD, Vec3::LEFT);
    }

    #[test]
    fn test_euler_matches_axis_composition() {
        let euler = Vec3::new(0.3, -1.1, 2.0);
        let expected = Quaternion::from_axis_angle(Vec3::Z, euler.z)
            * Quaternion::from_axis_angle(Vec3::Y, euler.y)
            * Quaternion::from_axis_angle(Vec3::X, euler.x);
        assert!(Quaternion::from_euler(euler).approx_eq(expected, 1e-5));
    }

    #[test]
    fn test_euler_round_trip() {
        let euler = Vec3::new(0.4, 0.2, -0.9);
        assert_vec3_eq(Quaternion::from_euler(euler).to_euler(), euler);
    }

    #[test]
    fn test_degrees_variant() {
        let a = Quaternion::from_euler_degrees(Vec3::new(0.0, 90.0, 0.0));
        let b = Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2);
        assert!(a.approx_eq(b, 1e-5));
    }

    #[test]
    fn test_inverse_undoes_rotation() {
        let q = Quaternion::from_axis_angle(Vec3::new(1.0, 1.0, 0.0), 1.2);
        let v = Vec3::new(0.5, -2.0, 3.0);
        assert_vec3_eq(q.inverse() * (q * v), v);
        assert!((q * q.inverse()).approx_eq(Quaternion::IDENTITY, 1e-5));
    }

    #[test]
    fn test_slerp_halfway() {
        let a = Quaternion::IDENTITY;
        let b = Quaternion::from_axis_angle(Vec3::Z, PI / 2.0);
        let mid = Quaternion::slerp(a, b, 0.5);
        assert!(mid.approx_eq(Quaternion::from_axis_angle(Vec3::Z, PI / 4.0), 1e-5));
        assert_relative_eq!(mid.length_squared(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_basis_vectors() {
        let q = Quaternion::IDENTITY;
        assert_vec3_eq(q.forward(), Vec3::FORWARD);
        assert_vec3_eq(q.right(), Vec3::RIGHT);
        assert_vec3_eq(q.up(), Vec3::UP);
    }
}
