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

use nova_core::math::{Mat3, Mat4, Quaternion, Vec3};

/// Position, rotation and scale of an entity relative to its parent.
///
/// The local matrix is recomputed on every mutation, so reading it is free.
/// `version()` increases on each mutation, which lets callers detect change
/// without comparing matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    position: Vec3,
    rotation: Quaternion,
    scale: Vec3,
    local: Mat4,
    version: u64,
}

impl Default for Transform {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Quaternion::IDENTITY, Vec3::ONE)
    }
}

impl Transform {
    /// Builds a transform. The rotation is normalized.
    pub fn new(position: Vec3, rotation: Quaternion, scale: Vec3) -> Self {
        let rotation = rotation.normalize();
        Self {
            position,
            rotation,
            scale,
            local: Mat4::from_trs(position, rotation, scale),
            version: 0,
        }
    }

    /// A pure translation.
    pub fn from_position(position: Vec3) -> Self {
        Self::new(position, Quaternion::IDENTITY, Vec3::ONE)
    }

    fn touch(&mut self) {
        self.local = Mat4::from_trs(self.position, self.rotation, self.scale);
        self.version += 1;
    }

    /// Local position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Local rotation.
    pub fn rotation(&self) -> Quaternion {
        self.rotation
    }

    /// Local scale.
    pub fn scale(&self) -> Vec3 {
        self.scale
    }

    /// Mutation counter.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replaces the local position.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.touch();
    }

    /// Replaces the local rotation, normalized.
    pub fn set_rotation(&mut self, rotation: Quaternion) {
        self.rotation = rotation.normalize();
        self.touch();
    }

    /// Sets the rotation from Euler angles in degrees.
    pub fn set_euler_degrees(&mut self, euler: Vec3) {
        self.set_rotation(Quaternion::from_euler_degrees(euler));
    }

    /// Replaces the local scale.
    pub fn set_scale(&mut self, scale: Vec3) {
        self.scale = scale;
        self.touch();
    }

    /// Moves by `delta` in parent space.
    pub fn translate(&mut self, delta: Vec3) {
        self.position += delta;
        self.touch();
    }

    /// Applies `rotation` on top of the current one, in parent space.
    pub fn rotate(&mut self, rotation: Quaternion) {
        self.rotation = (rotation * self.rotation).normalize();
        self.touch();
    }

    /// Orbits `angle` radians around the line through `point` along `axis`.
    /// Orientation turns with the orbit.
    pub fn rotate_around(&mut self, point: Vec3, axis: Vec3, angle: f32) {
        let q = Quaternion::from_axis_angle(axis, angle);
        self.position = point + q.rotate_vec3(self.position - point);
        self.rotation = (q * self.rotation).normalize();
        self.touch();
    }

    /// Multiplies the scale component-wise.
    pub fn scale_by(&mut self, factor: Vec3) {
        self.scale = self.scale * factor;
        self.touch();
    }

    /// Local -Z direction.
    pub fn forward(&self) -> Vec3 {
        self.rotation.forward()
    }

    /// Local +X direction.
    pub fn right(&self) -> Vec3 {
        self.rotation.right()
    }

    /// Local +Y direction.
    pub fn up(&self) -> Vec3 {
        self.rotation.up()
    }

    /// Translation * rotation * scale.
    pub fn local_matrix(&self) -> Mat4 {
        self.local
    }

    /// Matrix for transforming normals by the local transform.
    pub fn normal_matrix(&self) -> Mat3 {
        self.local.normal_matrix()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nova_core::math::FRAC_PI_2;

    #[test]
    fn test_defaults_to_identity() {
        let t = Transform::default();
        assert_eq!(t.local_matrix(), Mat4::IDENTITY);
        assert_eq!(t.version(), 0);
        assert!(t.forward().approx_eq(Vec3::FORWARD, 1e-6));
    }

    #[test]
    fn test_every_mutation_bumps_version_and_matrix() {
        let mut t = Transform::default();
        t.set_position(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(t.version(), 1);
        assert!(t
            .local_matrix()
            .translation()
            .approx_eq(Vec3::new(1.0, 2.0, 3.0), 1e-6));
        t.translate(Vec3::X);
        t.scale_by(Vec3::splat(2.0));
        t.rotate(Quaternion::from_axis_angle(Vec3::Y, FRAC_PI_2));
        assert_eq!(t.version(), 4);
        assert!(t.position().approx_eq(Vec3::new(2.0, 2.0, 3.0), 1e-6));
        assert!(t.scale().approx_eq(Vec3::splat(2.0), 1e-6));
    }

    #[test]
    fn test_yaw_turns_forward_to_the_left() {
        let mut t = Transform::default();
        t.rotate(Quaternion::from_axis_angle(Vec3::UP, FRAC_PI_2));
        assert!(t.forward().approx_eq(Vec3::LEFT, 1e-5));
        assert!(t.right().approx_eq(Vec3::FORWARD, 1e-5));
    }

    #[test]
    fn test_rotate_around_orbits_the_pivot() {
        let mut t = Transform::from_position(Vec3::new(2.0, 0.0, 0.0));
        t.rotate_around(Vec3::new(1.0, 0.0, 0.0), Vec3::UP, FRAC_PI_2);
        assert!(t.position().approx_eq(Vec3::new(1.0, 0.0, -1.0), 1e-5));
    }

    #[test]
    fn test_local_matrix_applies_scale_then_rotation_then_translation() {
        let t = Transform::new(
            Vec3::new(0.0, 0.0, -5.0),
            Quaternion::from_axis_angle(Vec3::UP, FRAC_PI_2),
            Vec3::splat(2.0),
        );
        let p = t.local_matrix().transform_point3(Vec3::X);
        assert!(p.approx_eq(Vec3::new(0.0, 0.0, -7.0), 1e-5));
    }
}
