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

//! Column-major 3x3 and 4x4 matrices.
//!
//! Vectors are columns, so `a * b * v` applies `b` before `a`. Projection
//! helpers target a right-handed view space and a `[0, 1]` depth range,
//! which is what wgpu expects.

use bincode::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut, Mul};

use super::{Quaternion, Vec3, Vec4, EPSILON};

/// A 3x3 matrix, mainly the rotation/scale block of a [`Mat4`].
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat3 {
    /// Columns, `cols[0]` first.
    pub cols: [Vec3; 3],
}

impl Mat3 {
    /// Identity.
    pub const IDENTITY: Self = Self {
        cols: [Vec3::X, Vec3::Y, Vec3::Z],
    };

    /// Builds from three columns.
    #[inline]
    pub const fn from_cols(c0: Vec3, c1: Vec3, c2: Vec3) -> Self {
        Self { cols: [c0, c1, c2] }
    }

    /// Upper-left 3x3 block of a [`Mat4`].
    pub fn from_mat4(m: &Mat4) -> Self {
        Self::from_cols(
            m.cols[0].truncate(),
            m.cols[1].truncate(),
            m.cols[2].truncate(),
        )
    }

    /// Rotation matrix of a quaternion.
    pub fn from_quat(q: Quaternion) -> Self {
        Self::from_mat4(&Mat4::from_quat(q))
    }

    /// Swaps rows and columns.
    pub fn transpose(&self) -> Self {
        let [a, b, c] = self.cols;
        Self::from_cols(
            Vec3::new(a.x, b.x, c.x),
            Vec3::new(a.y, b.y, c.y),
            Vec3::new(a.z, b.z, c.z),
        )
    }

    /// Determinant, the scalar triple product of the columns.
    pub fn determinant(&self) -> f32 {
        self.cols[0].dot(self.cols[1].cross(self.cols[2]))
    }

    /// Inverse, or `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Self> {
        let det = self.determinant();
        if det.abs() < EPSILON * EPSILON {
            return None;
        }
        let [a, b, c] = self.cols;
        let inv_det = 1.0 / det;
        // Rows of the inverse are the pairwise cross products.
        let rows = Self::from_cols(
            b.cross(c) * inv_det,
            c.cross(a) * inv_det,
            a.cross(b) * inv_det,
        );
        Some(rows.transpose())
    }

    /// Extends to a 4x4 matrix with no translation.
    pub fn to_mat4(&self) -> Mat4 {
        Mat4::from_cols(
            self.cols[0].extend(0.0),
            self.cols[1].extend(0.0),
            self.cols[2].extend(0.0),
            Vec4::W,
        )
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;
    fn mul(self, v: Vec3) -> Vec3 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z
    }
}

impl Mul for Mat3 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::from_cols(self * rhs.cols[0], self * rhs.cols[1], self * rhs.cols[2])
    }
}

/// A 4x4 affine or projective transform.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    bytemuck::Pod,
    bytemuck::Zeroable,
    Serialize,
    Deserialize,
    Encode,
    Decode,
)]
#[repr(C)]
pub struct Mat4 {
    /// Columns, `cols[3]` holds the translation.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// Identity.
    pub const IDENTITY: Self = Self {
        cols: [Vec4::X, Vec4::Y, Vec4::Z, Vec4::W],
    };

    /// All zeros.
    pub const ZERO: Self = Self {
        cols: [Vec4::ZERO; 4],
    };

    /// Builds from four columns.
    #[inline]
    pub const fn from_cols(c0: Vec4, c1: Vec4, c2: Vec4, c3: Vec4) -> Self {
        Self {
            cols: [c0, c1, c2, c3],
        }
    }

    /// Row `index` as a vector.
    #[inline]
    pub fn row(&self, index: usize) -> Vec4 {
        Vec4::new(
            self.cols[0][index],
            self.cols[1][index],
            self.cols[2][index],
            self.cols[3][index],
        )
    }

    /// Translation matrix.
    pub fn from_translation(t: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, t.extend(1.0))
    }

    /// Non-uniform scale matrix.
    pub fn from_scale(s: Vec3) -> Self {
        Self::from_cols(
            Vec4::new(s.x, 0.0, 0.0, 0.0),
            Vec4::new(0.0, s.y, 0.0, 0.0),
            Vec4::new(0.0, 0.0, s.z, 0.0),
            Vec4::W,
        )
    }

    /// Rotation matrix of a quaternion (normalized first).
    pub fn from_quat(q: Quaternion) -> Self {
        let q = q.normalize();
        let (x2, y2, z2) = (q.x + q.x, q.y + q.y, q.z + q.z);
        let (xx, xy, xz) = (q.x * x2, q.x * y2, q.x * z2);
        let (yy, yz, zz) = (q.y * y2, q.y * z2, q.z * z2);
        let (wx, wy, wz) = (q.w * x2, q.w * y2, q.w * z2);
        Self::from_cols(
            Vec4::new(1.0 - (yy + zz), xy + wz, xz - wy, 0.0),
            Vec4::new(xy - wz, 1.0 - (xx + zz), yz + wx, 0.0),
            Vec4::new(xz + wy, yz - wx, 1.0 - (xx + yy), 0.0),
            Vec4::W,
        )
    }

    /// Scale, then rotate, then translate.
    pub fn from_trs(translation: Vec3, rotation: Quaternion, scale: Vec3) -> Self {
        let r = Self::from_quat(rotation);
        Self::from_cols(
            r.cols[0] * scale.x,
            r.cols[1] * scale.y,
            r.cols[2] * scale.z,
            translation.extend(1.0),
        )
    }

    /// Right-handed perspective projection with `[0, 1]` depth.
    ///
    /// `fov_y` is the full vertical field of view in radians.
    pub fn perspective_rh_zo(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        let scale = 1.0 / (fov_y * 0.5).tan();
        let m22 = far / (near - far);
        let m32 = -(far * near) / (far - near);
        Self::from_cols(
            Vec4::new(scale / aspect, 0.0, 0.0, 0.0),
            Vec4::new(0.0, scale, 0.0, 0.0),
            Vec4::new(0.0, 0.0, m22, -1.0),
            Vec4::new(0.0, 0.0, m32, 0.0),
        )
    }

    /// Right-handed orthographic projection with `[0, 1]` depth.
    pub fn orthographic_rh_zo(
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) -> Self {
        let rcp_w = 1.0 / (right - left);
        let rcp_h = 1.0 / (top - bottom);
        let rcp_d = 1.0 / (near - far);
        Self::from_cols(
            Vec4::new(2.0 * rcp_w, 0.0, 0.0, 0.0),
            Vec4::new(0.0, 2.0 * rcp_h, 0.0, 0.0),
            Vec4::new(0.0, 0.0, rcp_d, 0.0),
            Vec4::new(
                -(right + left) * rcp_w,
                -(top + bottom) * rcp_h,
                near * rcp_d,
                1.0,
            ),
        )
    }

    /// Right-handed view matrix looking from `eye` toward `target`.
    ///
    /// `None` when `eye == target` or `up` is parallel to the view direction.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Self> {
        let f = (target - eye).normalize();
        let s = f.cross(up).normalize();
        if f == Vec3::ZERO || s == Vec3::ZERO {
            return None;
        }
        let u = s.cross(f);
        Some(Self::from_cols(
            Vec4::new(s.x, u.x, -f.x, 0.0),
            Vec4::new(s.y, u.y, -f.y, 0.0),
            Vec4::new(s.z, u.z, -f.z, 0.0),
            Vec4::new(-s.dot(eye), -u.dot(eye), f.dot(eye), 1.0),
        ))
    }

    /// Translation part.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.cols[3].truncate()
    }

    /// Swaps rows and columns.
    pub fn transpose(&self) -> Self {
        Self::from_cols(self.row(0), self.row(1), self.row(2), self.row(3))
    }

    fn rows(&self) -> [[f32; 4]; 4] {
        [
            self.row(0).to_array(),
            self.row(1).to_array(),
            self.row(2).to_array(),
            self.row(3).to_array(),
        ]
    }

    /// Determinant, by Gaussian elimination.
    pub fn determinant(&self) -> f32 {
        let mut a = self.rows();
        let mut det = 1.0;
        for col in 0..4 {
            let pivot = (col..4)
                .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
                .unwrap_or(col);
            if a[pivot][col] == 0.0 {
                return 0.0;
            }
            if pivot != col {
                a.swap(pivot, col);
                det = -det;
            }
            det *= a[col][col];
            for row in col + 1..4 {
                let factor = a[row][col] / a[col][col];
                for k in col..4 {
                    a[row][k] -= factor * a[col][k];
                }
            }
        }
        det
    }

    /// Inverse by Gauss-Jordan elimination, or `None` when singular.
    pub fn inverse(&self) -> Option<Self> {
        let mut a = self.rows();
        let mut inv = Self::IDENTITY.rows();
        for col in 0..4 {
            let pivot = (col..4)
                .max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))
                .unwrap_or(col);
            if a[pivot][col].abs() < 1e-12 {
                return None;
            }
            a.swap(pivot, col);
            inv.swap(pivot, col);

            let scale = 1.0 / a[col][col];
            for k in 0..4 {
                a[col][k] *= scale;
                inv[col][k] *= scale;
            }
            for row in 0..4 {
                if row == col {
                    continue;
                }
                let factor = a[row][col];
                if factor == 0.0 {
                    continue;
                }
                for k in 0..4 {
                    a[row][k] -= factor * a[col][k];
                    inv[row][k] -= factor * inv[col][k];
                }
            }
        }
        let r = inv;
        Some(Self::from_cols(
            Vec4::new(r[0][0], r[1][0], r[2][0], r[3][0]),
            Vec4::new(r[0][1], r[1][1], r[2][1], r[3][1]),
            Vec4::new(r[0][2], r[1][2], r[2][2], r[3][2]),
            Vec4::new(r[0][3], r[1][3], r[2][3], r[3][3]),
        ))
    }

    /// Matrix for transforming normals: `transpose(inverse(mat3(self)))`.
    ///
    /// Falls back to the identity for degenerate (zero-scale) transforms.
    pub fn normal_matrix(&self) -> Mat3 {
        Mat3::from_mat4(self)
            .inverse()
            .map(|m| m.transpose())
            .unwrap_or(Mat3::IDENTITY)
    }

    /// Transforms a point (w = 1).
    pub fn transform_point3(&self, p: Vec3) -> Vec3 {
        (*self * p.extend(1.0)).truncate()
    }

    /// Transforms a direction (w = 0).
    pub fn transform_vector3(&self, v: Vec3) -> Vec3 {
        (*self * v.extend(0.0)).truncate()
    }

    /// Columns as nested arrays, ready for GPU upload.
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        [
            self.cols[0].to_array(),
            self.cols[1].to_array(),
            self.cols[2].to_array(),
            self.cols[3].to_array(),
        ]
    }

    /// `true` when every element is within `epsilon` of `other`.
    pub fn approx_eq(&self, other: &Self, epsilon: f32) -> bool {
        self.cols
            .iter()
            .zip(other.cols.iter())
            .all(|(a, b)| a.approx_eq(*b, epsilon))
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;
    fn mul(self, v: Vec4) -> Vec4 {
        self.cols[0] * v.x + self.cols[1] * v.y + self.cols[2] * v.z + self.cols[3] * v.w
    }
}

impl Mul for Mat4 {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        Self::from_cols(
            self * rhs.cols[0],
            self * rhs.cols[1],
            self * rhs.cols[2],
            self * rhs.cols[3],
        )
    }
}

impl Index<usize> for Mat4 {
    type Output = Vec4;
    fn index(&self, index: usize) -> &Vec4 {
        &self.cols[index]
    }
}

impl IndexMut<usize> for Mat4 {
    fn index_mut(&mut self, index: usize) -> &mut Vec4 {
        &mut self.cols[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::{radians, FRAC_PI_2};
    use approx::assert_relative_eq;

    #[test]
    fn test_trs_applies_scale_then_rotation_then_translation() {
        let m = Mat4::from_trs(
            Vec3::new(10.0, 0.0, 0.0),
            Quaternion::from_axis_angle(Vec3::Z, FRAC_PI_2),
            Vec3::splat(2.0),
        );
        let p = m.transform_point3(Vec3::X);
        assert!(p.approx_eq(Vec3::new(10.0, 2.0, 0.0), 1e-5), "{p:?}");
        let composed = Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0))
            * Mat4::from_quat(Quaternion::from_axis_angle(Vec3::Z, FRAC_PI_2))
            * Mat4::from_scale(Vec3::splat(2.0));
        assert!(m.approx_eq(&composed, 1e-5));
    }

    #[test]
    fn test_inverse_of_affine_transform() {
        let m = Mat4::from_trs(
            Vec3::new(1.0, -2.0, 3.0),
            Quaternion::from_euler(Vec3::new(0.2, 0.7, -0.4)),
            Vec3::new(1.0, 2.0, 0.5),
        );
        let inv = m.inverse().expect("invertible");
        assert!((m * inv).approx_eq(&Mat4::IDENTITY, 1e-4));
        assert_relative_eq!(m.determinant(), 1.0, epsilon = 1e-4);
    }

    #[test]
    fn test_singular_matrix_has_no_inverse() {
        assert!(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)).inverse().is_none());
        assert_eq!(Mat4::ZERO.determinant(), 0.0);
    }

    #[test]
    fn test_perspective_maps_near_and_far_to_unit_depth() {
        let p = Mat4::perspective_rh_zo(radians(60.0), 1.5, 0.1, 100.0);
        let near = p * Vec4::new(0.0, 0.0, -0.1, 1.0);
        let far = p * Vec4::new(0.0, 0.0, -100.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_orthographic_maps_box_to_clip_space() {
        let o = Mat4::orthographic_rh_zo(-2.0, 2.0, -1.0, 1.0, 0.0, 10.0);
        let corner = o.transform_point3(Vec3::new(2.0, 1.0, -10.0));
        assert!(corner.approx_eq(Vec3::new(1.0, 1.0, 1.0), 1e-5), "{corner:?}");
    }

    #[test]
    fn test_look_at_moves_target_onto_negative_z() {
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, 5.0), Vec3::ZERO, Vec3::UP)
            .expect("valid look-at");
        let p = view.transform_point3(Vec3::ZERO);
        assert!(p.approx_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));
        assert!(Mat4::look_at_rh(Vec3::ZERO, Vec3::ZERO, Vec3::UP).is_none());
    }

    #[test]
    fn test_normal_matrix_undoes_non_uniform_scale() {
        let m = Mat4::from_scale(Vec3::new(2.0, 1.0, 1.0));
        let n = m.normal_matrix() * Vec3::new(1.0, 1.0, 0.0);
        assert!(n.approx_eq(Vec3::new(0.5, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn test_mat3_inverse_and_transpose() {
        let m = Mat3::from_quat(Quaternion::from_axis_angle(Vec3::Y, 0.8));
        let inv = m.inverse().expect("rotation is invertible");
        assert!((inv.cols[0] - m.transpose().cols[0]).length() < 1e-5);
        assert!((m * inv * Vec3::X).approx_eq(Vec3::X, 1e-5));
    }
}
