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
use nova_core::math::{radians, Color, Mat4, Vec3};
use nova_core::renderer::ViewInfo;

/// Projection model of a [`Camera`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionMode {
    /// Perspective with a vertical field of view.
    #[default]
    Perspective,
    /// Orthographic with a fixed half-height.
    Orthographic,
}

/// A view into the scene.
///
/// The camera looks down the owner's -Z axis. Its view matrix is refreshed
/// from the owner's world transform in `on_pre_render`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Projection model.
    pub mode: ProjectionMode,
    /// Vertical field of view in degrees (perspective).
    pub fov_degrees: f32,
    /// Near plane distance.
    pub near: f32,
    /// Far plane distance.
    pub far: f32,
    /// Half of the visible height in world units (orthographic).
    pub ortho_size: f32,
    /// Background color.
    pub clear_color: Color,
    /// Viewport width in pixels.
    pub viewport_width: u32,
    /// Viewport height in pixels.
    pub viewport_height: u32,
    view: Mat4,
    position: Vec3,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            mode: ProjectionMode::Perspective,
            fov_degrees: 45.0,
            near: 0.1,
            far: 1000.0,
            ortho_size: 5.0,
            clear_color: Color::BLACK,
            viewport_width: 1280,
            viewport_height: 720,
            view: Mat4::IDENTITY,
            position: Vec3::ZERO,
        }
    }
}

impl Camera {
    /// A perspective camera.
    pub fn perspective(fov_degrees: f32, near: f32, far: f32) -> Self {
        Self {
            fov_degrees,
            near,
            far,
            ..Default::default()
        }
    }

    /// An orthographic camera showing `2 * ortho_size` units vertically.
    pub fn orthographic(ortho_size: f32, near: f32, far: f32) -> Self {
        Self {
            mode: ProjectionMode::Orthographic,
            ortho_size,
            near,
            far,
            ..Default::default()
        }
    }

    /// Updates the viewport size.
    pub fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport_width = width;
        self.viewport_height = height;
    }

    /// Width over height, 1 for a degenerate viewport.
    pub fn aspect_ratio(&self) -> f32 {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            1.0
        } else {
            self.viewport_width as f32 / self.viewport_height as f32
        }
    }

    /// Projection for the camera's viewport.
    pub fn projection(&self) -> Mat4 {
        self.projection_for_aspect(self.aspect_ratio())
    }

    /// Projection for an explicit aspect ratio.
    pub fn projection_for_aspect(&self, aspect: f32) -> Mat4 {
        match self.mode {
            ProjectionMode::Perspective => {
                Mat4::perspective_rh_zo(radians(self.fov_degrees), aspect, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                let half_h = self.ortho_size;
                let half_w = half_h * aspect;
                Mat4::orthographic_rh_zo(-half_w, half_w, -half_h, half_h, self.near, self.far)
            }
        }
    }

    /// View matrix computed during the last `on_pre_render`.
    pub fn view_matrix(&self) -> Mat4 {
        self.view
    }

    /// `projection * view`.
    pub fn view_projection(&self) -> Mat4 {
        self.projection() * self.view
    }

    /// Recomputes the view from the owner's world matrix.
    pub fn update_view(&mut self, world: &Mat4) {
        self.position = world.translation();
        self.view = world.inverse().unwrap_or_else(|| {
            log::warn!("Camera: owner world matrix is singular, using identity view");
            Mat4::IDENTITY
        });
    }

    /// Frame view data from the cached view.
    pub fn view_info(&self) -> ViewInfo {
        ViewInfo::new(self.view, self.projection(), self.position)
            .with_clear_color(self.clear_color)
    }

    /// Frame view data for an owner at `world`, using `aspect` instead of the viewport.
    pub fn view_info_for(&self, world: &Mat4, aspect: f32) -> ViewInfo {
        let view = world.inverse().unwrap_or(Mat4::IDENTITY);
        ViewInfo::new(view, self.projection_for_aspect(aspect), world.translation())
            .with_clear_color(self.clear_color)
    }
}

impl Component for Camera {
    fn name(&self) -> &str {
        "Camera"
    }

    fn flags(&self) -> ComponentFlags {
        ComponentFlags::DISALLOW_MULTIPLE_IN_ENTITY
    }

    fn on_init(&mut self, ctx: &mut ComponentContext) {
        let world = ctx.world_matrix();
        self.update_view(&world);
    }

    fn on_pre_render(&mut self, ctx: &mut ComponentContext) {
        let world = ctx.world_matrix();
        self.update_view(&world);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cam = Camera::default();
        assert_eq!(cam.fov_degrees, 45.0);
        assert_eq!(cam.near, 0.1);
        assert_eq!(cam.far, 1000.0);
        assert_eq!(cam.clear_color, Color::BLACK);
        assert!(cam.flags().contains(ComponentFlags::DISALLOW_MULTIPLE_IN_ENTITY));
    }

    #[test]
    fn test_view_is_inverse_of_owner_world() {
        let mut cam = Camera::default();
        let world = Mat4::from_translation(Vec3::new(0.0, 0.0, 5.0));
        cam.update_view(&world);
        let origin_in_view = cam.view_matrix().transform_point3(Vec3::ZERO);
        assert!(origin_in_view.approx_eq(Vec3::new(0.0, 0.0, -5.0), 1e-5));
        assert!(cam.view_info().camera_position.approx_eq(Vec3::new(0.0, 0.0, 5.0), 1e-6));
    }

    #[test]
    fn test_point_in_front_lands_inside_clip_volume() {
        let mut cam = Camera::default();
        cam.update_view(&Mat4::from_translation(Vec3::new(0.0, 0.0, 3.0)));
        let clip = cam.view_projection() * Vec3::ZERO.extend(1.0);
        let ndc_z = clip.z / clip.w;
        assert!(clip.w > 0.0);
        assert!((0.0..=1.0).contains(&ndc_z));
    }

    #[test]
    fn test_orthographic_width_follows_aspect() {
        let mut cam = Camera::orthographic(2.0, 0.1, 10.0);
        cam.set_viewport(200, 100);
        let p = cam.projection().transform_point3(Vec3::new(4.0, 2.0, -1.0));
        approx::assert_relative_eq!(p.x, 1.0, epsilon = 1e-5);
        approx::assert_relative_eq!(p.y, 1.0, epsilon = 1e-5);
    }
}
