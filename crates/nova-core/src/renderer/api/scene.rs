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

//! What the scene hands to a [`RenderSystem`](crate::renderer::RenderSystem) each frame.

use crate::math::{Color, Mat4, Vec3};
use crate::renderer::api::buffer::BufferId;
use crate::renderer::api::format::IndexFormat;
use crate::renderer::api::pipeline::RenderPipelineId;

/// A single draw.
///
/// When `transform_slot` is set, the render system writes
/// `view_projection * model` into its per-object transform stream and binds
/// that element to vertex buffer slot `transform_slot` for this draw. Pipelines
/// that read it declare [`transform_instance_layout`](crate::renderer::transform_instance_layout)
/// at that slot.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderObject {
    /// Pipeline to bind.
    pub pipeline: RenderPipelineId,
    /// Vertex buffer bound at slot 0.
    pub vertex_buffer: BufferId,
    /// Optional index buffer and its index width.
    pub index_buffer: Option<(BufferId, IndexFormat)>,
    /// Vertices drawn when there is no index buffer.
    pub vertex_count: u32,
    /// Indices drawn when there is an index buffer.
    pub index_count: u32,
    /// Object to world.
    pub model: Mat4,
    /// Vertex buffer slot receiving the object's transform, if the pipeline wants it.
    pub transform_slot: Option<u32>,
}

impl RenderObject {
    /// A non-indexed draw of `vertex_count` vertices.
    pub fn new(pipeline: RenderPipelineId, vertex_buffer: BufferId, vertex_count: u32) -> Self {
        Self {
            pipeline,
            vertex_buffer,
            index_buffer: None,
            vertex_count,
            index_count: 0,
            model: Mat4::IDENTITY,
            transform_slot: None,
        }
    }

    /// Switches to an indexed draw.
    pub fn with_indices(mut self, buffer: BufferId, format: IndexFormat, count: u32) -> Self {
        self.index_buffer = Some((buffer, format));
        self.index_count = count;
        self
    }

    /// Sets the model matrix.
    pub fn with_model(mut self, model: Mat4) -> Self {
        self.model = model;
        self
    }

    /// Feeds the object's transform through vertex buffer `slot`.
    pub fn with_transform_slot(mut self, slot: u32) -> Self {
        self.transform_slot = Some(slot);
        self
    }

    /// Triangles this draw produces, assuming a triangle list.
    pub fn triangle_count(&self) -> u32 {
        match self.index_buffer {
            Some(_) => self.index_count / 3,
            None => self.vertex_count / 3,
        }
    }
}

/// The ordered list of draws for one frame.
#[derive(Debug, Clone, Default)]
pub struct RenderQueue {
    objects: Vec<RenderObject>,
}

impl RenderQueue {
    /// An empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a draw.
    pub fn push(&mut self, object: RenderObject) {
        self.objects.push(object);
    }

    /// Number of draws.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// `true` when nothing will be drawn.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Draws in submission order.
    pub fn iter(&self) -> std::slice::Iter<'_, RenderObject> {
        self.objects.iter()
    }

    /// The draws as a slice.
    pub fn as_slice(&self) -> &[RenderObject] {
        &self.objects
    }

    /// Removes every draw, keeping the allocation.
    pub fn clear(&mut self) {
        self.objects.clear();
    }

    /// Total triangles over all draws.
    pub fn triangle_count(&self) -> u32 {
        self.objects.iter().map(RenderObject::triangle_count).sum()
    }

    /// Number of draws that consume a transform slot.
    pub fn transform_count(&self) -> usize {
        self.objects
            .iter()
            .filter(|o| o.transform_slot.is_some())
            .count()
    }
}

impl<'a> IntoIterator for &'a RenderQueue {
    type Item = &'a RenderObject;
    type IntoIter = std::slice::Iter<'a, RenderObject>;

    fn into_iter(self) -> Self::IntoIter {
        self.objects.iter()
    }
}

/// Camera data for a frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewInfo {
    /// World to view.
    pub view_matrix: Mat4,
    /// View to clip.
    pub projection_matrix: Mat4,
    /// Camera position in world space.
    pub camera_position: Vec3,
    /// Color the frame is cleared to.
    pub clear_color: Color,
}

impl Default for ViewInfo {
    fn default() -> Self {
        Self {
            view_matrix: Mat4::IDENTITY,
            projection_matrix: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            clear_color: Color::BLACK,
        }
    }
}

impl ViewInfo {
    /// Builds a view.
    pub fn new(view_matrix: Mat4, projection_matrix: Mat4, camera_position: Vec3) -> Self {
        Self {
            view_matrix,
            projection_matrix,
            camera_position,
            clear_color: Color::BLACK,
        }
    }

    /// Same view, different clear color.
    pub fn with_clear_color(mut self, clear_color: Color) -> Self {
        self.clear_color = clear_color;
        self
    }

    /// `projection * view`.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix * self.view_matrix
    }
}

/// Per-frame knobs for the render system.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderSettings {
    /// Quiet period after the last resize before reconfiguring the surface.
    pub resize_debounce_ms: u64,
    /// Force a pending resize after this many frames regardless.
    pub resize_max_pending_frames: u32,
    /// Draw wireframe when the backend supports it.
    pub wireframe: bool,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            resize_debounce_ms: 120,
            resize_max_pending_frames: 10,
            wireframe: false,
        }
    }
}

/// Statistics of the last frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderStats {
    /// Frames presented so far.
    pub frame_number: u64,
    /// Draw calls encoded.
    pub draw_calls: u32,
    /// Triangles submitted.
    pub triangles_rendered: u32,
    /// CPU time spent before encoding.
    pub cpu_preparation_time_ms: f32,
    /// CPU time spent submitting.
    pub cpu_render_submission_time_ms: f32,
    /// Frames skipped so far (minimized surface, pending resize).
    pub frames_skipped: u64,
    /// Swapchain recreations so far.
    pub swapchain_recreations: u64,
    /// Estimated VRAM used by tracked resources.
    pub vram_usage_estimate_mb: f32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_triangle_count_uses_indices_when_present() {
        let plain = RenderObject::new(RenderPipelineId(0), BufferId(0), 9);
        let indexed = RenderObject::new(RenderPipelineId(0), BufferId(1), 4).with_indices(
            BufferId(2),
            IndexFormat::Uint16,
            6,
        );
        assert_eq!(plain.triangle_count(), 3);
        assert_eq!(indexed.triangle_count(), 2);

        let mut queue = RenderQueue::new();
        queue.push(plain);
        queue.push(indexed.with_transform_slot(1));
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.triangle_count(), 5);
        assert_eq!(queue.transform_count(), 1);
        queue.clear();
        assert!(queue.is_empty());
    }

    #[test]
    fn test_view_projection_is_projection_times_view() {
        let view = Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0));
        let proj = Mat4::from_scale(Vec3::new(2.0, 2.0, 1.0));
        let info = ViewInfo::new(view, proj, Vec3::new(0.0, 0.0, 5.0));
        assert!(info
            .view_projection_matrix()
            .approx_eq(&(proj * view), 1e-6));
    }
}
