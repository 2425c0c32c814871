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

//! Draw recording shared by the render systems.

use nova_core::math::Mat4;
use nova_core::renderer::{
    BufferDescriptor, BufferId, BufferUsage, Extent3D, GraphicsDevice, ImageAspect, RenderPass,
    RenderQueue, ResourceError, SampleCount, TextureDescriptor, TextureDimension, TextureFormat,
    TextureId, TextureUsage, TextureViewDescriptor, TextureViewId, ViewInfo,
    TRANSFORM_INSTANCE_STRIDE,
};
use std::borrow::Cow;

/// Growable vertex buffer holding one model-view-projection matrix per
/// object that asked for one through `RenderObject::transform_slot`.
#[derive(Debug, Default)]
pub struct TransformStream {
    buffer: Option<BufferId>,
    capacity: u64,
}

impl TransformStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current backing buffer.
    pub fn buffer(&self) -> Option<BufferId> {
        self.buffer
    }

    /// Writes the matrices of `queue` and returns the buffer they live in,
    /// or `None` when no object uses a transform slot.
    pub fn upload(
        &mut self,
        device: &dyn GraphicsDevice,
        queue: &RenderQueue,
        view_info: &ViewInfo,
    ) -> Result<Option<BufferId>, ResourceError> {
        let view_projection = view_info.view_projection_matrix();
        let matrices: Vec<Mat4> = queue
            .iter()
            .filter(|object| object.transform_slot.is_some())
            .map(|object| view_projection * object.model)
            .collect();
        if matrices.is_empty() {
            return Ok(None);
        }

        let bytes: &[u8] = bytemuck::cast_slice(&matrices);
        let required = bytes.len() as u64;
        let buffer = match self.buffer {
            Some(id) if self.capacity >= required => id,
            previous => {
                if let Some(old) = previous {
                    device.destroy_buffer(old)?;
                }
                let capacity = required.next_power_of_two().max(TRANSFORM_INSTANCE_STRIDE * 16);
                let id = device.create_buffer(&BufferDescriptor {
                    label: Some(Cow::Borrowed("Object Transform Stream")),
                    size: capacity,
                    usage: BufferUsage::VERTEX | BufferUsage::COPY_DST,
                    mapped_at_creation: false,
                })?;
                log::debug!("TransformStream: grew to {capacity} bytes");
                self.buffer = Some(id);
                self.capacity = capacity;
                id
            }
        };
        device.write_buffer(buffer, 0, bytes)?;
        Ok(Some(buffer))
    }

    /// Releases the backing buffer.
    pub fn release(&mut self, device: &dyn GraphicsDevice) {
        if let Some(id) = self.buffer.take() {
            if let Err(e) = device.destroy_buffer(id) {
                log::warn!("TransformStream: failed to release buffer: {e}");
            }
        }
        self.capacity = 0;
    }
}

/// Format of the depth attachment the render systems clear every frame.
pub const DEPTH_FORMAT: TextureFormat = TextureFormat::Depth32Float;

/// Depth texture sized to the surface.
#[derive(Debug, Default)]
pub struct DepthTarget {
    texture: Option<TextureId>,
    view: Option<TextureViewId>,
}

impl DepthTarget {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> Option<TextureViewId> {
        self.view
    }

    /// Drops the current texture and creates one of `width`x`height`.
    /// Zero sizes leave the target empty.
    pub fn recreate(
        &mut self,
        device: &dyn GraphicsDevice,
        width: u32,
        height: u32,
    ) -> Result<(), ResourceError> {
        self.release(device);
        if width == 0 || height == 0 {
            return Ok(());
        }

        let texture = device.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed("Depth Texture")),
            size: Extent3D {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: SampleCount::X1,
            dimension: TextureDimension::D2,
            format: DEPTH_FORMAT,
            usage: TextureUsage::RENDER_ATTACHMENT,
        })?;
        let view = device.create_texture_view(
            texture,
            &TextureViewDescriptor {
                label: Some(Cow::Borrowed("Depth Texture View")),
                format: Some(DEPTH_FORMAT),
                dimension: None,
                aspect: ImageAspect::DepthOnly,
                base_mip_level: 0,
                mip_level_count: None,
                base_array_layer: 0,
                array_layer_count: None,
            },
        )?;
        self.texture = Some(texture);
        self.view = Some(view);
        log::debug!("Depth texture created: {width}x{height} ({DEPTH_FORMAT:?})");
        Ok(())
    }

    pub fn release(&mut self, device: &dyn GraphicsDevice) {
        if let Some(view) = self.view.take() {
            let _ = device.destroy_texture_view(view);
        }
        if let Some(texture) = self.texture.take() {
            let _ = device.destroy_texture(texture);
        }
    }
}

/// Records one draw per object of `queue` and returns `(draw_calls, triangles)`.
///
/// Objects with a transform slot get the stream bound at that slot, offset to
/// their own matrix.
pub fn record_draws(
    pass: &mut dyn RenderPass,
    queue: &RenderQueue,
    transforms: Option<BufferId>,
) -> (u32, u32) {
    let mut transform_index = 0u64;
    queue.iter().fold((0, 0), |(draw_calls, triangles), object| {
        pass.set_pipeline(object.pipeline);
        pass.set_vertex_buffer(0, object.vertex_buffer, 0);
        if let (Some(slot), Some(stream)) = (object.transform_slot, transforms) {
            pass.set_vertex_buffer(slot, stream, transform_index * TRANSFORM_INSTANCE_STRIDE);
            transform_index += 1;
        }
        match object.index_buffer {
            Some((buffer, format)) => {
                pass.set_index_buffer(buffer, 0, format);
                pass.draw_indexed(0..object.index_count, 0, 0..1);
            }
            None => pass.draw(0..object.vertex_count, 0..1),
        }
        (draw_calls + 1, triangles + object.triangle_count())
    })
}
