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

use nova_core::renderer::{
    BufferId, CommandBufferId, CommandEncoder, IndexFormat, RenderPass, RenderPassDescriptor,
    RenderPipelineId,
};
use std::ops::Range;

use super::conversions::IntoWgpu;
use super::device::WgpuDevice;

pub struct WgpuRenderPass<'a> {
    pub(crate) pass: wgpu::RenderPass<'a>,
    pub(crate) device: &'a WgpuDevice,
}

impl RenderPass for WgpuRenderPass<'_> {
    fn set_pipeline(&mut self, pipeline_id: RenderPipelineId) {
        if let Some(pipeline) = self.device.get_wgpu_render_pipeline(pipeline_id) {
            self.pass.set_pipeline(&pipeline);
        } else {
            log::warn!("WgpuRenderPass: RenderPipelineId {pipeline_id:?} not found.");
        }
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer_id: BufferId, offset: u64) {
        if let Some(buffer) = self.device.get_wgpu_buffer(buffer_id) {
            self.pass.set_vertex_buffer(slot, buffer.slice(offset..));
        } else {
            log::warn!("WgpuRenderPass: Vertex BufferId {buffer_id:?} not found.");
        }
    }

    fn set_index_buffer(&mut self, buffer_id: BufferId, offset: u64, index_format: IndexFormat) {
        if let Some(buffer) = self.device.get_wgpu_buffer(buffer_id) {
            self.pass
                .set_index_buffer(buffer.slice(offset..), index_format.into_wgpu());
        } else {
            log::warn!("WgpuRenderPass: Index BufferId {buffer_id:?} not found.");
        }
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        self.pass.draw(vertices, instances);
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        self.pass.draw_indexed(indices, base_vertex, instances);
    }
}

/// Pass handed out when the encoder could not be created or was already
/// finished. Every command is dropped.
struct DetachedRenderPass;

impl RenderPass for DetachedRenderPass {
    fn set_pipeline(&mut self, _pipeline: RenderPipelineId) {}

    fn set_vertex_buffer(&mut self, _slot: u32, _buffer: BufferId, _offset: u64) {}

    fn set_index_buffer(&mut self, _buffer: BufferId, _offset: u64, _format: IndexFormat) {}

    fn draw(&mut self, _vertices: Range<u32>, _instances: Range<u32>) {}

    fn draw_indexed(&mut self, _indices: Range<u32>, _base_vertex: i32, _instances: Range<u32>) {}
}

pub struct WgpuCommandEncoder {
    pub(crate) encoder: Option<wgpu::CommandEncoder>,
    pub(crate) device: WgpuDevice,
}

impl CommandEncoder for WgpuCommandEncoder {
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &RenderPassDescriptor<'encoder>,
    ) -> Box<dyn RenderPass + 'encoder> {
        // Resolve every view up front; attachments whose view is gone are skipped.
        let resolved: Vec<(wgpu::TextureView, Option<wgpu::TextureView>, _)> = descriptor
            .color_attachments
            .iter()
            .filter_map(|att| {
                let Some(view) = self.device.get_wgpu_texture_view(*att.view) else {
                    log::warn!("WgpuCommandEncoder: color attachment {:?} not found.", att.view);
                    return None;
                };
                let resolve_target = att
                    .resolve_target
                    .and_then(|id| self.device.get_wgpu_texture_view(*id))
                    .map(|arc_view| (*arc_view).clone());
                Some(((*view).clone(), resolve_target, att.ops))
            })
            .collect();

        let color_attachments: Vec<Option<wgpu::RenderPassColorAttachment>> = resolved
            .iter()
            .map(|(view, resolve_target, ops)| {
                Some(wgpu::RenderPassColorAttachment {
                    view,
                    resolve_target: resolve_target.as_ref(),
                    ops: wgpu::Operations {
                        load: ops.load.into_wgpu(),
                        store: ops.store.into_wgpu(),
                    },
                    depth_slice: None,
                })
            })
            .collect();

        let depth_view: Option<wgpu::TextureView> =
            descriptor.depth_stencil_attachment.as_ref().and_then(|ds| {
                self.device
                    .get_wgpu_texture_view(*ds.view)
                    .map(|arc_view| (*arc_view).clone())
            });

        let depth_stencil_attachment = match (&descriptor.depth_stencil_attachment, &depth_view) {
            (Some(ds), Some(view)) => Some(wgpu::RenderPassDepthStencilAttachment {
                view,
                depth_ops: ds.depth_ops.map(|ops| wgpu::Operations {
                    load: ops.load.into_wgpu(),
                    store: ops.store.into_wgpu(),
                }),
                stencil_ops: None,
            }),
            _ => None,
        };

        let wgpu_descriptor = wgpu::RenderPassDescriptor {
            label: descriptor.label,
            color_attachments: &color_attachments,
            depth_stencil_attachment,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        };

        match self.encoder.as_mut() {
            Some(encoder) => Box::new(WgpuRenderPass {
                pass: encoder.begin_render_pass(&wgpu_descriptor),
                device: &self.device,
            }),
            None => {
                log::error!("WgpuCommandEncoder: render pass requested on a finished encoder.");
                Box::new(DetachedRenderPass)
            }
        }
    }

    fn copy_buffer_to_buffer(
        &mut self,
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    ) {
        let (Some(encoder), Some(source_buffer), Some(destination_buffer)) = (
            self.encoder.as_mut(),
            self.device.get_wgpu_buffer(source),
            self.device.get_wgpu_buffer(destination),
        ) else {
            log::warn!("WgpuCommandEncoder: copy {source:?} -> {destination:?} skipped.");
            return;
        };
        encoder.copy_buffer_to_buffer(
            &source_buffer,
            source_offset,
            &destination_buffer,
            destination_offset,
            size,
        );
    }

    fn finish(mut self: Box<Self>) -> CommandBufferId {
        match self.encoder.take() {
            Some(encoder) => self.device.register_command_buffer(encoder.finish()),
            None => self.device.orphan_command_buffer_id(),
        }
    }
}
