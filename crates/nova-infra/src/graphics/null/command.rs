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

use nova_core::math::Color;
use nova_core::renderer::{
    BufferId, CommandBufferId, CommandEncoder, IndexFormat, LoadOp, RenderPass,
    RenderPassDescriptor, RenderPipelineId,
};
use std::ops::Range;

use super::device::NullDevice;

/// One recorded command.
#[derive(Debug, Clone, PartialEq)]
pub enum NullCommand {
    BeginRenderPass {
        label: Option<String>,
        color_attachments: usize,
        clear_color: Option<Color>,
        has_depth: bool,
    },
    SetPipeline(RenderPipelineId),
    SetVertexBuffer {
        slot: u32,
        buffer: BufferId,
        offset: u64,
    },
    SetIndexBuffer {
        buffer: BufferId,
        offset: u64,
        format: IndexFormat,
    },
    Draw {
        vertices: Range<u32>,
        instances: Range<u32>,
    },
    DrawIndexed {
        indices: Range<u32>,
        base_vertex: i32,
        instances: Range<u32>,
    },
    CopyBufferToBuffer {
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    },
}

/// A finished command buffer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NullCommandBuffer {
    pub label: Option<String>,
    pub commands: Vec<NullCommand>,
}

impl NullCommandBuffer {
    pub fn draw_calls(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, NullCommand::Draw { .. } | NullCommand::DrawIndexed { .. }))
            .count()
    }

    pub fn render_passes(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, NullCommand::BeginRenderPass { .. }))
            .count()
    }

    /// Vertex buffer bindings at `slot`, in recording order.
    pub fn vertex_bindings(&self, slot: u32) -> Vec<(BufferId, u64)> {
        self.commands
            .iter()
            .filter_map(|c| match *c {
                NullCommand::SetVertexBuffer {
                    slot: s,
                    buffer,
                    offset,
                } if s == slot => Some((buffer, offset)),
                _ => None,
            })
            .collect()
    }
}

pub struct NullRenderPass<'a> {
    commands: &'a mut Vec<NullCommand>,
    device: &'a NullDevice,
}

impl RenderPass for NullRenderPass<'_> {
    fn set_pipeline(&mut self, pipeline: RenderPipelineId) {
        if !self.device.has_pipeline(pipeline) {
            log::warn!("NullRenderPass: RenderPipelineId {pipeline:?} not found.");
        }
        self.commands.push(NullCommand::SetPipeline(pipeline));
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId, offset: u64) {
        if !self.device.has_buffer(buffer) {
            log::warn!("NullRenderPass: Vertex BufferId {buffer:?} not found.");
        }
        self.commands.push(NullCommand::SetVertexBuffer {
            slot,
            buffer,
            offset,
        });
    }

    fn set_index_buffer(&mut self, buffer: BufferId, offset: u64, format: IndexFormat) {
        if !self.device.has_buffer(buffer) {
            log::warn!("NullRenderPass: Index BufferId {buffer:?} not found.");
        }
        self.commands.push(NullCommand::SetIndexBuffer {
            buffer,
            offset,
            format,
        });
    }

    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>) {
        self.commands.push(NullCommand::Draw {
            vertices,
            instances,
        });
    }

    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>) {
        self.commands.push(NullCommand::DrawIndexed {
            indices,
            base_vertex,
            instances,
        });
    }
}

pub struct NullCommandEncoder {
    device: NullDevice,
    buffer: NullCommandBuffer,
}

impl NullCommandEncoder {
    pub(crate) fn new(device: NullDevice, label: Option<&str>) -> Self {
        Self {
            device,
            buffer: NullCommandBuffer {
                label: label.map(str::to_owned),
                commands: Vec::new(),
            },
        }
    }
}

impl CommandEncoder for NullCommandEncoder {
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &RenderPassDescriptor<'encoder>,
    ) -> Box<dyn RenderPass + 'encoder> {
        for attachment in descriptor.color_attachments {
            if !self.device.has_texture_view(*attachment.view) {
                log::warn!(
                    "NullCommandEncoder: color attachment {:?} not found.",
                    attachment.view
                );
            }
        }
        let clear_color = descriptor
            .color_attachments
            .first()
            .and_then(|att| match att.ops.load {
                LoadOp::Clear(color) => Some(color),
                LoadOp::Load => None,
            });
        self.buffer.commands.push(NullCommand::BeginRenderPass {
            label: descriptor.label.map(str::to_owned),
            color_attachments: descriptor.color_attachments.len(),
            clear_color,
            has_depth: descriptor.depth_stencil_attachment.is_some(),
        });
        Box::new(NullRenderPass {
            commands: &mut self.buffer.commands,
            device: &self.device,
        })
    }

    fn copy_buffer_to_buffer(
        &mut self,
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    ) {
        self.buffer.commands.push(NullCommand::CopyBufferToBuffer {
            source,
            source_offset,
            destination,
            destination_offset,
            size,
        });
    }

    fn finish(self: Box<Self>) -> CommandBufferId {
        let NullCommandEncoder { device, buffer } = *self;
        device.register_command_buffer(buffer)
    }
}
