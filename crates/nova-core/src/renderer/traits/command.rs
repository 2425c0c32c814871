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

use crate::renderer::api::{
    BufferId, CommandBufferId, IndexFormat, RenderPassDescriptor, RenderPipelineId,
};
use std::ops::Range;

/// An active render pass, recording draws into its parent encoder.
///
/// Dropping the pass ends it.
pub trait RenderPass {
    /// Binds a render pipeline for subsequent draws.
    fn set_pipeline(&mut self, pipeline: RenderPipelineId);

    /// Binds `buffer`, starting at `offset` bytes, to vertex buffer `slot`.
    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferId, offset: u64);

    /// Binds the index buffer for `draw_indexed`.
    fn set_index_buffer(&mut self, buffer: BufferId, offset: u64, index_format: IndexFormat);

    /// Draws non-indexed primitives.
    fn draw(&mut self, vertices: Range<u32>, instances: Range<u32>);

    /// Draws indexed primitives.
    fn draw_indexed(&mut self, indices: Range<u32>, base_vertex: i32, instances: Range<u32>);
}

/// Records GPU commands into a command buffer.
///
/// The encoder is consumed by [`finish`](CommandEncoder::finish), which parks
/// the resulting command buffer in the device until it is submitted through
/// [`GraphicsDevice::submit_command_buffer`](crate::renderer::GraphicsDevice::submit_command_buffer).
pub trait CommandEncoder {
    /// Starts a render pass. The pass mutably borrows the encoder until dropped.
    fn begin_render_pass<'encoder>(
        &'encoder mut self,
        descriptor: &RenderPassDescriptor<'encoder>,
    ) -> Box<dyn RenderPass + 'encoder>;

    /// Copies `size` bytes between two buffers.
    fn copy_buffer_to_buffer(
        &mut self,
        source: BufferId,
        source_offset: u64,
        destination: BufferId,
        destination_offset: u64,
        size: u64,
    );

    /// Finishes recording.
    fn finish(self: Box<Self>) -> CommandBufferId;
}
