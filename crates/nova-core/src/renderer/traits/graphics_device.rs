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

use crate::renderer::api::*;
use crate::renderer::error::ResourceError;
use crate::renderer::traits::CommandEncoder;
use std::fmt::Debug;

/// The resource factory of a graphics backend.
///
/// Every GPU object is referenced through an opaque id; the device owns the
/// backend objects. Implementations are shared across threads behind an
/// `Arc<dyn GraphicsDevice>`, so all methods take `&self`.
pub trait GraphicsDevice: Send + Sync + Debug + 'static {
    /// Creates a shader module.
    /// ## Errors
    /// * `ResourceError::Shader` - if the source is empty or rejected by the backend.
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError>;

    /// Destroys a shader module.
    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError>;

    /// Creates a render pipeline.
    /// ## Errors
    /// * `ResourceError::Pipeline` - unknown shader module, missing fragment
    ///   entry point, or a backend compilation failure.
    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError>;

    /// Destroys a render pipeline.
    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError>;

    /// Creates an uninitialized buffer of `descriptor.size` bytes.
    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError>;

    /// Creates a buffer holding `data`. Its size is `data.len()`; `descriptor.size` is ignored.
    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError>;

    /// Destroys a buffer.
    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError>;

    /// Queues a write of `data` at `offset`.
    /// ## Errors
    /// * `ResourceError::OutOfBounds` - when `offset + data.len()` exceeds the buffer size.
    /// * `ResourceError::NotFound` - unknown buffer.
    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError>;

    /// Size in bytes of a buffer.
    fn buffer_size(&self, id: BufferId) -> Result<u64, ResourceError>;

    /// Creates a texture.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError>;

    /// Destroys a texture.
    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError>;

    /// Uploads texels into the region `origin..origin + size` of mip 0.
    ///
    /// `bytes_per_row` defaults to the tight row size.
    fn write_texture(
        &self,
        texture_id: TextureId,
        data: &[u8],
        bytes_per_row: Option<u32>,
        origin: Origin3D,
        size: Extent3D,
    ) -> Result<(), ResourceError>;

    /// Creates a view of a texture.
    fn create_texture_view(
        &self,
        texture_id: TextureId,
        descriptor: &TextureViewDescriptor,
    ) -> Result<TextureViewId, ResourceError>;

    /// Destroys a texture view.
    fn destroy_texture_view(&self, id: TextureViewId) -> Result<(), ResourceError>;

    /// Creates a sampler. Use [`SamplerCache`](crate::renderer::SamplerCache) to share samplers.
    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<SamplerId, ResourceError>;

    /// Destroys a sampler.
    fn destroy_sampler(&self, id: SamplerId) -> Result<(), ResourceError>;

    /// Starts recording a command buffer.
    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder>;

    /// Submits a finished command buffer to the queue.
    /// ## Errors
    /// * `ResourceError::InvalidHandle` - the id is unknown or was already submitted.
    fn submit_command_buffer(&self, id: CommandBufferId) -> Result<(), ResourceError>;

    /// Format of the presentation surface, if there is one.
    fn surface_format(&self) -> Option<TextureFormat>;

    /// Adapter description.
    fn adapter_info(&self) -> RendererAdapterInfo;

    /// Whether a named optional feature is enabled on the device.
    fn supports_feature(&self, feature_name: &str) -> bool;

    /// Which backend implements this device.
    fn device_type(&self) -> GraphicsDeviceType;

    /// Bytes currently held by buffers and textures created through this device.
    fn allocated_bytes(&self) -> u64;
}
