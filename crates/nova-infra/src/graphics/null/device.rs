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

//! A graphics device that keeps books instead of talking to a GPU.
//!
//! Every resource is tracked with its descriptor data, buffers keep their
//! bytes, and submitted command buffers are retained so tests can inspect
//! what a frame recorded. Validation matches the wgpu device through the
//! shared checks in `graphics::validation`.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use nova_core::renderer::{
    BufferDescriptor, BufferId, BufferUsage, CommandBufferId, CommandEncoder, Extent3D,
    GraphicsBackendType, GraphicsDevice, GraphicsDeviceType, Origin3D, PipelineError,
    RenderPipelineDescriptor, RenderPipelineId, RendererAdapterInfo, RendererDeviceType,
    ResourceError, SamplerDescriptor, SamplerId, ShaderError, ShaderModuleDescriptor,
    ShaderModuleId, TextureDescriptor, TextureFormat, TextureId, TextureUsage,
    TextureViewDescriptor, TextureViewId,
};

use super::command::{NullCommand, NullCommandBuffer, NullCommandEncoder};
use crate::graphics::validation::{self, ShaderEntryPoint};

/// Bookkeeping for one buffer.
#[derive(Debug, Clone, PartialEq)]
pub struct NullBuffer {
    pub label: Option<String>,
    pub usage: BufferUsage,
    pub contents: Vec<u8>,
    /// Total bytes written through `write_buffer` and copies.
    pub bytes_written: u64,
}

/// Bookkeeping for one texture.
#[derive(Debug, Clone, PartialEq)]
pub struct NullTexture {
    pub label: Option<String>,
    pub size: Extent3D,
    pub format: TextureFormat,
    pub usage: TextureUsage,
    pub byte_size: u64,
    pub bytes_written: u64,
}

#[derive(Debug)]
struct NullShaderModule {
    label: Option<String>,
    entry_points: Vec<ShaderEntryPoint>,
}

/// Bookkeeping for one render pipeline.
#[derive(Debug, Clone, PartialEq)]
pub struct NullPipeline {
    pub label: Option<String>,
    pub vertex_shader_module: ShaderModuleId,
    pub fragment_shader_module: Option<ShaderModuleId>,
    pub vertex_buffer_count: usize,
}

#[derive(Debug, Default)]
struct NullDeviceState {
    shaders: HashMap<ShaderModuleId, NullShaderModule>,
    pipelines: HashMap<RenderPipelineId, NullPipeline>,
    buffers: HashMap<BufferId, NullBuffer>,
    textures: HashMap<TextureId, NullTexture>,
    texture_views: HashMap<TextureViewId, TextureId>,
    samplers: HashMap<SamplerId, Option<String>>,
    pending_command_buffers: HashMap<CommandBufferId, NullCommandBuffer>,
    submitted_command_buffers: Vec<NullCommandBuffer>,
    next_id: usize,
    next_command_buffer_id: u64,
    allocated_bytes: u64,
    peak_allocated_bytes: u64,
}

impl NullDeviceState {
    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn allocate(&mut self, bytes: u64) {
        self.allocated_bytes += bytes;
        self.peak_allocated_bytes = self.peak_allocated_bytes.max(self.allocated_bytes);
    }

    fn release(&mut self, bytes: u64) {
        self.allocated_bytes = self.allocated_bytes.saturating_sub(bytes);
    }

    /// Applies the buffer copies of a submitted command buffer.
    fn execute(&mut self, commands: &[NullCommand]) {
        for command in commands {
            let &NullCommand::CopyBufferToBuffer {
                source,
                source_offset,
                destination,
                destination_offset,
                size,
            } = command
            else {
                continue;
            };
            let Some(bytes) = self
                .buffers
                .get(&source)
                .and_then(|b| b.contents.get(byte_range(source_offset, size)?))
                .map(<[u8]>::to_vec)
            else {
                log::warn!("NullDevice: copy source range of {source:?} is invalid.");
                continue;
            };
            let Some(target) = self.buffers.get_mut(&destination) else {
                log::warn!("NullDevice: copy destination {destination:?} not found.");
                continue;
            };
            match byte_range(destination_offset, size).and_then(|r| target.contents.get_mut(r)) {
                Some(slot) => {
                    slot.copy_from_slice(&bytes);
                    target.bytes_written += size;
                }
                None => {
                    log::warn!("NullDevice: copy destination range of {destination:?} is invalid.")
                }
            }
        }
    }
}

fn byte_range(offset: u64, len: u64) -> Option<std::ops::Range<usize>> {
    let start = usize::try_from(offset).ok()?;
    let end = start.checked_add(usize::try_from(len).ok()?)?;
    Some(start..end)
}

/// Headless [`GraphicsDevice`]. Clones share the same resource tables.
#[derive(Debug, Clone)]
pub struct NullDevice {
    state: Arc<Mutex<NullDeviceState>>,
    surface_format: Option<TextureFormat>,
    features: Arc<HashSet<String>>,
}

impl Default for NullDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl NullDevice {
    /// A device presenting to an `Bgra8UnormSrgb` surface and supporting no optional feature.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(NullDeviceState::default())),
            surface_format: Some(TextureFormat::Bgra8UnormSrgb),
            features: Arc::new(HashSet::new()),
        }
    }

    /// Reports `features` as supported.
    pub fn with_features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features = Arc::new(features.into_iter().map(Into::into).collect());
        self
    }

    /// Overrides the surface format, `None` behaving like an offscreen device.
    pub fn with_surface_format(mut self, format: Option<TextureFormat>) -> Self {
        self.surface_format = format;
        self
    }

    fn state(&self) -> Result<MutexGuard<'_, NullDeviceState>, ResourceError> {
        self.state
            .lock()
            .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned (NullDevice): {e}")))
    }

    fn inspect<R>(&self, f: impl FnOnce(&NullDeviceState) -> R) -> Option<R> {
        self.state.lock().ok().map(|state| f(&state))
    }

    pub(crate) fn register_command_buffer(&self, buffer: NullCommandBuffer) -> CommandBufferId {
        match self.state.lock() {
            Ok(mut state) => {
                let id = CommandBufferId(state.next_command_buffer_id);
                state.next_command_buffer_id += 1;
                state.pending_command_buffers.insert(id, buffer);
                id
            }
            Err(e) => {
                log::error!("NullDevice: dropping command buffer: {e}");
                CommandBufferId(u64::MAX)
            }
        }
    }

    pub(crate) fn has_buffer(&self, id: BufferId) -> bool {
        self.inspect(|s| s.buffers.contains_key(&id)).unwrap_or(false)
    }

    pub(crate) fn has_pipeline(&self, id: RenderPipelineId) -> bool {
        self.inspect(|s| s.pipelines.contains_key(&id)).unwrap_or(false)
    }

    pub(crate) fn has_texture_view(&self, id: TextureViewId) -> bool {
        self.inspect(|s| s.texture_views.contains_key(&id))
            .unwrap_or(false)
    }

    // --- Inspection ---

    /// Bytes currently stored in a buffer.
    pub fn buffer_contents(&self, id: BufferId) -> Option<Vec<u8>> {
        self.inspect(|s| s.buffers.get(&id).map(|b| b.contents.clone()))
            .flatten()
    }

    /// Snapshot of a buffer's bookkeeping.
    pub fn buffer_info(&self, id: BufferId) -> Option<NullBuffer> {
        self.inspect(|s| s.buffers.get(&id).cloned()).flatten()
    }

    /// Snapshot of a texture's bookkeeping.
    pub fn texture_info(&self, id: TextureId) -> Option<NullTexture> {
        self.inspect(|s| s.textures.get(&id).cloned()).flatten()
    }

    /// Snapshot of a pipeline's bookkeeping.
    pub fn pipeline_info(&self, id: RenderPipelineId) -> Option<NullPipeline> {
        self.inspect(|s| s.pipelines.get(&id).cloned()).flatten()
    }

    /// Label a shader module was created with.
    pub fn shader_label(&self, id: ShaderModuleId) -> Option<String> {
        self.inspect(|s| s.shaders.get(&id).and_then(|m| m.label.clone()))
            .flatten()
    }

    pub fn live_buffer_count(&self) -> usize {
        self.inspect(|s| s.buffers.len()).unwrap_or(0)
    }

    pub fn live_texture_count(&self) -> usize {
        self.inspect(|s| s.textures.len()).unwrap_or(0)
    }

    pub fn live_texture_view_count(&self) -> usize {
        self.inspect(|s| s.texture_views.len()).unwrap_or(0)
    }

    pub fn live_sampler_count(&self) -> usize {
        self.inspect(|s| s.samplers.len()).unwrap_or(0)
    }

    pub fn live_pipeline_count(&self) -> usize {
        self.inspect(|s| s.pipelines.len()).unwrap_or(0)
    }

    pub fn live_shader_count(&self) -> usize {
        self.inspect(|s| s.shaders.len()).unwrap_or(0)
    }

    /// Finished command buffers not submitted yet.
    pub fn pending_command_buffer_count(&self) -> usize {
        self.inspect(|s| s.pending_command_buffers.len())
            .unwrap_or(0)
    }

    /// Every submitted command buffer, oldest first.
    pub fn submitted_command_buffers(&self) -> Vec<NullCommandBuffer> {
        self.inspect(|s| s.submitted_command_buffers.clone())
            .unwrap_or_default()
    }

    /// Draw calls across all submitted command buffers.
    pub fn total_draw_calls(&self) -> u64 {
        self.inspect(|s| {
            s.submitted_command_buffers
                .iter()
                .map(|cb| cb.draw_calls() as u64)
                .sum()
        })
        .unwrap_or(0)
    }

    /// Highest value [`GraphicsDevice::allocated_bytes`] has reached.
    pub fn peak_allocated_bytes(&self) -> u64 {
        self.inspect(|s| s.peak_allocated_bytes).unwrap_or(0)
    }
}

impl GraphicsDevice for NullDevice {
    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let entry_points = validation::parse_shader_source(descriptor)?;
        let mut state = self.state()?;
        let id = ShaderModuleId(state.next_id());
        state.shaders.insert(
            id,
            NullShaderModule {
                label: descriptor.label.map(str::to_owned),
                entry_points,
            },
        );
        log::debug!("NullDevice: created shader module {id:?} ({:?})", descriptor.label);
        Ok(id)
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        self.state()?
            .shaders
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| ShaderError::NotFound { id }.into())
    }

    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        let mut state = self.state()?;
        validation::check_pipeline_stages(descriptor, |id| {
            state.shaders.get(&id).map(|m| m.entry_points.as_slice())
        })?;
        let id = RenderPipelineId(state.next_id());
        state.pipelines.insert(
            id,
            NullPipeline {
                label: descriptor.label.as_deref().map(str::to_owned),
                vertex_shader_module: descriptor.vertex_shader_module,
                fragment_shader_module: descriptor.fragment_shader_module,
                vertex_buffer_count: descriptor.vertex_buffers_layout.len(),
            },
        );
        log::debug!("NullDevice: created render pipeline {id:?} ({:?})", descriptor.label);
        Ok(id)
    }

    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError> {
        self.state()?
            .pipelines
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| PipelineError::InvalidRenderPipeline { id }.into())
    }

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        validation::check_buffer_descriptor(descriptor)?;
        let size = usize::try_from(descriptor.size).map_err(|_| {
            ResourceError::InvalidDescriptor(format!("buffer size {} too large", descriptor.size))
        })?;
        let mut state = self.state()?;
        let id = BufferId(state.next_id());
        state.buffers.insert(
            id,
            NullBuffer {
                label: descriptor.label.as_deref().map(str::to_owned),
                usage: descriptor.usage,
                contents: vec![0; size],
                bytes_written: 0,
            },
        );
        state.allocate(descriptor.size);
        Ok(id)
    }

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        validation::check_buffer_descriptor(&BufferDescriptor {
            size: data.len() as u64,
            ..descriptor.clone()
        })?;
        let mut state = self.state()?;
        let id = BufferId(state.next_id());
        state.buffers.insert(
            id,
            NullBuffer {
                label: descriptor.label.as_deref().map(str::to_owned),
                usage: descriptor.usage,
                contents: data.to_vec(),
                bytes_written: data.len() as u64,
            },
        );
        state.allocate(data.len() as u64);
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let mut state = self.state()?;
        let buffer = state.buffers.remove(&id).ok_or(ResourceError::NotFound)?;
        state.release(buffer.contents.len() as u64);
        Ok(())
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let mut state = self.state()?;
        let buffer = state.buffers.get_mut(&id).ok_or(ResourceError::NotFound)?;
        validation::check_write_range(buffer.contents.len() as u64, offset, data.len())?;
        let start = offset as usize;
        buffer.contents[start..start + data.len()].copy_from_slice(data);
        buffer.bytes_written += data.len() as u64;
        Ok(())
    }

    fn buffer_size(&self, id: BufferId) -> Result<u64, ResourceError> {
        self.state()?
            .buffers
            .get(&id)
            .map(|b| b.contents.len() as u64)
            .ok_or(ResourceError::NotFound)
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        validation::check_texture_descriptor(descriptor)?;
        let byte_size = descriptor.base_level_bytes();
        let mut state = self.state()?;
        let id = TextureId(state.next_id());
        state.textures.insert(
            id,
            NullTexture {
                label: descriptor.label.as_deref().map(str::to_owned),
                size: descriptor.size,
                format: descriptor.format,
                usage: descriptor.usage,
                byte_size,
                bytes_written: 0,
            },
        );
        state.allocate(byte_size);
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let mut state = self.state()?;
        let texture = state.textures.remove(&id).ok_or(ResourceError::NotFound)?;
        state.texture_views.retain(|_, owner| *owner != id);
        state.release(texture.byte_size);
        Ok(())
    }

    fn write_texture(
        &self,
        texture_id: TextureId,
        data: &[u8],
        bytes_per_row: Option<u32>,
        origin: Origin3D,
        size: Extent3D,
    ) -> Result<(), ResourceError> {
        let mut state = self.state()?;
        let texture = state
            .textures
            .get_mut(&texture_id)
            .ok_or(ResourceError::NotFound)?;

        let fits = |o: u32, s: u32, max: u32| o.checked_add(s).is_some_and(|end| end <= max);
        if !fits(origin.x, size.width, texture.size.width)
            || !fits(origin.y, size.height, texture.size.height)
            || !fits(origin.z, size.depth_or_array_layers, texture.size.depth_or_array_layers)
        {
            return Err(ResourceError::OutOfBounds);
        }

        let row_bytes = bytes_per_row.map(u64::from).unwrap_or_else(|| {
            u64::from(size.width) * u64::from(texture.format.bytes_per_pixel())
        });
        let required = row_bytes * u64::from(size.height) * u64::from(size.depth_or_array_layers);
        if (data.len() as u64) < required {
            return Err(ResourceError::OutOfBounds);
        }
        texture.bytes_written += required;
        Ok(())
    }

    fn create_texture_view(
        &self,
        texture_id: TextureId,
        _descriptor: &TextureViewDescriptor,
    ) -> Result<TextureViewId, ResourceError> {
        let mut state = self.state()?;
        if !state.textures.contains_key(&texture_id) {
            return Err(ResourceError::NotFound);
        }
        let id = TextureViewId(state.next_id());
        state.texture_views.insert(id, texture_id);
        Ok(id)
    }

    fn destroy_texture_view(&self, id: TextureViewId) -> Result<(), ResourceError> {
        self.state()?
            .texture_views
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<SamplerId, ResourceError> {
        let mut state = self.state()?;
        let id = SamplerId(state.next_id());
        state
            .samplers
            .insert(id, descriptor.label.as_deref().map(str::to_owned));
        Ok(id)
    }

    fn destroy_sampler(&self, id: SamplerId) -> Result<(), ResourceError> {
        self.state()?
            .samplers
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder> {
        Box::new(NullCommandEncoder::new(self.clone(), label))
    }

    fn submit_command_buffer(&self, id: CommandBufferId) -> Result<(), ResourceError> {
        let mut state = self.state()?;
        let buffer = state
            .pending_command_buffers
            .remove(&id)
            .ok_or(ResourceError::InvalidHandle)?;
        state.execute(&buffer.commands);
        log::trace!(
            "NullDevice: submitted {id:?} with {} draw call(s)",
            buffer.draw_calls()
        );
        state.submitted_command_buffers.push(buffer);
        Ok(())
    }

    fn surface_format(&self) -> Option<TextureFormat> {
        self.surface_format
    }

    fn adapter_info(&self) -> RendererAdapterInfo {
        RendererAdapterInfo {
            name: "Null Device".to_string(),
            backend_type: GraphicsBackendType::Unknown,
            device_type: RendererDeviceType::Cpu,
        }
    }

    fn supports_feature(&self, feature_name: &str) -> bool {
        self.features.contains(feature_name)
    }

    fn device_type(&self) -> GraphicsDeviceType {
        GraphicsDeviceType::Null
    }

    fn allocated_bytes(&self) -> u64 {
        self.inspect(|s| s.allocated_bytes).unwrap_or(0)
    }
}
