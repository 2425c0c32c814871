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

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use wgpu::util::DeviceExt;

use nova_core::renderer::{
    BufferDescriptor, BufferId, CommandBufferId, CommandEncoder, Extent3D, GraphicsDevice,
    GraphicsDeviceType, Origin3D, PipelineError, RenderPipelineDescriptor, RenderPipelineId,
    RendererAdapterInfo, ResourceError, SamplerDescriptor, SamplerId, ShaderError,
    ShaderModuleDescriptor, ShaderModuleId, ShaderSourceData, TextureDescriptor, TextureFormat,
    TextureId, TextureViewDescriptor, TextureViewId,
};

use super::backend::WgpuBackendSelector;
use super::command::WgpuCommandEncoder;
use super::context::WgpuGraphicsContext;
use super::conversions::{from_wgpu_texture_format, IntoWgpu};
use crate::graphics::validation::{self, ShaderEntryPoint};

#[derive(Debug)]
struct WgpuShaderModuleEntry {
    wgpu_module: Arc<wgpu::ShaderModule>,
    entry_points: Vec<ShaderEntryPoint>,
}

#[derive(Debug)]
pub(crate) struct WgpuBufferEntry {
    pub(crate) wgpu_buffer: Arc<wgpu::Buffer>,
    pub(crate) size: u64,
}

#[derive(Debug)]
pub(crate) struct WgpuTextureEntry {
    pub(crate) wgpu_texture: Arc<wgpu::Texture>,
    pub(crate) size: u64,
}

/// Resource tables of a [`WgpuDevice`].
#[derive(Debug)]
struct WgpuDeviceInternal {
    context: Arc<Mutex<WgpuGraphicsContext>>,
    shader_modules: Mutex<HashMap<ShaderModuleId, WgpuShaderModuleEntry>>,
    pipelines: Mutex<HashMap<RenderPipelineId, Arc<wgpu::RenderPipeline>>>,
    buffers: Mutex<HashMap<BufferId, WgpuBufferEntry>>,
    textures: Mutex<HashMap<TextureId, WgpuTextureEntry>>,
    texture_views: Mutex<HashMap<TextureViewId, Arc<wgpu::TextureView>>>,
    samplers: Mutex<HashMap<SamplerId, Arc<wgpu::Sampler>>>,

    next_shader_id: AtomicUsize,
    next_pipeline_id: AtomicUsize,
    next_buffer_id: AtomicUsize,
    next_texture_id: AtomicUsize,
    next_texture_view_id: AtomicUsize,
    next_sampler_id: AtomicUsize,

    vram_allocated_bytes: AtomicU64,
    vram_peak_bytes: AtomicU64,

    /// Finished command buffers waiting for `submit_command_buffer`.
    pending_command_buffers: Mutex<HashMap<CommandBufferId, wgpu::CommandBuffer>>,
    command_buffer_id_counter: AtomicU64,
}

/// Cloneable, thread-safe handle to the wgpu device and its resource tables.
#[derive(Clone, Debug)]
pub struct WgpuDevice {
    internal: Arc<WgpuDeviceInternal>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, what: &str) -> Result<MutexGuard<'a, T>, ResourceError> {
    mutex
        .lock()
        .map_err(|e| ResourceError::BackendError(format!("Mutex poisoned ({what}): {e}")))
}

impl WgpuDevice {
    pub fn new(context: Arc<Mutex<WgpuGraphicsContext>>) -> Self {
        Self {
            internal: Arc::new(WgpuDeviceInternal {
                context,
                shader_modules: Mutex::new(HashMap::new()),
                pipelines: Mutex::new(HashMap::new()),
                buffers: Mutex::new(HashMap::new()),
                textures: Mutex::new(HashMap::new()),
                texture_views: Mutex::new(HashMap::new()),
                samplers: Mutex::new(HashMap::new()),
                next_shader_id: AtomicUsize::new(0),
                next_pipeline_id: AtomicUsize::new(0),
                next_buffer_id: AtomicUsize::new(0),
                next_texture_id: AtomicUsize::new(0),
                next_texture_view_id: AtomicUsize::new(0),
                next_sampler_id: AtomicUsize::new(0),
                vram_allocated_bytes: AtomicU64::new(0),
                vram_peak_bytes: AtomicU64::new(0),
                pending_command_buffers: Mutex::new(HashMap::new()),
                command_buffer_id_counter: AtomicU64::new(0),
            }),
        }
    }

    // --- ID Generation Helpers ---

    fn generate_shader_id(&self) -> ShaderModuleId {
        ShaderModuleId(self.internal.next_shader_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_pipeline_id(&self) -> RenderPipelineId {
        RenderPipelineId(self.internal.next_pipeline_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_buffer_id(&self) -> BufferId {
        BufferId(self.internal.next_buffer_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_texture_id(&self) -> TextureId {
        TextureId(self.internal.next_texture_id.fetch_add(1, Ordering::Relaxed))
    }

    fn generate_texture_view_id(&self) -> TextureViewId {
        TextureViewId(
            self.internal
                .next_texture_view_id
                .fetch_add(1, Ordering::Relaxed),
        )
    }

    fn generate_sampler_id(&self) -> SamplerId {
        SamplerId(self.internal.next_sampler_id.fetch_add(1, Ordering::Relaxed))
    }

    fn next_command_buffer_id(&self) -> CommandBufferId {
        CommandBufferId(
            self.internal
                .command_buffer_id_counter
                .fetch_add(1, Ordering::SeqCst),
        )
    }

    /// Runs `operation` with the context locked.
    fn with_context<F, R>(&self, operation: F) -> Result<R, ResourceError>
    where
        F: FnOnce(&WgpuGraphicsContext) -> Result<R, ResourceError>,
    {
        let context_guard = lock(&self.internal.context, "graphics context")?;
        operation(&context_guard)
    }

    fn track_allocation(&self, bytes: u64) {
        let total = self
            .internal
            .vram_allocated_bytes
            .fetch_add(bytes, Ordering::Relaxed)
            + bytes;
        self.internal
            .vram_peak_bytes
            .fetch_max(total, Ordering::Relaxed);
    }

    fn track_release(&self, bytes: u64) {
        let _ = self.internal.vram_allocated_bytes.fetch_update(
            Ordering::Relaxed,
            Ordering::Relaxed,
            |current| Some(current.saturating_sub(bytes)),
        );
    }

    /// Highest value [`GraphicsDevice::allocated_bytes`] has reached.
    pub fn peak_allocated_bytes(&self) -> u64 {
        self.internal.vram_peak_bytes.load(Ordering::Relaxed)
    }

    pub fn get_wgpu_render_pipeline(&self, id: RenderPipelineId) -> Option<Arc<wgpu::RenderPipeline>> {
        let pipelines = self.internal.pipelines.lock().ok()?;
        pipelines.get(&id).cloned()
    }

    pub fn get_wgpu_buffer(&self, id: BufferId) -> Option<Arc<wgpu::Buffer>> {
        let buffers = self.internal.buffers.lock().ok()?;
        buffers.get(&id).map(|entry| Arc::clone(&entry.wgpu_buffer))
    }

    pub fn get_wgpu_texture_view(&self, id: TextureViewId) -> Option<Arc<wgpu::TextureView>> {
        let views = self.internal.texture_views.lock().ok()?;
        views.get(&id).cloned()
    }

    /// Waits for the queue to drain. Used at shutdown before resources are dropped.
    pub fn poll_device_blocking(&self) {
        if let Ok(context_guard) = self.internal.context.lock() {
            if let Err(e) = context_guard.device.poll(wgpu::PollType::wait_indefinitely()) {
                log::warn!("Failed to poll device during shutdown: {:?}", e);
            }
        } else {
            log::error!("WgpuDevice context mutex was poisoned during shutdown poll.");
        }
    }

    /// Processes finished GPU work without waiting.
    pub fn poll_device_non_blocking(&self) {
        if let Ok(context_guard) = self.internal.context.lock() {
            if let Err(e) = context_guard.device.poll(wgpu::PollType::Poll) {
                log::warn!("Failed to poll device (non-blocking): {:?}", e);
            }
        }
    }

    /// Registers a view of a texture the device does not own, such as a swapchain image.
    pub fn create_texture_view_for_surface(
        &self,
        texture: &wgpu::Texture,
        label: Option<&str>,
    ) -> Result<TextureViewId, ResourceError> {
        let wgpu_view = Arc::new(texture.create_view(&wgpu::TextureViewDescriptor {
            label,
            ..Default::default()
        }));
        let id = self.generate_texture_view_id();
        lock(&self.internal.texture_views, "texture_views")?.insert(id, wgpu_view);
        Ok(id)
    }

    pub(crate) fn register_command_buffer(&self, buffer: wgpu::CommandBuffer) -> CommandBufferId {
        let id = self.next_command_buffer_id();
        match self.internal.pending_command_buffers.lock() {
            Ok(mut guard) => {
                guard.insert(id, buffer);
            }
            Err(e) => log::error!("WgpuDevice: dropping command buffer {id:?}: {e}"),
        }
        id
    }

    /// An id that is never registered, so submitting it fails.
    pub(crate) fn orphan_command_buffer_id(&self) -> CommandBufferId {
        self.next_command_buffer_id()
    }
}

impl GraphicsDevice for WgpuDevice {
    // --- Shader Module Operations ---

    fn create_shader_module(
        &self,
        descriptor: &ShaderModuleDescriptor,
    ) -> Result<ShaderModuleId, ResourceError> {
        let entry_points = validation::parse_shader_source(descriptor)?;
        let wgpu_source = match &descriptor.source {
            ShaderSourceData::Wgsl(src) => wgpu::ShaderSource::Wgsl(src.clone()),
        };
        let label = descriptor.label;

        let wgpu_module = self.with_context(|context| {
            log::debug!("WgpuDevice: Creating wgpu::ShaderModule with label: {label:?}");
            Ok(Arc::new(context.device.create_shader_module(
                wgpu::ShaderModuleDescriptor {
                    label,
                    source: wgpu_source,
                },
            )))
        })?;

        let id = self.generate_shader_id();
        lock(&self.internal.shader_modules, "shader_modules")?.insert(
            id,
            WgpuShaderModuleEntry {
                wgpu_module,
                entry_points,
            },
        );
        log::info!(
            "WgpuDevice: Created shader module '{}' with ID: {:?}",
            label.unwrap_or_default(),
            id
        );
        Ok(id)
    }

    fn destroy_shader_module(&self, id: ShaderModuleId) -> Result<(), ResourceError> {
        let mut modules = lock(&self.internal.shader_modules, "shader_modules")?;
        if modules.remove(&id).is_some() {
            log::debug!("WgpuDevice: Destroyed shader module with ID: {id:?}");
            Ok(())
        } else {
            Err(ShaderError::NotFound { id }.into())
        }
    }

    // --- Render Pipeline Operations ---

    fn create_render_pipeline(
        &self,
        descriptor: &RenderPipelineDescriptor,
    ) -> Result<RenderPipelineId, ResourceError> {
        log::debug!(
            "WgpuDevice: Creating render pipeline with label: {:?}",
            descriptor.label
        );

        let modules = lock(&self.internal.shader_modules, "shader_modules")?;
        validation::check_pipeline_stages(descriptor, |id| {
            modules.get(&id).map(|e| e.entry_points.as_slice())
        })?;

        let vs_module = modules
            .get(&descriptor.vertex_shader_module)
            .map(|e| Arc::clone(&e.wgpu_module))
            .ok_or(ShaderError::NotFound {
                id: descriptor.vertex_shader_module,
            })?;
        let fs_module = descriptor
            .fragment_shader_module
            .and_then(|id| modules.get(&id))
            .map(|e| Arc::clone(&e.wgpu_module));
        drop(modules);

        // Attribute storage must outlive the borrowed layouts below.
        let attributes: Vec<Vec<wgpu::VertexAttribute>> = descriptor
            .vertex_buffers_layout
            .iter()
            .map(|layout| {
                layout
                    .attributes
                    .iter()
                    .map(|attr| wgpu::VertexAttribute {
                        format: attr.format.into_wgpu(),
                        offset: attr.offset,
                        shader_location: attr.shader_location,
                    })
                    .collect()
            })
            .collect();
        let vertex_buffers: Vec<wgpu::VertexBufferLayout> = descriptor
            .vertex_buffers_layout
            .iter()
            .zip(attributes.iter())
            .map(|(layout, attributes)| wgpu::VertexBufferLayout {
                array_stride: layout.array_stride,
                step_mode: layout.step_mode.into_wgpu(),
                attributes,
            })
            .collect();

        let primitive = wgpu::PrimitiveState {
            topology: descriptor.primitive_state.topology.into_wgpu(),
            strip_index_format: descriptor
                .primitive_state
                .strip_index_format
                .map(|f| f.into_wgpu()),
            front_face: descriptor.primitive_state.front_face.into_wgpu(),
            cull_mode: descriptor.primitive_state.cull_mode.map(|m| m.into_wgpu()),
            polygon_mode: descriptor.primitive_state.polygon_mode.into_wgpu(),
            unclipped_depth: false,
            conservative: false,
        };

        let depth_stencil = descriptor
            .depth_stencil_state
            .map(|ds| wgpu::DepthStencilState {
                format: ds.format.into_wgpu(),
                depth_write_enabled: ds.depth_write_enabled,
                depth_compare: ds.depth_compare.into_wgpu(),
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            });

        let color_targets: Vec<Option<wgpu::ColorTargetState>> = descriptor
            .color_target_states
            .iter()
            .map(|cts| {
                Some(wgpu::ColorTargetState {
                    format: cts.format.into_wgpu(),
                    blend: cts.blend.map(|b| b.into_wgpu()),
                    write_mask: cts.write_mask.into_wgpu(),
                })
            })
            .collect();

        let multisample = wgpu::MultisampleState {
            count: descriptor.multisample_state.count.into_wgpu(),
            mask: descriptor.multisample_state.mask,
            alpha_to_coverage_enabled: descriptor.multisample_state.alpha_to_coverage_enabled,
        };

        let pipeline = self.with_context(|context| {
            let fragment = fs_module.as_ref().map(|module| wgpu::FragmentState {
                module,
                entry_point: descriptor.fragment_entry_point.as_deref(),
                targets: &color_targets,
                compilation_options: Default::default(),
            });
            Ok(Arc::new(context.device.create_render_pipeline(
                &wgpu::RenderPipelineDescriptor {
                    label: descriptor.label.as_deref(),
                    layout: None,
                    vertex: wgpu::VertexState {
                        module: &vs_module,
                        entry_point: Some(&*descriptor.vertex_entry_point),
                        buffers: &vertex_buffers,
                        compilation_options: Default::default(),
                    },
                    fragment,
                    primitive,
                    depth_stencil,
                    multisample,
                    multiview_mask: None,
                    cache: None,
                },
            )))
        })?;

        let id = self.generate_pipeline_id();
        lock(&self.internal.pipelines, "pipelines")?.insert(id, pipeline);
        log::info!(
            "WgpuDevice: Created render pipeline '{}' with ID: {:?}",
            descriptor.label.as_deref().unwrap_or_default(),
            id
        );
        Ok(id)
    }

    fn destroy_render_pipeline(&self, id: RenderPipelineId) -> Result<(), ResourceError> {
        let mut pipelines = lock(&self.internal.pipelines, "pipelines")?;
        if pipelines.remove(&id).is_some() {
            log::debug!("WgpuDevice: Destroyed render pipeline with ID: {id:?}");
            Ok(())
        } else {
            Err(PipelineError::InvalidRenderPipeline { id }.into())
        }
    }

    // --- Buffer Operations ---

    fn create_buffer(&self, descriptor: &BufferDescriptor) -> Result<BufferId, ResourceError> {
        validation::check_buffer_descriptor(descriptor)?;
        let buffer = self.with_context(|context| {
            Ok(context.device.create_buffer(&wgpu::BufferDescriptor {
                label: descriptor.label.as_deref(),
                size: descriptor.size,
                usage: descriptor.usage.into_wgpu(),
                mapped_at_creation: descriptor.mapped_at_creation,
            }))
        })?;

        let id = self.generate_buffer_id();
        lock(&self.internal.buffers, "buffers")?.insert(
            id,
            WgpuBufferEntry {
                wgpu_buffer: Arc::new(buffer),
                size: descriptor.size,
            },
        );
        self.track_allocation(descriptor.size);
        log::debug!(
            "WgpuDevice: Created buffer '{}' ({} bytes) with ID: {:?}",
            descriptor.label.as_deref().unwrap_or_default(),
            descriptor.size,
            id
        );
        Ok(id)
    }

    fn create_buffer_with_data(
        &self,
        descriptor: &BufferDescriptor,
        data: &[u8],
    ) -> Result<BufferId, ResourceError> {
        let size = data.len() as u64;
        validation::check_buffer_descriptor(&BufferDescriptor {
            size,
            ..descriptor.clone()
        })?;
        let buffer = self.with_context(|context| {
            Ok(context
                .device
                .create_buffer_init(&wgpu::util::BufferInitDescriptor {
                    label: descriptor.label.as_deref(),
                    contents: data,
                    usage: descriptor.usage.into_wgpu(),
                }))
        })?;

        let id = self.generate_buffer_id();
        lock(&self.internal.buffers, "buffers")?.insert(
            id,
            WgpuBufferEntry {
                wgpu_buffer: Arc::new(buffer),
                size,
            },
        );
        self.track_allocation(size);
        Ok(id)
    }

    fn destroy_buffer(&self, id: BufferId) -> Result<(), ResourceError> {
        let entry = lock(&self.internal.buffers, "buffers")?
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        entry.wgpu_buffer.destroy();
        self.track_release(entry.size);
        log::debug!("WgpuDevice: Destroyed buffer with ID: {id:?}");
        Ok(())
    }

    fn write_buffer(&self, id: BufferId, offset: u64, data: &[u8]) -> Result<(), ResourceError> {
        let buffer = {
            let buffers = lock(&self.internal.buffers, "buffers")?;
            let entry = buffers.get(&id).ok_or(ResourceError::NotFound)?;
            validation::check_write_range(entry.size, offset, data.len())?;
            Arc::clone(&entry.wgpu_buffer)
        };
        self.with_context(|context| {
            context.queue.write_buffer(&buffer, offset, data);
            Ok(())
        })
    }

    fn buffer_size(&self, id: BufferId) -> Result<u64, ResourceError> {
        lock(&self.internal.buffers, "buffers")?
            .get(&id)
            .map(|entry| entry.size)
            .ok_or(ResourceError::NotFound)
    }

    // --- Texture Operations ---

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<TextureId, ResourceError> {
        validation::check_texture_descriptor(descriptor)?;
        let texture = self.with_context(|context| {
            Ok(context.device.create_texture(&wgpu::TextureDescriptor {
                label: descriptor.label.as_deref(),
                size: descriptor.size.into_wgpu(),
                mip_level_count: descriptor.mip_level_count,
                sample_count: descriptor.sample_count.into_wgpu(),
                dimension: descriptor.dimension.into_wgpu(),
                format: descriptor.format.into_wgpu(),
                usage: descriptor.usage.into_wgpu(),
                view_formats: &[],
            }))
        })?;

        let size = descriptor.base_level_bytes();
        let id = self.generate_texture_id();
        lock(&self.internal.textures, "textures")?.insert(
            id,
            WgpuTextureEntry {
                wgpu_texture: Arc::new(texture),
                size,
            },
        );
        self.track_allocation(size);
        log::debug!(
            "WgpuDevice: Created texture '{}' with ID: {:?}",
            descriptor.label.as_deref().unwrap_or_default(),
            id
        );
        Ok(id)
    }

    fn destroy_texture(&self, id: TextureId) -> Result<(), ResourceError> {
        let entry = lock(&self.internal.textures, "textures")?
            .remove(&id)
            .ok_or(ResourceError::NotFound)?;
        entry.wgpu_texture.destroy();
        self.track_release(entry.size);
        log::debug!("WgpuDevice: Destroyed texture with ID: {id:?}");
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
        let texture = {
            let textures = lock(&self.internal.textures, "textures")?;
            let entry = textures.get(&texture_id).ok_or(ResourceError::NotFound)?;
            Arc::clone(&entry.wgpu_texture)
        };
        self.with_context(|context| {
            context.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: 0,
                    origin: origin.into_wgpu(),
                    aspect: wgpu::TextureAspect::All,
                },
                data,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row,
                    rows_per_image: None,
                },
                size.into_wgpu(),
            );
            Ok(())
        })
    }

    fn create_texture_view(
        &self,
        texture_id: TextureId,
        descriptor: &TextureViewDescriptor,
    ) -> Result<TextureViewId, ResourceError> {
        let texture = {
            let textures = lock(&self.internal.textures, "textures")?;
            let entry = textures.get(&texture_id).ok_or(ResourceError::NotFound)?;
            Arc::clone(&entry.wgpu_texture)
        };
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: descriptor.label.as_deref(),
            format: descriptor.format.map(|f| f.into_wgpu()),
            dimension: descriptor.dimension.map(|d| d.into_wgpu()),
            aspect: descriptor.aspect.into_wgpu(),
            base_mip_level: descriptor.base_mip_level,
            mip_level_count: descriptor.mip_level_count,
            base_array_layer: descriptor.base_array_layer,
            array_layer_count: descriptor.array_layer_count,
            ..Default::default()
        });
        let id = self.generate_texture_view_id();
        lock(&self.internal.texture_views, "texture_views")?.insert(id, Arc::new(view));
        Ok(id)
    }

    fn destroy_texture_view(&self, id: TextureViewId) -> Result<(), ResourceError> {
        lock(&self.internal.texture_views, "texture_views")?
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    fn create_sampler(&self, descriptor: &SamplerDescriptor) -> Result<SamplerId, ResourceError> {
        let sampler = self.with_context(|context| {
            Ok(context.device.create_sampler(&wgpu::SamplerDescriptor {
                label: descriptor.label.as_deref(),
                address_mode_u: descriptor.address_mode_u.into_wgpu(),
                address_mode_v: descriptor.address_mode_v.into_wgpu(),
                address_mode_w: descriptor.address_mode_w.into_wgpu(),
                mag_filter: descriptor.mag_filter.into_wgpu(),
                min_filter: descriptor.min_filter.into_wgpu(),
                mipmap_filter: descriptor.mipmap_filter.into_wgpu(),
                lod_min_clamp: descriptor.lod_min_clamp,
                lod_max_clamp: descriptor.lod_max_clamp,
                compare: descriptor.compare.map(|c| c.into_wgpu()),
                anisotropy_clamp: descriptor.anisotropy_clamp.max(1),
                border_color: None,
            }))
        })?;
        let id = self.generate_sampler_id();
        lock(&self.internal.samplers, "samplers")?.insert(id, Arc::new(sampler));
        Ok(id)
    }

    fn destroy_sampler(&self, id: SamplerId) -> Result<(), ResourceError> {
        lock(&self.internal.samplers, "samplers")?
            .remove(&id)
            .map(|_| ())
            .ok_or(ResourceError::NotFound)
    }

    // --- Commands ---

    fn create_command_encoder(&self, label: Option<&str>) -> Box<dyn CommandEncoder> {
        let encoder = self
            .with_context(|context| {
                Ok(context
                    .device
                    .create_command_encoder(&wgpu::CommandEncoderDescriptor { label }))
            })
            .map_err(|e| log::error!("WgpuDevice: cannot create command encoder: {e}"))
            .ok();
        Box::new(WgpuCommandEncoder {
            encoder,
            device: self.clone(),
        })
    }

    fn submit_command_buffer(&self, id: CommandBufferId) -> Result<(), ResourceError> {
        let buffer = lock(&self.internal.pending_command_buffers, "command buffers")?
            .remove(&id)
            .ok_or(ResourceError::InvalidHandle)?;
        self.with_context(|context| {
            context.queue.submit(std::iter::once(buffer));
            Ok(())
        })
    }

    // --- Queries ---

    fn surface_format(&self) -> Option<TextureFormat> {
        let context = self.internal.context.lock().ok()?;
        Some(from_wgpu_texture_format(context.surface_config.format))
    }

    fn adapter_info(&self) -> RendererAdapterInfo {
        match self.internal.context.lock() {
            Ok(context) => RendererAdapterInfo {
                name: context.adapter_name.clone(),
                backend_type: WgpuBackendSelector::backend_to_type(context.adapter_backend),
                device_type: WgpuBackendSelector::device_type_to_type(context.adapter_device_type),
            },
            Err(_) => RendererAdapterInfo::default(),
        }
    }

    fn supports_feature(&self, feature_name: &str) -> bool {
        let Ok(context) = self.internal.context.lock() else {
            return false;
        };
        let features = context.active_device_features;
        match feature_name {
            "timestamp_query" => features.contains(wgpu::Features::TIMESTAMP_QUERY),
            "polygon_mode_line" => features.contains(wgpu::Features::POLYGON_MODE_LINE),
            "depth_clip_control" => features.contains(wgpu::Features::DEPTH_CLIP_CONTROL),
            "texture_compression_bc" => features.contains(wgpu::Features::TEXTURE_COMPRESSION_BC),
            _ => false,
        }
    }

    fn device_type(&self) -> GraphicsDeviceType {
        GraphicsDeviceType::Wgpu
    }

    fn allocated_bytes(&self) -> u64 {
        self.internal.vram_allocated_bytes.load(Ordering::Relaxed)
    }
}
