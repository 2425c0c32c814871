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

//! The concrete, WGPU-based implementation of the `RenderSystem` trait.

use super::backend::WgpuBackendSelector;
use super::context::WgpuGraphicsContext;
use super::device::WgpuDevice;
use crate::graphics::draw::{record_draws, DepthTarget, TransformStream};
use crate::graphics::resize::{ResizeDebouncer, ResizeDecision};
use nova_core::platform::{NovaWindow, NovaWindowHandle};
use nova_core::renderer::{
    BackendSelectionConfig, BeginFrame, FrameInfo, FrameScheduler, FrameStatus,
    GraphicsBackendSelector, GraphicsDevice, LoadOp, Operations, RenderError, RenderPassColorAttachment,
    RenderPassDepthStencilAttachment, RenderPassDescriptor, RenderQueue, RenderSettings,
    RenderStats, RenderSystem, RendererAdapterInfo, StoreOp, SwapchainConfig, TextureViewId,
    ViewInfo,
};
use nova_core::Stopwatch;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;

const BYTES_PER_MIB: f32 = 1024.0 * 1024.0;

/// Renders a [`RenderQueue`] to a window surface through wgpu.
///
/// The system owns the graphics context and device, keeps the frame protocol
/// in a [`FrameScheduler`] and coalesces window resizes so that a drag does
/// not reconfigure the swapchain on every event.
pub struct WgpuRenderSystem {
    graphics_context_shared: Option<Arc<Mutex<WgpuGraphicsContext>>>,
    wgpu_device: Option<Arc<WgpuDevice>>,
    swapchain_config: SwapchainConfig,
    backend_config: BackendSelectionConfig,
    scheduler: FrameScheduler,
    current_width: u32,
    current_height: u32,
    last_frame_stats: RenderStats,
    current_frame_view_id: Option<TextureViewId>,
    depth: DepthTarget,
    transforms: TransformStream,
    resize: ResizeDebouncer,
    wireframe_reported: bool,
}

impl fmt::Debug for WgpuRenderSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WgpuRenderSystem")
            .field("initialized", &self.graphics_context_shared.is_some())
            .field("wgpu_device", &self.wgpu_device)
            .field("swapchain_config", &self.swapchain_config)
            .field("current_width", &self.current_width)
            .field("current_height", &self.current_height)
            .field("frame_status", &self.scheduler.status())
            .field("last_frame_stats", &self.last_frame_stats)
            .finish()
    }
}

impl Default for WgpuRenderSystem {
    fn default() -> Self {
        Self::new()
    }
}

fn lock_context(
    context: &Mutex<WgpuGraphicsContext>,
) -> Result<MutexGuard<'_, WgpuGraphicsContext>, RenderError> {
    context
        .lock()
        .map_err(|e| RenderError::RenderingFailed(format!("Failed to lock WgpuGraphicsContext: {e}")))
}

impl WgpuRenderSystem {
    /// Creates an uninitialized system with the default swapchain settings.
    ///
    /// Nothing can be rendered until [`RenderSystem::init`] is called.
    pub fn new() -> Self {
        Self::with_config(SwapchainConfig::default())
    }

    /// Creates an uninitialized system that will configure its swapchain with `config`.
    pub fn with_config(swapchain_config: SwapchainConfig) -> Self {
        log::info!("WgpuRenderSystem created (uninitialized).");
        Self {
            graphics_context_shared: None,
            wgpu_device: None,
            swapchain_config,
            backend_config: BackendSelectionConfig::default(),
            scheduler: FrameScheduler::new(swapchain_config.buffering),
            current_width: 0,
            current_height: 0,
            last_frame_stats: RenderStats::default(),
            current_frame_view_id: None,
            depth: DepthTarget::new(),
            transforms: TransformStream::new(),
            resize: ResizeDebouncer::new(),
            wireframe_reported: false,
        }
    }

    /// Overrides the adapter selection preferences used by `init`.
    pub fn with_backend_config(mut self, backend_config: BackendSelectionConfig) -> Self {
        self.backend_config = backend_config;
        self
    }

    async fn initialize(
        &mut self,
        window_handle: NovaWindowHandle,
        window_size: (u32, u32),
    ) -> Result<(), RenderError> {
        if self.graphics_context_shared.is_some() {
            return Err(RenderError::InitializationFailed(
                "WgpuRenderSystem is already initialized.".to_string(),
            ));
        }
        log::info!("WgpuRenderSystem: Initializing...");

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());
        let backend_selector = WgpuBackendSelector::new(instance.clone());
        let selection_result = backend_selector
            .select_backend(&self.backend_config)
            .await
            .map_err(RenderError::InitializationFailed)?;
        log::info!(
            "WgpuRenderSystem: selected '{}' ({:?}) in {} ms",
            selection_result.adapter_info.name,
            selection_result.selected_backend,
            selection_result.selection_time_ms
        );

        let swapchain_config = SwapchainConfig {
            width: window_size.0.max(1),
            height: window_size.1.max(1),
            ..self.swapchain_config
        };
        let context = WgpuGraphicsContext::new(
            &instance,
            window_handle,
            selection_result.adapter,
            swapchain_config,
        )
        .await
        .map_err(|e| RenderError::InitializationFailed(e.to_string()))?;

        (self.current_width, self.current_height) = context.get_size();
        self.swapchain_config = context.swapchain_config;
        let context_arc = Arc::new(Mutex::new(context));
        self.graphics_context_shared = Some(Arc::clone(&context_arc));

        log::info!(
            "WgpuRenderSystem: GraphicsContext created with size: {}x{}",
            self.current_width,
            self.current_height
        );

        let device = Arc::new(WgpuDevice::new(context_arc));
        self.wgpu_device = Some(Arc::clone(&device));

        self.scheduler = FrameScheduler::new(self.swapchain_config.buffering);
        self.scheduler
            .set_surface_available(window_size.0 > 0 && window_size.1 > 0);
        self.resize.mark_configured(Instant::now());
        self.depth
            .recreate(device.as_ref(), self.current_width, self.current_height)?;
        Ok(())
    }

    /// Reconfigures the surface at the current size and acknowledges it to the scheduler.
    fn recreate_swapchain(&mut self) -> Result<(), RenderError> {
        let (Some(gc), Some(device)) = (&self.graphics_context_shared, &self.wgpu_device) else {
            return Err(RenderError::NotInitialized);
        };
        lock_context(gc)?.resize(self.current_width, self.current_height);
        self.scheduler.swapchain_recreated();
        self.resize.mark_configured(Instant::now());
        if let Err(e) = self
            .depth
            .recreate(device.as_ref(), self.current_width, self.current_height)
        {
            log::warn!("Failed to recreate depth texture during resize: {e}");
        }
        log::info!(
            "WgpuRenderSystem: swapchain configured to {}x{}",
            self.current_width,
            self.current_height
        );
        Ok(())
    }

    /// Starts a frame, recreating the swapchain first when the scheduler asks for it.
    /// `None` means the frame is skipped.
    fn begin_scheduled_frame(&mut self) -> Result<Option<FrameInfo>, RenderError> {
        for _ in 0..2 {
            match self.scheduler.begin_frame()? {
                BeginFrame::Ready(info) => return Ok(Some(info)),
                BeginFrame::Skipped => return Ok(None),
                BeginFrame::RecreateSwapchain => self.recreate_swapchain()?,
            }
        }
        Ok(None)
    }

    /// Acquires the next swapchain image. Lost or outdated surfaces invalidate
    /// the swapchain and yield `Ok(None)` so the caller can retry.
    fn acquire_surface_texture(
        &mut self,
        gc: &Mutex<WgpuGraphicsContext>,
    ) -> Result<Option<wgpu::SurfaceTexture>, RenderError> {
        let acquired = lock_context(gc)?.get_current_texture();
        match acquired {
            Ok(texture) => Ok(Some(texture)),
            Err(e @ wgpu::SurfaceError::Lost) | Err(e @ wgpu::SurfaceError::Outdated) => {
                log::warn!(
                    "WgpuRenderSystem: Swapchain surface lost or outdated ({:?}). Reconfiguring with W={}, H={}",
                    e,
                    self.current_width,
                    self.current_height
                );
                self.scheduler.abort_frame();
                self.scheduler.invalidate_swapchain();
                Ok(None)
            }
            Err(e @ wgpu::SurfaceError::OutOfMemory) => {
                log::error!("WgpuRenderSystem: Swapchain OutOfMemory! ({e:?})");
                self.scheduler.abort_frame();
                Err(RenderError::SurfaceAcquisitionFailed(format!(
                    "OutOfMemory: {e:?}"
                )))
            }
            Err(e @ wgpu::SurfaceError::Timeout) => {
                log::warn!("WgpuRenderSystem: Swapchain Timeout acquiring frame. ({e:?})");
                self.scheduler.abort_frame();
                Err(RenderError::SurfaceAcquisitionFailed(format!(
                    "Timeout: {e:?}"
                )))
            }
            Err(e) => {
                log::error!("WgpuRenderSystem: Unexpected SurfaceError: {e:?}");
                self.scheduler.abort_frame();
                Err(RenderError::SurfaceAcquisitionFailed(format!(
                    "Unexpected SurfaceError: {e:?}"
                )))
            }
        }
    }

    /// Records the clear pass and every draw, then submits. Returns
    /// `(draw_calls, triangles, submission_ms)`.
    fn record_and_submit(
        &mut self,
        device: &WgpuDevice,
        surface_texture: &wgpu::SurfaceTexture,
        queue: &RenderQueue,
        view_info: &ViewInfo,
    ) -> Result<(u32, u32, f64), RenderError> {
        let transforms = self.transforms.upload(device, queue, view_info)?;

        if let Some(old_id) = self.current_frame_view_id.take() {
            device.destroy_texture_view(old_id)?;
        }
        let target_view_id = device.create_texture_view_for_surface(
            &surface_texture.texture,
            Some("Primary Swap Chain View"),
        )?;
        self.current_frame_view_id = Some(target_view_id);

        let mut command_encoder = device.create_command_encoder(Some("Nova Main Command Encoder"));
        let (draw_calls, triangles) = {
            let color_attachment = RenderPassColorAttachment {
                view: &target_view_id,
                resolve_target: None,
                ops: Operations {
                    load: LoadOp::Clear(view_info.clear_color),
                    store: StoreOp::Store,
                },
            };
            let depth_view = self.depth.view();
            let depth_attachment =
                depth_view
                    .as_ref()
                    .map(|view| RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(Operations {
                            load: LoadOp::Clear(1.0),
                            store: StoreOp::Store,
                        }),
                    });
            let pass_descriptor = RenderPassDescriptor {
                label: Some("Nova Main Render Pass"),
                color_attachments: &[color_attachment],
                depth_stencil_attachment: depth_attachment,
            };
            let mut render_pass = command_encoder.begin_render_pass(&pass_descriptor);
            record_draws(render_pass.as_mut(), queue, transforms)
        };

        let submission_timer = Stopwatch::new();
        let command_buffer = command_encoder.finish();
        self.scheduler.end_frame()?;
        device.submit_command_buffer(command_buffer)?;
        Ok((draw_calls, triangles, submission_timer.elapsed_ms()))
    }

    fn sync_scheduler_stats(&mut self) {
        self.last_frame_stats.frame_number = self.scheduler.frames_presented();
        self.last_frame_stats.frames_skipped = self.scheduler.frames_skipped();
        self.last_frame_stats.swapchain_recreations = self.scheduler.swapchain_recreations();
        if let Some(device) = &self.wgpu_device {
            self.last_frame_stats.vram_usage_estimate_mb =
                device.allocated_bytes() as f32 / BYTES_PER_MIB;
        }
    }
}

impl RenderSystem for WgpuRenderSystem {
    fn init(&mut self, window: &dyn NovaWindow) -> Result<(), RenderError> {
        let window_size = window.inner_size();
        let window_handle_arc = window.clone_handle_arc();
        pollster::block_on(self.initialize(window_handle_arc, window_size))
    }

    fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == 0 || new_height == 0 {
            log::debug!("WgpuRenderSystem: surface unavailable ({new_width}x{new_height}).");
            self.scheduler.set_surface_available(false);
            return;
        }
        self.scheduler.set_surface_available(true);
        if (new_width, new_height) == (self.current_width, self.current_height)
            && !self.resize.is_pending()
        {
            return;
        }

        log::debug!("WgpuRenderSystem: resize requested to W:{new_width}, H:{new_height}");
        self.current_width = new_width;
        self.current_height = new_height;
        match self.resize.request(new_width, new_height, Instant::now()) {
            ResizeDecision::Apply => self.scheduler.invalidate_swapchain(),
            ResizeDecision::Deferred | ResizeDecision::Ignored => {}
        }
    }

    fn render(
        &mut self,
        queue: &RenderQueue,
        view_info: &ViewInfo,
        settings: &RenderSettings,
    ) -> Result<RenderStats, RenderError> {
        let full_frame_timer = Stopwatch::new();
        let device = self
            .wgpu_device
            .clone()
            .ok_or(RenderError::NotInitialized)?;
        let gc = self
            .graphics_context_shared
            .clone()
            .ok_or(RenderError::NotInitialized)?;

        device.poll_device_non_blocking();

        if settings.wireframe && !self.wireframe_reported {
            log::info!("WgpuRenderSystem: wireframe is selected per pipeline through PolygonMode::Line.");
            self.wireframe_reported = true;
        }

        if self.resize.is_pending() {
            if self.resize.poll(settings, Instant::now()) {
                self.scheduler.invalidate_swapchain();
            } else {
                return Ok(self.last_frame_stats.clone());
            }
        }

        // A lost surface gets one recreation and a second acquisition attempt.
        let mut acquired = None;
        for _ in 0..2 {
            if self.begin_scheduled_frame()?.is_none() {
                self.sync_scheduler_stats();
                return Ok(self.last_frame_stats.clone());
            }
            if let Some(texture) = self.acquire_surface_texture(&gc)? {
                acquired = Some(texture);
                break;
            }
        }
        let Some(surface_texture) = acquired else {
            self.sync_scheduler_stats();
            return Err(RenderError::SurfaceAcquisitionFailed(
                "Surface stayed lost after reconfiguration".to_string(),
            ));
        };

        let recording_timer = Stopwatch::new();
        let (draw_calls, triangles, submission_ms) =
            match self.record_and_submit(&device, &surface_texture, queue, view_info) {
                Ok(result) => result,
                Err(e) => {
                    self.scheduler.abort_frame();
                    return Err(e);
                }
            };
        let recording_ms = recording_timer.elapsed_ms();

        surface_texture.present();
        self.scheduler.present()?;

        self.last_frame_stats.draw_calls = draw_calls;
        self.last_frame_stats.triangles_rendered = triangles;
        self.last_frame_stats.cpu_preparation_time_ms =
            (full_frame_timer.elapsed_ms() - recording_ms).max(0.0) as f32;
        self.last_frame_stats.cpu_render_submission_time_ms = submission_ms as f32;
        self.sync_scheduler_stats();
        Ok(self.last_frame_stats.clone())
    }

    fn last_frame_stats(&self) -> &RenderStats {
        &self.last_frame_stats
    }

    fn frame_status(&self) -> FrameStatus {
        self.scheduler.status()
    }

    fn adapter_info(&self) -> Option<RendererAdapterInfo> {
        self.wgpu_device.as_ref().map(|d| d.adapter_info())
    }

    fn graphics_device(&self) -> Option<Arc<dyn GraphicsDevice>> {
        self.wgpu_device
            .clone()
            .map(|device| device as Arc<dyn GraphicsDevice>)
    }

    fn supports_feature(&self, feature_name: &str) -> bool {
        self.wgpu_device
            .as_ref()
            .is_some_and(|d| d.supports_feature(feature_name))
    }

    fn shutdown(&mut self) {
        log::info!("WgpuRenderSystem shutting down...");
        if let Some(device) = self.wgpu_device.take() {
            if let Some(view) = self.current_frame_view_id.take() {
                let _ = device.destroy_texture_view(view);
            }
            self.depth.release(device.as_ref());
            self.transforms.release(device.as_ref());
            device.poll_device_blocking();
        }
        self.scheduler.abort_frame();
        self.graphics_context_shared = None;
        log::info!("WgpuRenderSystem shutdown complete.");
    }
}

impl Drop for WgpuRenderSystem {
    fn drop(&mut self) {
        if self.graphics_context_shared.is_some() {
            self.shutdown();
        }
    }
}
