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

use std::borrow::Cow;
use std::sync::Arc;
use std::time::Instant;

use nova_core::platform::NovaWindow;
use nova_core::renderer::{
    BeginFrame, Extent3D, FrameScheduler, FrameStatus, GraphicsDevice, LoadOp, Operations,
    RenderError, RenderPassColorAttachment, RenderPassDepthStencilAttachment,
    RenderPassDescriptor, RenderQueue, RenderSettings, RenderStats, RenderSystem,
    RendererAdapterInfo, SampleCount, StoreOp, SwapchainConfig, TextureDescriptor,
    TextureDimension, TextureFormat, TextureId, TextureUsage, TextureViewDescriptor,
    TextureViewId, ViewInfo,
};
use nova_core::Stopwatch;

use super::device::NullDevice;
use crate::graphics::draw::{record_draws, DepthTarget, TransformStream};
use crate::graphics::resize::{ResizeDebouncer, ResizeDecision};

const BYTES_PER_MIB: f32 = 1024.0 * 1024.0;

/// Headless [`RenderSystem`] over a [`NullDevice`].
///
/// It follows the same frame protocol as the wgpu system, with an offscreen
/// color texture standing in for the swapchain image. Surface loss can be
/// injected with [`simulate_surface_lost`](Self::simulate_surface_lost).
#[derive(Debug)]
pub struct NullRenderSystem {
    device: Option<Arc<NullDevice>>,
    swapchain_config: SwapchainConfig,
    scheduler: FrameScheduler,
    current_width: u32,
    current_height: u32,
    last_frame_stats: RenderStats,
    backbuffer: Option<(TextureId, TextureViewId)>,
    depth: DepthTarget,
    transforms: TransformStream,
    resize: ResizeDebouncer,
    surface_lost: bool,
}

impl Default for NullRenderSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl NullRenderSystem {
    pub fn new() -> Self {
        Self::with_config(SwapchainConfig::default())
    }

    pub fn with_config(swapchain_config: SwapchainConfig) -> Self {
        log::info!("NullRenderSystem created (uninitialized).");
        Self {
            device: None,
            swapchain_config,
            scheduler: FrameScheduler::new(swapchain_config.buffering),
            current_width: 0,
            current_height: 0,
            last_frame_stats: RenderStats::default(),
            backbuffer: None,
            depth: DepthTarget::new(),
            transforms: TransformStream::new(),
            resize: ResizeDebouncer::new(),
            surface_lost: false,
        }
    }

    /// Initializes without a window, on a fresh [`NullDevice`].
    pub fn init_headless(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        self.init_with_device(NullDevice::new(), width, height)
    }

    /// Initializes on `device`, for callers that want to keep a handle to it.
    pub fn init_with_device(
        &mut self,
        device: NullDevice,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        if self.device.is_some() {
            return Err(RenderError::InitializationFailed(
                "NullRenderSystem is already initialized.".to_string(),
            ));
        }
        let device = Arc::new(device);
        self.device = Some(Arc::clone(&device));
        self.current_width = width;
        self.current_height = height;
        self.swapchain_config.width = width;
        self.swapchain_config.height = height;
        self.scheduler = FrameScheduler::new(self.swapchain_config.buffering);
        self.scheduler.set_surface_available(width > 0 && height > 0);
        self.resize.mark_configured(Instant::now());
        self.create_surface_targets(&device)?;
        log::info!("NullRenderSystem: initialized at {width}x{height}");
        Ok(())
    }

    /// The concrete device, for inspection.
    pub fn device(&self) -> Option<Arc<NullDevice>> {
        self.device.clone()
    }

    /// Current surface size.
    pub fn surface_size(&self) -> (u32, u32) {
        (self.current_width, self.current_height)
    }

    /// Makes the next image acquisition fail as if the surface were lost.
    pub fn simulate_surface_lost(&mut self) {
        log::debug!("NullRenderSystem: surface marked as lost");
        self.surface_lost = true;
    }

    fn create_surface_targets(&mut self, device: &NullDevice) -> Result<(), RenderError> {
        self.release_backbuffer(device);
        if self.current_width == 0 || self.current_height == 0 {
            return Ok(());
        }
        let format = device
            .surface_format()
            .unwrap_or(TextureFormat::Rgba8UnormSrgb);
        let texture = device.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed("Null Backbuffer")),
            size: Extent3D {
                width: self.current_width,
                height: self.current_height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: SampleCount::X1,
            dimension: TextureDimension::D2,
            format,
            usage: TextureUsage::RENDER_ATTACHMENT,
        })?;
        let view = device.create_texture_view(texture, &TextureViewDescriptor::default())?;
        self.backbuffer = Some((texture, view));
        self.depth
            .recreate(device, self.current_width, self.current_height)?;
        Ok(())
    }

    fn release_backbuffer(&mut self, device: &NullDevice) {
        if let Some((texture, view)) = self.backbuffer.take() {
            let _ = device.destroy_texture_view(view);
            let _ = device.destroy_texture(texture);
        }
    }

    fn recreate_swapchain(&mut self) -> Result<(), RenderError> {
        let device = self.device.clone().ok_or(RenderError::NotInitialized)?;
        self.swapchain_config.width = self.current_width;
        self.swapchain_config.height = self.current_height;
        self.create_surface_targets(&device)?;
        self.scheduler.swapchain_recreated();
        self.resize.mark_configured(Instant::now());
        log::debug!(
            "NullRenderSystem: swapchain recreated at {}x{}",
            self.current_width,
            self.current_height
        );
        Ok(())
    }

    /// Begins a frame and acquires the backbuffer. `None` means the frame is skipped.
    fn acquire_frame(&mut self) -> Result<Option<TextureViewId>, RenderError> {
        // Lost surface, recreation, then the retried frame.
        for _ in 0..3 {
            match self.scheduler.begin_frame()? {
                BeginFrame::Ready(_) => {}
                BeginFrame::Skipped => return Ok(None),
                BeginFrame::RecreateSwapchain => {
                    self.recreate_swapchain()?;
                    continue;
                }
            }
            if self.surface_lost {
                log::warn!("NullRenderSystem: surface lost, recreating swapchain");
                self.surface_lost = false;
                self.scheduler.abort_frame();
                self.scheduler.invalidate_swapchain();
                continue;
            }
            return match self.backbuffer {
                Some((_, view)) => Ok(Some(view)),
                None => {
                    self.scheduler.abort_frame();
                    Err(RenderError::SurfaceAcquisitionFailed(
                        "No backbuffer for a zero-sized surface".to_string(),
                    ))
                }
            };
        }
        Ok(None)
    }

    fn record_and_submit(
        &mut self,
        device: &NullDevice,
        target_view: TextureViewId,
        queue: &RenderQueue,
        view_info: &ViewInfo,
    ) -> Result<(u32, u32, f64), RenderError> {
        let transforms = self.transforms.upload(device, queue, view_info)?;
        let mut encoder = device.create_command_encoder(Some("Null Main Command Encoder"));
        let (draw_calls, triangles) = {
            let depth_view = self.depth.view();
            let pass_descriptor = RenderPassDescriptor {
                label: Some("Null Main Render Pass"),
                color_attachments: &[RenderPassColorAttachment {
                    view: &target_view,
                    resolve_target: None,
                    ops: Operations {
                        load: LoadOp::Clear(view_info.clear_color),
                        store: StoreOp::Store,
                    },
                }],
                depth_stencil_attachment: depth_view.as_ref().map(|view| {
                    RenderPassDepthStencilAttachment {
                        view,
                        depth_ops: Some(Operations {
                            load: LoadOp::Clear(1.0),
                            store: StoreOp::Store,
                        }),
                    }
                }),
            };
            let mut pass = encoder.begin_render_pass(&pass_descriptor);
            record_draws(pass.as_mut(), queue, transforms)
        };
        let submission_timer = Stopwatch::new();
        let command_buffer = encoder.finish();
        self.scheduler.end_frame()?;
        device.submit_command_buffer(command_buffer)?;
        Ok((draw_calls, triangles, submission_timer.elapsed_ms()))
    }

    fn sync_scheduler_stats(&mut self) {
        self.last_frame_stats.frame_number = self.scheduler.frames_presented();
        self.last_frame_stats.frames_skipped = self.scheduler.frames_skipped();
        self.last_frame_stats.swapchain_recreations = self.scheduler.swapchain_recreations();
        if let Some(device) = &self.device {
            self.last_frame_stats.vram_usage_estimate_mb =
                device.allocated_bytes() as f32 / BYTES_PER_MIB;
        }
    }
}

impl RenderSystem for NullRenderSystem {
    fn init(&mut self, window: &dyn NovaWindow) -> Result<(), RenderError> {
        let (width, height) = window.inner_size();
        self.init_headless(width, height)
    }

    fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width == 0 || new_height == 0 {
            self.scheduler.set_surface_available(false);
            return;
        }
        self.scheduler.set_surface_available(true);
        if (new_width, new_height) == (self.current_width, self.current_height)
            && !self.resize.is_pending()
            && self.backbuffer.is_some()
        {
            return;
        }
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
        let device = self.device.clone().ok_or(RenderError::NotInitialized)?;

        if self.resize.is_pending() {
            if self.resize.poll(settings, Instant::now()) {
                self.scheduler.invalidate_swapchain();
            } else {
                return Ok(self.last_frame_stats.clone());
            }
        }

        let Some(target_view) = self.acquire_frame()? else {
            self.sync_scheduler_stats();
            return Ok(self.last_frame_stats.clone());
        };

        let recording_timer = Stopwatch::new();
        let (draw_calls, triangles, submission_ms) =
            match self.record_and_submit(&device, target_view, queue, view_info) {
                Ok(result) => result,
                Err(e) => {
                    self.scheduler.abort_frame();
                    return Err(e);
                }
            };
        let recording_ms = recording_timer.elapsed_ms();
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
        self.device.as_ref().map(|d| d.adapter_info())
    }

    fn graphics_device(&self) -> Option<Arc<dyn GraphicsDevice>> {
        self.device
            .clone()
            .map(|device| device as Arc<dyn GraphicsDevice>)
    }

    fn supports_feature(&self, feature_name: &str) -> bool {
        self.device
            .as_ref()
            .is_some_and(|d| d.supports_feature(feature_name))
    }

    fn shutdown(&mut self) {
        if let Some(device) = self.device.take() {
            log::info!("NullRenderSystem shutting down...");
            self.release_backbuffer(&device);
            self.depth.release(device.as_ref());
            self.transforms.release(device.as_ref());
        }
        self.scheduler.abort_frame();
    }
}
