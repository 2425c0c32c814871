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

use super::conversions::{from_wgpu_present_mode, IntoWgpu};
use anyhow::{anyhow, Result};
use nova_core::platform::NovaWindowHandle;
use nova_core::renderer::{PresentMode, SwapchainConfig};
use wgpu::SurfaceTargetUnsafe;
use wgpu::{Adapter, Instance};

/// Holds the core wgpu state for one window surface.
///
/// Built from an adapter chosen beforehand by the backend selector.
#[derive(Debug)]
pub struct WgpuGraphicsContext {
    pub surface: wgpu::Surface<'static>,
    #[allow(dead_code)]
    pub adapter: wgpu::Adapter,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub surface_config: wgpu::SurfaceConfiguration,
    pub swapchain_config: SwapchainConfig,

    pub adapter_name: String,
    pub adapter_backend: wgpu::Backend,
    pub adapter_device_type: wgpu::DeviceType,
    pub active_device_features: wgpu::Features,
}

impl WgpuGraphicsContext {
    /// Creates the surface, the logical device and configures the swapchain.
    pub async fn new(
        instance: &Instance,
        window_handle: NovaWindowHandle,
        adapter: Adapter,
        swapchain_config: SwapchainConfig,
    ) -> Result<Self> {
        log::info!("Initializing WGPU Graphics Context with pre-selected adapter...");

        let surface_target = unsafe {
            SurfaceTargetUnsafe::from_window(&window_handle)
                .map_err(|e| anyhow!("Failed to create surface target: {}", e))?
        };
        let surface = unsafe { instance.create_surface_unsafe(surface_target)? };
        log::debug!("WGPU surface created for the window.");

        let adapter_info = adapter.get_info();
        log::info!(
            "Using graphics adapter: \"{}\" (Backend: {:?})",
            adapter_info.name,
            adapter_info.backend
        );

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Nova Engine Logical Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                ..Default::default()
            })
            .await
            .map_err(|e| anyhow!("Failed to create logical device: {}", e))?;
        log::info!("Logical device and command queue created.");

        device.on_uncaptured_error(std::sync::Arc::new(|e| {
            log::error!("WGPU Uncaptured Error: {e:?}");
        }));

        let active_device_features = device.features();
        log::debug!("Active device features: {active_device_features:?}");

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .ok_or_else(|| anyhow!("Surface reports no supported formats"))?;
        let alpha_mode = surface_caps
            .alpha_modes
            .first()
            .copied()
            .unwrap_or(wgpu::CompositeAlphaMode::Auto);

        let supported: Vec<PresentMode> = surface_caps
            .present_modes
            .iter()
            .copied()
            .filter_map(from_wgpu_present_mode)
            .collect();
        let present_mode = swapchain_config.preferred_present_mode(&supported);

        let surface_config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: swapchain_config.width.max(1),
            height: swapchain_config.height.max(1),
            present_mode: present_mode.into_wgpu(),
            alpha_mode,
            view_formats: vec![],
            desired_maximum_frame_latency: swapchain_config.buffering.image_count() - 1,
        };
        surface.configure(&device, &surface_config);
        log::info!(
            "Surface configured: {:?} {}x{} {:?}",
            surface_format,
            surface_config.width,
            surface_config.height,
            present_mode
        );

        Ok(WgpuGraphicsContext {
            surface,
            adapter,
            device,
            queue,
            surface_config,
            swapchain_config,
            adapter_name: adapter_info.name,
            adapter_backend: adapter_info.backend,
            adapter_device_type: adapter_info.device_type,
            active_device_features,
        })
    }

    /// Reconfigures the swapchain for a new size. Zero sizes are ignored.
    pub fn resize(&mut self, new_width: u32, new_height: u32) {
        if new_width > 0 && new_height > 0 {
            log::info!(
                "WgpuGraphicsContext: Resizing surface configuration to {new_width}x{new_height}"
            );
            self.surface_config.width = new_width;
            self.surface_config.height = new_height;
            self.swapchain_config.width = new_width;
            self.swapchain_config.height = new_height;
            self.surface.configure(&self.device, &self.surface_config);
        } else {
            log::warn!(
                "WgpuGraphicsContext: Ignoring resize request to zero dimensions: {new_width}x{new_height}"
            );
        }
    }

    /// Re-applies the current configuration, used after the surface was lost or outdated.
    pub fn reconfigure(&self) {
        log::debug!("WgpuGraphicsContext: Reconfiguring surface.");
        self.surface.configure(&self.device, &self.surface_config);
    }

    pub fn get_current_texture(&self) -> Result<wgpu::SurfaceTexture, wgpu::SurfaceError> {
        self.surface.get_current_texture()
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    /// Current swapchain size.
    pub fn get_size(&self) -> (u32, u32) {
        (self.surface_config.width, self.surface_config.height)
    }
}
