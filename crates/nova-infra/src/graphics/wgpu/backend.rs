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

//! Graphics backend selection with fallback.
//!
//! Backends are tried in the configured order (Vulkan, Metal, Dx12, then
//! OpenGL by default); the first one yielding an adapter wins.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::time::Instant;
use wgpu::{Adapter, Backend, DeviceType, Instance, RequestAdapterOptions};

use nova_core::renderer::{
    BackendSelectionConfig, BackendSelectionResult, GraphicsBackendSelector, GraphicsBackendType,
    RendererAdapterInfo, RendererDeviceType,
};

/// Human-readable name for a backend.
pub fn backend_name(backend: Backend) -> &'static str {
    match backend {
        Backend::Vulkan => "Vulkan",
        Backend::Metal => "Metal",
        Backend::Dx12 => "DirectX 12",
        Backend::Gl => "OpenGL",
        Backend::BrowserWebGpu => "WebGPU",
        Backend::Noop => "No-op",
    }
}

/// wgpu implementation of [`GraphicsBackendSelector`].
pub struct WgpuBackendSelector {
    instance: Instance,
}

impl WgpuBackendSelector {
    /// A selector sharing `instance`, so the chosen adapter can drive surfaces made from it.
    pub fn new(instance: Instance) -> Self {
        Self { instance }
    }

    pub(crate) fn backend_to_type(backend: Backend) -> GraphicsBackendType {
        match backend {
            Backend::Vulkan => GraphicsBackendType::Vulkan,
            Backend::Dx12 => GraphicsBackendType::Dx12,
            Backend::Gl => GraphicsBackendType::OpenGL,
            Backend::Metal => GraphicsBackendType::Metal,
            Backend::BrowserWebGpu => GraphicsBackendType::WebGpu,
            #[allow(unreachable_patterns)]
            _ => GraphicsBackendType::Unknown,
        }
    }

    pub(crate) fn device_type_to_type(device_type: DeviceType) -> RendererDeviceType {
        match device_type {
            DeviceType::IntegratedGpu => RendererDeviceType::IntegratedGpu,
            DeviceType::DiscreteGpu => RendererDeviceType::DiscreteGpu,
            DeviceType::VirtualGpu => RendererDeviceType::VirtualGpu,
            DeviceType::Cpu => RendererDeviceType::Cpu,
            _ => RendererDeviceType::Unknown,
        }
    }

    fn type_to_backend(backend_type: GraphicsBackendType) -> Backend {
        match backend_type {
            GraphicsBackendType::Vulkan => Backend::Vulkan,
            GraphicsBackendType::Dx12 => Backend::Dx12,
            GraphicsBackendType::OpenGL => Backend::Gl,
            GraphicsBackendType::Metal => Backend::Metal,
            GraphicsBackendType::WebGpu => Backend::BrowserWebGpu,
            GraphicsBackendType::Unknown => Backend::Noop,
        }
    }

    /// Engine-side description of a wgpu adapter.
    pub fn adapter_to_info(adapter: &Adapter) -> RendererAdapterInfo {
        let info = adapter.get_info();
        RendererAdapterInfo {
            name: info.name.clone(),
            backend_type: Self::backend_to_type(info.backend),
            device_type: Self::device_type_to_type(info.device_type),
        }
    }

    fn power_preference(config: &BackendSelectionConfig) -> wgpu::PowerPreference {
        if config.prefer_discrete_gpu {
            wgpu::PowerPreference::HighPerformance
        } else {
            wgpu::PowerPreference::LowPower
        }
    }

    async fn try_backend(
        &self,
        backend_type: GraphicsBackendType,
        power_preference: wgpu::PowerPreference,
    ) -> Result<Adapter> {
        if !self.is_backend_supported(backend_type) {
            return Err(anyhow!("{backend_type:?} is not available on this platform"));
        }
        let backend = Self::type_to_backend(backend_type);

        let adapter = self
            .instance
            .request_adapter(&RequestAdapterOptions {
                power_preference,
                compatible_surface: None,
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| anyhow!("No adapter for {:?}: {}", backend_type, e))?;

        let adapter_info = adapter.get_info();
        if adapter_info.backend != backend {
            return Err(anyhow!(
                "Adapter returned wrong backend: requested {:?}, got {:?}",
                backend,
                adapter_info.backend
            ));
        }
        Ok(adapter)
    }
}

#[async_trait]
impl GraphicsBackendSelector<Adapter> for WgpuBackendSelector {
    type Error = String;

    async fn select_backend(
        &self,
        config: &BackendSelectionConfig,
    ) -> Result<BackendSelectionResult<Adapter>, Self::Error> {
        let start_time = Instant::now();
        let power_preference = Self::power_preference(config);
        log::info!("Starting WGPU backend selection process...");

        for &backend_type in &config.preferred_backends {
            let attempt_start = Instant::now();
            log::info!("Attempting to initialize {backend_type:?} backend...");

            match self.try_backend(backend_type, power_preference).await {
                Ok(adapter) => {
                    if attempt_start.elapsed() > config.timeout_per_backend {
                        log::warn!(
                            "{backend_type:?} took {:?}, longer than the {:?} budget",
                            attempt_start.elapsed(),
                            config.timeout_per_backend
                        );
                    }
                    let adapter_info = Self::adapter_to_info(&adapter);
                    log::info!(
                        "Selected {:?} backend with adapter \"{}\" ({:?})",
                        backend_type,
                        adapter_info.name,
                        adapter_info.device_type,
                    );
                    return Ok(BackendSelectionResult {
                        adapter,
                        selected_backend: backend_type,
                        adapter_info,
                        selection_time_ms: start_time.elapsed().as_millis() as u64,
                    });
                }
                Err(e) => {
                    log::warn!("Failed to initialize {backend_type:?} backend: {e}");
                }
            }
        }

        Err(format!(
            "All backend attempts failed. Attempted: {:?}",
            config.preferred_backends
        ))
    }

    async fn list_adapters(
        &self,
        backend_type: GraphicsBackendType,
    ) -> Result<Vec<RendererAdapterInfo>, Self::Error> {
        if !self.is_backend_supported(backend_type) {
            return Ok(Vec::new());
        }
        match self
            .try_backend(backend_type, wgpu::PowerPreference::HighPerformance)
            .await
        {
            Ok(adapter) => Ok(vec![Self::adapter_to_info(&adapter)]),
            Err(_) => Ok(Vec::new()),
        }
    }

    fn is_backend_supported(&self, backend_type: GraphicsBackendType) -> bool {
        match backend_type {
            GraphicsBackendType::Vulkan => cfg!(any(target_os = "windows", target_os = "linux")),
            GraphicsBackendType::Dx12 => cfg!(target_os = "windows"),
            GraphicsBackendType::Metal => cfg!(any(target_os = "macos", target_os = "ios")),
            GraphicsBackendType::OpenGL => true,
            GraphicsBackendType::WebGpu => cfg!(target_arch = "wasm32"),
            GraphicsBackendType::Unknown => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name_function() {
        assert_eq!(backend_name(Backend::Vulkan), "Vulkan");
        assert_eq!(backend_name(Backend::Dx12), "DirectX 12");
        assert_eq!(backend_name(Backend::Gl), "OpenGL");
    }

    #[test]
    fn test_backend_type_round_trip() {
        for ty in [
            GraphicsBackendType::Vulkan,
            GraphicsBackendType::Metal,
            GraphicsBackendType::Dx12,
            GraphicsBackendType::OpenGL,
        ] {
            let backend = WgpuBackendSelector::type_to_backend(ty);
            assert_eq!(WgpuBackendSelector::backend_to_type(backend), ty);
        }
    }

    #[test]
    fn test_device_type_mapping() {
        assert_eq!(
            WgpuBackendSelector::device_type_to_type(DeviceType::DiscreteGpu),
            RendererDeviceType::DiscreteGpu
        );
        assert_eq!(
            WgpuBackendSelector::device_type_to_type(DeviceType::Other),
            RendererDeviceType::Unknown
        );
    }
}
