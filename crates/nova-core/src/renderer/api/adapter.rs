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

//! Adapter information and backend selection.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A native graphics API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GraphicsBackendType {
    /// Vulkan.
    Vulkan,
    /// Metal.
    Metal,
    /// Direct3D 12.
    Dx12,
    /// OpenGL / GLES.
    OpenGL,
    /// WebGPU in a browser.
    WebGpu,
    /// Not known.
    #[default]
    Unknown,
}

/// Physical kind of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RendererDeviceType {
    /// Integrated GPU.
    IntegratedGpu,
    /// Discrete GPU.
    DiscreteGpu,
    /// Virtualized GPU.
    VirtualGpu,
    /// Software rasterizer.
    Cpu,
    /// Not known.
    #[default]
    Unknown,
}

/// Which implementation sits behind a [`GraphicsDevice`](crate::renderer::GraphicsDevice).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphicsDeviceType {
    /// The wgpu backend.
    Wgpu,
    /// The headless bookkeeping backend.
    Null,
}

/// Backend-agnostic adapter description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RendererAdapterInfo {
    /// Adapter name, e.g. the GPU model.
    pub name: String,
    /// API in use.
    pub backend_type: GraphicsBackendType,
    /// Physical type.
    pub device_type: RendererDeviceType,
}

/// Constraints for picking an adapter.
#[derive(Debug, Clone)]
pub struct BackendSelectionConfig {
    /// Backends to try, in order.
    pub preferred_backends: Vec<GraphicsBackendType>,
    /// Give up on a backend after this long.
    pub timeout_per_backend: Duration,
    /// Prefer discrete over integrated GPUs.
    pub prefer_discrete_gpu: bool,
}

impl Default for BackendSelectionConfig {
    fn default() -> Self {
        Self {
            preferred_backends: vec![
                GraphicsBackendType::Vulkan,
                GraphicsBackendType::Metal,
                GraphicsBackendType::Dx12,
                GraphicsBackendType::OpenGL,
            ],
            timeout_per_backend: Duration::from_secs(2),
            prefer_discrete_gpu: true,
        }
    }
}

/// The outcome of a successful backend selection.
#[derive(Debug)]
pub struct BackendSelectionResult<TAdapter> {
    /// The adapter itself.
    pub adapter: TAdapter,
    /// Its backend.
    pub selected_backend: GraphicsBackendType,
    /// Its description.
    pub adapter_info: RendererAdapterInfo,
    /// How long selection took.
    pub selection_time_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_preference_order() {
        let cfg = BackendSelectionConfig::default();
        assert_eq!(
            cfg.preferred_backends,
            vec![
                GraphicsBackendType::Vulkan,
                GraphicsBackendType::Metal,
                GraphicsBackendType::Dx12,
                GraphicsBackendType::OpenGL
            ]
        );
    }
}
