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
    BackendSelectionConfig, BackendSelectionResult, GraphicsBackendType, RendererAdapterInfo,
};
use async_trait::async_trait;

/// Picks a native API and an adapter for it.
///
/// `TAdapter` is the backend's adapter type.
#[async_trait]
pub trait GraphicsBackendSelector<TAdapter> {
    /// Error reported when no backend fits.
    type Error: std::fmt::Debug + std::fmt::Display + Send + Sync + 'static;

    /// Walks `config.preferred_backends` in order and returns the first usable adapter.
    async fn select_backend(
        &self,
        config: &BackendSelectionConfig,
    ) -> Result<BackendSelectionResult<TAdapter>, Self::Error>;

    /// Every adapter exposed for one backend.
    async fn list_adapters(
        &self,
        backend_type: GraphicsBackendType,
    ) -> Result<Vec<RendererAdapterInfo>, Self::Error>;

    /// Whether this build and platform can use the backend at all.
    fn is_backend_supported(&self, backend_type: GraphicsBackendType) -> bool;
}
