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

use std::sync::Arc;

use crate::platform::NovaWindow;
use crate::renderer::error::RenderError;
use crate::renderer::frame::FrameStatus;
use crate::renderer::{api::*, GraphicsDevice};

/// Owns a device and a presentation surface and turns a [`RenderQueue`] into a frame.
pub trait RenderSystem: std::fmt::Debug + Send {
    /// Creates the device and the surface for `window`.
    fn init(&mut self, window: &dyn NovaWindow) -> Result<(), RenderError>;

    /// Notifies a new drawable size. Zero sizes mark the surface unavailable.
    fn resize(&mut self, new_width: u32, new_height: u32);

    /// Draws one frame and presents it.
    ///
    /// Returns the previous stats unchanged when the frame is skipped
    /// (minimized surface, debounced resize).
    fn render(
        &mut self,
        queue: &RenderQueue,
        view_info: &ViewInfo,
        settings: &RenderSettings,
    ) -> Result<RenderStats, RenderError>;

    /// Stats of the last frame.
    fn last_frame_stats(&self) -> &RenderStats;

    /// Snapshot of the frame scheduler.
    fn frame_status(&self) -> FrameStatus;

    /// Adapter in use, once initialized.
    fn adapter_info(&self) -> Option<RendererAdapterInfo>;

    /// The device resources are created on, once initialized.
    fn graphics_device(&self) -> Option<Arc<dyn GraphicsDevice>>;

    /// Whether a named optional feature is available.
    fn supports_feature(&self, feature_name: &str) -> bool;

    /// Releases every GPU resource. The system must be re-initialized to be used again.
    fn shutdown(&mut self);
}
