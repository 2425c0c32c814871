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
use std::time::Duration;

use anyhow::{anyhow, Result};
use nova_core::event::EngineEvent;
use nova_core::renderer::{RenderStats, RenderSystem};
use nova_infra::{NullDevice, NullRenderSystem};

use crate::application::Application;
use crate::config::EngineConfig;
use crate::context::EngineContext;
use crate::runner::FrameRunner;

/// Runs an [`Application`] without a window, on the Null render system.
///
/// Frames advance with explicit deltas, which makes it the engine of choice
/// for tests, tools and servers. The [`NullDevice`] stays reachable for
/// inspecting what the application submitted.
pub struct HeadlessEngine<A: Application> {
    runner: FrameRunner<A>,
    device: Arc<NullDevice>,
}

impl<A: Application> HeadlessEngine<A> {
    /// Initializes a Null render system at the configured window size and creates the application.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        let (width, height) = (config.window.width, config.window.height);
        let mut renderer = NullRenderSystem::with_config(config.swapchain_config());
        renderer.init_headless(width, height)?;
        let device = renderer
            .device()
            .ok_or_else(|| anyhow!("NullRenderSystem has no device after initialization"))?;
        let runner = FrameRunner::new(Box::new(renderer), &config, (width, height))?;
        log::info!("HeadlessEngine: running at {width}x{height}");
        Ok(Self { runner, device })
    }

    /// Runs up to `frames` frames of `delta_time` seconds each.
    ///
    /// Deltas are clamped to `[0, max_delta]`, NaN counts as zero. Stops early
    /// when the application requests exit. Returns the stats of the last frame run.
    pub fn run_frames(&mut self, frames: u32, delta_time: f32) -> Result<RenderStats> {
        let max_delta = self.runner.context().clock().max_delta();
        let delta = Duration::try_from_secs_f32(delta_time.clamp(0.0, max_delta))
            .unwrap_or(Duration::ZERO);
        let mut stats = self.runner.render_system().last_frame_stats().clone();
        for _ in 0..frames {
            if self.runner.exit_requested() {
                log::debug!("HeadlessEngine: exit requested, stopping early");
                break;
            }
            stats = self.runner.step_with(delta)?;
        }
        Ok(stats)
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.runner.resize(width, height);
    }

    pub fn publish(&self, event: EngineEvent) {
        self.runner.publish(event);
    }

    pub fn app(&self) -> &A {
        self.runner.app()
    }

    pub fn app_mut(&mut self) -> &mut A {
        self.runner.app_mut()
    }

    pub fn context(&self) -> &EngineContext {
        self.runner.context()
    }

    pub fn context_mut(&mut self) -> &mut EngineContext {
        self.runner.context_mut()
    }

    pub fn render_system(&self) -> &dyn RenderSystem {
        self.runner.render_system()
    }

    /// The device behind the render system.
    pub fn device(&self) -> &NullDevice {
        &self.device
    }

    pub fn shutdown(&mut self) {
        self.runner.shutdown();
    }
}
