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

use anyhow::{anyhow, Result};
use clap::Parser;
use nova_core::event::EngineEvent;
use nova_core::platform::NovaWindow;
use nova_core::renderer::RenderSystem;
use nova_infra::platform::{translate_winit_input, WinitWindow, WinitWindowBuilder};
use nova_infra::{NullRenderSystem, WgpuRenderSystem};
use winit::application::ApplicationHandler;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::WindowId;

use crate::application::Application;
use crate::cli::EngineArgs;
use crate::config::{EngineConfig, RendererBackend};
use crate::runner::FrameRunner;

/// The state of a running engine, managed by the winit event loop.
struct EngineState<A: Application> {
    config: EngineConfig,
    // Declared before `window` so the render system is released while the surface's window is alive.
    runner: Option<FrameRunner<A>>,
    window: Option<WinitWindow>,
    startup_error: Option<anyhow::Error>,
}

impl<A: Application> EngineState<A> {
    fn new(config: EngineConfig) -> Self {
        Self {
            config,
            runner: None,
            window: None,
            startup_error: None,
        }
    }

    fn start(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let window = WinitWindowBuilder::new()
            .with_title(self.config.window.title.clone())
            .with_dimensions(self.config.window.width, self.config.window.height)
            .with_resizable(self.config.window.resizable)
            .build(event_loop)?;

        let swapchain = self.config.swapchain_config();
        let mut renderer: Box<dyn RenderSystem> = match self.config.renderer.backend {
            RendererBackend::Wgpu => Box::new(WgpuRenderSystem::with_config(swapchain)),
            RendererBackend::Null => Box::new(NullRenderSystem::with_config(swapchain)),
        };
        renderer.init(&window)?;
        if let Some(info) = renderer.adapter_info() {
            log::info!(
                "Rendering on '{}' ({:?}, {:?})",
                info.name,
                info.backend_type,
                info.device_type
            );
        }

        let runner = FrameRunner::new(renderer, &self.config, window.inner_size())?;
        self.window = Some(window);
        self.runner = Some(runner);
        Ok(())
    }

    fn stop(&mut self, event_loop: &ActiveEventLoop) {
        if let Some(mut runner) = self.runner.take() {
            runner.shutdown();
        }
        event_loop.exit();
    }
}

impl<A: Application> Drop for EngineState<A> {
    fn drop(&mut self) {
        if let Some(mut runner) = self.runner.take() {
            log::info!("EngineState is being dropped. Performing controlled shutdown...");
            runner.shutdown();
        }
    }
}

impl<A: Application> ApplicationHandler for EngineState<A> {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() || self.startup_error.is_some() {
            return;
        }
        log::info!("Application resumed. Initializing window and engine systems...");
        if let Err(e) = self.start(event_loop) {
            log::error!("Engine startup failed: {e:#}");
            self.startup_error = Some(e);
            event_loop.exit();
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        if self.window.as_ref().map(WinitWindow::window_id) != Some(id) {
            return;
        }
        let Some(runner) = self.runner.as_mut() else {
            return;
        };

        match event {
            WindowEvent::CloseRequested => {
                log::info!("Shutdown requested, exiting event loop...");
                self.stop(event_loop);
            }
            WindowEvent::Resized(size) => {
                log::debug!("Window resized to: {}x{}", size.width, size.height);
                runner.resize(size.width, size.height);
            }
            WindowEvent::RedrawRequested => {
                // Errors are logged by the runner; the loop keeps going.
                let _ = runner.step();
                if runner.exit_requested() {
                    self.stop(event_loop);
                }
            }
            other => {
                if let Some(input_event) = translate_winit_input(&other) {
                    log::trace!("Input event: {input_event:?}");
                    runner.publish(EngineEvent::Input(input_event));
                }
            }
        }
    }

    /// Requests a redraw for continuous rendering.
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(mut runner) = self.runner.take() {
            runner.shutdown();
        }
    }
}

/// The public entry point for the windowed engine.
pub struct Engine;

impl Engine {
    /// Runs `A` configured from the process arguments (see [`EngineArgs`]),
    /// falling back to the file named by `NOVA_CONFIG`, then the defaults.
    ///
    /// Blocks the current thread until the window is closed or the
    /// application requests exit.
    pub fn run<A: Application>() -> Result<()> {
        Self::run_with_args::<A>(&EngineArgs::parse())
    }

    /// Runs `A` with already parsed command-line options.
    pub fn run_with_args<A: Application>(args: &EngineArgs) -> Result<()> {
        let config = args.resolve_config()?;
        Self::run_with_config::<A>(config)
    }

    /// Runs `A` with an explicit configuration.
    pub fn run_with_config<A: Application>(config: EngineConfig) -> Result<()> {
        config.validate()?;
        log::info!("Nova Engine SDK: Starting...");
        let event_loop = EventLoop::new()?;

        // Populated in `resumed`.
        let mut state = EngineState::<A>::new(config);
        event_loop.run_app(&mut state)?;

        match state.startup_error.take() {
            Some(e) => Err(anyhow!("engine failed to start: {e:#}")),
            None => Ok(()),
        }
    }
}
