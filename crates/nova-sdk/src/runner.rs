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

//! The per-frame step shared by the windowed and headless engines.

use std::time::Duration;

use anyhow::{anyhow, Result};
use nova_core::event::EngineEvent;
use nova_core::renderer::{RenderError, RenderQueue, RenderStats, RenderSystem, ViewInfo};

use crate::application::Application;
use crate::config::EngineConfig;
use crate::context::EngineContext;

/// Owns an application, its context and a render system, and advances them
/// one frame at a time.
///
/// A frame runs in this order:
/// 1. the clock ticks,
/// 2. pending events are folded into the input state and handed to the application,
/// 3. `Application::update`,
/// 4. the clear color tween advances,
/// 5. the scene manager updates with the frame's input (swapping in a
///    pending scene first), then the scene's tweens advance,
/// 6. the active scene's pre-render hooks,
/// 7. the render queue is filled by the scene, then by the application,
/// 8. the render system draws it with the active camera's view,
/// 9. the per-frame input edges are cleared.
pub struct FrameRunner<A: Application> {
    app: A,
    context: EngineContext,
    renderer: Box<dyn RenderSystem>,
    queue: RenderQueue,
    shut_down: bool,
}

impl<A: Application> FrameRunner<A> {
    /// Builds the application on an initialized render system.
    pub fn new(
        renderer: Box<dyn RenderSystem>,
        config: &EngineConfig,
        surface_size: (u32, u32),
    ) -> Result<Self> {
        let device = renderer
            .graphics_device()
            .ok_or_else(|| anyhow!("the render system must be initialized before the application"))?;
        let mut context = EngineContext::new(device, config, surface_size);
        let app = A::new(&mut context)?;
        log::info!("FrameRunner: application created");
        Ok(Self {
            app,
            context,
            renderer,
            queue: RenderQueue::new(),
            shut_down: false,
        })
    }

    /// Runs one frame timed by the wall clock.
    pub fn step(&mut self) -> Result<RenderStats, RenderError> {
        let delta_time = self.context.clock_mut().tick();
        self.run_frame(delta_time)
    }

    /// Runs one frame that advances time by exactly `delta`, clamped like any other delta.
    pub fn step_with(&mut self, delta: Duration) -> Result<RenderStats, RenderError> {
        let delta_time = self.context.clock_mut().tick_with(delta);
        self.run_frame(delta_time)
    }

    fn run_frame(&mut self, delta_time: f32) -> Result<RenderStats, RenderError> {
        self.dispatch_events();

        self.app.update(&mut self.context, delta_time);
        self.context.advance_clear_color(delta_time);

        let (scenes, input) = self.context.scenes_and_input();
        scenes.update_with_input(delta_time, input);
        let activated = scenes.take_activated();
        scenes.pre_render();
        if let Some(name) = activated {
            self.context.publish(EngineEvent::SceneActivated { name });
        }

        self.queue.clear();
        self.context.scenes_mut().render(&mut self.queue);
        self.app.render(&mut self.context, &mut self.queue);

        let view_info = self.view_info();
        let result = self
            .renderer
            .render(&self.queue, &view_info, self.context.render_settings());
        self.context.input_mut().begin_frame();

        match &result {
            Ok(stats) => log::trace!(
                "Frame {} rendered: {} draw call(s), {} triangle(s)",
                stats.frame_number,
                stats.draw_calls,
                stats.triangles_rendered
            ),
            Err(e) => log::error!("Rendering error: {e}"),
        }
        result
    }

    fn dispatch_events(&mut self) {
        for event in self.context.events().drain() {
            match &event {
                EngineEvent::Input(input) => self.context.input_mut().apply(input),
                EngineEvent::WindowResized { width, height } => {
                    self.context.set_surface_size(*width, *height)
                }
                EngineEvent::ShutdownRequested => self.context.request_exit(),
                EngineEvent::SceneActivated { .. } => {}
            }
            self.app.on_event(&mut self.context, &event);
        }
    }

    fn view_info(&self) -> ViewInfo {
        let aspect = self.context.aspect_ratio();
        self.context
            .scenes()
            .active_scene()
            .and_then(|scene| scene.main_camera_view(aspect))
            .unwrap_or_else(|| ViewInfo::default().with_clear_color(self.context.clear_color()))
    }

    /// Forwards a new drawable size to the render system and queues a
    /// [`EngineEvent::WindowResized`] for the next frame.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.renderer.resize(width, height);
        self.context
            .publish(EngineEvent::WindowResized { width, height });
    }

    /// Queues an event for the next frame.
    pub fn publish(&self, event: EngineEvent) {
        self.context.publish(event);
    }

    pub fn app(&self) -> &A {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut A {
        &mut self.app
    }

    pub fn context(&self) -> &EngineContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut EngineContext {
        &mut self.context
    }

    pub fn render_system(&self) -> &dyn RenderSystem {
        self.renderer.as_ref()
    }

    pub fn exit_requested(&self) -> bool {
        self.context.exit_requested()
    }

    /// Runs `on_shutdown`, destroys the scenes, releases loaded shaders and
    /// textures, then the render system.
    /// Later calls do nothing.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        log::info!("FrameRunner: shutting down...");
        self.app.on_shutdown(&mut self.context);
        self.context.scenes_mut().destroy();
        self.context.release_resources();
        self.renderer.shutdown();
        log::info!("Engine systems shutdown complete.");
    }
}

impl<A: Application> Drop for FrameRunner<A> {
    fn drop(&mut self) {
        self.shutdown();
    }
}
