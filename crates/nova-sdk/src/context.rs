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

use std::path::Path;
use std::sync::Arc;

use nova_core::event::{EngineEvent, EventBus};
use nova_core::math::Color;
use nova_core::platform::InputState;
use nova_core::renderer::{GraphicsDevice, RenderSettings, ShaderModuleId};
use nova_core::FrameClock;
use nova_data::{SceneManager, TweenEase, ValueTween};
use nova_infra::{AssetError, LoadedTexture, ShaderLibrary, TextureLibrary, TextureParams};

use crate::config::EngineConfig;

/// The engine state an [`Application`](crate::Application) works with.
///
/// It is handed to every application hook. Resources are created through
/// [`graphics_device`](Self::graphics_device), scenes are switched through
/// [`scenes_mut`](Self::scenes_mut) and events published here are delivered
/// at the start of the next frame. Shaders and textures loaded through the
/// context are released when the engine shuts down.
pub struct EngineContext {
    graphics_device: Arc<dyn GraphicsDevice>,
    scenes: SceneManager,
    input: InputState,
    clock: FrameClock,
    events: EventBus<EngineEvent>,
    render_settings: RenderSettings,
    clear_color: Color,
    clear_color_tween: Option<ValueTween<Color>>,
    shaders: ShaderLibrary,
    textures: TextureLibrary,
    surface_size: (u32, u32),
    exit_requested: bool,
}

impl EngineContext {
    pub(crate) fn new(
        graphics_device: Arc<dyn GraphicsDevice>,
        config: &EngineConfig,
        surface_size: (u32, u32),
    ) -> Self {
        Self {
            graphics_device,
            scenes: SceneManager::new(),
            input: InputState::new(),
            clock: FrameClock::new(config.time.max_delta),
            events: EventBus::new(),
            render_settings: config.render_settings(),
            clear_color: config.renderer.clear_color,
            clear_color_tween: None,
            shaders: ShaderLibrary::new(),
            textures: TextureLibrary::new(),
            surface_size,
            exit_requested: false,
        }
    }

    /// The device GPU resources are created on.
    pub fn graphics_device(&self) -> &dyn GraphicsDevice {
        self.graphics_device.as_ref()
    }

    /// A shared handle to the device, for objects that outlive the hook.
    pub fn graphics_device_arc(&self) -> Arc<dyn GraphicsDevice> {
        Arc::clone(&self.graphics_device)
    }

    pub fn scenes(&self) -> &SceneManager {
        &self.scenes
    }

    pub fn scenes_mut(&mut self) -> &mut SceneManager {
        &mut self.scenes
    }

    /// Input folded from this frame's events.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// The engine event bus.
    pub fn events(&self) -> &EventBus<EngineEvent> {
        &self.events
    }

    /// Queues `event` for the next frame.
    pub fn publish(&self, event: EngineEvent) {
        self.events.publish(event);
    }

    pub fn render_settings(&self) -> &RenderSettings {
        &self.render_settings
    }

    pub fn render_settings_mut(&mut self) -> &mut RenderSettings {
        &mut self.render_settings
    }

    /// Clear color used when no camera is active.
    pub fn clear_color(&self) -> Color {
        self.clear_color
    }

    /// Sets the clear color, stopping a running clear color tween.
    pub fn set_clear_color(&mut self, color: Color) {
        self.clear_color_tween = None;
        self.clear_color = color;
    }

    /// Fades the clear color from its current value to `to` over `duration`
    /// seconds. Replaces a running fade.
    pub fn tween_clear_color(&mut self, to: Color, duration: f32, ease: TweenEase) {
        let tween = ValueTween::new(self.clear_color, to, duration).with_ease(ease);
        self.clear_color_tween = Some(tween);
    }

    pub fn is_clear_color_tweening(&self) -> bool {
        self.clear_color_tween.is_some()
    }

    /// Compiles WGSL and stores it under `name`, replacing any previous module.
    pub fn load_shader(&mut self, name: &str, source: &str) -> Result<ShaderModuleId, AssetError> {
        self.shaders.load_wgsl(self.graphics_device.as_ref(), name, source)
    }

    /// Loads a WGSL file under `name`. It is recompiled by [`reload_shaders`](Self::reload_shaders).
    pub fn load_shader_file(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
    ) -> Result<ShaderModuleId, AssetError> {
        self.shaders.load_file(self.graphics_device.as_ref(), name, path)
    }

    /// Recompiles every file-backed shader. Returns how many were replaced.
    pub fn reload_shaders(&mut self) -> usize {
        self.shaders.reload_all(self.graphics_device.as_ref())
    }

    pub fn shader(&self, name: &str) -> Option<ShaderModuleId> {
        self.shaders.get(name)
    }

    pub fn shaders(&self) -> &ShaderLibrary {
        &self.shaders
    }

    /// Decodes an image file into a texture stored under `name`.
    pub fn load_texture_file(
        &mut self,
        name: &str,
        path: impl AsRef<Path>,
        params: TextureParams,
    ) -> Result<LoadedTexture, AssetError> {
        self.textures
            .load_file(self.graphics_device.as_ref(), name, path, params)
    }

    /// Decodes an in-memory image into a texture stored under `name`.
    pub fn load_texture_from_memory(
        &mut self,
        name: &str,
        bytes: &[u8],
        params: TextureParams,
    ) -> Result<LoadedTexture, AssetError> {
        self.textures
            .load_from_memory(self.graphics_device.as_ref(), name, bytes, params)
    }

    pub fn texture(&self, name: &str) -> Option<LoadedTexture> {
        self.textures.get(name)
    }

    pub fn textures(&self) -> &TextureLibrary {
        &self.textures
    }

    /// Drawable size in physical pixels.
    pub fn surface_size(&self) -> (u32, u32) {
        self.surface_size
    }

    /// Width over height, 1 for a degenerate surface.
    pub fn aspect_ratio(&self) -> f32 {
        let (width, height) = self.surface_size;
        if width == 0 || height == 0 {
            1.0
        } else {
            width as f32 / height as f32
        }
    }

    /// Asks the engine to stop after the current frame.
    pub fn request_exit(&mut self) {
        if !self.exit_requested {
            log::info!("Exit requested by the application.");
        }
        self.exit_requested = true;
    }

    pub fn exit_requested(&self) -> bool {
        self.exit_requested
    }

    pub(crate) fn input_mut(&mut self) -> &mut InputState {
        &mut self.input
    }

    pub(crate) fn clock_mut(&mut self) -> &mut FrameClock {
        &mut self.clock
    }

    pub(crate) fn scenes_and_input(&mut self) -> (&mut SceneManager, &InputState) {
        (&mut self.scenes, &self.input)
    }

    pub(crate) fn advance_clear_color(&mut self, delta_time: f32) {
        if let Some(tween) = self.clear_color_tween.as_mut() {
            self.clear_color = tween.advance(delta_time);
            if tween.is_finished() {
                self.clear_color_tween = None;
            }
        }
    }

    /// Destroys every shader and texture owned by the libraries.
    pub(crate) fn release_resources(&mut self) {
        let device = self.graphics_device.as_ref();
        self.shaders.clear(device);
        self.textures.clear(device);
    }

    pub(crate) fn set_surface_size(&mut self, width: u32, height: u32) {
        self.surface_size = (width, height);
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("adapter", &self.graphics_device.adapter_info().name)
            .field("scenes", &self.scenes)
            .field("shaders", &self.shaders.len())
            .field("textures", &self.textures.len())
            .field("frame", &self.clock.frame_count())
            .field("surface_size", &self.surface_size)
            .field("exit_requested", &self.exit_requested)
            .finish_non_exhaustive()
    }
}
