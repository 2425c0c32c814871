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

use anyhow::Result;
use nova_core::event::EngineEvent;
use nova_core::renderer::RenderQueue;

use crate::context::EngineContext;

/// User code driven by the engine.
///
/// Per frame the engine calls [`on_event`](Self::on_event) for each pending
/// event, then [`update`](Self::update), then lets the active scene update,
/// then [`render`](Self::render) after the scene has queued its own draws.
#[allow(unused_variables)]
pub trait Application: Sized + 'static {
    /// Called once the render system is up. Create GPU resources and the first scene here.
    fn new(context: &mut EngineContext) -> Result<Self>;

    /// Called every frame for game logic updates.
    fn update(&mut self, context: &mut EngineContext, delta_time: f32);

    /// Appends draws on top of the scene's.
    fn render(&mut self, context: &mut EngineContext, queue: &mut RenderQueue) {}

    /// Called for every engine event, before `update`.
    fn on_event(&mut self, context: &mut EngineContext, event: &EngineEvent) {}

    /// Called once before the engine tears down the scenes and the render system.
    fn on_shutdown(&mut self, context: &mut EngineContext) {}
}
