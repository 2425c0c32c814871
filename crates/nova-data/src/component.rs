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

//! The `Component` trait and the context its hooks receive.

use crate::components::Transform;
use crate::handle::EntityHandle;
use nova_core::math::Mat4;
use nova_core::nova_bitflags;
use nova_core::platform::InputState;
use nova_core::renderer::RenderQueue;
use std::any::Any;

nova_bitflags! {
    /// Behavioural flags of a component type.
    pub struct ComponentFlags: u8 {
        /// Editors should not list the component.
        const HIDE_IN_INSPECTOR = 1 << 0;
        /// At most one component of this type per entity.
        const DISALLOW_MULTIPLE_IN_ENTITY = 1 << 1;
        /// At most one component of this type per scene.
        const DISALLOW_MULTIPLE_IN_SCENE = 1 << 2;
    }
}

/// Downcasting support, implemented for every `'static` type.
///
/// Call it on `&dyn Component` (not on the `Box`) to reach the concrete type.
pub trait AsAny: Any {
    /// `self` as `&dyn Any`.
    fn as_any(&self) -> &dyn Any;
    /// `self` as `&mut dyn Any`.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What a hook can see of its owner.
pub struct ComponentContext<'a> {
    /// The owning entity.
    pub entity: EntityHandle,
    /// Its name.
    pub entity_name: &'a str,
    /// Its local transform, mutable.
    pub transform: &'a mut Transform,
    /// World matrix of its parent, identity for roots.
    pub parent_world: Mat4,
    /// Input of the current frame. Empty outside of scene updates.
    pub input: &'a InputState,
}

impl ComponentContext<'_> {
    /// World matrix of the owner, from the current local transform.
    pub fn world_matrix(&self) -> Mat4 {
        self.parent_world * self.transform.local_matrix()
    }
}

/// Behaviour attached to an entity.
///
/// Every hook has an empty default. The owning [`Scene`](crate::Scene) calls
/// them in this order over an entity's life:
///
/// * `on_init` when the component is added,
/// * `on_start` once, right before the first `on_update`,
/// * `on_update` then `on_physics_update` every scene update,
/// * `on_pre_render` then `on_render` every rendered frame,
/// * `on_enable` / `on_disable` when the entity or the component is toggled,
/// * `on_destroy` when it is removed or the entity is destroyed.
///
/// Update and render hooks are not called while the entity or the
/// component is disabled.
#[allow(unused_variables)]
pub trait Component: AsAny + Send {
    /// Type name shown in logs and errors.
    fn name(&self) -> &str;

    /// Flags of this component type.
    fn flags(&self) -> ComponentFlags {
        ComponentFlags::EMPTY
    }

    /// Called when added to an entity.
    fn on_init(&mut self, ctx: &mut ComponentContext) {}

    /// Called once before the first update.
    fn on_start(&mut self, ctx: &mut ComponentContext) {}

    /// Called when removed or when the entity is destroyed.
    fn on_destroy(&mut self, ctx: &mut ComponentContext) {}

    /// Called when the component becomes active again.
    fn on_enable(&mut self, ctx: &mut ComponentContext) {}

    /// Called when the component becomes inactive.
    fn on_disable(&mut self, ctx: &mut ComponentContext) {}

    /// Per-frame logic.
    fn on_update(&mut self, ctx: &mut ComponentContext, delta_time: f32) {}

    /// Per-frame logic that runs after every `on_update` of the scene.
    fn on_physics_update(&mut self, ctx: &mut ComponentContext, delta_time: f32) {}

    /// Prepares render data once the frame's transforms are final.
    fn on_pre_render(&mut self, ctx: &mut ComponentContext) {}

    /// Appends draws.
    fn on_render(&mut self, ctx: &mut ComponentContext, queue: &mut RenderQueue) {}
}
