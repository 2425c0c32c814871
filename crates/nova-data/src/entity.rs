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

//! Entities: a name, a transform and an ordered list of components.

use crate::component::{Component, ComponentContext, ComponentFlags};
use crate::components::Transform;
use crate::error::SceneError;
use crate::handle::EntityHandle;
use nova_core::math::Mat4;
use nova_core::nova_bitflags;
use nova_core::platform::InputState;
use nova_core::renderer::RenderQueue;
use std::any::TypeId;
use std::fmt;

nova_bitflags! {
    /// Editor visibility of an entity.
    pub struct EntityHideFlags: u8 {
        /// Not listed in hierarchy views.
        const HIDE_IN_HIERARCHY = 1 << 0;
        /// Not shown in inspectors.
        const HIDE_IN_INSPECTOR = 1 << 1;
        /// Not drawn in scene views.
        const HIDE_IN_SCENE = 1 << 2;
        /// Engine-owned helper entity.
        const INTERNAL = 1 << 3;
    }
}

struct ComponentSlot {
    component: Box<dyn Component>,
    type_id: TypeId,
    enabled: bool,
    started: bool,
}

impl ComponentSlot {
    fn downcast_ref<T: Component>(&self) -> Option<&T> {
        let component: &dyn Component = &*self.component;
        component.as_any().downcast_ref::<T>()
    }

    fn downcast_mut<T: Component>(&mut self) -> Option<&mut T> {
        let component: &mut dyn Component = &mut *self.component;
        component.as_any_mut().downcast_mut::<T>()
    }
}

/// Builds the hook context from an entity's disjoint fields and runs `$body`
/// for every slot matching `$filter`.
macro_rules! for_each_slot {
    ($entity:expr, $input:expr, |$slot:ident, $ctx:ident| $filter:expr => $body:block) => {{
        let Entity {
            handle,
            name,
            transform,
            parent_world,
            components,
            ..
        } = $entity;
        for $slot in components.iter_mut() {
            if !$filter {
                continue;
            }
            let mut $ctx = ComponentContext {
                entity: *handle,
                entity_name: name.as_str(),
                transform: &mut *transform,
                parent_world: *parent_world,
                input: $input,
            };
            $body
        }
    }};
}

/// A named node of a [`Scene`](crate::Scene).
///
/// Every entity owns a [`Transform`]; other behaviour comes from components.
/// Parent and child links are handles into the owning scene and are kept
/// consistent by it.
pub struct Entity {
    name: String,
    handle: EntityHandle,
    enabled: bool,
    hide_flags: EntityHideFlags,
    transform: Transform,
    components: Vec<ComponentSlot>,
    parent: Option<EntityHandle>,
    children: Vec<EntityHandle>,
    parent_world: Mat4,
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("name", &self.name)
            .field("handle", &self.handle)
            .field("enabled", &self.enabled)
            .field("hide_flags", &self.hide_flags)
            .field("components", &self.component_names())
            .field("parent", &self.parent)
            .field("children", &self.children)
            .finish()
    }
}

impl Entity {
    /// A detached, enabled entity with a fresh handle.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_handle(name, EntityHandle::new())
    }

    /// A detached, enabled entity with a given handle.
    pub fn with_handle(name: impl Into<String>, handle: EntityHandle) -> Self {
        Self {
            name: name.into(),
            handle,
            enabled: true,
            hide_flags: EntityHideFlags::EMPTY,
            transform: Transform::default(),
            components: Vec::new(),
            parent: None,
            children: Vec::new(),
            parent_world: Mat4::IDENTITY,
        }
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Renames the entity.
    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Stable handle.
    pub fn handle(&self) -> EntityHandle {
        self.handle
    }

    /// Whether hooks run for this entity.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Editor visibility flags.
    pub fn hide_flags(&self) -> EntityHideFlags {
        self.hide_flags
    }

    /// Replaces the visibility flags.
    pub fn set_hide_flags(&mut self, flags: EntityHideFlags) {
        self.hide_flags = flags;
    }

    /// Local transform.
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    /// Local transform, mutable.
    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Parent handle, `None` for roots.
    pub fn parent(&self) -> Option<EntityHandle> {
        self.parent
    }

    /// Child handles in attachment order.
    pub fn children(&self) -> &[EntityHandle] {
        &self.children
    }

    /// Number of components.
    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    /// Component names in order.
    pub fn component_names(&self) -> Vec<&str> {
        self.components.iter().map(|s| s.component.name()).collect()
    }

    /// Appends a component and runs its `on_init`.
    ///
    /// # Errors
    /// [`SceneError::DuplicateComponent`] when a component of the same type
    /// is present and either of them is `DISALLOW_MULTIPLE_IN_ENTITY`.
    pub fn add_component<C: Component>(&mut self, component: C) -> Result<(), SceneError> {
        let type_id = TypeId::of::<C>();
        let incoming = component.flags();
        if let Some(existing) = self.flags_of(type_id) {
            let rule = ComponentFlags::DISALLOW_MULTIPLE_IN_ENTITY;
            if incoming.contains(rule) || existing.contains(rule) {
                return Err(SceneError::DuplicateComponent {
                    entity: self.name.clone(),
                    component: component.name().to_string(),
                });
            }
        }

        self.components.push(ComponentSlot {
            component: Box::new(component),
            type_id,
            enabled: true,
            started: false,
        });
        let last = self.components.len() - 1;
        self.init_slot(last);
        Ok(())
    }

    fn init_slot(&mut self, index: usize) {
        let Entity {
            handle,
            name,
            transform,
            parent_world,
            components,
            ..
        } = self;
        if let Some(slot) = components.get_mut(index) {
            let mut ctx = ComponentContext {
                entity: *handle,
                entity_name: name.as_str(),
                transform,
                parent_world: *parent_world,
                input: InputState::none(),
            };
            slot.component.on_init(&mut ctx);
            log::trace!("Entity '{}': added component '{}'", name, slot.component.name());
        }
    }

    /// Flags of the first component of the given type.
    pub(crate) fn flags_of(&self, type_id: TypeId) -> Option<ComponentFlags> {
        self.components
            .iter()
            .find(|s| s.type_id == type_id)
            .map(|s| s.component.flags())
    }

    /// Runs `on_destroy` and removes the first `T`. Returns whether one was found.
    pub fn remove_component<T: Component>(&mut self) -> bool {
        let type_id = TypeId::of::<T>();
        let Some(index) = self.components.iter().position(|s| s.type_id == type_id) else {
            return false;
        };
        let mut slot = self.components.remove(index);
        let mut ctx = ComponentContext {
            entity: self.handle,
            entity_name: self.name.as_str(),
            transform: &mut self.transform,
            parent_world: self.parent_world,
            input: InputState::none(),
        };
        slot.component.on_destroy(&mut ctx);
        true
    }

    /// First component of type `T`.
    pub fn get_component<T: Component>(&self) -> Option<&T> {
        self.components.iter().find_map(|s| s.downcast_ref::<T>())
    }

    /// First component of type `T`, mutable.
    pub fn get_component_mut<T: Component>(&mut self) -> Option<&mut T> {
        self.components.iter_mut().find_map(|s| s.downcast_mut::<T>())
    }

    /// Every component of type `T`, in order.
    pub fn get_components<T: Component>(&self) -> Vec<&T> {
        self.components
            .iter()
            .filter_map(|s| s.downcast_ref::<T>())
            .collect()
    }

    /// Whether a `T` is attached.
    pub fn has_component<T: Component>(&self) -> bool {
        let type_id = TypeId::of::<T>();
        self.components.iter().any(|s| s.type_id == type_id)
    }

    /// Enables or disables the entity, notifying every component on change.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        for_each_slot!(self, InputState::none(), |slot, ctx| true => {
            if enabled {
                slot.component.on_enable(&mut ctx);
            } else {
                slot.component.on_disable(&mut ctx);
            }
        });
    }

    /// Flips the enabled flag.
    pub fn toggle_enabled(&mut self) {
        self.set_enabled(!self.enabled);
    }

    /// Enables or disables the first `T`. Returns whether one was found.
    pub fn set_component_enabled<T: Component>(&mut self, enabled: bool) -> bool {
        let type_id = TypeId::of::<T>();
        let Some(slot) = self.components.iter_mut().find(|s| s.type_id == type_id) else {
            return false;
        };
        if slot.enabled != enabled {
            slot.enabled = enabled;
            let mut ctx = ComponentContext {
                entity: self.handle,
                entity_name: self.name.as_str(),
                transform: &mut self.transform,
                parent_world: self.parent_world,
                input: InputState::none(),
            };
            if enabled {
                slot.component.on_enable(&mut ctx);
            } else {
                slot.component.on_disable(&mut ctx);
            }
        }
        true
    }

    /// Enabled flag of the first `T`.
    pub fn is_component_enabled<T: Component>(&self) -> Option<bool> {
        let type_id = TypeId::of::<T>();
        self.components
            .iter()
            .find(|s| s.type_id == type_id)
            .map(|s| s.enabled)
    }

    pub(crate) fn set_parent_world(&mut self, parent_world: Mat4) {
        self.parent_world = parent_world;
    }

    pub(crate) fn set_parent_link(&mut self, parent: Option<EntityHandle>) {
        self.parent = parent;
    }

    pub(crate) fn push_child(&mut self, child: EntityHandle) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }

    pub(crate) fn remove_child(&mut self, child: EntityHandle) {
        self.children.retain(|c| *c != child);
    }

    pub(crate) fn update(&mut self, delta_time: f32, input: &InputState) {
        if !self.enabled {
            return;
        }
        for_each_slot!(self, input, |slot, ctx| slot.enabled => {
            if !slot.started {
                slot.started = true;
                slot.component.on_start(&mut ctx);
            }
            slot.component.on_update(&mut ctx, delta_time);
        });
    }

    pub(crate) fn physics_update(&mut self, delta_time: f32, input: &InputState) {
        if !self.enabled {
            return;
        }
        for_each_slot!(self, input, |slot, ctx| (slot.enabled && slot.started) => {
            slot.component.on_physics_update(&mut ctx, delta_time);
        });
    }

    pub(crate) fn pre_render(&mut self) {
        if !self.enabled {
            return;
        }
        for_each_slot!(self, InputState::none(), |slot, ctx| slot.enabled => {
            slot.component.on_pre_render(&mut ctx);
        });
    }

    pub(crate) fn render(&mut self, queue: &mut RenderQueue) {
        if !self.enabled {
            return;
        }
        for_each_slot!(self, InputState::none(), |slot, ctx| slot.enabled => {
            slot.component.on_render(&mut ctx, queue);
        });
    }

    /// Runs `on_destroy` on every component in order, then drops them.
    pub(crate) fn destroy(&mut self) {
        for_each_slot!(self, InputState::none(), |slot, ctx| true => {
            slot.component.on_destroy(&mut ctx);
        });
        self.components.clear();
    }
}
