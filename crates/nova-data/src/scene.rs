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

//! A named collection of entities and their hierarchy.

use crate::component::{Component, ComponentFlags};
use crate::components::Camera;
use crate::definition::{EntityDefinition, SceneDefinition};
use crate::entity::{Entity, EntityHideFlags};
use crate::error::SceneError;
use crate::handle::EntityHandle;
use crate::tween::{Tween, TweenId, TweenManager};
use nova_core::math::Mat4;
use nova_core::platform::InputState;
use nova_core::renderer::{RenderQueue, ViewInfo};
use std::any::TypeId;
use std::collections::{HashMap, HashSet};

/// Owns entities and drives their components.
///
/// Iteration always follows creation order.
#[derive(Debug)]
pub struct Scene {
    name: String,
    entities: HashMap<EntityHandle, Entity>,
    order: Vec<EntityHandle>,
    tweens: TweenManager,
    initialized: bool,
}

impl Scene {
    /// An empty scene.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entities: HashMap::new(),
            order: Vec::new(),
            tweens: TweenManager::new(),
            initialized: false,
        }
    }

    /// Scene name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `init` has run.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Number of entities.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// `true` without entities.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Whether the handle refers to an entity of this scene.
    pub fn contains(&self, handle: EntityHandle) -> bool {
        self.entities.contains_key(&handle)
    }

    /// Handles in creation order.
    pub fn handles(&self) -> &[EntityHandle] {
        &self.order
    }

    /// Calls `f` with every handle in creation order.
    pub fn for_each(&self, mut f: impl FnMut(&EntityHandle)) {
        self.order.iter().for_each(|h| f(h));
    }

    /// Entities without parent, in creation order.
    pub fn roots(&self) -> Vec<EntityHandle> {
        self.order
            .iter()
            .copied()
            .filter(|h| self.entities.get(h).is_some_and(|e| e.parent().is_none()))
            .collect()
    }

    /// Entity by handle.
    pub fn entity(&self, handle: EntityHandle) -> Option<&Entity> {
        self.entities.get(&handle)
    }

    /// Entity by handle, mutable.
    pub fn entity_mut(&mut self, handle: EntityHandle) -> Option<&mut Entity> {
        self.entities.get_mut(&handle)
    }

    /// First entity with this name, in creation order.
    pub fn find_entity_by_name(&self, name: &str) -> Option<EntityHandle> {
        self.order
            .iter()
            .copied()
            .find(|h| self.entities.get(h).is_some_and(|e| e.name() == name))
    }

    /// Creates an enabled root entity and returns its handle.
    pub fn create_entity(&mut self, name: impl Into<String>) -> EntityHandle {
        self.insert_entity(Entity::new(name))
    }

    /// Creates an entity under `parent`.
    pub fn create_child_entity(
        &mut self,
        parent: EntityHandle,
        name: impl Into<String>,
    ) -> Result<EntityHandle, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::EntityNotFound(parent));
        }
        let child = self.create_entity(name);
        self.set_parent(child, Some(parent))?;
        Ok(child)
    }

    fn insert_entity(&mut self, entity: Entity) -> EntityHandle {
        let handle = entity.handle();
        log::trace!("Scene '{}': created entity '{}' ({})", self.name, entity.name(), handle);
        self.order.push(handle);
        self.entities.insert(handle, entity);
        handle
    }

    /// Destroys an entity and, first, all of its descendants.
    ///
    /// On success the caller's handle is reset to [`EntityHandle::NULL`].
    /// Returns `false` for null or unknown handles.
    pub fn destroy_entity(&mut self, handle: &mut EntityHandle) -> bool {
        if handle.is_null() || !self.contains(*handle) {
            return false;
        }
        if let Some(parent) = self.entities.get(handle).and_then(Entity::parent) {
            if let Some(p) = self.entities.get_mut(&parent) {
                p.remove_child(*handle);
            }
        }
        self.destroy_subtree(*handle);
        *handle = EntityHandle::NULL;
        true
    }

    fn destroy_subtree(&mut self, handle: EntityHandle) {
        let children = match self.entities.get(&handle) {
            Some(e) => e.children().to_vec(),
            None => return,
        };
        for child in children {
            self.destroy_subtree(child);
        }
        if let Some(mut entity) = self.entities.remove(&handle) {
            entity.destroy();
            log::trace!("Scene '{}': destroyed entity '{}'", self.name, entity.name());
        }
        self.order.retain(|h| *h != handle);
    }

    /// Re-parents `child`. `None` makes it a root.
    ///
    /// # Errors
    /// [`SceneError::EntityNotFound`] for unknown handles and
    /// [`SceneError::HierarchyCycle`] when `parent` is `child` or one of its descendants.
    pub fn set_parent(
        &mut self,
        child: EntityHandle,
        parent: Option<EntityHandle>,
    ) -> Result<(), SceneError> {
        if !self.contains(child) {
            return Err(SceneError::EntityNotFound(child));
        }
        if let Some(p) = parent {
            if !self.contains(p) {
                return Err(SceneError::EntityNotFound(p));
            }
            let mut cursor = Some(p);
            while let Some(current) = cursor {
                if current == child {
                    return Err(SceneError::HierarchyCycle { child, parent: p });
                }
                cursor = self.entities.get(&current).and_then(Entity::parent);
            }
        }

        let old = self.entities.get(&child).and_then(Entity::parent);
        if let Some(old) = old {
            if let Some(e) = self.entities.get_mut(&old) {
                e.remove_child(child);
            }
        }
        if let Some(p) = parent {
            if let Some(e) = self.entities.get_mut(&p) {
                e.push_child(child);
            }
        }
        if let Some(e) = self.entities.get_mut(&child) {
            e.set_parent_link(parent);
        }
        Ok(())
    }

    /// Attaches a component, enforcing both the entity and the scene duplicate rules.
    pub fn add_component<C: Component>(
        &mut self,
        handle: EntityHandle,
        component: C,
    ) -> Result<(), SceneError> {
        let type_id = TypeId::of::<C>();
        let scene_rule = ComponentFlags::DISALLOW_MULTIPLE_IN_SCENE;
        if let Some((owner, existing)) = self.find_component_type(type_id) {
            if component.flags().contains(scene_rule) || existing.contains(scene_rule) {
                return Err(SceneError::DuplicateInScene {
                    component: component.name().to_string(),
                    existing_owner: owner,
                });
            }
        }
        let parent_world = self.parent_world(handle);
        let entity = self
            .entities
            .get_mut(&handle)
            .ok_or(SceneError::EntityNotFound(handle))?;
        entity.set_parent_world(parent_world);
        entity.add_component(component)
    }

    fn find_component_type(&self, type_id: TypeId) -> Option<(EntityHandle, ComponentFlags)> {
        self.order.iter().find_map(|h| {
            self.entities
                .get(h)
                .and_then(|e| e.flags_of(type_id))
                .map(|flags| (*h, flags))
        })
    }

    /// Every `T` in the scene, in entity creation then component order.
    pub fn get_all_components<T: Component>(&self) -> Vec<(EntityHandle, &T)> {
        self.order
            .iter()
            .filter_map(|h| self.entities.get(h))
            .flat_map(|e| {
                e.get_components::<T>()
                    .into_iter()
                    .map(move |c| (e.handle(), c))
            })
            .collect()
    }

    /// World matrix: the product of local matrices from the root down.
    pub fn world_matrix(&self, handle: EntityHandle) -> Option<Mat4> {
        let entity = self.entities.get(&handle)?;
        Some(self.parent_world(handle) * entity.transform().local_matrix())
    }

    fn parent_world(&self, handle: EntityHandle) -> Mat4 {
        let mut world = Mat4::IDENTITY;
        let mut cursor = self.entities.get(&handle).and_then(Entity::parent);
        while let Some(current) = cursor {
            match self.entities.get(&current) {
                Some(e) => {
                    world = e.transform().local_matrix() * world;
                    cursor = e.parent();
                }
                None => break,
            }
        }
        world
    }

    fn refresh_parent_worlds(&mut self) {
        let worlds: Vec<(EntityHandle, Mat4)> = self
            .order
            .iter()
            .map(|h| (*h, self.parent_world(*h)))
            .collect();
        for (handle, world) in worlds {
            if let Some(e) = self.entities.get_mut(&handle) {
                e.set_parent_world(world);
            }
        }
    }

    /// Marks the scene ready. Idempotent.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.refresh_parent_worlds();
        self.initialized = true;
        log::info!("Scene '{}' initialized with {} entities", self.name, self.len());
    }

    /// [`update_with_input`](Self::update_with_input) without input.
    pub fn update(&mut self, delta_time: f32) {
        self.update_with_input(delta_time, InputState::none());
    }

    /// Runs every `on_update`, then every `on_physics_update`, then advances
    /// the running tweens.
    pub fn update_with_input(&mut self, delta_time: f32, input: &InputState) {
        self.refresh_parent_worlds();
        for handle in self.order.clone() {
            if let Some(e) = self.entities.get_mut(&handle) {
                e.update(delta_time, input);
            }
        }
        for handle in self.order.clone() {
            if let Some(e) = self.entities.get_mut(&handle) {
                e.physics_update(delta_time, input);
            }
        }
        self.tweens.update(delta_time, &mut self.entities);
    }

    /// Starts animating an entity property from its current value.
    ///
    /// # Errors
    /// [`SceneError::EntityNotFound`] for unknown entities and
    /// [`SceneError::ComponentNotFound`] for a clear color tween on an entity
    /// without a [`Camera`].
    pub fn start_tween(&mut self, tween: Tween) -> Result<TweenId, SceneError> {
        let entity = self
            .entities
            .get(&tween.entity)
            .ok_or(SceneError::EntityNotFound(tween.entity))?;
        self.tweens
            .start(tween, entity)
            .ok_or(SceneError::ComponentNotFound {
                entity: tween.entity,
                component: "Camera",
            })
    }

    /// Running tweens.
    pub fn tweens(&self) -> &TweenManager {
        &self.tweens
    }

    /// Running tweens, mutable.
    pub fn tweens_mut(&mut self) -> &mut TweenManager {
        &mut self.tweens
    }

    /// Runs every `on_pre_render`.
    pub fn pre_render(&mut self) {
        self.refresh_parent_worlds();
        for handle in self.order.clone() {
            if let Some(e) = self.entities.get_mut(&handle) {
                e.pre_render();
            }
        }
    }

    /// Runs every `on_render`, collecting draws into `queue`.
    pub fn render(&mut self, queue: &mut RenderQueue) {
        self.refresh_parent_worlds();
        for handle in self.order.clone() {
            if let Some(e) = self.entities.get_mut(&handle) {
                e.render(queue);
            }
        }
    }

    /// Destroys every entity.
    pub fn destroy(&mut self) {
        self.tweens.clear();
        for mut root in self.roots() {
            self.destroy_entity(&mut root);
        }
        self.initialized = false;
        log::debug!("Scene '{}' destroyed", self.name);
    }

    /// View of the first enabled entity holding an enabled [`Camera`].
    pub fn main_camera_view(&self, aspect: f32) -> Option<ViewInfo> {
        self.order.iter().find_map(|h| {
            let entity = self.entities.get(h)?;
            if !entity.is_enabled() || entity.is_component_enabled::<Camera>() != Some(true) {
                return None;
            }
            let camera = entity.get_component::<Camera>()?;
            let world = self.world_matrix(*h)?;
            Some(camera.view_info_for(&world, aspect))
        })
    }

    /// Snapshot of the data part of the scene.
    pub fn to_definition(&self) -> SceneDefinition {
        SceneDefinition {
            name: self.name.clone(),
            entities: self
                .order
                .iter()
                .filter_map(|h| self.entities.get(h))
                .map(|e| EntityDefinition {
                    handle: e.handle(),
                    name: e.name().to_string(),
                    enabled: e.is_enabled(),
                    hide_flags: e.hide_flags().bits(),
                    transform: e.transform().into(),
                    parent: e.parent(),
                    children: e.children().to_vec(),
                })
                .collect(),
        }
    }

    /// Rebuilds a scene from a snapshot. The result has no components.
    ///
    /// # Errors
    /// [`SceneError::InvalidDefinition`] for duplicate handles, dangling
    /// links, parent and child lists that disagree, or parent cycles.
    pub fn from_definition(definition: SceneDefinition) -> Result<Self, SceneError> {
        let mut seen = HashSet::new();
        for e in &definition.entities {
            if e.handle.is_null() || !seen.insert(e.handle) {
                return Err(SceneError::InvalidDefinition(format!(
                    "duplicate or null handle {}",
                    e.handle
                )));
            }
        }
        let by_handle: HashMap<EntityHandle, &EntityDefinition> =
            definition.entities.iter().map(|e| (e.handle, e)).collect();
        for e in &definition.entities {
            if let Some(p) = e.parent {
                let consistent = by_handle
                    .get(&p)
                    .is_some_and(|parent| parent.children.contains(&e.handle));
                if !consistent {
                    return Err(SceneError::InvalidDefinition(format!(
                        "entity {} names parent {} which does not list it",
                        e.handle, p
                    )));
                }
            }
            for c in &e.children {
                if by_handle.get(c).and_then(|child| child.parent) != Some(e.handle) {
                    return Err(SceneError::InvalidDefinition(format!(
                        "entity {} lists child {} which does not point back",
                        e.handle, c
                    )));
                }
            }
        }
        for e in &definition.entities {
            let mut visited = HashSet::from([e.handle]);
            let mut cursor = e.parent;
            while let Some(current) = cursor {
                if !visited.insert(current) || visited.len() > definition.entities.len() {
                    return Err(SceneError::InvalidDefinition(format!(
                        "entity {} is part of a parent cycle",
                        e.handle
                    )));
                }
                cursor = by_handle.get(&current).and_then(|p| p.parent);
            }
        }

        let mut scene = Scene::new(definition.name);
        for def in definition.entities {
            let mut entity = Entity::with_handle(def.name, def.handle);
            *entity.transform_mut() = def.transform.into();
            entity.set_hide_flags(EntityHideFlags::from_bits_truncate(def.hide_flags));
            entity.set_parent_link(def.parent);
            for child in def.children {
                entity.push_child(child);
            }
            if !def.enabled {
                entity.set_enabled(false);
            }
            scene.insert_entity(entity);
        }
        Ok(scene)
    }

    /// RON snapshot.
    pub fn save_ron(&self) -> Result<String, SceneError> {
        self.to_definition().to_ron_string()
    }

    /// Scene from a RON snapshot.
    pub fn load_ron(text: &str) -> Result<Self, SceneError> {
        Self::from_definition(SceneDefinition::from_ron_str(text)?)
    }

    /// Binary snapshot.
    pub fn save_bytes(&self) -> Result<Vec<u8>, SceneError> {
        self.to_definition().to_bytes()
    }

    /// Scene from a binary snapshot.
    pub fn load_bytes(bytes: &[u8]) -> Result<Self, SceneError> {
        Self::from_definition(SceneDefinition::from_bytes(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::ComponentContext;
    use nova_core::math::{Quaternion, Vec3};

    struct Unique;

    impl Component for Unique {
        fn name(&self) -> &str {
            "Unique"
        }
        fn flags(&self) -> ComponentFlags {
            ComponentFlags::DISALLOW_MULTIPLE_IN_SCENE
        }
    }

    struct Spin(f32);

    impl Component for Spin {
        fn name(&self) -> &str {
            "Spin"
        }
        fn on_update(&mut self, ctx: &mut ComponentContext, dt: f32) {
            ctx.transform
                .rotate(Quaternion::from_axis_angle(Vec3::UP, self.0 * dt));
        }
    }

    #[test]
    fn test_create_and_find() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        assert_eq!(scene.len(), 2);
        assert_eq!(scene.handles(), &[a, b]);
        assert_eq!(scene.find_entity_by_name("b"), Some(b));
        assert_eq!(scene.find_entity_by_name("zzz"), None);
        let mut visited = Vec::new();
        scene.for_each(|h| visited.push(*h));
        assert_eq!(visited, vec![a, b]);
    }

    #[test]
    fn test_destroy_entity_takes_children_and_resets_handle() {
        let mut scene = Scene::new("test");
        let mut root = scene.create_entity("root");
        let child = scene.create_child_entity(root, "child").unwrap();
        let grandchild = scene.create_child_entity(child, "grandchild").unwrap();
        let other = scene.create_entity("other");

        assert!(scene.destroy_entity(&mut root));
        assert!(root.is_null());
        assert!(!scene.contains(child));
        assert!(!scene.contains(grandchild));
        assert_eq!(scene.handles(), &[other]);
        assert!(!scene.destroy_entity(&mut root));
        let mut unknown = EntityHandle::new();
        assert!(!scene.destroy_entity(&mut unknown));
        assert!(!unknown.is_null());
    }

    #[test]
    fn test_destroying_a_child_unlinks_it() {
        let mut scene = Scene::new("test");
        let root = scene.create_entity("root");
        let mut child = scene.create_child_entity(root, "child").unwrap();
        scene.destroy_entity(&mut child);
        assert!(scene.entity(root).unwrap().children().is_empty());
    }

    #[test]
    fn test_set_parent_rejects_cycles_and_moves_links() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        let b = scene.create_child_entity(a, "b").unwrap();
        let c = scene.create_child_entity(b, "c").unwrap();

        assert_eq!(
            scene.set_parent(a, Some(c)),
            Err(SceneError::HierarchyCycle { child: a, parent: c })
        );
        assert!(scene.set_parent(a, Some(a)).is_err());
        assert!(matches!(
            scene.set_parent(a, Some(EntityHandle::new())),
            Err(SceneError::EntityNotFound(_))
        ));

        scene.set_parent(c, Some(a)).unwrap();
        assert_eq!(scene.entity(a).unwrap().children(), &[b, c]);
        assert!(scene.entity(b).unwrap().children().is_empty());
        scene.set_parent(c, None).unwrap();
        assert_eq!(scene.roots(), vec![a, c]);
    }

    #[test]
    fn test_scene_unique_components() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        let b = scene.create_entity("b");
        scene.add_component(a, Unique).unwrap();
        assert_eq!(
            scene.add_component(b, Unique),
            Err(SceneError::DuplicateInScene {
                component: "Unique".into(),
                existing_owner: a
            })
        );
        scene.add_component(a, Spin(1.0)).unwrap();
        scene.add_component(b, Spin(2.0)).unwrap();
        let spins = scene.get_all_components::<Spin>();
        assert_eq!(spins.len(), 2);
        assert_eq!(spins[0].0, a);
        assert_eq!(spins[1].1 .0, 2.0);
    }

    #[test]
    fn test_world_matrix_chains_parents() {
        let mut scene = Scene::new("test");
        let parent = scene.create_entity("parent");
        let child = scene.create_child_entity(parent, "child").unwrap();
        scene
            .entity_mut(parent)
            .unwrap()
            .transform_mut()
            .set_position(Vec3::new(10.0, 0.0, 0.0));
        scene
            .entity_mut(child)
            .unwrap()
            .transform_mut()
            .set_position(Vec3::new(0.0, 1.0, 0.0));
        let world = scene.world_matrix(child).unwrap();
        assert!(world
            .translation()
            .approx_eq(Vec3::new(10.0, 1.0, 0.0), 1e-6));
    }

    #[test]
    fn test_update_drives_components() {
        let mut scene = Scene::new("test");
        let e = scene.create_entity("spinner");
        scene.add_component(e, Spin(std::f32::consts::PI)).unwrap();
        scene.init();
        scene.update(0.5);
        let fwd = scene.entity(e).unwrap().transform().forward();
        assert!(fwd.approx_eq(Vec3::LEFT, 1e-5));
    }

    #[test]
    fn test_main_camera_uses_first_enabled_camera() {
        let mut scene = Scene::new("test");
        assert!(scene.main_camera_view(1.0).is_none());
        let off = scene.create_entity("off");
        scene.add_component(off, Camera::default()).unwrap();
        scene.entity_mut(off).unwrap().set_enabled(false);
        let on = scene.create_entity("on");
        scene
            .entity_mut(on)
            .unwrap()
            .transform_mut()
            .set_position(Vec3::new(0.0, 0.0, 4.0));
        scene.add_component(on, Camera::default()).unwrap();
        let view = scene.main_camera_view(16.0 / 9.0).unwrap();
        assert!(view
            .camera_position
            .approx_eq(Vec3::new(0.0, 0.0, 4.0), 1e-6));
    }

    #[test]
    fn test_definition_rejects_dangling_links() {
        let mut scene = Scene::new("test");
        let a = scene.create_entity("a");
        scene.create_child_entity(a, "b").unwrap();
        let mut def = scene.to_definition();
        def.entities[0].children.clear();
        assert!(matches!(
            Scene::from_definition(def),
            Err(SceneError::InvalidDefinition(_))
        ));
    }
}
