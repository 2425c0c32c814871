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

//! Integration tests for scenes driven through the manager.

use nova_core::math::{Color, Mat4, Vec3};
use nova_core::renderer::{BufferId, RenderObject, RenderPipelineId, RenderQueue};
use nova_data::components::{Camera, MeshRenderer};
use nova_data::{
    Component, ComponentContext, EntityHandle, Scene, SceneError, SceneManager, Tween, TweenEase,
};
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

struct Recorder {
    log: Log,
}

impl Component for Recorder {
    fn name(&self) -> &str {
        "Recorder"
    }
    fn on_start(&mut self, ctx: &mut ComponentContext) {
        self.log.lock().unwrap().push(format!("start {}", ctx.entity_name));
    }
    fn on_update(&mut self, ctx: &mut ComponentContext, _dt: f32) {
        self.log.lock().unwrap().push(format!("update {}", ctx.entity_name));
    }
    fn on_physics_update(&mut self, ctx: &mut ComponentContext, _dt: f32) {
        self.log.lock().unwrap().push(format!("physics {}", ctx.entity_name));
    }
    fn on_destroy(&mut self, ctx: &mut ComponentContext) {
        self.log.lock().unwrap().push(format!("destroy {}", ctx.entity_name));
    }
}

fn triangle() -> RenderObject {
    RenderObject::new(RenderPipelineId(0), BufferId(0), 3)
}

#[test]
fn test_frame_hook_order_across_entities() {
    let log = Log::default();
    let mut scene = Scene::new("order");
    let a = scene.create_entity("a");
    let b = scene.create_entity("b");
    scene.add_component(a, Recorder { log: log.clone() }).unwrap();
    scene.add_component(b, Recorder { log: log.clone() }).unwrap();

    let mut manager = SceneManager::new();
    manager.load_scene(scene).unwrap();
    manager.update(0.016);

    assert_eq!(
        *log.lock().unwrap(),
        vec![
            "start a",
            "update a",
            "start b",
            "update b",
            "physics a",
            "physics b"
        ]
    );
}

#[test]
fn test_switching_scene_destroys_children_first() {
    let log = Log::default();
    let mut scene = Scene::new("first");
    let root = scene.create_entity("root");
    let child = scene.create_child_entity(root, "child").unwrap();
    scene.add_component(root, Recorder { log: log.clone() }).unwrap();
    scene.add_component(child, Recorder { log: log.clone() }).unwrap();

    let mut manager = SceneManager::new();
    manager.load_scene(scene).unwrap();
    manager.update(0.0);
    log.lock().unwrap().clear();

    manager.load_scene(Scene::new("second")).unwrap();
    assert!(matches!(
        manager.load_scene(Scene::new("third")),
        Err(SceneError::SceneAlreadyPending { .. })
    ));
    manager.update(0.0);

    assert_eq!(*log.lock().unwrap(), vec!["destroy child", "destroy root"]);
    assert_eq!(manager.active_scene().unwrap().name(), "second");
}

#[test]
fn test_mesh_renderer_uses_world_matrix() {
    let mut scene = Scene::new("render");
    let parent = scene.create_entity("parent");
    let child = scene.create_child_entity(parent, "child").unwrap();
    scene
        .entity_mut(parent)
        .unwrap()
        .transform_mut()
        .set_position(Vec3::new(1.0, 2.0, 3.0));
    scene.add_component(child, MeshRenderer::new(triangle())).unwrap();
    scene.init();

    let mut queue = RenderQueue::new();
    scene.pre_render();
    scene.render(&mut queue);

    assert_eq!(queue.len(), 1);
    let object = &queue.as_slice()[0];
    assert!(object
        .model
        .approx_eq(&Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0)), 1e-6));
    assert_eq!(queue.triangle_count(), 1);
}

#[test]
fn test_disabled_entity_is_not_rendered() {
    let mut scene = Scene::new("render");
    let e = scene.create_entity("hidden");
    scene.add_component(e, MeshRenderer::new(triangle())).unwrap();
    scene.entity_mut(e).unwrap().set_enabled(false);

    let mut queue = RenderQueue::new();
    scene.render(&mut queue);
    assert!(queue.is_empty());
}

#[test]
fn test_ron_snapshot_keeps_handles_and_hierarchy() {
    let mut scene = Scene::new("saved");
    let root = scene.create_entity("root");
    let child = scene.create_child_entity(root, "child").unwrap();
    scene
        .entity_mut(child)
        .unwrap()
        .transform_mut()
        .set_position(Vec3::new(0.5, 0.0, -2.0));
    scene.entity_mut(root).unwrap().set_enabled(false);
    scene.add_component(root, Camera::default()).unwrap();

    let text = scene.save_ron().unwrap();
    let loaded = Scene::load_ron(&text).unwrap();

    assert_eq!(loaded.name(), "saved");
    assert_eq!(loaded.handles(), &[root, child]);
    assert_eq!(loaded.entity(child).unwrap().parent(), Some(root));
    assert!(!loaded.entity(root).unwrap().is_enabled());
    assert!(loaded
        .entity(child)
        .unwrap()
        .transform()
        .position()
        .approx_eq(Vec3::new(0.5, 0.0, -2.0), 1e-6));
    assert_eq!(loaded.entity(root).unwrap().component_count(), 0);
}

#[test]
fn test_binary_snapshot_matches_definition() {
    let mut scene = Scene::new("bin");
    let a = scene.create_entity("a");
    scene.create_child_entity(a, "b").unwrap();
    let bytes = scene.save_bytes().unwrap();
    let loaded = Scene::load_bytes(&bytes).unwrap();
    assert_eq!(loaded.to_definition(), scene.to_definition());
    assert!(Scene::load_bytes(&bytes[..bytes.len() / 2]).is_err());
}

#[test]
fn test_null_handle_is_never_found() {
    let scene = Scene::new("empty");
    assert!(scene.entity(EntityHandle::NULL).is_none());
    assert!(scene.world_matrix(EntityHandle::NULL).is_none());
}

#[test]
fn test_snapshot_with_parent_cycle_is_rejected() {
    let mut scene = Scene::new("cyclic");
    let a = scene.create_entity("a");
    let b = scene.create_entity("b");
    let mut definition = scene.to_definition();
    definition.entities[0].parent = Some(b);
    definition.entities[0].children = vec![b];
    definition.entities[1].parent = Some(a);
    definition.entities[1].children = vec![a];

    let text = definition.to_ron_string().unwrap();
    assert!(matches!(
        Scene::load_ron(&text),
        Err(SceneError::InvalidDefinition(_))
    ));
    assert!(matches!(
        Scene::from_definition(definition),
        Err(SceneError::InvalidDefinition(_))
    ));
}

#[test]
fn test_snapshot_with_self_parent_is_rejected() {
    let mut scene = Scene::new("self");
    let a = scene.create_entity("a");
    let mut definition = scene.to_definition();
    definition.entities[0].parent = Some(a);
    definition.entities[0].children = vec![a];
    assert!(matches!(
        Scene::from_definition(definition),
        Err(SceneError::InvalidDefinition(_))
    ));
}

#[test]
fn test_tweens_advance_with_the_manager() {
    let mut scene = Scene::new("tweening");
    let cube = scene.create_entity("Cube");
    let id = scene
        .start_tween(Tween::scale(cube, Vec3::new(3.0, 3.0, 3.0), 2.0).with_ease(TweenEase::Linear))
        .unwrap();
    let mut manager = SceneManager::new();
    manager.load_scene(scene).unwrap();

    manager.update(0.5);
    let scene = manager.active_scene().unwrap();
    let scale = scene.entity(cube).unwrap().transform().scale();
    assert!(scale.approx_eq(Vec3::new(1.5, 1.5, 1.5), 1e-5));
    assert!(scene.tweens().is_active(id));

    manager.update(1.5);
    let scene = manager.active_scene_mut().unwrap();
    assert_eq!(scene.entity(cube).unwrap().transform().scale(), Vec3::new(3.0, 3.0, 3.0));
    assert_eq!(scene.tweens_mut().take_finished(), vec![id]);
}

#[test]
fn test_camera_clear_color_tween() {
    let mut scene = Scene::new("fade");
    let camera = scene.create_entity("Camera");
    scene.add_component(camera, Camera::default()).unwrap();
    scene
        .start_tween(Tween::clear_color(camera, Color::WHITE, 1.0))
        .unwrap();

    scene.update(1.0);

    let cam = scene.entity(camera).unwrap().get_component::<Camera>().unwrap();
    assert_eq!(cam.clear_color, Color::WHITE);
}

#[test]
fn test_start_tween_rejects_unknown_targets() {
    let mut scene = Scene::new("errors");
    let plain = scene.create_entity("Plain");
    let mut gone = scene.create_entity("Gone");
    scene.destroy_entity(&mut gone);

    assert!(matches!(
        scene.start_tween(Tween::position(gone, Vec3::ONE, 1.0)),
        Err(SceneError::EntityNotFound(_))
    ));
    assert!(matches!(
        scene.start_tween(Tween::clear_color(plain, Color::WHITE, 1.0)),
        Err(SceneError::ComponentNotFound { component: "Camera", .. })
    ));
    assert!(scene.tweens().is_empty());
}

#[test]
fn test_tweens_stop_with_their_entity_and_scene() {
    let mut scene = Scene::new("cleanup");
    let mut cube = scene.create_entity("Cube");
    let other = scene.create_entity("Other");
    scene.start_tween(Tween::position(cube, Vec3::ONE, 1.0)).unwrap();
    scene.start_tween(Tween::position(other, Vec3::ONE, 1.0)).unwrap();

    scene.destroy_entity(&mut cube);
    scene.update(0.1);
    assert_eq!(scene.tweens().len(), 1);

    scene.destroy();
    assert!(scene.tweens().is_empty());
}
