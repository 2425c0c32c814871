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

use crate::error::SceneError;
use crate::scene::Scene;
use nova_core::platform::InputState;
use nova_core::renderer::RenderQueue;

/// Holds the active scene and swaps in a pending one at the start of the
/// next [`update`](Self::update).
#[derive(Debug, Default)]
pub struct SceneManager {
    active: Option<Scene>,
    pending: Option<Scene>,
    activated: Option<String>,
}

impl SceneManager {
    /// A manager without scenes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `scene` to become active on the next update.
    ///
    /// # Errors
    /// [`SceneError::SceneAlreadyPending`] if another scene is already queued;
    /// the queued one is kept and `scene` is dropped.
    pub fn load_scene(&mut self, scene: Scene) -> Result<(), SceneError> {
        if let Some(pending) = &self.pending {
            return Err(SceneError::SceneAlreadyPending {
                pending: pending.name().to_string(),
                rejected: scene.name().to_string(),
            });
        }
        log::debug!("SceneManager: '{}' queued for activation", scene.name());
        self.pending = Some(scene);
        Ok(())
    }

    /// Creates, initializes and activates an empty scene right away.
    ///
    /// The previous active scene is destroyed. A pending scene stays queued.
    pub fn create_scene_and_set_active(&mut self, name: impl Into<String>) -> &mut Scene {
        if let Some(mut old) = self.active.take() {
            old.destroy();
        }
        let mut scene = Scene::new(name);
        scene.init();
        self.activated = Some(scene.name().to_string());
        self.active.insert(scene)
    }

    /// Whether a scene is queued.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Active scene.
    pub fn active_scene(&self) -> Option<&Scene> {
        self.active.as_ref()
    }

    /// Active scene, mutable.
    pub fn active_scene_mut(&mut self) -> Option<&mut Scene> {
        self.active.as_mut()
    }

    /// Name of the scene activated since the last call, if any.
    pub fn take_activated(&mut self) -> Option<String> {
        self.activated.take()
    }

    fn apply_pending(&mut self) {
        let Some(mut next) = self.pending.take() else {
            return;
        };
        if let Some(mut old) = self.active.take() {
            log::info!("SceneManager: unloading '{}'", old.name());
            old.destroy();
        }
        next.init();
        log::info!("SceneManager: '{}' is now active", next.name());
        self.activated = Some(next.name().to_string());
        self.active = Some(next);
    }

    /// Swaps in the pending scene, then updates the active one.
    pub fn update(&mut self, delta_time: f32) {
        self.update_with_input(delta_time, InputState::none());
    }

    /// [`update`](Self::update) with the frame's input handed to component hooks.
    pub fn update_with_input(&mut self, delta_time: f32, input: &InputState) {
        self.apply_pending();
        if let Some(scene) = self.active.as_mut() {
            scene.update_with_input(delta_time, input);
        }
    }

    /// Pre-render hooks of the active scene.
    pub fn pre_render(&mut self) {
        if let Some(scene) = self.active.as_mut() {
            scene.pre_render();
        }
    }

    /// Render hooks of the active scene.
    pub fn render(&mut self, queue: &mut RenderQueue) {
        if let Some(scene) = self.active.as_mut() {
            scene.render(queue);
        }
    }

    /// Destroys the active scene. Returns whether there was one.
    pub fn unload_active_scene(&mut self) -> bool {
        match self.active.take() {
            Some(mut scene) => {
                scene.destroy();
                true
            }
            None => false,
        }
    }

    /// Destroys the active scene and drops the pending one.
    pub fn destroy(&mut self) {
        self.unload_active_scene();
        if let Some(mut pending) = self.pending.take() {
            pending.destroy();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_scene_activates_on_update() {
        let mut manager = SceneManager::new();
        assert!(manager.active_scene().is_none());
        manager.load_scene(Scene::new("level1")).unwrap();
        assert!(manager.has_pending());
        assert!(manager.active_scene().is_none());

        manager.update(0.016);
        assert!(!manager.has_pending());
        let active = manager.active_scene().unwrap();
        assert_eq!(active.name(), "level1");
        assert!(active.is_initialized());
        assert_eq!(manager.take_activated().as_deref(), Some("level1"));
        assert_eq!(manager.take_activated(), None);
    }

    #[test]
    fn test_second_load_is_rejected_while_pending() {
        let mut manager = SceneManager::new();
        manager.load_scene(Scene::new("a")).unwrap();
        let err = manager.load_scene(Scene::new("b")).unwrap_err();
        assert_eq!(
            err,
            SceneError::SceneAlreadyPending {
                pending: "a".into(),
                rejected: "b".into()
            }
        );
        manager.update(0.0);
        assert_eq!(manager.active_scene().unwrap().name(), "a");
        manager.load_scene(Scene::new("b")).unwrap();
    }

    #[test]
    fn test_switching_destroys_previous_scene() {
        let mut manager = SceneManager::new();
        let scene = manager.create_scene_and_set_active("first");
        scene.create_entity("e");
        manager.load_scene(Scene::new("second")).unwrap();
        manager.update(0.0);
        let active = manager.active_scene().unwrap();
        assert_eq!(active.name(), "second");
        assert!(active.is_empty());
    }

    #[test]
    fn test_unload_and_destroy() {
        let mut manager = SceneManager::new();
        assert!(!manager.unload_active_scene());
        manager.create_scene_and_set_active("s");
        assert!(manager.unload_active_scene());
        manager.load_scene(Scene::new("p")).unwrap();
        manager.destroy();
        assert!(!manager.has_pending());
        assert!(manager.active_scene().is_none());
    }
}
