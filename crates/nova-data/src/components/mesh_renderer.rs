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

use crate::component::{Component, ComponentContext, ComponentFlags};
use nova_core::renderer::{RenderObject, RenderQueue};

/// Submits one draw per frame at the owner's world transform.
///
/// The GPU resources are created by the caller; this component only
/// references them.
#[derive(Debug, Clone, PartialEq)]
pub struct MeshRenderer {
    /// Draw template. Its `model` is overwritten every frame.
    pub object: RenderObject,
}

impl MeshRenderer {
    /// Wraps a draw template.
    pub fn new(object: RenderObject) -> Self {
        Self { object }
    }
}

impl Component for MeshRenderer {
    fn name(&self) -> &str {
        "MeshRenderer"
    }

    fn flags(&self) -> ComponentFlags {
        ComponentFlags::DISALLOW_MULTIPLE_IN_ENTITY
    }

    fn on_render(&mut self, ctx: &mut ComponentContext, queue: &mut RenderQueue) {
        self.object.model = ctx.world_matrix();
        queue.push(self.object.clone());
    }
}
