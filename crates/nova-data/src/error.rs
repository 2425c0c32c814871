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

//! Errors raised by entities, scenes and the scene manager.

use crate::handle::EntityHandle;
use std::fmt;

/// A rejected scene operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneError {
    /// No entity with this handle in the scene.
    EntityNotFound(EntityHandle),
    /// The entity already has a component of this type and one of them forbids duplicates.
    DuplicateComponent {
        /// Name of the entity.
        entity: String,
        /// Name of the rejected component.
        component: String,
    },
    /// Another entity of the scene already has this scene-unique component.
    DuplicateInScene {
        /// Name of the rejected component.
        component: String,
        /// Entity already holding one.
        existing_owner: EntityHandle,
    },
    /// Parenting `child` under `parent` would create a loop.
    HierarchyCycle {
        /// The entity being re-parented.
        child: EntityHandle,
        /// The requested parent.
        parent: EntityHandle,
    },
    /// A scene is already waiting to be activated.
    SceneAlreadyPending {
        /// Name of the scene that is pending.
        pending: String,
        /// Name of the scene that was refused.
        rejected: String,
    },
    /// A snapshot could not be encoded or decoded.
    Serialization(String),
    /// A decoded snapshot is inconsistent.
    InvalidDefinition(String),
    /// The entity has no component of the required type.
    ComponentNotFound {
        /// The entity that was searched.
        entity: EntityHandle,
        /// Name of the missing component type.
        component: &'static str,
    },
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SceneError::EntityNotFound(handle) => write!(f, "Entity {handle} not found"),
            SceneError::DuplicateComponent { entity, component } => write!(
                f,
                "Entity '{entity}' already has a '{component}' component and duplicates are not allowed"
            ),
            SceneError::DuplicateInScene {
                component,
                existing_owner,
            } => write!(
                f,
                "Component '{component}' is unique per scene and already present on entity {existing_owner}"
            ),
            SceneError::HierarchyCycle { child, parent } => write!(
                f,
                "Cannot parent {child} under {parent}: the hierarchy would contain a cycle"
            ),
            SceneError::SceneAlreadyPending { pending, rejected } => write!(
                f,
                "Scene '{rejected}' was not loaded: scene '{pending}' is already pending"
            ),
            SceneError::Serialization(msg) => write!(f, "Scene serialization failed: {msg}"),
            SceneError::InvalidDefinition(msg) => write!(f, "Invalid scene definition: {msg}"),
            SceneError::ComponentNotFound { entity, component } => {
                write!(f, "Entity {entity} has no '{component}' component")
            }
        }
    }
}

impl std::error::Error for SceneError {}
