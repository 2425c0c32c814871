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

//! Serializable snapshot of a scene.
//!
//! Snapshots hold the data part of a scene: entity names, handles, flags,
//! transforms and the hierarchy. Components are code and are not part of it;
//! the application re-attaches them after loading.

use crate::components::Transform;
use crate::error::SceneError;
use crate::handle::EntityHandle;
use nova_core::math::{Quaternion, Vec3};
use serde::{Deserialize, Serialize};

/// Root of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDefinition {
    /// Scene name.
    pub name: String,
    /// Entities in creation order.
    pub entities: Vec<EntityDefinition>,
}

/// One entity of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDefinition {
    /// Stable handle.
    pub handle: EntityHandle,
    /// Display name.
    pub name: String,
    /// Enabled flag.
    pub enabled: bool,
    /// Raw [`EntityHideFlags`](crate::EntityHideFlags) bits.
    #[serde(default)]
    pub hide_flags: u8,
    /// Local transform.
    pub transform: TransformDefinition,
    /// Parent, if any.
    #[serde(default)]
    pub parent: Option<EntityHandle>,
    /// Children in order.
    #[serde(default)]
    pub children: Vec<EntityHandle>,
}

/// Plain position / rotation / scale.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransformDefinition {
    /// Local position.
    pub position: Vec3,
    /// Local rotation.
    pub rotation: Quaternion,
    /// Local scale.
    pub scale: Vec3,
}

impl From<&Transform> for TransformDefinition {
    fn from(t: &Transform) -> Self {
        Self {
            position: t.position(),
            rotation: t.rotation(),
            scale: t.scale(),
        }
    }
}

impl From<TransformDefinition> for Transform {
    fn from(d: TransformDefinition) -> Self {
        Transform::new(d.position, d.rotation, d.scale)
    }
}

impl SceneDefinition {
    /// Human-readable RON text.
    pub fn to_ron_string(&self) -> Result<String, SceneError> {
        let pretty_config = ron::ser::PrettyConfig::default().indentor("  ".to_string());
        ron::ser::to_string_pretty(self, pretty_config)
            .map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Parses RON text.
    pub fn from_ron_str(text: &str) -> Result<Self, SceneError> {
        ron::de::from_str(text).map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Compact binary form.
    pub fn to_bytes(&self) -> Result<Vec<u8>, SceneError> {
        bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| SceneError::Serialization(e.to_string()))
    }

    /// Decodes [`to_bytes`](Self::to_bytes) output.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SceneError> {
        bincode::serde::decode_from_slice(bytes, bincode::config::standard())
            .map(|(def, _)| def)
            .map_err(|e| SceneError::Serialization(e.to_string()))
    }
}
