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

//! Stable entity identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// A persistent identifier for an entity.
///
/// Handles are random (version 4) UUIDs, so they stay valid across scene
/// save and load and never collide between scenes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityHandle(Uuid);

impl EntityHandle {
    /// The handle that refers to nothing.
    pub const NULL: Self = Self(Uuid::nil());

    /// A fresh random handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// The underlying UUID.
    pub const fn uuid(&self) -> Uuid {
        self.0
    }

    /// `true` for [`EntityHandle::NULL`].
    pub fn is_null(&self) -> bool {
        self.0.is_nil()
    }
}

impl Default for EntityHandle {
    /// Defaults to [`EntityHandle::NULL`], not to a fresh handle.
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Display for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_handle() {
        assert!(EntityHandle::NULL.is_null());
        assert!(EntityHandle::default().is_null());
        assert!(!EntityHandle::new().is_null());
    }

    #[test]
    fn test_fresh_handles_are_distinct() {
        assert_ne!(EntityHandle::new(), EntityHandle::new());
    }
}
