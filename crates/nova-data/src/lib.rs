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

//! The component-owner runtime.
//!
//! A [`Scene`] owns [`Entity`] values keyed by [`EntityHandle`]. Each entity
//! owns a [`Transform`](components::Transform) and an ordered list of boxed
//! [`Component`]s whose lifecycle hooks the scene drives every frame. The
//! [`SceneManager`] swaps scenes between frames.

#![warn(missing_docs)]

pub mod component;
pub mod components;
pub mod definition;
pub mod entity;
pub mod error;
pub mod handle;
pub mod manager;
pub mod scene;
pub mod tween;

pub use component::{AsAny, Component, ComponentContext, ComponentFlags};
pub use definition::{EntityDefinition, SceneDefinition, TransformDefinition};
pub use entity::{Entity, EntityHideFlags};
pub use error::SceneError;
pub use handle::EntityHandle;
pub use manager::SceneManager;
pub use scene::Scene;
pub use tween::{Tween, TweenEase, TweenId, TweenManager, TweenTarget, Tweenable, ValueTween};
