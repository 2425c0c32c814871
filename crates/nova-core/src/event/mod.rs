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

//! Event channels and the engine-wide event vocabulary.

mod bus;

pub use self::bus::EventBus;

use crate::platform::input::InputEvent;

/// Events published by the runtime and consumed by the frame loop.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// The window's drawable area changed size, in physical pixels.
    WindowResized {
        /// New width.
        width: u32,
        /// New height.
        height: u32,
    },
    /// A translated user input event.
    Input(InputEvent),
    /// A scene became the active scene.
    SceneActivated {
        /// Name of the scene.
        name: String,
    },
    /// Something asked the engine to stop.
    ShutdownRequested,
}
