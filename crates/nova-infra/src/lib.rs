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

//! Concrete backends for the contracts defined in `nova-core`.
//!
//! - [`graphics::wgpu`] renders through `wgpu` to a window surface.
//! - [`graphics::null`] keeps books without a GPU; tests and the headless
//!   engine run on it.
//! - [`resources`] keeps name-keyed shader and texture libraries.
//! - [`platform`] wraps `winit` windows and translates their input events.

#[cfg(feature = "graphics")]
pub mod graphics;
#[cfg(feature = "platform")]
pub mod platform;
pub mod resources;

#[cfg(feature = "graphics")]
pub use graphics::{NullDevice, NullRenderSystem, WgpuDevice, WgpuRenderSystem};
pub use resources::{AssetError, LoadedTexture, ShaderLibrary, TextureLibrary, TextureParams};
#[cfg(feature = "platform")]
pub use platform::{translate_winit_input, WinitWindow, WinitWindowBuilder};
