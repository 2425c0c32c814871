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

//! Name-keyed libraries of GPU resources.
//!
//! [`ShaderLibrary`] compiles WGSL modules from memory or disk and can
//! recompile the disk-backed ones in place. [`TextureLibrary`] decodes images
//! into sampled 2D textures. Both own what they create and release it through
//! the device they are handed on `remove` and `clear`.

mod error;
mod shaders;
mod textures;

pub use self::error::AssetError;
pub use self::shaders::ShaderLibrary;
pub use self::textures::{LoadedTexture, TextureLibrary, TextureParams};
