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

use super::AssetError;
use nova_core::renderer::{
    AddressMode, Extent3D, FilterMode, GraphicsDevice, MipmapFilterMode, Origin3D, ResourceError,
    SampleCount, SamplerCache, SamplerDescriptor, SamplerId, TextureDescriptor, TextureDimension,
    TextureFormat, TextureId, TextureUsage, TextureViewDescriptor, TextureViewId,
};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

/// Sampling of a loaded texture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureParams {
    /// Minification and magnification filter.
    pub filter: FilterMode,
    /// Addressing on every axis.
    pub address_mode: AddressMode,
}

impl Default for TextureParams {
    fn default() -> Self {
        Self {
            filter: FilterMode::Nearest,
            address_mode: AddressMode::Repeat,
        }
    }
}

impl TextureParams {
    fn sampler_descriptor(&self) -> SamplerDescriptor<'static> {
        let mipmap_filter = match self.filter {
            FilterMode::Nearest => MipmapFilterMode::Nearest,
            FilterMode::Linear => MipmapFilterMode::Linear,
        };
        SamplerDescriptor {
            address_mode_u: self.address_mode,
            address_mode_v: self.address_mode,
            address_mode_w: self.address_mode,
            mag_filter: self.filter,
            min_filter: self.filter,
            mipmap_filter,
            ..Default::default()
        }
    }
}

/// A decoded image living on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadedTexture {
    pub texture: TextureId,
    pub view: TextureViewId,
    /// Shared with every texture loaded with the same parameters.
    pub sampler: SamplerId,
    pub width: u32,
    pub height: u32,
}

/// 2D RGBA textures looked up by name.
///
/// Pixels are uploaded as `Rgba8UnormSrgb`. Samplers are shared through a
/// [`SamplerCache`] and live until [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct TextureLibrary {
    textures: HashMap<String, LoadedTexture>,
    samplers: SamplerCache,
}

impl TextureLibrary {
    /// An empty library.
    pub fn new() -> Self {
        Self::default()
    }

    /// Uploads tightly packed RGBA8 pixels.
    ///
    /// ## Errors
    /// * `ResourceError::InvalidDescriptor` - empty size, or `pixels` is not
    ///   `width * height * 4` bytes long.
    pub fn load_rgba8(
        &mut self,
        device: &dyn GraphicsDevice,
        name: &str,
        width: u32,
        height: u32,
        pixels: &[u8],
        params: TextureParams,
    ) -> Result<LoadedTexture, AssetError> {
        let expected = width as u64 * height as u64 * 4;
        if width == 0 || height == 0 || pixels.len() as u64 != expected {
            return Err(ResourceError::InvalidDescriptor(format!(
                "texture '{name}' is {width}x{height} but holds {} bytes, expected {expected}",
                pixels.len()
            ))
            .into());
        }

        let size = Extent3D::new_2d(width, height);
        let texture = device.create_texture(&TextureDescriptor {
            label: Some(Cow::Borrowed(name)),
            size,
            mip_level_count: 1,
            sample_count: SampleCount::X1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba8UnormSrgb,
            usage: TextureUsage::COPY_DST | TextureUsage::TEXTURE_BINDING,
        })?;

        let loaded = self
            .upload(device, texture, pixels, size, params)
            .map(|(view, sampler)| LoadedTexture {
                texture,
                view,
                sampler,
                width,
                height,
            });
        let loaded = match loaded {
            Ok(loaded) => loaded,
            Err(e) => {
                let _ = device.destroy_texture(texture);
                return Err(e.into());
            }
        };

        if let Some(old) = self.textures.insert(name.to_owned(), loaded) {
            log::debug!("TextureLibrary: replacing '{name}'");
            release(device, name, old);
        }
        log::debug!("TextureLibrary: loaded '{name}' ({width}x{height})");
        Ok(loaded)
    }

    /// Decodes an encoded image (PNG, JPEG, ...) and uploads it.
    pub fn load_from_memory(
        &mut self,
        device: &dyn GraphicsDevice,
        name: &str,
        bytes: &[u8],
        params: TextureParams,
    ) -> Result<LoadedTexture, AssetError> {
        let image = image::load_from_memory(bytes).map_err(|e| AssetError::Decode {
            name: name.to_owned(),
            details: e.to_string(),
        })?;
        let rgba = image.to_rgba8();
        let (width, height) = rgba.dimensions();
        self.load_rgba8(device, name, width, height, rgba.as_raw(), params)
    }

    /// Reads and decodes an image file.
    pub fn load_file(
        &mut self,
        device: &dyn GraphicsDevice,
        name: &str,
        path: impl AsRef<Path>,
        params: TextureParams,
    ) -> Result<LoadedTexture, AssetError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load_from_memory(device, name, &bytes, params)
    }

    /// The texture stored under `name`.
    pub fn get(&self, name: &str) -> Option<LoadedTexture> {
        let found = self.textures.get(name).copied();
        if found.is_none() {
            log::warn!("TextureLibrary: no texture named '{name}'");
        }
        found
    }

    /// `true` when a texture is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.textures.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    /// Destroys the texture and view stored under `name`. The sampler stays cached.
    pub fn remove(&mut self, device: &dyn GraphicsDevice, name: &str) -> bool {
        match self.textures.remove(name) {
            Some(loaded) => {
                release(device, name, loaded);
                true
            }
            None => false,
        }
    }

    /// Destroys every texture, view and sampler.
    pub fn clear(&mut self, device: &dyn GraphicsDevice) {
        for (name, loaded) in self.textures.drain() {
            release(device, &name, loaded);
        }
        self.samplers.clear(device);
    }

    fn upload(
        &mut self,
        device: &dyn GraphicsDevice,
        texture: TextureId,
        pixels: &[u8],
        size: Extent3D,
        params: TextureParams,
    ) -> Result<(TextureViewId, SamplerId), ResourceError> {
        device.write_texture(texture, pixels, None, Origin3D::default(), size)?;
        let view = device.create_texture_view(texture, &TextureViewDescriptor::default())?;
        match self
            .samplers
            .get_or_create(device, &params.sampler_descriptor())
        {
            Ok(sampler) => Ok((view, sampler)),
            Err(e) => {
                let _ = device.destroy_texture_view(view);
                Err(e)
            }
        }
    }
}

fn release(device: &dyn GraphicsDevice, name: &str, loaded: LoadedTexture) {
    if let Err(e) = device.destroy_texture_view(loaded.view) {
        log::warn!("TextureLibrary: failed to destroy view of '{name}': {e}");
    }
    if let Err(e) = device.destroy_texture(loaded.texture) {
        log::warn!("TextureLibrary: failed to destroy '{name}': {e}");
    }
}
