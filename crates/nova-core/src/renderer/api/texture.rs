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

//! Texture, texture view and sampler descriptors.

use crate::nova_bitflags;
use crate::renderer::api::format::{Extent3D, SampleCount, TextureFormat};
use crate::renderer::api::pipeline::CompareFunction;
use std::borrow::Cow;

/// Dimensionality of a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextureDimension {
    /// 1D texture.
    D1,
    /// 2D texture (or 2D array).
    #[default]
    D2,
    /// 3D volume texture.
    D3,
}

/// How a view interprets its texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureViewDimension {
    /// 1D view.
    D1,
    /// 2D view.
    D2,
    /// 2D array view.
    D2Array,
    /// Cube map view.
    Cube,
    /// 3D view.
    D3,
}

/// Which aspects of a texture a view exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageAspect {
    /// Every aspect.
    #[default]
    All,
    /// Stencil only.
    StencilOnly,
    /// Depth only.
    DepthOnly,
}

/// Behaviour of texture coordinates outside `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Clamp to the edge texel.
    #[default]
    ClampToEdge,
    /// Tile.
    Repeat,
    /// Tile, mirroring every other repeat.
    MirrorRepeat,
}

/// Texel filtering for magnification and minification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest texel.
    #[default]
    Nearest,
    /// Bilinear.
    Linear,
}

/// Filtering between mip levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MipmapFilterMode {
    /// Nearest mip.
    #[default]
    Nearest,
    /// Blend the two closest mips.
    Linear,
}

nova_bitflags! {
    /// How a texture may be used once created.
    pub struct TextureUsage: u32 {
        /// Source of a copy.
        const COPY_SRC = 1 << 0;
        /// Destination of a copy or a queue write.
        const COPY_DST = 1 << 1;
        /// Sampled from shaders.
        const TEXTURE_BINDING = 1 << 2;
        /// Written from shaders.
        const STORAGE_BINDING = 1 << 3;
        /// Color or depth attachment of a render pass.
        const RENDER_ATTACHMENT = 1 << 4;
    }
}

/// Parameters for creating a texture.
#[derive(Debug, Clone)]
pub struct TextureDescriptor<'a> {
    /// Debug label.
    pub label: Option<Cow<'a, str>>,
    /// Size in texels.
    pub size: Extent3D,
    /// Number of mip levels, at least 1.
    pub mip_level_count: u32,
    /// Samples per texel.
    pub sample_count: SampleCount,
    /// Dimensionality.
    pub dimension: TextureDimension,
    /// Texel format.
    pub format: TextureFormat,
    /// Allowed usages.
    pub usage: TextureUsage,
}

impl TextureDescriptor<'_> {
    /// Size in bytes of the base mip level.
    pub fn base_level_bytes(&self) -> u64 {
        self.size.width as u64
            * self.size.height as u64
            * self.size.depth_or_array_layers as u64
            * self.format.bytes_per_pixel() as u64
    }
}

/// Parameters for creating a texture view. `None` fields inherit from the texture.
#[derive(Debug, Clone, Default)]
pub struct TextureViewDescriptor<'a> {
    /// Debug label.
    pub label: Option<Cow<'a, str>>,
    /// Reinterpreted format.
    pub format: Option<TextureFormat>,
    /// View dimension.
    pub dimension: Option<TextureViewDimension>,
    /// Exposed aspect.
    pub aspect: ImageAspect,
    /// First visible mip.
    pub base_mip_level: u32,
    /// Number of visible mips.
    pub mip_level_count: Option<u32>,
    /// First visible layer.
    pub base_array_layer: u32,
    /// Number of visible layers.
    pub array_layer_count: Option<u32>,
}

/// Parameters for creating a sampler.
#[derive(Debug, Clone)]
pub struct SamplerDescriptor<'a> {
    /// Debug label. Not part of the sampler's identity.
    pub label: Option<Cow<'a, str>>,
    /// U addressing.
    pub address_mode_u: AddressMode,
    /// V addressing.
    pub address_mode_v: AddressMode,
    /// W addressing.
    pub address_mode_w: AddressMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Mip filter.
    pub mipmap_filter: MipmapFilterMode,
    /// Lowest mip level used.
    pub lod_min_clamp: f32,
    /// Highest mip level used.
    pub lod_max_clamp: f32,
    /// Comparison function, turning this into a comparison sampler.
    pub compare: Option<CompareFunction>,
    /// Maximum anisotropy, 1 disables it.
    pub anisotropy_clamp: u16,
}

impl Default for SamplerDescriptor<'_> {
    fn default() -> Self {
        Self {
            label: None,
            address_mode_u: AddressMode::ClampToEdge,
            address_mode_v: AddressMode::ClampToEdge,
            address_mode_w: AddressMode::ClampToEdge,
            mag_filter: FilterMode::Nearest,
            min_filter: FilterMode::Nearest,
            mipmap_filter: MipmapFilterMode::Nearest,
            lod_min_clamp: 0.0,
            lod_max_clamp: 32.0,
            compare: None,
            anisotropy_clamp: 1,
        }
    }
}

impl SamplerDescriptor<'_> {
    /// Trilinear, repeating sampler.
    pub fn linear_repeat() -> Self {
        Self {
            label: Some(Cow::Borrowed("Linear Repeat Sampler")),
            address_mode_u: AddressMode::Repeat,
            address_mode_v: AddressMode::Repeat,
            address_mode_w: AddressMode::Repeat,
            mag_filter: FilterMode::Linear,
            min_filter: FilterMode::Linear,
            mipmap_filter: MipmapFilterMode::Linear,
            ..Default::default()
        }
    }
}

/// An opaque handle to a texture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureId(pub usize);

/// An opaque handle to a texture view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureViewId(pub usize);

/// An opaque handle to a sampler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SamplerId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_level_bytes_accounts_for_format() {
        let desc = TextureDescriptor {
            label: None,
            size: Extent3D::new_2d(4, 2),
            mip_level_count: 1,
            sample_count: SampleCount::X1,
            dimension: TextureDimension::D2,
            format: TextureFormat::Rgba16Float,
            usage: TextureUsage::TEXTURE_BINDING | TextureUsage::COPY_DST,
        };
        assert_eq!(desc.base_level_bytes(), 4 * 2 * 8);
    }

    #[test]
    fn test_default_sampler_is_nearest_clamped() {
        let s = SamplerDescriptor::default();
        assert_eq!(s.mag_filter, FilterMode::Nearest);
        assert_eq!(s.address_mode_u, AddressMode::ClampToEdge);
        assert_eq!(s.anisotropy_clamp, 1);
        assert!(s.compare.is_none());
    }
}
