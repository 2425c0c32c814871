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

//! Deduplication of sampler objects.

use crate::renderer::api::{
    AddressMode, CompareFunction, FilterMode, MipmapFilterMode, SamplerDescriptor, SamplerId,
};
use crate::renderer::error::ResourceError;
use crate::renderer::GraphicsDevice;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SamplerKey {
    address_modes: [AddressMode; 3],
    mag_filter: FilterMode,
    min_filter: FilterMode,
    mipmap_filter: MipmapFilterMode,
    lod_min_bits: u32,
    lod_max_bits: u32,
    compare: Option<CompareFunction>,
    anisotropy_clamp: u16,
}

impl From<&SamplerDescriptor<'_>> for SamplerKey {
    fn from(desc: &SamplerDescriptor<'_>) -> Self {
        Self {
            address_modes: [
                desc.address_mode_u,
                desc.address_mode_v,
                desc.address_mode_w,
            ],
            mag_filter: desc.mag_filter,
            min_filter: desc.min_filter,
            mipmap_filter: desc.mipmap_filter,
            lod_min_bits: desc.lod_min_clamp.to_bits(),
            lod_max_bits: desc.lod_max_clamp.to_bits(),
            compare: desc.compare,
            anisotropy_clamp: desc.anisotropy_clamp,
        }
    }
}

/// Hands out one sampler per distinct descriptor.
///
/// Labels do not take part in the comparison; lod clamps compare by bit
/// pattern, so `0.0` and `-0.0` are distinct keys.
#[derive(Debug, Default)]
pub struct SamplerCache {
    samplers: HashMap<SamplerKey, SamplerId>,
}

impl SamplerCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached sampler for `descriptor`, creating it on first use.
    pub fn get_or_create(
        &mut self,
        device: &dyn GraphicsDevice,
        descriptor: &SamplerDescriptor,
    ) -> Result<SamplerId, ResourceError> {
        let key = SamplerKey::from(descriptor);
        if let Some(id) = self.samplers.get(&key) {
            return Ok(*id);
        }
        let id = device.create_sampler(descriptor)?;
        log::debug!(
            "SamplerCache: cached new sampler {:?} ('{}')",
            id,
            descriptor.label.as_deref().unwrap_or("unlabeled")
        );
        self.samplers.insert(key, id);
        Ok(id)
    }

    /// Number of cached samplers.
    pub fn len(&self) -> usize {
        self.samplers.len()
    }

    /// `true` when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.samplers.is_empty()
    }

    /// Destroys every cached sampler and empties the cache.
    pub fn clear(&mut self, device: &dyn GraphicsDevice) {
        for (_, id) in self.samplers.drain() {
            if let Err(e) = device.destroy_sampler(id) {
                log::warn!("SamplerCache: failed to destroy sampler {id:?}: {e}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::api::*;
    use crate::renderer::CommandEncoder;
    use std::borrow::Cow;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Debug, Default)]
    struct CountingDevice {
        next: AtomicUsize,
        destroyed: Mutex<Vec<SamplerId>>,
    }

    impl GraphicsDevice for CountingDevice {
        fn create_shader_module(
            &self,
            _: &ShaderModuleDescriptor,
        ) -> Result<ShaderModuleId, ResourceError> {
            unimplemented!()
        }
        fn destroy_shader_module(&self, _: ShaderModuleId) -> Result<(), ResourceError> {
            unimplemented!()
        }
        fn create_render_pipeline(
            &self,
            _: &RenderPipelineDescriptor,
        ) -> Result<RenderPipelineId, ResourceError> {
            unimplemented!()
        }
        fn destroy_render_pipeline(&self, _: RenderPipelineId) -> Result<(), ResourceError> {
            unimplemented!()
        }
        fn create_buffer(&self, _: &BufferDescriptor) -> Result<BufferId, ResourceError> {
            unimplemented!()
        }
        fn create_buffer_with_data(
            &self,
            _: &BufferDescriptor,
            _: &[u8],
        ) -> Result<BufferId, ResourceError> {
            unimplemented!()
        }
        fn destroy_buffer(&self, _: BufferId) -> Result<(), ResourceError> {
            unimplemented!()
        }
        fn write_buffer(&self, _: BufferId, _: u64, _: &[u8]) -> Result<(), ResourceError> {
            unimplemented!()
        }
        fn buffer_size(&self, _: BufferId) -> Result<u64, ResourceError> {
            unimplemented!()
        }
        fn create_texture(&self, _: &TextureDescriptor) -> Result<TextureId, ResourceError> {
            unimplemented!()
        }
        fn destroy_texture(&self, _: TextureId) -> Result<(), ResourceError> {
            unimplemented!()
        }
        fn write_texture(
            &self,
            _: TextureId,
            _: &[u8],
            _: Option<u32>,
            _: Origin3D,
            _: Extent3D,
        ) -> Result<(), ResourceError> {
            unimplemented!()
        }
        fn create_texture_view(
            &self,
            _: TextureId,
            _: &TextureViewDescriptor,
        ) -> Result<TextureViewId, ResourceError> {
            unimplemented!()
        }
        fn destroy_texture_view(&self, _: TextureViewId) -> Result<(), ResourceError> {
            unimplemented!()
        }
        fn create_sampler(&self, _: &SamplerDescriptor) -> Result<SamplerId, ResourceError> {
            Ok(SamplerId(self.next.fetch_add(1, Ordering::Relaxed)))
        }
        fn destroy_sampler(&self, id: SamplerId) -> Result<(), ResourceError> {
            self.destroyed.lock().unwrap().push(id);
            Ok(())
        }
        fn create_command_encoder(&self, _: Option<&str>) -> Box<dyn CommandEncoder> {
            unimplemented!()
        }
        fn submit_command_buffer(&self, _: CommandBufferId) -> Result<(), ResourceError> {
            unimplemented!()
        }
        fn surface_format(&self) -> Option<TextureFormat> {
            None
        }
        fn adapter_info(&self) -> RendererAdapterInfo {
            RendererAdapterInfo::default()
        }
        fn supports_feature(&self, _: &str) -> bool {
            false
        }
        fn device_type(&self) -> GraphicsDeviceType {
            GraphicsDeviceType::Null
        }
        fn allocated_bytes(&self) -> u64 {
            0
        }
    }

    #[test]
    fn test_equal_descriptors_share_a_sampler() {
        let device = CountingDevice::default();
        let mut cache = SamplerCache::new();

        let a = cache
            .get_or_create(&device, &SamplerDescriptor::linear_repeat())
            .unwrap();
        let mut relabeled = SamplerDescriptor::linear_repeat();
        relabeled.label = Some(Cow::Borrowed("another name"));
        let b = cache.get_or_create(&device, &relabeled).unwrap();
        let c = cache
            .get_or_create(&device, &SamplerDescriptor::default())
            .unwrap();

        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(cache.len(), 2);
        assert_eq!(device.next.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_float_fields_compare_by_bits() {
        let device = CountingDevice::default();
        let mut cache = SamplerCache::new();
        let pos = SamplerDescriptor::default();
        let neg = SamplerDescriptor {
            lod_min_clamp: -0.0,
            ..Default::default()
        };
        let a = cache.get_or_create(&device, &pos).unwrap();
        let b = cache.get_or_create(&device, &neg).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_clear_destroys_everything() {
        let device = CountingDevice::default();
        let mut cache = SamplerCache::new();
        cache
            .get_or_create(&device, &SamplerDescriptor::default())
            .unwrap();
        cache
            .get_or_create(&device, &SamplerDescriptor::linear_repeat())
            .unwrap();
        cache.clear(&device);
        assert!(cache.is_empty());
        assert_eq!(device.destroyed.lock().unwrap().len(), 2);
    }
}
