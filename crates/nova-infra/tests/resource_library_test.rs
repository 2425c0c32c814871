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

//! Shader and texture libraries running against the headless device.

use std::io::Cursor;

use nova_core::renderer::{AddressMode, FilterMode, ResourceError, ShaderError};
use nova_infra::{AssetError, NullDevice, ShaderLibrary, TextureLibrary, TextureParams};
use tempfile::tempdir;

const RED_WGSL: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0);
}
"#;

const GREEN_WGSL: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(0.0, 1.0, 0.0, 1.0);
}
"#;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 128, 0, 255]));
    let mut bytes = Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .expect("encoding a PNG in memory");
    bytes.into_inner()
}

#[test]
fn test_shader_lookup_by_name() {
    let device = NullDevice::new();
    let mut shaders = ShaderLibrary::new();

    let id = shaders.load_wgsl(&device, "red", RED_WGSL).unwrap();

    assert_eq!(shaders.get("red"), Some(id));
    assert_eq!(shaders.get("missing"), None);
    assert!(shaders.contains("red"));
    assert_eq!(device.shader_label(id).as_deref(), Some("red"));
}

#[test]
fn test_shader_replacing_a_name_destroys_the_old_module() {
    let device = NullDevice::new();
    let mut shaders = ShaderLibrary::new();

    let first = shaders.load_wgsl(&device, "color", RED_WGSL).unwrap();
    let second = shaders.load_wgsl(&device, "color", GREEN_WGSL).unwrap();

    assert_ne!(first, second);
    assert_eq!(shaders.len(), 1);
    assert_eq!(device.live_shader_count(), 1);
    assert_eq!(shaders.get("color"), Some(second));
}

#[test]
fn test_invalid_shader_is_not_stored() {
    let device = NullDevice::new();
    let mut shaders = ShaderLibrary::new();

    let result = shaders.load_wgsl(&device, "broken", "fn (");

    assert!(matches!(
        result,
        Err(AssetError::Resource(ResourceError::Shader(
            ShaderError::CompilationError { .. }
        )))
    ));
    assert!(shaders.is_empty());
    assert_eq!(device.live_shader_count(), 0);
}

#[test]
fn test_missing_shader_file_reports_the_path() {
    let device = NullDevice::new();
    let mut shaders = ShaderLibrary::new();
    let dir = tempdir().unwrap();
    let path = dir.path().join("absent.wgsl");

    match shaders.load_file(&device, "absent", &path) {
        Err(AssetError::Io { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected an io error, got {other:?}"),
    }
}

#[test]
fn test_reload_all_picks_up_edited_files() {
    let device = NullDevice::new();
    let mut shaders = ShaderLibrary::new();
    let dir = tempdir().unwrap();
    let path = dir.path().join("tint.wgsl");
    std::fs::write(&path, RED_WGSL).unwrap();

    let before = shaders.load_file(&device, "tint", &path).unwrap();
    shaders.load_wgsl(&device, "inline", GREEN_WGSL).unwrap();
    std::fs::write(&path, GREEN_WGSL).unwrap();

    assert_eq!(shaders.reload_all(&device), 1);
    let after = shaders.get("tint").unwrap();
    assert_ne!(before, after);
    assert_eq!(device.live_shader_count(), 2);
}

#[test]
fn test_reload_all_keeps_the_module_when_the_file_breaks() {
    let device = NullDevice::new();
    let mut shaders = ShaderLibrary::new();
    let dir = tempdir().unwrap();
    let path = dir.path().join("tint.wgsl");
    std::fs::write(&path, RED_WGSL).unwrap();

    let before = shaders.load_file(&device, "tint", &path).unwrap();
    std::fs::write(&path, "@fragment fn broken(").unwrap();

    assert_eq!(shaders.reload_all(&device), 0);
    assert_eq!(shaders.get("tint"), Some(before));
}

#[test]
fn test_shader_clear_destroys_everything() {
    let device = NullDevice::new();
    let mut shaders = ShaderLibrary::new();
    shaders.load_wgsl(&device, "a", RED_WGSL).unwrap();
    shaders.load_wgsl(&device, "b", GREEN_WGSL).unwrap();
    assert_eq!(shaders.names(), vec!["a", "b"]);

    assert!(shaders.remove(&device, "a"));
    assert!(!shaders.remove(&device, "a"));
    shaders.clear(&device);

    assert!(shaders.is_empty());
    assert_eq!(device.live_shader_count(), 0);
}

#[test]
fn test_texture_from_png_uploads_every_texel() {
    let device = NullDevice::new();
    let mut textures = TextureLibrary::new();

    let loaded = textures
        .load_from_memory(&device, "checker", &png_bytes(4, 2), TextureParams::default())
        .unwrap();

    assert_eq!((loaded.width, loaded.height), (4, 2));
    let info = device.texture_info(loaded.texture).unwrap();
    assert_eq!(info.label.as_deref(), Some("checker"));
    assert_eq!(info.bytes_written, 4 * 2 * 4);
    assert_eq!(textures.get("checker"), Some(loaded));
}

#[test]
fn test_texture_file_is_decoded() {
    let device = NullDevice::new();
    let mut textures = TextureLibrary::new();
    let dir = tempdir().unwrap();
    let path = dir.path().join("sprite.png");
    std::fs::write(&path, png_bytes(3, 3)).unwrap();

    let loaded = textures
        .load_file(&device, "sprite", &path, TextureParams::default())
        .unwrap();

    assert_eq!((loaded.width, loaded.height), (3, 3));
}

#[test]
fn test_undecodable_bytes_are_rejected() {
    let device = NullDevice::new();
    let mut textures = TextureLibrary::new();

    let result = textures.load_from_memory(&device, "noise", b"not an image", TextureParams::default());

    assert!(matches!(result, Err(AssetError::Decode { .. })));
    assert_eq!(device.live_texture_count(), 0);
}

#[test]
fn test_rgba8_length_must_match_the_size() {
    let device = NullDevice::new();
    let mut textures = TextureLibrary::new();

    let result = textures.load_rgba8(&device, "short", 2, 2, &[0; 15], TextureParams::default());

    assert!(matches!(
        result,
        Err(AssetError::Resource(ResourceError::InvalidDescriptor(_)))
    ));
    assert_eq!(device.live_texture_count(), 0);
}

#[test]
fn test_textures_share_samplers_per_params() {
    let device = NullDevice::new();
    let mut textures = TextureLibrary::new();
    let pixels = [255u8; 4];
    let linear = TextureParams {
        filter: FilterMode::Linear,
        address_mode: AddressMode::ClampToEdge,
    };

    let a = textures
        .load_rgba8(&device, "a", 1, 1, &pixels, TextureParams::default())
        .unwrap();
    let b = textures
        .load_rgba8(&device, "b", 1, 1, &pixels, TextureParams::default())
        .unwrap();
    let c = textures.load_rgba8(&device, "c", 1, 1, &pixels, linear).unwrap();

    assert_eq!(a.sampler, b.sampler);
    assert_ne!(a.sampler, c.sampler);
    assert_eq!(device.live_sampler_count(), 2);
}

#[test]
fn test_texture_clear_releases_views_and_samplers() {
    let device = NullDevice::new();
    let mut textures = TextureLibrary::new();
    let pixels = [0u8; 16];
    textures
        .load_rgba8(&device, "a", 2, 2, &pixels, TextureParams::default())
        .unwrap();
    textures
        .load_rgba8(&device, "a", 2, 2, &pixels, TextureParams::default())
        .unwrap();
    assert_eq!(textures.len(), 1);
    assert_eq!(device.live_texture_count(), 1);

    textures.clear(&device);

    assert!(textures.is_empty());
    assert_eq!(device.live_texture_count(), 0);
    assert_eq!(device.live_texture_view_count(), 0);
    assert_eq!(device.live_sampler_count(), 0);
}
