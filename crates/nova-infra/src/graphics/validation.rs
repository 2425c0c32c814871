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

//! Descriptor checks shared by every [`GraphicsDevice`](nova_core::renderer::GraphicsDevice)
//! implementation, so the Null backend rejects exactly what wgpu rejects.

use nova_core::renderer::{
    BufferDescriptor, PipelineError, RenderPipelineDescriptor, ResourceError, ShaderError,
    ShaderModuleDescriptor, ShaderModuleId, ShaderSourceData, TextureDescriptor,
};
use wgpu::naga;

/// Entry point declared by a parsed shader module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ShaderEntryPoint {
    pub(crate) name: String,
    pub(crate) stage: naga::ShaderStage,
}

/// `offset + len` must fit in a resource of `size` bytes.
pub(crate) fn check_write_range(size: u64, offset: u64, len: usize) -> Result<(), ResourceError> {
    match offset.checked_add(len as u64) {
        Some(end) if end <= size => Ok(()),
        _ => Err(ResourceError::OutOfBounds),
    }
}

pub(crate) fn check_buffer_descriptor(descriptor: &BufferDescriptor) -> Result<(), ResourceError> {
    if descriptor.size == 0 {
        return Err(ResourceError::InvalidDescriptor(format!(
            "buffer '{}' has zero size",
            descriptor.label.as_deref().unwrap_or("unnamed")
        )));
    }
    if descriptor.usage.is_empty() {
        return Err(ResourceError::InvalidDescriptor(format!(
            "buffer '{}' has no usage flags",
            descriptor.label.as_deref().unwrap_or("unnamed")
        )));
    }
    Ok(())
}

pub(crate) fn check_texture_descriptor(
    descriptor: &TextureDescriptor,
) -> Result<(), ResourceError> {
    let size = descriptor.size;
    if size.width == 0 || size.height == 0 || size.depth_or_array_layers == 0 {
        return Err(ResourceError::InvalidDescriptor(format!(
            "texture '{}' has an empty extent {}x{}x{}",
            descriptor.label.as_deref().unwrap_or("unnamed"),
            size.width,
            size.height,
            size.depth_or_array_layers
        )));
    }
    if descriptor.mip_level_count == 0 {
        return Err(ResourceError::InvalidDescriptor(
            "mip_level_count must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Parses the source and lists its entry points.
pub(crate) fn parse_shader_source(
    descriptor: &ShaderModuleDescriptor,
) -> Result<Vec<ShaderEntryPoint>, ResourceError> {
    let label = descriptor.label.unwrap_or("unnamed");
    if descriptor.source.is_empty() {
        return Err(ShaderError::CompilationError {
            label: label.to_string(),
            details: "empty shader source".to_string(),
        }
        .into());
    }
    let module = match &descriptor.source {
        ShaderSourceData::Wgsl(src) => naga::front::wgsl::parse_str(src).map_err(|e| {
            ShaderError::CompilationError {
                label: label.to_string(),
                details: e.emit_to_string(src),
            }
        })?,
    };
    Ok(module
        .entry_points
        .into_iter()
        .map(|ep| ShaderEntryPoint {
            name: ep.name,
            stage: ep.stage,
        })
        .collect())
}

fn check_entry_point(
    entry_points: &[ShaderEntryPoint],
    id: ShaderModuleId,
    name: &str,
    stage: naga::ShaderStage,
) -> Result<(), ResourceError> {
    if entry_points
        .iter()
        .any(|ep| ep.name == name && ep.stage == stage)
    {
        Ok(())
    } else {
        Err(ShaderError::InvalidEntryPoint {
            id,
            entry_point: name.to_string(),
        }
        .into())
    }
}

/// Checks that both stages reference known modules declaring the requested
/// entry points for the right stage.
pub(crate) fn check_pipeline_stages<'s>(
    descriptor: &RenderPipelineDescriptor,
    entry_points_of: impl Fn(ShaderModuleId) -> Option<&'s [ShaderEntryPoint]>,
) -> Result<(), ResourceError> {
    let pipeline_label = descriptor.label.as_deref().map(String::from);

    let vertex_entry_points = entry_points_of(descriptor.vertex_shader_module).ok_or_else(|| {
        PipelineError::InvalidShaderModuleForPipeline {
            id: descriptor.vertex_shader_module,
            pipeline_label: pipeline_label.clone(),
        }
    })?;
    check_entry_point(
        vertex_entry_points,
        descriptor.vertex_shader_module,
        &descriptor.vertex_entry_point,
        naga::ShaderStage::Vertex,
    )?;

    if let Some(fragment_id) = descriptor.fragment_shader_module {
        let fragment_entry_points =
            entry_points_of(fragment_id).ok_or_else(|| PipelineError::InvalidShaderModuleForPipeline {
                id: fragment_id,
                pipeline_label: pipeline_label.clone(),
            })?;
        let entry_point = descriptor.fragment_entry_point.as_deref().ok_or_else(|| {
            PipelineError::MissingEntryPointForFragmentShader {
                pipeline_label: pipeline_label.clone(),
                shader_id: fragment_id,
            }
        })?;
        check_entry_point(
            fragment_entry_points,
            fragment_id,
            entry_point,
            naga::ShaderStage::Fragment,
        )?;
    }

    if descriptor.color_target_states.is_empty() && descriptor.fragment_shader_module.is_some() {
        return Err(ResourceError::InvalidDescriptor(format!(
            "pipeline '{}' has a fragment stage but no color targets",
            pipeline_label.as_deref().unwrap_or("unnamed")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::borrow::Cow;

    fn parse(src: &str) -> Result<Vec<ShaderEntryPoint>, ResourceError> {
        parse_shader_source(&ShaderModuleDescriptor {
            label: Some("test"),
            source: ShaderSourceData::Wgsl(Cow::Borrowed(src)),
        })
    }

    fn names(entry_points: &[ShaderEntryPoint]) -> Vec<&str> {
        entry_points.iter().map(|ep| ep.name.as_str()).collect()
    }

    #[test]
    fn test_entry_points_with_any_whitespace_after_fn() {
        let src = "@vertex\nfn\tvs_main() -> @builtin(position) vec4<f32> {\n    return vec4<f32>(0.0);\n}\n\
                   @fragment fn\n  fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }\n";
        let entry_points = parse(src).unwrap();
        assert_eq!(names(&entry_points), ["vs_main", "fs_main"]);
        check_entry_point(&entry_points, ShaderModuleId(1), "vs_main", naga::ShaderStage::Vertex)
            .unwrap();
        check_entry_point(&entry_points, ShaderModuleId(1), "fs_main", naga::ShaderStage::Fragment)
            .unwrap();
    }

    #[test]
    fn test_commented_out_function_is_not_an_entry_point() {
        let src = "// fn ghost() {}\n/* @vertex fn phantom() {} */\n\
                   @fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }\n";
        let entry_points = parse(src).unwrap();
        assert_eq!(names(&entry_points), ["fs_main"]);
        for name in ["ghost", "phantom"] {
            assert_eq!(
                check_entry_point(&entry_points, ShaderModuleId(2), name, naga::ShaderStage::Fragment),
                Err(ShaderError::InvalidEntryPoint {
                    id: ShaderModuleId(2),
                    entry_point: name.to_string(),
                }
                .into())
            );
        }
    }

    #[test]
    fn test_entry_point_stage_must_match() {
        let src = "@fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(1.0); }\n";
        let entry_points = parse(src).unwrap();
        assert!(
            check_entry_point(&entry_points, ShaderModuleId(3), "fs_main", naga::ShaderStage::Vertex)
                .is_err()
        );
    }

    #[test]
    fn test_helper_functions_are_not_entry_points() {
        let src = "fn helper() -> f32 { return 1.0; }\n\
                   @fragment fn fs_main() -> @location(0) vec4<f32> { return vec4<f32>(helper()); }\n";
        let entry_points = parse(src).unwrap();
        assert_eq!(names(&entry_points), ["fs_main"]);
    }

    #[test]
    fn test_invalid_wgsl_is_a_compilation_error() {
        assert!(matches!(
            parse("@vertex fn broken( {"),
            Err(ResourceError::Shader(ShaderError::CompilationError { .. }))
        ));
        assert!(matches!(
            parse("   \n"),
            Err(ResourceError::Shader(ShaderError::CompilationError { .. }))
        ));
    }

    #[test]
    fn test_write_range_edges() {
        assert!(check_write_range(16, 0, 16).is_ok());
        assert!(check_write_range(16, 8, 8).is_ok());
        assert_eq!(check_write_range(16, 8, 9), Err(ResourceError::OutOfBounds));
        assert_eq!(
            check_write_range(16, u64::MAX, 1),
            Err(ResourceError::OutOfBounds)
        );
    }
}
