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

//! Render pipeline state.

use crate::nova_bitflags;
use crate::renderer::api::format::{IndexFormat, SampleCount, TextureFormat};
use crate::renderer::api::shader::ShaderModuleId;
use std::borrow::Cow;

/// Size in bytes of one per-object transform in the instance stream.
pub const TRANSFORM_INSTANCE_STRIDE: u64 = 64;

/// Format of a single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VertexFormat {
    /// Four u8, normalized to `[0, 1]`.
    Unorm8x4,
    /// One u32.
    Uint32,
    /// One f32.
    Float32,
    /// Two f32.
    Float32x2,
    /// Three f32.
    Float32x3,
    /// Four f32.
    Float32x4,
}

impl VertexFormat {
    /// Size in bytes.
    pub const fn size(self) -> u64 {
        match self {
            VertexFormat::Unorm8x4 | VertexFormat::Uint32 | VertexFormat::Float32 => 4,
            VertexFormat::Float32x2 => 8,
            VertexFormat::Float32x3 => 12,
            VertexFormat::Float32x4 => 16,
        }
    }
}

/// Whether a vertex buffer advances per vertex or per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VertexStepMode {
    /// Per vertex.
    #[default]
    Vertex,
    /// Per instance.
    Instance,
}

/// How vertices are assembled into primitives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PrimitiveTopology {
    /// Points.
    PointList,
    /// Separate lines.
    LineList,
    /// Connected lines.
    LineStrip,
    /// Separate triangles.
    #[default]
    TriangleList,
    /// Connected triangles.
    TriangleStrip,
}

/// Which faces are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CullMode {
    /// Front faces.
    Front,
    /// Back faces.
    Back,
}

/// Winding order of front-facing triangles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FrontFace {
    /// Counter-clockwise.
    #[default]
    Ccw,
    /// Clockwise.
    Cw,
}

/// Rasterization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum PolygonMode {
    /// Filled triangles.
    #[default]
    Fill,
    /// Wireframe.
    Line,
    /// Vertices only.
    Point,
}

/// Comparison used for depth tests and comparison samplers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompareFunction {
    /// Never passes.
    Never,
    /// `new < old`.
    Less,
    /// `new == old`.
    Equal,
    /// `new <= old`.
    LessEqual,
    /// `new > old`.
    Greater,
    /// `new != old`.
    NotEqual,
    /// `new >= old`.
    GreaterEqual,
    /// Always passes.
    #[default]
    Always,
}

/// Blend factor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendFactor {
    /// 0.
    Zero,
    /// 1.
    One,
    /// Source alpha.
    SrcAlpha,
    /// 1 - source alpha.
    OneMinusSrcAlpha,
}

/// Blend equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlendOperation {
    /// `src + dst`.
    Add,
    /// `src - dst`.
    Subtract,
    /// `dst - src`.
    ReverseSubtract,
    /// `min(src, dst)`.
    Min,
    /// `max(src, dst)`.
    Max,
}

/// One half (color or alpha) of a blend state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendComponent {
    /// Source factor.
    pub src_factor: BlendFactor,
    /// Destination factor.
    pub dst_factor: BlendFactor,
    /// Equation.
    pub operation: BlendOperation,
}

/// Color and alpha blending for a color target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlendState {
    /// Color channels.
    pub color: BlendComponent,
    /// Alpha channel.
    pub alpha: BlendComponent,
}

impl BlendState {
    /// Standard premultiplied-free alpha blending.
    pub const ALPHA_BLENDING: Self = Self {
        color: BlendComponent {
            src_factor: BlendFactor::SrcAlpha,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        },
        alpha: BlendComponent {
            src_factor: BlendFactor::One,
            dst_factor: BlendFactor::OneMinusSrcAlpha,
            operation: BlendOperation::Add,
        },
    };
}

nova_bitflags! {
    /// Color channels a target writes.
    pub struct ColorWrites: u8 {
        /// Red.
        const R = 0b0001;
        /// Green.
        const G = 0b0010;
        /// Blue.
        const B = 0b0100;
        /// Alpha.
        const A = 0b1000;
    }
}

impl ColorWrites {
    /// Every channel.
    pub const ALL: Self = Self::from_bits_truncate(0b1111);
}

/// A single vertex attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexAttributeDescriptor {
    /// `@location` in the shader.
    pub shader_location: u32,
    /// Format.
    pub format: VertexFormat,
    /// Byte offset inside one element.
    pub offset: u64,
}

/// Layout of one bound vertex buffer.
#[derive(Debug, Clone)]
pub struct VertexBufferLayoutDescriptor<'a> {
    /// Bytes between consecutive elements.
    pub array_stride: u64,
    /// Per-vertex or per-instance.
    pub step_mode: VertexStepMode,
    /// Attributes read from each element.
    pub attributes: Cow<'a, [VertexAttributeDescriptor]>,
}

/// Layout of the per-object transform stream bound by the render systems.
///
/// Each element is a column-major `Mat4` split into four `vec4<f32>`
/// attributes at `base_location..base_location + 4`; the shader rebuilds the
/// matrix from them. The stream advances per instance.
pub fn transform_instance_layout(base_location: u32) -> VertexBufferLayoutDescriptor<'static> {
    let attributes = (0..4)
        .map(|column| VertexAttributeDescriptor {
            shader_location: base_location + column,
            format: VertexFormat::Float32x4,
            offset: column as u64 * VertexFormat::Float32x4.size(),
        })
        .collect::<Vec<_>>();
    VertexBufferLayoutDescriptor {
        array_stride: TRANSFORM_INSTANCE_STRIDE,
        step_mode: VertexStepMode::Instance,
        attributes: Cow::Owned(attributes),
    }
}

/// Primitive assembly and rasterization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PrimitiveStateDescriptor {
    /// Topology.
    pub topology: PrimitiveTopology,
    /// Index format for strip topologies.
    pub strip_index_format: Option<IndexFormat>,
    /// Front face winding.
    pub front_face: FrontFace,
    /// Face culling.
    pub cull_mode: Option<CullMode>,
    /// Fill mode.
    pub polygon_mode: PolygonMode,
}

impl Default for PrimitiveStateDescriptor {
    fn default() -> Self {
        Self {
            topology: PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: FrontFace::Ccw,
            cull_mode: Some(CullMode::Back),
            polygon_mode: PolygonMode::Fill,
        }
    }
}

/// Depth testing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilStateDescriptor {
    /// Depth attachment format.
    pub format: TextureFormat,
    /// Write depth on pass.
    pub depth_write_enabled: bool,
    /// Depth test.
    pub depth_compare: CompareFunction,
}

impl DepthStencilStateDescriptor {
    /// Standard `Less` depth test writing depth, for the given format.
    pub const fn less(format: TextureFormat) -> Self {
        Self {
            format,
            depth_write_enabled: true,
            depth_compare: CompareFunction::Less,
        }
    }
}

/// One color output of a pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColorTargetStateDescriptor {
    /// Target format.
    pub format: TextureFormat,
    /// Blending, `None` replaces.
    pub blend: Option<BlendState>,
    /// Written channels.
    pub write_mask: ColorWrites,
}

/// Multisampling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MultisampleStateDescriptor {
    /// Sample count.
    pub count: SampleCount,
    /// Sample mask.
    pub mask: u64,
    /// Alpha-to-coverage.
    pub alpha_to_coverage_enabled: bool,
}

impl Default for MultisampleStateDescriptor {
    fn default() -> Self {
        Self {
            count: SampleCount::X1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        }
    }
}

/// Everything needed to build a render pipeline.
#[derive(Debug, Clone)]
pub struct RenderPipelineDescriptor<'a> {
    /// Debug label.
    pub label: Option<Cow<'a, str>>,
    /// Vertex stage module.
    pub vertex_shader_module: ShaderModuleId,
    /// Vertex stage entry point.
    pub vertex_entry_point: Cow<'a, str>,
    /// Fragment stage module, if any.
    pub fragment_shader_module: Option<ShaderModuleId>,
    /// Fragment stage entry point. Required when a fragment module is set.
    pub fragment_entry_point: Option<Cow<'a, str>>,
    /// Bound vertex buffers, slot `i` uses layout `i`.
    pub vertex_buffers_layout: Cow<'a, [VertexBufferLayoutDescriptor<'a>]>,
    /// Primitive state.
    pub primitive_state: PrimitiveStateDescriptor,
    /// Depth state.
    pub depth_stencil_state: Option<DepthStencilStateDescriptor>,
    /// Color outputs.
    pub color_target_states: Cow<'a, [ColorTargetStateDescriptor]>,
    /// Multisampling.
    pub multisample_state: MultisampleStateDescriptor,
}

/// An opaque handle to a render pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RenderPipelineId(pub usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_layout_covers_a_mat4() {
        let layout = transform_instance_layout(4);
        assert_eq!(layout.array_stride, 64);
        assert_eq!(layout.step_mode, VertexStepMode::Instance);
        let locations: Vec<u32> = layout.attributes.iter().map(|a| a.shader_location).collect();
        assert_eq!(locations, vec![4, 5, 6, 7]);
        let offsets: Vec<u64> = layout.attributes.iter().map(|a| a.offset).collect();
        assert_eq!(offsets, vec![0, 16, 32, 48]);
    }

    #[test]
    fn test_color_writes_all_contains_each_channel() {
        for c in [ColorWrites::R, ColorWrites::G, ColorWrites::B, ColorWrites::A] {
            assert!(ColorWrites::ALL.contains(c));
        }
    }
}
