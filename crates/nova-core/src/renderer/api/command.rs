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

//! Render pass descriptions and command buffer handles.

use crate::math::Color;
use crate::renderer::api::texture::TextureViewId;

/// Handle to a finished, not yet submitted, command buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommandBufferId(pub u64);

/// What to do with an attachment at the start of a pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadOp<V> {
    /// Keep previous contents.
    Load,
    /// Clear to a value.
    Clear(V),
}

/// What to do with an attachment at the end of a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreOp {
    /// Write results back.
    #[default]
    Store,
    /// Contents may be dropped.
    Discard,
}

/// Load and store behaviour of one attachment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Operations<V> {
    /// Load op.
    pub load: LoadOp<V>,
    /// Store op.
    pub store: StoreOp,
}

/// A color attachment.
#[derive(Debug, Clone, Copy)]
pub struct RenderPassColorAttachment<'a> {
    /// Target view.
    pub view: &'a TextureViewId,
    /// Multisample resolve target.
    pub resolve_target: Option<&'a TextureViewId>,
    /// Load/store.
    pub ops: Operations<Color>,
}

/// The depth attachment.
#[derive(Debug, Clone, Copy)]
pub struct RenderPassDepthStencilAttachment<'a> {
    /// Depth view.
    pub view: &'a TextureViewId,
    /// Depth load/store, `None` leaves depth read-only.
    pub depth_ops: Option<Operations<f32>>,
}

/// Parameters for [`CommandEncoder::begin_render_pass`](crate::renderer::CommandEncoder::begin_render_pass).
#[derive(Debug, Clone, Copy)]
pub struct RenderPassDescriptor<'a> {
    /// Debug label.
    pub label: Option<&'a str>,
    /// Color outputs.
    pub color_attachments: &'a [RenderPassColorAttachment<'a>],
    /// Optional depth output.
    pub depth_stencil_attachment: Option<RenderPassDepthStencilAttachment<'a>>,
}
