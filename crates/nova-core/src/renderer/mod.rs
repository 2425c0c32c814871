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

//! The rendering hardware interface.
//!
//! Everything in here is backend-agnostic: resource ids and descriptors, the
//! error hierarchy, the [`GraphicsDevice`] / [`CommandEncoder`] /
//! [`RenderSystem`] contracts, plus two pieces of shared machinery that every
//! backend reuses, the [`FrameScheduler`] and the [`SamplerCache`].

pub mod api;
pub mod error;
pub mod frame;
pub mod sampler_cache;
pub mod traits;

pub use self::api::*;
pub use self::error::{FrameError, PipelineError, RenderError, ResourceError, ShaderError};
pub use self::frame::{BeginFrame, FrameInfo, FrameScheduler, FrameState, FrameStatus};
pub use self::sampler_cache::SamplerCache;
pub use self::traits::{
    CommandEncoder, GraphicsBackendSelector, GraphicsDevice, RenderPass, RenderSystem,
};
