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

//! The public-facing SDK of the Nova engine.
//!
//! Implement [`Application`] and hand it to [`Engine::run`] for a windowed
//! game loop, or to [`HeadlessEngine`] to drive the same frame loop without
//! a window.

mod application;
mod cli;
pub mod config;
mod context;
mod engine;
mod headless;
mod logging;
mod runner;

pub use application::Application;
pub use cli::EngineArgs;
pub use config::{ConfigError, EngineConfig, RendererBackend};
pub use context::EngineContext;
pub use engine::Engine;
pub use headless::HeadlessEngine;
pub use logging::init_logging;
pub use runner::FrameRunner;

pub use nova_core;
pub use nova_data;
pub use nova_infra;

pub mod prelude {
    pub use crate::{Application, Engine, EngineArgs, EngineConfig, EngineContext, HeadlessEngine};
    pub use nova_core::event::EngineEvent;
    pub use nova_core::math::{Color, Mat4, Quaternion, Vec2, Vec3, Vec4};
    pub use nova_core::platform::{InputEvent, MouseButton};
    pub use nova_core::renderer::{
        transform_instance_layout, BufferDescriptor, BufferId, BufferUsage,
        ColorTargetStateDescriptor, ColorWrites, DepthStencilStateDescriptor, GraphicsDevice,
        IndexFormat, MultisampleStateDescriptor, PrimitiveStateDescriptor, RenderObject,
        RenderPipelineDescriptor, RenderPipelineId, RenderQueue, ShaderModuleDescriptor,
        ShaderModuleId, ShaderSourceData, TextureFormat, VertexAttributeDescriptor,
        VertexBufferLayoutDescriptor, VertexFormat, VertexStepMode, ViewInfo,
    };
    pub use nova_data::components::{Camera, FreeFlyCamera, MeshRenderer, Transform};
    pub use nova_data::{
        Component, ComponentContext, ComponentFlags, EntityHandle, Scene, Tween, TweenEase,
    };
    pub use nova_infra::{LoadedTexture, TextureParams};
}
