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

// Nova Engine Sandbox
// Opens a window and spins a triangle. Space pauses, Escape quits.
// Hold the right mouse button to look around and fly with WASD/QE.

use std::borrow::Cow;
use std::mem;

use anyhow::{Context, Result};
use nova_sdk::prelude::*;
use nova_sdk::{init_logging, Engine};

const TRIANGLE_WGSL: &str = r#"
struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
};

@vertex
fn vs_main(
    @location(0) position: vec3<f32>,
    @location(1) color: vec3<f32>,
    @location(4) mvp_0: vec4<f32>,
    @location(5) mvp_1: vec4<f32>,
    @location(6) mvp_2: vec4<f32>,
    @location(7) mvp_3: vec4<f32>,
) -> VertexOutput {
    let mvp = mat4x4<f32>(mvp_0, mvp_1, mvp_2, mvp_3);
    var out: VertexOutput;
    out.clip_position = mvp * vec4<f32>(position, 1.0);
    out.color = color;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(in.color, 1.0);
}
"#;

/// Slot the per-object MVP stream is bound to.
const TRANSFORM_SLOT: u32 = 1;

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    color: [f32; 3],
}

const VERTEX_ATTRIBUTES: &[VertexAttributeDescriptor] = &[
    // @location(0): position
    VertexAttributeDescriptor {
        shader_location: 0,
        format: VertexFormat::Float32x3,
        offset: 0,
    },
    // @location(1): color
    VertexAttributeDescriptor {
        shader_location: 1,
        format: VertexFormat::Float32x3,
        offset: mem::size_of::<[f32; 3]>() as u64,
    },
];

impl Vertex {
    fn buffer_layout() -> VertexBufferLayoutDescriptor<'static> {
        VertexBufferLayoutDescriptor {
            array_stride: mem::size_of::<Vertex>() as u64,
            step_mode: VertexStepMode::Vertex,
            attributes: Cow::Borrowed(VERTEX_ATTRIBUTES),
        }
    }
}

const VERTICES: &[Vertex] = &[
    Vertex {
        position: [0.0, 0.5, 0.0],
        color: [1.0, 0.0, 0.0],
    },
    Vertex {
        position: [-0.5, -0.5, 0.0],
        color: [0.0, 1.0, 0.0],
    },
    Vertex {
        position: [0.5, -0.5, 0.0],
        color: [0.0, 0.0, 1.0],
    },
];

const INDICES: &[u16] = &[0, 1, 2];

/// Rotates its owner around the Y axis.
struct Spinner {
    degrees_per_second: f32,
}

impl Component for Spinner {
    fn name(&self) -> &str {
        "Spinner"
    }

    fn on_start(&mut self, ctx: &mut ComponentContext) {
        log::info!("Spinner started on '{}'", ctx.entity_name);
    }

    fn on_update(&mut self, ctx: &mut ComponentContext, delta_time: f32) {
        let angle = (self.degrees_per_second * delta_time).to_radians();
        ctx.transform
            .rotate(Quaternion::from_axis_angle(Vec3::UP, angle));
    }
}

struct SandboxApp {
    triangle: EntityHandle,
    paused: bool,
}

fn create_triangle(device: &dyn GraphicsDevice) -> Result<RenderObject> {
    log::info!("SandboxApp: Initializing GPU resources...");

    let shader_module = device
        .create_shader_module(&ShaderModuleDescriptor {
            label: Some("Triangle Shader"),
            source: ShaderSourceData::Wgsl(Cow::Borrowed(TRIANGLE_WGSL)),
        })
        .context("creating the triangle shader")?;

    let vertex_buffer = device
        .create_buffer_with_data(
            &BufferDescriptor {
                label: Some("Triangle Vertex Buffer".into()),
                size: mem::size_of_val(VERTICES) as u64,
                usage: BufferUsage::VERTEX | BufferUsage::COPY_DST,
                mapped_at_creation: false,
            },
            bytemuck::cast_slice(VERTICES),
        )
        .context("creating the vertex buffer")?;

    let index_buffer = device
        .create_buffer_with_data(
            &BufferDescriptor {
                label: Some("Triangle Index Buffer".into()),
                size: mem::size_of_val(INDICES) as u64,
                usage: BufferUsage::INDEX | BufferUsage::COPY_DST,
                mapped_at_creation: false,
            },
            bytemuck::cast_slice(INDICES),
        )
        .context("creating the index buffer")?;

    let surface_format = device
        .surface_format()
        .context("the device has no surface format")?;

    let render_pipeline = device
        .create_render_pipeline(&RenderPipelineDescriptor {
            label: Some("Triangle Render Pipeline".into()),
            vertex_shader_module: shader_module,
            vertex_entry_point: "vs_main".into(),
            fragment_shader_module: Some(shader_module),
            fragment_entry_point: Some("fs_main".into()),
            vertex_buffers_layout: Cow::Owned(vec![
                Vertex::buffer_layout(),
                transform_instance_layout(4),
            ]),
            primitive_state: PrimitiveStateDescriptor {
                // The triangle is seen from both sides while it spins.
                cull_mode: None,
                ..Default::default()
            },
            depth_stencil_state: Some(DepthStencilStateDescriptor::less(
                TextureFormat::Depth32Float,
            )),
            color_target_states: Cow::Owned(vec![ColorTargetStateDescriptor {
                format: surface_format,
                blend: None,
                write_mask: ColorWrites::ALL,
            }]),
            multisample_state: MultisampleStateDescriptor::default(),
        })
        .context("creating the triangle pipeline")?;
    log::info!(" -> Render pipeline created: {:?}", render_pipeline);

    Ok(RenderObject::new(render_pipeline, vertex_buffer, 3)
        .with_indices(index_buffer, IndexFormat::Uint16, INDICES.len() as u32)
        .with_transform_slot(TRANSFORM_SLOT))
}

impl Application for SandboxApp {
    fn new(context: &mut EngineContext) -> Result<Self> {
        let triangle_draw = create_triangle(context.graphics_device())?;

        let mut scene = Scene::new("Sandbox");

        let camera = scene.create_entity("Main Camera");
        if let Some(entity) = scene.entity_mut(camera) {
            entity
                .transform_mut()
                .set_position(Vec3::new(0.0, 0.0, 2.0));
        }
        let mut lens = Camera::perspective(60.0, 0.1, 100.0);
        lens.clear_color = Color::BLACK;
        scene.add_component(camera, lens)?;
        scene.add_component(camera, FreeFlyCamera::new(2.0, 0.15))?;
        scene.start_tween(
            Tween::clear_color(camera, Color::rgb(0.1, 0.1, 0.12), 1.5)
                .with_ease(TweenEase::CubicOut),
        )?;

        let triangle = scene.create_entity("Triangle");
        scene.add_component(triangle, MeshRenderer::new(triangle_draw))?;
        scene.add_component(
            triangle,
            Spinner {
                degrees_per_second: 90.0,
            },
        )?;

        if log::log_enabled!(log::Level::Debug) {
            log::debug!("Initial scene:\n{}", scene.save_ron()?);
        }
        context.scenes_mut().load_scene(scene)?;

        Ok(Self {
            triangle,
            paused: false,
        })
    }

    fn update(&mut self, context: &mut EngineContext, _delta_time: f32) {
        if context.input().was_key_pressed("Escape") {
            context.request_exit();
            return;
        }
        if context.input().was_key_pressed("Space") {
            self.paused = !self.paused;
            let enabled = !self.paused;
            if let Some(entity) = context
                .scenes_mut()
                .active_scene_mut()
                .and_then(|scene| scene.entity_mut(self.triangle))
            {
                entity.set_component_enabled::<Spinner>(enabled);
            }
            log::info!("Spinner {}", if self.paused { "paused" } else { "resumed" });
        }
    }

    fn on_event(&mut self, _context: &mut EngineContext, event: &EngineEvent) {
        if let EngineEvent::SceneActivated { name } = event {
            log::info!("Scene '{name}' is active");
        }
    }

    fn on_shutdown(&mut self, context: &mut EngineContext) {
        log::info!(
            "SandboxApp: shutting down after {} frames ({:.1} fps)",
            context.clock().frame_count(),
            context.clock().fps()
        );
    }
}

fn main() -> Result<()> {
    init_logging();
    Engine::run::<SandboxApp>()?;
    Ok(())
}
