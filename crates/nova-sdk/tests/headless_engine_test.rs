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

//! Integration tests for the frame loop, driven through the headless engine.

use std::borrow::Cow;

use nova_core::platform::InputEvent;
use nova_infra::graphics::null::NullCommand;
use nova_sdk::prelude::*;
use nova_sdk::{EngineConfig, RendererBackend};

const WGSL: &str = r#"
@vertex
fn vs_main(@location(0) p: vec3<f32>, @location(4) c0: vec4<f32>, @location(5) c1: vec4<f32>,
           @location(6) c2: vec4<f32>, @location(7) c3: vec4<f32>) -> @builtin(position) vec4<f32> {
    return mat4x4<f32>(c0, c1, c2, c3) * vec4<f32>(p, 1.0);
}
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0);
}
"#;

const POSITION: &[VertexAttributeDescriptor] = &[VertexAttributeDescriptor {
    shader_location: 0,
    format: VertexFormat::Float32x3,
    offset: 0,
}];

fn triangle(device: &dyn GraphicsDevice) -> RenderObject {
    let module = device
        .create_shader_module(&ShaderModuleDescriptor {
            label: Some("triangle"),
            source: ShaderSourceData::Wgsl(Cow::Borrowed(WGSL)),
        })
        .unwrap();
    let format = device.surface_format().unwrap();
    let pipeline = device
        .create_render_pipeline(&RenderPipelineDescriptor {
            label: Some(Cow::Borrowed("triangle")),
            vertex_shader_module: module,
            vertex_entry_point: Cow::Borrowed("vs_main"),
            fragment_shader_module: Some(module),
            fragment_entry_point: Some(Cow::Borrowed("fs_main")),
            vertex_buffers_layout: Cow::Owned(vec![
                VertexBufferLayoutDescriptor {
                    array_stride: 12,
                    step_mode: VertexStepMode::Vertex,
                    attributes: Cow::Borrowed(POSITION),
                },
                transform_instance_layout(4),
            ]),
            primitive_state: PrimitiveStateDescriptor::default(),
            depth_stencil_state: Some(DepthStencilStateDescriptor::less(
                TextureFormat::Depth32Float,
            )),
            color_target_states: Cow::Owned(vec![ColorTargetStateDescriptor {
                format,
                blend: None,
                write_mask: ColorWrites::ALL,
            }]),
            multisample_state: MultisampleStateDescriptor::default(),
        })
        .unwrap();
    let vertices: [[f32; 3]; 3] = [[0.0, 0.5, 0.0], [-0.5, -0.5, 0.0], [0.5, -0.5, 0.0]];
    let vertex_buffer = device
        .create_buffer_with_data(
            &BufferDescriptor {
                label: Some(Cow::Borrowed("triangle vertices")),
                size: 0,
                usage: BufferUsage::VERTEX,
                mapped_at_creation: false,
            },
            bytemuck::cast_slice(&vertices),
        )
        .unwrap();
    RenderObject::new(pipeline, vertex_buffer, 3).with_transform_slot(1)
}

/// Rotates its owner around Y.
struct Spin {
    degrees_per_second: f32,
}

impl Component for Spin {
    fn name(&self) -> &str {
        "Spin"
    }

    fn on_update(&mut self, ctx: &mut ComponentContext, delta_time: f32) {
        let angle = (self.degrees_per_second * delta_time).to_radians();
        ctx.transform
            .rotate(Quaternion::from_axis_angle(Vec3::Y, angle));
    }
}

/// Records what the engine hands it.
#[derive(Default)]
struct Recorder {
    updates: u32,
    deltas: Vec<f32>,
    events: Vec<EngineEvent>,
    space_presses: Vec<bool>,
    exit_after: Option<u32>,
    shutdown_called: bool,
    extra_draw: Option<RenderObject>,
}

impl Application for Recorder {
    fn new(_context: &mut EngineContext) -> anyhow::Result<Self> {
        Ok(Self::default())
    }

    fn update(&mut self, context: &mut EngineContext, delta_time: f32) {
        self.updates += 1;
        self.deltas.push(delta_time);
        self.space_presses
            .push(context.input().was_key_pressed("Space"));
        if self.exit_after == Some(self.updates) {
            context.request_exit();
        }
    }

    fn render(&mut self, _context: &mut EngineContext, queue: &mut RenderQueue) {
        if let Some(object) = &self.extra_draw {
            queue.push(object.clone());
        }
    }

    fn on_event(&mut self, _context: &mut EngineContext, event: &EngineEvent) {
        self.events.push(event.clone());
    }

    fn on_shutdown(&mut self, _context: &mut EngineContext) {
        self.shutdown_called = true;
    }
}

/// Builds a scene with a camera and a spinning triangle.
struct SceneApp {
    mesh: EntityHandle,
}

impl Application for SceneApp {
    fn new(context: &mut EngineContext) -> anyhow::Result<Self> {
        let object = triangle(context.graphics_device());

        let mut scene = Scene::new("main");
        let camera = scene.create_entity("Camera");
        scene
            .entity_mut(camera)
            .unwrap()
            .transform_mut()
            .set_position(Vec3::new(0.0, 0.0, 5.0));
        scene.add_component(camera, Camera::perspective(60.0, 0.1, 100.0))?;

        let mesh = scene.create_entity("Triangle");
        scene.add_component(mesh, MeshRenderer::new(object))?;
        scene.add_component(mesh, Spin { degrees_per_second: 90.0 })?;

        context.scenes_mut().load_scene(scene)?;
        Ok(Self { mesh })
    }

    fn update(&mut self, _context: &mut EngineContext, _delta_time: f32) {}
}

fn config() -> EngineConfig {
    let mut config = EngineConfig::default();
    config.window.width = 800;
    config.window.height = 600;
    config.renderer.backend = RendererBackend::Null;
    config.renderer.clear_color = Color::rgb(0.2, 0.3, 0.4);
    config
}

#[test]
fn test_frames_run_in_order_and_count() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    let stats = engine.run_frames(3, 1.0 / 60.0).unwrap();

    assert_eq!(stats.frame_number, 3);
    assert_eq!(engine.app().updates, 3);
    assert_eq!(engine.context().clock().frame_count(), 3);
    for delta in &engine.app().deltas {
        approx::assert_relative_eq!(*delta, 1.0 / 60.0, epsilon = 1e-6);
    }
}

#[test]
fn test_delta_is_clamped_to_max_delta() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    engine.run_frames(1, 5.0).unwrap();
    approx::assert_relative_eq!(engine.app().deltas[0], 0.25);
}

#[test]
fn test_non_finite_and_negative_deltas_do_not_panic() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    engine.run_frames(1, f32::INFINITY).unwrap();
    engine.run_frames(1, f32::MAX).unwrap();
    engine.run_frames(1, f32::NAN).unwrap();
    engine.run_frames(1, -1.0).unwrap();
    let deltas = &engine.app().deltas;
    assert_eq!(deltas.len(), 4);
    approx::assert_relative_eq!(deltas[0], 0.25);
    approx::assert_relative_eq!(deltas[1], 0.25);
    approx::assert_relative_eq!(deltas[2], 0.0);
    approx::assert_relative_eq!(deltas[3], 0.0);
}

#[test]
fn test_clear_color_without_camera() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    engine.run_frames(1, 0.016).unwrap();

    let submitted = engine.device().submitted_command_buffers();
    assert!(matches!(
        submitted[0].commands[0],
        NullCommand::BeginRenderPass { clear_color: Some(c), .. } if c == Color::rgb(0.2, 0.3, 0.4)
    ));
    assert_eq!(submitted[0].draw_calls(), 0);
}

#[test]
fn test_input_edges_last_one_frame() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    engine.publish(EngineEvent::Input(InputEvent::KeyPressed {
        key_code: "Space".to_string(),
    }));
    engine.run_frames(2, 0.016).unwrap();

    assert_eq!(engine.app().space_presses, vec![true, false]);
    assert!(engine.context().input().is_key_down("Space"));
    assert_eq!(engine.app().events.len(), 1);
}

#[test]
fn test_exit_request_stops_the_loop() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    engine.app_mut().exit_after = Some(2);
    let stats = engine.run_frames(10, 0.016).unwrap();

    assert_eq!(engine.app().updates, 2);
    assert_eq!(stats.frame_number, 2);
    assert!(engine.context().exit_requested());
}

#[test]
fn test_shutdown_event_requests_exit() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    engine.publish(EngineEvent::ShutdownRequested);
    engine.run_frames(5, 0.016).unwrap();

    assert_eq!(engine.app().updates, 1);
    assert_eq!(engine.app().events, vec![EngineEvent::ShutdownRequested]);
}

#[test]
fn test_resize_reaches_the_context() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    engine.resize(640, 480);
    engine.run_frames(1, 0.016).unwrap();

    assert_eq!(engine.context().surface_size(), (640, 480));
    assert_eq!(
        engine.app().events,
        vec![EngineEvent::WindowResized {
            width: 640,
            height: 480
        }]
    );
    approx::assert_relative_eq!(engine.context().aspect_ratio(), 4.0 / 3.0);
}

#[test]
fn test_application_draws_are_rendered() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    let object = triangle(engine.context().graphics_device());
    engine.app_mut().extra_draw = Some(object);
    let stats = engine.run_frames(1, 0.016).unwrap();

    assert_eq!(stats.draw_calls, 1);
    assert_eq!(stats.triangles_rendered, 1);
}

#[test]
fn test_shutdown_runs_once() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    engine.run_frames(1, 0.016).unwrap();
    engine.shutdown();
    engine.shutdown();

    assert!(engine.app().shutdown_called);
    assert!(engine.render_system().graphics_device().is_none());
    assert_eq!(engine.device().live_texture_count(), 0);
}

#[test]
fn test_scene_is_activated_and_rendered_through_its_camera() {
    let mut engine = HeadlessEngine::<SceneApp>::new(config()).unwrap();
    let stats = engine.run_frames(2, 0.5).unwrap();
    assert_eq!(stats.draw_calls, 1);

    let context = engine.context();
    let scene = context.scenes().active_scene().unwrap();
    assert_eq!(scene.name(), "main");

    // Two 0.25 s steps (clamped) at 90 deg/s.
    let mesh = engine.app().mesh;
    let rotated = scene.entity(mesh).unwrap().transform().rotation();
    let expected_rotation = Quaternion::from_axis_angle(Vec3::Y, 45f32.to_radians());
    assert!(rotated.dot(expected_rotation).abs() > 0.9999);

    let view_info = scene.main_camera_view(context.aspect_ratio()).unwrap();
    let model = scene.world_matrix(mesh).unwrap();
    let expected = view_info.view_projection_matrix() * model;

    let submitted = engine.device().submitted_command_buffers();
    let last = submitted.last().unwrap();
    let (stream, offset) = last.vertex_bindings(1)[0];
    assert_eq!(offset, 0);
    let contents = engine.device().buffer_contents(stream).unwrap();
    let uploaded: Mat4 = bytemuck::pod_read_unaligned(&contents[..64]);
    assert!(uploaded.approx_eq(&expected, 1e-5));
}

#[test]
fn test_scene_activation_is_announced() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    engine
        .context_mut()
        .scenes_mut()
        .load_scene(Scene::new("level"))
        .unwrap();
    engine.run_frames(2, 0.016).unwrap();

    assert_eq!(
        engine.app().events,
        vec![EngineEvent::SceneActivated {
            name: "level".to_string()
        }]
    );
}

/// A scene whose cube slides along X and whose camera flies with the keyboard.
struct MotionApp {
    cube: EntityHandle,
    camera: EntityHandle,
}

impl Application for MotionApp {
    fn new(context: &mut EngineContext) -> anyhow::Result<Self> {
        let mut scene = Scene::new("motion");
        let camera = scene.create_entity("Camera");
        scene
            .entity_mut(camera)
            .unwrap()
            .transform_mut()
            .set_position(Vec3::new(0.0, 0.0, 5.0));
        scene.add_component(camera, Camera::perspective(60.0, 0.1, 100.0))?;
        let mut fly = FreeFlyCamera::default();
        fly.look_button = None;
        fly.smoothing = 0.0;
        scene.add_component(camera, fly)?;

        let cube = scene.create_entity("Cube");
        scene.start_tween(Tween::position(cube, Vec3::new(4.0, 0.0, 0.0), 1.0))?;

        context.scenes_mut().load_scene(scene)?;
        Ok(Self { cube, camera })
    }

    fn update(&mut self, _context: &mut EngineContext, _delta_time: f32) {}
}

fn position_of(engine: &HeadlessEngine<MotionApp>, entity: EntityHandle) -> Vec3 {
    let scene = engine.context().scenes().active_scene().unwrap();
    scene.entity(entity).unwrap().transform().position()
}

#[test]
fn test_scene_tweens_advance_with_the_frame_loop() {
    let mut engine = HeadlessEngine::<MotionApp>::new(config()).unwrap();
    let cube = engine.app().cube;

    engine.run_frames(2, 0.25).unwrap();
    approx::assert_relative_eq!(position_of(&engine, cube).x, 2.0, epsilon = 1e-5);

    engine.run_frames(3, 0.25).unwrap();
    approx::assert_relative_eq!(position_of(&engine, cube).x, 4.0);
    let scene = engine.context().scenes().active_scene().unwrap();
    assert!(scene.tweens().is_empty());
}

#[test]
fn test_free_fly_camera_follows_published_keys() {
    let mut engine = HeadlessEngine::<MotionApp>::new(config()).unwrap();
    let camera = engine.app().camera;
    engine.publish(EngineEvent::Input(InputEvent::KeyPressed {
        key_code: "KeyW".to_string(),
    }));

    engine.run_frames(2, 0.25).unwrap();
    approx::assert_relative_eq!(position_of(&engine, camera).z, 2.5, epsilon = 1e-5);

    engine.publish(EngineEvent::Input(InputEvent::KeyReleased {
        key_code: "KeyW".to_string(),
    }));
    engine.run_frames(1, 0.25).unwrap();
    approx::assert_relative_eq!(position_of(&engine, camera).z, 2.5, epsilon = 1e-5);
}

#[test]
fn test_clear_color_tween_fades_and_stops() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    engine
        .context_mut()
        .tween_clear_color(Color::rgb(1.0, 1.0, 1.0), 1.0, TweenEase::Linear);

    engine.run_frames(1, 0.25).unwrap();
    let color = engine.context().clear_color();
    approx::assert_relative_eq!(color.r, 0.4, epsilon = 1e-5);
    approx::assert_relative_eq!(color.g, 0.475, epsilon = 1e-5);
    approx::assert_relative_eq!(color.b, 0.55, epsilon = 1e-5);
    assert!(engine.context().is_clear_color_tweening());

    // The frame clears with the color reached during that frame.
    let submitted = engine.device().submitted_command_buffers();
    assert!(matches!(
        submitted[0].commands[0],
        NullCommand::BeginRenderPass { clear_color: Some(c), .. } if c == color
    ));

    engine.run_frames(3, 0.25).unwrap();
    assert_eq!(engine.context().clear_color(), Color::rgb(1.0, 1.0, 1.0));
    assert!(!engine.context().is_clear_color_tweening());
}

#[test]
fn test_setting_the_clear_color_cancels_its_tween() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    let context = engine.context_mut();
    context.tween_clear_color(Color::rgb(1.0, 1.0, 1.0), 1.0, TweenEase::QuadraticInOut);
    context.set_clear_color(Color::rgb(0.0, 0.0, 0.0));

    engine.run_frames(1, 0.25).unwrap();

    assert_eq!(engine.context().clear_color(), Color::rgb(0.0, 0.0, 0.0));
}

#[test]
fn test_loaded_resources_are_released_at_shutdown() {
    let mut engine = HeadlessEngine::<Recorder>::new(config()).unwrap();
    let shader = engine
        .context_mut()
        .load_shader("triangle", WGSL)
        .unwrap();
    engine
        .context_mut()
        .load_texture_from_memory("white", &png(2, 2), TextureParams::default())
        .unwrap();
    assert_eq!(engine.context().shader("triangle"), Some(shader));
    assert_eq!(engine.context().texture("white").map(|t| t.width), Some(2));

    engine.run_frames(1, 0.016).unwrap();
    engine.shutdown();

    assert_eq!(engine.device().live_shader_count(), 0);
    assert_eq!(engine.device().live_texture_count(), 0);
    assert_eq!(engine.device().live_sampler_count(), 0);
}

fn png(width: u32, height: u32) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba([255; 4]));
    let mut bytes = std::io::Cursor::new(Vec::new());
    image
        .write_to(&mut bytes, image::ImageFormat::Png)
        .unwrap();
    bytes.into_inner()
}
