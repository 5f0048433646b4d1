/// Interactive viewer
/// Renders a small demo scene through the pipeline and presents it with softbuffer
use std::error::Error;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Instant;

use glam::{Mat4, Quat, Vec3, Vec4};
use mimalloc::MiMalloc;
use tri_engine::scene::default_material;
use tri_engine::scene::primitives::{self, TerrainConfig};
use tri_engine::*;
use winit::{
    event::*,
    event_loop::{ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::WindowBuilder,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const SKY: Vec4 = Vec4::new(0.53, 0.81, 0.92, 1.0);

/// Indices of the animated models in the demo scene.
const SPINNING_CUBE: usize = 1;
const POINT_LIGHT: usize = 2;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("=== tri_engine - Software Rasterizer ===");
    println!("Controls:");
    println!("  WASD - Move camera");
    println!("  Space/Shift - Up/Down");
    println!("  Mouse - Look around (click to capture)");
    println!("  L - Toggle lighting");
    println!("  Z - Toggle depth buffer (painter's order when off)");
    println!("  B - Toggle backface culling");
    println!("  P - Toggle perspective/orthographic");
    println!("  F - Cycle fog mode");
    println!("  ESC - Exit");
    println!();

    let event_loop = EventLoop::new()?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title("tri_engine")
            .with_inner_size(winit::dpi::LogicalSize::new(1280, 720))
            .build(&event_loop)?,
    );

    let context = softbuffer::Context::new(window.clone())?;
    let mut surface = softbuffer::Surface::new(&context, window.clone())?;

    let window_size = window.inner_size();
    let mut camera = Camera::new(window_size.width as usize, window_size.height as usize);
    camera.position = Vec3::new(0.0, 4.0, 14.0);
    let mut camera_controller = CameraController {
        pitch: -0.25,
        ..Default::default()
    };

    let mut models = build_scene();
    let mut lights = build_lights();
    let mut renderer = Renderer::new();
    let mut settings = SceneSettings {
        fog: Fog {
            color: Vec3::new(SKY.x, SKY.y, SKY.z),
            range: [0.1, 0.6],
            ..Default::default()
        },
        ..Default::default()
    };
    let mut backface_culling = true;

    let start = Instant::now();
    let mut last_frame = Instant::now();
    let mut frame_count = 0u32;
    let mut fps_timer = Instant::now();

    let mut mouse_captured = false;
    let mut last_mouse_pos: Option<(f64, f64)> = None;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    elwt.exit();
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(err) =
                        camera.resize(new_size.width as usize, new_size.height as usize)
                    {
                        log::debug!("ignoring resize: {}", err);
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    let pressed = event.state == ElementState::Pressed;

                    if let PhysicalKey::Code(keycode) = event.physical_key {
                        match keycode {
                            KeyCode::KeyW => camera_controller.forward_pressed = pressed,
                            KeyCode::KeyS => camera_controller.backward_pressed = pressed,
                            KeyCode::KeyA => camera_controller.left_pressed = pressed,
                            KeyCode::KeyD => camera_controller.right_pressed = pressed,
                            KeyCode::Space => camera_controller.up_pressed = pressed,
                            KeyCode::ShiftLeft => camera_controller.down_pressed = pressed,
                            KeyCode::KeyL if pressed => {
                                settings.lighting = !settings.lighting;
                                log::info!("Lighting: {}", on_off(settings.lighting));
                            }
                            KeyCode::KeyZ if pressed => {
                                camera.render_depth = !camera.render_depth;
                                log::info!("Depth buffer: {}", on_off(camera.render_depth));
                            }
                            KeyCode::KeyB if pressed => {
                                backface_culling = !backface_culling;
                                set_backface_culling(&mut models, backface_culling);
                                log::info!("Backface culling: {}", on_off(backface_culling));
                            }
                            KeyCode::KeyP if pressed => {
                                camera.projection = match camera.projection {
                                    Projection::Perspective { .. } => {
                                        Projection::Orthographic { scale: 12.0 }
                                    }
                                    Projection::Orthographic { .. } => Projection::default(),
                                };
                                log::info!("Projection: {:?}", camera.projection);
                            }
                            KeyCode::KeyF if pressed => {
                                settings.fog.mode = match settings.fog.mode {
                                    FogMode::Off => FogMode::Overwrite,
                                    FogMode::Overwrite => FogMode::Additive,
                                    FogMode::Additive => FogMode::Subtractive,
                                    FogMode::Subtractive => FogMode::Off,
                                };
                                log::info!("Fog: {:?}", settings.fog.mode);
                            }
                            KeyCode::Escape if pressed => {
                                if mouse_captured {
                                    mouse_captured = false;
                                    last_mouse_pos = None;
                                    window.set_cursor_visible(true);
                                } else {
                                    elwt.exit();
                                }
                            }
                            _ => {}
                        }
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    if button == MouseButton::Left && state == ElementState::Pressed {
                        mouse_captured = true;
                        window.set_cursor_visible(false);
                    }
                }
                WindowEvent::CursorMoved { position, .. } => {
                    if mouse_captured {
                        if let Some(last_pos) = last_mouse_pos {
                            let delta_x = position.x - last_pos.0;
                            let delta_y = position.y - last_pos.1;
                            camera_controller.rotate(delta_x as f32, delta_y as f32);
                        }
                        last_mouse_pos = Some((position.x, position.y));
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let dt = (now - last_frame).as_secs_f32();
                    last_frame = now;

                    camera_controller.update_camera(&mut camera, dt);
                    animate(&mut models, &mut lights, start.elapsed().as_secs_f32());

                    camera.clear();
                    camera.targets.color.fill(SKY);
                    if let Err(err) = renderer.render(&settings, &mut lights, &mut camera, &mut models)
                    {
                        log::error!("frame failed: {}", err);
                    }

                    if let Err(err) = present(&mut surface, &camera) {
                        log::error!("present failed: {}", err);
                        elwt.exit();
                        return;
                    }

                    frame_count += 1;
                    if fps_timer.elapsed().as_secs() >= 1 {
                        log::info!("FPS: {}\n{}", frame_count, camera.metrics);
                        frame_count = 0;
                        fps_timer = Instant::now();
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            _ => {}
        }
    })?;

    Ok(())
}

fn on_off(flag: bool) -> &'static str {
    if flag {
        "ON"
    } else {
        "OFF"
    }
}

/// Terrain, an opaque spinning cube, a cut-out cube and a glass cube.
fn build_scene() -> Vec<Model> {
    let ground = primitives::terrain("ground", &TerrainConfig::default(), None);

    let solid = Arc::new(Material::new("red").with_color(Vec4::new(0.9, 0.2, 0.15, 1.0)));

    let mut cutout = Material::new("lattice")
        .with_transparency(TransparencyMode::AlphaClip)
        .with_texture(Arc::new(Texture::checkerboard(
            8,
            2,
            Vec4::new(0.9, 0.8, 0.3, 1.0),
            Vec4::ZERO,
        )));
    cutout.backface_culling = false;

    let glass = Material::new("glass")
        .with_transparency(TransparencyMode::Auto)
        .with_color(Vec4::new(0.3, 0.6, 1.0, 0.45));

    let place = |x: f32, scale: f32| {
        Mat4::from_scale_rotation_translation(
            Vec3::splat(scale),
            Quat::IDENTITY,
            Vec3::new(x, 1.5, 0.0),
        )
    };

    let mut models = vec![
        Model::new("ground", ground).with_transform(Mat4::from_translation(Vec3::NEG_Y * 2.0)),
        Model::new("cube", primitives::cube("cube", Some(solid))).with_transform(place(-3.0, 2.0)),
        Model::new("lattice", primitives::cube("lattice", Some(Arc::new(cutout))))
            .with_transform(place(0.5, 2.0)),
        Model::new("glass", primitives::cube("glass", Some(Arc::new(glass))))
            .with_transform(place(4.0, 2.5)),
    ];

    // A second glass pane in front so transparent sorting is visible.
    let pane = Material::new("pane")
        .with_transparency(TransparencyMode::Transparent)
        .with_color(Vec4::new(1.0, 0.4, 0.8, 0.35));
    let mut pane_model = Model::new("pane", primitives::quad("pane", 3.0, Some(Arc::new(pane))))
        .with_transform(Mat4::from_translation(Vec3::new(3.0, 1.5, 3.0)));
    pane_model.color = Vec4::new(1.0, 1.0, 1.0, 0.9);
    models.push(pane_model);
    models
}

fn build_lights() -> Vec<Light> {
    vec![
        AmbientLight::new("ambient", Vec3::ONE, 0.25).into(),
        DirectionalLight::from_direction(
            "sun",
            Vec3::new(-0.4, -1.0, -0.3),
            Vec3::new(1.0, 0.95, 0.85),
            0.8,
        )
        .into(),
        PointLight::new("lamp", Vec3::new(0.0, 4.0, 3.0), Vec3::new(1.0, 0.6, 0.3), 1.0)
            .with_distance(10.0)
            .into(),
    ]
}

fn animate(models: &mut [Model], lights: &mut [Light], time: f32) {
    if let Some(cube) = models.get_mut(SPINNING_CUBE) {
        cube.set_transform(Mat4::from_scale_rotation_translation(
            Vec3::splat(2.0),
            Quat::from_rotation_y(time * 0.8) * Quat::from_rotation_x(time * 0.3),
            Vec3::new(-3.0, 1.5, 0.0),
        ));
    }
    if let Some(Light::Point(lamp)) = lights.get_mut(POINT_LIGHT) {
        lamp.position = Vec3::new(4.0 * time.cos(), 4.0, 4.0 * time.sin());
    }
}

fn set_backface_culling(models: &mut [Model], enabled: bool) {
    for model in models {
        let Some(mesh) = model.mesh.as_mut() else {
            continue;
        };
        for part in &mut mesh.parts {
            let material = part
                .material
                .get_or_insert_with(|| Arc::new(default_material().clone()));
            Arc::make_mut(material).backface_culling = enabled;
        }
    }
}

fn present(
    surface: &mut softbuffer::Surface<Arc<winit::window::Window>, Arc<winit::window::Window>>,
    camera: &Camera,
) -> Result<(), softbuffer::SoftBufferError> {
    let (Some(width), Some(height)) = (
        NonZeroU32::new(camera.width() as u32),
        NonZeroU32::new(camera.height() as u32),
    ) else {
        return Ok(());
    };

    surface.resize(width, height)?;
    let mut buffer = surface.buffer_mut()?;
    camera.targets.color.write_argb(&mut buffer);
    buffer.present()
}
