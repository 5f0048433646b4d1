/// Visibility rejection before rasterization: frustum sphere, per-triangle
/// flags, screen bounds and winding.
use glam::{Mat4, Vec2, Vec3, Vec4};
use tri_engine::rendering::culling::{behind_or_beyond, is_backfacing, offscreen};
use tri_engine::scene::primitives;
use tri_engine::*;

fn render(camera: &mut Camera, models: &mut [Model]) {
    Renderer::new()
        .render(&SceneSettings::default(), &mut [], camera, models)
        .expect("frame should render");
}

fn cube_at(position: Vec3) -> Model {
    Model::new("cube", primitives::cube("cube", None))
        .with_transform(Mat4::from_translation(position))
}

#[test]
fn models_outside_frustum_sphere_are_skipped() {
    let mut camera = Camera::new(32, 32);
    camera.far = 20.0;
    let mut models = vec![cube_at(Vec3::new(0.0, 0.0, 40.0)), cube_at(Vec3::new(0.0, 0.0, -5.0))];

    render(&mut camera, &mut models);

    assert_eq!(camera.metrics.total_parts, 2);
    assert_eq!(camera.metrics.drawn_parts, 1);
    assert_eq!(camera.metrics.total_triangles, 24);
}

#[test]
fn frustum_culling_can_be_disabled_per_model() {
    let mut camera = Camera::new(32, 32);
    camera.far = 20.0;
    let mut model = cube_at(Vec3::new(0.0, 0.0, 40.0));
    model.frustum_culling = false;
    let mut models = vec![model];

    render(&mut camera, &mut models);

    // Reaches the per-triangle tests, which reject everything behind the camera.
    assert_eq!(camera.metrics.drawn_parts, 0);
    assert_eq!(camera.metrics.total_parts, 1);
}

#[test]
fn frustum_sphere_follows_the_camera() {
    let mut camera = Camera::new(32, 32);
    camera.position = Vec3::new(100.0, 0.0, 0.0);
    camera.look_at(Vec3::new(100.0, 0.0, -10.0), Vec3::Y);
    camera.update_frustum_sphere();

    let sphere = camera.frustum_sphere();
    assert!(sphere.center.x > 99.0);
    assert!(sphere.center.z < 0.0);
}

#[test]
fn hidden_triangles_are_not_drawn() {
    let mut camera = Camera::new(32, 32);
    let mut model = cube_at(Vec3::new(0.0, 0.0, -5.0));
    if let Some(mesh) = model.mesh.as_mut() {
        for tri in &mut mesh.parts[0].triangles {
            tri.visible = false;
        }
    }
    let mut models = vec![model];

    render(&mut camera, &mut models);

    assert_eq!(camera.metrics.drawn_triangles, 0);
    assert!(camera.targets.color.pixels().iter().all(|p| *p == Vec4::ZERO));
}

#[test]
fn cube_shows_only_front_faces() {
    let mut camera = Camera::new(256, 256);
    let mut models = vec![cube_at(Vec3::new(0.0, 0.0, -5.0))];

    render(&mut camera, &mut models);

    // Straight on, only the +Z face is visible.
    assert_eq!(camera.metrics.drawn_triangles, 2);
}

#[test]
fn offscreen_models_draw_nothing() {
    let mut camera = Camera::new(32, 32);
    let mut models = vec![cube_at(Vec3::new(30.0, 0.0, -5.0))];

    render(&mut camera, &mut models);

    assert_eq!(camera.metrics.drawn_triangles, 0);
}

#[test]
fn screen_tests_agree_with_projection() {
    let camera = Camera::new(100, 100);
    let front = [
        Vec3::new(-1.0, -1.0, -5.0),
        Vec3::new(1.0, -1.0, -5.0),
        Vec3::new(0.0, 1.0, -5.0),
    ]
    .map(|p| camera.world_to_screen(p));
    assert!(!is_backfacing(&front));
    assert!(is_backfacing(&[front[0], front[2], front[1]]));
    assert!(!offscreen(&front, 100.0, 100.0));

    let left = [Vec2::new(-5.0, 10.0), Vec2::new(-1.0, 90.0), Vec2::new(-3.0, 50.0)];
    assert!(offscreen(&left, 100.0, 100.0));

    let clip = [Vec3::new(0.0, 0.0, -150.0); 3].map(|p| camera.world_to_clip(p));
    assert!(behind_or_beyond(&clip, camera.is_perspective(), camera.far_limit()));
}
