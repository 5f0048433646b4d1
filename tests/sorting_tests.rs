/// Draw-order tests: solids keep list order under depth rendering,
/// transparents are sorted farthest first with a stable sort.
use std::sync::Arc;

use glam::{Mat4, Vec3, Vec4};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tri_engine::scene::primitives;
use tri_engine::*;

fn glass() -> Arc<Material> {
    Arc::new(
        Material::new("glass")
            .with_transparency(TransparencyMode::Transparent)
            .with_color(Vec4::new(1.0, 1.0, 1.0, 0.5)),
    )
}

fn scattered_panes(rng: &mut ChaCha8Rng, count: usize) -> Vec<Model> {
    (0..count)
        .map(|i| {
            let position = Vec3::new(
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-10.0..10.0),
                rng.gen_range(-40.0..-2.0),
            );
            Model::new(format!("pane{}", i), primitives::quad("pane", 1.0, Some(glass())))
                .with_transform(Mat4::from_translation(position))
        })
        .collect()
}

fn distance_sq(models: &[Model], pair: &RenderPair, camera: &Camera) -> f32 {
    models[pair.model]
        .world_position()
        .distance_squared(camera.position)
}

#[test]
fn transparent_order_is_back_to_front_and_repeatable() {
    let mut rng = ChaCha8Rng::seed_from_u64(2024);
    let mut camera = Camera::new(32, 32);
    let mut models = scattered_panes(&mut rng, 40);
    let mut renderer = Renderer::new();

    renderer
        .render(&SceneSettings::default(), &mut [], &mut camera, &mut models)
        .expect("frame should render");
    let first = renderer.transparent_order().to_vec();

    camera.clear();
    renderer
        .render(&SceneSettings::default(), &mut [], &mut camera, &mut models)
        .expect("frame should render");

    assert_eq!(first, renderer.transparent_order());
    assert_eq!(first.len(), 40);
    assert!(renderer.solid_order().is_empty());
    for pair in first.windows(2) {
        assert!(distance_sq(&models, &pair[0], &camera) >= distance_sq(&models, &pair[1], &camera));
    }
}

#[test]
fn equal_distances_keep_list_order() {
    let mut camera = Camera::new(32, 32);
    let directions = [
        Vec3::X,
        Vec3::Y,
        Vec3::NEG_X,
        Vec3::NEG_Y,
        Vec3::Z,
        Vec3::NEG_Z,
    ];
    let mut models: Vec<Model> = (0..6)
        .map(|i| {
            let position = directions[i] * 10.0;
            Model::new(format!("ring{}", i), primitives::quad("pane", 1.0, Some(glass())))
                .with_transform(Mat4::from_translation(position))
        })
        .collect();
    let mut renderer = Renderer::new();

    renderer
        .render(&SceneSettings::default(), &mut [], &mut camera, &mut models)
        .expect("frame should render");

    let order: Vec<usize> = renderer.transparent_order().iter().map(|p| p.model).collect();
    assert_eq!(order, vec![0, 1, 2, 3, 4, 5]);
}

#[test]
fn solids_keep_list_order_with_depth_and_sort_without() {
    let mut rng = ChaCha8Rng::seed_from_u64(5);
    let mut camera = Camera::new(32, 32);
    let mut models: Vec<Model> = (0..10)
        .map(|i| {
            let z = rng.gen_range(-30.0..-2.0);
            Model::new(format!("cube{}", i), primitives::cube("cube", None))
                .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, z)))
        })
        .collect();
    let mut renderer = Renderer::new();

    renderer
        .render(&SceneSettings::default(), &mut [], &mut camera, &mut models)
        .expect("frame should render");
    let listed: Vec<usize> = renderer.solid_order().iter().map(|p| p.model).collect();
    assert_eq!(listed, (0..10).collect::<Vec<_>>());

    camera.render_depth = false;
    camera.clear();
    renderer
        .render(&SceneSettings::default(), &mut [], &mut camera, &mut models)
        .expect("frame should render");
    for pair in renderer.solid_order().windows(2) {
        assert!(distance_sq(&models, &pair[0], &camera) >= distance_sq(&models, &pair[1], &camera));
    }
}

#[test]
fn auto_transparency_follows_model_alpha() {
    let auto = Arc::new(Material::new("auto").with_transparency(TransparencyMode::Auto));
    let mut faded = Model::new("faded", primitives::cube("cube", Some(auto.clone())))
        .with_transform(Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)));
    faded.color.w = 0.5;
    let solid = Model::new("solid", primitives::cube("cube", Some(auto)))
        .with_transform(Mat4::from_translation(Vec3::new(2.0, 0.0, -5.0)));

    let mut camera = Camera::new(32, 32);
    let mut models = vec![faded, solid];
    let mut renderer = Renderer::new();
    renderer
        .render(&SceneSettings::default(), &mut [], &mut camera, &mut models)
        .expect("frame should render");

    assert_eq!(renderer.transparent_order(), &[RenderPair { model: 0, part: 0 }]);
    assert_eq!(renderer.solid_order(), &[RenderPair { model: 1, part: 0 }]);
}
