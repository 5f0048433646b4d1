/// Per-triangle light evaluation cost for each light kind.
use criterion::{black_box, criterion_group, criterion_main, Criterion};
use glam::{Mat4, Quat, Vec3};
use tri_engine::scene::primitives::{self, TerrainConfig};
use tri_engine::*;

fn setup() -> (Model, Camera) {
    let config = TerrainConfig {
        resolution: 32,
        ..Default::default()
    };
    let model = Model::new("ground", primitives::terrain("ground", &config, None))
        .with_transform(Mat4::from_rotation_translation(
            Quat::from_rotation_y(0.3),
            Vec3::new(1.0, -2.0, -3.0),
        ));
    let mut camera = Camera::new(320, 180);
    camera.position = Vec3::new(0.0, 10.0, 20.0);
    (model, camera)
}

fn bench_light(c: &mut Criterion, name: &str, mut light: Light) {
    let (model, camera) = setup();
    let part = model.mesh.as_ref().expect("terrain has a mesh").parts[0].clone();
    light.begin_render();

    c.bench_function(name, |b| {
        b.iter(|| {
            light.begin_model(black_box(&model), &camera);
            let mut sum = 0.0f32;
            for triangle in &part.triangles {
                sum += light.light(black_box(triangle), &part)[0];
            }
            sum
        });
    });
}

fn bench_ambient(c: &mut Criterion) {
    bench_light(c, "ambient_light_part", AmbientLight::new("a", Vec3::ONE, 0.3).into());
}

fn bench_point(c: &mut Criterion) {
    bench_light(
        c,
        "point_light_part",
        PointLight::new("p", Vec3::new(0.0, 4.0, 0.0), Vec3::ONE, 1.0).into(),
    );
}

fn bench_point_ranged(c: &mut Criterion) {
    bench_light(
        c,
        "point_light_ranged_part",
        PointLight::new("p", Vec3::new(0.0, 4.0, 0.0), Vec3::ONE, 1.0)
            .with_distance(12.0)
            .into(),
    );
}

fn bench_directional(c: &mut Criterion) {
    bench_light(
        c,
        "directional_light_part",
        DirectionalLight::from_direction("d", Vec3::new(-0.3, -1.0, -0.2), Vec3::ONE, 1.0).into(),
    );
}

criterion_group!(
    benches,
    bench_ambient,
    bench_point,
    bench_point_ranged,
    bench_directional
);
criterion_main!(benches);
