/// Per-vertex lighting
///
/// Lights produce a colour multiplier for each vertex of a triangle. The
/// pipeline calls `begin_render` once per frame, `begin_model` once per drawn
/// part, and then `light` for every accepted triangle of that part.
pub mod ambient;
pub mod directional;
pub mod point;

pub use ambient::AmbientLight;
pub use directional::DirectionalLight;
pub use point::PointLight;

use glam::{Quat, Vec3};

use crate::camera::Camera;
use crate::scene::{MeshPart, Model, Triangle};

/// Light contract shared by every light kind.
pub trait LightSource {
    /// Prepare model-independent state for this frame.
    fn begin_render(&mut self);

    /// Prepare state that depends on the model being lit and the camera.
    fn begin_model(&mut self, model: &Model, camera: &Camera);

    /// RGB contribution for each of the triangle's three vertices.
    fn light(&self, triangle: &Triangle, part: &MeshPart) -> [f32; 9];

    fn is_on(&self) -> bool;
}

#[derive(Clone, Debug, PartialEq)]
pub enum Light {
    Ambient(AmbientLight),
    Point(PointLight),
    Directional(DirectionalLight),
}

impl Light {
    pub fn name(&self) -> &str {
        match self {
            Light::Ambient(l) => &l.name,
            Light::Point(l) => &l.name,
            Light::Directional(l) => &l.name,
        }
    }

    pub fn set_on(&mut self, on: bool) {
        match self {
            Light::Ambient(l) => l.on = on,
            Light::Point(l) => l.on = on,
            Light::Directional(l) => l.on = on,
        }
    }

    /// Build a light from an imported description. Unknown kinds are logged
    /// and dropped.
    pub fn from_descriptor(desc: &LightDescriptor) -> Option<Light> {
        match desc.kind.as_str() {
            "ambient" => Some(Light::Ambient(AmbientLight::new(
                desc.name.clone(),
                desc.color,
                desc.intensity,
            ))),
            "point" => {
                // Imported point intensities are in watts.
                let mut light = PointLight::new(
                    desc.name.clone(),
                    desc.position,
                    desc.color,
                    desc.intensity / 1000.0,
                );
                light.distance = desc.range.filter(|r| r.is_finite() && *r > 0.0);
                Some(Light::Point(light))
            }
            "directional" => Some(Light::Directional(DirectionalLight::new(
                desc.name.clone(),
                desc.rotation,
                desc.color,
                desc.intensity,
            ))),
            other => {
                log::warn!("dropping light '{}' with unknown type '{}'", desc.name, other);
                None
            }
        }
    }
}

impl From<AmbientLight> for Light {
    fn from(light: AmbientLight) -> Self {
        Light::Ambient(light)
    }
}

impl From<PointLight> for Light {
    fn from(light: PointLight) -> Self {
        Light::Point(light)
    }
}

impl From<DirectionalLight> for Light {
    fn from(light: DirectionalLight) -> Self {
        Light::Directional(light)
    }
}

impl LightSource for Light {
    fn begin_render(&mut self) {
        match self {
            Light::Ambient(l) => l.begin_render(),
            Light::Point(l) => l.begin_render(),
            Light::Directional(l) => l.begin_render(),
        }
    }

    fn begin_model(&mut self, model: &Model, camera: &Camera) {
        match self {
            Light::Ambient(l) => l.begin_model(model, camera),
            Light::Point(l) => l.begin_model(model, camera),
            Light::Directional(l) => l.begin_model(model, camera),
        }
    }

    #[inline]
    fn light(&self, triangle: &Triangle, part: &MeshPart) -> [f32; 9] {
        match self {
            Light::Ambient(l) => l.light(triangle, part),
            Light::Point(l) => l.light(triangle, part),
            Light::Directional(l) => l.light(triangle, part),
        }
    }

    fn is_on(&self) -> bool {
        match self {
            Light::Ambient(l) => l.is_on(),
            Light::Point(l) => l.is_on(),
            Light::Directional(l) => l.is_on(),
        }
    }
}

/// A light as handed over by an asset importer.
#[derive(Clone, Debug, PartialEq)]
pub struct LightDescriptor {
    pub name: String,
    /// `"ambient"`, `"point"` or `"directional"`.
    pub kind: String,
    pub color: Vec3,
    pub intensity: f32,
    /// Point light range. Absent or infinite means no cutoff.
    pub range: Option<f32>,
    pub position: Vec3,
    pub rotation: Quat,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::primitives;
    use glam::{Mat4, Vec4};

    fn facing_triangle() -> (Model, Camera) {
        let mesh = primitives::triangle(
            "tri",
            [
                Vec3::new(-1.0, -1.0, 0.0),
                Vec3::new(1.0, -1.0, 0.0),
                Vec3::new(0.0, 1.0, 0.0),
            ],
            Vec4::ONE,
            None,
        );
        let mut camera = Camera::new(16, 16);
        camera.position = Vec3::new(0.0, 0.0, 5.0);
        (Model::new("tri", mesh), camera)
    }

    fn evaluate(light: &mut Light, model: &Model, camera: &Camera) -> [f32; 9] {
        light.begin_render();
        light.begin_model(model, camera);
        let part = &model.mesh.as_ref().unwrap().parts[0];
        light.light(&part.triangles[0], part)
    }

    #[test]
    fn ambient_is_constant() {
        let (model, camera) = facing_triangle();
        let mut light = Light::from(AmbientLight::new("amb", Vec3::new(0.5, 0.25, 1.0), 2.0));
        let out = evaluate(&mut light, &model, &camera);
        assert_eq!(out, [1.0, 0.5, 2.0, 1.0, 0.5, 2.0, 1.0, 0.5, 2.0]);
    }

    #[test]
    fn directional_lights_front_face() {
        let (model, camera) = facing_triangle();
        let mut light = Light::from(DirectionalLight::from_direction(
            "sun",
            Vec3::NEG_Z,
            Vec3::ONE,
            1.0,
        ));
        let out = evaluate(&mut light, &model, &camera);
        for v in out {
            assert!((v - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn directional_is_dark_when_viewed_from_behind() {
        let (model, mut camera) = facing_triangle();
        camera.position = Vec3::new(0.0, 0.0, -5.0);
        let mut light = Light::from(DirectionalLight::from_direction(
            "sun",
            Vec3::NEG_Z,
            Vec3::ONE,
            1.0,
        ));
        assert_eq!(evaluate(&mut light, &model, &camera), [0.0; 9]);
    }

    #[test]
    fn directional_follows_model_rotation() {
        let (model, camera) = facing_triangle();
        // Turned to face +X, away from a light travelling along -Z.
        let model = model.with_transform(Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2));
        let mut light = Light::from(DirectionalLight::from_direction(
            "sun",
            Vec3::NEG_Z,
            Vec3::ONE,
            1.0,
        ));
        let out = evaluate(&mut light, &model, &camera);
        assert!(out.iter().all(|v| v.abs() < 1e-5));
    }

    #[test]
    fn point_light_at_vertex_doubles_diffuse() {
        let (model, camera) = facing_triangle();
        let part = &model.mesh.as_ref().unwrap().parts[0];
        let vertex = part.vertices[0].position;
        let mut light = Light::from(PointLight::new(
            "bulb",
            vertex + Vec3::Z * 1e-3,
            Vec3::ONE,
            1.0,
        ));
        let out = evaluate(&mut light, &model, &camera);
        assert!((out[0] - 2.0).abs() < 1e-3, "{:?}", out);
    }

    #[test]
    fn point_light_behind_face_contributes_nothing() {
        let (model, camera) = facing_triangle();
        let mut light = Light::from(PointLight::new(
            "bulb",
            Vec3::new(0.0, 0.0, -2.0),
            Vec3::ONE,
            1.0,
        ));
        assert_eq!(evaluate(&mut light, &model, &camera), [0.0; 9]);
    }

    #[test]
    fn point_light_range_reaches_zero() {
        let (model, camera) = facing_triangle();
        let mut light = Light::from(
            PointLight::new("bulb", Vec3::new(0.0, 0.0, 10.0), Vec3::ONE, 1.0).with_distance(5.0),
        );
        assert_eq!(evaluate(&mut light, &model, &camera), [0.0; 9]);
    }

    #[test]
    fn point_light_works_in_model_space() {
        let (model, camera) = facing_triangle();
        let moved = model
            .clone()
            .with_transform(Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0)));
        let mut camera_moved = Camera::new(16, 16);
        camera_moved.position = camera.position + Vec3::new(3.0, 0.0, 0.0);

        let mut near = Light::from(PointLight::new("a", Vec3::new(0.0, 0.0, 2.0), Vec3::ONE, 1.0));
        let mut far = Light::from(PointLight::new("b", Vec3::new(3.0, 0.0, 2.0), Vec3::ONE, 1.0));

        let a = evaluate(&mut near, &model, &camera);
        let b = evaluate(&mut far, &moved, &camera_moved);
        for (x, y) in a.iter().zip(b.iter()) {
            assert!((x - y).abs() < 1e-5);
        }
    }

    #[test]
    fn descriptors_map_to_lights() {
        let mut desc = LightDescriptor {
            name: String::from("lamp"),
            kind: String::from("point"),
            color: Vec3::ONE,
            intensity: 500.0,
            range: Some(f32::INFINITY),
            position: Vec3::Y,
            rotation: Quat::IDENTITY,
        };

        match Light::from_descriptor(&desc) {
            Some(Light::Point(p)) => {
                assert_eq!(p.energy, 0.5);
                assert_eq!(p.distance, None);
            }
            other => panic!("unexpected {:?}", other),
        }

        desc.kind = String::from("spot");
        assert!(Light::from_descriptor(&desc).is_none());
    }
}
