use glam::{Mat4, Quat, Vec3};

use super::LightSource;
use crate::camera::Camera;
use crate::scene::{MeshPart, Model, Triangle};

/// Infinitely distant light. It shines along its local -Z axis.
#[derive(Clone, Debug, PartialEq)]
pub struct DirectionalLight {
    pub name: String,
    pub rotation: Quat,
    pub color: Vec3,
    pub energy: f32,
    pub on: bool,

    // Unit vector pointing back towards the light, cached per frame.
    to_light: Vec3,
    // Model transform with its translation removed.
    model_rotation: Mat4,
    // Camera position relative to the model origin.
    relative_camera: Vec3,
}

impl DirectionalLight {
    pub fn new(name: impl Into<String>, rotation: Quat, color: Vec3, energy: f32) -> Self {
        Self {
            name: name.into(),
            rotation,
            color,
            energy,
            on: true,
            to_light: rotation * Vec3::Z,
            model_rotation: Mat4::IDENTITY,
            relative_camera: Vec3::ZERO,
        }
    }

    /// A light shining along `direction`.
    pub fn from_direction(name: impl Into<String>, direction: Vec3, color: Vec3, energy: f32) -> Self {
        let direction = direction.try_normalize().unwrap_or(Vec3::NEG_Z);
        let rotation = Quat::from_rotation_arc(Vec3::NEG_Z, direction);
        Self::new(name, rotation, color, energy)
    }

    /// World-space direction the light travels.
    pub fn direction(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }
}

impl LightSource for DirectionalLight {
    fn begin_render(&mut self) {
        self.to_light = (self.rotation * Vec3::Z).normalize_or_zero();
    }

    fn begin_model(&mut self, model: &Model, camera: &Camera) {
        let mut rotation = *model.transform();
        rotation.w_axis = glam::Vec4::W;
        self.model_rotation = rotation;
        self.relative_camera = camera.position - model.world_position();
    }

    fn light(&self, triangle: &Triangle, part: &MeshPart) -> [f32; 9] {
        let center = self.model_rotation.transform_point3(triangle.center);
        let eye = (self.relative_camera - center).normalize_or_zero();

        let mut out = [0.0; 9];
        for (i, vertex) in part.triangle_vertices(triangle).into_iter().enumerate() {
            let normal = self
                .model_rotation
                .transform_vector3(vertex.normal)
                .normalize_or_zero();
            let factor = if normal.dot(eye) < 0.0 {
                0.0
            } else {
                normal.dot(self.to_light).max(0.0)
            };
            let c = self.color * factor * self.energy;
            out[i * 3..i * 3 + 3].copy_from_slice(&[c.x, c.y, c.z]);
        }
        out
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
