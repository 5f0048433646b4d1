use glam::Vec3;

use super::LightSource;
use crate::camera::Camera;
use crate::scene::{MeshPart, Model, Triangle};

/// Omnidirectional light at a world position.
#[derive(Clone, Debug, PartialEq)]
pub struct PointLight {
    pub name: String,
    pub position: Vec3,
    pub color: Vec3,
    pub energy: f32,
    /// Distance at which the light fades out completely. `None` uses an
    /// inverse-square style falloff with no cutoff.
    pub distance: Option<f32>,
    pub on: bool,

    // Light and camera positions in the current model's local space.
    local_light: Vec3,
    local_camera: Vec3,
}

impl PointLight {
    pub fn new(name: impl Into<String>, position: Vec3, color: Vec3, energy: f32) -> Self {
        Self {
            name: name.into(),
            position,
            color,
            energy,
            distance: None,
            on: true,
            local_light: position,
            local_camera: Vec3::ZERO,
        }
    }

    /// Zero or a negative distance means no cutoff.
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = (distance > 0.0).then_some(distance);
        self
    }

    /// Scalar applied to the light colour for a vertex with `normal` at `position`,
    /// both in model space. `eye` is the unit camera direction from the triangle.
    #[inline]
    fn diffuse_factor(&self, position: Vec3, normal: Vec3, eye: Vec3) -> f32 {
        if normal.dot(eye) < 0.0 {
            return 0.0;
        }

        let to_light = (self.local_light - position).normalize_or_zero();
        let diffuse = normal.dot(to_light).max(0.0);
        if diffuse == 0.0 {
            return 0.0;
        }

        let distance_sq = self.local_light.distance_squared(position);
        match self.distance.filter(|range| *range > 0.0) {
            None => diffuse * 2.0 / (1.0 + 0.1 * distance_sq),
            Some(range) => {
                let falloff = 1.0 - (distance_sq / (range * range)).powi(4);
                diffuse * falloff.clamp(0.0, 1.0)
            }
        }
    }
}

impl LightSource for PointLight {
    fn begin_render(&mut self) {}

    /// Move the light and camera into the model's space instead of moving
    /// every vertex into world space. Relative geometry is unchanged.
    fn begin_model(&mut self, model: &Model, camera: &Camera) {
        let inverse = model.transform().inverse();
        self.local_light = inverse.transform_point3(self.position);
        self.local_camera = inverse.transform_point3(camera.position);
    }

    fn light(&self, triangle: &Triangle, part: &MeshPart) -> [f32; 9] {
        let eye = (self.local_camera - triangle.center).normalize_or_zero();
        let mut out = [0.0; 9];
        for (i, vertex) in part.triangle_vertices(triangle).into_iter().enumerate() {
            let factor = self.diffuse_factor(vertex.position, vertex.normal, eye) * self.energy;
            let c = self.color * factor;
            out[i * 3..i * 3 + 3].copy_from_slice(&[c.x, c.y, c.z]);
        }
        out
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
