use glam::Vec3;

use super::LightSource;
use crate::camera::Camera;
use crate::scene::{MeshPart, Model, Triangle};

/// Uniform light added to every vertex regardless of geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct AmbientLight {
    pub name: String,
    pub color: Vec3,
    pub energy: f32,
    pub on: bool,
}

impl AmbientLight {
    pub fn new(name: impl Into<String>, color: Vec3, energy: f32) -> Self {
        Self {
            name: name.into(),
            color,
            energy,
            on: true,
        }
    }
}

impl LightSource for AmbientLight {
    fn begin_render(&mut self) {}

    fn begin_model(&mut self, _model: &Model, _camera: &Camera) {}

    fn light(&self, _triangle: &Triangle, _part: &MeshPart) -> [f32; 9] {
        let c = self.color * self.energy;
        [c.x, c.y, c.z, c.x, c.y, c.z, c.x, c.y, c.z]
    }

    fn is_on(&self) -> bool {
        self.on
    }
}
