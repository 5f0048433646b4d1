/// Positioned mesh instances
use glam::{Mat4, Vec3, Vec4};

use super::mesh::Mesh;

/// World- or local-space bounding sphere.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BoundingSphere {
    pub center: Vec3,
    pub radius: f32,
}

impl BoundingSphere {
    pub const fn new(center: Vec3, radius: f32) -> Self {
        Self { center, radius }
    }

    /// Sphere enclosing an axis-aligned box.
    pub fn from_bounds(min: Vec3, max: Vec3) -> Self {
        let center = (min + max) * 0.5;
        Self::new(center, (max - center).length())
    }

    #[inline]
    pub fn intersects(&self, other: &BoundingSphere) -> bool {
        let reach = self.radius + other.radius;
        self.center.distance_squared(other.center) <= reach * reach
    }

    /// Move into the space of `transform`, growing the radius by the largest
    /// axis scale so non-uniform scaling stays enclosed.
    pub fn transformed(&self, transform: &Mat4) -> Self {
        let scale = transform
            .x_axis
            .truncate()
            .length()
            .max(transform.y_axis.truncate().length())
            .max(transform.z_axis.truncate().length());
        Self::new(transform.transform_point3(self.center), self.radius * scale)
    }
}

/// A mesh placed in the world with a resolved world transform.
#[derive(Clone, Debug)]
pub struct Model {
    pub name: String,
    /// Models without a mesh are plain transforms and never render.
    pub mesh: Option<Mesh>,
    /// Tint multiplied into every fragment of every part.
    pub color: Vec4,
    pub visible: bool,
    pub frustum_culling: bool,
    transform: Mat4,
    local_sphere: BoundingSphere,
    bounding_sphere: BoundingSphere,
}

impl Model {
    pub fn new(name: impl Into<String>, mesh: Mesh) -> Self {
        let mut model = Self {
            name: name.into(),
            mesh: Some(mesh),
            color: Vec4::ONE,
            visible: true,
            frustum_culling: true,
            transform: Mat4::IDENTITY,
            local_sphere: BoundingSphere::new(Vec3::ZERO, 0.0),
            bounding_sphere: BoundingSphere::new(Vec3::ZERO, 0.0),
        };
        model.update_bounds();
        model
    }

    /// A mesh-less model that only carries a transform.
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mesh: None,
            color: Vec4::ONE,
            visible: true,
            frustum_culling: true,
            transform: Mat4::IDENTITY,
            local_sphere: BoundingSphere::new(Vec3::ZERO, 0.0),
            bounding_sphere: BoundingSphere::new(Vec3::ZERO, 0.0),
        }
    }

    pub fn with_transform(mut self, transform: Mat4) -> Self {
        self.set_transform(transform);
        self
    }

    #[inline]
    pub fn transform(&self) -> &Mat4 {
        &self.transform
    }

    pub fn set_transform(&mut self, transform: Mat4) {
        self.transform = transform;
        self.bounding_sphere = self.local_sphere.transformed(&self.transform);
    }

    /// Recompute the cached bounding sphere after the mesh changed.
    pub fn update_bounds(&mut self) {
        self.local_sphere = self
            .mesh
            .as_ref()
            .and_then(Mesh::local_bounds)
            .map(|(min, max)| BoundingSphere::from_bounds(min, max))
            .unwrap_or(BoundingSphere::new(Vec3::ZERO, 0.0));
        self.bounding_sphere = self.local_sphere.transformed(&self.transform);
    }

    /// Cached world-space bounding sphere.
    #[inline]
    pub fn bounding_sphere(&self) -> &BoundingSphere {
        &self.bounding_sphere
    }

    #[inline]
    pub fn world_position(&self) -> Vec3 {
        self.transform.w_axis.truncate()
    }

    /// Pose one part into clip space for this frame. This is the seam where
    /// externally skinned vertex positions meet the renderer.
    pub fn transform_part(&mut self, part_index: usize, view_proj: &Mat4) {
        let mvp = *view_proj * self.transform;
        if let Some(part) = self
            .mesh
            .as_mut()
            .and_then(|mesh| mesh.parts.get_mut(part_index))
        {
            part.transform(&mvp);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::primitives;

    #[test]
    fn spheres_touching_intersect() {
        let a = BoundingSphere::new(Vec3::ZERO, 1.0);
        let b = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        let c = BoundingSphere::new(Vec3::new(2.5, 0.0, 0.0), 1.0);
        assert!(a.intersects(&b));
        assert!(!a.intersects(&c));
    }

    #[test]
    fn world_sphere_follows_transform_and_scale() {
        let model = Model::new("cube", primitives::cube("cube", None)).with_transform(
            Mat4::from_scale_rotation_translation(
                Vec3::new(1.0, 3.0, 1.0),
                glam::Quat::IDENTITY,
                Vec3::new(0.0, 0.0, -10.0),
            ),
        );

        let sphere = model.bounding_sphere();
        assert_eq!(sphere.center, Vec3::new(0.0, 0.0, -10.0));
        // Unit cube radius is sqrt(3)/2, scaled by the largest axis.
        assert!((sphere.radius - 3.0_f32.sqrt() * 0.5 * 3.0).abs() < 1e-5);
        assert_eq!(model.world_position(), Vec3::new(0.0, 0.0, -10.0));
    }
}
