/// Mesh data structures consumed by the render pipeline
use std::sync::Arc;

use glam::{Mat4, Vec2, Vec3, Vec4};
use rayon::prelude::*;

use super::material::Material;

/// Maximum number of triangles one mesh part may render in a single draw.
/// One draw is addressed with 16-bit indices, three per triangle.
pub const MAX_TRIANGLES_PER_PART: usize = u16::MAX as usize / 3;

/// Parts with more vertices than this are transformed on the rayon pool.
const PARALLEL_TRANSFORM_THRESHOLD: usize = 4096;

/// A single mesh vertex.
///
/// `position` is the local-space position after any external posing or
/// skinning step; the pipeline never evaluates bones itself, it only carries
/// the weights so the collaborator that poses the mesh can read them.
/// `transformed` is the clip-space cache written once per frame by
/// [`MeshPart::transform`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
    pub color: Vec4,
    pub weights: [f32; 4],
    pub bones: [u16; 4],
    pub transformed: Vec4,
}

impl Vertex {
    #[inline]
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Self {
        Self {
            position,
            normal,
            uv,
            color: Vec4::ONE,
            weights: [0.0; 4],
            bones: [0; 4],
            transformed: Vec4::ZERO,
        }
    }

    #[inline]
    pub fn with_color(mut self, color: Vec4) -> Self {
        self.color = color;
        self
    }
}

/// Three vertex indices into the owning part plus precomputed face data.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Triangle {
    pub indices: [usize; 3],
    /// Local-space centroid.
    pub center: Vec3,
    /// Local-space face normal (counter-clockwise winding is front).
    pub normal: Vec3,
    /// Cleared by an external visibility pass to skip the triangle.
    pub visible: bool,
    /// Stable draw-order index within the part.
    pub id: usize,
}

/// Ordered triangles sharing one material.
#[derive(Clone, Debug, Default)]
pub struct MeshPart {
    pub vertices: Vec<Vertex>,
    pub triangles: Vec<Triangle>,
    /// `None` renders as [`Material::default`].
    pub material: Option<Arc<Material>>,
}

impl MeshPart {
    pub fn new(material: Option<Arc<Material>>) -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
            material,
        }
    }

    /// Append a triangle made of three new vertices. Returns its draw-order id.
    pub fn add_triangle(&mut self, v0: Vertex, v1: Vertex, v2: Vertex) -> usize {
        let base = self.vertices.len();
        self.vertices.extend_from_slice(&[v0, v1, v2]);
        self.add_indexed_triangle([base, base + 1, base + 2])
    }

    /// Append a triangle over vertices already stored in the part.
    pub fn add_indexed_triangle(&mut self, indices: [usize; 3]) -> usize {
        let id = self.triangles.len();
        let (center, normal) = self.face_data(indices);
        self.triangles.push(Triangle {
            indices,
            center,
            normal,
            visible: true,
            id,
        });
        id
    }

    /// Recompute centroids and face normals after vertices were moved.
    pub fn recompute_face_data(&mut self) {
        for i in 0..self.triangles.len() {
            let (center, normal) = self.face_data(self.triangles[i].indices);
            self.triangles[i].center = center;
            self.triangles[i].normal = normal;
        }
    }

    fn face_data(&self, indices: [usize; 3]) -> (Vec3, Vec3) {
        let p0 = self.vertices[indices[0]].position;
        let p1 = self.vertices[indices[1]].position;
        let p2 = self.vertices[indices[2]].position;
        let center = (p0 + p1 + p2) / 3.0;
        let normal = (p1 - p0).cross(p2 - p0).normalize_or_zero();
        (center, normal)
    }

    #[inline]
    pub fn triangle_vertices(&self, tri: &Triangle) -> [&Vertex; 3] {
        [
            &self.vertices[tri.indices[0]],
            &self.vertices[tri.indices[1]],
            &self.vertices[tri.indices[2]],
        ]
    }

    /// Write every vertex's clip-space position for this frame.
    pub fn transform(&mut self, model_view_proj: &Mat4) {
        let mvp = *model_view_proj;
        let apply = |v: &mut Vertex| v.transformed = mvp * v.position.extend(1.0);

        if self.vertices.len() >= PARALLEL_TRANSFORM_THRESHOLD {
            self.vertices.par_iter_mut().for_each(apply);
        } else {
            self.vertices.iter_mut().for_each(apply);
        }
    }

    /// Local-space axis-aligned bounds of this part's vertices.
    pub fn local_bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = self.vertices.first()?.position;
        Some(self.vertices.iter().fold((first, first), |(min, max), v| {
            (min.min(v.position), max.max(v.position))
        }))
    }
}

/// An ordered sequence of mesh parts.
#[derive(Clone, Debug, Default)]
pub struct Mesh {
    pub name: String,
    pub parts: Vec<MeshPart>,
}

impl Mesh {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parts: Vec::new(),
        }
    }

    pub fn with_part(mut self, part: MeshPart) -> Self {
        self.parts.push(part);
        self
    }

    pub fn triangle_count(&self) -> usize {
        self.parts.iter().map(|p| p.triangles.len()).sum()
    }

    /// Local-space axis-aligned bounds over all parts.
    pub fn local_bounds(&self) -> Option<(Vec3, Vec3)> {
        self.parts
            .iter()
            .filter_map(MeshPart::local_bounds)
            .reduce(|(amin, amax), (bmin, bmax)| (amin.min(bmin), amax.max(bmax)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn v(x: f32, y: f32, z: f32) -> Vertex {
        Vertex::new(Vec3::new(x, y, z), Vec3::Z, Vec2::ZERO)
    }

    #[test]
    fn triangle_limit_matches_16_bit_indexing() {
        assert_eq!(MAX_TRIANGLES_PER_PART, 21_845);
    }

    #[test]
    fn add_triangle_computes_center_and_ccw_normal() {
        let mut part = MeshPart::new(None);
        let id = part.add_triangle(v(0.0, 0.0, 0.0), v(3.0, 0.0, 0.0), v(0.0, 3.0, 0.0));

        assert_eq!(id, 0);
        let tri = part.triangles[0];
        assert_eq!(tri.center, Vec3::new(1.0, 1.0, 0.0));
        assert_eq!(tri.normal, Vec3::Z);
        assert!(tri.visible);
    }

    #[test]
    fn transform_writes_clip_positions() {
        let mut part = MeshPart::new(None);
        part.add_triangle(v(1.0, 2.0, 3.0), v(0.0, 0.0, 0.0), v(0.0, 1.0, 0.0));

        part.transform(&Mat4::from_translation(Vec3::new(1.0, 0.0, 0.0)));

        assert_eq!(part.vertices[0].transformed, Vec4::new(2.0, 2.0, 3.0, 1.0));
        assert_eq!(part.vertices[1].transformed, Vec4::new(1.0, 0.0, 0.0, 1.0));
    }
}
