/// Procedural meshes for demos, tests and benchmarks
use std::sync::Arc;

use glam::{Vec2, Vec3, Vec4};
use noise::{NoiseFn, Perlin};

use super::material::Material;
use super::mesh::{Mesh, MeshPart, Vertex};

/// A single triangle with one vertex colour and a flat normal.
pub fn triangle(
    name: &str,
    corners: [Vec3; 3],
    color: Vec4,
    material: Option<Arc<Material>>,
) -> Mesh {
    let normal = (corners[1] - corners[0])
        .cross(corners[2] - corners[0])
        .normalize_or_zero();
    let uvs = [Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(0.5, 1.0)];

    let mut part = MeshPart::new(material);
    let verts: [Vertex; 3] =
        std::array::from_fn(|i| Vertex::new(corners[i], normal, uvs[i]).with_color(color));
    part.add_triangle(verts[0], verts[1], verts[2]);
    Mesh::new(name).with_part(part)
}

/// A `size` x `size` quad in the XY plane facing +Z.
pub fn quad(name: &str, size: f32, material: Option<Arc<Material>>) -> Mesh {
    let mut part = MeshPart::new(material);
    add_face(&mut part, Vec3::ZERO, Vec3::X * size * 0.5, Vec3::Y * size * 0.5, Vec3::Z);
    Mesh::new(name).with_part(part)
}

/// Unit cube centred on the origin with outward-facing, counter-clockwise faces.
pub fn cube(name: &str, material: Option<Arc<Material>>) -> Mesh {
    // (normal, u axis, v axis) with u x v == normal
    const FACES: [(Vec3, Vec3, Vec3); 6] = [
        (Vec3::Z, Vec3::X, Vec3::Y),
        (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
        (Vec3::X, Vec3::NEG_Z, Vec3::Y),
        (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::X, Vec3::NEG_Z),
        (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    ];

    let mut part = MeshPart::new(material);
    for (normal, u, v) in FACES {
        add_face(&mut part, normal * 0.5, u * 0.5, v * 0.5, normal);
    }
    Mesh::new(name).with_part(part)
}

fn add_face(part: &mut MeshPart, center: Vec3, u: Vec3, v: Vec3, normal: Vec3) {
    let base = part.vertices.len();
    let corners = [
        (center - u - v, Vec2::new(0.0, 0.0)),
        (center + u - v, Vec2::new(1.0, 0.0)),
        (center + u + v, Vec2::new(1.0, 1.0)),
        (center - u + v, Vec2::new(0.0, 1.0)),
    ];
    part.vertices
        .extend(corners.iter().map(|&(p, uv)| Vertex::new(p, normal, uv)));
    part.add_indexed_triangle([base, base + 1, base + 2]);
    part.add_indexed_triangle([base, base + 2, base + 3]);
}

/// Parameters for [`terrain`].
#[derive(Copy, Clone, Debug)]
pub struct TerrainConfig {
    /// World-space edge length of the square grid.
    pub size: f32,
    /// Quads per edge.
    pub resolution: usize,
    /// Peak height of the noise displacement.
    pub amplitude: f32,
    /// Noise frequency per world unit.
    pub frequency: f64,
    pub seed: u32,
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self {
            size: 40.0,
            resolution: 48,
            amplitude: 3.0,
            frequency: 0.08,
            seed: 12345,
        }
    }
}

/// Perlin-displaced height field in the XZ plane, facing +Y, coloured by height.
pub fn terrain(name: &str, config: &TerrainConfig, material: Option<Arc<Material>>) -> Mesh {
    let perlin = Perlin::new(config.seed);
    let res = config.resolution.max(1);
    let step = config.size / res as f32;
    let half = config.size * 0.5;

    let height = |x: f32, z: f32| -> f32 {
        perlin.get([x as f64 * config.frequency, z as f64 * config.frequency]) as f32
            * config.amplitude
    };

    let mut part = MeshPart::new(material);
    part.vertices.reserve((res + 1) * (res + 1));

    for i in 0..=res {
        for j in 0..=res {
            let x = -half + i as f32 * step;
            let z = -half + j as f32 * step;
            let y = height(x, z);

            // Central differences for a smooth normal.
            let dx = height(x + step, z) - height(x - step, z);
            let dz = height(x, z + step) - height(x, z - step);
            let normal = Vec3::new(-dx, 2.0 * step, -dz).normalize_or_zero();

            let t = ((y / config.amplitude.max(f32::EPSILON)) * 0.5 + 0.5).clamp(0.0, 1.0);
            let low = Vec4::new(0.25, 0.45, 0.2, 1.0);
            let high = Vec4::new(0.85, 0.85, 0.8, 1.0);

            part.vertices.push(
                Vertex::new(
                    Vec3::new(x, y, z),
                    normal,
                    Vec2::new(i as f32 / res as f32, j as f32 / res as f32),
                )
                .with_color(low.lerp(high, t)),
            );
        }
    }

    let index = |i: usize, j: usize| i * (res + 1) + j;
    for i in 0..res {
        for j in 0..res {
            part.add_indexed_triangle([index(i, j), index(i, j + 1), index(i + 1, j)]);
            part.add_indexed_triangle([index(i + 1, j), index(i, j + 1), index(i + 1, j + 1)]);
        }
    }

    Mesh::new(name).with_part(part)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_point_outwards() {
        let mesh = cube("cube", None);
        let part = &mesh.parts[0];
        assert_eq!(part.triangles.len(), 12);
        for tri in &part.triangles {
            // The centroid of an outward face lies along its normal.
            assert!(tri.normal.dot(tri.center) > 0.0, "{:?}", tri);
        }
    }

    #[test]
    fn terrain_faces_up() {
        let config = TerrainConfig {
            resolution: 4,
            ..Default::default()
        };
        let mesh = terrain("ground", &config, None);
        let part = &mesh.parts[0];
        assert_eq!(part.triangles.len(), 4 * 4 * 2);
        assert_eq!(part.vertices.len(), 5 * 5);
        assert!(part.triangles.iter().all(|t| t.normal.y > 0.0));
    }
}
