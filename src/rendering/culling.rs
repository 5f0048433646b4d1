/// Coarse visibility tests run before rasterization
///
/// Nothing here clips geometry. Triangles are either kept whole or rejected,
/// and the frustum is approximated by a single sphere.
use std::cmp::Ordering;

use glam::{Vec2, Vec3, Vec4};

use crate::scene::BoundingSphere;

/// Extra room on the frustum sphere radius.
const FRUSTUM_SPHERE_MARGIN: f32 = 1.5;

/// Sphere roughly enclosing the view volume between `near` and `far` along `forward`.
pub fn frustum_sphere(position: Vec3, forward: Vec3, near: f32, far: f32) -> BoundingSphere {
    let half_depth = (far - near) * 0.5;
    BoundingSphere::new(
        position + forward * (near + half_depth),
        half_depth * FRUSTUM_SPHERE_MARGIN,
    )
}

/// True when all three vertices are behind the camera or past the far limit.
///
/// Perspective clip space puts points behind the camera at negative w.
/// Orthographic w is always 1, so there the test is z before the near plane.
/// `far_limit` is the clip-space z of the far plane: `far` for perspective
/// projections, 1 for orthographic ones.
#[inline]
pub fn behind_or_beyond(clip: &[Vec4; 3], perspective: bool, far_limit: f32) -> bool {
    let behind = if perspective {
        clip.iter().all(|p| p.w < 0.0)
    } else {
        clip.iter().all(|p| p.z < 0.0)
    };
    behind || clip.iter().all(|p| p.z > far_limit)
}

/// True when all three points lie beyond the same screen edge.
#[inline]
pub fn offscreen(screen: &[Vec2; 3], width: f32, height: f32) -> bool {
    screen.iter().all(|p| p.x < 0.0)
        || screen.iter().all(|p| p.x > width)
        || screen.iter().all(|p| p.y < 0.0)
        || screen.iter().all(|p| p.y > height)
}

/// Screen-space winding test. Points are in pixels with +y down, so a
/// counter-clockwise world-space front face yields a negative cross product.
#[inline]
pub fn is_backfacing(screen: &[Vec2; 3]) -> bool {
    let n0 = screen[0] - screen[1];
    let n1 = screen[1] - screen[2];
    n0.perp_dot(n1) > 0.0
}

/// Stable sort, farthest first.
pub fn sort_back_to_front<T>(items: &mut [T], distance_sq: impl Fn(&T) -> f32) {
    items.sort_by(|a, b| {
        distance_sq(b)
            .partial_cmp(&distance_sq(a))
            .unwrap_or(Ordering::Equal)
    });
}
