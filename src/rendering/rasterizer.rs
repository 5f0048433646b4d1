/// Software triangle rasterizer
/// Edge-function scan over the screen-space bounding box, sampling pixel centres
use glam::{Vec2, Vec4};

use super::framebuffer::Image;
use crate::{count_add, count_call};
use crate::perf::PIPELINE_COUNTERS;

/// Triangles with less than this much (doubled) screen area are skipped.
const MIN_TRIANGLE_AREA: f32 = 1e-6;

/// A projected vertex ready for rasterization.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct RasterVertex {
    /// Screen position in pixels, origin top-left, +y down.
    pub position: Vec2,
    /// Linear depth in [0, 1].
    pub depth: f32,
    /// Straight-alpha colour (vertex colour times lighting).
    pub color: Vec4,
    pub uv: Vec2,
}

/// Interpolated attributes at one covered pixel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Fragment {
    pub x: usize,
    pub y: usize,
    pub color: Vec4,
    pub uv: Vec2,
    pub depth: f32,
}

/// Edge function for barycentric coordinates
/// Returns 2x the signed area of the triangle
#[inline]
pub fn edge_function(a: Vec2, b: Vec2, c: Vec2) -> f32 {
    (c.x - a.x) * (b.y - a.y) - (c.y - a.y) * (b.x - a.x)
}

/// Top-left fill rule for edge a -> b of a positive-area triangle, so pixels
/// on an edge shared by two triangles are drawn exactly once.
#[inline]
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    (a.y == b.y && b.x < a.x) || b.y > a.y
}

#[inline]
fn covers(w: f32, top_left: bool) -> bool {
    w > 0.0 || (w == 0.0 && top_left)
}

/// Rasterize a flat list of triangles (three vertices each) into `target`.
///
/// Both windings are filled; culling happens before vertices get here.
/// `shade` receives each covered fragment and the current destination pixel
/// and returns the value to store, or `None` to leave the pixel untouched.
/// Returns the number of pixels written.
pub fn draw_triangles<F>(target: &mut Image, vertices: &[RasterVertex], mut shade: F) -> usize
where
    F: FnMut(&Fragment, Vec4) -> Option<Vec4>,
{
    let written: usize = vertices
        .chunks_exact(3)
        .map(|tri| draw_triangle(target, [tri[0], tri[1], tri[2]], &mut shade))
        .sum();
    count_add!(PIPELINE_COUNTERS.fragments_written, written);
    written
}

fn draw_triangle<F>(target: &mut Image, tri: [RasterVertex; 3], shade: &mut F) -> usize
where
    F: FnMut(&Fragment, Vec4) -> Option<Vec4>,
{
    if target.width == 0 || target.height == 0 {
        return 0;
    }

    // Normalise to positive area so one coverage test serves both windings.
    let [v0, mut v1, mut v2] = tri;
    let mut area = edge_function(v0.position, v1.position, v2.position);
    if area < 0.0 {
        std::mem::swap(&mut v1, &mut v2);
        area = -area;
    }
    if area < MIN_TRIANGLE_AREA {
        return 0;
    }

    let (p0, p1, p2) = (v0.position, v1.position, v2.position);

    let min_x = p0.x.min(p1.x).min(p2.x).floor().max(0.0) as i64;
    let max_x = (p0.x.max(p1.x).max(p2.x).ceil() as i64).min(target.width as i64 - 1);
    let min_y = p0.y.min(p1.y).min(p2.y).floor().max(0.0) as i64;
    let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as i64).min(target.height as i64 - 1);
    if min_x > max_x || min_y > max_y {
        return 0;
    }

    let tl0 = is_top_left(p1, p2);
    let tl1 = is_top_left(p2, p0);
    let tl2 = is_top_left(p0, p1);
    let inv_area = 1.0 / area;
    let mut written = 0;

    for y in min_y..=max_y {
        let y = y as usize;
        for x in min_x..=max_x {
            let x = x as usize;
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

            let w0 = edge_function(p1, p2, p);
            let w1 = edge_function(p2, p0, p);
            let w2 = edge_function(p0, p1, p);
            if !(covers(w0, tl0) && covers(w1, tl1) && covers(w2, tl2)) {
                continue;
            }

            let (b0, b1, b2) = (w0 * inv_area, w1 * inv_area, w2 * inv_area);
            let fragment = Fragment {
                x,
                y,
                color: v0.color * b0 + v1.color * b1 + v2.color * b2,
                uv: v0.uv * b0 + v1.uv * b1 + v2.uv * b2,
                depth: v0.depth * b0 + v1.depth * b1 + v2.depth * b2,
            };
            count_call!(PIPELINE_COUNTERS.fragments_shaded);

            let index = target.index(x, y);
            let pixels = target.pixels_mut();
            if let Some(value) = shade(&fragment, pixels[index]) {
                pixels[index] = value;
                written += 1;
            }
        }
    }

    written
}
