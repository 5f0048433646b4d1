/// Full-screen compositing passes between the per-part intermediates and the
/// camera's persistent buffers. Rows are processed in parallel on rayon.
use glam::{Vec3, Vec4, Vec4Swizzles};
use rayon::prelude::*;

use super::depth::{closer_wins, decode_depth, is_unwritten};
use super::framebuffer::{blend_over, Image};

/// How fog modifies composited colour.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FogMode {
    #[default]
    Off,
    /// Brighten towards the fog colour.
    Additive,
    /// Darken by the fog colour.
    Subtractive,
    /// Blend towards the fog colour.
    Overwrite,
}

/// Depth-based fog applied while compositing colour.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Fog {
    pub mode: FogMode,
    pub color: Vec3,
    /// Normalised depths where fog starts and reaches full strength.
    pub range: [f32; 2],
}

impl Default for Fog {
    fn default() -> Self {
        Self {
            mode: FogMode::Off,
            color: Vec3::ZERO,
            range: [0.0, 1.0],
        }
    }
}

impl Fog {
    /// Apply fog to a premultiplied pixel at normalised `depth`.
    #[inline]
    pub fn apply(&self, pixel: Vec4, depth: f32) -> Vec4 {
        let d = smoothstep(self.range[0], self.range[1], depth);
        let alpha = pixel.w;
        let rgb = pixel.xyz();
        let rgb = match self.mode {
            FogMode::Off => return pixel,
            FogMode::Additive => rgb + self.color * d * alpha,
            FogMode::Subtractive => (rgb - self.color * d * alpha).max(Vec3::ZERO),
            FogMode::Overwrite => rgb.lerp(self.color * alpha, d),
        };
        rgb.extend(alpha)
    }
}

#[inline]
fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    if edge1 <= edge0 {
        return if x < edge0 { 0.0 } else { 1.0 };
    }
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

fn for_each_row<F>(dst: &mut Image, src: &Image, f: F)
where
    F: Fn(&mut [Vec4], &[Vec4]) + Sync + Send,
{
    let width = dst.width.max(1);
    dst.pixels_mut()
        .par_chunks_mut(width)
        .zip(src.pixels().par_chunks(width))
        .for_each(|(dst_row, src_row)| f(dst_row, src_row));
}

/// Closer-wins copy of every written pixel of `src` onto `dst`.
///
/// Used both to merge a part's depth intermediate into the persistent depth
/// buffer and to fold the alpha-clip intermediate into the depth intermediate.
pub fn composite_depth(dst: &mut Image, src: &Image) {
    for_each_row(dst, src, |dst_row, src_row| {
        for (d, s) in dst_row.iter_mut().zip(src_row) {
            if !is_unwritten(*s) && closer_wins(*d, decode_depth(*s)) {
                *d = *s;
            }
        }
    });
}

/// Blend `color` over `dst` wherever `depth_mask` holds a written depth,
/// applying fog at that depth. Unmasked pixels are dropped.
pub fn composite_color(dst: &mut Image, color: &Image, depth_mask: &Image, fog: &Fog) {
    let width = dst.width.max(1);
    dst.pixels_mut()
        .par_chunks_mut(width)
        .zip(color.pixels().par_chunks(width))
        .zip(depth_mask.pixels().par_chunks(width))
        .for_each(|((dst_row, color_row), mask_row)| {
            for ((d, c), m) in dst_row.iter_mut().zip(color_row).zip(mask_row) {
                if is_unwritten(*m) || c.w <= 0.0 {
                    continue;
                }
                *d = blend_over(*d, fog.apply(*c, decode_depth(*m)));
            }
        });
}
