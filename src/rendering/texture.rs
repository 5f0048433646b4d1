/// Material textures sampled by the colour and alpha-clip passes.
/// Texels are straight (non-premultiplied) RGBA in `[0, 1]`.

use glam::{Vec2, Vec4};

use crate::error::{RenderError, RenderResult};

/// How UVs outside `[0, 1]` are resolved.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum WrapMode {
    #[default]
    Repeat,
    Clamp,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Texture {
    pub width: usize,
    pub height: usize,
    pub wrap: WrapMode,
    texels: Vec<Vec4>,
}

impl Texture {
    /// Build a texture from row-major texels, top row first.
    pub fn new(width: usize, height: usize, texels: Vec<Vec4>) -> RenderResult<Self> {
        let expected = width * height;
        if expected == 0 || texels.len() != expected {
            return Err(RenderError::InvalidTexture {
                width,
                height,
                expected,
                texels: texels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            wrap: WrapMode::Repeat,
            texels,
        })
    }

    /// A 1x1 texture of a single colour.
    pub fn solid(color: Vec4) -> Self {
        Self {
            width: 1,
            height: 1,
            wrap: WrapMode::Repeat,
            texels: vec![color],
        }
    }

    /// Two-colour checkerboard with `cell`-sized squares.
    pub fn checkerboard(size: usize, cell: usize, a: Vec4, b: Vec4) -> Self {
        let size = size.max(1);
        let cell = cell.max(1);
        let texels = (0..size * size)
            .map(|i| {
                let (x, y) = (i % size, i / size);
                if ((x / cell) + (y / cell)) % 2 == 0 {
                    a
                } else {
                    b
                }
            })
            .collect();
        Self {
            width: size,
            height: size,
            wrap: WrapMode::Repeat,
            texels,
        }
    }

    pub fn with_wrap(mut self, wrap: WrapMode) -> Self {
        self.wrap = wrap;
        self
    }

    #[inline]
    pub fn texel(&self, x: usize, y: usize) -> Vec4 {
        self.texels[y * self.width + x]
    }

    pub fn texels(&self) -> &[Vec4] {
        &self.texels
    }

    /// Nearest-neighbour sample. V grows upwards in UV space while rows are
    /// stored top first, so the row is taken from `1 - v`.
    #[inline]
    pub fn sample(&self, uv: Vec2) -> Vec4 {
        let fx = (uv.x * self.width as f32).floor() as i64;
        let fy = ((1.0 - uv.y) * self.height as f32).floor() as i64;
        let x = Self::wrap_coord(fx, self.width, self.wrap);
        let y = Self::wrap_coord(fy, self.height, self.wrap);
        self.texel(x, y)
    }

    #[inline]
    fn wrap_coord(c: i64, size: usize, wrap: WrapMode) -> usize {
        let size = size as i64;
        match wrap {
            WrapMode::Repeat => c.rem_euclid(size) as usize,
            WrapMode::Clamp => c.clamp(0, size - 1) as usize,
        }
    }

    /// True if any texel is not fully opaque.
    pub fn has_partial_alpha(&self) -> bool {
        self.texels.iter().any(|t| t.w < 1.0)
    }
}

/// 1x1 opaque white image used wherever a material has no texture.
pub fn default_texture() -> &'static Texture {
    &WHITE
}

lazy_static::lazy_static! {
    static ref WHITE: Texture = Texture::solid(Vec4::ONE);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_mismatched_texel_count() {
        let err = Texture::new(2, 2, vec![Vec4::ONE; 3]).unwrap_err();
        assert_eq!(
            err,
            RenderError::InvalidTexture {
                width: 2,
                height: 2,
                expected: 4,
                texels: 3
            }
        );
    }

    #[test]
    fn sample_flips_v_and_wraps() {
        let red = Vec4::new(1.0, 0.0, 0.0, 1.0);
        let blue = Vec4::new(0.0, 0.0, 1.0, 1.0);
        // Top row red, bottom row blue.
        let tex = Texture::new(1, 2, vec![red, blue]).unwrap();

        assert_eq!(tex.sample(Vec2::new(0.5, 0.9)), red);
        assert_eq!(tex.sample(Vec2::new(0.5, 0.1)), blue);
        assert_eq!(tex.sample(Vec2::new(1.5, 1.9)), red);

        let clamped = tex.with_wrap(WrapMode::Clamp);
        assert_eq!(clamped.sample(Vec2::new(0.5, -3.0)), blue);
    }

    #[test]
    fn default_texture_is_opaque_white() {
        let tex = default_texture();
        assert_eq!((tex.width, tex.height), (1, 1));
        assert_eq!(tex.sample(Vec2::new(0.3, 0.7)), Vec4::ONE);
        assert!(!tex.has_partial_alpha());
    }
}
