/// Render targets for software rendering
/// Stores colour, encoded depth and the compositing intermediates
///
/// Every image is row-major premultiplied RGBA in f32. A cleared pixel is
/// transparent black, which for depth images means "nothing written".
use glam::{Vec4, Vec4Swizzles};

use crate::error::{RenderError, RenderResult};

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    pub width: usize,
    pub height: usize,
    pixels: Vec<Vec4>,
}

impl Image {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; width * height],
        }
    }

    /// Reset every pixel to transparent black.
    pub fn clear(&mut self) {
        self.pixels.fill(Vec4::ZERO);
    }

    pub fn fill(&mut self, color: Vec4) {
        self.pixels.fill(color);
    }

    /// Resize and clear.
    pub fn resize(&mut self, width: usize, height: usize) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width * height, Vec4::ZERO);
    }

    #[inline]
    pub fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Pixel at (x, y), or `None` outside the image.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Vec4> {
        if x < self.width && y < self.height {
            Some(self.pixels[self.index(x, y)])
        } else {
            None
        }
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: Vec4) {
        if x < self.width && y < self.height {
            let index = self.index(x, y);
            self.pixels[index] = value;
        }
    }

    #[inline]
    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    #[inline]
    pub fn pixels_mut(&mut self) -> &mut [Vec4] {
        &mut self.pixels
    }

    /// Pack into `0xAARRGGBB`, the layout window surfaces expect.
    pub fn write_argb(&self, out: &mut [u32]) {
        for (dst, src) in out.iter_mut().zip(&self.pixels) {
            *dst = pack_argb(*src);
        }
    }

    pub fn to_argb(&self) -> Vec<u32> {
        let mut out = vec![0; self.pixels.len()];
        self.write_argb(&mut out);
        out
    }
}

/// Straight alpha to premultiplied.
#[inline]
pub fn premultiply(color: Vec4) -> Vec4 {
    (color.xyz() * color.w).extend(color.w)
}

/// Porter-Duff source-over for premultiplied colours.
#[inline]
pub fn blend_over(dst: Vec4, src: Vec4) -> Vec4 {
    src + dst * (1.0 - src.w)
}

/// Convert a premultiplied pixel to ARGB u32
#[inline]
pub fn pack_argb(pixel: Vec4) -> u32 {
    let c = pixel.clamp(Vec4::ZERO, Vec4::ONE) * 255.0 + Vec4::splat(0.5);
    ((c.w as u32) << 24) | ((c.x as u32) << 16) | ((c.y as u32) << 8) | (c.z as u32)
}

/// The camera's buffers: persistent colour and depth plus the three
/// same-sized intermediates used only while compositing one part.
/// All five are always resized together.
#[derive(Clone, Debug)]
pub struct RenderTargets {
    pub color: Image,
    pub depth: Image,
    pub color_intermediate: Image,
    pub depth_intermediate: Image,
    pub clip_intermediate: Image,
}

impl RenderTargets {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            color: Image::new(width, height),
            depth: Image::new(width, height),
            color_intermediate: Image::new(width, height),
            depth_intermediate: Image::new(width, height),
            clip_intermediate: Image::new(width, height),
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.color.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.color.height
    }

    /// Clear the persistent colour and depth buffers.
    pub fn clear(&mut self) {
        self.color.clear();
        self.depth.clear();
    }

    pub fn resize(&mut self, width: usize, height: usize) -> RenderResult<()> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidDimensions { width, height });
        }
        log::debug!("resizing render targets to {}x{}", width, height);
        for image in [
            &mut self.color,
            &mut self.depth,
            &mut self.color_intermediate,
            &mut self.depth_intermediate,
            &mut self.clip_intermediate,
        ] {
            image.resize(width, height);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blend_over_opaque_replaces() {
        let dst = Vec4::new(0.2, 0.3, 0.4, 1.0);
        let src = Vec4::new(1.0, 0.0, 0.0, 1.0);
        assert_eq!(blend_over(dst, src), src);
        assert_eq!(blend_over(dst, Vec4::ZERO), dst);
    }

    #[test]
    fn blend_over_half_alpha_mixes() {
        let dst = Vec4::new(0.0, 0.0, 1.0, 1.0);
        let src = premultiply(Vec4::new(1.0, 0.0, 0.0, 0.5));
        assert_eq!(blend_over(dst, src), Vec4::new(0.5, 0.0, 0.5, 1.0));
    }

    #[test]
    fn pack_argb_rounds_channels() {
        assert_eq!(pack_argb(Vec4::new(1.0, 0.0, 0.0, 1.0)), 0xFFFF0000);
        assert_eq!(pack_argb(Vec4::ZERO), 0);
    }

    #[test]
    fn resize_keeps_targets_paired() {
        let mut targets = RenderTargets::new(4, 4);
        targets.color.set(1, 1, Vec4::ONE);
        targets.resize(8, 2).unwrap();

        for image in [
            &targets.color,
            &targets.depth,
            &targets.color_intermediate,
            &targets.depth_intermediate,
            &targets.clip_intermediate,
        ] {
            assert_eq!((image.width, image.height), (8, 2));
            assert!(image.pixels().iter().all(|p| *p == Vec4::ZERO));
        }

        assert!(targets.resize(0, 3).is_err());
    }
}
