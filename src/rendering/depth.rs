/// Depth encoding shared by every depth-carrying image.
///
/// A linear depth `d` in `[0, 1]` is spread over three colour channels so an
/// 8-bit-per-channel back end keeps 1/65025 precision:
///
/// ```text
/// r = floor(d * 255) / 255
/// g = floor(fract(d * 255) * 255) / 255
/// b = fract(d * 255 * 255)
/// a = 1 (written) or 0 (nothing written here)
/// ```
///
/// Decoding is `r + g / 255 + b / 65025`. The arithmetic runs in f64, where
/// both products of an f32 depth are exact, so `floor` and `fract` always agree.
use glam::Vec4;

/// Smallest depth step carried by the blue channel.
pub const DEPTH_PRECISION: f32 = 1.0 / 65025.0;

#[inline]
pub fn encode_depth(depth: f32) -> Vec4 {
    let d = depth as f64;
    let r = (d * 255.0).floor() / 255.0;
    let g = ((d * 255.0).fract() * 255.0).floor() / 255.0;
    let b = (d * 255.0 * 255.0).fract();
    Vec4::new(r as f32, g as f32, b as f32, 1.0)
}

#[inline]
pub fn decode_depth(rgba: Vec4) -> f32 {
    (rgba.x as f64 + rgba.y as f64 / 255.0 + rgba.z as f64 / 65025.0) as f32
}

/// True if nothing has been written to this depth pixel.
#[inline]
pub fn is_unwritten(rgba: Vec4) -> bool {
    rgba.w == 0.0
}

/// Closer-wins rule: a fragment at `depth` replaces `existing` if the
/// destination is unwritten or strictly farther away.
#[inline]
pub fn closer_wins(existing: Vec4, depth: f32) -> bool {
    is_unwritten(existing) || depth < decode_depth(existing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_values() {
        assert_eq!(encode_depth(0.0), Vec4::new(0.0, 0.0, 0.0, 1.0));
        assert_eq!(encode_depth(1.0), Vec4::new(1.0, 0.0, 0.0, 1.0));

        let half = encode_depth(0.5);
        assert_eq!(half.x, 127.0 / 255.0);
        assert_eq!(half.y, 127.0 / 255.0);
        assert_eq!(half.z, 0.5);
        assert_eq!(decode_depth(half), 0.5);
    }

    #[test]
    fn closer_wins_against_unwritten_and_farther() {
        let empty = Vec4::ZERO;
        assert!(closer_wins(empty, 0.9));

        let written = encode_depth(0.4);
        assert!(closer_wins(written, 0.3));
        assert!(!closer_wins(written, 0.6));
    }
}
