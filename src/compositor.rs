// src/compositor.rs

//! Source-over alpha blending: the single path through which color reaches the
//! framebuffer.
//!
//! Channels are mixed with integer arithmetic, rounding half up:
//! `(src * a + dst * (255 - a) + 127) / 255`. The result is always opaque; blends do
//! not accumulate transparency.

use crate::color::Color;
use crate::error::DrawError;
use crate::framebuffer::FrameBuffer;

/// Blends `color` onto the pixel at `(x, y)`.
///
/// Returns [`DrawError::OutOfBounds`] and leaves the buffer untouched when the
/// coordinate is outside the grid.
pub fn blend(buffer: &mut FrameBuffer, x: i32, y: i32, color: Color) -> Result<(), DrawError> {
    let index = buffer
        .index_of(x, y)
        .ok_or(DrawError::OutOfBounds { x, y })?;
    let pixels = buffer.pixels_mut();
    pixels[index] = blend_over(pixels[index], color);
    Ok(())
}

/// Composites `src` over `dst` and returns the opaque result.
pub fn blend_over(dst: Color, src: Color) -> Color {
    let a = u32::from(src.a());
    if a == 255 {
        return src;
    }
    let inv = 255 - a;
    let mix = |s: u8, d: u8| ((u32::from(s) * a + u32::from(d) * inv + 127) / 255) as u8;
    Color::opaque(
        mix(src.r(), dst.r()),
        mix(src.g(), dst.g()),
        mix(src.b(), dst.b()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn half_red_over_green() {
        let out = blend_over(Color::opaque(0, 255, 0), Color::new(255, 0, 0, 128));
        assert_eq!(out, Color::new(128, 127, 0, 255));
    }

    #[test]
    fn opaque_source_replaces() {
        let src = Color::opaque(12, 34, 56);
        assert_eq!(blend_over(Color::opaque(200, 200, 200), src), src);
    }

    #[test]
    fn transparent_source_keeps_destination_but_forces_opaque() {
        let dst = Color::new(9, 8, 7, 0);
        assert_eq!(blend_over(dst, Color::TRANSPARENT), Color::opaque(9, 8, 7));
    }

    #[test]
    fn blend_writes_in_bounds() {
        let mut fb = FrameBuffer::new(4, 4, Color::opaque(0, 255, 0)).unwrap();
        blend(&mut fb, 2, 3, Color::new(255, 0, 0, 128)).unwrap();
        assert_eq!(fb.get(2, 3), Some(Color::new(128, 127, 0, 255)));
        assert_eq!(fb.get(3, 3), Some(Color::opaque(0, 255, 0)));
    }

    #[test]
    fn blend_rejects_out_of_bounds_without_mutation() {
        let mut fb = FrameBuffer::new(4, 4, Color::BLACK).unwrap();
        let before = fb.clone();
        for (x, y) in [(4, 0), (0, 4), (-1, 0), (0, -1), (i32::MAX, 2)] {
            let err = blend(&mut fb, x, y, Color::WHITE).unwrap_err();
            assert!(matches!(err, DrawError::OutOfBounds { x: ex, y: ey } if ex == x && ey == y));
        }
        assert_eq!(fb, before);
    }

    #[test]
    fn repeated_translucent_blends_converge() {
        let mut fb = FrameBuffer::new(1, 1, Color::BLACK).unwrap();
        for _ in 0..64 {
            blend(&mut fb, 0, 0, Color::new(255, 255, 255, 64)).unwrap();
        }
        let px = fb.get(0, 0).unwrap();
        assert!(px.r() >= 250, "expected near-white, got {px:?}");
        assert!(px.is_opaque());
    }
}
