// src/filter/mod.rs

//! Box blur over the whole framebuffer.
//!
//! Each output pixel is the truncated mean of the RGB channels inside the window
//! `[x - radius/2, x + radius/2] x [y - radius/2, y + radius/2]`, clipped to the grid.
//! The divisor is the number of in-bounds samples, so edges and corners average
//! over fewer pixels. Nothing outside the grid is read and nothing wraps.
//!
//! The window sum is separable: a horizontal prefix-sum pass produces per-row
//! window sums, and a vertical prefix-sum pass over those yields the full window
//! sum. Cost per pixel does not depend on the radius.
//!
//! Output alpha is not averaged. The output grid starts as opaque black, so every
//! blurred pixel comes out with alpha 255.

use crate::color::Color;
use crate::error::DrawError;
use crate::framebuffer::{try_grid, FrameBuffer};
use log::debug;


/// Blurs `buffer` in place. The grid is swapped in one step once the new contents
/// are complete.
pub fn box_blur(buffer: &mut FrameBuffer, radius: u16) -> Result<(), DrawError> {
    let width = buffer.width() as usize;
    let height = buffer.height() as usize;
    let half = usize::from(radius / 2);

    let row_sums = horizontal_sums(buffer.pixels(), width, half);

    let mut out = try_grid(width * height, Color::BLACK)?;
    let mut column = vec![[0u64; 3]; height + 1];
    for x in 0..width {
        let (x_lo, x_hi) = window(x, half, width);
        let span_x = (x_hi - x_lo + 1) as u64;

        for y in 0..height {
            let s = row_sums[y * width + x];
            let p = column[y];
            column[y + 1] = [p[0] + s[0], p[1] + s[1], p[2] + s[2]];
        }

        for y in 0..height {
            let (y_lo, y_hi) = window(y, half, height);
            let count = span_x * (y_hi - y_lo + 1) as u64;
            let (hi, lo) = (column[y_hi + 1], column[y_lo]);
            let mean = |c: usize| ((hi[c] - lo[c]) / count) as u8;
            out[y * width + x] = Color::opaque(mean(0), mean(1), mean(2));
        }
    }

    debug!("box_blur: radius {} over {}x{}", radius, width, height);
    buffer.replace_pixels(out.into_boxed_slice())
}

/// Inclusive window bounds around `center`, clipped to `[0, len)`.
fn window(center: usize, half: usize, len: usize) -> (usize, usize) {
    (
        center.saturating_sub(half),
        center.saturating_add(half).min(len - 1),
    )
}

/// Adds one pixel's RGB to a running sum. Sums are 64-bit: a single row can be
/// wider than `u32::MAX / 255` pixels.
fn accumulate(sum: [u64; 3], c: Color) -> [u64; 3] {
    [
        sum[0] + u64::from(c.r()),
        sum[1] + u64::from(c.g()),
        sum[2] + u64::from(c.b()),
    ]
}

/// Per-pixel RGB sums over the clipped horizontal window.
fn horizontal_sums(pixels: &[Color], width: usize, half: usize) -> Vec<[u64; 3]> {
    let mut sums = Vec::with_capacity(pixels.len());
    let mut prefix = vec![[0u64; 3]; width + 1];

    for row in pixels.chunks_exact(width) {
        for (x, &c) in row.iter().enumerate() {
            prefix[x + 1] = accumulate(prefix[x], c);
        }
        for x in 0..width {
            let (lo, hi) = window(x, half, width);
            let (a, b) = (prefix[hi + 1], prefix[lo]);
            sums.push([a[0] - b[0], a[1] - b[1], a[2] - b[2]]);
        }
    }
    sums
}
