// src/rasterizer/mod.rs

//! Shape rasterization: filled rectangles, Bresenham lines and sprite blits.
//!
//! Every pixel goes through [`compositor::blend`], so blending and bounds
//! behaviour are the same for all primitives. Shapes that hang off the grid are
//! clipped pixel by pixel; that is never an error here. Strict single-pixel writes
//! live on the render context.

use crate::color::Color;
use crate::compositor;
use crate::error::DrawError;
use crate::framebuffer::FrameBuffer;
use crate::geometry::Rect;
use log::{trace, warn};

#[cfg(test)]
mod tests;

/// Fills `rect` with `color`. Returns the number of pixels that landed on the grid.
pub fn fill_rect(buffer: &mut FrameBuffer, rect: Rect, color: Color) -> usize {
    let x_end = rect.right().min(buffer.width());
    let y_end = rect.bottom().min(buffer.height());
    let mut drawn = 0;

    for y in u32::from(rect.y)..y_end {
        for x in u32::from(rect.x)..x_end {
            if compositor::blend(buffer, x as i32, y as i32, color).is_ok() {
                drawn += 1;
            }
        }
    }

    trace!("fill_rect {:?}: {} of {} pixels", rect, drawn, rect.area());
    drawn
}

/// Draws a 1px line from `p0` to `p1` (the `x`/`y` of each rect), both endpoints
/// included. Returns the number of pixels that landed on the grid.
pub fn draw_line(buffer: &mut FrameBuffer, p0: Rect, p1: Rect, color: Color) -> usize {
    let drawn = line_points(p0, p1)
        .filter(|&(x, y)| compositor::blend(buffer, x, y, color).is_ok())
        .count();
    trace!("draw_line {:?} -> {:?}: {} pixels", p0, p1, drawn);
    drawn
}

/// Copies a row-major block of `rect.w * rect.h` colors to `rect`, blending each
/// one. Returns the number of pixels that landed on the grid.
pub fn blit_sprite(
    buffer: &mut FrameBuffer,
    rect: Rect,
    pixels: &[Color],
) -> Result<usize, DrawError> {
    if pixels.len() != rect.area() {
        warn!(
            "blit_sprite: {} pixels supplied for a {}x{} rect",
            pixels.len(),
            rect.w,
            rect.h
        );
        return Err(DrawError::SpriteSizeMismatch {
            expected: rect.area(),
            actual: pixels.len(),
        });
    }

    let mut drawn = 0;
    if rect.is_empty() {
        return Ok(drawn);
    }

    for (dy, row) in pixels.chunks_exact(usize::from(rect.w)).enumerate() {
        let y = i32::from(rect.y) + dy as i32;
        for (dx, &color) in row.iter().enumerate() {
            let x = i32::from(rect.x) + dx as i32;
            if compositor::blend(buffer, x, y, color).is_ok() {
                drawn += 1;
            }
        }
    }

    trace!("blit_sprite {:?}: {} of {} pixels", rect, drawn, rect.area());
    Ok(drawn)
}

/// The pixel path of a line from `p0` to `p1`.
pub fn line_points(p0: Rect, p1: Rect) -> BresenhamLine {
    BresenhamLine::new(p0, p1)
}

/// Integer Bresenham stepper yielding every point from one endpoint to the other.
///
/// The endpoint nearer the top (then the left) is always the starting point, so
/// the set of points does not depend on argument order.
#[derive(Debug, Clone)]
pub struct BresenhamLine {
    x: i32,
    y: i32,
    x1: i32,
    y1: i32,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl BresenhamLine {
    pub fn new(p0: Rect, p1: Rect) -> Self {
        let (start, end) = if (p1.y, p1.x) < (p0.y, p0.x) {
            (p1, p0)
        } else {
            (p0, p1)
        };
        let (x0, y0) = (i32::from(start.x), i32::from(start.y));
        let (x1, y1) = (i32::from(end.x), i32::from(end.y));

        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        Self {
            x: x0,
            y: y0,
            x1,
            y1,
            dx,
            dy,
            sx: if x0 < x1 { 1 } else { -1 },
            sy: if y0 < y1 { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for BresenhamLine {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let current = (self.x, self.y);
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(current);
        }

        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        // Each step closes at most one unit of Chebyshev distance.
        let remaining = (self.x1 - self.x).abs().max((self.y1 - self.y).abs()) as usize + 1;
        (remaining, None)
    }
}
