// src/geometry.rs

//! Axis-aligned integer rectangles. A point is a `Rect` with zero extent.

use serde::{Deserialize, Serialize};

/// Rectangle covering `[x, x + w) x [y, y + h)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: u16,
    pub y: u16,
    pub w: u16,
    pub h: u16,
}

impl Rect {
    /// Origin plus extent.
    pub const fn new(x: u16, y: u16, w: u16, h: u16) -> Self {
        Self { x, y, w, h }
    }

    /// A bare coordinate.
    pub const fn point(x: u16, y: u16) -> Self {
        Self { x, y, w: 0, h: 0 }
    }

    /// Spans from `(x0, y0)` to `(x1, y1)`. Inverted corners collapse to zero extent.
    pub const fn from_corners(x0: u16, y0: u16, x1: u16, y1: u16) -> Self {
        Self {
            x: x0,
            y: y0,
            w: x1.saturating_sub(x0),
            h: y1.saturating_sub(y0),
        }
    }

    /// Exclusive right edge, widened so `x + w` cannot wrap.
    pub const fn right(&self) -> u32 {
        self.x as u32 + self.w as u32
    }

    /// Exclusive bottom edge, widened so `y + h` cannot wrap.
    pub const fn bottom(&self) -> u32 {
        self.y as u32 + self.h as u32
    }

    pub const fn is_point(&self) -> bool {
        self.w == 0 && self.h == 0
    }

    /// True when the rectangle covers no pixels.
    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Number of pixels covered.
    pub const fn area(&self) -> usize {
        self.w as usize * self.h as usize
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= i32::from(self.x)
            && y >= i32::from(self.y)
            && i64::from(x) < i64::from(self.right())
            && i64::from(y) < i64::from(self.bottom())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_agree() {
        assert_eq!(Rect::from_corners(10, 10, 40, 30), Rect::new(10, 10, 30, 20));
        assert_eq!(Rect::point(3, 4), Rect::new(3, 4, 0, 0));
        assert!(Rect::point(3, 4).is_point());
        assert!(Rect::point(3, 4).is_empty());
    }

    #[test]
    fn inverted_corners_collapse() {
        let r = Rect::from_corners(50, 50, 10, 60);
        assert_eq!((r.w, r.h), (0, 10));
        assert!(r.is_empty());
    }

    #[test]
    fn edges_do_not_wrap() {
        let r = Rect::new(u16::MAX, u16::MAX, u16::MAX, 2);
        assert_eq!(r.right(), 2 * u32::from(u16::MAX));
        assert_eq!(r.bottom(), u32::from(u16::MAX) + 2);
    }

    #[test]
    fn contains_is_half_open() {
        let r = Rect::new(10, 10, 30, 30);
        assert!(r.contains(10, 10));
        assert!(r.contains(39, 39));
        assert!(!r.contains(40, 39));
        assert!(!r.contains(9, 10));
        assert!(!r.contains(-1, 12));
        assert_eq!(r.area(), 900);
    }
}
